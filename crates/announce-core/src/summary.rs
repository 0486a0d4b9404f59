use thiserror::Error;

use crate::text::{collapse_whitespace, truncate_with_ellipsis, unwrap_bold, unwrap_code};

/// Room left for a single summary line once base text, tail and newlines are reserved.
pub const SUMMARY_MAX_CHARS: usize = 96;

const ERROR_BODY_MAX_CHARS: usize = 240;

/// Condenses changelog highlights into one short line.
///
/// Failures are never fatal for an announcement: callers fall back to the
/// changelog highlights and may log the error as the reason.
pub trait Summarizer {
    fn summarize(
        &self,
        tag: &str,
        highlights: &[String],
        max_chars: usize,
    ) -> Result<String, SummaryError>;
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SummaryError {
    #[error("no highlights available")]
    NoHighlights,
    #[error("missing ANNOUNCE_AI_BASE_URL / ANNOUNCE_AI_MODEL / ANNOUNCE_AI_API_KEY")]
    MissingConfig,
    #[error("AI HTTP error: {status}{}", body_suffix(.body))]
    Http { status: u16, body: String },
    #[error("AI URL error: {0}")]
    Transport(String),
    #[error("AI request timed out")]
    Timeout,
    #[error("AI response was not valid JSON")]
    InvalidJson,
    #[error("AI response had no choices")]
    NoChoices,
    #[error("AI response content was empty")]
    EmptyContent,
}

impl SummaryError {
    /// HTTP failure with the response body trimmed and capped for logging.
    pub fn http(status: u16, body: &str) -> Self {
        Self::Http {
            status,
            body: truncate_with_ellipsis(body.trim(), ERROR_BODY_MAX_CHARS),
        }
    }
}

fn body_suffix(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!(" body={body}")
    }
}

/// Reduces model output to one plain-text line of at most `max_chars` characters.
pub fn sanitize_summary(text: &str, max_chars: usize) -> String {
    let text = collapse_whitespace(text);
    let text = unwrap_code(&text);
    let text = unwrap_bold(&text);
    let text = text.trim_matches(|ch: char| matches!(ch, ' ' | '"' | '\''));
    truncate_with_ellipsis(text, max_chars)
}
