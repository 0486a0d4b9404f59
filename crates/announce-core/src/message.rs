use thiserror::Error;

use crate::text::truncate_with_ellipsis;

/// Bluesky's post limit; Mastodon's default of 500 is looser, so one message serves both.
pub const DEFAULT_MAX_LEN: usize = 300;

pub const HASHTAGS: &str = "#proxmox #linux #homelab";

const COMPACT_HIGHLIGHT_CHARS: usize = 92;
const SHORT_HIGHLIGHT_CHARS: usize = 56;
const HIGHLIGHTS_HEADER: &str = "Highlights:";
const BULLET: &str = "• ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnouncementInput {
    pub project: String,
    pub tag: String,
    pub release_url: String,
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ComposeError {
    #[error("release tag must not be empty")]
    MissingTag,
    #[error("release URL must not be empty")]
    MissingReleaseUrl,
    #[error("message budget of {max_len} characters cannot fit the release notes tail ({tail_len})")]
    BudgetTooSmall { max_len: usize, tail_len: usize },
}

/// Builds the longest announcement that stays within `max_len` characters.
///
/// Highlights are dropped from the end first, then the lead highlight is
/// shortened, then the highlights block goes away entirely. Only after that is
/// the `"{project} {tag} is out!"` prefix truncated. The release URL and
/// hashtags are never cut.
pub fn compose_announcement(
    input: &AnnouncementInput,
    max_len: usize,
) -> Result<String, ComposeError> {
    let tag = input.tag.trim();
    if tag.is_empty() {
        return Err(ComposeError::MissingTag);
    }
    let release_url = input.release_url.trim();
    if release_url.is_empty() {
        return Err(ComposeError::MissingReleaseUrl);
    }

    let base = format!("{} {tag} is out!", input.project.trim());
    let tail = format!("Full notes: {release_url} {HASHTAGS}");

    let compact: Vec<String> = input
        .highlights
        .iter()
        .map(|highlight| highlight.trim())
        .filter(|highlight| !highlight.is_empty())
        .map(|highlight| truncate_with_ellipsis(highlight, COMPACT_HIGHLIGHT_CHARS))
        .collect();

    if let Some(message) = compose_with_highlights(&base, &tail, &compact, max_len) {
        return Ok(message);
    }

    compose_without_highlights(&base, &tail, max_len)
}

fn compose_with_highlights(
    base: &str,
    tail: &str,
    compact: &[String],
    max_len: usize,
) -> Option<String> {
    let first = compact.first()?;

    let fits = (1..=compact.len())
        .rev()
        .map(|count| highlights_message(base, tail, &compact[..count]))
        .find(|candidate| char_len(candidate) <= max_len);
    if fits.is_some() {
        return fits;
    }

    let short = truncate_with_ellipsis(first, SHORT_HIGHLIGHT_CHARS);
    let candidate = highlights_message(base, tail, std::slice::from_ref(&short));
    (char_len(&candidate) <= max_len).then_some(candidate)
}

fn highlights_message(base: &str, tail: &str, highlights: &[String]) -> String {
    let bullets = highlights
        .iter()
        .map(|highlight| format!("{BULLET}{highlight}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!("{base}\n{HIGHLIGHTS_HEADER}\n{bullets}\n{tail}")
}

fn compose_without_highlights(
    base: &str,
    tail: &str,
    max_len: usize,
) -> Result<String, ComposeError> {
    let candidate = format!("{base} {tail}");
    let candidate_len = char_len(&candidate);
    if candidate_len <= max_len {
        return Ok(candidate);
    }

    let overflow = candidate_len - max_len;
    let base_len = char_len(base);
    if base_len > overflow + 3 {
        let shortened = truncate_with_ellipsis(base, base_len - overflow);
        return Ok(format!("{shortened} {tail}"));
    }

    let tail_len = char_len(tail);
    if tail_len <= max_len {
        return Ok(tail.to_string());
    }

    Err(ComposeError::BudgetTooSmall { max_len, tail_len })
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}
