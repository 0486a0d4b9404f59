use std::time::Duration;

use announce_core::{Summarizer, SummaryError, sanitize_summary};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::config::AiConfig;

const COMPLETIONS_PATH: &str = "/chat/completions";
const PROMPT_MAX_HIGHLIGHTS: usize = 8;
const TEMPERATURE: f32 = 1.0;
const USER_AGENT: &str = concat!("release-announce/", env!("CARGO_PKG_VERSION"));
const SYSTEM_PROMPT: &str = "You summarize release notes into one short line. \
Return plain text only, no markdown, no hashtags, no quotes.";

/// Summarizes highlights through an OpenAI-compatible chat-completion endpoint.
#[derive(Debug, Clone)]
pub struct ChatCompletionSummarizer {
    config: AiConfig,
}

#[derive(Debug, Serialize)]
pub struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Default, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Default, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Default, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

struct Endpoint<'a> {
    url: String,
    model: &'a str,
    api_key: &'a str,
}

impl ChatCompletionSummarizer {
    pub fn new(config: AiConfig) -> Self {
        Self { config }
    }

    fn endpoint(&self) -> Result<Endpoint<'_>, SummaryError> {
        match (
            self.config.base_url.as_deref(),
            self.config.model.as_deref(),
            self.config.api_key.as_deref(),
        ) {
            (Some(base_url), Some(model), Some(api_key)) => Ok(Endpoint {
                url: completions_url(base_url),
                model,
                api_key,
            }),
            _ => Err(SummaryError::MissingConfig),
        }
    }
}

impl Summarizer for ChatCompletionSummarizer {
    fn summarize(
        &self,
        tag: &str,
        highlights: &[String],
        max_chars: usize,
    ) -> Result<String, SummaryError> {
        if highlights.is_empty() {
            return Err(SummaryError::NoHighlights);
        }
        let endpoint = self.endpoint()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .build()
            .map_err(|error| SummaryError::Transport(error.to_string()))?;

        let response = client
            .post(&endpoint.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .bearer_auth(endpoint.api_key)
            .json(&build_completion_request(
                endpoint.model,
                tag,
                highlights,
                max_chars,
            ))
            .send()
            .map_err(map_transport_error)?;

        let status = response.status().as_u16();
        let body = response.text().map_err(map_transport_error)?;

        parse_completion_response(status, &body, max_chars)
    }
}

pub fn completions_url(base_url: &str) -> String {
    format!("{}{COMPLETIONS_PATH}", base_url.trim_end_matches('/'))
}

pub fn build_completion_request<'a>(
    model: &'a str,
    tag: &str,
    highlights: &[String],
    max_chars: usize,
) -> CompletionRequest<'a> {
    let prompt_lines = highlights
        .iter()
        .take(PROMPT_MAX_HIGHLIGHTS)
        .map(|highlight| format!("- {highlight}"))
        .collect::<Vec<_>>()
        .join("\n");

    CompletionRequest {
        model,
        messages: vec![
            ChatMessage {
                role: "system",
                content: SYSTEM_PROMPT.to_string(),
            },
            ChatMessage {
                role: "user",
                content: format!(
                    "Summarize these release highlights for {tag} in <= {max_chars} characters.\n\
                     Focus on the most user-visible improvements.\n\
                     {prompt_lines}"
                ),
            },
        ],
        temperature: TEMPERATURE,
    }
}

pub fn parse_completion_response(
    status: u16,
    body: &str,
    max_chars: usize,
) -> Result<String, SummaryError> {
    if !(200..=299).contains(&status) {
        return Err(SummaryError::http(status, body));
    }

    let payload: CompletionResponse =
        serde_json::from_str(body).map_err(|_| SummaryError::InvalidJson)?;

    let first = payload
        .choices
        .into_iter()
        .next()
        .ok_or(SummaryError::NoChoices)?;

    let content = first
        .message
        .and_then(|message| message.content)
        .unwrap_or_default();
    let summary = sanitize_summary(&content, max_chars);
    if summary.is_empty() {
        return Err(SummaryError::EmptyContent);
    }

    Ok(summary)
}

fn map_transport_error(error: reqwest::Error) -> SummaryError {
    if error.is_timeout() {
        SummaryError::Timeout
    } else {
        SummaryError::Transport(error.to_string())
    }
}
