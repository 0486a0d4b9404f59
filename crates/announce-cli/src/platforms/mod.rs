use std::fmt;
use std::time::Duration;

use announce_core::Facet;
use reqwest::blocking::{Client, RequestBuilder};
use serde_json::Value;
use thiserror::Error;

use crate::config::{BlueskyCredentials, MastodonCredentials};

pub mod bluesky;
pub mod mastodon;

pub const POST_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Mastodon,
    Bluesky,
}

impl Platform {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mastodon => "mastodon",
            Self::Bluesky => "bluesky",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait Publisher {
    fn post_mastodon(
        &self,
        credentials: &MastodonCredentials,
        message: &str,
    ) -> Result<(), PostError>;

    fn post_bluesky(
        &self,
        credentials: &BlueskyCredentials,
        message: &str,
        facets: &[Facet],
    ) -> Result<(), PostError>;
}

#[derive(Debug, Clone)]
pub struct HttpPublisher {
    client: Client,
}

impl HttpPublisher {
    pub fn new() -> Result<Self, PostError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(POST_TIMEOUT_SECS))
            .build()
            .map_err(|error| PostError::Transport(error.to_string()))?;

        Ok(Self { client })
    }
}

impl Publisher for HttpPublisher {
    fn post_mastodon(
        &self,
        credentials: &MastodonCredentials,
        message: &str,
    ) -> Result<(), PostError> {
        mastodon::post_status(&self.client, credentials, message)
    }

    fn post_bluesky(
        &self,
        credentials: &BlueskyCredentials,
        message: &str,
        facets: &[Facet],
    ) -> Result<(), PostError> {
        bluesky::post_record(&self.client, credentials, message, facets)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PostError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("http error ({status}): {message}")]
    Http { status: u16, message: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("session error: {0}")]
    Session(String),
}

/// Sends a JSON request and returns the status code with the raw body.
pub(crate) fn send_json(request: RequestBuilder) -> Result<(u16, String), PostError> {
    let response = request
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .map_err(|error| PostError::Transport(error.to_string()))?;

    let status = response.status().as_u16();
    let body = response
        .text()
        .map_err(|error| PostError::Transport(error.to_string()))?;

    Ok((status, body))
}

pub(crate) fn ensure_success(status: u16, body: &str) -> Result<(), PostError> {
    if (200..=299).contains(&status) {
        return Ok(());
    }

    let message = extract_error_message(body).unwrap_or_else(|| format!("HTTP {status}"));
    Err(PostError::Http { status, message })
}

fn extract_error_message(body: &str) -> Option<String> {
    let value = serde_json::from_str::<Value>(body).ok()?;

    first_non_empty_string(&[
        value.get("message").and_then(Value::as_str),
        value.get("error_description").and_then(Value::as_str),
        value
            .get("error")
            .and_then(|error| error.get("message"))
            .and_then(Value::as_str),
        value.get("error").and_then(Value::as_str),
    ])
}

fn first_non_empty_string(candidates: &[Option<&str>]) -> Option<String> {
    candidates
        .iter()
        .flatten()
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
        .map(ToOwned::to_owned)
}
