use reqwest::blocking::Client;
use serde::Serialize;

use crate::config::MastodonCredentials;

use super::{PostError, ensure_success, send_json};

const STATUSES_PATH: &str = "/api/v1/statuses";

#[derive(Debug, Serialize)]
struct StatusPayload<'a> {
    status: &'a str,
}

pub fn statuses_endpoint(server: &str) -> String {
    format!("{}{STATUSES_PATH}", server.trim_end_matches('/'))
}

pub fn post_status(
    client: &Client,
    credentials: &MastodonCredentials,
    message: &str,
) -> Result<(), PostError> {
    let request = client
        .post(statuses_endpoint(&credentials.server))
        .bearer_auth(&credentials.access_token)
        .json(&StatusPayload { status: message });

    let (status, body) = send_json(request)?;
    ensure_success(status, &body)
}
