use announce_core::{Facet, FacetFeature};
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::config::BlueskyCredentials;

use super::{PostError, ensure_success, send_json};

pub const CREATE_SESSION_ENDPOINT: &str =
    "https://bsky.social/xrpc/com.atproto.server.createSession";
pub const CREATE_RECORD_ENDPOINT: &str = "https://bsky.social/xrpc/com.atproto.repo.createRecord";
const POST_COLLECTION: &str = "app.bsky.feed.post";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub did: String,
    pub access_jwt: String,
}

#[derive(Debug, Serialize)]
struct SessionRequest<'a> {
    identifier: &'a str,
    password: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct SessionResponse {
    #[serde(default)]
    did: String,
    #[serde(default, rename = "accessJwt")]
    access_jwt: String,
}

#[derive(Debug, Serialize)]
pub struct CreateRecordRequest<'a> {
    repo: &'a str,
    collection: &'static str,
    record: PostRecord<'a>,
}

#[derive(Debug, Serialize)]
struct PostRecord<'a> {
    #[serde(rename = "$type")]
    record_type: &'static str,
    text: &'a str,
    #[serde(rename = "createdAt")]
    created_at: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    facets: Vec<WireFacet>,
}

#[derive(Debug, Serialize)]
struct WireFacet {
    index: ByteSlice,
    features: Vec<WireFeature>,
}

#[derive(Debug, Serialize)]
struct ByteSlice {
    #[serde(rename = "byteStart")]
    byte_start: usize,
    #[serde(rename = "byteEnd")]
    byte_end: usize,
}

#[derive(Debug, Serialize)]
#[serde(tag = "$type")]
enum WireFeature {
    #[serde(rename = "app.bsky.richtext.facet#link")]
    Link { uri: String },
    #[serde(rename = "app.bsky.richtext.facet#tag")]
    Tag { tag: String },
}

impl From<&Facet> for WireFacet {
    fn from(facet: &Facet) -> Self {
        let feature = match &facet.feature {
            FacetFeature::Link(uri) => WireFeature::Link { uri: uri.clone() },
            FacetFeature::Tag(tag) => WireFeature::Tag { tag: tag.clone() },
        };

        Self {
            index: ByteSlice {
                byte_start: facet.byte_start,
                byte_end: facet.byte_end,
            },
            features: vec![feature],
        }
    }
}

pub fn post_record(
    client: &Client,
    credentials: &BlueskyCredentials,
    message: &str,
    facets: &[Facet],
) -> Result<(), PostError> {
    let session = create_session(client, credentials)?;
    let payload = build_record_request(&session.did, message, facets, Utc::now());

    let request = client
        .post(CREATE_RECORD_ENDPOINT)
        .bearer_auth(&session.access_jwt)
        .json(&payload);

    let (status, body) = send_json(request)?;
    ensure_success(status, &body)
}

fn create_session(
    client: &Client,
    credentials: &BlueskyCredentials,
) -> Result<Session, PostError> {
    let request = client.post(CREATE_SESSION_ENDPOINT).json(&SessionRequest {
        identifier: &credentials.identifier,
        password: &credentials.app_password,
    });

    let (status, body) = send_json(request)?;
    parse_session_response(status, &body)
}

pub fn parse_session_response(status: u16, body: &str) -> Result<Session, PostError> {
    ensure_success(status, body)?;

    let payload: SessionResponse = serde_json::from_str(body)
        .map_err(|error| PostError::InvalidResponse(error.to_string()))?;

    let did = payload.did.trim();
    let access_jwt = payload.access_jwt.trim();
    if did.is_empty() || access_jwt.is_empty() {
        return Err(PostError::Session(
            "failed to create bluesky session".to_string(),
        ));
    }

    Ok(Session {
        did: did.to_string(),
        access_jwt: access_jwt.to_string(),
    })
}

pub fn build_record_request<'a>(
    did: &'a str,
    message: &'a str,
    facets: &[Facet],
    created_at: DateTime<Utc>,
) -> CreateRecordRequest<'a> {
    CreateRecordRequest {
        repo: did,
        collection: POST_COLLECTION,
        record: PostRecord {
            record_type: POST_COLLECTION,
            text: message,
            created_at: created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            facets: facets.iter().map(WireFacet::from).collect(),
        },
    }
}
