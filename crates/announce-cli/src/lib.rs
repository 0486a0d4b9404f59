//! Release announcement CLI modules.
//!
//! - `config`: environment parsing for project defaults, credentials and AI settings.
//! - `git`: tag and GitHub URL fallbacks read from the local checkout.
//! - `ai_summary`: chat-completion summarizer for changelog highlights.
//! - `platforms`: Mastodon and Bluesky posting clients.
//! - `announce`: prepare/publish pipeline shared by the binary.

pub mod ai_summary;
pub mod announce;
pub mod config;
pub mod git;
pub mod platforms;
