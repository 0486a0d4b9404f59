use std::path::PathBuf;

use announce_core::{
    AnnouncementInput, ComposeError, DEFAULT_MAX_HIGHLIGHTS, DEFAULT_MAX_LEN, Facet,
    SUMMARY_MAX_CHARS, Summarizer, SummaryError, build_facets, compose_announcement, read_highlights,
};
use tracing::{debug, info, warn};

use crate::config::Credentials;
use crate::platforms::{Platform, PostError, Publisher};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnounceRequest {
    pub project: String,
    pub tag: String,
    pub release_url: String,
    pub changelog: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightSource {
    Changelog,
    Ai,
}

impl HighlightSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Changelog => "changelog",
            Self::Ai => "ai",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedAnnouncement {
    pub message: String,
    pub facets: Vec<Facet>,
    pub source: HighlightSource,
    /// Set when a summarizer ran and its output was not used.
    pub fallback_reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformTarget {
    All,
    MastodonOnly,
    BlueskyOnly,
}

impl PlatformTarget {
    pub fn includes(self, platform: Platform) -> bool {
        match self {
            Self::All => true,
            Self::MastodonOnly => platform == Platform::Mastodon,
            Self::BlueskyOnly => platform == Platform::Bluesky,
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub posted: Vec<Platform>,
    pub failures: Vec<(Platform, PostError)>,
}

impl PublishReport {
    pub fn attempted_any(&self) -> bool {
        !self.posted.is_empty() || !self.failures.is_empty()
    }
}

/// Gathers highlights, optionally condenses them, and composes the final text
/// with its Bluesky facets.
pub fn prepare(
    request: &AnnounceRequest,
    summarizer: Option<&dyn Summarizer>,
) -> Result<PreparedAnnouncement, ComposeError> {
    let mut highlights = read_highlights(&request.changelog, &request.tag, DEFAULT_MAX_HIGHLIGHTS);
    debug!(
        changelog = %request.changelog.display(),
        count = highlights.len(),
        "read changelog highlights"
    );

    let mut source = HighlightSource::Changelog;
    let mut fallback_reason = None;
    if let Some(summarizer) = summarizer {
        match summarizer.summarize(&request.tag, &highlights, SUMMARY_MAX_CHARS) {
            Ok(summary) if !summary.trim().is_empty() => {
                highlights = vec![summary];
                source = HighlightSource::Ai;
            }
            outcome => {
                let error = outcome.err().unwrap_or(SummaryError::EmptyContent);
                debug!(reason = %error, "ai summary unavailable, using changelog highlights");
                fallback_reason = Some(error.to_string());
            }
        }
    }

    let message = compose_announcement(
        &AnnouncementInput {
            project: request.project.clone(),
            tag: request.tag.clone(),
            release_url: request.release_url.clone(),
            highlights,
        },
        DEFAULT_MAX_LEN,
    )?;
    let facets = build_facets(&message, &request.release_url);

    Ok(PreparedAnnouncement {
        message,
        facets,
        source,
        fallback_reason,
    })
}

/// Posts to every targeted platform that has credentials.
///
/// A failing platform does not stop the others; the report lists both outcomes.
pub fn publish(
    prepared: &PreparedAnnouncement,
    target: PlatformTarget,
    credentials: &Credentials,
    publisher: &dyn Publisher,
) -> PublishReport {
    let mut report = PublishReport::default();

    if let Some(mastodon) = credentials
        .mastodon
        .as_ref()
        .filter(|_| target.includes(Platform::Mastodon))
    {
        let outcome = publisher.post_mastodon(mastodon, &prepared.message);
        record(&mut report, Platform::Mastodon, outcome);
    }

    if let Some(bluesky) = credentials
        .bluesky
        .as_ref()
        .filter(|_| target.includes(Platform::Bluesky))
    {
        let outcome = publisher.post_bluesky(bluesky, &prepared.message, &prepared.facets);
        record(&mut report, Platform::Bluesky, outcome);
    }

    report
}

fn record(report: &mut PublishReport, platform: Platform, outcome: Result<(), PostError>) {
    match outcome {
        Ok(()) => {
            info!(%platform, "posted announcement");
            report.posted.push(platform);
        }
        Err(error) => {
            warn!(%platform, %error, "failed to post announcement");
            report.failures.push((platform, error));
        }
    }
}
