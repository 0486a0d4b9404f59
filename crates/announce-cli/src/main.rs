use std::path::PathBuf;

use announce_core::{ComposeError, Summarizer};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use announce_cli::{
    ai_summary::ChatCompletionSummarizer,
    announce::{
        AnnounceRequest, HighlightSource, PlatformTarget, PreparedAnnouncement, PublishReport,
        prepare, publish,
    },
    config::{AiConfig, RuntimeConfig},
    git::{GitCheckout, RepoMetadata, release_url_for_tag},
    platforms::{HttpPublisher, Platform, PostError, Publisher},
};

const DEFAULT_CHANGELOG: &str = "CHANGELOG.md";

#[derive(Debug, Parser)]
#[command(author, version, about = "Post release announcements to Mastodon/Bluesky.")]
struct Cli {
    /// Release tag (e.g. v1.0.17); falls back to RELEASE_TAG, then the latest git tag.
    #[arg(long)]
    tag: Option<String>,
    /// Full release URL; falls back to RELEASE_URL, then the GitHub origin remote.
    #[arg(long)]
    release_url: Option<String>,
    /// Project name shown in the announcement; falls back to PROJECT_NAME.
    #[arg(long)]
    project: Option<String>,
    /// Path to the changelog used for highlights.
    #[arg(long, default_value = DEFAULT_CHANGELOG)]
    changelog: PathBuf,
    /// Print the generated message and exit without posting.
    #[arg(long)]
    dry_run: bool,
    /// Post only to Mastodon.
    #[arg(long)]
    mastodon_only: bool,
    /// Post only to Bluesky.
    #[arg(long)]
    bluesky_only: bool,
}

impl Cli {
    fn platform_target(&self) -> Result<PlatformTarget, AppError> {
        match (self.mastodon_only, self.bluesky_only) {
            (true, true) => Err(AppError::usage(
                "cannot use --mastodon-only and --bluesky-only together",
            )),
            (true, false) => Ok(PlatformTarget::MastodonOnly),
            (false, true) => Ok(PlatformTarget::BlueskyOnly),
            (false, false) => Ok(PlatformTarget::All),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ErrorKind {
    Usage,
    Runtime,
    NoPlatforms,
}

#[derive(Debug, PartialEq, Eq)]
struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    fn usage(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Usage,
            message: message.into(),
        }
    }

    fn runtime(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Runtime,
            message: message.into(),
        }
    }

    fn no_platforms(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::NoPlatforms,
            message: message.into(),
        }
    }

    fn from_compose(error: ComposeError) -> Self {
        match error {
            ComposeError::MissingTag | ComposeError::MissingReleaseUrl => {
                AppError::usage(error.to_string())
            }
            ComposeError::BudgetTooSmall { .. } => AppError::runtime(error.to_string()),
        }
    }

    fn exit_code(&self) -> i32 {
        match self.kind {
            ErrorKind::Usage | ErrorKind::Runtime => 1,
            ErrorKind::NoPlatforms => 2,
        }
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => {
            let code = if error.use_stderr() { 1 } else { 0 };
            // Nothing left to report to if stderr itself is gone; the exit code still tells.
            let _ = error.print();
            std::process::exit(code);
        }
    };

    let config = RuntimeConfig::from_env();
    init_tracing(&config.ai);

    match run(cli, &config) {
        Ok(output) => {
            println!("{output}");
        }
        Err(error) => {
            eprintln!("error: {}", error.message);
            std::process::exit(error.exit_code());
        }
    }
}

fn init_tracing(ai: &AiConfig) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(ai.debug, rust_log.as_deref()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// An explicit, parseable `RUST_LOG` wins over the debug flag.
fn log_filter(debug: bool, rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(if debug { "debug" } else { "warn" }))
}

fn run(cli: Cli, config: &RuntimeConfig) -> Result<String, AppError> {
    let summarizer = ChatCompletionSummarizer::new(config.ai.clone());
    run_with(
        cli,
        config,
        &GitCheckout::current_dir(),
        &summarizer,
        HttpPublisher::new,
    )
}

fn run_with<Repo, Connect, P>(
    cli: Cli,
    config: &RuntimeConfig,
    repo: &Repo,
    summarizer: &dyn Summarizer,
    connect: Connect,
) -> Result<String, AppError>
where
    Repo: RepoMetadata,
    Connect: FnOnce() -> Result<P, PostError>,
    P: Publisher,
{
    let target = cli.platform_target()?;

    let tag = first_non_empty(&[cli.tag.as_deref(), config.release_tag.as_deref()])
        .or_else(|| repo.latest_tag())
        .ok_or_else(|| AppError::usage("release tag is required (use --tag or RELEASE_TAG)"))?;

    let release_url = first_non_empty(&[cli.release_url.as_deref(), config.release_url.as_deref()])
        .or_else(|| {
            repo.github_url()
                .map(|repo_url| release_url_for_tag(&repo_url, &tag))
        })
        .ok_or_else(|| {
            AppError::usage("release URL is required (use --release-url or RELEASE_URL)")
        })?;

    let project = first_non_empty(&[cli.project.as_deref()])
        .unwrap_or_else(|| config.project_name.clone());

    let request = AnnounceRequest {
        project,
        tag,
        release_url,
        changelog: cli.changelog,
    };
    let prepared = prepare(&request, config.ai.enabled.then_some(summarizer))
        .map_err(AppError::from_compose)?;

    if cli.dry_run {
        return Ok(render_dry_run(&prepared, config.ai.enabled));
    }

    if let Some(mastodon) = config
        .credentials
        .mastodon
        .as_ref()
        .filter(|_| target.includes(Platform::Mastodon))
    {
        mastodon
            .validate()
            .map_err(|error| AppError::usage(error.to_string()))?;
    }

    let publisher = connect()
        .map_err(|error| AppError::runtime(format!("failed to create http client: {error}")))?;
    let report = publish(&prepared, target, &config.credentials, &publisher);
    render_report(&report)
}

fn first_non_empty(candidates: &[Option<&str>]) -> Option<String> {
    candidates
        .iter()
        .flatten()
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
        .map(ToOwned::to_owned)
}

fn render_dry_run(prepared: &PreparedAnnouncement, ai_enabled: bool) -> String {
    let mut lines = vec![format!("[dry-run] source={}", prepared.source.as_str())];
    if ai_enabled && prepared.source != HighlightSource::Ai {
        let reason = prepared.fallback_reason.as_deref().unwrap_or("unknown");
        lines.push(format!("[dry-run] ai_fallback_reason={reason}"));
    }
    lines.push(prepared.message.clone());
    lines.join("\n")
}

fn render_report(report: &PublishReport) -> Result<String, AppError> {
    if !report.attempted_any() {
        return Err(AppError::no_platforms(
            "no announcements posted (missing credentials or platform disabled)",
        ));
    }

    let posted = report
        .posted
        .iter()
        .map(|platform| platform.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    if report.failures.is_empty() {
        return Ok(format!("Posted announcements to: {posted}"));
    }

    let failed = report
        .failures
        .iter()
        .map(|(platform, error)| format!("{platform} ({error})"))
        .collect::<Vec<_>>()
        .join(", ");
    let mut message = format!("failed to post announcements to: {failed}");
    if !posted.is_empty() {
        message.push_str(&format!("; already posted to: {posted}"));
    }

    Err(AppError::runtime(message))
}
