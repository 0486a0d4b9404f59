use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::tempdir;

const ISOLATED_ENV: &[&str] = &[
    "PROJECT_NAME",
    "RELEASE_TAG",
    "RELEASE_URL",
    "MASTODON_SERVER",
    "MASTODON_ACCESS_TOKEN",
    "BLUESKY_USERNAME",
    "BLUESKY_APP_PASSWORD",
    "ANNOUNCE_AI_ENABLED",
    "ANNOUNCE_AI_DEBUG",
    "ANNOUNCE_AI_BASE_URL",
    "ANNOUNCE_AI_MODEL",
    "ANNOUNCE_AI_API_KEY",
    "ANNOUNCE_AI_TIMEOUT_SECONDS",
    "RUST_LOG",
];

fn run_cli(dir: &Path, args: &[&str], envs: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_release-announce"));
    cmd.current_dir(dir);
    cmd.args(args);
    for key in ISOLATED_ENV {
        cmd.env_remove(key);
    }
    cmd.env("GIT_DIR", dir.join("no-such-git-dir"));
    for (key, value) in envs {
        cmd.env(key, value);
    }
    cmd.output().expect("run release-announce")
}

#[test]
fn dry_run_prints_message_and_never_posts_even_with_credentials() {
    let temp = tempdir().expect("create temp dir");
    fs::write(
        temp.path().join("CHANGELOG.md"),
        "## [1.2.3] - 2026-01-10\n- Fixed a bug\n- Added X\n## [1.2.2]\n- old\n",
    )
    .expect("write changelog");
    let secret = "announce-contract-secret";

    let output = run_cli(
        temp.path(),
        &[
            "--tag",
            "v1.2.3",
            "--release-url",
            "https://github.com/devnullvoid/pvetui/releases/tag/v1.2.3",
            "--dry-run",
        ],
        &[
            ("MASTODON_SERVER", "http://127.0.0.1:9"),
            ("MASTODON_ACCESS_TOKEN", secret),
            ("BLUESKY_USERNAME", "pvetui.bsky.social"),
            ("BLUESKY_APP_PASSWORD", secret),
        ],
    );

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout,
        "[dry-run] source=changelog\n\
         pvetui v1.2.3 is out!\n\
         Highlights:\n\
         • Fixed a bug\n\
         • Added X\n\
         Full notes: https://github.com/devnullvoid/pvetui/releases/tag/v1.2.3 #proxmox #linux #homelab\n"
    );
    assert!(!stdout.contains(secret));
    assert!(!String::from_utf8_lossy(&output.stderr).contains(secret));
}

#[test]
fn dry_run_reports_ai_fallback_without_network_when_ai_is_unconfigured() {
    let temp = tempdir().expect("create temp dir");

    let output = run_cli(
        temp.path(),
        &[
            "--tag",
            "v1.2.3",
            "--release-url",
            "https://example.com/r",
            "--project",
            "demo",
            "--dry-run",
        ],
        &[("ANNOUNCE_AI_ENABLED", "true")],
    );

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with(
        "[dry-run] source=changelog\n[dry-run] ai_fallback_reason=no highlights available\n"
    ));
    assert!(stdout.contains("demo v1.2.3 is out!"));
}

#[test]
fn missing_tag_is_a_usage_error() {
    let temp = tempdir().expect("create temp dir");

    let output = run_cli(temp.path(), &["--dry-run"], &[]);

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("release tag is required"));
}

#[test]
fn conflicting_platform_flags_exit_with_usage_code() {
    let temp = tempdir().expect("create temp dir");

    let output = run_cli(
        temp.path(),
        &[
            "--tag",
            "v1.2.3",
            "--release-url",
            "https://example.com/r",
            "--mastodon-only",
            "--bluesky-only",
        ],
        &[],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(
        String::from_utf8_lossy(&output.stderr)
            .contains("cannot use --mastodon-only and --bluesky-only together")
    );
}

#[test]
fn missing_credentials_exit_with_code_two() {
    let temp = tempdir().expect("create temp dir");

    let output = run_cli(
        temp.path(),
        &["--tag", "v1.2.3", "--release-url", "https://example.com/r"],
        &[("MASTODON_SERVER", "https://fosstodon.org")],
    );

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("no announcements posted"));
}

#[test]
fn unknown_flag_exits_with_usage_code() {
    let temp = tempdir().expect("create temp dir");

    let output = run_cli(temp.path(), &["--tagg", "v1.2.3"], &[]);

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn invalid_mastodon_server_is_rejected_before_posting() {
    let temp = tempdir().expect("create temp dir");

    let output = run_cli(
        temp.path(),
        &["--tag", "v1.2.3", "--release-url", "https://example.com/r"],
        &[
            ("MASTODON_SERVER", "fosstodon.org"),
            ("MASTODON_ACCESS_TOKEN", "token"),
        ],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid MASTODON_SERVER"));
}

#[test]
fn invalid_mastodon_server_does_not_block_dry_run_or_bluesky_only() {
    let temp = tempdir().expect("create temp dir");
    let invalid_server = [
        ("MASTODON_SERVER", "fosstodon.org"),
        ("MASTODON_ACCESS_TOKEN", "token"),
    ];

    let output = run_cli(
        temp.path(),
        &[
            "--tag",
            "v1.2.3",
            "--release-url",
            "https://x/y",
            "--dry-run",
            "--bluesky-only",
        ],
        &invalid_server,
    );

    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("pvetui v1.2.3 is out!"));

    let output = run_cli(
        temp.path(),
        &["--tag", "v1.2.3", "--release-url", "https://x/y", "--bluesky-only"],
        &invalid_server,
    );

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("no announcements posted"));
}
