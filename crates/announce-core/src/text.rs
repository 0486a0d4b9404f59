use std::sync::OnceLock;

use regex::Regex;

static BOLD_RE: OnceLock<Regex> = OnceLock::new();
static CODE_RE: OnceLock<Regex> = OnceLock::new();
static LINK_RE: OnceLock<Regex> = OnceLock::new();
static WHITESPACE_RE: OnceLock<Regex> = OnceLock::new();

// Patterns are literals; a compile failure is a programming error caught by the tests below.
#[allow(clippy::expect_used)]
fn compiled(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static regex must compile"))
}

pub(crate) fn unwrap_bold(text: &str) -> String {
    compiled(&BOLD_RE, r"\*\*([^*]+)\*\*")
        .replace_all(text, "$1")
        .into_owned()
}

pub(crate) fn unwrap_code(text: &str) -> String {
    compiled(&CODE_RE, r"`([^`]+)`")
        .replace_all(text, "$1")
        .into_owned()
}

pub(crate) fn unwrap_links(text: &str) -> String {
    compiled(&LINK_RE, r"\[([^\]]+)\]\([^)]+\)")
        .replace_all(text, "$1")
        .into_owned()
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    compiled(&WHITESPACE_RE, r"\s+")
        .replace_all(text, " ")
        .trim()
        .to_string()
}

/// Cuts `text` to at most `max_chars` characters, ending in `...` when shortened.
pub(crate) fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let keep = max_chars.saturating_sub(3);
    let head: String = text.chars().take(keep).collect();
    format!("{}...", head.trim_end())
}
