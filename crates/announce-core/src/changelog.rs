use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::text::{collapse_whitespace, unwrap_bold, unwrap_code, unwrap_links};

pub const DEFAULT_MAX_HIGHLIGHTS: usize = 3;

static HEADING_RE: OnceLock<Regex> = OnceLock::new();

#[allow(clippy::expect_used)]
fn heading_re() -> &'static Regex {
    HEADING_RE.get_or_init(|| {
        Regex::new(r"^##\s+\[([^\]]*)\]").expect("static heading regex must compile")
    })
}

/// Version string used in changelog headings: the tag without one leading `v`.
pub fn version_from_tag(tag: &str) -> &str {
    let tag = tag.trim();
    tag.strip_prefix('v').unwrap_or(tag)
}

/// Reads `path` and extracts highlights for `tag`.
///
/// Missing or unreadable files yield no highlights; the announcement then
/// goes out without a highlights block.
pub fn read_highlights(path: &Path, tag: &str, max_items: usize) -> Vec<String> {
    match fs::read_to_string(path) {
        Ok(content) => extract_highlights(&content, tag, max_items),
        Err(_) => Vec::new(),
    }
}

/// Returns up to `max_items` bullet lines from the `## [<version>]` section,
/// reduced to plain text.
pub fn extract_highlights(content: &str, tag: &str, max_items: usize) -> Vec<String> {
    let version = version_from_tag(tag);
    if version.is_empty() || max_items == 0 {
        return Vec::new();
    }

    let mut lines = content.lines();
    let found = lines.by_ref().any(|line| {
        heading_re()
            .captures(line)
            .and_then(|captures| captures.get(1))
            .is_some_and(|heading| heading.as_str() == version)
    });
    if !found {
        return Vec::new();
    }

    let mut highlights = Vec::new();
    for raw_line in lines {
        if heading_re().is_match(raw_line) {
            break;
        }

        let line = raw_line.trim();
        let Some(text) = line.strip_prefix("- ") else {
            continue;
        };

        let text = plain_text(text);
        if text.is_empty() {
            continue;
        }

        highlights.push(text);
        if highlights.len() >= max_items {
            break;
        }
    }

    highlights
}

fn plain_text(markdown: &str) -> String {
    let text = unwrap_bold(markdown.trim());
    let text = unwrap_code(&text);
    let text = unwrap_links(&text);
    collapse_whitespace(&text)
}
