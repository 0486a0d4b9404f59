use std::sync::OnceLock;

use regex::Regex;

static HASHTAG_RE: OnceLock<Regex> = OnceLock::new();

#[allow(clippy::expect_used)]
fn hashtag_re() -> &'static Regex {
    HASHTAG_RE.get_or_init(|| {
        Regex::new(r"#[A-Za-z0-9_]+").expect("static hashtag regex must compile")
    })
}

/// A rich-text span over the UTF-8 bytes of one exact message.
///
/// Offsets are only meaningful for the message they were built from; editing
/// the text afterwards invalidates them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Facet {
    pub byte_start: usize,
    pub byte_end: usize,
    pub feature: FacetFeature,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FacetFeature {
    Link(String),
    /// Tag text without the leading `#`.
    Tag(String),
}

impl Facet {
    pub fn byte_range(&self) -> std::ops::Range<usize> {
        self.byte_start..self.byte_end
    }
}

/// Finds the release link and hashtag spans in `message`.
///
/// Returns an empty vector when nothing matched.
pub fn build_facets(message: &str, release_url: &str) -> Vec<Facet> {
    let mut facets = Vec::new();

    let link = (!release_url.is_empty())
        .then(|| message.find(release_url))
        .flatten()
        .map(|start| start..start + release_url.len());

    if let Some(range) = &link {
        facets.push(Facet {
            byte_start: range.start,
            byte_end: range.end,
            feature: FacetFeature::Link(release_url.to_string()),
        });
    }

    for found in hashtag_re().find_iter(message) {
        let inside_link = link
            .as_ref()
            .is_some_and(|range| found.start() < range.end && range.start < found.end());
        if inside_link {
            continue;
        }

        facets.push(Facet {
            byte_start: found.start(),
            byte_end: found.end(),
            feature: FacetFeature::Tag(found.as_str()[1..].to_string()),
        });
    }

    facets
}
