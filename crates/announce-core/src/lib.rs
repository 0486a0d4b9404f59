//! Release announcement building blocks.
//!
//! - `changelog`: version section lookup and bullet highlight extraction.
//! - `message`: announcement composition under a character budget.
//! - `facets`: Bluesky rich-text link/tag spans as UTF-8 byte offsets.
//! - `summary`: optional highlight summarizer contract and text cleanup.

pub mod changelog;
pub mod facets;
pub mod message;
pub mod summary;
mod text;

pub use changelog::{DEFAULT_MAX_HIGHLIGHTS, extract_highlights, read_highlights};
pub use facets::{Facet, FacetFeature, build_facets};
pub use message::{AnnouncementInput, ComposeError, DEFAULT_MAX_LEN, compose_announcement};
pub use summary::{SUMMARY_MAX_CHARS, SummaryError, Summarizer, sanitize_summary};
