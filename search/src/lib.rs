//! Heading-aware search over the documents of a catalog.
//!
//! Matching is a linear, case-insensitive substring scan over titles,
//! descriptions and extracted headings. There is no persistent index: bodies
//! are loaded once per session and headings are re-derived from them.

mod debounce;
mod heading;
mod index;
mod matcher;
mod session;

pub use debounce::Debouncer;
pub use heading::Heading;
pub use heading::MAX_HEADING_LEVEL;
pub use heading::extract_headings;
pub use index::DocumentIndex;
pub use matcher::SearchResult;
pub use matcher::match_query;
pub use session::SearchSession;
pub use session::SearchView;
pub use session::SessionOptions;
