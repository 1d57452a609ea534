//! Static documentation catalog: roles, their document categories and the
//! slug routes that address them.
//!
//! The dataset is a single JSON document loaded once at startup and treated as
//! read-only for the rest of the session.

mod catalog;
mod error;
mod model;

pub use catalog::BodySource;
pub use catalog::Catalog;
pub use catalog::DocumentRoute;
pub use catalog::FALLBACK_TITLE;
pub use catalog::doc_href;
pub use error::CatalogError;
pub use error::Result;
pub use model::Category;
pub use model::Dataset;
pub use model::Role;
