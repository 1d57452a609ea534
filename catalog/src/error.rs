use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed dataset: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate category id: {0}")]
    DuplicateId(String),

    #[error("Duplicate category slug: {0}")]
    DuplicateSlug(String),

    #[error("No document found for route: {slug}")]
    NotFound { slug: String },

    #[error("Document {slug} has no content")]
    MissingContent { slug: String },

    #[error("Unknown role: {0}")]
    UnknownRole(String),
}

impl CatalogError {
    /// Whether this error is a terminal "not found" at the routing boundary.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CatalogError::NotFound { .. }
                | CatalogError::MissingContent { .. }
                | CatalogError::UnknownRole(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
