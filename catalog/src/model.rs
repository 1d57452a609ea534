use crate::catalog::BodySource;
use serde::Deserialize;
use serde::Serialize;

/// Root of the dataset resource: `{ "roles": [...] }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub roles: Vec<Role>,
}

/// A named audience grouping an ordered set of documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Key of the icon shown next to the role; rendering is up to the caller.
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub categories: Vec<Category>,
}

/// Metadata record for a single document.
///
/// `slug` is the external identity used for routing, `id` the internal one
/// used to key cached bodies and extracted headings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub slug: String,
    /// Relative path of the Markdown body, if the document has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_path: Option<String>,
    /// Inline body for datasets that embed short documents directly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Category {
    /// Slug split into its hierarchical route segments.
    pub fn segments(&self) -> Vec<String> {
        self.slug
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Where the body comes from; `contentPath` wins over inline content.
    pub fn body_source(&self) -> Option<BodySource<'_>> {
        if let Some(path) = self.content_path.as_deref() {
            return Some(BodySource::Path(path));
        }
        self.content.as_deref().map(BodySource::Inline)
    }
}
