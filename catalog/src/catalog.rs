use crate::error::CatalogError;
use crate::error::Result;
use crate::model::Category;
use crate::model::Dataset;
use crate::model::Role;
use std::collections::HashMap;
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// Title used for pages whose slug does not resolve.
pub const FALLBACK_TITLE: &str = "Document";

/// Route prefix under which every document is published.
const DOCS_PREFIX: &str = "/docs";

/// Validated, read-only view over a [`Dataset`].
#[derive(Debug, Clone)]
pub struct Catalog {
    dataset: Dataset,
    /// slug -> (role index, category index)
    by_slug: HashMap<String, (usize, usize)>,
}

/// A resolved document route.
#[derive(Debug, Clone, Copy)]
pub struct DocumentRoute<'a> {
    pub role: &'a Role,
    pub category: &'a Category,
}

/// Where the body of a resolved document comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodySource<'a> {
    Path(&'a str),
    Inline(&'a str),
}

impl<'a> DocumentRoute<'a> {
    /// Body reference for this route. A category without any body is a
    /// malformed reference and surfaces as "not found".
    pub fn body(&self) -> Result<BodySource<'a>> {
        self.category
            .body_source()
            .ok_or_else(|| CatalogError::MissingContent {
                slug: self.category.slug.clone(),
            })
    }

    pub fn href(&self) -> String {
        doc_href(&self.category.slug)
    }
}

impl Catalog {
    /// Parse and validate a dataset document.
    pub fn from_json(text: &str) -> Result<Self> {
        let dataset: Dataset = serde_json::from_str(text)?;
        Self::new(dataset)
    }

    /// Read the dataset resource from disk.
    pub async fn load(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path).await?;
        let catalog = Self::from_json(&text)?;
        info!(
            "loaded dataset {}: {} roles, {} documents",
            path.display(),
            catalog.dataset.roles.len(),
            catalog.by_slug.len()
        );
        Ok(catalog)
    }

    pub fn new(dataset: Dataset) -> Result<Self> {
        let mut by_slug = HashMap::new();
        let mut ids = HashSet::new();
        for (role_idx, role) in dataset.roles.iter().enumerate() {
            for (cat_idx, category) in role.categories.iter().enumerate() {
                if !ids.insert(category.id.as_str()) {
                    return Err(CatalogError::DuplicateId(category.id.clone()));
                }
                if by_slug
                    .insert(category.slug.clone(), (role_idx, cat_idx))
                    .is_some()
                {
                    return Err(CatalogError::DuplicateSlug(category.slug.clone()));
                }
            }
        }
        Ok(Self { dataset, by_slug })
    }

    pub fn roles(&self) -> &[Role] {
        &self.dataset.roles
    }

    pub fn role(&self, id: &str) -> Result<&Role> {
        self.dataset
            .roles
            .iter()
            .find(|role| role.id == id)
            .ok_or_else(|| CatalogError::UnknownRole(id.to_string()))
    }

    /// The role selected when a session starts.
    pub fn default_role(&self) -> Option<&Role> {
        self.dataset.roles.first()
    }

    /// Every category across all roles, in dataset order.
    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.dataset
            .roles
            .iter()
            .flat_map(|role| role.categories.iter())
    }

    pub fn len(&self) -> usize {
        self.by_slug.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_slug.is_empty()
    }

    pub fn find_by_slug(&self, slug: &str) -> Result<DocumentRoute<'_>> {
        let &(role_idx, cat_idx) =
            self.by_slug
                .get(slug)
                .ok_or_else(|| CatalogError::NotFound {
                    slug: slug.to_string(),
                })?;
        let role = &self.dataset.roles[role_idx];
        Ok(DocumentRoute {
            role,
            category: &role.categories[cat_idx],
        })
    }

    /// Resolve hierarchical route segments (`["eng", "maint"]`).
    pub fn resolve_segments<S: AsRef<str>>(&self, segments: &[S]) -> Result<DocumentRoute<'_>> {
        let slug = segments
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join("/");
        self.find_by_slug(&slug)
    }

    /// Segments of every published route, in dataset order.
    pub fn route_params(&self) -> Vec<Vec<String>> {
        self.categories().map(Category::segments).collect()
    }

    pub fn page_title(&self, slug: &str) -> &str {
        self.find_by_slug(slug)
            .map(|route| route.category.title.as_str())
            .unwrap_or(FALLBACK_TITLE)
    }
}

/// Public href of a document, with the trailing slash of the static export.
pub fn doc_href(slug: &str) -> String {
    format!("{DOCS_PREFIX}/{}/", slug.trim_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DATASET: &str = r#"{
        "roles": [
            {
                "id": "crew",
                "name": "Crew",
                "description": "Day-to-day operation",
                "icon": "sailing",
                "categories": [
                    {"id": "c1", "title": "Safety", "description": "Before departure", "slug": "crew/safety", "contentPath": "docs/safety.md"},
                    {"id": "c2", "title": "Glossary", "description": "", "slug": "crew/glossary", "content": "Short inline body"}
                ]
            },
            {
                "id": "maintenance",
                "name": "Maintenance",
                "description": "",
                "icon": "engineering",
                "categories": [
                    {"id": "m1", "title": "Engine Maintenance", "description": "covers oil changes", "slug": "eng/maint", "contentPath": "docs/eng/maint.md"},
                    {"id": "m2", "title": "Placeholder", "description": "", "slug": "eng/todo"}
                ]
            }
        ]
    }"#;

    fn catalog() -> Catalog {
        Catalog::from_json(DATASET).expect("fixture dataset")
    }

    #[test]
    fn resolves_slug_to_role_and_category() {
        let catalog = catalog();
        let route = catalog.find_by_slug("eng/maint").expect("route");
        assert_eq!(route.role.id, "maintenance");
        assert_eq!(route.category.id, "m1");
        assert_eq!(route.body().expect("body"), BodySource::Path("docs/eng/maint.md"));
        assert_eq!(route.href(), "/docs/eng/maint/");
    }

    #[test]
    fn resolves_segments() {
        let catalog = catalog();
        let route = catalog.resolve_segments(&["crew", "safety"]).expect("route");
        assert_eq!(route.category.title, "Safety");
    }

    #[test]
    fn unknown_slug_is_not_found() {
        let catalog = catalog();
        let err = catalog.find_by_slug("nope").expect_err("missing");
        assert!(err.is_not_found());
        assert!(matches!(err, CatalogError::NotFound { slug } if slug == "nope"));
    }

    #[test]
    fn category_without_body_is_missing_content() {
        let catalog = catalog();
        let route = catalog.find_by_slug("eng/todo").expect("route");
        let err = route.body().expect_err("no body");
        assert!(err.is_not_found());
    }

    #[test]
    fn inline_content_is_a_body() {
        let catalog = catalog();
        let route = catalog.find_by_slug("crew/glossary").expect("route");
        assert_eq!(route.body().expect("body"), BodySource::Inline("Short inline body"));
    }

    #[test]
    fn route_params_follow_dataset_order() {
        let catalog = catalog();
        assert_eq!(
            catalog.route_params(),
            vec![
                vec!["crew".to_string(), "safety".to_string()],
                vec!["crew".to_string(), "glossary".to_string()],
                vec!["eng".to_string(), "maint".to_string()],
                vec!["eng".to_string(), "todo".to_string()],
            ]
        );
    }

    #[test]
    fn page_title_falls_back_for_unknown_slug() {
        let catalog = catalog();
        assert_eq!(catalog.page_title("crew/safety"), "Safety");
        assert_eq!(catalog.page_title("missing"), FALLBACK_TITLE);
    }

    #[test]
    fn default_role_is_first() {
        let catalog = catalog();
        assert_eq!(catalog.default_role().map(|r| r.id.as_str()), Some("crew"));
        assert!(matches!(
            catalog.role("pilot"),
            Err(CatalogError::UnknownRole(_))
        ));
    }

    #[test]
    fn rejects_duplicate_slugs() {
        let text = r#"{"roles": [{"id": "r", "name": "R", "categories": [
            {"id": "a", "title": "A", "slug": "same"},
            {"id": "b", "title": "B", "slug": "same"}
        ]}]}"#;
        assert!(matches!(
            Catalog::from_json(text),
            Err(CatalogError::DuplicateSlug(slug)) if slug == "same"
        ));
    }

    #[test]
    fn rejects_duplicate_ids_across_roles() {
        let text = r#"{"roles": [
            {"id": "r1", "name": "R1", "categories": [{"id": "a", "title": "A", "slug": "one"}]},
            {"id": "r2", "name": "R2", "categories": [{"id": "a", "title": "B", "slug": "two"}]}
        ]}"#;
        assert!(matches!(
            Catalog::from_json(text),
            Err(CatalogError::DuplicateId(id)) if id == "a"
        ));
    }

    #[test]
    fn doc_href_trims_slashes() {
        assert_eq!(doc_href("/a/b/"), "/docs/a/b/");
    }
}
