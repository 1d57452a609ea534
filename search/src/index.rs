use crate::heading::Heading;
use crate::heading::extract_headings;
use crate::matcher::SearchResult;
use crate::matcher::match_query;
use docshelf_catalog::BodySource;
use docshelf_catalog::Catalog;
use docshelf_catalog::Category;
use docshelf_content::ContentLoader;
use futures::future::join_all;
use std::collections::HashMap;
use tracing::debug;
use tracing::info;

/// Bodies and search headings for every category of a catalog, keyed by
/// category id.
#[derive(Debug, Clone, Default)]
pub struct DocumentIndex {
    bodies: HashMap<String, String>,
    headings: HashMap<String, Vec<Heading>>,
}

impl DocumentIndex {
    /// Load every body concurrently and index it. The index is assembled
    /// only after every load has settled, so it is never partially filled.
    pub async fn load(catalog: &Catalog, loader: &ContentLoader, max_level: u8) -> Self {
        let loads = catalog.categories().map(|category| async move {
            let body = load_body(category, loader).await;
            (category.id.clone(), body)
        });
        let bodies = join_all(loads).await;
        let index = Self::from_bodies(bodies, max_level);
        info!("indexed {} documents", index.len());
        index
    }

    /// Index bodies that are already in memory.
    pub fn from_bodies<I>(bodies: I, max_level: u8) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let bodies: HashMap<String, String> = bodies.into_iter().collect();
        let headings = bodies
            .iter()
            .map(|(id, body)| (id.clone(), extract_headings(body, max_level)))
            .collect();
        Self { bodies, headings }
    }

    pub fn body(&self, category_id: &str) -> Option<&str> {
        self.bodies.get(category_id).map(String::as_str)
    }

    pub fn headings(&self, category_id: &str) -> &[Heading] {
        self.headings
            .get(category_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn search<'a, I>(&self, query: &str, categories: I) -> Vec<SearchResult>
    where
        I: IntoIterator<Item = &'a Category>,
    {
        match_query(query, categories, &self.headings)
    }
}

async fn load_body(category: &Category, loader: &ContentLoader) -> String {
    match category.body_source() {
        Some(BodySource::Path(path)) => loader.load(path).await,
        Some(BodySource::Inline(content)) => content.to_string(),
        None => {
            debug!("category {} has no body", category.id);
            String::new()
        }
    }
}
