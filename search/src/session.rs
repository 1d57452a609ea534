use crate::debounce::Debouncer;
use crate::heading::MAX_HEADING_LEVEL;
use crate::index::DocumentIndex;
use crate::matcher::SearchResult;
use docshelf_catalog::Catalog;
use docshelf_catalog::Category;
use docshelf_catalog::Result;
use docshelf_content::ContentLoader;
use futures::FutureExt;
use futures::future::BoxFuture;
use futures::future::Shared;
use serde::Serialize;
use std::sync::Arc;
use std::sync::OnceLock;
use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;
use tracing::warn;

type IndexLoad = Shared<BoxFuture<'static, Arc<DocumentIndex>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub debounce: Duration,
    /// Deepest heading level searched.
    pub heading_max_level: u8,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            heading_max_level: 2,
        }
    }
}

/// What the document list currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchView {
    pub role_id: String,
    pub query: String,
    /// `None` means "no active search": show the role's categories unfiltered.
    pub results: Option<Vec<SearchResult>>,
    /// Bumped on every published change.
    pub generation: u64,
}

struct SessionInner {
    catalog: Arc<Catalog>,
    loader: ContentLoader,
    heading_max_level: u8,
    /// Started on first use and never restarted, even if every waiter is
    /// cancelled.
    index: OnceLock<IndexLoad>,
    view: watch::Sender<SearchView>,
}

/// Role-scoped search state for one browsing session.
///
/// Views are published on a watch channel; subscribe to follow them.
pub struct SearchSession {
    inner: Arc<SessionInner>,
    debouncer: Debouncer,
}

impl SearchSession {
    /// Start a session on the catalog's first role with an empty query.
    pub fn new(catalog: Arc<Catalog>, loader: ContentLoader, options: SessionOptions) -> Self {
        let role_id = catalog
            .default_role()
            .map(|role| role.id.clone())
            .unwrap_or_default();
        let (view, _) = watch::channel(SearchView {
            role_id,
            query: String::new(),
            results: None,
            generation: 0,
        });
        Self {
            inner: Arc::new(SessionInner {
                catalog,
                loader,
                heading_max_level: options.heading_max_level.clamp(1, MAX_HEADING_LEVEL),
                index: OnceLock::new(),
                view,
            }),
            debouncer: Debouncer::new(options.debounce),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchView> {
        self.inner.view.subscribe()
    }

    pub fn view(&self) -> SearchView {
        self.inner.view.borrow().clone()
    }

    /// Switch roles. The query is reset and the unfiltered list is shown.
    pub fn select_role(&self, role_id: &str) -> Result<()> {
        self.inner.catalog.role(role_id)?;
        self.debouncer.cancel();
        self.inner.publish(role_id.to_string(), String::new(), None);
        Ok(())
    }

    /// Update the query. Matching runs once typing has paused; a blank query
    /// shows the unfiltered list right away.
    pub fn set_query(&self, query: &str) {
        let role_id = self.view().role_id;
        if query.trim().is_empty() {
            self.debouncer.cancel();
            self.inner.publish(role_id, query.to_string(), None);
            return;
        }
        let inner = Arc::clone(&self.inner);
        let query = query.to_string();
        self.debouncer.schedule(move || async move {
            let results = inner.run_query(&role_id, &query).await;
            inner.publish(role_id, query, Some(results));
        });
    }

    /// Match `query` immediately against the selected role and publish it.
    pub async fn search(&self, query: &str) -> SearchView {
        self.debouncer.cancel();
        let role_id = self.view().role_id;
        let results = if query.trim().is_empty() {
            None
        } else {
            Some(self.inner.run_query(&role_id, query).await)
        };
        self.inner.publish(role_id, query.to_string(), results);
        self.view()
    }

    /// Bodies and headings for every document, loaded on first use only.
    pub async fn ensure_documents(&self) -> Arc<DocumentIndex> {
        self.inner.ensure_documents().await
    }

    /// Categories the list shows for `view`.
    pub fn visible_categories(&self, view: &SearchView) -> Vec<Category> {
        match &view.results {
            Some(results) => results
                .iter()
                .map(|result| result.category.clone())
                .collect(),
            None => self
                .inner
                .catalog
                .role(&view.role_id)
                .map(|role| role.categories.clone())
                .unwrap_or_default(),
        }
    }

    /// Cancel pending matching. Later queries are ignored.
    pub fn shutdown(&self) {
        self.debouncer.shutdown();
    }
}

impl SessionInner {
    async fn ensure_documents(&self) -> Arc<DocumentIndex> {
        let load = self.index.get_or_init(|| self.start_index_load()).clone();
        load.await
    }

    /// The load runs as its own task, so a superseded query cannot abandon it
    /// halfway through.
    fn start_index_load(&self) -> IndexLoad {
        let catalog = Arc::clone(&self.catalog);
        let loader = self.loader.clone();
        let max_level = self.heading_max_level;
        let task = tokio::spawn(async move {
            Arc::new(DocumentIndex::load(&catalog, &loader, max_level).await)
        });
        async move {
            match task.await {
                Ok(index) => index,
                Err(err) => {
                    warn!("document index load aborted: {err}");
                    Arc::new(DocumentIndex::default())
                }
            }
        }
        .boxed()
        .shared()
    }

    async fn run_query(&self, role_id: &str, query: &str) -> Vec<SearchResult> {
        let index = self.ensure_documents().await;
        let Ok(role) = self.catalog.role(role_id) else {
            return Vec::new();
        };
        let results = index.search(query, &role.categories);
        debug!("query {query:?} in role {role_id}: {} results", results.len());
        results
    }

    fn publish(&self, role_id: String, query: String, results: Option<Vec<SearchResult>>) {
        self.view.send_modify(|view| {
            view.generation += 1;
            view.role_id = role_id;
            view.query = query;
            view.results = results;
        });
    }
}
