use crate::config::DocshelfConfig;
use anyhow::Context as _;
use anyhow::Result;
use docshelf_catalog::BodySource;
use docshelf_catalog::Catalog;
use docshelf_catalog::DocumentRoute;
use docshelf_content::ContentCache;
use docshelf_content::ContentLoader;
use docshelf_content::ContentStore;
use docshelf_content::Fetch;
use docshelf_content::FileStore;
use docshelf_content::FsFetcher;
use docshelf_content::HttpFetcher;
use docshelf_content::MemoryStore;
use docshelf_content::SessionCache;
use docshelf_content::UnavailableStore;
use docshelf_search::SearchSession;
use std::sync::Arc;
use tracing::warn;
use url::Url;

/// Everything a subcommand needs: the catalog and a loader wired to the
/// configured cache and fetcher.
pub struct Docshelf {
    pub config: DocshelfConfig,
    pub catalog: Arc<Catalog>,
    pub loader: ContentLoader,
}

impl Docshelf {
    pub async fn open(config: DocshelfConfig, no_cache: bool) -> Result<Self> {
        let catalog = Catalog::load(&config.dataset.path)
            .await
            .with_context(|| format!("failed to load dataset {}", config.dataset.path.display()))?;
        let cache = Arc::new(ContentCache::new(
            open_store(&config, no_cache),
            config.cache_config(),
        ));
        let loader = ContentLoader::new(fetcher(&config)?, cache)
            .with_timeout(config.fetch_timeout())
            .with_session(Arc::new(SessionCache::new(config.cache.session_capacity)));
        Ok(Self {
            config,
            catalog: Arc::new(catalog),
            loader,
        })
    }

    /// Body of a resolved route. Fetch failures degrade to an empty body.
    pub async fn body(&self, route: &DocumentRoute<'_>) -> Result<String> {
        Ok(match route.body()? {
            BodySource::Path(path) => self.loader.load(path).await,
            BodySource::Inline(content) => content.to_string(),
        })
    }

    pub fn session(&self) -> SearchSession {
        SearchSession::new(
            Arc::clone(&self.catalog),
            self.loader.clone(),
            self.config.session_options(),
        )
    }
}

/// The configured cache store. An unusable cache directory disables caching
/// rather than failing the command.
pub fn open_store(config: &DocshelfConfig, no_cache: bool) -> Box<dyn ContentStore> {
    if no_cache {
        return Box::new(MemoryStore::new());
    }
    match FileStore::open(&config.cache.dir) {
        Ok(store) => Box::new(store),
        Err(err) => {
            warn!("content cache disabled: {err}");
            Box::new(UnavailableStore::new(err.to_string()))
        }
    }
}

fn fetcher(config: &DocshelfConfig) -> Result<Arc<dyn Fetch>> {
    match &config.content.base_url {
        Some(base_url) => {
            let base_url =
                Url::parse(base_url).with_context(|| format!("invalid base url {base_url}"))?;
            Ok(Arc::new(HttpFetcher::new(base_url)?))
        }
        None => Ok(Arc::new(FsFetcher::new(config.content.root.clone()))),
    }
}
