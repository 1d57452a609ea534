use crate::cache::ContentCache;
use crate::error::FetchError;
use crate::fetch::Fetch;
use crate::session::SessionCache;
use futures::FutureExt;
use futures::future::BoxFuture;
use futures::future::Shared;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::Duration;
use tracing::debug;
use tracing::warn;

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

type InFlight = Shared<BoxFuture<'static, String>>;
type InFlightMap = Arc<Mutex<HashMap<String, InFlight>>>;

/// Resolves a content path to its body.
///
/// Lookup order: persistent cache, session cache, an identical request that
/// is already running, then a fresh fetch. A failed or timed out fetch falls
/// back to any stale copy, and finally to an empty body.
#[derive(Clone)]
pub struct ContentLoader {
    fetcher: Arc<dyn Fetch>,
    cache: Arc<ContentCache>,
    session: Arc<SessionCache>,
    in_flight: InFlightMap,
    timeout: Duration,
}

impl ContentLoader {
    pub fn new(fetcher: Arc<dyn Fetch>, cache: Arc<ContentCache>) -> Self {
        Self {
            fetcher,
            cache,
            session: Arc::new(SessionCache::default()),
            in_flight: Arc::default(),
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_session(mut self, session: Arc<SessionCache>) -> Self {
        self.session = session;
        self
    }

    pub fn cache(&self) -> &ContentCache {
        &self.cache
    }

    /// Body for `path`. Never fails; an unrecoverable miss is `""`.
    ///
    /// Must be called from within a Tokio runtime: the fetch runs as its own
    /// task so it completes even if every caller stops waiting.
    pub async fn load(&self, path: &str) -> String {
        if let Some(body) = self.cache.get(path) {
            debug!("content cache hit for {path}");
            return body;
        }
        if let Some(body) = self.session.get(path) {
            debug!("session cache hit for {path}");
            return body;
        }
        self.join_or_start(path).await
    }

    /// Load several paths concurrently. Results line up with `paths`.
    pub async fn load_many<S: AsRef<str>>(&self, paths: &[S]) -> Vec<String> {
        join_all(paths.iter().map(|path| self.load(path.as_ref()))).await
    }

    /// Number of fetches currently running.
    pub fn pending(&self) -> usize {
        lock(&self.in_flight).len()
    }

    fn join_or_start(&self, path: &str) -> InFlight {
        let mut in_flight = lock(&self.in_flight);
        if let Some(existing) = in_flight.get(path) {
            debug!("joining in-flight load of {path}");
            return existing.clone();
        }
        // A load that finished since the tier checks has already filled the
        // session cache.
        if let Some(body) = self.session.get(path) {
            return futures::future::ready(body).boxed().shared();
        }

        let task = tokio::spawn(fetch_and_store(
            Arc::clone(&self.fetcher),
            Arc::clone(&self.cache),
            Arc::clone(&self.session),
            Arc::clone(&self.in_flight),
            path.to_string(),
            self.timeout,
        ));
        let owned_path = path.to_string();
        let shared = async move {
            match task.await {
                Ok(body) => body,
                Err(err) => {
                    warn!("load of {owned_path} aborted: {err}");
                    String::new()
                }
            }
        }
        .boxed()
        .shared();
        in_flight.insert(path.to_string(), shared.clone());
        shared
    }
}

async fn fetch_and_store(
    fetcher: Arc<dyn Fetch>,
    cache: Arc<ContentCache>,
    session: Arc<SessionCache>,
    in_flight: InFlightMap,
    path: String,
    timeout: Duration,
) -> String {
    let _registration = InFlightGuard {
        in_flight,
        path: path.clone(),
    };
    let outcome = match tokio::time::timeout(timeout, fetcher.fetch(&path)).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout(timeout)),
    };
    match outcome {
        Ok(text) => {
            let body = cache.normalize(&text).into_owned();
            cache.put_normalized(&path, &body);
            cache.evict_if_over_capacity();
            session.put(&path, body.clone());
            body
        }
        Err(err) => {
            warn!("failed to load {path}: {err}");
            match cache.get_stale(&path) {
                Some(stale) => {
                    debug!("serving stale body for {path}");
                    stale
                }
                None => String::new(),
            }
        }
    }
}

/// Drops the registry entry for `path` however the fetch task ends,
/// including a panic or runtime shutdown.
struct InFlightGuard {
    in_flight: InFlightMap,
    path: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        lock(&self.in_flight).remove(&self.path);
    }
}

fn lock(in_flight: &InFlightMap) -> MutexGuard<'_, HashMap<String, InFlight>> {
    match in_flight.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
