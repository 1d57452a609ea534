use crate::error::StoreError;
use crate::store::ContentStore;
use once_cell::sync::Lazy;
use percent_encoding::NON_ALPHANUMERIC;
use percent_encoding::percent_decode_str;
use percent_encoding::utf8_percent_encode;
use regex_lite::Regex;
use serde::Deserialize;
use serde::Serialize;
use std::borrow::Cow;
use std::cmp::Reverse;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;
use tracing::debug;
use tracing::warn;

/// Prefix shared by every key this cache owns inside a store.
const KEY_PREFIX: &str = "md_content_";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of cached bodies.
    pub capacity: usize,
    /// Bodies longer than this many characters are normalized before storing.
    pub large_body_threshold: usize,
    /// Length in characters of the prefix stored when a full body is rejected.
    pub truncated_len: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 20,
            large_body_threshold: 100_000,
            truncated_len: 50_000,
        }
    }
}

/// Summary of one cached record, for inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntryInfo {
    pub path: String,
    pub chars: usize,
    pub last_access: u64,
    pub truncated: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheRecord {
    value: String,
    last_access: u64,
    #[serde(default)]
    truncated: bool,
}

/// Bounded cache of document bodies keyed by content path.
///
/// Nothing here returns an error. A store that cannot be read behaves as a
/// miss and a store that cannot be written behaves as a no-op.
pub struct ContentCache {
    store: Mutex<Box<dyn ContentStore>>,
    config: CacheConfig,
    clock: AtomicU64,
}

/// Store key for a content path. Distinct paths always map to distinct keys.
pub fn cache_key(path: &str) -> String {
    format!("{KEY_PREFIX}{}", utf8_percent_encode(path, NON_ALPHANUMERIC))
}

fn path_from_key(key: &str) -> Option<String> {
    let encoded = key.strip_prefix(KEY_PREFIX)?;
    percent_decode_str(encoded)
        .decode_utf8()
        .ok()
        .map(Cow::into_owned)
}

impl ContentCache {
    /// Wrap a store and trim it to capacity.
    pub fn new(store: Box<dyn ContentStore>, config: CacheConfig) -> Self {
        let cache = Self::untrimmed(store, config);
        cache.evict_if_over_capacity();
        cache
    }

    /// Wrap a store as it is, even if it holds more than `capacity` bodies.
    pub fn untrimmed(store: Box<dyn ContentStore>, config: CacheConfig) -> Self {
        Self {
            store: Mutex::new(store),
            config,
            clock: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> CacheConfig {
        self.config
    }

    /// Full, untruncated body for `path`, refreshing its access time.
    pub fn get(&self, path: &str) -> Option<String> {
        let key = cache_key(path);
        let store = self.lock();
        let record = self.read_record(&**store, &key)?;
        if record.truncated {
            return None;
        }
        let refreshed = CacheRecord {
            last_access: self.tick(),
            ..record
        };
        if let Err(err) = write_record(&**store, &key, &refreshed) {
            debug!("content cache could not refresh {path}: {err}");
        }
        Some(refreshed.value)
    }

    /// Any stored body for `path`, truncated or not, also trying the path
    /// with and without a leading `/`. Used when a fetch has failed.
    pub fn get_stale(&self, path: &str) -> Option<String> {
        let store = self.lock();
        related_paths(path).into_iter().find_map(|candidate| {
            self.read_record(&**store, &cache_key(&candidate))
                .map(|record| record.value)
        })
    }

    /// Store a body. Large bodies are normalized first; a body the store
    /// refuses is retried as a truncated prefix; a second refusal is dropped.
    pub fn put(&self, path: &str, text: &str) {
        let body = self.normalize(text);
        self.put_normalized(path, &body);
    }

    /// Size-reduction applied to bodies over the large-body threshold.
    /// The same transform is applied whether or not the body ends up cached.
    pub fn normalize<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if text.chars().count() <= self.config.large_body_threshold {
            return Cow::Borrowed(text);
        }
        Cow::Owned(normalize_large_body(text))
    }

    pub(crate) fn put_normalized(&self, path: &str, body: &str) {
        let key = cache_key(path);
        let store = self.lock();
        let record = CacheRecord {
            value: body.to_string(),
            last_access: self.tick(),
            truncated: false,
        };
        let err = match write_record(&**store, &key, &record) {
            Ok(()) => return,
            Err(err) => err,
        };
        if matches!(err, StoreError::Unavailable(_))
            || body.chars().count() <= self.config.truncated_len
        {
            warn!("content cache dropped {path}: {err}");
            return;
        }
        let prefix: String = body.chars().take(self.config.truncated_len).collect();
        let truncated = CacheRecord {
            value: prefix,
            last_access: record.last_access,
            truncated: true,
        };
        match write_record(&**store, &key, &truncated) {
            Ok(()) => debug!(
                "content cache stored truncated body for {path} after: {err}"
            ),
            Err(retry_err) => warn!("content cache dropped {path}: {retry_err}"),
        }
    }

    /// Remove least recently accessed bodies until at most `capacity` remain.
    /// Returns how many were removed.
    pub fn evict_if_over_capacity(&self) -> usize {
        let store = self.lock();
        let mut entries = self.scan(&**store);
        if entries.len() <= self.config.capacity {
            return 0;
        }
        entries.sort_by_key(|(_, last_access)| *last_access);
        let excess = entries.len() - self.config.capacity;
        let mut removed = 0;
        for (key, _) in entries.into_iter().take(excess) {
            match store.remove(&key) {
                Ok(()) => {
                    debug!("content cache evicted {key}");
                    removed += 1;
                }
                Err(err) => warn!("content cache failed to evict {key}: {err}"),
            }
        }
        removed
    }

    /// Cached records, most recently accessed first.
    pub fn entries(&self) -> Vec<CacheEntryInfo> {
        let store = self.lock();
        let keys = match store.keys() {
            Ok(keys) => keys,
            Err(err) => {
                debug!("content cache unavailable: {err}");
                return Vec::new();
            }
        };
        let mut entries: Vec<CacheEntryInfo> = keys
            .iter()
            .filter_map(|key| {
                let path = path_from_key(key)?;
                let record = self.read_record(&**store, key)?;
                Some(CacheEntryInfo {
                    path,
                    chars: record.value.chars().count(),
                    last_access: record.last_access,
                    truncated: record.truncated,
                })
            })
            .collect();
        entries.sort_by_key(|entry| Reverse(entry.last_access));
        entries
    }

    /// Drop every body this cache owns. Returns how many were removed.
    pub fn clear(&self) -> usize {
        let store = self.lock();
        let keys = match store.keys() {
            Ok(keys) => keys,
            Err(err) => {
                warn!("content cache unavailable: {err}");
                return 0;
            }
        };
        let mut removed = 0;
        for key in keys.iter().filter(|key| key.starts_with(KEY_PREFIX)) {
            match store.remove(key) {
                Ok(()) => removed += 1,
                Err(err) => warn!("content cache failed to remove {key}: {err}"),
            }
        }
        removed
    }

    /// Owned keys with their access stamps. Unreadable records sort first.
    fn scan(&self, store: &dyn ContentStore) -> Vec<(String, u64)> {
        let keys = match store.keys() {
            Ok(keys) => keys,
            Err(err) => {
                debug!("content cache unavailable: {err}");
                return Vec::new();
            }
        };
        keys.into_iter()
            .filter(|key| key.starts_with(KEY_PREFIX))
            .map(|key| {
                let last_access = self
                    .read_record(store, &key)
                    .map_or(0, |record| record.last_access);
                (key, last_access)
            })
            .collect()
    }

    fn read_record(&self, store: &dyn ContentStore, key: &str) -> Option<CacheRecord> {
        let raw = match store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                debug!("content cache read of {key} failed: {err}");
                return None;
            }
        };
        match serde_json::from_str::<CacheRecord>(&raw) {
            Ok(record) => {
                // Keep stamps issued by earlier sessions behind ours.
                self.clock.fetch_max(record.last_access, Ordering::SeqCst);
                Some(record)
            }
            Err(err) => {
                debug!("content cache record {key} is malformed: {err}");
                None
            }
        }
    }

    /// Next access stamp: wall-clock milliseconds, strictly increasing.
    fn tick(&self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_millis() as u64);
        let previous = self
            .clock
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last.saturating_add(1)))
            })
            .unwrap_or_else(|last| last);
        now.max(previous.saturating_add(1))
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn ContentStore>> {
        match self.store.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

fn write_record(
    store: &dyn ContentStore,
    key: &str,
    record: &CacheRecord,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(record)?;
    store.set(key, &raw)
}

/// The path as given, without a leading `/`, and with one.
fn related_paths(path: &str) -> Vec<String> {
    let bare = path.trim_start_matches('/');
    let mut paths = vec![path.to_string()];
    for candidate in [bare.to_string(), format!("/{bare}")] {
        if !paths.contains(&candidate) {
            paths.push(candidate);
        }
    }
    paths
}

fn compile_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|err| panic!("invalid regex literal {pattern}: {err}"))
}

/// Strip HTML comments and collapse runs of blank lines to one blank line.
pub(crate) fn normalize_large_body(text: &str) -> String {
    static COMMENT_REGEX: Lazy<Regex> = Lazy::new(|| compile_regex(r"(?s)<!--.*?-->"));
    static BLANK_RUN_REGEX: Lazy<Regex> = Lazy::new(|| compile_regex(r"\n(?:[ \t]*\n){2,}"));

    let stripped = COMMENT_REGEX.replace_all(text, "");
    BLANK_RUN_REGEX.replace_all(&stripped, "\n\n").into_owned()
}
