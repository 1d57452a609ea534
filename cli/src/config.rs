use anyhow::Context;
use anyhow::Result;
use docshelf_content::CacheConfig;
use docshelf_search::MAX_HEADING_LEVEL;
use docshelf_search::SessionOptions;
use serde::Deserialize;
use serde::Serialize;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// File read from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "docshelf.toml";

/// Configuration for the documentation browser
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocshelfConfig {
    #[serde(default)]
    pub dataset: DatasetConfig,

    #[serde(default)]
    pub content: ContentConfig,

    #[serde(default)]
    pub cache: CacheSection,

    #[serde(default)]
    pub loader: LoaderConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub toc: TocConfig,

    #[serde(default)]
    pub render: RenderConfig,

    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// JSON document describing roles and categories
    #[serde(default = "default_dataset_path")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Directory document paths are resolved against
    #[serde(default = "default_content_root")]
    pub root: PathBuf,

    /// Fetch bodies over HTTP from here instead of reading `root`
    #[serde(default)]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheSection {
    /// Directory of the persistent body cache
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,

    /// Maximum number of cached bodies
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,

    /// Bodies longer than this (in characters) are normalized before caching
    #[serde(default = "default_large_body_threshold")]
    pub large_body_threshold: usize,

    /// Prefix length kept when a full body cannot be stored
    #[serde(default = "default_truncated_len")]
    pub truncated_len: usize,

    /// Bodies kept in memory for the lifetime of the process
    #[serde(default = "default_session_capacity")]
    pub session_capacity: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderConfig {
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Quiet time before a changed query is matched
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Deepest heading level matched by search
    #[serde(default = "default_search_heading_level")]
    pub heading_max_level: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TocConfig {
    #[serde(default = "default_toc_level")]
    pub max_level: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Characters shown by `show --preview`
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// `tracing` filter used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_dataset_path() -> PathBuf {
    PathBuf::from("public/data.json")
}

fn default_content_root() -> PathBuf {
    PathBuf::from("public")
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(".docshelf/cache")
}

fn default_cache_capacity() -> usize {
    CacheConfig::default().capacity
}

fn default_large_body_threshold() -> usize {
    CacheConfig::default().large_body_threshold
}

fn default_truncated_len() -> usize {
    CacheConfig::default().truncated_len
}

fn default_session_capacity() -> usize {
    128
}

fn default_fetch_timeout_ms() -> u64 {
    10_000
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_search_heading_level() -> u8 {
    2
}

fn default_toc_level() -> u8 {
    MAX_HEADING_LEVEL
}

fn default_preview_chars() -> usize {
    docshelf_markdown::DEFAULT_PREVIEW_CHARS
}

fn default_log_filter() -> String {
    "warn".to_string()
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: default_dataset_path(),
        }
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            root: default_content_root(),
            base_url: None,
        }
    }
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
            capacity: default_cache_capacity(),
            large_body_threshold: default_large_body_threshold(),
            truncated_len: default_truncated_len(),
            session_capacity: default_session_capacity(),
        }
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: default_fetch_timeout_ms(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            heading_max_level: default_search_heading_level(),
        }
    }
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            max_level: default_toc_level(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            preview_chars: default_preview_chars(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl DocshelfConfig {
    /// Load from `path`, or from `./docshelf.toml` when present, then apply
    /// `DOCSHELF_*` environment overrides and validate.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate().map_err(anyhow::Error::msg)?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml(&contents).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Apply overrides looked up through `var`, normally the process
    /// environment. Empty values are ignored.
    pub fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        let var = |key: &str| var(key).filter(|value| !value.trim().is_empty());
        if let Some(path) = var("DOCSHELF_DATASET") {
            self.dataset.path = PathBuf::from(path);
        }
        if let Some(root) = var("DOCSHELF_CONTENT_ROOT") {
            self.content.root = PathBuf::from(root);
        }
        if let Some(base_url) = var("DOCSHELF_BASE_URL") {
            self.content.base_url = Some(base_url);
        }
        if let Some(dir) = var("DOCSHELF_CACHE_DIR") {
            self.cache.dir = PathBuf::from(dir);
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.cache.capacity == 0 {
            return Err("cache.capacity must be > 0".to_string());
        }

        if self.cache.truncated_len > self.cache.large_body_threshold {
            return Err(format!(
                "cache.truncated_len ({}) must not exceed cache.large_body_threshold ({})",
                self.cache.truncated_len, self.cache.large_body_threshold
            ));
        }

        if self.loader.fetch_timeout_ms == 0 {
            return Err("loader.fetch_timeout_ms must be > 0".to_string());
        }

        for (name, level) in [
            ("search.heading_max_level", self.search.heading_max_level),
            ("toc.max_level", self.toc.max_level),
        ] {
            if !(1..=MAX_HEADING_LEVEL).contains(&level) {
                return Err(format!(
                    "{name} must be between 1 and {MAX_HEADING_LEVEL}, got {level}"
                ));
            }
        }

        if let Some(base_url) = &self.content.base_url {
            Url::parse(base_url).map_err(|err| format!("content.base_url {base_url}: {err}"))?;
        }

        Ok(())
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            capacity: self.cache.capacity,
            large_body_threshold: self.cache.large_body_threshold,
            truncated_len: self.cache.truncated_len,
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.loader.fetch_timeout_ms)
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            debounce: Duration::from_millis(self.search.debounce_ms),
            heading_max_level: self.search.heading_max_level,
        }
    }
}
