use crate::error::FetchError;
use async_trait::async_trait;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;
use url::Url;

const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Source of raw document bodies.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, path: &str) -> Result<String, FetchError>;
}

/// Reads bodies relative to a content root on disk.
#[derive(Debug, Clone)]
pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, FetchError> {
        let relative = Path::new(path.trim_start_matches('/'));
        let mut resolved = self.root.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(FetchError::InvalidPath(path.to_string()));
                }
            }
        }
        if resolved == self.root {
            return Err(FetchError::InvalidPath(path.to_string()));
        }
        Ok(resolved)
    }
}

#[async_trait]
impl Fetch for FsFetcher {
    async fn fetch(&self, path: &str) -> Result<String, FetchError> {
        let resolved = self.resolve(path)?;
        debug!("reading {}", resolved.display());
        let bytes = tokio::fs::read(&resolved).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Fetches bodies over HTTP relative to a base URL.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpFetcher {
    pub fn new(base_url: Url) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: reqwest::Client, mut base_url: Url) -> Self {
        // Without a trailing slash `join` would replace the last segment.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self { http, base_url }
    }

    fn url_for(&self, path: &str) -> Result<Url, FetchError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|err| FetchError::InvalidPath(format!("{path}: {err}")))
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, path: &str) -> Result<String, FetchError> {
        let url = self.url_for(path)?;
        debug!("GET {url}");
        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status,
                url: url.to_string(),
            });
        }
        Ok(response.text().await?)
    }
}
