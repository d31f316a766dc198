use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::Client;
use shared::{LoadError, Record};
use tracing::debug;
use url::Url;

/// Source of raw dataset documents.
#[async_trait]
pub trait DatasetFetcher: Send + Sync {
    async fn fetch(&self, location: &str) -> Result<Vec<Record>, LoadError>;
}

/// Decodes a dataset document: a JSON array of record objects.
pub fn decode_records(location: &str, bytes: &[u8]) -> Result<Vec<Record>, LoadError> {
    serde_json::from_slice(bytes).map_err(|e| LoadError::Malformed {
        location: location.to_string(),
        message: e.to_string(),
    })
}

#[derive(Clone, Default)]
pub struct HttpFetcher {
    http: Client,
    base_url: Option<Url>,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Relative locations are resolved against `base_url`, which is treated
    /// as a directory.
    pub fn with_base_url(mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            http: Client::new(),
            base_url: Some(base_url),
        }
    }

    fn resolve(&self, location: &str) -> Result<Url, LoadError> {
        if let Ok(url) = Url::parse(location) {
            return Ok(url);
        }
        let base = self.base_url.as_ref().ok_or_else(|| LoadError::Transport {
            location: location.to_string(),
            message: "relative location and no base url configured".to_string(),
        })?;
        base.join(location.trim_start_matches('/'))
            .map_err(|e| LoadError::Transport {
                location: location.to_string(),
                message: format!("invalid location: {e}"),
            })
    }
}

#[async_trait]
impl DatasetFetcher for HttpFetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<Record>, LoadError> {
        let url = self.resolve(location)?;
        debug!(%url, "fetching dataset over http");
        let transport = |e: reqwest::Error| LoadError::Transport {
            location: location.to_string(),
            message: e.to_string(),
        };

        let response = self.http.get(url).send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                location: location.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.bytes().await.map_err(transport)?;
        decode_records(location, &body)
    }
}

/// Reads dataset documents from a local data directory.
#[derive(Debug, Clone)]
pub struct FileFetcher {
    root: PathBuf,
}

impl FileFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl DatasetFetcher for FileFetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<Record>, LoadError> {
        let path = self.root.join(location.trim_start_matches('/'));
        debug!(path = %path.display(), "reading dataset from disk");
        let bytes = tokio::fs::read(&path).await.map_err(|e| LoadError::Io {
            location: location.to_string(),
            message: e.to_string(),
        })?;
        decode_records(location, &bytes)
    }
}

/// Routes absolute `http(s)` locations to the network and everything else
/// to the data directory, when one is configured.
#[derive(Clone)]
pub struct SourceFetcher {
    http: HttpFetcher,
    files: Option<FileFetcher>,
}

impl SourceFetcher {
    pub fn new(http: HttpFetcher, files: Option<FileFetcher>) -> Self {
        Self { http, files }
    }
}

#[async_trait]
impl DatasetFetcher for SourceFetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<Record>, LoadError> {
        let is_remote = location.starts_with("http://") || location.starts_with("https://");
        match &self.files {
            Some(files) if !is_remote => files.fetch(location).await,
            _ => self.http.fetch(location).await,
        }
    }
}

#[cfg(test)]
#[path = "tests/fetch_tests.rs"]
mod tests;
