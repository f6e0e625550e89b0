//! Feed sources for the raw CIDR list.
//!
//! The remote list is fetched once per run; there is no retry. Any transport
//! problem (network error, timeout, non-2xx status, oversized body) becomes an
//! [`IpGroupError::Fetch`] and the run stops before anything is written.

use async_trait::async_trait;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::IpGroupError;

/// Maximum size of a downloaded list (10 MB)
/// The China list is around 200 KB, so 10 MB leaves ample margin
pub const MAX_FEED_SIZE: usize = 10 * 1024 * 1024;

/// Anything that can produce the raw list text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Human-readable origin, used in logs and errors.
    fn describe(&self) -> String;

    /// Return the complete feed text.
    async fn fetch(&self) -> Result<String, IpGroupError>;
}

/// HTTP(S) feed, single attempt with a bounded wait.
pub struct HttpSource {
    client: Client,
    url: String,
    max_size: usize,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, IpGroupError> {
        let url = url.into();
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("ikuai-ipgroup/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| IpGroupError::Fetch {
                source_name: url.clone(),
                reason: format!("Failed to create HTTP client: {}", e),
            })?;
        Ok(Self {
            client,
            url,
            max_size: MAX_FEED_SIZE,
        })
    }

    /// Override the body size limit.
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    fn error(&self, reason: impl Into<String>) -> IpGroupError {
        IpGroupError::Fetch {
            source_name: self.url.clone(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl FeedSource for HttpSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> Result<String, IpGroupError> {
        info!("Downloading IP list from {}...", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.error(format!("HTTP {}", status)));
        }

        if let Some(content_length) = response.content_length() {
            if content_length > self.max_size as u64 {
                return Err(self.error(format!(
                    "Response too large: {} bytes (max: {} bytes)",
                    content_length, self.max_size
                )));
            }
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.error(format!("Failed to read response body: {}", e)))?;

        // Content-Length may be absent (chunked encoding)
        if body.len() > self.max_size {
            return Err(self.error(format!(
                "Downloaded content too large: {} bytes (max: {} bytes)",
                body.len(),
                self.max_size
            )));
        }

        info!("Download succeeded, HTTP {}", status.as_u16());
        debug!("Received {} bytes", body.len());

        Ok(body)
    }
}

/// Local file feed, for offline runs and checking a saved list.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl FeedSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<String, IpGroupError> {
        info!("Reading IP list from {}...", self.path.display());
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| IpGroupError::Fetch {
                source_name: self.describe(),
                reason: e.to_string(),
            })
    }
}
