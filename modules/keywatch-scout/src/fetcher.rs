use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use keywatch_common::KeyWatchError;

/// Reddit's JSON endpoints reject the default reqwest agent.
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// All network reads go through this seam so sources can be exercised with
/// canned payloads. Any failure (timeout, non-2xx, network error) is an
/// error the caller treats as "no data from this source this round".
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn get_text(&self, url: &str) -> Result<String>;
    async fn get_json(&self, url: &str) -> Result<serde_json::Value>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .expect("Failed to build HTTP client");
        Self { client }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get_text(&self, url: &str) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| KeyWatchError::Fetch(format!("request failed for {url}: {e}")))?
            .error_for_status()
            .map_err(|e| KeyWatchError::Fetch(format!("non-success status for {url}: {e}")))?;

        let body = resp
            .text()
            .await
            .map_err(|e| KeyWatchError::Fetch(format!("failed to read body for {url}: {e}")))?;

        info!(url, bytes = body.len(), "Fetched page");
        Ok(body)
    }

    async fn get_json(&self, url: &str) -> Result<serde_json::Value> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| KeyWatchError::Fetch(format!("request failed for {url}: {e}")))?
            .error_for_status()
            .map_err(|e| KeyWatchError::Fetch(format!("non-success status for {url}: {e}")))?;

        let value = resp
            .json()
            .await
            .map_err(|e| KeyWatchError::Parse(format!("invalid JSON from {url}: {e}")))?;
        Ok(value)
    }
}
