// Test mocks for the scrape pipeline.
//
// MockFetcher replaces HttpFetcher behind the Fetcher trait: HashMap-based
// URL → canned response, plus a set of URLs that fail on demand to exercise
// the per-source isolation paths. No network, `cargo test` in seconds.

use std::collections::{HashMap, HashSet};

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::fetcher::Fetcher;

/// Canned-response fetcher. Returns `Err` for unregistered URLs.
/// Builder pattern: `.on_text()`, `.on_json()`, `.failing()`.
#[derive(Default)]
pub struct MockFetcher {
    texts: HashMap<String, String>,
    jsons: HashMap<String, serde_json::Value>,
    failing: HashSet<String>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_text(mut self, url: &str, body: &str) -> Self {
        self.texts.insert(url.to_string(), body.to_string());
        self
    }

    pub fn on_json(mut self, url: &str, value: serde_json::Value) -> Self {
        self.jsons.insert(url.to_string(), value);
        self
    }

    /// Make any request to `url` fail, as a timed-out fetch would.
    pub fn failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn get_text(&self, url: &str) -> Result<String> {
        if self.failing.contains(url) {
            bail!("connection timed out for {url}");
        }
        match self.texts.get(url) {
            Some(body) => Ok(body.clone()),
            None => bail!("no canned text response for {url}"),
        }
    }

    async fn get_json(&self, url: &str) -> Result<serde_json::Value> {
        if self.failing.contains(url) {
            bail!("connection timed out for {url}");
        }
        match self.jsons.get(url) {
            Some(value) => Ok(value.clone()),
            None => bail!("no canned JSON response for {url}"),
        }
    }
}
