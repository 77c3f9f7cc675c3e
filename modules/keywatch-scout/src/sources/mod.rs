// Source adapters: fetched payload → normalized KeyHit records.
//
// Two families share the one KeyMatcher: feed-style (Reddit listings, with
// per-item timestamps and nested comments) and document-style (forum pages,
// scanned whole with the run clock as discovery time).

pub mod forum;
pub mod reddit;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use keywatch_common::KeyHit;

use crate::fetcher::Fetcher;
use crate::matcher::KeyMatcher;
use crate::recency::RecencyWindow;

pub use forum::ForumSource;
pub use reddit::RedditSource;

/// What one adapter invocation produced: the records it accumulated plus
/// any per-item failures it swallowed along the way.
#[derive(Debug, Default)]
pub struct ScrapeOutput {
    pub hits: Vec<KeyHit>,
    pub errors: Vec<String>,
}

/// A scannable source. `scrape` never fails as a whole: fetch and parse
/// problems are recorded in the output and whatever was accumulated so far
/// is returned, so one bad source cannot sink a run.
#[async_trait]
pub trait Source: Send + Sync {
    fn name(&self) -> String;

    async fn scrape(
        &self,
        fetcher: &dyn Fetcher,
        matcher: &KeyMatcher,
        window: &RecencyWindow,
        now: DateTime<Utc>,
    ) -> ScrapeOutput;
}
