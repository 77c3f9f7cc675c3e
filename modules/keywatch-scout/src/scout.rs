use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use tracing::{error, info};
use uuid::Uuid;

use keywatch_common::Config;
use keywatch_store::KeyStore;

use crate::fetcher::{Fetcher, HttpFetcher};
use crate::matcher::KeyMatcher;
use crate::recency::RecencyWindow;
use crate::sources::{ForumSource, RedditSource, Source};

/// Concurrency exists only to overlap network waits; extraction itself is
/// synchronous and fast.
const MAX_CONCURRENT_SOURCES: usize = 4;

/// Terminal state of a run. Failed means the store went away mid-commit;
/// records committed before that point are individually durable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Committed,
    Failed,
}

#[derive(Debug)]
pub struct SourceCount {
    pub name: String,
    pub hits: u32,
}

/// Summary of one scrape run.
#[derive(Debug)]
pub struct RunStats {
    pub run_id: Uuid,
    pub outcome: RunOutcome,
    pub per_source: Vec<SourceCount>,
    /// Records extracted across all sources.
    pub keys_found: u32,
    /// Records newly committed to the store.
    pub new: u32,
    /// Records processed against the store, duplicates included.
    pub seen: u32,
    pub errors: Vec<String>,
    pub duration: Duration,
}

impl std::fmt::Display for RunStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Scrape Run Complete ===")?;
        writeln!(f, "Run:          {}", self.run_id)?;
        writeln!(f, "Outcome:      {:?}", self.outcome)?;
        writeln!(f, "Keys found:   {}", self.keys_found)?;
        writeln!(f, "New keys:     {}", self.new)?;
        writeln!(f, "Sightings:    {}", self.seen)?;
        writeln!(f, "Duration:     {:.1}s", self.duration.as_secs_f64())?;
        writeln!(f, "Per source:")?;
        for source in &self.per_source {
            writeln!(f, "  {}: {}", source.name, source.hits)?;
        }
        if !self.errors.is_empty() {
            writeln!(f, "Errors:")?;
            for err in &self.errors {
                writeln!(f, "  - {err}")?;
            }
        }
        Ok(())
    }
}

/// The run orchestrator: scrapes every configured source, merges the
/// results, and commits new keys to the store.
pub struct Scout {
    fetcher: Arc<dyn Fetcher>,
    store: Arc<dyn KeyStore>,
    matcher: KeyMatcher,
    sources: Vec<Box<dyn Source>>,
    lookback_hours: i64,
}

impl Scout {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        store: Arc<dyn KeyStore>,
        matcher: KeyMatcher,
        sources: Vec<Box<dyn Source>>,
        lookback_hours: i64,
    ) -> Self {
        Self {
            fetcher,
            store,
            matcher,
            sources,
            lookback_hours,
        }
    }

    /// Build a scout over HTTP from the configured subreddits and forums.
    pub fn from_config(config: &Config, store: Arc<dyn KeyStore>) -> Result<Self> {
        let matcher = KeyMatcher::new(&config.key_pattern)?;

        let mut sources: Vec<Box<dyn Source>> = Vec::new();
        for subreddit in &config.subreddits {
            sources.push(Box::new(RedditSource::new(
                subreddit,
                config.scan_stale_post_comments,
            )));
        }
        for forum_url in &config.forums {
            sources.push(Box::new(ForumSource::new(forum_url)));
        }

        Ok(Self::new(
            Arc::new(HttpFetcher::new()),
            store,
            matcher,
            sources,
            config.lookback_hours,
        ))
    }

    /// Run a full scrape cycle. Always reaches a terminal state; the next
    /// scheduled run is expected to re-discover and no-op on anything this
    /// one already stored.
    pub async fn run(&self) -> RunStats {
        let started = Instant::now();
        let run_id = Uuid::new_v4();
        // One clock reading for the whole run: recency cutoff and document
        // timestamps both derive from it.
        let now = Utc::now();
        let window = RecencyWindow::new(now, self.lookback_hours);

        info!(%run_id, sources = self.sources.len(), "Scrape run starting");

        let scrapes: Vec<_> = self
            .sources
            .iter()
            .map(|source| async move {
                let out = source
                    .scrape(self.fetcher.as_ref(), &self.matcher, &window, now)
                    .await;
                (source.name(), out)
            })
            .collect();
        let outputs: Vec<_> = stream::iter(scrapes)
            .buffer_unordered(MAX_CONCURRENT_SOURCES)
            .collect()
            .await;

        let mut stats = RunStats {
            run_id,
            outcome: RunOutcome::Committed,
            per_source: Vec::with_capacity(outputs.len()),
            keys_found: 0,
            new: 0,
            seen: 0,
            errors: Vec::new(),
            duration: Duration::ZERO,
        };

        let mut all_hits = Vec::new();
        for (name, output) in outputs {
            stats.per_source.push(SourceCount {
                name,
                hits: output.hits.len() as u32,
            });
            stats.errors.extend(output.errors);
            all_hits.extend(output.hits);
        }
        stats.keys_found = all_hits.len() as u32;

        // Each store_if_new is a complete, independent unit: stopping here
        // mid-way leaves a valid subset committed.
        for hit in &all_hits {
            match self.store.store_if_new(hit).await {
                Ok(true) => {
                    info!(
                        key = hit.key.as_str(),
                        source = hit.source_type.as_str(),
                        "New key stored"
                    );
                    stats.new += 1;
                    stats.seen += 1;
                }
                Ok(false) => stats.seen += 1,
                Err(e) => {
                    error!(error = %e, "Key store unavailable, abandoning run");
                    stats.errors.push(format!("store unavailable: {e:#}"));
                    stats.outcome = RunOutcome::Failed;
                    break;
                }
            }
        }

        stats.duration = started.elapsed();
        stats
    }
}
