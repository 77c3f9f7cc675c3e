use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{info, warn};

use keywatch_common::KeyHit;

use crate::fetcher::Fetcher;
use crate::matcher::KeyMatcher;
use crate::recency::RecencyWindow;
use crate::sources::{ScrapeOutput, Source};

const LISTING_LIMIT: u32 = 100;
const COMMENTS_LIMIT: u32 = 50;

// --- Reddit JSON listing shapes (unauthenticated .json endpoints) ---

#[derive(Debug, Default, Deserialize)]
struct Listing {
    #[serde(default)]
    data: ListingData,
}

#[derive(Debug, Default, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Thing>,
}

#[derive(Debug, Default, Deserialize)]
struct Thing {
    #[serde(default)]
    data: ItemData,
}

/// One field set covers both posts and comments: posts carry title/selftext,
/// comments carry body. Missing fields default to empty.
#[derive(Debug, Default, Deserialize)]
struct ItemData {
    #[serde(default)]
    title: String,
    #[serde(default)]
    selftext: String,
    #[serde(default)]
    body: String,
    #[serde(default)]
    permalink: String,
    #[serde(default)]
    created_utc: f64,
    #[serde(default)]
    num_comments: u32,
}

impl ItemData {
    fn created(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.created_utc as i64, 0)
    }
}

/// Feed-style adapter for one subreddit's /new listing.
///
/// A stale post is skipped together with its comments unless
/// `scan_stale_post_comments` is set; each comment is then still checked
/// against its own timestamp.
pub struct RedditSource {
    subreddit: String,
    scan_stale_post_comments: bool,
}

impl RedditSource {
    pub fn new(subreddit: &str, scan_stale_post_comments: bool) -> Self {
        Self {
            subreddit: subreddit.to_string(),
            scan_stale_post_comments,
        }
    }

    fn source_type(&self) -> String {
        format!("reddit-{}", self.subreddit)
    }

    fn collect(
        &self,
        matcher: &KeyMatcher,
        text: &str,
        permalink: &str,
        found_at: DateTime<Utc>,
        seen: &mut HashSet<String>,
        out: &mut ScrapeOutput,
    ) {
        for m in matcher.extract(text) {
            // Local to this adapter invocation only. Cross-run uniqueness
            // is the store's job.
            if seen.insert(m.code.clone()) {
                out.hits.push(KeyHit {
                    key: m.code,
                    source_type: self.source_type(),
                    source_url: format!("https://reddit.com{permalink}"),
                    context: m.context,
                    found_at,
                });
            }
        }
    }

    async fn scrape_comments(
        &self,
        fetcher: &dyn Fetcher,
        matcher: &KeyMatcher,
        window: &RecencyWindow,
        post_permalink: &str,
        seen: &mut HashSet<String>,
        out: &mut ScrapeOutput,
    ) {
        let url = format!(
            "https://www.reddit.com{post_permalink}.json?limit={COMMENTS_LIMIT}"
        );

        let value = match fetcher.get_json(&url).await {
            Ok(v) => v,
            Err(e) => {
                warn!(url = url.as_str(), error = %e, "Comment fetch failed, skipping");
                out.errors.push(format!("{}: comment fetch failed: {e:#}", self.name()));
                return;
            }
        };

        // The payload is a two-element array: [post listing, comment listing].
        let listings: Vec<Listing> = match serde_json::from_value(value) {
            Ok(l) => l,
            Err(e) => {
                warn!(url = url.as_str(), error = %e, "Malformed comment payload, skipping");
                out.errors
                    .push(format!("{}: comment parse failed: {e}", self.name()));
                return;
            }
        };

        let Some(comments) = listings.into_iter().nth(1) else {
            return;
        };

        for thing in comments.data.children {
            let comment = thing.data;
            let Some(comment_time) = comment.created() else {
                continue;
            };
            if !window.is_recent(comment_time) {
                continue;
            }
            self.collect(
                matcher,
                &comment.body,
                &comment.permalink,
                comment_time,
                seen,
                out,
            );
        }
    }
}

#[async_trait]
impl Source for RedditSource {
    fn name(&self) -> String {
        self.source_type()
    }

    async fn scrape(
        &self,
        fetcher: &dyn Fetcher,
        matcher: &KeyMatcher,
        window: &RecencyWindow,
        _now: DateTime<Utc>,
    ) -> ScrapeOutput {
        let mut out = ScrapeOutput::default();
        let mut seen = HashSet::new();

        let url = format!(
            "https://www.reddit.com/r/{}/new.json?limit={LISTING_LIMIT}",
            self.subreddit
        );

        let value = match fetcher.get_json(&url).await {
            Ok(v) => v,
            Err(e) => {
                warn!(subreddit = self.subreddit.as_str(), error = %e, "Listing fetch failed");
                out.errors.push(format!("{}: listing fetch failed: {e:#}", self.name()));
                return out;
            }
        };

        let listing: Listing = match serde_json::from_value(value) {
            Ok(l) => l,
            Err(e) => {
                warn!(subreddit = self.subreddit.as_str(), error = %e, "Malformed listing payload");
                out.errors
                    .push(format!("{}: listing parse failed: {e}", self.name()));
                return out;
            }
        };

        for thing in listing.data.children {
            let post = thing.data;
            let Some(post_time) = post.created() else {
                continue;
            };

            let post_recent = window.is_recent(post_time);
            if !post_recent && !self.scan_stale_post_comments {
                // Default policy: a stale parent takes its comments with it.
                continue;
            }

            if post_recent {
                let text = format!("{} {}", post.title, post.selftext);
                self.collect(matcher, &text, &post.permalink, post_time, &mut seen, &mut out);
            }

            if post.num_comments > 0 {
                self.scrape_comments(
                    fetcher,
                    matcher,
                    window,
                    &post.permalink,
                    &mut seen,
                    &mut out,
                )
                .await;
            }
        }

        info!(
            subreddit = self.subreddit.as_str(),
            hits = out.hits.len(),
            "Subreddit scrape complete"
        );
        out
    }
}
