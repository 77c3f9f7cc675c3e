use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use spider_transformations::transformation::content::{
    transform_content_input, ReturnFormat, TransformConfig, TransformInput,
};
use tracing::{info, warn};

use keywatch_common::KeyHit;

use crate::fetcher::Fetcher;
use crate::matcher::KeyMatcher;
use crate::recency::RecencyWindow;
use crate::sources::{ScrapeOutput, Source};

/// Known forum hosts, matched by URL substring. Unmapped URLs fall through
/// to the generic label.
const FORUM_LABELS: &[(&str, &str)] = &[
    ("cs.rin.ru", "cs.rin.ru"),
    ("nulled.to", "nulled.to"),
    ("pirates-forum.org", "suprbay"),
    ("mpgh.net", "mpgh.net"),
    ("nullforums.net", "nullforums.net"),
    ("mydigitallife", "mydigitallife"),
    ("serials.ws", "serials.ws"),
    ("cracked.to", "cracked.to"),
    ("mobilism", "mobilism"),
];

pub const GENERIC_FORUM_LABEL: &str = "forum";

/// Short source label for a forum URL.
pub fn forum_label(url: &str) -> &'static str {
    FORUM_LABELS
        .iter()
        .find(|(needle, _)| url.contains(needle))
        .map(|(_, label)| *label)
        .unwrap_or(GENERIC_FORUM_LABEL)
}

/// Document-style adapter: one page, scanned whole.
///
/// Forum pages carry no per-item timestamp, so records are stamped with the
/// run clock and the recency window does not apply.
pub struct ForumSource {
    url: String,
}

impl ForumSource {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
        }
    }

    /// Reduce raw HTML to readable text. Keys posted in markup-heavy threads
    /// survive Readability extraction since they are plain inline text.
    fn page_text(&self, html: &str) -> String {
        let parsed_url = url::Url::parse(&self.url).ok();
        let config = TransformConfig {
            readability: true,
            main_content: true,
            return_format: ReturnFormat::Markdown,
            filter_images: true,
            filter_svg: true,
            clean_html: true,
        };
        let input = TransformInput {
            url: parsed_url.as_ref(),
            content: html.as_bytes(),
            screenshot_bytes: None,
            encoding: None,
            selector_config: None,
            ignore_tags: None,
        };

        transform_content_input(input, &config)
    }
}

#[async_trait]
impl Source for ForumSource {
    fn name(&self) -> String {
        forum_label(&self.url).to_string()
    }

    async fn scrape(
        &self,
        fetcher: &dyn Fetcher,
        matcher: &KeyMatcher,
        _window: &RecencyWindow,
        now: DateTime<Utc>,
    ) -> ScrapeOutput {
        let mut out = ScrapeOutput::default();

        let html = match fetcher.get_text(&self.url).await {
            Ok(body) => body,
            Err(e) => {
                warn!(url = self.url.as_str(), error = %e, "Forum fetch failed");
                out.errors.push(format!("{}: fetch failed: {e:#}", self.name()));
                return out;
            }
        };

        let text = self.page_text(&html);
        if text.trim().is_empty() {
            warn!(url = self.url.as_str(), "Empty content after extraction");
            return out;
        }

        let label = forum_label(&self.url);
        let mut seen = HashSet::new();

        for m in matcher.extract(&text) {
            if seen.insert(m.code.clone()) {
                out.hits.push(KeyHit {
                    key: m.code,
                    source_type: label.to_string(),
                    source_url: self.url.clone(),
                    context: m.context,
                    found_at: now,
                });
            }
        }

        info!(url = self.url.as_str(), hits = out.hits.len(), "Forum scrape complete");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_hosts_map_to_short_labels() {
        assert_eq!(forum_label("https://www.nulled.to/topic/1"), "nulled.to");
        assert_eq!(forum_label("https://pirates-forum.org/"), "suprbay");
        assert_eq!(forum_label("https://forum.mobilism.org/x"), "mobilism");
        assert_eq!(forum_label("https://cs.rin.ru/forum/"), "cs.rin.ru");
    }

    #[test]
    fn unknown_hosts_get_the_generic_label() {
        assert_eq!(forum_label("https://example.com/board"), GENERIC_FORUM_LABEL);
    }
}
