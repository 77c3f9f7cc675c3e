use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One observation of a candidate key code.
///
/// Created by a source adapter for every match found during a run, then
/// either committed to the store (first sighting) or dropped as a duplicate.
/// `key` is the dedup identity; equality is exact string match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyHit {
    /// The 29-character code itself.
    pub key: String,
    /// Originating site tag, e.g. `reddit-PiratedGames` or `nulled.to`.
    pub source_type: String,
    /// Permalink of the post, comment, or page where the code was found.
    pub source_url: String,
    /// Surrounding text for human verification, whitespace-normalized,
    /// at most 200 characters plus a `...` marker.
    pub context: String,
    /// Creation time of the underlying content, not the scrape time.
    /// Document sources have no content timestamp and use the run clock.
    pub found_at: DateTime<Utc>,
}
