use chrono::{DateTime, Duration, Utc};

/// Lookback window for feed content.
///
/// The cutoff is computed once per run from a single `now`, so the window
/// boundary stays stable even though a scrape spans seconds.
#[derive(Debug, Clone, Copy)]
pub struct RecencyWindow {
    cutoff: DateTime<Utc>,
}

impl RecencyWindow {
    pub fn new(now: DateTime<Utc>, lookback_hours: i64) -> Self {
        Self {
            cutoff: now - Duration::hours(lookback_hours),
        }
    }

    /// Inclusive at the boundary: content timestamped exactly at the cutoff
    /// is still considered recent.
    pub fn is_recent(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp >= self.cutoff
    }

    pub fn cutoff(&self) -> DateTime<Utc> {
        self.cutoff
    }
}
