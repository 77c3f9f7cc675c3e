use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::scout::{RunOutcome, Scout};

/// How often the liveness ping fires. Much shorter than the scrape interval;
/// it exists only to keep idle hosting platforms from suspending the process.
const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Start the periodic scrape loop in a background task.
/// Runs once immediately, then every `interval_minutes`. A failed run is
/// logged and the loop carries on; the next run re-discovers and no-ops on
/// already-stored keys.
pub fn start_scrape_interval(scout: Arc<Scout>, interval_minutes: u64) -> JoinHandle<()> {
    info!(interval_minutes, "Starting scrape interval loop");

    tokio::spawn(async move {
        loop {
            let stats = scout.run().await;
            match stats.outcome {
                RunOutcome::Committed => info!("Scrape run complete. {stats}"),
                RunOutcome::Failed => error!("Scrape run failed. {stats}"),
            }

            info!(sleep_minutes = interval_minutes, "Sleeping until next run");
            tokio::time::sleep(Duration::from_secs(interval_minutes * 60)).await;
        }
    })
}

/// Start the keep-alive ping loop against a health-check URL.
/// Carries no data; failures are logged and ignored.
pub fn start_keep_alive(url: String) -> JoinHandle<()> {
    info!(url = url.as_str(), "Starting keep-alive loop");

    tokio::spawn(async move {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build keep-alive HTTP client");

        loop {
            tokio::time::sleep(KEEP_ALIVE_INTERVAL).await;
            match client.get(&url).send().await {
                Ok(resp) => info!(status = %resp.status(), "Keep-alive ping"),
                Err(e) => warn!(error = %e, "Keep-alive ping failed"),
            }
        }
    })
}
