use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use keywatch_common::Config;
use keywatch_scout::scout::{RunOutcome, Scout};
use keywatch_store::RedisKeyStore;

/// One-shot scrape: run a single cycle against the configured sources and
/// print the summary. The long-running schedule lives in keywatch-api.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("keywatch=info".parse()?))
        .init();

    info!("KeyWatch scout starting...");

    let config = Config::from_env();
    let store = Arc::new(RedisKeyStore::connect(&config.redis_url).await?);

    let scout = Scout::from_config(&config, store)?;
    let stats = scout.run().await;
    println!("{stats}");

    if stats.outcome == RunOutcome::Failed {
        std::process::exit(1);
    }
    Ok(())
}
