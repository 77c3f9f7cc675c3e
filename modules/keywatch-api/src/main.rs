use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use keywatch_common::Config;
use keywatch_scout::scheduler;
use keywatch_scout::scout::Scout;
use keywatch_store::{KeyStore, RedisKeyStore};

mod rest;

pub struct AppState {
    pub store: Arc<dyn KeyStore>,
    pub scout: Arc<Scout>,
    pub scrape_running: Arc<AtomicBool>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("keywatch=info".parse()?))
        .init();

    info!("KeyWatch API starting...");

    let config = Config::from_env();

    let store: Arc<dyn KeyStore> = Arc::new(RedisKeyStore::connect(&config.redis_url).await?);
    let scout = Arc::new(Scout::from_config(&config, store.clone())?);

    // Background loops: periodic scraping plus the liveness ping.
    scheduler::start_scrape_interval(scout.clone(), config.scrape_interval_minutes);
    if let Some(keep_alive_url) = config.keep_alive_url.clone() {
        scheduler::start_keep_alive(keep_alive_url);
    }

    let state = Arc::new(AppState {
        store,
        scout,
        scrape_running: Arc::new(AtomicBool::new(false)),
    });

    let app = Router::new()
        // Health check / keep-alive target
        .route("/", get(|| async { "ok" }))
        // Query surface
        .route("/api/keys", get(rest::api_keys))
        .route("/api/keys/{key}", get(rest::api_key_detail))
        // Manual trigger
        .route("/api/scrape", post(rest::api_scrape))
        .with_state(state)
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        );

    let addr = format!("{}:{}", config.web_host, config.web_port);
    info!(addr = addr.as_str(), "Listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
