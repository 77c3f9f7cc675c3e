use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::Utc;
use serde::Deserialize;
use tracing::{error, info, warn};

use keywatch_common::KeyHit;

use crate::AppState;

/// Hard cap on the query surface; deeper reads go through the store directly.
const MAX_LIMIT: usize = 1000;
const DEFAULT_LIMIT: usize = 100;

// --- Query structs ---

#[derive(Deserialize)]
pub struct KeysQuery {
    /// Single source type or comma-separated list.
    sources: Option<String>,
    limit: Option<usize>,
    /// Only `recent` (most-recently-stored first) is supported.
    sort: Option<String>,
}

// --- Helpers ---

fn parse_sources(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

fn filter_by_sources(hits: Vec<KeyHit>, sources: &[String]) -> Vec<KeyHit> {
    if sources.is_empty() {
        return hits;
    }
    hits.into_iter()
        .filter(|h| sources.iter().any(|s| *s == h.source_type))
        .collect()
}

// --- Handlers ---

/// Best-effort read of the stored keys. Fetch/parse problems upstream never
/// surface here; only store unavailability is a request-level error.
pub async fn api_keys(
    State(state): State<Arc<AppState>>,
    Query(params): Query<KeysQuery>,
) -> impl IntoResponse {
    if let Some(sort) = params.sort.as_deref() {
        if sort != "recent" {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": format!("unsupported sort '{sort}'")})),
            )
                .into_response();
        }
    }

    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    let sources: Vec<String> = params
        .sources
        .as_deref()
        .map(parse_sources)
        .unwrap_or_default();

    // When filtering, read the full window first so the limit applies to
    // the filtered result.
    let fetch_n = if sources.is_empty() { limit } else { MAX_LIMIT };

    match state.store.recent(fetch_n).await {
        Ok(hits) => {
            let mut keys = filter_by_sources(hits, &sources);
            keys.truncate(limit);
            Json(serde_json::json!({
                "keys": keys,
                "count": keys.len(),
                "cached": false,
                "timestamp": Utc::now().to_rfc3339(),
            }))
            .into_response()
        }
        Err(e) => {
            warn!(error = %e, "Failed to load keys");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "key store unavailable"})),
            )
                .into_response()
        }
    }
}

pub async fn api_key_detail(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> impl IntoResponse {
    match state.store.get(&key).await {
        Ok(Some(hit)) => Json(serde_json::json!({ "key": hit })).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to load key detail");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Kick off a scrape run in the background. Returns immediately; the
/// running flag prevents overlapping manual runs.
pub async fn api_scrape(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    if state.scrape_running.swap(true, Ordering::SeqCst) {
        return (
            StatusCode::CONFLICT,
            Json(serde_json::json!({"error": "scrape run already in progress"})),
        )
            .into_response();
    }

    let scout = state.scout.clone();
    let running = state.scrape_running.clone();
    tokio::spawn(async move {
        let stats = scout.run().await;
        match stats.outcome {
            keywatch_scout::scout::RunOutcome::Committed => {
                info!("Manual scrape run complete. {stats}")
            }
            keywatch_scout::scout::RunOutcome::Failed => {
                error!("Manual scrape run failed. {stats}")
            }
        }
        running.store(false, Ordering::SeqCst);
    });

    (
        StatusCode::ACCEPTED,
        Json(serde_json::json!({"status": "started"})),
    )
        .into_response()
}
