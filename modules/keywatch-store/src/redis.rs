use std::collections::HashSet;

use anyhow::{Context, Result};
use async_trait::async_trait;
use bb8_redis::{
    bb8,
    redis::cmd,
    RedisConnectionManager,
};
use tracing::{debug, info, warn};

use keywatch_common::{KeyHit, KeyWatchError};

use crate::KeyStore;

/// Hash holding key → serialized KeyHit (first sighting).
const DATA_KEY: &str = "keys:data";
/// List of keys in store order, newest pushed to the front.
const RECENT_KEY: &str = "keys:recent";

/// Redis-backed dedup store.
///
/// Layout: one hash for the records, one list for most-recent-first
/// retrieval. HSETNX serializes the check-and-insert per key, so concurrent
/// runs cannot double-insert; the LPUSH onto the recency list only happens
/// on the winning insert.
#[derive(Clone)]
pub struct RedisKeyStore {
    pool: bb8::Pool<RedisConnectionManager>,
}

impl RedisKeyStore {
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let manager = RedisConnectionManager::new(redis_url)
            .map_err(|e| KeyWatchError::Store(format!("invalid Redis URL: {e}")))?;
        let pool = bb8::Pool::builder()
            .max_size(8)
            .build(manager)
            .await
            .map_err(|e| KeyWatchError::Store(format!("failed to build connection pool: {e}")))?;

        // Fail fast on an unreachable store instead of at the first run.
        let mut conn = pool
            .get()
            .await
            .map_err(|e| KeyWatchError::Store(format!("failed to get connection: {e}")))?;
        let _: String = cmd("PING")
            .query_async(&mut *conn)
            .await
            .map_err(|e| KeyWatchError::Store(format!("PING failed: {e}")))?;

        drop(conn);

        info!("Connected to Redis key store");
        Ok(Self { pool })
    }
}

#[async_trait]
impl KeyStore for RedisKeyStore {
    async fn store_if_new(&self, hit: &KeyHit) -> Result<bool> {
        let mut conn = self
            .pool
            .get()
            .await
            .context("Failed to get Redis connection")?;

        let json = serde_json::to_string(hit).context("Failed to serialize key record")?;

        let inserted: bool = cmd("HSETNX")
            .arg(DATA_KEY)
            .arg(&hit.key)
            .arg(json)
            .query_async(&mut *conn)
            .await
            .with_context(|| format!("HSETNX failed for key {}", hit.key))?;

        if inserted {
            let _: () = cmd("LPUSH")
                .arg(RECENT_KEY)
                .arg(&hit.key)
                .query_async(&mut *conn)
                .await
                .with_context(|| format!("LPUSH failed for key {}", hit.key))?;
            debug!(key = hit.key.as_str(), source = hit.source_type.as_str(), "Stored new key");
        }

        Ok(inserted)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self
            .pool
            .get()
            .await
            .context("Failed to get Redis connection")?;

        let exists: bool = cmd("HEXISTS")
            .arg(DATA_KEY)
            .arg(key)
            .query_async(&mut *conn)
            .await
            .with_context(|| format!("HEXISTS failed for key {key}"))?;
        Ok(exists)
    }

    async fn get(&self, key: &str) -> Result<Option<KeyHit>> {
        let mut conn = self
            .pool
            .get()
            .await
            .context("Failed to get Redis connection")?;

        let raw: Option<String> = cmd("HGET")
            .arg(DATA_KEY)
            .arg(key)
            .query_async(&mut *conn)
            .await
            .with_context(|| format!("HGET failed for key {key}"))?;

        match raw {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .with_context(|| format!("Failed to deserialize record for key {key}")),
            None => Ok(None),
        }
    }

    async fn recent(&self, n: usize) -> Result<Vec<KeyHit>> {
        if n == 0 {
            return Ok(Vec::new());
        }

        let mut conn = self
            .pool
            .get()
            .await
            .context("Failed to get Redis connection")?;

        let keys: Vec<String> = cmd("LRANGE")
            .arg(RECENT_KEY)
            .arg(0)
            .arg((n as i64) - 1)
            .query_async(&mut *conn)
            .await
            .context("LRANGE failed on recency list")?;

        let mut hits = Vec::with_capacity(keys.len());
        for key in keys {
            let raw: Option<String> = cmd("HGET")
                .arg(DATA_KEY)
                .arg(&key)
                .query_async(&mut *conn)
                .await
                .with_context(|| format!("HGET failed for key {key}"))?;

            match raw {
                Some(json) => match serde_json::from_str(&json) {
                    Ok(hit) => hits.push(hit),
                    Err(e) => warn!(key = key.as_str(), error = %e, "Skipping undecodable key record"),
                },
                // Listed but missing from the hash: should not happen since
                // the hash write precedes the list push.
                None => warn!(key = key.as_str(), "Recency list entry has no record"),
            }
        }

        Ok(hits)
    }

    async fn all_keys(&self) -> Result<HashSet<String>> {
        let mut conn = self
            .pool
            .get()
            .await
            .context("Failed to get Redis connection")?;

        let keys: Vec<String> = cmd("HKEYS")
            .arg(DATA_KEY)
            .query_async(&mut *conn)
            .await
            .context("HKEYS failed on key data hash")?;

        Ok(keys.into_iter().collect())
    }
}
