// The dedup store: every discovered key is recorded at most once.
//
// `store_if_new` is the only write path and must be atomic with respect to
// the existence check — two racing runs must never both report "new" for
// the same key. The Redis implementation leans on HSETNX for that; the
// in-memory implementation holds one lock across check and insert.

pub mod memory;
pub mod redis;

use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;

use keywatch_common::KeyHit;

pub use memory::MemoryKeyStore;
pub use redis::RedisKeyStore;

#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Insert the record unless its key is already present.
    /// Returns true when this call stored it, false when the key was known.
    /// First sighting wins; a stored record is never overwritten.
    async fn store_if_new(&self, hit: &KeyHit) -> Result<bool>;

    /// Whether a key has ever been stored.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// The stored record for a key, if any.
    async fn get(&self, key: &str) -> Result<Option<KeyHit>>;

    /// The most-recently-stored records, newest first, at most `n`.
    async fn recent(&self, n: usize) -> Result<Vec<KeyHit>>;

    /// The full set of known keys.
    async fn all_keys(&self) -> Result<HashSet<String>>;
}
