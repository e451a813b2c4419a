// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Named, bounded in-process LRU pools
//!
//! Every in-process cache of the crate obtains its storage from an
//! [`InMemoryPoolCache`]. Asking twice for the same pool name returns the same
//! [`PoolCache`] instance, so components share one LRU without explicit wiring.

use super::cache_config::PoolPolicy;
use super::CacheEntryMetadata;
use crate::error::CacheResult;
use log::{debug, info};
use lru::LruCache;
use parking_lot::{Mutex, RwLock};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
struct PoolEntry {
    value: Vec<u8>,
    metadata: CacheEntryMetadata,
}

/// Counters for one pool
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PoolStats {
    pub hits: u64,
    pub misses: u64,
    pub inserts: u64,
    pub deletes: u64,
    pub evictions: u64,
    pub size: usize,
    pub max_size: usize,
}

impl PoolStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// A single bounded LRU cache of byte values
pub struct PoolCache {
    name: String,
    max_size: usize,
    entries: Mutex<LruCache<String, PoolEntry>>,
    stats: Mutex<PoolStats>,
}

impl std::fmt::Debug for PoolCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolCache")
            .field("name", &self.name)
            .field("max_size", &self.max_size)
            .field("size", &self.len())
            .finish()
    }
}

impl PoolCache {
    pub fn new(name: impl Into<String>, max_size: usize) -> Self {
        let capacity = NonZeroUsize::new(max_size).unwrap_or(NonZeroUsize::MIN);
        Self {
            name: name.into(),
            max_size: capacity.get(),
            entries: Mutex::new(LruCache::new(capacity)),
            stats: Mutex::new(PoolStats {
                max_size: capacity.get(),
                ..PoolStats::default()
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Get a value, marking it as most recently used
    pub fn fetch(&self, key: &str) -> Option<Vec<u8>> {
        let mut entries = self.entries.lock();

        let expired = match entries.get_mut(key) {
            Some(entry) if !entry.metadata.is_expired() => {
                entry.metadata.update_access();
                let value = entry.value.clone();
                self.stats.lock().hits += 1;
                return Some(value);
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            entries.pop(key);
        }

        self.stats.lock().misses += 1;
        None
    }

    /// Check for a live entry without touching recency or counters
    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .lock()
            .peek(key)
            .map(|entry| !entry.metadata.is_expired())
            .unwrap_or(false)
    }

    pub fn save(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) {
        let entry = PoolEntry {
            value,
            metadata: CacheEntryMetadata::new(ttl),
        };

        let evicted = self.entries.lock().push(key.to_string(), entry);

        let mut stats = self.stats.lock();
        stats.inserts += 1;
        if let Some((evicted_key, _)) = evicted {
            if evicted_key != key {
                stats.evictions += 1;
                debug!("pool '{}' evicted {}", self.name, evicted_key);
            }
        }
    }

    pub fn delete(&self, key: &str) -> bool {
        let removed = self.entries.lock().pop(key).is_some();
        if removed {
            self.stats.lock().deletes += 1;
        }
        removed
    }

    /// Typed read of a JSON encoded value; undecodable values count as absent
    pub fn fetch_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.fetch(key)
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
    }

    pub fn save_as<T: Serialize>(&self, key: &str, value: &T, ttl: Option<Duration>) -> CacheResult<()> {
        let bytes = serde_json::to_vec(value)?;
        self.save(key, bytes, ttl);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all entries and counters
    pub fn clear(&self) {
        self.entries.lock().clear();
        *self.stats.lock() = PoolStats {
            max_size: self.max_size,
            ..PoolStats::default()
        };
    }

    pub fn stats(&self) -> PoolStats {
        let mut stats = self.stats.lock().clone();
        stats.size = self.len();
        stats
    }
}

/// Registry of named pools
pub struct InMemoryPoolCache {
    policy: RwLock<PoolPolicy>,
    pools: RwLock<HashMap<String, Arc<PoolCache>>>,
}

impl Default for InMemoryPoolCache {
    fn default() -> Self {
        Self::new(PoolPolicy::default())
    }
}

impl InMemoryPoolCache {
    pub fn new(policy: PoolPolicy) -> Self {
        Self {
            policy: RwLock::new(policy),
            pools: RwLock::new(HashMap::new()),
        }
    }

    /// Get (creating on first use) the pool registered under `name`
    pub fn get_pool_cache_for(&self, name: &str) -> Arc<PoolCache> {
        let size = self.policy.read().size_for(name);
        self.get_pool_cache_with_size(name, size)
    }

    /// Like [`get_pool_cache_for`](Self::get_pool_cache_for) with an explicit
    /// capacity. The size only applies when the pool is created.
    pub fn get_pool_cache_with_size(&self, name: &str, size: usize) -> Arc<PoolCache> {
        if let Some(pool) = self.pools.read().get(name) {
            return pool.clone();
        }

        let mut pools = self.pools.write();
        pools
            .entry(name.to_string())
            .or_insert_with(|| {
                debug!("creating pool cache '{}' with size {}", name, size);
                Arc::new(PoolCache::new(name, size))
            })
            .clone()
    }

    /// Empty one pool, existing holders keep a valid (now empty) instance
    pub fn reset_pool_cache_for(&self, name: &str) {
        if let Some(pool) = self.pools.read().get(name) {
            info!("resetting pool cache '{}'", name);
            pool.clear();
        }
    }

    pub fn has_pool(&self, name: &str) -> bool {
        self.pools.read().contains_key(name)
    }

    pub fn pool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.pools.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn set_policy(&self, policy: PoolPolicy) {
        *self.policy.write() = policy;
    }

    pub fn get_stats(&self) -> BTreeMap<String, PoolStats> {
        self.pools
            .read()
            .iter()
            .map(|(name, pool)| (name.clone(), pool.stats()))
            .collect()
    }

    /// Fixed-width table of all pool counters
    pub fn get_formatted_stats(&self) -> String {
        let stats = self.get_stats();
        let mut out = String::new();

        let _ = writeln!(
            out,
            "{:<28} {:>8} {:>8} {:>8} {:>8} {:>10} {:>8}",
            "pool", "size", "max", "hits", "misses", "evictions", "hit%"
        );
        for (name, pool) in &stats {
            let _ = writeln!(
                out,
                "{:<28} {:>8} {:>8} {:>8} {:>8} {:>10} {:>7.1}%",
                name,
                pool.size,
                pool.max_size,
                pool.hits,
                pool.misses,
                pool.evictions,
                pool.hit_rate() * 100.0
            );
        }

        out
    }

    /// Tear down every pool. Later lookups create fresh instances.
    pub fn clear(&self) {
        let mut pools = self.pools.write();
        for pool in pools.values() {
            pool.clear();
        }
        pools.clear();
        info!("cleared all pool caches");
    }
}
