// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Caching system
//!
//! This module provides the building blocks every higher-level cache is made of:
//! - Deterministic, namespace-qualified cache keys
//! - Pluggable cache backends (memory, LRU pool, sled, null)
//! - Named in-process LRU pools
//! - Namespaced blob containers with linked-list cascades
//! - The subject-aware entity cache with sub-entries and associations
//! - Recursion guards for transitive lookups

pub mod backend;
pub mod blob_store;
pub mod cache_config;
pub mod circular_reference_guard;
pub mod entity_cache;
pub mod pool_cache;

pub use backend::{create_cache_backend, CacheBackend, CacheType};
pub use blob_store::{BlobStore, Container};
pub use cache_config::CacheConfig;
pub use circular_reference_guard::{CircularReferenceGuard, GuardRegistry};
pub use entity_cache::{CacheKeySource, EntityCache};
pub use pool_cache::{InMemoryPoolCache, PoolCache, PoolStats};

use sha2::{Digest, Sha256};
use std::time::{Duration, Instant};

/// Key prefixes, one per logical cache. Keys from different prefixes never collide.
pub mod prefix {
    pub const ENTITY: &str = "smw:entity:";
    pub const HIERARCHY: &str = ":smw:hierarchy:";
    pub const QUERY: &str = "smw:query:";
    pub const PROPERTY_VALUES: &str = "smw:pv:";
    pub const STATS: &str = "smw:stats:";
}

pub const TTL_MINUTE: Duration = Duration::from_secs(60);
pub const TTL_HOUR: Duration = Duration::from_secs(3600);
pub const TTL_DAY: Duration = Duration::from_secs(86_400);
pub const TTL_WEEK: Duration = Duration::from_secs(604_800);

/// 128-bit hex digest over the given parts.
///
/// Parts are length-prefixed before hashing so `["a:b", "c"]` and `["a", "b:c"]`
/// produce different digests.
pub fn content_hash(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update((part.len() as u64).to_le_bytes());
        hasher.update(part.as_bytes());
    }

    hasher.finalize()[..16]
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Namespace-qualified cache key
pub fn make_key(prefix: &str, parts: &[&str]) -> String {
    format!("{}{}", prefix, content_hash(parts))
}

/// Entry bookkeeping shared by the in-process caches
#[derive(Debug, Clone)]
pub struct CacheEntryMetadata {
    pub created_at: Instant,
    pub last_accessed: Instant,
    pub access_count: u32,
    pub ttl: Option<Duration>,
}

impl CacheEntryMetadata {
    pub fn new(ttl: Option<Duration>) -> Self {
        let now = Instant::now();
        Self {
            created_at: now,
            last_accessed: now,
            access_count: 0,
            ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        match self.ttl {
            Some(ttl) => self.created_at.elapsed() > ttl,
            None => false,
        }
    }

    pub fn update_access(&mut self) {
        self.last_accessed = Instant::now();
        self.access_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_is_stable() {
        assert_eq!(content_hash(&["Foo#0##"]), content_hash(&["Foo#0##"]));
        assert_eq!(content_hash(&["Foo#0##"]).len(), 32);
    }

    #[test]
    fn test_content_hash_part_boundaries() {
        assert_ne!(content_hash(&["a:b", "c"]), content_hash(&["a", "b:c"]));
    }

    #[test]
    fn test_make_key_prefix_isolation() {
        let a = make_key(prefix::ENTITY, &["Foo#0##"]);
        let b = make_key(prefix::HIERARCHY, &["Foo#0##"]);
        assert!(a.starts_with("smw:entity:"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_metadata_expiry() {
        let meta = CacheEntryMetadata::new(Some(Duration::from_secs(0)));
        std::thread::sleep(Duration::from_millis(2));
        assert!(meta.is_expired());
        assert!(!CacheEntryMetadata::new(None).is_expired());
    }
}
