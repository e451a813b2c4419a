// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Backend over a named in-process LRU pool

use super::traits::CacheBackend;
use super::types::CacheType;
use crate::cache::pool_cache::PoolCache;
use crate::error::CacheResult;
use std::sync::Arc;
use std::time::Duration;

/// Bounded backend; the pool may evict entries at any time
#[derive(Debug, Clone)]
pub struct PoolBackend {
    pool: Arc<PoolCache>,
}

impl PoolBackend {
    pub fn new(pool: Arc<PoolCache>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Arc<PoolCache> {
        &self.pool
    }
}

impl CacheBackend for PoolBackend {
    fn fetch(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        Ok(self.pool.fetch(key))
    }

    fn save(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> CacheResult<()> {
        self.pool.save(key, value.to_vec(), ttl);
        Ok(())
    }

    fn delete(&self, key: &str) -> CacheResult<()> {
        self.pool.delete(key);
        Ok(())
    }

    fn contains(&self, key: &str) -> CacheResult<bool> {
        Ok(self.pool.contains(key))
    }

    fn clear(&self) -> CacheResult<()> {
        self.pool.clear();
        Ok(())
    }

    fn backend_type(&self) -> CacheType {
        CacheType::Pool
    }
}
