// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Cache backend factory
//!
//! Maps a configured [`CacheType`] to a backend instance. Every cache purpose
//! gets its own name, which selects the LRU pool or the sled tree it lives in.

use super::memory::MemoryBackend;
use super::null::NullBackend;
use super::pool::PoolBackend;
use super::traits::CacheBackend;
use super::types::CacheType;
use crate::cache::cache_config::CacheConfig;
use crate::cache::pool_cache::InMemoryPoolCache;
use crate::error::{CacheError, CacheResult};
use log::debug;
#[cfg(feature = "sled-backend")]
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Factory function to create a single backend
///
/// # Arguments
/// * `cache_type` - The kind of backend to create
/// * `name` - Pool name or sled tree name for this cache purpose
/// * `config` - Configuration (sled path)
/// * `pools` - Pool registry used by `CacheType::Pool`
///
/// # Examples
/// ```ignore
/// let backend = create_cache_backend(CacheType::Pool, "entity.cache", &config, &pools)?;
/// backend.save("key", b"value", None)?;
/// ```
pub fn create_cache_backend(
    cache_type: CacheType,
    name: &str,
    config: &CacheConfig,
    pools: &InMemoryPoolCache,
) -> CacheResult<Arc<dyn CacheBackend>> {
    BackendFactory::new(config.clone()).create(cache_type, name, pools)
}

/// Creates backends for one context, sharing a single sled database between
/// all sled-backed caches
pub struct BackendFactory {
    config: CacheConfig,
    #[cfg(feature = "sled-backend")]
    sled_db: OnceCell<::sled::Db>,
}

impl BackendFactory {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            #[cfg(feature = "sled-backend")]
            sled_db: OnceCell::new(),
        }
    }

    pub fn create(
        &self,
        cache_type: CacheType,
        name: &str,
        pools: &InMemoryPoolCache,
    ) -> CacheResult<Arc<dyn CacheBackend>> {
        debug!("creating {} cache backend for '{}'", cache_type, name);

        if !self.config.enabled {
            return Ok(Arc::new(NullBackend));
        }

        match cache_type {
            CacheType::Memory => Ok(Arc::new(MemoryBackend::new())),
            CacheType::Pool => Ok(Arc::new(PoolBackend::new(pools.get_pool_cache_for(name)))),
            CacheType::None => Ok(Arc::new(NullBackend)),
            CacheType::Sled => self.create_sled(name),
        }
    }

    #[cfg(feature = "sled-backend")]
    fn create_sled(&self, name: &str) -> CacheResult<Arc<dyn CacheBackend>> {
        let path = self.config.sled_path.as_ref().ok_or_else(|| {
            CacheError::Configuration("sled cache type selected but sled_path is not set".to_string())
        })?;

        let db = self
            .sled_db
            .get_or_try_init(|| ::sled::open(path))
            .map_err(|e| CacheError::Configuration(format!("cannot open sled cache: {}", e)))?;

        let backend = super::sled::SledBackend::with_db(db.clone(), name)?;
        Ok(Arc::new(backend))
    }

    #[cfg(not(feature = "sled-backend"))]
    fn create_sled(&self, _name: &str) -> CacheResult<Arc<dyn CacheBackend>> {
        Err(CacheError::Configuration(
            "sled cache backend not compiled in (enable the sled-backend feature)".to_string(),
        ))
    }
}
