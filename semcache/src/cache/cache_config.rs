// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Cache configuration and policies

use crate::cache::backend::CacheType;
use crate::error::{CacheError, CacheResult};
use crate::model::namespace;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Global cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable/disable caching entirely
    pub enabled: bool,

    /// Lifetime of entity cache records
    pub entity_cache_ttl: Duration,

    /// In-process LRU pool sizing
    pub pool_policy: PoolPolicy,

    /// Hops followed for subproperty chains, 0 disables the lookup
    pub subproperty_depth: usize,

    /// Hops followed for subcategory chains, 0 disables the lookup
    pub subcategory_depth: usize,

    /// Recursion count a guarded id may reach before it counts as circular
    pub max_recursion_depth: u32,

    /// Namespaces with semantic annotations enabled
    pub semantic_namespaces: BTreeSet<i32>,

    /// Backend for the entity and hierarchy caches
    pub entity_cache_type: CacheType,

    /// Backend for cached query results, `none` disables the result cache
    pub query_cache_type: CacheType,

    /// Lifetime of results for queries embedded in a page
    pub query_cache_lifetime: Duration,

    /// Lifetime of results for queries without a context page, zero reuses
    /// `query_cache_lifetime`
    pub non_embedded_query_cache_lifetime: Duration,

    /// Backend for cached property values
    pub property_values_cache_type: CacheType,

    /// Lifetime of cached property values
    pub property_values_cache_lifetime: Duration,

    /// Prefix for blob-store container ids
    pub blob_store_prefix: String,

    /// Location of the sled database when a sled backend is selected
    pub sled_path: Option<PathBuf>,
}

/// Sizing of the named in-process pools
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolPolicy {
    /// Capacity for pools without an explicit size
    pub default_pool_size: usize,

    /// Capacity per pool name
    pub pool_sizes: HashMap<String, usize>,
}

impl Default for PoolPolicy {
    fn default() -> Self {
        let mut pool_sizes = HashMap::new();
        pool_sizes.insert("entity.cache".to_string(), 1000);
        pool_sizes.insert("hierarchy.lookup".to_string(), 500);
        pool_sizes.insert("dependency.validator".to_string(), 200);
        pool_sizes.insert("query.cache".to_string(), 1000);
        pool_sizes.insert("property.values".to_string(), 1000);

        Self {
            default_pool_size: 500,
            pool_sizes,
        }
    }
}

impl PoolPolicy {
    pub fn size_for(&self, name: &str) -> usize {
        self.pool_sizes
            .get(name)
            .copied()
            .unwrap_or(self.default_pool_size)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            entity_cache_ttl: Duration::from_secs(604_800), // 1 week
            pool_policy: PoolPolicy::default(),
            subproperty_depth: 10,
            subcategory_depth: 10,
            max_recursion_depth: 2,
            semantic_namespaces: [
                namespace::MAIN,
                namespace::USER,
                namespace::CATEGORY,
                namespace::PROPERTY,
                namespace::CONCEPT,
            ]
            .into_iter()
            .collect(),
            entity_cache_type: CacheType::Pool,
            query_cache_type: CacheType::Pool,
            query_cache_lifetime: Duration::from_secs(3600 * 24 * 7), // 1 week
            non_embedded_query_cache_lifetime: Duration::from_secs(3600), // 1 hour
            property_values_cache_type: CacheType::Pool,
            property_values_cache_lifetime: Duration::from_secs(3600 * 24 * 7),
            blob_store_prefix: "smw:blob".to_string(),
            sled_path: None,
        }
    }
}

impl CacheConfig {
    /// Create configuration keeping everything in bounded in-process pools
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Create configuration persisting results and values in sled
    pub fn persistent(path: impl Into<PathBuf>) -> Self {
        Self {
            query_cache_type: CacheType::Sled,
            property_values_cache_type: CacheType::Sled,
            sled_path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Load configuration from a JSON document; missing fields take defaults
    pub fn from_json_str(json: &str) -> CacheResult<Self> {
        let config: CacheConfig = serde_json::from_str(json)
            .map_err(|e| CacheError::Configuration(format!("invalid cache config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> CacheResult<Self> {
        let json = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            CacheError::Configuration(format!(
                "cannot read cache config {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_json_str(&json)
    }

    pub fn is_semantic_enabled(&self, namespace: i32) -> bool {
        self.semantic_namespaces.contains(&namespace)
    }

    /// Lifetime for a query result depending on whether it is embedded
    pub fn query_lifetime(&self, embedded: bool) -> Duration {
        if !embedded && !self.non_embedded_query_cache_lifetime.is_zero() {
            self.non_embedded_query_cache_lifetime
        } else {
            self.query_cache_lifetime
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> CacheResult<()> {
        if !self.enabled {
            return Ok(());
        }

        if self.blob_store_prefix.trim().is_empty() {
            return Err(CacheError::Configuration(
                "blob_store_prefix must not be empty".to_string(),
            ));
        }

        if self.pool_policy.default_pool_size == 0
            || self.pool_policy.pool_sizes.values().any(|size| *size == 0)
        {
            return Err(CacheError::Configuration(
                "Cache pools must have a size > 0".to_string(),
            ));
        }

        let uses_sled = [
            self.entity_cache_type,
            self.query_cache_type,
            self.property_values_cache_type,
        ]
        .contains(&CacheType::Sled);

        if uses_sled && self.sled_path.is_none() {
            return Err(CacheError::Configuration(
                "sled cache type selected but sled_path is not set".to_string(),
            ));
        }

        Ok(())
    }
}
