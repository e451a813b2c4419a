// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Semcache - entity, hierarchy and query-result caching for semantic wikis
//!
//! Semcache is the caching and invalidation core that sits between a semantic
//! wiki's annotation store and the code that renders pages and runs queries.
//!
//! # Features
//!
//! - **Deterministic keys**: namespace-qualified, content-hashed cache keys
//! - **Pluggable backends**: in-memory, bounded LRU pools, sled, or disabled
//! - **Entity cache**: sub-entries and reverse associations for bulk invalidation
//! - **Hierarchy lookups**: depth-bounded, cycle-safe subproperty/subcategory closures
//! - **Dependency validation**: ETag and dependency-link based staleness checks
//! - **Read-through prefetchers**: cached property values and query results
//!
//! # Usage
//!
//! ```ignore
//! let context = CacheContext::new(CacheConfig::default(), store)?;
//!
//! let values = context
//!     .property_values_prefetcher()
//!     .get_property_values(&subject, &property, None)?;
//!
//! let result = context.query_result_prefetcher().get_query_result(&query)?;
//! ```

pub mod cache;
pub mod context;
pub mod dependency;
pub mod error;
pub mod events;
pub mod hierarchy;
pub mod model;
pub mod prefetch;
pub mod stats;
pub mod store;

pub use cache::{
    BlobStore, CacheBackend, CacheConfig, CacheKeySource, CacheType, CircularReferenceGuard,
    Container, EntityCache, GuardRegistry, InMemoryPoolCache, PoolCache,
};
pub use context::CacheContext;
pub use dependency::DependencyValidator;
pub use error::{CacheError, CacheResult};
pub use events::{CacheEvent, CacheEventKind, ChangePropListener, EventDispatcher};
pub use hierarchy::{Direction, HierarchyLookup, HierarchyRelation};
pub use model::{DataItem, Property, Query, QueryOption, QueryResult, RequestOptions, Subject, TitleRef};
pub use prefetch::{CachedPropertyValuesPrefetcher, CachedQueryResultPrefetcher};
pub use stats::{StatsCollector, TransientStatsCollector};
pub use store::{DependencyLinksValidator, QueryEngine, Store, StoreQueryEngine};

/// Semcache version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Semcache crate name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
