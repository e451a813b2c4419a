// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Explicitly constructed service context
//!
//! Owns the process-local state (pools, recursion guards, event channels) and
//! builds every cache component from one [`CacheConfig`], wiring their
//! invalidation listeners.

use crate::cache::backend::BackendFactory;
use crate::cache::{
    BlobStore, CacheBackend, CacheConfig, CacheType, CircularReferenceGuard, EntityCache,
    GuardRegistry, InMemoryPoolCache,
};
use crate::dependency::DependencyValidator;
use crate::error::CacheResult;
use crate::events::{CacheEvent, CacheEventKind, ChangePropListener, EventDispatcher};
use crate::hierarchy::HierarchyLookup;
use crate::model::Subject;
use crate::prefetch::{CachedPropertyValuesPrefetcher, CachedQueryResultPrefetcher};
use crate::stats::TransientStatsCollector;
use crate::store::{DependencyLinksValidator, Store, StoreQueryEngine};
use log::{info, warn};
use std::sync::Arc;

pub const ENTITY_CACHE_POOL: &str = "entity.cache";
pub const HIERARCHY_LOOKUP_POOL: &str = "hierarchy.lookup";
pub const DEPENDENCY_VALIDATOR_POOL: &str = "dependency.validator";
pub const QUERY_CACHE_NAME: &str = "query.cache";
pub const PROPERTY_VALUES_CACHE_NAME: &str = "property.values";

const HIERARCHY_GUARD_NAMESPACE: &str = "smw:hierarchy";
const EVENT_HISTORY_SIZE: usize = 100;

pub struct CacheContext {
    config: CacheConfig,
    store: Arc<dyn Store>,

    pools: Arc<InMemoryPoolCache>,
    guards: Arc<GuardRegistry>,
    dispatcher: Arc<EventDispatcher>,
    change_listener: Arc<ChangePropListener>,

    backends: Vec<Arc<dyn CacheBackend>>,
    entity_cache: Arc<EntityCache>,
    hierarchy_lookup: Arc<HierarchyLookup>,
    property_values: Arc<CachedPropertyValuesPrefetcher>,
    query_results: Arc<CachedQueryResultPrefetcher>,
}

impl CacheContext {
    /// Build every component from `config`; fails fast on invalid configuration
    pub fn new(config: CacheConfig, store: Arc<dyn Store>) -> CacheResult<Self> {
        config.validate()?;

        let pools = Arc::new(InMemoryPoolCache::new(config.pool_policy.clone()));
        let guards = Arc::new(GuardRegistry::new());
        let dispatcher = Arc::new(EventDispatcher::new(EVENT_HISTORY_SIZE));
        let change_listener = Arc::new(ChangePropListener::new());
        let factory = BackendFactory::new(config.clone());

        let entity_backend = factory.create(config.entity_cache_type, ENTITY_CACHE_POOL, &pools)?;
        let entity_cache = Arc::new(EntityCache::new(
            entity_backend.clone(),
            config.entity_cache_ttl,
        ));

        let hierarchy_backend =
            factory.create(config.entity_cache_type, HIERARCHY_LOOKUP_POOL, &pools)?;
        let mut guard =
            CircularReferenceGuard::with_registry(HIERARCHY_GUARD_NAMESPACE, guards.clone());
        guard.set_max_recursion_depth(config.max_recursion_depth);
        let hierarchy_lookup = Arc::new(HierarchyLookup::new(
            store.clone(),
            Arc::new(EntityCache::new(
                hierarchy_backend.clone(),
                config.entity_cache_ttl,
            )),
            guard,
        ));
        hierarchy_lookup.set_subproperty_depth(config.subproperty_depth);
        hierarchy_lookup.set_subcategory_depth(config.subcategory_depth);
        hierarchy_lookup.register_change_listener(&change_listener);

        let pv_backend = factory.create(
            config.property_values_cache_type,
            PROPERTY_VALUES_CACHE_NAME,
            &pools,
        )?;
        let property_values = Arc::new(CachedPropertyValuesPrefetcher::new(
            store.clone(),
            BlobStore::new(
                format!("{}:{}", config.blob_store_prefix, PROPERTY_VALUES_CACHE_NAME),
                pv_backend.clone(),
            ),
            config.property_values_cache_lifetime,
        ));

        let query_backend = factory.create(config.query_cache_type, QUERY_CACHE_NAME, &pools)?;
        let query_store = BlobStore::new(
            format!("{}:{}", config.blob_store_prefix, QUERY_CACHE_NAME),
            query_backend.clone(),
        );
        let stats = Arc::new(TransientStatsCollector::with_store(
            QUERY_CACHE_NAME,
            query_store.clone(),
        ));
        let query_results = Arc::new(CachedQueryResultPrefetcher::new(
            query_store,
            stats,
            &config,
        ));
        query_results.set_query_engine(Arc::new(StoreQueryEngine::new(store.clone())));
        query_results.register_event_listeners(&dispatcher);

        {
            let entity_cache = entity_cache.clone();
            let property_values = property_values.clone();
            dispatcher.add_listener(CacheEventKind::InvalidateEntityCache, move |event| {
                let subject = event.subject();
                entity_cache.invalidate(subject);
                property_values.reset_cache_by(subject);
            });
        }

        info!(
            "cache context ready (entity: {}, query: {}, property values: {})",
            config.entity_cache_type, config.query_cache_type, config.property_values_cache_type
        );

        Ok(Self {
            config,
            store,
            pools,
            guards,
            dispatcher,
            change_listener,
            backends: vec![entity_backend, hierarchy_backend, pv_backend, query_backend],
            entity_cache,
            hierarchy_lookup,
            property_values,
            query_results,
        })
    }

    /// In-memory context, mostly for tests and tools
    pub fn in_memory(store: Arc<dyn Store>) -> CacheResult<Self> {
        Self::new(CacheConfig::in_memory(), store)
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn store(&self) -> Arc<dyn Store> {
        self.store.clone()
    }

    pub fn pools(&self) -> Arc<InMemoryPoolCache> {
        self.pools.clone()
    }

    pub fn guards(&self) -> Arc<GuardRegistry> {
        self.guards.clone()
    }

    pub fn dispatcher(&self) -> Arc<EventDispatcher> {
        self.dispatcher.clone()
    }

    pub fn change_listener(&self) -> Arc<ChangePropListener> {
        self.change_listener.clone()
    }

    pub fn entity_cache(&self) -> Arc<EntityCache> {
        self.entity_cache.clone()
    }

    pub fn hierarchy_lookup(&self) -> Arc<HierarchyLookup> {
        self.hierarchy_lookup.clone()
    }

    pub fn property_values_prefetcher(&self) -> Arc<CachedPropertyValuesPrefetcher> {
        self.property_values.clone()
    }

    pub fn query_result_prefetcher(&self) -> Arc<CachedQueryResultPrefetcher> {
        self.query_results.clone()
    }

    /// Guard sharing this context's registry
    pub fn circular_reference_guard(&self, namespace: &str) -> CircularReferenceGuard {
        let mut guard = CircularReferenceGuard::with_registry(namespace, self.guards.clone());
        guard.set_max_recursion_depth(self.config.max_recursion_depth);
        guard
    }

    /// Validator bound to this context's entity cache and event channel
    pub fn dependency_validator(&self, links: Arc<dyn DependencyLinksValidator>) -> DependencyValidator {
        DependencyValidator::new(
            self.config.semantic_namespaces.clone(),
            links,
            self.entity_cache.clone(),
            self.dispatcher.clone(),
            self.pools.get_pool_cache_for(DEPENDENCY_VALIDATOR_POOL),
        )
    }

    /// Run change callbacks for everything recorded since the last call
    pub fn process_changes(&self) -> usize {
        self.change_listener.match_and_run()
    }

    /// Drop every entity-level entry derived from `subject`
    pub fn invalidate_subject(&self, subject: &Subject) {
        self.dispatcher.dispatch(CacheEvent::InvalidateEntityCache {
            subject: subject.clone(),
        });
    }

    /// Persist buffered writes of every backend
    pub fn flush(&self) -> CacheResult<()> {
        for backend in &self.backends {
            backend.flush()?;
        }
        Ok(())
    }

    /// Reset all in-process state. Persistent backends keep their data.
    pub fn clear(&self) {
        for name in self.pools.pool_names() {
            self.pools.reset_pool_cache_for(&name);
        }
        self.guards.clear();
        self.dispatcher.clear_history();
        self.change_listener.clear_pending();

        for backend in &self.backends {
            if backend.backend_type() == CacheType::Memory {
                if let Err(e) = backend.clear() {
                    warn!("clearing {} backend failed: {}", backend.backend_type(), e);
                }
            }
        }

        info!("cache context cleared");
    }
}
