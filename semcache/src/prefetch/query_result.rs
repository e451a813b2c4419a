// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Cached query results
//!
//! A cacheable query is answered from a container keyed by the query's
//! signature and the current hash modifier. Embedded queries are linked into
//! the container of their context page, so resetting the page drops every
//! query it embeds. Queries with a limit below one, the `NoCache` option, or
//! an unusable blob store always go to the query engine.

use crate::cache::{make_key, prefix, BlobStore, CacheConfig};
use crate::error::{CacheError, CacheResult};
use crate::events::{CacheEvent, CacheEventKind, EventDispatcher};
use crate::model::{Query, QueryOption, QueryResult, Subject};
use crate::stats::StatsCollector;
use crate::store::QueryEngine;
use log::{debug, warn};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

const FIELD_RESULTS: &str = "results";
const FIELD_COUNT: &str = "count";
const FIELD_CONTINUE: &str = "continue";

pub struct CachedQueryResultPrefetcher {
    blob_store: BlobStore,
    stats: Arc<dyn StatsCollector>,
    query_engine: RwLock<Option<Arc<dyn QueryEngine>>>,
    hash_modifier: RwLock<String>,
    lifetime: Duration,
    non_embedded_lifetime: Duration,
}

impl CachedQueryResultPrefetcher {
    pub fn new(blob_store: BlobStore, stats: Arc<dyn StatsCollector>, config: &CacheConfig) -> Self {
        Self {
            blob_store,
            stats,
            query_engine: RwLock::new(None),
            hash_modifier: RwLock::new(String::new()),
            lifetime: config.query_lifetime(true),
            non_embedded_lifetime: config.query_lifetime(false),
        }
    }

    pub fn set_query_engine(&self, engine: Arc<dyn QueryEngine>) {
        *self.query_engine.write() = Some(engine);
    }

    /// Extra key material, bumped to orphan every cached result at once
    pub fn set_hash_modifier(&self, modifier: impl Into<String>) {
        *self.hash_modifier.write() = modifier.into();
    }

    pub fn blob_store(&self) -> &BlobStore {
        &self.blob_store
    }

    /// Container id for a query id, a subject hash or any other material
    pub fn hash_from(&self, material: &str) -> String {
        let modifier = self.hash_modifier.read().clone();
        make_key(prefix::QUERY, &[material, modifier.as_str()])
    }

    pub fn is_cacheable(&self, query: &Query) -> bool {
        self.blob_store.can_use() && query.limit >= 1 && !query.option(QueryOption::NoCache)
    }

    pub fn get_query_result(&self, query: &Query) -> CacheResult<QueryResult> {
        if !self.is_cacheable(query) {
            self.stats.incr("noCache");
            let result = self.engine()?.get_query_result(query);
            self.stats.record_stats();
            return result;
        }

        let id = self.hash_from(&query.query_id());
        let container = self.blob_store.read(&id);

        if let Some(results) = container.get::<Vec<Subject>>(FIELD_RESULTS) {
            debug!("query result hit for {}", id);
            self.stats.incr("hits");
            self.stats.incr(if query.is_embedded() {
                "hits.embedded"
            } else {
                "hits.nonEmbedded"
            });
            self.stats.record_stats();

            return Ok(QueryResult {
                count: container.get(FIELD_COUNT).unwrap_or(results.len()),
                further_results: container.get(FIELD_CONTINUE).unwrap_or(false),
                results,
                from_cache: true,
            });
        }

        let engine = self.engine()?;
        self.stats.incr("misses");
        let result = engine.get_query_result(query)?;
        self.add_to_cache(&id, query, &result);
        self.stats.record_stats();

        Ok(result)
    }

    /// Drop cached results for a subject: queries embedded on its page and
    /// a query container keyed by the subject itself
    pub fn reset_cache_by_subject(&self, subject: &Subject, context: &str) {
        let id = self.hash_from(&subject.as_base().fingerprint());
        self.delete_tracked(&id, context);
        self.stats.record_stats();
    }

    /// Drop cached results for each query id
    pub fn reset_cache_by_ids(&self, query_ids: &[String], context: &str) {
        for query_id in query_ids {
            let id = self.hash_from(query_id);
            self.delete_tracked(&id, context);
        }
        self.stats.record_stats();
    }

    pub fn get_stats(&self) -> BTreeMap<String, f64> {
        self.stats.get_stats()
    }

    /// Reset cached results of the event's subject and dependencies on
    /// `InvalidateResultCache`
    pub fn register_event_listeners(self: &Arc<Self>, dispatcher: &EventDispatcher) {
        let prefetcher = Arc::downgrade(self);
        dispatcher.add_listener(CacheEventKind::InvalidateResultCache, move |event| {
            let prefetcher = match prefetcher.upgrade() {
                Some(prefetcher) => prefetcher,
                None => return,
            };

            if let CacheEvent::InvalidateResultCache {
                subject,
                context,
                dependencies,
            } = event
            {
                prefetcher.reset_cache_by_subject(subject, context);
                for dependency in dependencies {
                    prefetcher.reset_cache_by_subject(dependency, context);
                }
            }
        });
    }

    fn engine(&self) -> CacheResult<Arc<dyn QueryEngine>> {
        self.query_engine.read().clone().ok_or_else(|| {
            CacheError::MissingQueryEngine("no query engine set on the query result prefetcher".to_string())
        })
    }

    fn add_to_cache(&self, id: &str, query: &Query, result: &QueryResult) {
        let ttl = query.cache_ttl.unwrap_or(if query.is_embedded() {
            self.lifetime
        } else {
            self.non_embedded_lifetime
        });

        let mut container = self.blob_store.read(id);
        let written = container
            .set(FIELD_RESULTS, &result.results)
            .and_then(|_| container.set(FIELD_COUNT, &result.count))
            .and_then(|_| container.set(FIELD_CONTINUE, &result.further_results));
        if let Err(e) = written {
            warn!("cannot cache query result {}: {}", id, e);
            return;
        }
        container.set_expiry(ttl);
        self.blob_store.save(&container);

        if let Some(page) = &query.context_page {
            let page_id = self.hash_from(&page.as_base().fingerprint());
            let mut page_container = self.blob_store.read(&page_id);
            page_container.add_to_linked_list(id);
            page_container.set_expiry(self.lifetime);
            self.blob_store.save(&page_container);
        }
    }

    fn delete_tracked(&self, id: &str, context: &str) {
        if !self.blob_store.exists(id) {
            return;
        }

        debug!("deleting cached query container {} ({})", id, context);
        self.blob_store.delete(id);
        self.stats.incr(&format!("deletes.on.{}", context));
    }
}
