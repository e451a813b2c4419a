// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Decides whether a cached rendering of a subject can be kept
//!
//! Two signals are combined:
//! - the dependency-links validator reports archaic dependencies, which
//!   overrides the subject's ETag entry and invalidates cached query results
//! - the ETag stored for the subject differs from the current one
//!
//! Titles found outdated during the current request are remembered in a pool
//! so later checks in the same request can skip the expensive path.

use crate::cache::{make_key, prefix, EntityCache, PoolCache};
use crate::events::{CacheEvent, EventDispatcher};
use crate::model::{Subject, TitleRef};
use crate::store::DependencyLinksValidator;
use log::{debug, info};
use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Sub-entry holding the ETag of the last rendering
pub const ETAG_SUB_KEY: &str = "etag";

/// Stored instead of an ETag once dependencies are known to be outdated
pub const ARCHAIC_MARKER: &str = "archaic";

/// Event context for invalidations triggered here
pub const ARCHAIC_CONTEXT: &str = "HasArchaicDependencies";

pub struct DependencyValidator {
    namespaces: BTreeSet<i32>,
    links: Arc<dyn DependencyLinksValidator>,
    cache: Arc<EntityCache>,
    dispatcher: Arc<EventDispatcher>,
    markers: Arc<PoolCache>,
    etag: RwLock<String>,
}

impl DependencyValidator {
    pub fn new(
        namespaces: BTreeSet<i32>,
        links: Arc<dyn DependencyLinksValidator>,
        cache: Arc<EntityCache>,
        dispatcher: Arc<EventDispatcher>,
        markers: Arc<PoolCache>,
    ) -> Self {
        Self {
            namespaces,
            links,
            cache,
            dispatcher,
            markers,
            etag: RwLock::new(String::new()),
        }
    }

    /// ETag of the rendering currently being validated
    pub fn set_etag(&self, etag: impl Into<String>) {
        *self.etag.write() = etag.into();
    }

    pub fn etag(&self) -> String {
        self.etag.read().clone()
    }

    /// `smw:entity:` key of the subject's dependency record
    pub fn cache_key(subject: &Subject) -> String {
        let fingerprint = subject.fingerprint();
        make_key(prefix::ENTITY, &["dependency", fingerprint.as_str()])
    }

    pub fn has_archaic_dependencies(&self, subject: &Subject) -> bool {
        if !self.namespaces.contains(&subject.namespace) {
            return false;
        }

        if !self.links.can_check_dependencies(subject)
            || !self.links.has_archaic_dependencies(subject)
        {
            return false;
        }

        let key = Self::cache_key(subject);
        self.cache.override_sub(&key, ETAG_SUB_KEY, &ARCHAIC_MARKER, None);
        self.cache.associate(subject, &key);

        let dependencies = self.links.get_checked_dependencies();
        info!(
            "{} has {} archaic dependencies, invalidating result cache",
            subject,
            dependencies.len()
        );

        self.dispatcher.dispatch(CacheEvent::InvalidateResultCache {
            subject: subject.clone(),
            context: ARCHAIC_CONTEXT.to_string(),
            dependencies,
        });

        true
    }

    /// Whether the cached rendering of `subject` matches the current ETag.
    ///
    /// Nothing cached yet counts as keepable. On a mismatch the current ETag
    /// is stored and `false` is returned.
    pub fn can_keep_parser_cache(&self, subject: &Subject) -> bool {
        let key = Self::cache_key(subject);
        if !self.cache.contains(&key) {
            return true;
        }

        let etag = self.etag();
        let stored = self.cache.fetch_sub::<String>(&key, ETAG_SUB_KEY);
        if stored.as_deref() == Some(etag.as_str()) {
            return true;
        }

        debug!("etag mismatch for {}: {:?} != {}", subject, stored, etag);
        self.cache.save_sub(&key, ETAG_SUB_KEY, &etag, None);
        false
    }

    /// Remember `title` as outdated for the rest of the request
    pub fn mark_title(&self, title: &TitleRef) {
        self.markers.save(&title.prefixed_dbkey(), vec![1], None);
    }

    pub fn has_likely_outdated_dependencies(&self, title: &TitleRef) -> bool {
        self.markers.contains(&title.prefixed_dbkey())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::backend::MemoryBackend;
    use crate::events::CacheEventKind;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct FixedLinks {
        archaic: bool,
    }

    impl DependencyLinksValidator for FixedLinks {
        fn can_check_dependencies(&self, _subject: &Subject) -> bool {
            true
        }

        fn has_archaic_dependencies(&self, _subject: &Subject) -> bool {
            self.archaic
        }

        fn get_checked_dependencies(&self) -> Vec<Subject> {
            vec![Subject::new("Dep", 0)]
        }
    }

    fn validator(archaic: bool) -> (DependencyValidator, Arc<EventDispatcher>) {
        let dispatcher = Arc::new(EventDispatcher::default());
        let validator = DependencyValidator::new(
            BTreeSet::from([0]),
            Arc::new(FixedLinks { archaic }),
            Arc::new(EntityCache::new(
                Arc::new(MemoryBackend::new()),
                Duration::from_secs(60),
            )),
            dispatcher.clone(),
            Arc::new(PoolCache::new("dependency.validator", 10)),
        );
        (validator, dispatcher)
    }

    #[test]
    fn test_non_semantic_namespace_is_never_archaic() {
        let (validator, dispatcher) = validator(true);
        assert!(!validator.has_archaic_dependencies(&Subject::new("Foo", 6)));
        assert!(dispatcher.recent_events(1).is_empty());
    }

    #[test]
    fn test_archaic_dispatches_invalidation() {
        let (validator, dispatcher) = validator(true);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        dispatcher.add_listener(CacheEventKind::InvalidateResultCache, move |event| {
            if let CacheEvent::InvalidateResultCache { dependencies, .. } = event {
                assert_eq!(dependencies.len(), 1);
            }
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let subject = Subject::new("Foo", 0);
        assert!(validator.has_archaic_dependencies(&subject));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // the archaic marker never matches a real etag
        validator.set_etag("abc");
        assert!(!validator.can_keep_parser_cache(&subject));
        assert!(validator.can_keep_parser_cache(&subject));
    }

    #[test]
    fn test_current_dependencies_have_no_side_effects() {
        let (validator, dispatcher) = validator(false);
        let subject = Subject::new("Foo", 0);
        assert!(!validator.has_archaic_dependencies(&subject));
        assert!(dispatcher.recent_events(1).is_empty());
        assert!(!validator.cache.contains(&DependencyValidator::cache_key(&subject)));
    }

    #[test]
    fn test_title_markers() {
        let (validator, _) = validator(false);
        let title = TitleRef::new("Foo bar", 0);
        assert!(!validator.has_likely_outdated_dependencies(&title));
        validator.mark_title(&title);
        assert!(validator.has_likely_outdated_dependencies(&TitleRef::new("Foo_bar", 0)));
    }
}
