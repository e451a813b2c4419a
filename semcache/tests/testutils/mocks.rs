//! Call-counting collaborators
//!
//! Every mock counts its calls so tests can assert that a cache hit never
//! reached the authoritative source.

use parking_lot::RwLock;
use semcache::cache::backend::MemoryBackend;
use semcache::{
    CacheBackend, CacheResult, CacheType, DataItem, DependencyLinksValidator, Property, Query,
    QueryEngine, QueryResult, RequestOptions, Store, Subject,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// In-memory store seeded by the test
#[derive(Default)]
pub struct MockStore {
    /// (subject fingerprint, property key) -> values
    values: RwLock<HashMap<(String, String), Vec<DataItem>>>,
    /// (property key, value hash) -> subjects
    subjects: RwLock<HashMap<(String, String), Vec<Subject>>>,
    query_results: RwLock<Vec<Subject>>,

    property_values_calls: AtomicUsize,
    property_subjects_calls: AtomicUsize,
    query_calls: AtomicUsize,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Annotate `subject` with `property = value`, indexed both ways
    pub fn annotate(&self, subject: &Subject, property: &str, value: DataItem) {
        self.subjects
            .write()
            .entry((property.to_string(), value.hash()))
            .or_default()
            .push(subject.clone());
        self.values
            .write()
            .entry((subject.fingerprint(), property.to_string()))
            .or_default()
            .push(value);
    }

    /// `child` is a subproperty of `parent`
    pub fn add_subproperty(&self, parent: &str, child: &str) {
        let parent = Property::new(parent).to_subject();
        let child = Property::new(child).to_subject();
        self.annotate(&child, Property::SUBPROPERTY_OF, DataItem::WikiPage(parent));
    }

    /// `child` is a subcategory of `parent`
    pub fn add_subcategory(&self, parent: &Subject, child: &Subject) {
        self.annotate(child, Property::SUBCATEGORY_OF, DataItem::WikiPage(parent.clone()));
    }

    pub fn set_query_results(&self, results: Vec<Subject>) {
        *self.query_results.write() = results;
    }

    pub fn property_values_calls(&self) -> usize {
        self.property_values_calls.load(Ordering::SeqCst)
    }

    pub fn property_subjects_calls(&self) -> usize {
        self.property_subjects_calls.load(Ordering::SeqCst)
    }

    pub fn query_calls(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.property_values_calls() + self.property_subjects_calls() + self.query_calls()
    }
}

impl Store for MockStore {
    fn get_property_values(
        &self,
        subject: &Subject,
        property: &Property,
        _options: Option<&RequestOptions>,
    ) -> CacheResult<Vec<DataItem>> {
        self.property_values_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .values
            .read()
            .get(&(subject.fingerprint(), property.key().to_string()))
            .cloned()
            .unwrap_or_default())
    }

    fn get_property_subjects(
        &self,
        property: &Property,
        value: Option<&DataItem>,
        options: Option<&RequestOptions>,
    ) -> CacheResult<Vec<Subject>> {
        self.property_subjects_calls.fetch_add(1, Ordering::SeqCst);
        let value = match value {
            Some(value) => value.hash(),
            None => return Ok(Vec::new()),
        };

        let mut subjects = self
            .subjects
            .read()
            .get(&(property.key().to_string(), value))
            .cloned()
            .unwrap_or_default();
        if let Some(limit) = options.and_then(|o| o.limit) {
            subjects.truncate(limit);
        }
        Ok(subjects)
    }

    fn get_query_result(&self, query: &Query) -> CacheResult<QueryResult> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        let mut results = self.query_results.read().clone();
        let further = results.len() > query.limit;
        results.truncate(query.limit);
        Ok(QueryResult::new(results, further))
    }
}

/// Query engine answering every query with the same subjects
#[derive(Default)]
pub struct MockQueryEngine {
    results: Vec<Subject>,
    calls: AtomicUsize,
}

impl MockQueryEngine {
    pub fn new(results: Vec<Subject>) -> Self {
        Self {
            results,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl QueryEngine for MockQueryEngine {
    fn get_query_result(&self, _query: &Query) -> CacheResult<QueryResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(QueryResult::new(self.results.clone(), false))
    }
}

pub struct MockDependencyLinksValidator {
    can_check: bool,
    archaic: AtomicBool,
    checked: Vec<Subject>,
    calls: AtomicUsize,
}

impl MockDependencyLinksValidator {
    pub fn new(can_check: bool, archaic: bool, checked: Vec<Subject>) -> Self {
        Self {
            can_check,
            archaic: AtomicBool::new(archaic),
            checked,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_archaic(&self, archaic: bool) {
        self.archaic.store(archaic, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DependencyLinksValidator for MockDependencyLinksValidator {
    fn can_check_dependencies(&self, _subject: &Subject) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.can_check
    }

    fn has_archaic_dependencies(&self, _subject: &Subject) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.archaic.load(Ordering::SeqCst)
    }

    fn get_checked_dependencies(&self) -> Vec<Subject> {
        self.checked.clone()
    }
}

/// Memory backend that counts every operation
#[derive(Default)]
pub struct CountingBackend {
    inner: MemoryBackend,
    fetches: AtomicUsize,
    saves: AtomicUsize,
    deletes: AtomicUsize,
}

impl CountingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        self.fetches() + self.saves() + self.deletes()
    }
}

impl CacheBackend for CountingBackend {
    fn fetch(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch(key)
    }

    fn save(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> CacheResult<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.inner.save(key, value, ttl)
    }

    fn delete(&self, key: &str) -> CacheResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(key)
    }

    fn clear(&self) -> CacheResult<()> {
        self.inner.clear()
    }

    fn backend_type(&self) -> CacheType {
        CacheType::Memory
    }
}
