//! Entity cache behavior over real backends
//!
//! Covers key normalization, sub-entry isolation, the association index and
//! miss-on-failure semantics.

#[path = "testutils/mod.rs"]
mod testutils;

use semcache::cache::backend::{MemoryBackend, PoolBackend};
use semcache::cache::{InMemoryPoolCache, TTL_HOUR};
use semcache::{EntityCache, Subject, TitleRef};
use std::sync::Arc;
use testutils::fixture::{init_logging, page};
use testutils::mocks::CountingBackend;

fn pool_backed_cache() -> EntityCache {
    let pools = InMemoryPoolCache::default();
    let backend = PoolBackend::new(pools.get_pool_cache_for("entity.cache"));
    EntityCache::new(Arc::new(backend), TTL_HOUR)
}

#[test]
fn test_keys_are_equal_for_equal_subjects() {
    init_logging();

    let a = Subject::new("Main Page", 0).with_subobject("_QUERY1");
    let b = Subject::new("Main_Page", 0).with_subobject("_QUERY1");
    assert_eq!(EntityCache::make_cache_key(&a), EntityCache::make_cache_key(&b));

    let title = TitleRef::new("Main Page", 0);
    assert_eq!(
        EntityCache::make_cache_key(&title),
        EntityCache::make_cache_key(&Subject::new("Main_Page", 0))
    );
}

#[test]
fn test_keys_differ_for_distinct_subjects() {
    let names = ["Foo", "Bar", "Foobar", "Foo_bar", "Foo#1"];
    let keys: std::collections::HashSet<String> = names
        .iter()
        .map(|name| EntityCache::make_cache_key(&page(name)))
        .collect();
    assert_eq!(keys.len(), names.len());
}

#[test]
fn test_sub_key_isolation_on_pool_backend() {
    init_logging();
    let cache = pool_backed_cache();

    cache.save_sub("k", "a", &"v1", None);
    cache.save_sub("k", "b", &"v2", None);
    assert_eq!(cache.fetch_sub::<String>("k", "a").as_deref(), Some("v1"));
    assert_eq!(cache.fetch_sub::<String>("k", "b").as_deref(), Some("v2"));

    cache.delete_sub("k", "a");
    assert_eq!(cache.fetch_sub::<String>("k", "a"), None);
    assert_eq!(cache.fetch_sub::<String>("k", "b").as_deref(), Some("v2"));
}

#[test]
fn test_association_round_trip() {
    init_logging();
    let backend = Arc::new(MemoryBackend::new());
    let cache = EntityCache::new(backend.clone(), TTL_HOUR);
    let subject = page("Foo");

    cache.save("smw:query:one", &vec![1, 2], None);
    cache.save("smw:pv:two", &"value", None);
    cache.associate(&subject, "smw:query:one");
    cache.associate(&subject.hash(), "smw:pv:two");

    let mut associated = cache.associations(&subject);
    associated.sort();
    assert_eq!(associated, vec!["smw:pv:two", "smw:query:one"]);

    cache.invalidate(&subject);
    assert!(!cache.contains("smw:query:one"));
    assert!(!cache.contains("smw:pv:two"));
    assert!(!cache.contains(&EntityCache::make_cache_key(&subject)));
    assert!(backend.is_empty());
}

#[test]
fn test_invalid_input_never_touches_the_backend() {
    let backend = Arc::new(CountingBackend::new());
    let cache = EntityCache::new(backend.clone(), TTL_HOUR);

    cache.associate("garbage", "smw:query:one");
    cache.invalidate("garbage");
    cache.invalidate("#0##");

    assert_eq!(backend.total(), 0);
}

#[test]
fn test_unassociated_subject_invalidation_is_harmless() {
    let cache = pool_backed_cache();
    cache.save("unrelated", &1, None);

    cache.invalidate(&page("Nobody"));
    assert_eq!(cache.fetch::<i32>("unrelated"), Some(1));
}
