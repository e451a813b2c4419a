//! Hierarchy lookup scenarios against a call-counting store

#[path = "testutils/mod.rs"]
mod testutils;

use semcache::cache::{CircularReferenceGuard, GuardRegistry, TTL_HOUR};
use semcache::{
    CacheContext, CacheError, Direction, EntityCache, HierarchyLookup, HierarchyRelation,
    Property, Subject,
};
use std::sync::Arc;
use testutils::fixture::{category, init_logging, page, property_page};
use testutils::mocks::{CountingBackend, MockStore};

fn lookup_with(store: Arc<MockStore>, backend: Arc<CountingBackend>) -> (HierarchyLookup, Arc<EntityCache>) {
    let cache = Arc::new(EntityCache::new(backend, TTL_HOUR));
    let guard = CircularReferenceGuard::with_registry("hierarchy", Arc::new(GuardRegistry::new()));
    (HierarchyLookup::new(store, cache.clone(), guard), cache)
}

fn chain_store() -> Arc<MockStore> {
    let store = MockStore::new();
    store.add_subproperty("Foo", "Bar");
    store.add_subproperty("Bar", "Foobar");
    Arc::new(store)
}

#[test]
fn test_consecutive_hierarchy_to_depth_two() {
    init_logging();
    let store = chain_store();
    let (lookup, cache) = lookup_with(store.clone(), Arc::new(CountingBackend::new()));
    lookup.set_subproperty_depth(2);

    let foo = property_page("Foo");
    let list = lookup
        .get_consecutive_hierarchy_list(&foo, Direction::Sub)
        .unwrap();
    assert_eq!(list, vec![property_page("Bar"), property_page("Foobar")]);

    let sub_key = HierarchyLookup::list_sub_key(&foo, Direction::Sub, 2);
    assert!(sub_key.contains(&foo.fingerprint()));

    let cached = cache
        .fetch::<Vec<Subject>>(&lookup.entry_key(HierarchyRelation::Property, &sub_key))
        .unwrap();
    assert_eq!(cached, vec![property_page("Bar"), property_page("Foobar")]);
}

#[test]
fn test_miss_for_one_entity_leaves_other_entries_alone() {
    let store = MockStore::new();
    store.add_subproperty("Foo", "Bar");
    store.add_subproperty("Baz", "Qux");
    let store = Arc::new(store);
    let backend = Arc::new(CountingBackend::new());
    let (lookup, cache) = lookup_with(store.clone(), backend.clone());
    let foo = Property::new("Foo");
    let baz = Property::new("Baz");

    lookup.find_subproperty_list(&foo).unwrap();
    assert!(cache
        .fetch::<String>(&HierarchyLookup::generation_key(HierarchyRelation::Property))
        .is_some());

    let saves = backend.saves();
    assert_eq!(
        lookup.find_subproperty_list(&baz).unwrap(),
        vec![property_page("Qux")]
    );
    assert_eq!(backend.saves(), saves + 1);

    let calls = store.total_calls();
    assert_eq!(
        lookup.find_subproperty_list(&foo).unwrap(),
        vec![property_page("Bar")]
    );
    assert_eq!(store.total_calls(), calls);
}

#[test]
fn test_cached_lists_keep_hash_signs_in_names() {
    let store = MockStore::new();
    let parent = category("Parent");
    let odd = category("C#").with_subobject("x#1");
    store.add_subcategory(&parent, &odd);
    store.add_subcategory(&parent, &category("Plain"));
    let (lookup, _) = lookup_with(Arc::new(store), Arc::new(CountingBackend::new()));

    let miss = lookup
        .get_consecutive_hierarchy_list(&parent, Direction::Sub)
        .unwrap();
    let hit = lookup
        .get_consecutive_hierarchy_list(&parent, Direction::Sub)
        .unwrap();
    assert_eq!(miss, vec![odd, category("Plain")]);
    assert_eq!(hit, miss);
}

#[test]
fn test_cache_hit_avoids_store_calls() {
    let store = chain_store();
    let (lookup, _) = lookup_with(store.clone(), Arc::new(CountingBackend::new()));
    let foo = Property::new("Foo");

    let first = lookup
        .get_consecutive_property_hierarchy(&foo, Direction::Sub)
        .unwrap();
    let calls = store.total_calls();
    assert!(calls > 0);

    let second = lookup
        .get_consecutive_property_hierarchy(&foo, Direction::Sub)
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(first, vec![Property::new("Bar"), Property::new("Foobar")]);
    assert_eq!(store.total_calls(), calls);
}

#[test]
fn test_depth_zero_short_circuits() {
    init_logging();
    let store = chain_store();
    let backend = Arc::new(CountingBackend::new());
    let (lookup, _) = lookup_with(store.clone(), backend.clone());
    lookup.set_subproperty_depth(0);
    lookup.set_subcategory_depth(0);

    let foo = Property::new("Foo");
    assert!(!lookup.has_subproperty(&foo).unwrap());
    assert!(lookup.find_subproperty_list(&foo).unwrap().is_empty());
    assert!(lookup.find_superproperty_list(&foo).unwrap().is_empty());
    assert!(lookup
        .get_consecutive_hierarchy_list(&foo.to_subject(), Direction::Sub)
        .unwrap()
        .is_empty());
    assert!(!lookup.has_subcategory(&category("Animals")).unwrap());

    assert_eq!(store.total_calls(), 0);
    assert_eq!(backend.total(), 0);
}

#[test]
fn test_single_hop_lookups() {
    let store = chain_store();
    let (lookup, _) = lookup_with(store, Arc::new(CountingBackend::new()));

    assert!(lookup.has_subproperty(&Property::new("Foo")).unwrap());
    assert!(!lookup.has_subproperty(&Property::new("Foobar")).unwrap());
    assert_eq!(
        lookup.find_subproperty_list(&Property::new("Foo")).unwrap(),
        vec![property_page("Bar")]
    );
    assert_eq!(
        lookup.find_superproperty_list(&Property::new("Foobar")).unwrap(),
        vec![property_page("Bar")]
    );
}

#[test]
fn test_category_hierarchy_both_directions() {
    let store = MockStore::new();
    store.add_subcategory(&category("Animals"), &category("Mammals"));
    store.add_subcategory(&category("Mammals"), &category("Cats"));
    let (lookup, _) = lookup_with(Arc::new(store), Arc::new(CountingBackend::new()));

    assert!(lookup.has_subcategory(&category("Animals")).unwrap());
    assert_eq!(
        lookup.find_subcategory_list(&category("Animals")).unwrap(),
        vec![category("Mammals")]
    );
    assert_eq!(
        lookup.find_supercategory_list(&category("Cats")).unwrap(),
        vec![category("Mammals")]
    );
    assert_eq!(
        lookup
            .get_consecutive_hierarchy_list(&category("Cats"), Direction::Super)
            .unwrap(),
        vec![category("Mammals"), category("Animals")]
    );
}

#[test]
fn test_traversal_of_plain_page_is_rejected() {
    let (lookup, _) = lookup_with(Arc::new(MockStore::new()), Arc::new(CountingBackend::new()));

    let err = lookup
        .get_consecutive_hierarchy_list(&page("Foo"), Direction::Sub)
        .unwrap_err();
    assert!(matches!(err, CacheError::InvalidTraversal(_)));
}

#[test]
fn test_subproperty_edit_invalidates_through_context() {
    init_logging();
    let store = chain_store();
    let context = CacheContext::in_memory(store.clone()).unwrap();
    let lookup = context.hierarchy_lookup();
    let foo = Property::new("Foo");

    assert_eq!(lookup.find_subproperty_list(&foo).unwrap().len(), 1);
    let calls = store.total_calls();

    store.add_subproperty("Foo", "Baz");
    assert_eq!(lookup.find_subproperty_list(&foo).unwrap().len(), 1);

    context
        .change_listener()
        .record_change(Property::SUBPROPERTY_OF, &property_page("Baz"));
    assert_eq!(context.process_changes(), 1);

    let refreshed = lookup.find_subproperty_list(&foo).unwrap();
    assert_eq!(refreshed, vec![property_page("Bar"), property_page("Baz")]);
    assert_eq!(store.total_calls(), calls + 1);
}

#[test]
fn test_cycles_terminate() {
    let store = MockStore::new();
    store.add_subproperty("A", "B");
    store.add_subproperty("B", "C");
    store.add_subproperty("C", "A");
    let (lookup, _) = lookup_with(Arc::new(store), Arc::new(CountingBackend::new()));

    let list = lookup
        .get_consecutive_hierarchy_list(&Subject::new("A", 102), Direction::Sub)
        .unwrap();
    assert_eq!(list, vec![property_page("B"), property_page("C")]);
}
