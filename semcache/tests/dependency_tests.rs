//! Dependency validation: ETag keep/rebuild, archaic dependencies and
//! same-request title markers

#[path = "testutils/mod.rs"]
mod testutils;

use semcache::dependency::ETAG_SUB_KEY;
use semcache::model::namespace;
use semcache::{CacheContext, DependencyValidator, Query, Subject, TitleRef};
use std::sync::Arc;
use testutils::fixture::{init_logging, page};
use testutils::mocks::{MockDependencyLinksValidator, MockStore};

fn context() -> (CacheContext, Arc<MockStore>) {
    let store = Arc::new(MockStore::new());
    (CacheContext::in_memory(store.clone()).unwrap(), store)
}

#[test]
fn test_etag_keep_and_rebuild() {
    init_logging();
    let (context, _) = context();
    let validator = context.dependency_validator(Arc::new(MockDependencyLinksValidator::new(
        true,
        false,
        Vec::new(),
    )));
    let subject = page("Foo");
    let key = DependencyValidator::cache_key(&subject);
    validator.set_etag("etag-1");

    // nothing cached yet
    assert!(validator.can_keep_parser_cache(&subject));

    context
        .entity_cache()
        .save_sub(&key, ETAG_SUB_KEY, &"etag-1", None);
    assert!(validator.can_keep_parser_cache(&subject));

    validator.set_etag("etag-2");
    assert!(!validator.can_keep_parser_cache(&subject));
    assert_eq!(
        context.entity_cache().fetch_sub::<String>(
            &key,
            ETAG_SUB_KEY
        ),
        Some("etag-2".to_string())
    );
    assert!(validator.can_keep_parser_cache(&subject));
}

#[test]
fn test_non_semantic_namespace_skips_the_links_validator() {
    let (context, _) = context();
    let links = Arc::new(MockDependencyLinksValidator::new(true, true, Vec::new()));
    let validator = context.dependency_validator(links.clone());

    let file = Subject::new("Image.png", 6);
    assert!(!context.config().is_semantic_enabled(file.namespace));
    assert!(!validator.has_archaic_dependencies(&file));
    assert_eq!(links.calls(), 0);
}

#[test]
fn test_unchecked_dependencies_are_not_archaic() {
    let (context, _) = context();
    let links = Arc::new(MockDependencyLinksValidator::new(false, true, Vec::new()));
    let validator = context.dependency_validator(links);

    assert!(!validator.has_archaic_dependencies(&page("Foo")));
    assert!(context.dispatcher().recent_events(1).is_empty());
}

#[test]
fn test_archaic_dependencies_invalidate_results_and_etag() {
    init_logging();
    let (context, store) = context();
    store.set_query_results(vec![page("A")]);
    let dependency = Subject::new("Dependency", namespace::MAIN);
    let links = Arc::new(MockDependencyLinksValidator::new(
        true,
        true,
        vec![dependency.clone()],
    ));
    let validator = context.dependency_validator(links.clone());
    let prefetcher = context.query_result_prefetcher();

    let on_dependency = Query::new("[[Foo::+]]").with_context_page(dependency.clone());
    prefetcher.get_query_result(&on_dependency).unwrap();
    assert!(prefetcher.get_query_result(&on_dependency).unwrap().from_cache);

    let subject = page("Foo");
    validator.set_etag("current");
    assert!(validator.has_archaic_dependencies(&subject));

    // results on the dependency's page are gone
    assert!(!prefetcher.get_query_result(&on_dependency).unwrap().from_cache);

    // the archaic marker forces one rebuild
    assert!(!validator.can_keep_parser_cache(&subject));
    assert!(validator.can_keep_parser_cache(&subject));

    let events = context.dispatcher().recent_events(1);
    assert_eq!(events[0].0.subject(), &subject);

    links.set_archaic(false);
    assert!(!validator.has_archaic_dependencies(&subject));
}

#[test]
fn test_title_markers_are_request_scoped() {
    let (context, _) = context();
    let validator = context.dependency_validator(Arc::new(MockDependencyLinksValidator::new(
        true,
        false,
        Vec::new(),
    )));
    let title = TitleRef::new("Foo bar", namespace::MAIN);

    validator.mark_title(&title);
    assert!(validator.has_likely_outdated_dependencies(&title));

    context.clear();
    assert!(!validator.has_likely_outdated_dependencies(&title));
}
