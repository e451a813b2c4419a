//! Shared setup for integration tests

use semcache::model::namespace;
use semcache::{Property, Subject};

/// Route `log` output through the test harness; safe to call repeatedly
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn page(name: &str) -> Subject {
    Subject::new(name, namespace::MAIN)
}

pub fn property_page(name: &str) -> Subject {
    Property::new(name).to_subject()
}

pub fn category(name: &str) -> Subject {
    Subject::new(name, namespace::CATEGORY)
}

/// Namespace string that no other test uses
pub fn unique_namespace(prefix: &str) -> String {
    format!("{}_{}", prefix, fastrand::u64(..))
}
