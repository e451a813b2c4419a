// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Cached property value lookups
//!
//! All values of one page share a container, keyed by the page's base
//! subject; each (property, subobject, options) lookup is one field in it.

use crate::cache::{make_key, prefix, BlobStore};
use crate::error::CacheResult;
use crate::model::{DataItem, Property, Query, RequestOptions, Subject};
use crate::store::Store;
use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;

pub struct CachedPropertyValuesPrefetcher {
    store: Arc<dyn Store>,
    blob_store: BlobStore,
    ttl: Duration,
}

impl CachedPropertyValuesPrefetcher {
    pub fn new(store: Arc<dyn Store>, blob_store: BlobStore, ttl: Duration) -> Self {
        Self {
            store,
            blob_store,
            ttl,
        }
    }

    pub fn blob_store(&self) -> &BlobStore {
        &self.blob_store
    }

    /// Container shared by a page and all of its subobjects
    pub fn container_id(subject: &Subject) -> String {
        let base = subject.as_base().fingerprint();
        make_key(prefix::PROPERTY_VALUES, &[base.as_str()])
    }

    /// `<property>:<subobject>` plus the options fingerprint when present.
    /// `:` and `\` inside either part are backslash-escaped.
    pub fn field_key(subject: &Subject, property: &Property, options: Option<&RequestOptions>) -> String {
        let key = format!(
            "{}:{}",
            escape_field_part(&property.to_string()),
            escape_field_part(&subject.subobject)
        );
        match options {
            Some(options) => format!("{}:{}", key, options.hash()),
            None => key,
        }
    }

    pub fn get_property_values(
        &self,
        subject: &Subject,
        property: &Property,
        options: Option<&RequestOptions>,
    ) -> CacheResult<Vec<DataItem>> {
        if !self.blob_store.can_use() {
            return self.store.get_property_values(subject, property, options);
        }

        let id = Self::container_id(subject);
        let field = Self::field_key(subject, property, options);
        let mut container = self.blob_store.read(&id);

        if let Some(values) = container.get::<Vec<DataItem>>(&field) {
            debug!("property values hit for {} ({})", subject, field);
            return Ok(values);
        }

        let values = self.store.get_property_values(subject, property, options)?;
        debug!("property values miss for {} ({}), {} value(s)", subject, field, values.len());

        match container.set(field.as_str(), &values) {
            Ok(()) => {
                container.set_expiry(self.ttl);
                self.blob_store.save(&container);
            }
            Err(e) => warn!("cannot cache values for {}: {}", subject, e),
        }

        Ok(values)
    }

    /// Subjects matched by `query`, answered by the store without caching
    pub fn query_property_values_for(&self, query: &Query) -> CacheResult<Vec<Subject>> {
        Ok(self.store.get_query_result(query)?.results)
    }

    /// Drop every cached value of the subject's page
    pub fn reset_cache_by(&self, subject: &Subject) {
        self.blob_store.delete(&Self::container_id(subject));
    }
}

fn escape_field_part(part: &str) -> String {
    if !part.contains(|c: char| c == ':' || c == '\\') {
        return part.to_string();
    }
    part.replace('\\', "\\\\").replace(':', "\\:")
}
