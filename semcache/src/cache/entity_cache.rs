// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Subject-aware cache over a [`CacheBackend`]
//!
//! Besides plain get/set/delete the entity cache offers:
//! - sub-entries: one cached record holds a map of inner entries, each
//!   addressed by the hash of a sub key, so one slice can change without
//!   rewriting the others
//! - associations: a subject's own record lists every derived cache key
//!   written on its behalf, so `invalidate(subject)` can drop all of them
//!
//! Backend failures always behave like a miss.

use super::backend::CacheBackend;
use super::{content_hash, make_key, prefix};
use crate::model::{Subject, TitleRef};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

/// Inputs that identify an entity for key construction
#[derive(Debug, Clone, Copy)]
pub enum CacheKeySource<'a> {
    Subject(&'a Subject),
    Title(&'a TitleRef),
    /// Serialized subject (`Subject::hash` form) or an arbitrary key string
    Raw(&'a str),
}

impl<'a> From<&'a Subject> for CacheKeySource<'a> {
    fn from(subject: &'a Subject) -> Self {
        CacheKeySource::Subject(subject)
    }
}

impl<'a> From<&'a TitleRef> for CacheKeySource<'a> {
    fn from(title: &'a TitleRef) -> Self {
        CacheKeySource::Title(title)
    }
}

impl<'a> From<&'a str> for CacheKeySource<'a> {
    fn from(raw: &'a str) -> Self {
        CacheKeySource::Raw(raw)
    }
}

impl<'a> From<&'a String> for CacheKeySource<'a> {
    fn from(raw: &'a String) -> Self {
        CacheKeySource::Raw(raw.as_str())
    }
}

impl CacheKeySource<'_> {
    /// Key material: the subject fingerprint where a subject exists
    fn material(&self) -> String {
        match self {
            CacheKeySource::Subject(subject) => subject.fingerprint(),
            CacheKeySource::Title(title) => title.to_subject().fingerprint(),
            CacheKeySource::Raw(raw) => match Subject::from_hash(raw) {
                Some(subject) => subject.fingerprint(),
                None => format!("raw:{}", raw),
            },
        }
    }

    /// The subject behind the input, `None` when it does not denote a valid one
    fn subject(&self) -> Option<Subject> {
        let subject = match self {
            CacheKeySource::Subject(subject) => (*subject).clone(),
            CacheKeySource::Title(title) => title.to_subject(),
            CacheKeySource::Raw(raw) => Subject::from_hash(raw)?,
        };
        subject.is_valid().then_some(subject)
    }
}

/// Record layout for sub-entries and associations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct EntityRecord {
    #[serde(rename = "__subject", default, skip_serializing_if = "Option::is_none")]
    subject: Option<String>,
    #[serde(rename = "__assoc", default, skip_serializing_if = "BTreeSet::is_empty")]
    assoc: BTreeSet<String>,
    #[serde(rename = "__sub", default, skip_serializing_if = "BTreeMap::is_empty")]
    subs: BTreeMap<String, serde_json::Value>,
}

pub struct EntityCache {
    backend: Arc<dyn CacheBackend>,
    ttl: Duration,
}

impl EntityCache {
    pub fn new(backend: Arc<dyn CacheBackend>, ttl: Duration) -> Self {
        Self { backend, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// `smw:entity:<hash>` key for a subject, title or serialized subject.
    /// All three forms of the same entity map to the same key.
    pub fn make_cache_key<'a>(source: impl Into<CacheKeySource<'a>>) -> String {
        let material = source.into().material();
        make_key(prefix::ENTITY, &[material.as_str()])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.backend.contains(key).unwrap_or_else(|e| {
            warn!("entity cache contains({}) failed: {}", key, e);
            false
        })
    }

    pub fn fetch<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let bytes = self.fetch_bytes(key)?;
        serde_json::from_slice(&bytes).ok()
    }

    pub fn save<T: Serialize>(&self, key: &str, value: &T, ttl: Option<Duration>) {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.save_bytes(key, &bytes, ttl),
            Err(e) => warn!("entity cache cannot encode value for {}: {}", key, e),
        }
    }

    pub fn delete(&self, key: &str) {
        if let Err(e) = self.backend.delete(key) {
            warn!("entity cache delete({}) failed: {}", key, e);
        }
    }

    pub fn fetch_sub<T: DeserializeOwned>(&self, key: &str, sub_key: &str) -> Option<T> {
        let record = self.read_record(key)?;
        record
            .subs
            .get(&content_hash(&[sub_key]))
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Set one sub-entry, keeping the others
    pub fn save_sub<T: Serialize>(&self, key: &str, sub_key: &str, value: &T, ttl: Option<Duration>) {
        let record = self.read_record(key).unwrap_or_default();
        self.write_sub(key, record, sub_key, value, ttl);
    }

    /// Replace the whole record with a single sub-entry
    pub fn override_sub<T: Serialize>(
        &self,
        key: &str,
        sub_key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) {
        self.write_sub(key, EntityRecord::default(), sub_key, value, ttl);
    }

    pub fn delete_sub(&self, key: &str, sub_key: &str) {
        let mut record = match self.read_record(key) {
            Some(record) => record,
            None => return,
        };

        if record.subs.remove(&content_hash(&[sub_key])).is_some() {
            self.write_record(key, &record, None);
        }
    }

    /// Record `key` as derived from `subject`. Inputs that do not denote a
    /// valid subject are ignored.
    pub fn associate<'a>(&self, subject: impl Into<CacheKeySource<'a>>, key: &str) {
        let subject = match subject.into().subject() {
            Some(subject) => subject,
            None => return,
        };

        let record_key = Self::make_cache_key(&subject);
        let mut record = self.read_record(&record_key).unwrap_or_default();
        record.assoc.insert(key.to_string());
        record.subject = Some(subject.hash());

        self.write_record(&record_key, &record, Some(self.ttl));
    }

    /// Delete every key associated with `subject`, then the subject's record.
    /// Inputs that do not denote a valid subject are ignored.
    pub fn invalidate<'a>(&self, subject: impl Into<CacheKeySource<'a>>) {
        let subject = match subject.into().subject() {
            Some(subject) => subject,
            None => return,
        };

        let record_key = Self::make_cache_key(&subject);
        if let Some(record) = self.read_record(&record_key) {
            for key in &record.assoc {
                debug!("invalidating {} (associated with {})", key, subject);
                self.delete(key);
            }
        }

        self.delete(&record_key);
    }

    /// Keys currently associated with `subject`
    pub fn associations(&self, subject: &Subject) -> Vec<String> {
        self.read_record(&Self::make_cache_key(subject))
            .map(|record| record.assoc.into_iter().collect())
            .unwrap_or_default()
    }

    fn fetch_bytes(&self, key: &str) -> Option<Vec<u8>> {
        match self.backend.fetch(key) {
            Ok(value) => value,
            Err(e) => {
                warn!("entity cache fetch({}) failed: {}", key, e);
                None
            }
        }
    }

    fn save_bytes(&self, key: &str, bytes: &[u8], ttl: Option<Duration>) {
        if let Err(e) = self.backend.save(key, bytes, ttl.or(Some(self.ttl))) {
            warn!("entity cache save({}) failed: {}", key, e);
        }
    }

    fn read_record(&self, key: &str) -> Option<EntityRecord> {
        let bytes = self.fetch_bytes(key)?;
        serde_json::from_slice(&bytes).ok()
    }

    fn write_record(&self, key: &str, record: &EntityRecord, ttl: Option<Duration>) {
        self.save(key, record, ttl);
    }

    fn write_sub<T: Serialize>(
        &self,
        key: &str,
        mut record: EntityRecord,
        sub_key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) {
        match serde_json::to_value(value) {
            Ok(value) => {
                record.subs.insert(content_hash(&[sub_key]), value);
                self.write_record(key, &record, ttl);
            }
            Err(e) => warn!("entity cache cannot encode sub {} of {}: {}", sub_key, key, e),
        }
    }
}
