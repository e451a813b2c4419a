// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Namespaced blob containers
//!
//! A [`Container`] is a small JSON document stored under one id. Containers
//! can link to other container ids; deleting a container through the
//! [`BlobStore`] deletes everything on its linked list as well. This is how
//! "drop every query embedded on page X" works without recomputing keys.

use super::backend::CacheBackend;
use crate::error::{CacheError, CacheResult};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct ContainerData {
    #[serde(default)]
    data: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    linked_list: BTreeSet<String>,
}

/// Key-value document read from and saved to a [`BlobStore`]
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    id: String,
    content: ContainerData,
    expiry: Option<Duration>,
}

impl Container {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: ContainerData::default(),
            expiry: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn has(&self, key: &str) -> bool {
        self.content.data.contains_key(key)
    }

    /// Typed read; a value of the wrong shape reads as absent
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.content
            .data
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    pub fn get_raw(&self, key: &str) -> Option<&serde_json::Value> {
        self.content.data.get(key)
    }

    pub fn set<T: Serialize>(&mut self, key: impl Into<String>, value: &T) -> CacheResult<()> {
        let value = serde_json::to_value(value)?;
        self.content.data.insert(key.into(), value);
        Ok(())
    }

    pub fn delete(&mut self, key: &str) {
        self.content.data.remove(key);
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.content.data.keys()
    }

    /// Link another container id; it is deleted together with this one
    pub fn add_to_linked_list(&mut self, id: impl Into<String>) {
        self.content.linked_list.insert(id.into());
    }

    pub fn linked_list(&self) -> &BTreeSet<String> {
        &self.content.linked_list
    }

    pub fn set_expiry(&mut self, ttl: Duration) {
        self.expiry = Some(ttl);
    }

    pub fn expiry(&self) -> Option<Duration> {
        self.expiry
    }

    pub fn is_empty(&self) -> bool {
        self.content.data.is_empty() && self.content.linked_list.is_empty()
    }
}

/// Container store over a [`CacheBackend`]
///
/// Backend failures never escape: reads degrade to empty containers and
/// writes are logged and dropped.
#[derive(Clone)]
pub struct BlobStore {
    namespace: String,
    backend: Arc<dyn CacheBackend>,
    default_ttl: Option<Duration>,
}

impl BlobStore {
    pub fn new(namespace: impl Into<String>, backend: Arc<dyn CacheBackend>) -> Self {
        Self {
            namespace: namespace.into(),
            backend,
            default_ttl: None,
        }
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = Some(ttl);
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn can_use(&self) -> bool {
        self.backend.can_use()
    }

    fn storage_key(&self, id: &str) -> String {
        format!("{}:{}", self.namespace, id)
    }

    /// Read a container; a missing or undecodable entry yields an empty one
    pub fn read(&self, id: &str) -> Container {
        let mut container = Container::new(id);

        match self.backend.fetch(&self.storage_key(id)) {
            Ok(Some(bytes)) => match serde_json::from_slice::<ContainerData>(&bytes) {
                Ok(content) => container.content = content,
                Err(e) => warn!("discarding undecodable container {}: {}", id, e),
            },
            Ok(None) => {}
            Err(e) => warn!("blob store read failed for {}: {}", id, e),
        }

        container
    }

    pub fn save(&self, container: &Container) {
        let ttl = container.expiry.or(self.default_ttl);
        let result = serde_json::to_vec(&container.content)
            .map_err(CacheError::from)
            .and_then(|bytes| self.backend.save(&self.storage_key(&container.id), &bytes, ttl));

        if let Err(e) = result {
            warn!("blob store save failed for {}: {}", container.id, e);
        }
    }

    pub fn exists(&self, id: &str) -> bool {
        self.backend
            .contains(&self.storage_key(id))
            .unwrap_or_else(|e| {
                warn!("blob store exists check failed for {}: {}", id, e);
                false
            })
    }

    /// Delete a container and, transitively, everything on its linked list
    pub fn delete(&self, id: &str) {
        let mut seen = HashSet::new();
        self.delete_cascade(id, &mut seen);
    }

    fn delete_cascade(&self, id: &str, seen: &mut HashSet<String>) {
        if !seen.insert(id.to_string()) {
            return;
        }

        let container = self.read(id);
        for linked in container.linked_list() {
            debug!("cascading delete {} -> {}", id, linked);
            self.delete_cascade(linked, seen);
        }

        if let Err(e) = self.backend.delete(&self.storage_key(id)) {
            warn!("blob store delete failed for {}: {}", id, e);
        }
    }
}
