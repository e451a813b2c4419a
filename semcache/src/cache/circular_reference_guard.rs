// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Recursion guard for transitive lookups
//!
//! Resolving hierarchy chains or redirects can re-enter the same lookup from
//! a different object. The guard counts how often an id is currently being
//! resolved, per namespace, in a registry shared by every guard created with
//! the same namespace string.

use log::warn;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

pub const DEFAULT_MAX_RECURSION_DEPTH: u32 = 2;

/// Process-wide default registry for guards that are not given one
static GLOBAL_GUARD_REGISTRY: Lazy<Arc<GuardRegistry>> =
    Lazy::new(|| Arc::new(GuardRegistry::new()));

/// Recursion counts: namespace -> id -> count
#[derive(Debug, Default)]
pub struct GuardRegistry {
    counts: Mutex<HashMap<String, HashMap<String, u32>>>,
}

impl GuardRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global() -> Arc<GuardRegistry> {
        GLOBAL_GUARD_REGISTRY.clone()
    }

    fn mark(&self, namespace: &str, id: &str) {
        let mut counts = self.counts.lock();
        *counts
            .entry(namespace.to_string())
            .or_default()
            .entry(id.to_string())
            .or_insert(0) += 1;
    }

    fn unmark(&self, namespace: &str, id: &str) {
        let mut counts = self.counts.lock();
        if let Some(ids) = counts.get_mut(namespace) {
            if let Some(count) = ids.get_mut(id) {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    ids.remove(id);
                }
            }
        }
    }

    fn get(&self, namespace: &str, id: &str) -> u32 {
        self.counts
            .lock()
            .get(namespace)
            .and_then(|ids| ids.get(id))
            .copied()
            .unwrap_or(0)
    }

    /// Forget all counts of one namespace
    pub fn reset(&self, namespace: &str) {
        self.counts.lock().remove(namespace);
    }

    /// Forget everything (request or test boundary)
    pub fn clear(&self) {
        self.counts.lock().clear();
    }
}

#[derive(Debug, Clone)]
pub struct CircularReferenceGuard {
    namespace: String,
    max_recursion_depth: u32,
    registry: Arc<GuardRegistry>,
}

impl CircularReferenceGuard {
    /// Guard backed by the process-wide registry
    pub fn new(namespace: impl Into<String>) -> Self {
        Self::with_registry(namespace, GuardRegistry::global())
    }

    pub fn with_registry(namespace: impl Into<String>, registry: Arc<GuardRegistry>) -> Self {
        Self {
            namespace: namespace.into(),
            max_recursion_depth: DEFAULT_MAX_RECURSION_DEPTH,
            registry,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn set_max_recursion_depth(&mut self, depth: u32) {
        self.max_recursion_depth = depth;
    }

    pub fn max_recursion_depth(&self) -> u32 {
        self.max_recursion_depth
    }

    pub fn mark(&self, id: &str) {
        self.registry.mark(&self.namespace, id);
    }

    /// Decrement; a count already at zero stays at zero
    pub fn unmark(&self, id: &str) {
        self.registry.unmark(&self.namespace, id);
    }

    pub fn get(&self, id: &str) -> u32 {
        self.registry.get(&self.namespace, id)
    }

    pub fn is_circular_by_recursion_for(&self, id: &str) -> bool {
        let circular = self.get(id) > self.max_recursion_depth;
        if circular {
            warn!(
                "circular reference detected for '{}' in namespace '{}'",
                id, self.namespace
            );
        }
        circular
    }

    pub fn reset(&self, namespace: &str) {
        self.registry.reset(namespace);
    }

    /// Mark `id` for the lifetime of the returned handle
    pub fn enter<'a>(&'a self, id: &str) -> GuardMark<'a> {
        self.mark(id);
        GuardMark {
            guard: self,
            id: id.to_string(),
        }
    }
}

/// Unmarks its id when dropped
#[must_use = "the mark is released as soon as this value is dropped"]
pub struct GuardMark<'a> {
    guard: &'a CircularReferenceGuard,
    id: String,
}

impl GuardMark<'_> {
    pub fn is_circular(&self) -> bool {
        self.guard.is_circular_by_recursion_for(&self.id)
    }
}

impl Drop for GuardMark<'_> {
    fn drop(&mut self) {
        self.guard.unmark(&self.id);
    }
}
