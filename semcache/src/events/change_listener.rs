// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Property change callbacks
//!
//! A store write records which watched properties changed; `match_and_run`
//! fires the registered callbacks once per recorded change.

use crate::model::Subject;
use log::debug;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;

/// Called with the changed property key and the subject that was written
pub type ChangeCallback = Arc<dyn Fn(&str, &Subject) + Send + Sync>;

#[derive(Default)]
pub struct ChangePropListener {
    callbacks: RwLock<HashMap<String, Vec<ChangeCallback>>>,
    pending: Mutex<Vec<(String, Subject)>>,
}

impl ChangePropListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener_callback<F>(&self, property_key: impl Into<String>, callback: F)
    where
        F: Fn(&str, &Subject) + Send + Sync + 'static,
    {
        self.callbacks
            .write()
            .entry(property_key.into())
            .or_default()
            .push(Arc::new(callback));
    }

    pub fn has_listener(&self, property_key: &str) -> bool {
        self.callbacks
            .read()
            .get(property_key)
            .map(|callbacks| !callbacks.is_empty())
            .unwrap_or(false)
    }

    /// Remember a change; changes to unwatched properties are dropped
    pub fn record_change(&self, property_key: &str, subject: &Subject) {
        if !self.has_listener(property_key) {
            return;
        }

        self.pending
            .lock()
            .push((property_key.to_string(), subject.clone()));
    }

    pub fn pending_changes(&self) -> usize {
        self.pending.lock().len()
    }

    /// Run callbacks for all recorded changes and forget them.
    /// Returns the number of callbacks invoked.
    pub fn match_and_run(&self) -> usize {
        let changes: Vec<(String, Subject)> = std::mem::take(&mut *self.pending.lock());
        let mut invoked = 0;

        for (key, subject) in changes {
            let callbacks = self.callbacks.read().get(&key).cloned().unwrap_or_default();
            debug!("change on {} for {}: {} callback(s)", key, subject, callbacks.len());

            for callback in callbacks {
                callback(&key, &subject);
                invoked += 1;
            }
        }

        invoked
    }

    /// Forget recorded changes, keep the callbacks
    pub fn clear_pending(&self) {
        self.pending.lock().clear();
    }

    pub fn clear(&self) {
        self.callbacks.write().clear();
        self.pending.lock().clear();
    }
}
