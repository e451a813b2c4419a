// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Stats collector that buffers operations in memory and merges them into a
//! blob-store container on `record_stats`

use super::StatsCollector;
use crate::cache::{make_key, prefix, BlobStore};
use log::{debug, warn};
use parking_lot::Mutex;
use std::collections::BTreeMap;

const STATS_FIELD: &str = "stats";

#[derive(Debug, Clone, Copy, PartialEq)]
enum PendingStat {
    Count(f64),
    Value(f64),
    Average(f64),
}

pub struct TransientStatsCollector {
    container_id: String,
    store: Option<BlobStore>,
    pending: Mutex<BTreeMap<String, PendingStat>>,
    /// Recorded stats when no blob store is attached
    local: Mutex<BTreeMap<String, f64>>,
}

impl TransientStatsCollector {
    /// Collector that keeps recorded stats in process memory
    pub fn new(id: &str) -> Self {
        Self {
            container_id: make_key(prefix::STATS, &[id]),
            store: None,
            pending: Mutex::new(BTreeMap::new()),
            local: Mutex::new(BTreeMap::new()),
        }
    }

    /// Collector that persists recorded stats into `store`
    pub fn with_store(id: &str, store: BlobStore) -> Self {
        Self {
            store: Some(store),
            ..Self::new(id)
        }
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    fn recorded(&self) -> BTreeMap<String, f64> {
        match &self.store {
            Some(store) => store
                .read(&self.container_id)
                .get::<BTreeMap<String, f64>>(STATS_FIELD)
                .unwrap_or_default(),
            None => self.local.lock().clone(),
        }
    }

    fn merge(target: &mut BTreeMap<String, f64>, pending: &BTreeMap<String, PendingStat>) {
        for (key, stat) in pending {
            let current = target.get(key).copied().unwrap_or(0.0);
            let merged = match *stat {
                PendingStat::Count(n) => current + n,
                PendingStat::Value(v) => v,
                PendingStat::Average(v) if current > 0.0 => (current + v) / 2.0,
                PendingStat::Average(v) => v,
            };
            target.insert(key.clone(), merged);
        }
    }
}

impl StatsCollector for TransientStatsCollector {
    fn incr(&self, key: &str) {
        let mut pending = self.pending.lock();
        let next = match pending.get(key) {
            Some(PendingStat::Count(n)) => PendingStat::Count(n + 1.0),
            _ => PendingStat::Count(1.0),
        };
        pending.insert(key.to_string(), next);
    }

    fn set(&self, key: &str, value: f64) {
        self.pending
            .lock()
            .insert(key.to_string(), PendingStat::Value(value));
    }

    fn calc_average(&self, key: &str, value: f64) {
        let mut pending = self.pending.lock();
        let next = match pending.get(key) {
            Some(PendingStat::Average(current)) if *current > 0.0 => {
                PendingStat::Average((current + value) / 2.0)
            }
            _ => PendingStat::Average(value),
        };
        pending.insert(key.to_string(), next);
    }

    fn record_stats(&self) {
        let pending = std::mem::take(&mut *self.pending.lock());
        if pending.is_empty() {
            return;
        }

        let mut recorded = self.recorded();
        Self::merge(&mut recorded, &pending);
        debug!("recording {} stat(s) into {}", pending.len(), self.container_id);

        match &self.store {
            Some(store) => {
                let mut container = store.read(&self.container_id);
                if let Err(e) = container.set(STATS_FIELD, &recorded) {
                    warn!("cannot encode stats for {}: {}", self.container_id, e);
                    return;
                }
                store.save(&container);
            }
            None => *self.local.lock() = recorded,
        }
    }

    fn get_stats(&self) -> BTreeMap<String, f64> {
        let mut stats = self.recorded();
        Self::merge(&mut stats, &self.pending.lock());
        stats
    }
}
