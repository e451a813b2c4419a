// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Cache usage statistics

pub mod transient_collector;

pub use transient_collector::TransientStatsCollector;

use std::collections::BTreeMap;

/// Counter sink used by the prefetchers.
///
/// Keys are dotted names (`hits`, `misses`, `deletes.on.<context>`).
pub trait StatsCollector: Send + Sync {
    fn incr(&self, key: &str);

    fn set(&self, key: &str, value: f64);

    /// Fold `value` into the running average kept under `key`
    fn calc_average(&self, key: &str, value: f64);

    /// Flush pending operations to wherever the collector persists them
    fn record_stats(&self);

    fn get_stats(&self) -> BTreeMap<String, f64>;
}
