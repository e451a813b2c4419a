// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Read-through caches in front of the store and the query engine

pub mod property_values;
pub mod query_result;

pub use property_values::CachedPropertyValuesPrefetcher;
pub use query_result::CachedQueryResultPrefetcher;
