// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Query descriptions, results and lookup options.
//!
//! Queries are opaque to the caching core apart from their canonical
//! signature, their limit, their embedding context and per-query options.

use super::subject::Subject;
use crate::cache::content_hash;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Per-query switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QueryOption {
    /// Bypass the result cache entirely
    NoCache,
    /// Do not record the query as a dependency of its context page
    NoDependencyTrace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum QueryMode {
    #[default]
    Instances,
    Count,
    Debug,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Canonical condition string (already printed by the query language layer)
    pub conditions: String,
    pub sort_keys: Vec<String>,
    pub ascending: bool,
    pub limit: usize,
    pub offset: usize,
    pub mode: QueryMode,
    /// Page the query is embedded in, `None` for special-page/API queries
    pub context_page: Option<Subject>,
    /// Declared cache lifetime, overrides the prefetcher default
    pub cache_ttl: Option<Duration>,
    options: BTreeMap<QueryOption, bool>,
}

impl Query {
    pub fn new(conditions: impl Into<String>) -> Self {
        Self {
            conditions: conditions.into(),
            sort_keys: Vec::new(),
            ascending: true,
            limit: 50,
            offset: 0,
            mode: QueryMode::Instances,
            context_page: None,
            cache_ttl: None,
            options: BTreeMap::new(),
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_sort(mut self, key: impl Into<String>, ascending: bool) -> Self {
        self.sort_keys.push(key.into());
        self.ascending = ascending;
        self
    }

    pub fn with_context_page(mut self, subject: Subject) -> Self {
        self.context_page = Some(subject);
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    pub fn set_option(&mut self, option: QueryOption, value: bool) {
        self.options.insert(option, value);
    }

    pub fn option(&self, option: QueryOption) -> bool {
        self.options.get(&option).copied().unwrap_or(false)
    }

    pub fn is_embedded(&self) -> bool {
        self.context_page.is_some()
    }

    /// Deterministic id of the query signature. The embedding page is not
    /// part of it, equal queries on different pages share one id.
    pub fn query_id(&self) -> String {
        let limit = self.limit.to_string();
        let offset = self.offset.to_string();
        let mode = format!("{:?}", self.mode);
        let order = if self.ascending { "ASC" } else { "DESC" };
        let sort = self.sort_keys.join(",");

        content_hash(&[
            self.conditions.as_str(),
            sort.as_str(),
            order,
            limit.as_str(),
            offset.as_str(),
            mode.as_str(),
        ])
    }
}

/// Result of answering a [`Query`]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryResult {
    pub results: Vec<Subject>,
    pub count: usize,
    pub further_results: bool,
    pub from_cache: bool,
}

impl QueryResult {
    pub fn new(results: Vec<Subject>, further_results: bool) -> Self {
        let count = results.len();
        Self {
            results,
            count,
            further_results,
            from_cache: false,
        }
    }

    pub fn results(&self) -> &[Subject] {
        &self.results
    }
}

/// Limit/offset/sort options for value lookups
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RequestOptions {
    pub limit: Option<usize>,
    pub offset: usize,
    pub sort: bool,
    pub ascending: bool,
    pub conditions: Vec<String>,
}

impl RequestOptions {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ascending: true,
            ..Default::default()
        }
    }

    /// Stable fingerprint used as cache-key material
    pub fn hash(&self) -> String {
        let limit = self.limit.map(|l| l.to_string()).unwrap_or_default();
        let offset = self.offset.to_string();
        let flags = format!("{}{}", self.sort as u8, self.ascending as u8);
        let conditions = self.conditions.join("|");

        content_hash(&[
            limit.as_str(),
            offset.as_str(),
            flags.as_str(),
            conditions.as_str(),
        ])
    }
}
