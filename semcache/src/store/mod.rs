// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Collaborator interfaces consumed by the caching core
//!
//! The relational store, the query engine and the dependency-links
//! validator live outside this crate; the caches only see these traits.

use crate::error::CacheResult;
use crate::model::{DataItem, Property, Query, QueryResult, RequestOptions, Subject};
use std::sync::Arc;

/// Authoritative value and record lookup
pub trait Store: Send + Sync {
    /// Values of `property` annotated on `subject`
    fn get_property_values(
        &self,
        subject: &Subject,
        property: &Property,
        options: Option<&RequestOptions>,
    ) -> CacheResult<Vec<DataItem>>;

    /// Subjects that carry `property`, optionally restricted to `value`
    fn get_property_subjects(
        &self,
        property: &Property,
        value: Option<&DataItem>,
        options: Option<&RequestOptions>,
    ) -> CacheResult<Vec<Subject>>;

    fn get_query_result(&self, query: &Query) -> CacheResult<QueryResult>;
}

/// Answers queries on a cache miss
pub trait QueryEngine: Send + Sync {
    fn get_query_result(&self, query: &Query) -> CacheResult<QueryResult>;
}

/// Decides whether the recorded dependencies of a subject changed
pub trait DependencyLinksValidator: Send + Sync {
    fn can_check_dependencies(&self, subject: &Subject) -> bool;

    fn has_archaic_dependencies(&self, subject: &Subject) -> bool;

    /// Dependencies found outdated by the last `has_archaic_dependencies` call
    fn get_checked_dependencies(&self) -> Vec<Subject>;
}

/// Any store can answer queries directly
pub struct StoreQueryEngine<S: Store + ?Sized> {
    store: Arc<S>,
}

impl<S: Store + ?Sized> StoreQueryEngine<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

impl<S: Store + ?Sized> QueryEngine for StoreQueryEngine<S> {
    fn get_query_result(&self, query: &Query) -> CacheResult<QueryResult> {
        self.store.get_query_result(query)
    }
}
