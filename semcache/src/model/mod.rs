// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Entities the caching core reasons about: subjects, properties, data items
//! and queries.

pub mod data_item;
pub mod property;
pub mod query;
pub mod subject;

pub use data_item::DataItem;
pub use property::Property;
pub use query::{Query, QueryOption, QueryResult, RequestOptions};
pub use subject::{Subject, TitleRef};

/// Namespace ids used by the hierarchy relations
pub mod namespace {
    pub const MAIN: i32 = 0;
    pub const USER: i32 = 2;
    pub const CATEGORY: i32 = 14;
    pub const PROPERTY: i32 = 102;
    pub const CONCEPT: i32 = 108;
}
