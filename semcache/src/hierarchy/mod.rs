// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Subproperty and subcategory closures

pub mod hierarchy_lookup;

pub use hierarchy_lookup::{Direction, HierarchyLookup, HierarchyRelation};
