// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Staleness checks for cached renderings

pub mod dependency_validator;

pub use dependency_validator::{DependencyValidator, ARCHAIC_MARKER, ETAG_SUB_KEY};
