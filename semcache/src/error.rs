// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for the caching core

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CacheError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unknown cache type: {0}. Valid options: memory, pool, sled, none")]
    UnknownCacheType(String),

    #[error("No query engine registered, cannot answer query {0}")]
    MissingQueryEngine(String),

    #[error("Invalid traversal: {0}")]
    InvalidTraversal(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Cache backend error: {0}")]
    Backend(String),
}

impl From<std::io::Error> for CacheError {
    fn from(err: std::io::Error) -> Self {
        CacheError::Backend(err.to_string())
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Serialization(err.to_string())
    }
}

impl From<bincode::Error> for CacheError {
    fn from(err: bincode::Error) -> Self {
        CacheError::Serialization(err.to_string())
    }
}

#[cfg(feature = "sled-backend")]
impl From<sled::Error> for CacheError {
    fn from(err: sled::Error) -> Self {
        CacheError::Backend(err.to_string())
    }
}

pub type CacheResult<T> = Result<T, CacheError>;
