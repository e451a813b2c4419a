// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Cache backend types

use crate::error::CacheError;
use serde::{Deserialize, Serialize};

/// Cache backend type configuration
///
/// Specifies which underlying storage keeps cached values.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CacheType {
    /// Unbounded process memory with TTL
    /// Best for: tests, short-lived processes
    Memory,

    /// Named LRU pool from the in-process pool registry
    /// Best for: hot entity and hierarchy data in long-running workers
    Pool,

    /// Sled - persistent embedded database
    /// Best for: results that should survive restarts
    Sled,

    /// Stores nothing, every read is a miss
    None,
}

impl Default for CacheType {
    fn default() -> Self {
        CacheType::Memory
    }
}

impl std::str::FromStr for CacheType {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(CacheType::Memory),
            "pool" => Ok(CacheType::Pool),
            "sled" => Ok(CacheType::Sled),
            "none" => Ok(CacheType::None),
            _ => Err(CacheError::UnknownCacheType(s.to_string())),
        }
    }
}

impl std::fmt::Display for CacheType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CacheType::Memory => "memory",
            CacheType::Pool => "pool",
            CacheType::Sled => "sled",
            CacheType::None => "none",
        };
        write!(f, "{}", name)
    }
}
