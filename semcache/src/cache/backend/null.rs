// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Backend that never retains anything

use super::traits::CacheBackend;
use super::types::CacheType;
use crate::error::CacheResult;
use std::time::Duration;

/// Used when a cache is switched off; every read is a miss
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBackend;

impl CacheBackend for NullBackend {
    fn fetch(&self, _key: &str) -> CacheResult<Option<Vec<u8>>> {
        Ok(None)
    }

    fn save(&self, _key: &str, _value: &[u8], _ttl: Option<Duration>) -> CacheResult<()> {
        Ok(())
    }

    fn delete(&self, _key: &str) -> CacheResult<()> {
        Ok(())
    }

    fn clear(&self) -> CacheResult<()> {
        Ok(())
    }

    fn can_use(&self) -> bool {
        false
    }

    fn backend_type(&self) -> CacheType {
        CacheType::None
    }
}
