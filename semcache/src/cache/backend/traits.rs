// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Cache backend trait
//!
//! All backends store opaque byte values under string keys with an optional
//! time-to-live. Expired entries must read as absent.

use super::types::CacheType;
use crate::error::CacheResult;
use std::sync::Arc;
use std::time::Duration;

pub trait CacheBackend: Send + Sync {
    /// Get a value by key
    fn fetch(&self, key: &str) -> CacheResult<Option<Vec<u8>>>;

    /// Insert or replace a value
    fn save(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> CacheResult<()>;

    /// Remove a value, absent keys are not an error
    fn delete(&self, key: &str) -> CacheResult<()>;

    /// Check if a live value exists
    fn contains(&self, key: &str) -> CacheResult<bool> {
        Ok(self.fetch(key)?.is_some())
    }

    /// Remove all values
    fn clear(&self) -> CacheResult<()>;

    /// Whether the backend actually retains anything
    fn can_use(&self) -> bool {
        true
    }

    /// Persist buffered writes; a no-op for in-process backends
    fn flush(&self) -> CacheResult<()> {
        Ok(())
    }

    fn backend_type(&self) -> CacheType;
}

// Shared handles are used wherever one backend serves several caches
impl<T: CacheBackend + ?Sized> CacheBackend for Arc<T> {
    fn fetch(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        (**self).fetch(key)
    }

    fn save(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> CacheResult<()> {
        (**self).save(key, value, ttl)
    }

    fn delete(&self, key: &str) -> CacheResult<()> {
        (**self).delete(key)
    }

    fn contains(&self, key: &str) -> CacheResult<bool> {
        (**self).contains(key)
    }

    fn clear(&self) -> CacheResult<()> {
        (**self).clear()
    }

    fn can_use(&self) -> bool {
        (**self).can_use()
    }

    fn flush(&self) -> CacheResult<()> {
        (**self).flush()
    }

    fn backend_type(&self) -> CacheType {
        (**self).backend_type()
    }
}
