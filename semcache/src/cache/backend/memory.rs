// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! In-memory cache backend

use super::traits::CacheBackend;
use super::types::CacheType;
use crate::cache::CacheEntryMetadata;
use crate::error::CacheResult;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Saves between two sweeps of expired entries
const SWEEP_INTERVAL: usize = 512;

/// In-memory backend honoring TTLs. Expired entries are swept every
/// [`SWEEP_INTERVAL`] saves; entries without a TTL stay until deleted.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    data: Arc<RwLock<HashMap<String, (Vec<u8>, CacheEntryMetadata)>>>,
    saves: Arc<AtomicUsize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove expired entries, returns how many were dropped
    pub fn purge_expired(&self) -> usize {
        let mut data = self.data.write();
        let before = data.len();
        data.retain(|_, (_, meta)| !meta.is_expired());
        before - data.len()
    }

    /// Number of stored entries, expired ones included until touched
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheBackend for MemoryBackend {
    fn fetch(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        {
            let data = self.data.read();
            match data.get(key) {
                Some((value, meta)) if !meta.is_expired() => return Ok(Some(value.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }

        // Expired
        self.data.write().remove(key);
        Ok(None)
    }

    fn save(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> CacheResult<()> {
        self.data
            .write()
            .insert(key.to_string(), (value.to_vec(), CacheEntryMetadata::new(ttl)));

        if (self.saves.fetch_add(1, Ordering::Relaxed) + 1) % SWEEP_INTERVAL == 0 {
            self.purge_expired();
        }
        Ok(())
    }

    fn delete(&self, key: &str) -> CacheResult<()> {
        self.data.write().remove(key);
        Ok(())
    }

    fn clear(&self) -> CacheResult<()> {
        self.data.write().clear();
        Ok(())
    }

    fn backend_type(&self) -> CacheType {
        CacheType::Memory
    }
}
