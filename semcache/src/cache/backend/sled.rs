// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Sled cache backend implementation

use super::traits::CacheBackend;
use super::types::CacheType;
use crate::error::CacheResult;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const DEFAULT_TREE: &str = "semcache";

/// Value envelope written to sled; `expires_at` is unix millis
#[derive(Debug, Serialize, Deserialize)]
struct StoredValue {
    expires_at: Option<i64>,
    payload: Vec<u8>,
}

impl StoredValue {
    fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(at) => Utc::now().timestamp_millis() >= at,
            None => false,
        }
    }
}

/// Persistent backend; entries survive process restarts
pub struct SledBackend {
    _db: sled::Db,
    tree: sled::Tree,
}

impl SledBackend {
    /// Open or create a sled database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> CacheResult<Self> {
        let db = sled::open(path)?;
        Self::with_db(db, DEFAULT_TREE)
    }

    /// Use a named tree of an already opened database
    pub fn with_db(db: sled::Db, tree_name: &str) -> CacheResult<Self> {
        let tree = db.open_tree(tree_name)?;
        Ok(Self { _db: db, tree })
    }

    /// Remove expired entries, returns how many were dropped
    pub fn purge_expired(&self) -> CacheResult<usize> {
        let mut purged = 0;
        for item in self.tree.iter() {
            let (key, raw) = item?;
            let stored: StoredValue = match bincode::deserialize(&raw) {
                Ok(stored) => stored,
                Err(_) => {
                    self.tree.remove(&key)?;
                    purged += 1;
                    continue;
                }
            };
            if stored.is_expired() {
                self.tree.remove(&key)?;
                purged += 1;
            }
        }
        Ok(purged)
    }
}

impl CacheBackend for SledBackend {
    fn fetch(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let raw = match self.tree.get(key.as_bytes())? {
            Some(raw) => raw,
            None => return Ok(None),
        };

        let stored: StoredValue = bincode::deserialize(&raw)?;
        if stored.is_expired() {
            self.tree.remove(key.as_bytes())?;
            return Ok(None);
        }

        Ok(Some(stored.payload))
    }

    fn save(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> CacheResult<()> {
        let expires_at = ttl.map(|ttl| {
            let millis = ttl.as_millis().min(i64::MAX as u128) as i64;
            Utc::now().timestamp_millis().saturating_add(millis)
        });
        let stored = StoredValue {
            expires_at,
            payload: value.to_vec(),
        };

        self.tree.insert(key.as_bytes(), bincode::serialize(&stored)?)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> CacheResult<()> {
        self.tree.remove(key.as_bytes())?;
        Ok(())
    }

    fn clear(&self) -> CacheResult<()> {
        self.tree.clear()?;
        Ok(())
    }

    fn flush(&self) -> CacheResult<()> {
        self.tree.flush()?;
        Ok(())
    }

    fn backend_type(&self) -> CacheType {
        CacheType::Sled
    }
}
