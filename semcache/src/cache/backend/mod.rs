// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Cache backends
//!
//! This module provides a trait-based abstraction for the key-value store that
//! sits behind every persistent-looking cache, allowing different backends to
//! be used interchangeably.
//!
//! # Architecture
//!
//! ```text
//! EntityCache / BlobStore (cache semantics: records, containers, associations)
//!     ↓
//! CacheBackend (byte key-value abstraction with TTL)
//!     ↓
//! Concrete Implementations (Memory, Pool, Sled, Null)
//! ```
//!
//! # Example Usage
//!
//! ```ignore
//! use semcache::cache::backend::{create_cache_backend, CacheType};
//!
//! let backend = create_cache_backend(CacheType::Memory, "entity.cache", &config, &pools)?;
//! backend.save("key", b"value", Some(TTL_HOUR))?;
//! let value = backend.fetch("key")?;
//! backend.delete("key")?;
//! ```

// Core modules
pub mod factory;
pub mod traits;
pub mod types;

// Backend implementations
pub mod memory;
pub mod null;
pub mod pool;
#[cfg(feature = "sled-backend")]
pub mod sled;

// Public API re-exports
pub use factory::{create_cache_backend, BackendFactory};
pub use memory::MemoryBackend;
pub use null::NullBackend;
pub use pool::PoolBackend;
#[cfg(feature = "sled-backend")]
pub use self::sled::SledBackend;
pub use traits::CacheBackend;
pub use types::CacheType;
