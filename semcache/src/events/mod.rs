// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Invalidation channels
//!
//! - [`EventDispatcher`]: typed publish/subscribe for cache invalidation events
//! - [`ChangePropListener`]: callbacks keyed by property, fired after a store
//!   write changed annotations of that property

pub mod change_listener;
pub mod dispatcher;

pub use change_listener::{ChangeCallback, ChangePropListener};
pub use dispatcher::{CacheEvent, CacheEventKind, EventDispatcher, EventListener};
