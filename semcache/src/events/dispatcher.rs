// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Synchronous event dispatch for cache invalidation

use crate::model::Subject;
use chrono::{DateTime, Utc};
use log::debug;
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

/// Events that invalidate cached data
#[derive(Debug, Clone, PartialEq)]
pub enum CacheEvent {
    /// Cached query results derived from `subject` are outdated
    InvalidateResultCache {
        subject: Subject,
        /// Free-form origin tag, ends up in `deletes.on.<context>` stats
        context: String,
        dependencies: Vec<Subject>,
    },

    /// Entity-level cache entries of `subject` are outdated
    InvalidateEntityCache { subject: Subject },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CacheEventKind {
    InvalidateResultCache,
    InvalidateEntityCache,
}

impl fmt::Display for CacheEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheEventKind::InvalidateResultCache => write!(f, "InvalidateResultCache"),
            CacheEventKind::InvalidateEntityCache => write!(f, "InvalidateEntityCache"),
        }
    }
}

impl CacheEvent {
    pub fn kind(&self) -> CacheEventKind {
        match self {
            CacheEvent::InvalidateResultCache { .. } => CacheEventKind::InvalidateResultCache,
            CacheEvent::InvalidateEntityCache { .. } => CacheEventKind::InvalidateEntityCache,
        }
    }

    pub fn subject(&self) -> &Subject {
        match self {
            CacheEvent::InvalidateResultCache { subject, .. } => subject,
            CacheEvent::InvalidateEntityCache { subject } => subject,
        }
    }
}

pub type EventListener = Arc<dyn Fn(&CacheEvent) + Send + Sync>;

/// Publish/subscribe channel keyed by event kind.
///
/// Listeners run on the dispatching thread in registration order. The
/// listener table is not locked while they run, so a listener may dispatch
/// further events.
pub struct EventDispatcher {
    listeners: RwLock<HashMap<CacheEventKind, Vec<EventListener>>>,

    /// Dispatched events, oldest first
    history: Mutex<VecDeque<(CacheEvent, DateTime<Utc>)>>,
    max_history_size: usize,
}

impl EventDispatcher {
    pub fn new(max_history_size: usize) -> Self {
        Self {
            listeners: RwLock::new(HashMap::new()),
            history: Mutex::new(VecDeque::new()),
            max_history_size,
        }
    }

    pub fn add_listener<F>(&self, kind: CacheEventKind, listener: F)
    where
        F: Fn(&CacheEvent) + Send + Sync + 'static,
    {
        self.listeners
            .write()
            .entry(kind)
            .or_default()
            .push(Arc::new(listener));
    }

    pub fn has_listener(&self, kind: CacheEventKind) -> bool {
        self.listeners
            .read()
            .get(&kind)
            .map(|listeners| !listeners.is_empty())
            .unwrap_or(false)
    }

    /// Run every listener registered for the event's kind; returns how many ran
    pub fn dispatch(&self, event: CacheEvent) -> usize {
        let listeners: Vec<EventListener> = self
            .listeners
            .read()
            .get(&event.kind())
            .cloned()
            .unwrap_or_default();

        debug!(
            "dispatching {} for {} to {} listener(s)",
            event.kind(),
            event.subject(),
            listeners.len()
        );

        for listener in &listeners {
            listener(&event);
        }

        self.record(event);
        listeners.len()
    }

    /// Most recent events, newest first
    pub fn recent_events(&self, limit: usize) -> Vec<(CacheEvent, DateTime<Utc>)> {
        self.history.lock().iter().rev().take(limit).cloned().collect()
    }

    pub fn clear_history(&self) {
        self.history.lock().clear();
    }

    pub fn clear_listeners(&self) {
        self.listeners.write().clear();
    }

    fn record(&self, event: CacheEvent) {
        if self.max_history_size == 0 {
            return;
        }

        let mut history = self.history.lock();
        history.push_back((event, Utc::now()));
        while history.len() > self.max_history_size {
            history.pop_front();
        }
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new(100)
    }
}
