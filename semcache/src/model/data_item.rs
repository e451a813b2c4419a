// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Annotation values

use super::subject::Subject;
use serde::{Deserialize, Serialize};

/// A single value of a (subject, property, value) annotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum DataItem {
    WikiPage(Subject),
    Number(f64),
    Text(String),
    Boolean(bool),
    Uri(String),
}

impl DataItem {
    pub fn as_subject(&self) -> Option<&Subject> {
        match self {
            DataItem::WikiPage(subject) => Some(subject),
            _ => None,
        }
    }

    /// Stable string form used when a value takes part in a cache key
    pub fn hash(&self) -> String {
        match self {
            DataItem::WikiPage(subject) => format!("p:{}", subject.fingerprint()),
            DataItem::Number(n) => format!("n:{}", n),
            DataItem::Text(s) => format!("t:{}", s),
            DataItem::Boolean(b) => format!("b:{}", b),
            DataItem::Uri(u) => format!("u:{}", u),
        }
    }
}

impl From<Subject> for DataItem {
    fn from(subject: Subject) -> Self {
        DataItem::WikiPage(subject)
    }
}
