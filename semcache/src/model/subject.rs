// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Subject identity and its canonical serialization

use crate::cache::content_hash;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A page or subobject the semantic data is about.
///
/// Two subjects are equal iff namespace, dbkey, interwiki and subobject all match.
/// `hash()` is the readable serialization; components may contain `#`, so
/// cache keys are derived from [`Subject::fingerprint`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Subject {
    pub namespace: i32,
    pub dbkey: String,
    pub interwiki: String,
    pub subobject: String,
}

impl Subject {
    pub fn new(dbkey: impl Into<String>, namespace: i32) -> Self {
        Self {
            namespace,
            dbkey: normalize_dbkey(&dbkey.into()),
            interwiki: String::new(),
            subobject: String::new(),
        }
    }

    pub fn with_subobject(mut self, subobject: impl Into<String>) -> Self {
        self.subobject = subobject.into();
        self
    }

    pub fn with_interwiki(mut self, interwiki: impl Into<String>) -> Self {
        self.interwiki = interwiki.into();
        self
    }

    /// Canonical `dbkey#namespace#interwiki#subobject` form
    pub fn hash(&self) -> String {
        format!(
            "{}#{}#{}#{}",
            self.dbkey, self.namespace, self.interwiki, self.subobject
        )
    }

    /// Digest over the four components, distinct for distinct subjects
    pub fn fingerprint(&self) -> String {
        let namespace = self.namespace.to_string();
        content_hash(&[
            self.dbkey.as_str(),
            namespace.as_str(),
            self.interwiki.as_str(),
            self.subobject.as_str(),
        ])
    }

    /// Parse the output of [`Subject::hash`]. A two-part `dbkey#namespace`
    /// string is accepted as well.
    pub fn from_hash(hash: &str) -> Option<Self> {
        let mut parts = hash.splitn(4, '#');
        let dbkey = parts.next()?;
        let namespace = parts.next()?.parse::<i32>().ok()?;
        let interwiki = parts.next().unwrap_or("");
        let subobject = parts.next().unwrap_or("");

        if dbkey.is_empty() {
            return None;
        }

        Some(Self {
            namespace,
            dbkey: dbkey.to_string(),
            interwiki: interwiki.to_string(),
            subobject: subobject.to_string(),
        })
    }

    /// The page this subject belongs to, without subobject
    pub fn as_base(&self) -> Self {
        Self {
            subobject: String::new(),
            ..self.clone()
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.dbkey.is_empty()
    }

    pub fn has_subobject(&self) -> bool {
        !self.subobject.is_empty()
    }

    /// Human readable title text (underscores back to spaces)
    pub fn title_text(&self) -> String {
        self.dbkey.replace('_', " ")
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.hash())
    }
}

/// A title-like reference as produced by page rendering paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TitleRef {
    pub namespace: i32,
    pub text: String,
    pub interwiki: String,
}

impl TitleRef {
    pub fn new(text: impl Into<String>, namespace: i32) -> Self {
        Self {
            namespace,
            text: text.into(),
            interwiki: String::new(),
        }
    }

    pub fn to_subject(&self) -> Subject {
        Subject::new(self.text.as_str(), self.namespace).with_interwiki(self.interwiki.clone())
    }

    /// Key used for same-request markers
    pub fn prefixed_dbkey(&self) -> String {
        format!("{}:{}", self.namespace, normalize_dbkey(&self.text))
    }
}

impl From<&TitleRef> for Subject {
    fn from(title: &TitleRef) -> Self {
        title.to_subject()
    }
}

fn normalize_dbkey(text: &str) -> String {
    text.trim().replace(' ', "_")
}
