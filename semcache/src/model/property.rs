// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Property identifiers

use super::namespace;
use super::subject::Subject;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A property, either predefined (`_`-prefixed key) or user defined
/// (label-derived key).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Property {
    key: String,
    inverse: bool,
}

impl Property {
    /// Subproperty-of
    pub const SUBPROPERTY_OF: &'static str = "_SUBP";
    /// Subcategory-of
    pub const SUBCATEGORY_OF: &'static str = "_SUBC";
    /// Instance-of (category membership)
    pub const INSTANCE_OF: &'static str = "_INST";

    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into().trim().replace(' ', "_"),
            inverse: false,
        }
    }

    pub fn inverse(key: impl Into<String>) -> Self {
        Self {
            inverse: true,
            ..Self::new(key)
        }
    }

    pub fn subproperty_of() -> Self {
        Self::new(Self::SUBPROPERTY_OF)
    }

    pub fn subcategory_of() -> Self {
        Self::new(Self::SUBCATEGORY_OF)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_inverse(&self) -> bool {
        self.inverse
    }

    pub fn is_predefined(&self) -> bool {
        self.key.starts_with('_')
    }

    /// The property page in the property namespace
    pub fn to_subject(&self) -> Subject {
        Subject::new(self.key.as_str(), namespace::PROPERTY)
    }

    /// Reverse of [`Property::to_subject`]; `None` outside the property namespace
    pub fn from_subject(subject: &Subject) -> Option<Self> {
        if subject.namespace != namespace::PROPERTY || !subject.is_valid() {
            return None;
        }
        Some(Self::new(subject.dbkey.as_str()))
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.inverse {
            write!(f, "-{}", self.key)
        } else {
            write!(f, "{}", self.key)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_subject_roundtrip() {
        let property = Property::new("Has part");
        assert_eq!(property.key(), "Has_part");
        let subject = property.to_subject();
        assert_eq!(subject.namespace, namespace::PROPERTY);
        assert_eq!(Property::from_subject(&subject), Some(property));
    }

    #[test]
    fn test_from_subject_outside_property_namespace() {
        assert!(Property::from_subject(&Subject::new("Foo", namespace::CATEGORY)).is_none());
    }

    #[test]
    fn test_predefined_and_inverse() {
        assert!(Property::subproperty_of().is_predefined());
        assert!(!Property::new("Bar").is_predefined());
        assert_eq!(Property::inverse("Bar").to_string(), "-Bar");
    }
}
