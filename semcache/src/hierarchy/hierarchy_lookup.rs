// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Depth-bounded traversal of the `_SUBP` / `_SUBC` relations
//!
//! Every answer is cached under its own key. Keys embed a generation token
//! stored once per relation; an edit to either relation drops the token, which
//! orphans all cached answers for it at once (they age out by TTL or LRU). A
//! depth of zero switches the relation off: lookups return empty/false without
//! touching the cache or the store.

use crate::cache::{make_key, prefix, CircularReferenceGuard, EntityCache};
use crate::error::{CacheError, CacheResult};
use crate::events::ChangePropListener;
use crate::model::{namespace, DataItem, Property, RequestOptions, Subject};
use crate::store::Store;
use chrono::Utc;
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

pub const DEFAULT_HIERARCHY_DEPTH: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Towards more specific entities (children)
    Sub,
    /// Towards more general entities (parents)
    Super,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Sub => write!(f, "sub"),
            Direction::Super => write!(f, "super"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HierarchyRelation {
    /// `_SUBP` between property pages
    Property,
    /// `_SUBC` between category pages
    Category,
}

impl HierarchyRelation {
    /// Relation defined for entities of `subject`'s namespace
    pub fn for_subject(subject: &Subject) -> CacheResult<Self> {
        match subject.namespace {
            namespace::PROPERTY => Ok(HierarchyRelation::Property),
            namespace::CATEGORY => Ok(HierarchyRelation::Category),
            ns => Err(CacheError::InvalidTraversal(format!(
                "no hierarchy relation for {} (namespace {})",
                subject, ns
            ))),
        }
    }

    pub fn property(&self) -> Property {
        match self {
            HierarchyRelation::Property => Property::subproperty_of(),
            HierarchyRelation::Category => Property::subcategory_of(),
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            HierarchyRelation::Property => Property::SUBPROPERTY_OF,
            HierarchyRelation::Category => Property::SUBCATEGORY_OF,
        }
    }
}

pub struct HierarchyLookup {
    store: Arc<dyn Store>,
    cache: Arc<EntityCache>,
    guard: CircularReferenceGuard,
    subproperty_depth: AtomicUsize,
    subcategory_depth: AtomicUsize,
    generation_seq: AtomicU64,
}

impl HierarchyLookup {
    pub fn new(store: Arc<dyn Store>, cache: Arc<EntityCache>, guard: CircularReferenceGuard) -> Self {
        Self {
            store,
            cache,
            guard,
            subproperty_depth: AtomicUsize::new(DEFAULT_HIERARCHY_DEPTH),
            subcategory_depth: AtomicUsize::new(DEFAULT_HIERARCHY_DEPTH),
            generation_seq: AtomicU64::new(0),
        }
    }

    pub fn set_subproperty_depth(&self, depth: usize) {
        self.subproperty_depth.store(depth, Ordering::Relaxed);
    }

    pub fn set_subcategory_depth(&self, depth: usize) {
        self.subcategory_depth.store(depth, Ordering::Relaxed);
    }

    pub fn depth_for(&self, relation: HierarchyRelation) -> usize {
        match relation {
            HierarchyRelation::Property => self.subproperty_depth.load(Ordering::Relaxed),
            HierarchyRelation::Category => self.subcategory_depth.load(Ordering::Relaxed),
        }
    }

    /// Record holding the current generation token of `relation`
    pub fn generation_key(relation: HierarchyRelation) -> String {
        make_key(prefix::HIERARCHY, &[relation.key()])
    }

    /// Entry key of one cached answer under the current generation
    pub fn entry_key(&self, relation: HierarchyRelation, sub_key: &str) -> String {
        let generation = self.generation(relation);
        make_key(prefix::HIERARCHY, &[relation.key(), generation.as_str(), sub_key])
    }

    /// Sub key of a consecutive list for `entity` traversed to `depth`
    pub fn list_sub_key(entity: &Subject, direction: Direction, depth: usize) -> String {
        format!("{}#{}#{}", direction, entity.fingerprint(), depth)
    }

    /// Drop cached answers of `relation` when the store reports an edit to it
    pub fn register_change_listener(&self, listener: &ChangePropListener) {
        for relation in [HierarchyRelation::Property, HierarchyRelation::Category] {
            let cache = self.cache.clone();
            listener.add_listener_callback(relation.key(), move |key, subject| {
                info!("{} changed on {}, dropping cached hierarchy", key, subject);
                cache.delete(&Self::generation_key(relation));
            });
        }
    }

    pub fn has_subproperty(&self, property: &Property) -> CacheResult<bool> {
        self.has_children(HierarchyRelation::Property, &property.to_subject())
    }

    pub fn has_subcategory(&self, category: &Subject) -> CacheResult<bool> {
        Self::expect_relation(category, HierarchyRelation::Category)?;
        self.has_children(HierarchyRelation::Category, category)
    }

    /// Direct subproperties of `property`
    pub fn find_subproperty_list(&self, property: &Property) -> CacheResult<Vec<Subject>> {
        self.find_list(HierarchyRelation::Property, &property.to_subject(), Direction::Sub)
    }

    /// Direct superproperties of `property`
    pub fn find_superproperty_list(&self, property: &Property) -> CacheResult<Vec<Subject>> {
        self.find_list(HierarchyRelation::Property, &property.to_subject(), Direction::Super)
    }

    pub fn find_subcategory_list(&self, category: &Subject) -> CacheResult<Vec<Subject>> {
        Self::expect_relation(category, HierarchyRelation::Category)?;
        self.find_list(HierarchyRelation::Category, category, Direction::Sub)
    }

    pub fn find_supercategory_list(&self, category: &Subject) -> CacheResult<Vec<Subject>> {
        Self::expect_relation(category, HierarchyRelation::Category)?;
        self.find_list(HierarchyRelation::Category, category, Direction::Super)
    }

    /// Breadth-first closure of `entity` up to the configured depth, in
    /// traversal order, without `entity` itself and without duplicates.
    ///
    /// `entity` must be a property or category page.
    pub fn get_consecutive_hierarchy_list(
        &self,
        entity: &Subject,
        direction: Direction,
    ) -> CacheResult<Vec<Subject>> {
        let relation = HierarchyRelation::for_subject(entity)?;
        let depth = self.depth_for(relation);
        if depth == 0 {
            return Ok(Vec::new());
        }

        let key = self.entry_key(relation, &Self::list_sub_key(entity, direction, depth));
        if let Some(list) = self.cache.fetch::<Vec<Subject>>(&key) {
            debug!("hierarchy hit for {} ({} {})", entity, direction, depth);
            return Ok(list);
        }

        let mark = self.guard.enter(&entity.fingerprint());
        if mark.is_circular() {
            return Ok(Vec::new());
        }

        let mut result = Vec::new();
        let mut visited: HashSet<Subject> = HashSet::from([entity.clone()]);
        let mut frontier = vec![entity.clone()];

        for _ in 0..depth {
            let mut next = Vec::new();
            for node in &frontier {
                for item in self.find_list(relation, node, direction)? {
                    if visited.insert(item.clone()) {
                        result.push(item.clone());
                        next.push(item);
                    }
                }
            }

            if next.is_empty() {
                break;
            }
            frontier = next;
        }

        debug!("hierarchy miss for {}, {} item(s) to depth {}", entity, result.len(), depth);
        self.cache.save(&key, &result, None);
        Ok(result)
    }

    /// Property-typed variant of [`Self::get_consecutive_hierarchy_list`]
    pub fn get_consecutive_property_hierarchy(
        &self,
        property: &Property,
        direction: Direction,
    ) -> CacheResult<Vec<Property>> {
        let list = self.get_consecutive_hierarchy_list(&property.to_subject(), direction)?;
        Ok(list.iter().filter_map(Property::from_subject).collect())
    }

    fn expect_relation(subject: &Subject, relation: HierarchyRelation) -> CacheResult<()> {
        if HierarchyRelation::for_subject(subject)? != relation {
            return Err(CacheError::InvalidTraversal(format!(
                "{} is not part of the {} relation",
                subject,
                relation.key()
            )));
        }
        Ok(())
    }

    fn has_children(&self, relation: HierarchyRelation, entity: &Subject) -> CacheResult<bool> {
        if self.depth_for(relation) == 0 {
            return Ok(false);
        }

        let sub_key = format!("has#{}", entity.fingerprint());
        self.cached(relation, &sub_key, || {
            let value = DataItem::WikiPage(entity.clone());
            let options = RequestOptions::with_limit(1);
            let children =
                self.store
                    .get_property_subjects(&relation.property(), Some(&value), Some(&options))?;
            Ok(!children.is_empty())
        })
    }

    /// One hop in `direction`, cached per entity
    fn find_list(
        &self,
        relation: HierarchyRelation,
        entity: &Subject,
        direction: Direction,
    ) -> CacheResult<Vec<Subject>> {
        if self.depth_for(relation) == 0 {
            return Ok(Vec::new());
        }

        let sub_key = format!("list#{}#{}", direction, entity.fingerprint());
        self.cached(relation, &sub_key, || {
            let items = match direction {
                Direction::Sub => {
                    let value = DataItem::WikiPage(entity.clone());
                    self.store
                        .get_property_subjects(&relation.property(), Some(&value), None)?
                }
                Direction::Super => self
                    .store
                    .get_property_values(entity, &relation.property(), None)?
                    .iter()
                    .filter_map(|item| item.as_subject().cloned())
                    .collect(),
            };
            Ok(items)
        })
    }

    fn cached<T, F>(&self, relation: HierarchyRelation, sub_key: &str, compute: F) -> CacheResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> CacheResult<T>,
    {
        let key = self.entry_key(relation, sub_key);
        if let Some(value) = self.cache.fetch::<T>(&key) {
            return Ok(value);
        }

        let value = compute()?;
        self.cache.save(&key, &value, None);
        Ok(value)
    }

    /// Current generation token of `relation`, minting one when none is stored
    fn generation(&self, relation: HierarchyRelation) -> String {
        let key = Self::generation_key(relation);
        if let Some(generation) = self.cache.fetch::<String>(&key) {
            return generation;
        }

        let generation = format!(
            "{}-{}",
            Utc::now().timestamp_millis(),
            self.generation_seq.fetch_add(1, Ordering::Relaxed)
        );
        debug!("new {} hierarchy generation {}", relation.key(), generation);
        self.cache.save(&key, &generation, None);
        generation
    }
}
