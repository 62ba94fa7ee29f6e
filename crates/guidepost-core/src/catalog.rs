#![forbid(unsafe_code)]

//! The set of known guides and which of them can be shown right now.
//!
//! Anchors register with the store's registry; the catalog uses that ledger
//! to decide which guides the current page can support. A guide is
//! *eligible* when it has not been seen and every required target is
//! mounted.
//!
//! # Invariants
//!
//! 1. Guide ids are unique within a catalog; inserting an existing id
//!    replaces the definition in place (catalog order is preserved).
//! 2. [`next_eligible`](GuideCatalog::next_eligible) is deterministic: the
//!    first eligible guide in catalog order.

use std::rc::Rc;

use ahash::{AHashMap, AHashSet};

use crate::guide::{GuideDefinition, GuideId};
use crate::registry::GuideRegistry;

/// Ordered collection of guide definitions plus "seen" bookkeeping.
#[derive(Debug, Default)]
pub struct GuideCatalog {
    guides: Vec<Rc<GuideDefinition>>,
    index: AHashMap<GuideId, usize>,
    seen: AHashSet<GuideId>,
}

impl GuideCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from definitions, in order.
    pub fn from_guides(guides: impl IntoIterator<Item = GuideDefinition>) -> Self {
        let mut catalog = Self::new();
        for guide in guides {
            catalog.insert(guide);
        }
        catalog
    }

    /// Add a guide. Returns the definition it replaced, if any.
    pub fn insert(&mut self, guide: impl Into<Rc<GuideDefinition>>) -> Option<Rc<GuideDefinition>> {
        let guide = guide.into();
        match self.index.get(&guide.id) {
            Some(&idx) => Some(std::mem::replace(&mut self.guides[idx], guide)),
            None => {
                self.index.insert(guide.id.clone(), self.guides.len());
                self.guides.push(guide);
                None
            }
        }
    }

    #[must_use]
    pub fn get(&self, id: &GuideId) -> Option<&Rc<GuideDefinition>> {
        self.index.get(id).map(|&idx| &self.guides[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rc<GuideDefinition>> {
        self.guides.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.guides.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.guides.is_empty()
    }

    /// `true` if `guide` is unseen and all its required targets are mounted.
    #[must_use]
    pub fn is_eligible(&self, guide: &GuideDefinition, registry: &GuideRegistry) -> bool {
        !self.seen.contains(&guide.id) && registry.contains_all(guide.required())
    }

    /// First eligible guide in catalog order.
    #[must_use]
    pub fn next_eligible(&self, registry: &GuideRegistry) -> Option<Rc<GuideDefinition>> {
        self.guides
            .iter()
            .find(|guide| self.is_eligible(guide, registry))
            .cloned()
    }

    /// Ids of every eligible guide, in catalog order.
    #[must_use]
    pub fn eligible_ids(&self, registry: &GuideRegistry) -> Vec<GuideId> {
        self.guides
            .iter()
            .filter(|guide| self.is_eligible(guide, registry))
            .map(|guide| guide.id.clone())
            .collect()
    }

    /// Mark a guide as seen. Returns `true` the first time.
    pub fn mark_seen(&mut self, id: &GuideId) -> bool {
        self.seen.insert(id.clone())
    }

    #[must_use]
    pub fn is_seen(&self, id: &GuideId) -> bool {
        self.seen.contains(id)
    }

    #[must_use]
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    /// Forget which guides were seen.
    pub fn reset_seen(&mut self) {
        self.seen.clear();
    }
}
