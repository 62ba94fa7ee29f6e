#![forbid(unsafe_code)]

//! Ledger of currently mounted anchors.
//!
//! Anchors register on mount and unregister on unmount. The ledger is what
//! lets a step-advancement policy decide whether a guide (or a step) can be
//! shown on the current page.
//!
//! # Invariants
//!
//! 1. Each [`AnchorTarget`] maps to at most one [`AnchorRegistration`].
//! 2. [`register`](GuideRegistry::register) is an upsert: the last mount wins.
//! 3. [`unregister`](GuideRegistry::unregister) only removes an entry whose
//!    handle matches. A stale instance unmounting after a newer one mounted
//!    leaves the newer entry in place.
//!
//! # Example
//!
//! ```
//! use guidepost_core::registry::GuideRegistry;
//! use guidepost_core::target::{AnchorHandle, AnchorTarget};
//!
//! let mut reg = GuideRegistry::new();
//! let old = AnchorHandle::next();
//! let new = AnchorHandle::next();
//!
//! reg.register(AnchorTarget::new("t"), old);
//! reg.register(AnchorTarget::new("t"), new);
//! assert!(!reg.unregister(&AnchorTarget::new("t"), old));
//! assert_eq!(reg.handle_for(&AnchorTarget::new("t")), Some(new));
//! ```

use ahash::AHashMap;
use tracing::debug;

use crate::target::{AnchorHandle, AnchorTarget};

/// One mounted anchor instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorRegistration {
    pub target: AnchorTarget,
    pub handle: AnchorHandle,
}

/// Set of live anchors keyed by target.
#[derive(Debug, Default)]
pub struct GuideRegistry {
    entries: AHashMap<AnchorTarget, AnchorRegistration>,
}

impl GuideRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: AHashMap::new(),
        }
    }

    /// Record that `handle` is mounted at `target`.
    ///
    /// Replaces any previous registration for the same target and returns the
    /// handle it replaced.
    pub fn register(&mut self, target: AnchorTarget, handle: AnchorHandle) -> Option<AnchorHandle> {
        let replaced = self
            .entries
            .insert(
                target.clone(),
                AnchorRegistration {
                    target: target.clone(),
                    handle,
                },
            )
            .map(|prev| prev.handle)
            .filter(|prev| *prev != handle);
        match replaced {
            Some(prev) => debug!(
                target: "guidepost.registry",
                anchor_target = %target,
                handle = handle.get(),
                replaced = prev.get(),
                "anchor registration replaced"
            ),
            None => debug!(
                target: "guidepost.registry",
                anchor_target = %target,
                handle = handle.get(),
                "anchor registered"
            ),
        }
        replaced
    }

    /// Remove the registration for `target` if it belongs to `handle`.
    ///
    /// Returns `true` if an entry was removed. A mismatched handle is a
    /// no-op.
    pub fn unregister(&mut self, target: &AnchorTarget, handle: AnchorHandle) -> bool {
        match self.entries.get(target) {
            Some(entry) if entry.handle == handle => {
                self.entries.remove(target);
                debug!(
                    target: "guidepost.registry",
                    anchor_target = %target,
                    handle = handle.get(),
                    "anchor unregistered"
                );
                true
            }
            Some(entry) => {
                debug!(
                    target: "guidepost.registry",
                    anchor_target = %target,
                    handle = handle.get(),
                    current = entry.handle.get(),
                    "stale unregister ignored"
                );
                false
            }
            None => false,
        }
    }

    /// Whether some anchor is mounted at `target`.
    #[must_use]
    pub fn is_mounted(&self, target: &AnchorTarget) -> bool {
        self.entries.contains_key(target)
    }

    /// Handle of the anchor currently registered at `target`.
    #[must_use]
    pub fn handle_for(&self, target: &AnchorTarget) -> Option<AnchorHandle> {
        self.entries.get(target).map(|entry| entry.handle)
    }

    #[must_use]
    pub fn get(&self, target: &AnchorTarget) -> Option<&AnchorRegistration> {
        self.entries.get(target)
    }

    /// `true` if every target yielded by `targets` is mounted.
    pub fn contains_all<'a>(&self, targets: impl IntoIterator<Item = &'a AnchorTarget>) -> bool {
        targets.into_iter().all(|t| self.is_mounted(t))
    }

    /// Mounted targets, sorted for deterministic output.
    #[must_use]
    pub fn targets(&self) -> Vec<&AnchorTarget> {
        let mut out: Vec<_> = self.entries.keys().collect();
        out.sort();
        out
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every registration (application teardown).
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
