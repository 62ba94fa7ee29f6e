#![forbid(unsafe_code)]

//! Identifiers for anchor locations and anchor instances.
//!
//! An [`AnchorTarget`] names a logical UI location ("dashboard.header").
//! An [`AnchorHandle`] names one live anchor instance mounted at a target.
//! Targets are reused across remounts; handles never are.

use std::borrow::Borrow;
use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

/// String identifier of a logical UI location a guide step points at.
///
/// Unique among concurrently mounted anchors, not across the application's
/// lifetime: the same target is expected to unmount and remount as the page
/// re-renders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(transparent))]
pub struct AnchorTarget(String);

impl AnchorTarget {
    /// Create a target from any string-like value.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The raw target name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` for the empty target, which no step should reference.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl core::fmt::Display for AnchorTarget {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AnchorTarget {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for AnchorTarget {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for AnchorTarget {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for AnchorTarget {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for AnchorTarget {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of one live anchor instance.
///
/// Allocated once per mount. The registry compares handles on unregister so
/// an old instance unmounting late cannot remove a newer instance's entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnchorHandle(u64);

impl AnchorHandle {
    /// Allocate a fresh, process-unique handle.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value, for logging.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for AnchorHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "anchor:{}", self.0)
    }
}
