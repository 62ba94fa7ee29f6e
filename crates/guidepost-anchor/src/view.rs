#![forbid(unsafe_code)]

//! What the render layer draws for an anchor.
//!
//! An anchor renders as a wrapper around its content plus a small pulsing
//! "ping" marker. The marker is always present and only visible while the
//! anchor is active.

use guidepost_core::AnchorTarget;

use crate::anchor::AnchorKind;

/// Class on the wrapper element.
pub const ANCHOR_CLASS: &str = "guide-anchor";
/// Class on the ping marker.
pub const PING_CLASS: &str = "guide-anchor-ping";

/// Render snapshot of one anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorView {
    pub target: AnchorTarget,
    pub kind: AnchorKind,
    pub active: bool,
}

impl AnchorView {
    /// Wrapper classes: `guide-anchor` plus the kind, if any.
    #[must_use]
    pub fn wrapper_classes(&self) -> Vec<&str> {
        let mut classes = vec![ANCHOR_CLASS];
        if let Some(kind) = self.kind.class() {
            classes.push(kind);
        }
        classes
    }

    /// Ping classes: `guide-anchor-ping` plus the target name.
    #[must_use]
    pub fn ping_classes(&self) -> Vec<&str> {
        vec![PING_CLASS, self.target.as_str()]
    }

    /// Every class the anchor contributes, wrapper first.
    #[must_use]
    pub fn classes(&self) -> Vec<&str> {
        let mut classes = self.wrapper_classes();
        classes.extend(self.ping_classes());
        classes
    }

    #[must_use]
    pub fn ping_visible(&self) -> bool {
        self.active
    }

    /// Text anchors flow the ping inline with the text.
    #[must_use]
    pub fn ping_inline(&self) -> bool {
        self.kind == AnchorKind::Text
    }

    /// Single-cell marker for character-grid hosts.
    #[must_use]
    pub fn indicator(&self) -> char {
        if self.active { '◉' } else { ' ' }
    }
}
