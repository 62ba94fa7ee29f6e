#![forbid(unsafe_code)]

//! The scroll-into-view capability injected into anchors.
//!
//! Anchors never scroll anything themselves. The host UI supplies a
//! [`ScrollIntoView`] implementation that knows how to bring a target's
//! on-screen element into the visible region.

use std::cell::RefCell;

pub use guidepost_core::ScrollBehavior;
use guidepost_core::AnchorTarget;

/// Brings the element rendered for a target into view.
///
/// Called with no store borrow held, so implementations may dispatch
/// commands. Scrolling is fire-and-forget: there is no completion signal.
pub trait ScrollIntoView {
    fn scroll_into_view(&self, target: &AnchorTarget, behavior: ScrollBehavior);
}

impl<F> ScrollIntoView for F
where
    F: Fn(&AnchorTarget, ScrollBehavior),
{
    fn scroll_into_view(&self, target: &AnchorTarget, behavior: ScrollBehavior) {
        self(target, behavior);
    }
}

/// Ignores every request. For hosts without a scrollable viewport.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopScroller;

impl ScrollIntoView for NoopScroller {
    fn scroll_into_view(&self, _target: &AnchorTarget, _behavior: ScrollBehavior) {}
}

/// One request received by a [`RecordingScroller`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollRequest {
    pub target: AnchorTarget,
    pub behavior: ScrollBehavior,
}

/// Records requests in arrival order.
#[derive(Debug, Default)]
pub struct RecordingScroller {
    requests: RefCell<Vec<ScrollRequest>>,
}

impl RecordingScroller {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn requests(&self) -> Vec<ScrollRequest> {
        self.requests.borrow().clone()
    }

    /// Requested targets, oldest first.
    #[must_use]
    pub fn targets(&self) -> Vec<AnchorTarget> {
        self.requests
            .borrow()
            .iter()
            .map(|r| r.target.clone())
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.requests.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requests.borrow().is_empty()
    }

    /// Drain the recorded requests.
    pub fn take(&self) -> Vec<ScrollRequest> {
        std::mem::take(&mut *self.requests.borrow_mut())
    }
}

impl ScrollIntoView for RecordingScroller {
    fn scroll_into_view(&self, target: &AnchorTarget, behavior: ScrollBehavior) {
        self.requests.borrow_mut().push(ScrollRequest {
            target: target.clone(),
            behavior,
        });
    }
}
