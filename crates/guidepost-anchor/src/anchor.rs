#![forbid(unsafe_code)]

//! The anchor state machine.
//!
//! A [`GuideAnchor`] is one mounted instance of a target. While it lives it
//! holds a registration in the store's registry and a subscription to the
//! store's broadcasts; dropping it releases both.
//!
//! # Phases
//!
//! ```text
//!            broadcast: active target == own target
//!   Inactive ───────────────────────────────────────▶ Active   (scroll once)
//!      ▲                                                │
//!      └────────────────────────────────────────────────┘
//!            broadcast: anything else
//! ```
//!
//! A re-broadcast that keeps the anchor active does not scroll again.

use std::cell::Cell;
use std::rc::{Rc, Weak};

use tracing::{debug, trace};

use guidepost_core::{
    AnchorConfig, AnchorHandle, AnchorTarget, GuideState, GuideStore, Registration, ScrollBehavior,
    Subscription, context, telemetry,
};

use crate::scroll::ScrollIntoView;
use crate::view::AnchorView;

/// Whether the anchor's target is the current step's target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AnchorPhase {
    #[default]
    Inactive,
    Active,
}

impl AnchorPhase {
    #[must_use]
    pub fn for_state(state: &GuideState, target: &AnchorTarget) -> Self {
        if state.is_active_target(target) {
            Self::Active
        } else {
            Self::Inactive
        }
    }
}

/// Presentation variant of an anchor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AnchorKind {
    /// Wraps arbitrary content.
    #[default]
    Plain,
    /// Sits inline in running text.
    Text,
    /// Wraps a button.
    Button,
}

impl AnchorKind {
    /// Extra wrapper class, if the kind has one.
    #[must_use]
    pub const fn class(self) -> Option<&'static str> {
        match self {
            Self::Plain => None,
            Self::Text => Some("text"),
            Self::Button => Some("button"),
        }
    }
}

/// Mount-time options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnchorOptions {
    pub kind: AnchorKind,
    pub scroll_behavior: ScrollBehavior,
}

impl AnchorOptions {
    #[must_use]
    pub fn from_config(config: &AnchorConfig) -> Self {
        Self {
            kind: AnchorKind::Plain,
            scroll_behavior: config.scroll_behavior,
        }
    }

    #[must_use]
    pub fn kind(mut self, kind: AnchorKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn scroll_behavior(mut self, behavior: ScrollBehavior) -> Self {
        self.scroll_behavior = behavior;
        self
    }
}

/// State reachable from the store's listener. The listener holds it weakly so
/// a dropped anchor is never kept alive by the store.
struct AnchorShared {
    target: AnchorTarget,
    handle: AnchorHandle,
    phase: Cell<AnchorPhase>,
    scrolls: Cell<u64>,
    behavior: ScrollBehavior,
    scroller: Rc<dyn ScrollIntoView>,
}

impl AnchorShared {
    fn observe(&self, state: &GuideState) {
        let next = AnchorPhase::for_state(state, &self.target);
        let prev = self.phase.replace(next);
        if prev == next {
            return;
        }
        trace!(
            target: "guidepost.anchor",
            anchor_target = %self.target,
            handle = self.handle.get(),
            active = next == AnchorPhase::Active,
            "anchor phase changed"
        );
        if next == AnchorPhase::Active {
            self.scrolls.set(self.scrolls.get() + 1);
            telemetry::record_scroll_request(self.target.as_str(), self.handle.get());
            self.scroller.scroll_into_view(&self.target, self.behavior);
        }
    }
}

/// A mounted anchor. Drop it to unmount.
pub struct GuideAnchor {
    shared: Rc<AnchorShared>,
    kind: AnchorKind,
    registration: Registration,
    subscription: Subscription,
}

impl GuideAnchor {
    /// Mount with default options.
    #[must_use = "dropping the anchor unmounts it immediately"]
    pub fn mount(
        store: &GuideStore,
        target: impl Into<AnchorTarget>,
        scroller: Rc<dyn ScrollIntoView>,
    ) -> Self {
        Self::mount_with(store, target, scroller, AnchorOptions::default())
    }

    /// Register with `store`, subscribe to its broadcasts, then adopt the
    /// phase implied by the current state.
    ///
    /// Mounting while the target's step is already showing activates the
    /// anchor immediately, including its one scroll request.
    #[must_use = "dropping the anchor unmounts it immediately"]
    pub fn mount_with(
        store: &GuideStore,
        target: impl Into<AnchorTarget>,
        scroller: Rc<dyn ScrollIntoView>,
        options: AnchorOptions,
    ) -> Self {
        let target = target.into();
        let handle = AnchorHandle::next();
        let registration = store.register_scoped(target.clone(), handle);

        let shared = Rc::new(AnchorShared {
            target,
            handle,
            phase: Cell::new(AnchorPhase::Inactive),
            scrolls: Cell::new(0),
            behavior: options.scroll_behavior,
            scroller,
        });
        let weak: Weak<AnchorShared> = Rc::downgrade(&shared);
        let subscription = store.subscribe(move |state| {
            if let Some(shared) = weak.upgrade() {
                shared.observe(state);
            }
        });

        debug!(
            target: "guidepost.anchor",
            anchor_target = %shared.target,
            handle = handle.get(),
            "anchor mounted"
        );
        shared.observe(&store.state());

        Self {
            shared,
            kind: options.kind,
            registration,
            subscription,
        }
    }

    /// Mount against the store installed in [`context`], if any.
    #[must_use]
    pub fn mount_current(
        target: impl Into<AnchorTarget>,
        scroller: Rc<dyn ScrollIntoView>,
        options: AnchorOptions,
    ) -> Option<Self> {
        let store = context::current()?;
        Some(Self::mount_with(&store, target, scroller, options))
    }

    #[must_use]
    pub fn target(&self) -> &AnchorTarget {
        &self.shared.target
    }

    #[must_use]
    pub fn handle(&self) -> AnchorHandle {
        self.shared.handle
    }

    #[must_use]
    pub fn kind(&self) -> AnchorKind {
        self.kind
    }

    #[must_use]
    pub fn phase(&self) -> AnchorPhase {
        self.shared.phase.get()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.phase() == AnchorPhase::Active
    }

    /// Scroll requests issued since mount.
    #[must_use]
    pub fn scroll_count(&self) -> u64 {
        self.shared.scrolls.get()
    }

    /// `false` once the store was torn down under the anchor.
    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_active()
    }

    #[must_use]
    pub fn view(&self) -> AnchorView {
        AnchorView {
            target: self.shared.target.clone(),
            kind: self.kind,
            active: self.is_active(),
        }
    }
}

impl core::fmt::Debug for GuideAnchor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GuideAnchor")
            .field("target", &self.shared.target)
            .field("handle", &self.shared.handle)
            .field("kind", &self.kind)
            .field("phase", &self.shared.phase.get())
            .finish()
    }
}

impl Drop for GuideAnchor {
    fn drop(&mut self) {
        debug!(
            target: "guidepost.anchor",
            anchor_target = %self.registration.target(),
            handle = self.registration.handle().get(),
            "anchor unmounted"
        );
        // `registration` and `subscription` release themselves after this.
    }
}
