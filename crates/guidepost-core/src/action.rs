#![forbid(unsafe_code)]

//! Commands accepted by the [`GuideStore`](crate::store::GuideStore).
//!
//! Every mutation of guide state or of the anchor registry is expressed as a
//! [`GuideAction`] and goes through [`GuideStore::dispatch`]. The convenience
//! methods on the store are thin wrappers that build an action.
//!
//! [`GuideStore::dispatch`]: crate::store::GuideStore::dispatch

use std::rc::Rc;

use crate::guide::{GuideDefinition, GuideState};
use crate::target::{AnchorHandle, AnchorTarget};

/// A command against the guide store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuideAction {
    /// An anchor mounted at `target`.
    RegisterAnchor {
        target: AnchorTarget,
        handle: AnchorHandle,
    },
    /// An anchor unmounted from `target`. Ignored if `handle` is stale.
    UnregisterAnchor {
        target: AnchorTarget,
        handle: AnchorHandle,
    },
    /// Select a guide without starting it (step 0).
    SetActiveGuide(Rc<GuideDefinition>),
    /// Select a guide and position it on its first step.
    StartGuide(Rc<GuideDefinition>),
    /// Advance one step; past the last step the guide ends.
    NextStep,
    /// End the current guide unconditionally.
    CloseGuide,
}

impl GuideAction {
    /// Stable command name for logs and spans.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::RegisterAnchor { .. } => "register_anchor",
            Self::UnregisterAnchor { .. } => "unregister_anchor",
            Self::SetActiveGuide(_) => "set_active_guide",
            Self::StartGuide(_) => "start_guide",
            Self::NextStep => "next_step",
            Self::CloseGuide => "close_guide",
        }
    }

    /// `true` for commands that change [`GuideState`] and therefore broadcast.
    #[must_use]
    pub const fn is_state_command(&self) -> bool {
        !matches!(
            self,
            Self::RegisterAnchor { .. } | Self::UnregisterAnchor { .. }
        )
    }

    /// The state that results from applying this command to `state`.
    ///
    /// Registry commands leave the state as it is.
    #[must_use]
    pub fn reduce(&self, state: &GuideState) -> GuideState {
        match self {
            Self::SetActiveGuide(guide) => GuideState::staged(Rc::clone(guide)),
            Self::StartGuide(guide) => GuideState::started(Rc::clone(guide)),
            Self::NextStep => state.advanced(),
            Self::CloseGuide => GuideState::idle(),
            Self::RegisterAnchor { .. } | Self::UnregisterAnchor { .. } => state.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_stable() {
        assert_eq!(GuideAction::NextStep.name(), "next_step");
        assert_eq!(GuideAction::CloseGuide.name(), "close_guide");
        let action = GuideAction::RegisterAnchor {
            target: AnchorTarget::new("a"),
            handle: AnchorHandle::next(),
        };
        assert_eq!(action.name(), "register_anchor");
        assert!(!action.is_state_command());
        assert!(GuideAction::NextStep.is_state_command());
    }

    #[test]
    fn reduce_close_always_idles() {
        let guide = Rc::new(GuideDefinition::new("g").step_at("a"));
        let running = GuideState::started(guide);
        assert_eq!(GuideAction::CloseGuide.reduce(&running), GuideState::idle());
        assert_eq!(
            GuideAction::CloseGuide.reduce(&GuideState::idle()),
            GuideState::idle()
        );
    }

    #[test]
    fn reduce_set_active_resets_step() {
        let first = Rc::new(GuideDefinition::new("first").step_at("a").step_at("b"));
        let second = Rc::new(GuideDefinition::new("second").step_at("c"));
        let running = GuideState::started(first).advanced();
        assert_eq!(running.current_step(), 2);

        let next = GuideAction::SetActiveGuide(second).reduce(&running);
        assert_eq!(next.current_step(), 0);
        assert_eq!(next.current_guide().map(|g| g.id.as_str()), Some("second"));
    }

    #[test]
    fn reduce_registry_commands_keep_state() {
        let guide = Rc::new(GuideDefinition::new("g").step_at("a"));
        let state = GuideState::started(guide);
        let action = GuideAction::UnregisterAnchor {
            target: AnchorTarget::new("a"),
            handle: AnchorHandle::next(),
        };
        assert_eq!(action.reduce(&state), state);
    }
}
