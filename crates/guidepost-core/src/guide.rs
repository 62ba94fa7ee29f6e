#![forbid(unsafe_code)]

//! Guide definitions and the shared guide state.
//!
//! # Invariants
//!
//! 1. `current_step > 0` implies a guide is present and
//!    `current_step <= guide.steps.len()`.
//! 2. The active target is derived on demand from the guide and step; it is
//!    never stored separately, so it cannot go stale.
//! 3. Transitions build a new [`GuideState`]; the shared instance is only
//!    replaced by the store.

use std::rc::Rc;

use crate::target::AnchorTarget;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

/// Identifier of a guide definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(transparent))]
pub struct GuideId(String);

impl GuideId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for GuideId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GuideId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for GuideId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// What a step shows next to its anchor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct StepContent {
    pub title: String,
    pub description: String,
}

impl StepContent {
    #[must_use]
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// One step of a guide: the anchor it highlights and the content it shows.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
pub struct Step {
    pub target: AnchorTarget,
    #[cfg_attr(feature = "config", serde(flatten))]
    pub content: StepContent,
}

impl Step {
    /// A step with empty content.
    #[must_use]
    pub fn new(target: impl Into<AnchorTarget>) -> Self {
        Self {
            target: target.into(),
            content: StepContent::default(),
        }
    }

    #[must_use]
    pub fn with_content(mut self, content: StepContent) -> Self {
        self.content = content;
        self
    }
}

/// An ordered sequence of steps.
///
/// `required_targets` lists the anchors that must be mounted before the
/// guide is offered. When empty, every step target is required.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
pub struct GuideDefinition {
    pub id: GuideId,
    #[cfg_attr(feature = "config", serde(default))]
    pub steps: Vec<Step>,
    #[cfg_attr(
        feature = "config",
        serde(default, skip_serializing_if = "Vec::is_empty")
    )]
    pub required_targets: Vec<AnchorTarget>,
}

impl GuideDefinition {
    #[must_use]
    pub fn new(id: impl Into<GuideId>) -> Self {
        Self {
            id: id.into(),
            steps: Vec::new(),
            required_targets: Vec::new(),
        }
    }

    /// Append a step.
    #[must_use]
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Append a step with empty content pointing at `target`.
    #[must_use]
    pub fn step_at(self, target: impl Into<AnchorTarget>) -> Self {
        self.step(Step::new(target))
    }

    /// Require `target` to be mounted before this guide is offered.
    #[must_use]
    pub fn requires(mut self, target: impl Into<AnchorTarget>) -> Self {
        self.required_targets.push(target.into());
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step by 1-based index. Index 0 is "not started" and has no step.
    #[must_use]
    pub fn step_number(&self, number: usize) -> Option<&Step> {
        number.checked_sub(1).and_then(|idx| self.steps.get(idx))
    }

    /// Targets that must be mounted for the guide to be shown.
    pub fn required(&self) -> impl Iterator<Item = &AnchorTarget> {
        let explicit = !self.required_targets.is_empty();
        let (a, b) = if explicit {
            (Some(self.required_targets.iter()), None)
        } else {
            (None, Some(self.steps.iter().map(|s| &s.target)))
        };
        a.into_iter().flatten().chain(b.into_iter().flatten())
    }
}

/// The single shared guide state: current guide and 1-based step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuideState {
    current_guide: Option<Rc<GuideDefinition>>,
    current_step: usize,
}

impl GuideState {
    /// No guide, step 0.
    #[must_use]
    pub fn idle() -> Self {
        Self::default()
    }

    /// Guide selected but not started (step 0).
    #[must_use]
    pub fn staged(guide: Rc<GuideDefinition>) -> Self {
        Self {
            current_guide: Some(guide),
            current_step: 0,
        }
    }

    /// Guide selected and positioned at its first step. A guide without steps
    /// stays at step 0.
    #[must_use]
    pub fn started(guide: Rc<GuideDefinition>) -> Self {
        let current_step = usize::from(!guide.is_empty());
        Self {
            current_guide: Some(guide),
            current_step,
        }
    }

    #[must_use]
    pub fn current_guide(&self) -> Option<&GuideDefinition> {
        self.current_guide.as_deref()
    }

    #[must_use]
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    /// `true` while a guide is selected, started or not.
    #[must_use]
    pub fn has_guide(&self) -> bool {
        self.current_guide.is_some()
    }

    /// The step currently shown, if any.
    #[must_use]
    pub fn active_step(&self) -> Option<&Step> {
        self.current_guide
            .as_deref()
            .and_then(|guide| guide.step_number(self.current_step))
    }

    /// Target of the current step, or `None` when no step is active.
    #[must_use]
    pub fn active_target(&self) -> Option<&AnchorTarget> {
        self.active_step().map(|step| &step.target)
    }

    /// Whether an anchor at `target` should be shown as active.
    #[must_use]
    pub fn is_active_target(&self, target: &AnchorTarget) -> bool {
        self.active_target() == Some(target)
    }

    /// `true` when the current step is the guide's last one.
    #[must_use]
    pub fn is_last_step(&self) -> bool {
        self.current_guide
            .as_deref()
            .is_some_and(|guide| self.current_step >= guide.len())
    }

    /// The state after one `next_step`.
    ///
    /// Increments while steps remain; at (or past) the last step the guide
    /// ends. Without a guide the state is returned unchanged.
    #[must_use]
    pub fn advanced(&self) -> Self {
        match &self.current_guide {
            None => self.clone(),
            Some(guide) if self.current_step < guide.len() => Self {
                current_guide: Some(Rc::clone(guide)),
                current_step: self.current_step + 1,
            },
            Some(_) => Self::idle(),
        }
    }

    /// Checks the step/guide invariant.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        match &self.current_guide {
            None => self.current_step == 0,
            Some(guide) => self.current_step <= guide.len(),
        }
    }
}
