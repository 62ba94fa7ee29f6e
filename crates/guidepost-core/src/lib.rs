#![forbid(unsafe_code)]

//! Guidepost Core
//!
//! Shared state and bookkeeping for in-app guides: a sequence of highlighted
//! UI locations shown one step at a time.
//!
//! # Key Components
//!
//! - [`GuideStore`] - Single writer of [`GuideState`]; broadcasts every change
//! - [`GuideRegistry`] - Ledger of currently mounted anchors
//! - [`GuideAction`] - The commands that mutate the store
//! - [`GuideCatalog`] - Known guides and which are eligible on this page
//! - [`GuideDirector`] - Bundled step-advancement policy
//! - [`GuideConfig`] - Policy and catalog configuration
//!
//! # Role in Guidepost
//! `guidepost-core` holds no UI. Anchors (in `guidepost-anchor`) subscribe to
//! the store and register with its registry; application code drives the
//! store directly or through a [`GuideDirector`].

pub mod action;
pub mod catalog;
pub mod config;
pub mod context;
pub mod director;
pub mod guide;
pub mod registry;
pub mod store;
pub mod target;
pub mod telemetry;

pub use action::GuideAction;
pub use catalog::GuideCatalog;
pub use config::{
    AnchorConfig, BroadcastPolicy, ConfigError, DirectorConfig, GuideConfig, ScrollBehavior,
    StartPolicy,
};
pub use director::GuideDirector;
pub use guide::{GuideDefinition, GuideId, GuideState, Step, StepContent};
pub use registry::{AnchorRegistration, GuideRegistry};
pub use store::{GuideStore, ListenerId, Registration, Subscription};
pub use target::{AnchorHandle, AnchorTarget};
pub use telemetry::{
    broadcasts_total, commands_total, deferred_commands_total, scroll_requests_total,
};
