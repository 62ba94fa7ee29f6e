#![forbid(unsafe_code)]

//! Guidepost public facade crate.
//!
//! Re-exports the store, registry and anchor types from the internal crates
//! and adds [`GuideSession`], which ties a configured store to the current
//! thread for the lifetime of an application.
//!
//! ```
//! use std::rc::Rc;
//! use guidepost::prelude::*;
//!
//! let config = GuideConfig {
//!     guides: vec![GuideDefinition::new("intro").step_at("issues")],
//!     ..GuideConfig::default()
//! };
//! let mut session = GuideSession::start(config)?;
//! let anchor = session.mount_anchor("issues", Rc::new(NoopScroller));
//!
//! assert_eq!(session.show_eligible(), Some(GuideId::new("intro")));
//! session.advance();
//! assert!(anchor.is_active());
//! # Ok::<(), guidepost::Error>(())
//! ```

use std::fmt;

mod session;

pub use session::GuideSession;

// --- Core re-exports -------------------------------------------------------

pub use guidepost_core::{
    AnchorConfig, AnchorHandle, AnchorRegistration, AnchorTarget, BroadcastPolicy, ConfigError,
    DirectorConfig, GuideAction, GuideCatalog, GuideConfig, GuideDefinition, GuideDirector,
    GuideId, GuideRegistry, GuideState, GuideStore, ListenerId, Registration, StartPolicy, Step,
    StepContent, Subscription, context,
};

// --- Anchor re-exports -----------------------------------------------------

pub use guidepost_anchor::{
    AnchorKind, AnchorOptions, AnchorPhase, AnchorView, GuideAnchor, NoopScroller,
    RecordingScroller, ScrollBehavior, ScrollIntoView, ScrollRequest,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for guidepost apps.
#[derive(Debug)]
pub enum Error {
    /// Configuration failed to load or validate.
    Config(ConfigError),
    /// No guide with this id is in the catalog.
    UnknownGuide(GuideId),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::UnknownGuide(id) => write!(f, "unknown guide: {id}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::UnknownGuide(_) => None,
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

/// Standard result type for guidepost APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        AnchorKind, AnchorTarget, Error, GuideAnchor, GuideConfig, GuideDefinition, GuideId,
        GuideSession, GuideState, GuideStore, NoopScroller, Result, ScrollBehavior,
        ScrollIntoView, Step, StepContent,
    };

    pub use crate::{anchor, core};
}

pub use guidepost_anchor as anchor;
pub use guidepost_core as core;
