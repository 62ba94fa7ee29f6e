#![forbid(unsafe_code)]

//! Policy-as-data configuration for guide coordination.
//!
//! Captures every tunable decision (broadcast policy, how guides start,
//! whether unmounted steps are skipped, how anchors scroll) plus the guide
//! catalog as a single [`GuideConfig`] that can be loaded from TOML or JSON
//! at startup.
//!
//! # Loading
//!
//! ```toml
//! # guides.toml
//! broadcast = "always"
//!
//! [director]
//! start = "first_step"
//! skip_unmounted_steps = true
//!
//! [anchor]
//! scroll_behavior = "smooth"
//!
//! [[guides]]
//! id = "issue_stream"
//! steps = [
//!   { target = "issues", title = "Issues", description = "Your issues live here." },
//!   { target = "filters", title = "Filters" },
//! ]
//! ```
//!
//! ```rust,ignore
//! let config = GuideConfig::from_toml_file("guides.toml")?;
//! let config = GuideConfig::from_json_str(json)?;
//! ```
//!
//! # Defaults
//!
//! Every field has a default, so an empty file is a valid configuration:
//! broadcast after every command, stage guides at step 0, do not skip
//! unmounted steps, scroll smoothly, no guides.

#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::guide::GuideDefinition;

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

/// When the store notifies listeners.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum BroadcastPolicy {
    /// After every state command, including ones that change nothing.
    /// Anchors re-confirm their phase idempotently.
    #[default]
    Always,
    /// Only when the state actually changed.
    OnChange,
}

/// Where a guide lands when a policy activates it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum StartPolicy {
    /// Selected but not started: step 0, nothing highlighted until the first
    /// `next_step`.
    #[default]
    Staged,
    /// Selected and positioned on step 1.
    FirstStep,
}

/// How an anchor asks the render layer to scroll it into view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum ScrollBehavior {
    #[default]
    Smooth,
    Instant,
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Step-advancement policy knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct DirectorConfig {
    pub start: StartPolicy,
    /// Advance past steps whose target has no mounted anchor.
    pub skip_unmounted_steps: bool,
}

impl Default for DirectorConfig {
    fn default() -> Self {
        Self {
            start: StartPolicy::Staged,
            skip_unmounted_steps: false,
        }
    }
}

/// Anchor presentation knobs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct AnchorConfig {
    pub scroll_behavior: ScrollBehavior,
}

// ---------------------------------------------------------------------------
// Top-level GuideConfig
// ---------------------------------------------------------------------------

/// Top-level configuration: policies plus the guide catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct GuideConfig {
    pub broadcast: BroadcastPolicy,
    pub director: DirectorConfig,
    pub anchor: AnchorConfig,
    pub guides: Vec<GuideDefinition>,
}

impl GuideConfig {
    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(ConfigError::Toml)?;
        config.validated()
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s).map_err(ConfigError::Json)?;
        config.validated()
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Serialize to a TOML string.
    #[cfg(feature = "config")]
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::TomlSer)
    }

    /// Serialize to a pretty-printed JSON string.
    #[cfg(feature = "config")]
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(ConfigError::Json)
    }

    /// Check the catalog. Returns the list of problems; empty means valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut seen_ids = std::collections::BTreeSet::new();

        for (idx, guide) in self.guides.iter().enumerate() {
            if guide.id.as_str().is_empty() {
                errors.push(format!("guides[{idx}].id must not be empty"));
            } else if !seen_ids.insert(guide.id.as_str()) {
                errors.push(format!("guides[{idx}].id '{}' is duplicated", guide.id));
            }

            for (step_idx, step) in guide.steps.iter().enumerate() {
                if step.target.is_empty() {
                    errors.push(format!(
                        "guides[{idx}].steps[{step_idx}].target must not be empty"
                    ));
                }
            }

            if guide
                .required_targets
                .iter()
                .any(crate::target::AnchorTarget::is_empty)
            {
                errors.push(format!(
                    "guides[{idx}].required_targets must not contain empty targets"
                ));
            }
        }

        errors
    }

    #[cfg(feature = "config")]
    fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur when loading a guide configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    /// TOML serialization error.
    #[cfg(feature = "config")]
    TomlSer(toml::ser::Error),
    /// JSON parse or serialization error.
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config")]
            Self::TomlSer(e) => write!(f, "TOML serialize error: {e}"),
            #[cfg(feature = "config")]
            Self::Json(e) => write!(f, "JSON error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config")]
            Self::TomlSer(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
