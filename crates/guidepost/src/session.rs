#![forbid(unsafe_code)]

//! Application-lifetime wiring of store, director and anchors.

use std::rc::Rc;

use tracing::info;

use guidepost_anchor::{AnchorKind, AnchorOptions, GuideAnchor, ScrollIntoView};
use guidepost_core::{AnchorTarget, GuideConfig, GuideDirector, GuideId, GuideStore, context};

use crate::{Error, Result};

/// Owns the process-wide [`GuideStore`] for as long as it lives.
///
/// Starting a session installs its store into [`context`]; dropping the
/// session tears the store down and uninstalls it. Anchors mounted through
/// the session use the configured scroll behavior.
pub struct GuideSession {
    store: GuideStore,
    director: GuideDirector,
    anchor_options: AnchorOptions,
}

impl GuideSession {
    /// Validate `config`, build the store and director, and install the
    /// store as current.
    pub fn start(config: GuideConfig) -> Result<Self> {
        let errors = config.validate();
        if !errors.is_empty() {
            return Err(Error::Config(guidepost_core::ConfigError::Validation(errors)));
        }

        let store = GuideStore::from_config(&config);
        let director = GuideDirector::from_config(store.clone(), &config);
        if context::install(store.clone()).is_some() {
            info!(target: "guidepost.store", "replaced a previously installed guide store");
        }
        info!(
            target: "guidepost.store",
            guides = director.catalog().len() as u64,
            policy = ?config.broadcast,
            "guide session started"
        );

        Ok(Self {
            store,
            director,
            anchor_options: AnchorOptions::from_config(&config.anchor),
        })
    }

    /// Start from a TOML configuration string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Self::start(GuideConfig::from_toml_str(s)?)
    }

    /// Start from a TOML configuration file.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        Self::start(GuideConfig::from_toml_file(path)?)
    }

    #[must_use]
    pub fn store(&self) -> &GuideStore {
        &self.store
    }

    #[must_use]
    pub fn director(&self) -> &GuideDirector {
        &self.director
    }

    pub fn director_mut(&mut self) -> &mut GuideDirector {
        &mut self.director
    }

    /// Mount a plain anchor with the session's scroll behavior.
    #[must_use = "dropping the anchor unmounts it immediately"]
    pub fn mount_anchor(
        &self,
        target: impl Into<AnchorTarget>,
        scroller: Rc<dyn ScrollIntoView>,
    ) -> GuideAnchor {
        GuideAnchor::mount_with(&self.store, target, scroller, self.anchor_options)
    }

    /// Mount an anchor of `kind` with the session's scroll behavior.
    #[must_use = "dropping the anchor unmounts it immediately"]
    pub fn mount_anchor_as(
        &self,
        target: impl Into<AnchorTarget>,
        kind: AnchorKind,
        scroller: Rc<dyn ScrollIntoView>,
    ) -> GuideAnchor {
        GuideAnchor::mount_with(&self.store, target, scroller, self.anchor_options.kind(kind))
    }

    /// Show the first eligible guide, if no guide is showing.
    pub fn show_eligible(&mut self) -> Option<GuideId> {
        self.director.show_eligible()
    }

    /// Show `id` regardless of eligibility.
    pub fn show(&mut self, id: &GuideId) -> Result<()> {
        if self.director.force_show(id) {
            Ok(())
        } else {
            Err(Error::UnknownGuide(id.clone()))
        }
    }

    /// Advance the showing guide. Returns the number of steps moved.
    pub fn advance(&mut self) -> usize {
        self.director.advance()
    }

    pub fn dismiss(&mut self) {
        self.director.dismiss();
    }
}

impl core::fmt::Debug for GuideSession {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GuideSession")
            .field("store", &self.store)
            .field("anchor_options", &self.anchor_options)
            .finish()
    }
}

impl Drop for GuideSession {
    fn drop(&mut self) {
        let installed = context::current().is_some_and(|s| s.same_store(&self.store));
        if installed {
            context::teardown();
        } else {
            self.store.teardown();
        }
        info!(target: "guidepost.store", "guide session ended");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guidepost_core::GuideDefinition;

    #[test]
    fn start_installs_and_drop_uninstalls() {
        let session = GuideSession::start(GuideConfig::default()).expect("valid config");
        let current = context::current().expect("installed");
        assert!(current.same_store(session.store()));
        drop(session);
        assert!(!context::is_installed());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = GuideConfig {
            guides: vec![GuideDefinition::new("g"), GuideDefinition::new("g")],
            ..GuideConfig::default()
        };
        assert!(matches!(GuideSession::start(config), Err(Error::Config(_))));
        assert!(!context::is_installed());
    }

    #[test]
    fn showing_an_unknown_guide_fails() {
        let mut session = GuideSession::start(GuideConfig::default()).expect("valid config");
        let err = session.show(&GuideId::new("nope")).unwrap_err();
        assert!(matches!(err, Error::UnknownGuide(_)));
        assert_eq!(err.to_string(), "unknown guide: nope");
    }

    #[test]
    fn replaced_session_leaves_newer_store_installed() {
        let first = GuideSession::start(GuideConfig::default()).expect("valid config");
        let second = GuideSession::start(GuideConfig::default()).expect("valid config");
        drop(first);
        let current = context::current().expect("second still installed");
        assert!(current.same_store(second.store()));
        drop(second);
        assert!(!context::is_installed());
    }
}
