#![forbid(unsafe_code)]

//! Step-advancement policy on top of the store, registry and catalog.
//!
//! The store only knows how to move one step at a time. The director decides
//! *which* guide to show on the current page, where it starts, and whether
//! steps whose anchor is not mounted are skipped.
//!
//! Skips are planned against a local copy of the state and then issued as
//! ordinary `next_step` commands, so the director behaves the same whether
//! or not it is called from inside a broadcast (where commands are queued).
//! Plans are computed from the last applied state; commands already queued
//! behind an in-flight broadcast are not taken into account.

use std::rc::Rc;

use tracing::info;

use crate::catalog::GuideCatalog;
use crate::config::{DirectorConfig, GuideConfig, StartPolicy};
use crate::guide::{GuideDefinition, GuideId, GuideState};
use crate::store::GuideStore;

/// Bundled step-advancement policy.
#[derive(Debug)]
pub struct GuideDirector {
    store: GuideStore,
    catalog: GuideCatalog,
    config: DirectorConfig,
}

impl GuideDirector {
    #[must_use]
    pub fn new(store: GuideStore, catalog: GuideCatalog, config: DirectorConfig) -> Self {
        Self {
            store,
            catalog,
            config,
        }
    }

    /// Director over `store` with the catalog and policy from `config`.
    #[must_use]
    pub fn from_config(store: GuideStore, config: &GuideConfig) -> Self {
        Self::new(
            store,
            GuideCatalog::from_guides(config.guides.iter().cloned()),
            config.director.clone(),
        )
    }

    #[must_use]
    pub fn store(&self) -> &GuideStore {
        &self.store
    }

    #[must_use]
    pub fn catalog(&self) -> &GuideCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut GuideCatalog {
        &mut self.catalog
    }

    #[must_use]
    pub fn config(&self) -> &DirectorConfig {
        &self.config
    }

    /// Id of the guide currently selected in the store.
    #[must_use]
    pub fn current_guide_id(&self) -> Option<GuideId> {
        self.store.state().current_guide().map(|g| g.id.clone())
    }

    /// Show the first eligible guide if none is active.
    ///
    /// Returns the id of the guide shown. The guide is marked seen so it is
    /// not offered again.
    pub fn show_eligible(&mut self) -> Option<GuideId> {
        if self.store.state().has_guide() {
            return None;
        }
        let guide = self
            .store
            .with_registry(|registry| self.catalog.next_eligible(registry))?;
        let id = guide.id.clone();
        self.activate(guide);
        Some(id)
    }

    /// Show guide `id` regardless of eligibility or seen status.
    ///
    /// Returns `false` if the catalog has no such guide.
    pub fn force_show(&mut self, id: &GuideId) -> bool {
        match self.catalog.get(id).cloned() {
            Some(guide) => {
                self.activate(guide);
                true
            }
            None => false,
        }
    }

    /// Advance one step, then past any unmounted steps when skipping is on.
    ///
    /// Returns the number of `next_step` commands issued.
    pub fn advance(&mut self) -> usize {
        let planned = self.store.state().advanced();
        let steps = 1 + self.unmounted_run(&planned);
        for _ in 0..steps {
            self.store.next_step();
        }
        steps
    }

    /// Close the current guide. It stays marked seen.
    pub fn dismiss(&mut self) {
        if let Some(id) = self.current_guide_id() {
            info!(target: "guidepost.director", guide = %id, "guide dismissed");
        }
        self.store.close_guide();
    }

    fn activate(&mut self, guide: Rc<GuideDefinition>) {
        self.catalog.mark_seen(&guide.id);
        info!(
            target: "guidepost.director",
            guide = %guide.id,
            steps = guide.len() as u64,
            start = ?self.config.start,
            "guide shown"
        );
        match self.config.start {
            StartPolicy::Staged => self.store.set_active_guide(guide),
            StartPolicy::FirstStep => {
                let skips = self.unmounted_run(&GuideState::started(Rc::clone(&guide)));
                self.store.start_guide(guide);
                for _ in 0..skips {
                    self.store.next_step();
                }
            }
        }
    }

    /// How many further `next_step`s it takes to leave a run of steps whose
    /// target is not mounted, starting from `state`.
    fn unmounted_run(&self, state: &GuideState) -> usize {
        if !self.config.skip_unmounted_steps {
            return 0;
        }
        let mut state = state.clone();
        let mut skips = 0;
        while let Some(target) = state.active_target() {
            if self.store.is_mounted(target) {
                break;
            }
            state = state.advanced();
            skips += 1;
        }
        if skips > 0 {
            info!(
                target: "guidepost.director",
                skipped = skips as u64,
                "skipping steps without mounted anchors"
            );
        }
        skips
    }
}
