#![forbid(unsafe_code)]

//! Process-wide guide store for the UI thread.
//!
//! Applications install one [`GuideStore`] at start-up and tear it down at
//! shutdown. Components that cannot have a store injected look it up with
//! [`current`]. Tests should build their own store and pass it around
//! instead.
//!
//! The store is `!Send`, so "process-wide" means "the UI thread": the slot is
//! thread-local.

use std::cell::RefCell;

use tracing::debug;

use crate::store::GuideStore;

thread_local! {
    static CURRENT: RefCell<Option<GuideStore>> = const { RefCell::new(None) };
}

/// Install `store` as the current store. Returns the store it replaced.
pub fn install(store: GuideStore) -> Option<GuideStore> {
    debug!(target: "guidepost.store", "guide store installed");
    CURRENT.with(|slot| slot.borrow_mut().replace(store))
}

/// The installed store, if any.
#[must_use]
pub fn current() -> Option<GuideStore> {
    CURRENT.with(|slot| slot.borrow().clone())
}

/// `true` if a store is installed on this thread.
#[must_use]
pub fn is_installed() -> bool {
    CURRENT.with(|slot| slot.borrow().is_some())
}

/// Remove the installed store and tear it down (listeners dropped,
/// registry cleared, state idle). Returns `false` if nothing was installed.
pub fn teardown() -> bool {
    let store = CURRENT.with(|slot| slot.borrow_mut().take());
    match store {
        Some(store) => {
            store.teardown();
            debug!(target: "guidepost.store", "guide store uninstalled");
            true
        }
        None => false,
    }
}
