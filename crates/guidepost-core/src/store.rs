#![forbid(unsafe_code)]

//! The guide state store: single writer of [`GuideState`], broadcaster of
//! every change, and owner of the anchor [`GuideRegistry`].
//!
//! # Design
//!
//! [`GuideStore`] is a cheap-to-clone handle to shared, reference-counted
//! storage (`Rc<RefCell<..>>`). Clones see the same state, registry and
//! listeners. The store is `!Send`: it lives on the UI thread.
//!
//! All mutations go through [`GuideStore::dispatch`]. State commands update
//! the state and then broadcast it to every listener in registration order.
//! Registry commands update the registry and do not broadcast.
//!
//! # Invariants
//!
//! 1. No `RefCell` borrow is held while a listener runs, so listeners may
//!    subscribe, unsubscribe, register, unregister or dispatch.
//! 2. A broadcast iterates a snapshot of the listener list. Listeners added
//!    during a broadcast are first notified by the next one; listeners removed
//!    during a broadcast are skipped for the rest of it.
//! 3. State commands dispatched while a broadcast is in flight are queued and
//!    applied, in order, after every listener has seen the current state.
//!    A broadcast is therefore observed atomically.
//! 4. `version` increments by exactly 1 per broadcast.
//!
//! # Failure Modes
//!
//! - **Listener panic**: the in-flight flag is reset and queued commands are
//!   discarded, so the store stays usable after the panic is caught.
//! - **Registry access from inside `with_registry`**: dispatching from the
//!   closure passed to [`GuideStore::with_registry`] panics (RefCell borrow
//!   rules). Copy what you need out of the registry first.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::action::GuideAction;
use crate::config::{BroadcastPolicy, GuideConfig};
use crate::guide::{GuideDefinition, GuideState};
use crate::registry::GuideRegistry;
use crate::target::{AnchorHandle, AnchorTarget};
use crate::telemetry;

/// Identifier of a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

type ListenerFn = Rc<dyn Fn(&GuideState)>;

struct ListenerEntry {
    id: ListenerId,
    callback: ListenerFn,
    /// Cleared on unsubscribe; checked before each call in a broadcast.
    live: Rc<Cell<bool>>,
}

struct StoreInner {
    state: GuideState,
    registry: GuideRegistry,
    listeners: Vec<ListenerEntry>,
    next_listener: u64,
    broadcasting: bool,
    pending: VecDeque<GuideAction>,
    policy: BroadcastPolicy,
    version: u64,
}

impl StoreInner {
    /// Apply a state command. Returns `true` if the state changed.
    fn apply(&mut self, action: &GuideAction) -> bool {
        let next = action.reduce(&self.state);
        debug_assert!(next.is_consistent(), "guide state invariant violated");
        let changed = next != self.state;
        if changed {
            debug!(
                target: "guidepost.store",
                command = action.name(),
                guide = next.current_guide().map(|g| g.id.as_str()).unwrap_or(""),
                step = next.current_step() as u64,
                "guide state changed"
            );
        } else {
            debug!(
                target: "guidepost.store",
                command = action.name(),
                "command left guide state unchanged"
            );
        }
        self.state = next;
        changed
    }

    fn should_broadcast(&self, changed: bool) -> bool {
        changed || self.policy == BroadcastPolicy::Always
    }
}

/// Resets the in-flight flag even if a listener unwinds.
struct BroadcastGuard<'a> {
    inner: &'a Rc<RefCell<StoreInner>>,
}

impl Drop for BroadcastGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut inner) = self.inner.try_borrow_mut() {
            inner.broadcasting = false;
            if std::thread::panicking() {
                inner.pending.clear();
            }
        }
    }
}

/// Shared handle to the guide state, registry and listeners.
#[derive(Clone)]
pub struct GuideStore {
    inner: Rc<RefCell<StoreInner>>,
}

impl core::fmt::Debug for GuideStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("GuideStore")
            .field("state", &inner.state)
            .field("anchors", &inner.registry.len())
            .field("listeners", &inner.listeners.len())
            .field("policy", &inner.policy)
            .field("version", &inner.version)
            .finish()
    }
}

impl Default for GuideStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GuideStore {
    /// An idle store that broadcasts after every state command.
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(BroadcastPolicy::default())
    }

    /// A store using the broadcast policy from `config`.
    #[must_use]
    pub fn from_config(config: &GuideConfig) -> Self {
        Self::with_policy(config.broadcast)
    }

    #[must_use]
    pub fn with_policy(policy: BroadcastPolicy) -> Self {
        Self {
            inner: Rc::new(RefCell::new(StoreInner {
                state: GuideState::idle(),
                registry: GuideRegistry::new(),
                listeners: Vec::new(),
                next_listener: 1,
                broadcasting: false,
                pending: VecDeque::new(),
                policy,
                version: 0,
            })),
        }
    }

    // ---------------------------------------------------------------------
    // Commands
    // ---------------------------------------------------------------------

    /// Apply a command.
    ///
    /// Registry commands take effect immediately. State commands take effect
    /// immediately unless a broadcast is in flight, in which case they are
    /// queued behind it.
    pub fn dispatch(&self, action: GuideAction) {
        telemetry::record_command(action.name());
        match action {
            GuideAction::RegisterAnchor { target, handle } => {
                self.inner.borrow_mut().registry.register(target, handle);
            }
            GuideAction::UnregisterAnchor { target, handle } => {
                self.inner.borrow_mut().registry.unregister(&target, handle);
            }
            state_command => self.apply_state_command(state_command),
        }
    }

    /// Select `guide` without starting it: step 0, no anchor active.
    ///
    /// Use [`start_guide`](Self::start_guide) to land on the first step.
    pub fn set_active_guide(&self, guide: impl Into<Rc<GuideDefinition>>) {
        self.dispatch(GuideAction::SetActiveGuide(guide.into()));
    }

    /// Select `guide` and show its first step in one broadcast.
    pub fn start_guide(&self, guide: impl Into<Rc<GuideDefinition>>) {
        self.dispatch(GuideAction::StartGuide(guide.into()));
    }

    /// Advance one step. At the last step the guide ends; without a guide the
    /// state is unchanged.
    pub fn next_step(&self) {
        self.dispatch(GuideAction::NextStep);
    }

    /// End the current guide, if any.
    pub fn close_guide(&self) {
        self.dispatch(GuideAction::CloseGuide);
    }

    /// Record an anchor mounted at `target`. Last registration wins.
    pub fn register_anchor(&self, target: AnchorTarget, handle: AnchorHandle) {
        self.dispatch(GuideAction::RegisterAnchor { target, handle });
    }

    /// Forget the anchor at `target` if it is still `handle`.
    pub fn unregister_anchor(&self, target: AnchorTarget, handle: AnchorHandle) {
        self.dispatch(GuideAction::UnregisterAnchor { target, handle });
    }

    /// Register an anchor and return a guard that unregisters it on drop.
    #[must_use = "dropping the registration unregisters the anchor immediately"]
    pub fn register_scoped(&self, target: AnchorTarget, handle: AnchorHandle) -> Registration {
        self.register_anchor(target.clone(), handle);
        Registration {
            target,
            handle,
            store: Rc::downgrade(&self.inner),
        }
    }

    fn apply_state_command(&self, action: GuideAction) {
        let broadcast = {
            let mut inner = self.inner.borrow_mut();
            if inner.broadcasting {
                inner.pending.push_back(action.clone());
                let queued = inner.pending.len();
                drop(inner);
                telemetry::record_deferred(action.name(), queued);
                return;
            }
            let changed = inner.apply(&action);
            inner.should_broadcast(changed)
        };
        if broadcast {
            self.broadcast(action.name());
        }
    }

    /// Deliver the current state to every live listener, then drain commands
    /// queued during delivery (each of which may broadcast in turn).
    fn broadcast(&self, mut command: &'static str) {
        loop {
            let (callbacks, state, version) = {
                let mut inner = self.inner.borrow_mut();
                inner.broadcasting = true;
                inner.version += 1;
                let callbacks: Vec<(ListenerFn, Rc<Cell<bool>>)> = inner
                    .listeners
                    .iter()
                    .map(|l| (Rc::clone(&l.callback), Rc::clone(&l.live)))
                    .collect();
                (callbacks, inner.state.clone(), inner.version)
            };

            {
                let _guard = BroadcastGuard { inner: &self.inner };
                telemetry::trace_broadcast(command, version, callbacks.len(), || {
                    for (callback, live) in &callbacks {
                        if live.get() {
                            callback(&state);
                        }
                    }
                });
            }
            // Listener closures may own subscriptions; drop them with no
            // borrow held.
            drop(callbacks);

            let next = {
                let mut inner = self.inner.borrow_mut();
                let mut next = None;
                while let Some(action) = inner.pending.pop_front() {
                    let changed = inner.apply(&action);
                    if inner.should_broadcast(changed) {
                        next = Some(action.name());
                        break;
                    }
                }
                next
            };
            match next {
                Some(name) => command = name,
                None => break,
            }
        }
    }

    // ---------------------------------------------------------------------
    // Listeners
    // ---------------------------------------------------------------------

    /// Register `listener` to receive the full state on every broadcast.
    ///
    /// The returned [`Subscription`] unsubscribes when dropped. The listener
    /// is not called with the current state; read [`state`](Self::state) for
    /// that.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, listener: impl Fn(&GuideState) + 'static) -> Subscription {
        let live = Rc::new(Cell::new(true));
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = ListenerId(inner.next_listener);
            inner.next_listener += 1;
            inner.listeners.push(ListenerEntry {
                id,
                callback: Rc::new(listener),
                live: Rc::clone(&live),
            });
            id
        };
        debug!(
            target: "guidepost.store",
            listener = id.get(),
            "listener subscribed"
        );
        Subscription {
            id,
            live,
            store: Rc::downgrade(&self.inner),
        }
    }

    /// Remove a listener. Safe during a broadcast: the listener is skipped
    /// for the rest of it. Returns `true` if the listener was registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let removed = {
            let mut inner = self.inner.borrow_mut();
            inner
                .listeners
                .iter()
                .position(|l| l.id == id)
                .map(|idx| inner.listeners.remove(idx))
        };
        match removed {
            Some(entry) => {
                entry.live.set(false);
                debug!(
                    target: "guidepost.store",
                    listener = id.get(),
                    "listener unsubscribed"
                );
                // `entry` drops here, outside the borrow.
                true
            }
            None => false,
        }
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    /// A snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> GuideState {
        self.inner.borrow().state.clone()
    }

    /// Target of the current step, if any.
    #[must_use]
    pub fn active_target(&self) -> Option<AnchorTarget> {
        self.inner.borrow().state.active_target().cloned()
    }

    #[must_use]
    pub fn current_step(&self) -> usize {
        self.inner.borrow().state.current_step()
    }

    /// Number of broadcasts delivered so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    /// `true` while listeners are being notified.
    #[must_use]
    pub fn is_broadcasting(&self) -> bool {
        self.inner.borrow().broadcasting
    }

    #[must_use]
    pub fn policy(&self) -> BroadcastPolicy {
        self.inner.borrow().policy
    }

    pub fn set_policy(&self, policy: BroadcastPolicy) {
        self.inner.borrow_mut().policy = policy;
    }

    /// Whether an anchor is currently mounted at `target`.
    #[must_use]
    pub fn is_mounted(&self, target: &AnchorTarget) -> bool {
        self.inner.borrow().registry.is_mounted(target)
    }

    /// Read access to the anchor registry.
    pub fn with_registry<R>(&self, f: impl FnOnce(&GuideRegistry) -> R) -> R {
        f(&self.inner.borrow().registry)
    }

    /// `true` if both handles share the same storage.
    #[must_use]
    pub fn same_store(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Drop every listener, registration and queued command and return to
    /// the idle state. Live listeners receive the idle state once before
    /// they are dropped; it does not count as a broadcast. Commands issued
    /// during that final delivery are discarded. Outstanding guards become
    /// inert.
    pub fn teardown(&self) {
        let listeners = {
            let mut inner = self.inner.borrow_mut();
            inner.registry.clear();
            inner.pending.clear();
            inner.state = GuideState::idle();
            inner.broadcasting = true;
            std::mem::take(&mut inner.listeners)
        };

        let idle = GuideState::idle();
        {
            let _guard = BroadcastGuard { inner: &self.inner };
            for entry in &listeners {
                if entry.live.get() {
                    (entry.callback)(&idle);
                }
            }
        }
        for entry in &listeners {
            entry.live.set(false);
        }
        self.inner.borrow_mut().pending.clear();
        debug!(
            target: "guidepost.store",
            listeners = listeners.len() as u64,
            "store torn down"
        );
    }
}

/// RAII guard for a listener.
///
/// Dropping it unsubscribes. If the store is gone the drop is a no-op.
pub struct Subscription {
    id: ListenerId,
    live: Rc<Cell<bool>>,
    store: Weak<RefCell<StoreInner>>,
}

impl Subscription {
    #[must_use]
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// `false` once unsubscribed or once the store was torn down.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.live.get()
    }

    /// Unsubscribe now.
    pub fn cancel(self) {}
}

impl core::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.live.get())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if !self.live.replace(false) {
            return;
        }
        if let Some(inner) = self.store.upgrade() {
            GuideStore { inner }.unsubscribe(self.id);
        }
    }
}

/// RAII guard for an anchor registration.
///
/// Dropping it unregisters with the handle it registered, so a stale guard
/// never removes a newer anchor's entry.
pub struct Registration {
    target: AnchorTarget,
    handle: AnchorHandle,
    store: Weak<RefCell<StoreInner>>,
}

impl Registration {
    #[must_use]
    pub fn target(&self) -> &AnchorTarget {
        &self.target
    }

    #[must_use]
    pub fn handle(&self) -> AnchorHandle {
        self.handle
    }
}

impl core::fmt::Debug for Registration {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Registration")
            .field("target", &self.target)
            .field("handle", &self.handle)
            .finish()
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        if let Some(inner) = self.store.upgrade() {
            GuideStore { inner }.unregister_anchor(self.target.clone(), self.handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_step() -> GuideDefinition {
        GuideDefinition::new("g").step_at("a").step_at("b")
    }

    fn recorder(store: &GuideStore) -> (Rc<RefCell<Vec<GuideState>>>, Subscription) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = Rc::clone(&seen);
        let sub = store.subscribe(move |state| seen_clone.borrow_mut().push(state.clone()));
        (seen, sub)
    }

    #[test]
    fn set_active_guide_stages_and_broadcasts() {
        let store = GuideStore::new();
        let (seen, _sub) = recorder(&store);

        store.set_active_guide(two_step());
        assert_eq!(store.current_step(), 0);
        assert!(store.active_target().is_none());
        assert_eq!(seen.borrow().len(), 1);
        assert!(seen.borrow()[0].has_guide());
    }

    #[test]
    fn next_step_walks_and_terminates() {
        let store = GuideStore::new();
        store.set_active_guide(two_step());

        store.next_step();
        assert_eq!(store.active_target(), Some(AnchorTarget::new("a")));
        store.next_step();
        assert_eq!(store.active_target(), Some(AnchorTarget::new("b")));
        store.next_step();
        assert!(!store.state().has_guide());
        assert_eq!(store.current_step(), 0);

        store.next_step();
        assert_eq!(store.state(), GuideState::idle());
    }

    #[test]
    fn always_policy_broadcasts_noop_commands() {
        let store = GuideStore::new();
        let (seen, _sub) = recorder(&store);
        store.next_step();
        store.close_guide();
        assert_eq!(seen.borrow().len(), 2);
        assert_eq!(store.version(), 2);
    }

    #[test]
    fn on_change_policy_skips_noop_commands() {
        let store = GuideStore::with_policy(BroadcastPolicy::OnChange);
        let (seen, _sub) = recorder(&store);
        store.next_step();
        store.close_guide();
        assert!(seen.borrow().is_empty());

        store.start_guide(two_step());
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(store.version(), 1);
    }

    #[test]
    fn listeners_called_in_registration_order() {
        let store = GuideStore::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let l1 = Rc::clone(&log);
        let _a = store.subscribe(move |_| l1.borrow_mut().push('A'));
        let l2 = Rc::clone(&log);
        let _b = store.subscribe(move |_| l2.borrow_mut().push('B'));
        let l3 = Rc::clone(&log);
        let _c = store.subscribe(move |_| l3.borrow_mut().push('C'));

        store.close_guide();
        assert_eq!(*log.borrow(), vec!['A', 'B', 'C']);
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let store = GuideStore::new();
        let (seen, sub) = recorder(&store);
        assert_eq!(store.listener_count(), 1);
        assert!(sub.is_active());

        drop(sub);
        assert_eq!(store.listener_count(), 0);
        store.close_guide();
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn explicit_unsubscribe_then_drop_is_harmless() {
        let store = GuideStore::new();
        let (_seen, sub) = recorder(&store);
        assert!(store.unsubscribe(sub.id()));
        assert!(!store.unsubscribe(sub.id()));
        drop(sub);
        assert_eq!(store.listener_count(), 0);
    }

    #[test]
    fn self_unsubscribe_during_broadcast_reaches_later_listeners() {
        let store = GuideStore::new();
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let slot_clone = Rc::clone(&slot);
        let first_calls = Rc::new(Cell::new(0u32));
        let first_calls_clone = Rc::clone(&first_calls);

        let sub = store.subscribe(move |_| {
            first_calls_clone.set(first_calls_clone.get() + 1);
            slot_clone.borrow_mut().take();
        });
        *slot.borrow_mut() = Some(sub);

        let (seen, _second) = recorder(&store);

        store.close_guide();
        assert_eq!(first_calls.get(), 1);
        assert_eq!(seen.borrow().len(), 1);

        store.close_guide();
        assert_eq!(first_calls.get(), 1);
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn listener_removed_mid_broadcast_is_skipped() {
        let store = GuideStore::new();
        let victim: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let victim_clone = Rc::clone(&victim);
        let _killer = store.subscribe(move |_| {
            victim_clone.borrow_mut().take();
        });
        let (seen, sub) = recorder(&store);
        *victim.borrow_mut() = Some(sub);

        store.close_guide();
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn subscribe_during_broadcast_starts_next_time() {
        let store = GuideStore::new();
        let late_calls = Rc::new(Cell::new(0u32));
        let holder: Rc<RefCell<Vec<Subscription>>> = Rc::new(RefCell::new(Vec::new()));

        let store_clone = store.clone();
        let holder_clone = Rc::clone(&holder);
        let late_clone = Rc::clone(&late_calls);
        let _adder = store.subscribe(move |_| {
            if holder_clone.borrow().is_empty() {
                let late = Rc::clone(&late_clone);
                let sub = store_clone.subscribe(move |_| late.set(late.get() + 1));
                holder_clone.borrow_mut().push(sub);
            }
        });

        store.close_guide();
        assert_eq!(late_calls.get(), 0);
        store.close_guide();
        assert_eq!(late_calls.get(), 1);
    }

    #[test]
    fn commands_from_listener_are_deferred_until_broadcast_completes() {
        let store = GuideStore::new();
        let log = Rc::new(RefCell::new(Vec::<(char, usize)>::new()));

        let store_clone = store.clone();
        let log_a = Rc::clone(&log);
        let _a = store.subscribe(move |state| {
            log_a.borrow_mut().push(('A', state.current_step()));
            if state.current_step() == 1 {
                store_clone.next_step();
            }
        });
        let log_b = Rc::clone(&log);
        let _b = store.subscribe(move |state| log_b.borrow_mut().push(('B', state.current_step())));

        store.start_guide(two_step());
        assert_eq!(
            *log.borrow(),
            vec![('A', 1), ('B', 1), ('A', 2), ('B', 2)],
            "B must see step 1 before anyone sees step 2"
        );
        assert_eq!(store.current_step(), 2);
        assert!(!store.is_broadcasting());
    }

    #[test]
    fn registry_commands_do_not_broadcast() {
        let store = GuideStore::new();
        let (seen, _sub) = recorder(&store);
        let h = AnchorHandle::next();
        store.register_anchor(AnchorTarget::new("a"), h);
        assert!(store.is_mounted(&AnchorTarget::new("a")));
        store.unregister_anchor(AnchorTarget::new("a"), h);
        assert!(!store.is_mounted(&AnchorTarget::new("a")));
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn scoped_registration_unregisters_on_drop() {
        let store = GuideStore::new();
        let target = AnchorTarget::new("t");
        let old = store.register_scoped(target.clone(), AnchorHandle::next());
        let new = store.register_scoped(target.clone(), AnchorHandle::next());

        drop(old);
        assert_eq!(
            store.with_registry(|r| r.handle_for(&target)),
            Some(new.handle())
        );
        drop(new);
        assert!(!store.is_mounted(&target));
    }

    #[test]
    fn guards_outliving_store_are_inert() {
        let store = GuideStore::new();
        let sub = store.subscribe(|_| {});
        let reg = store.register_scoped(AnchorTarget::new("a"), AnchorHandle::next());
        drop(store);
        drop(sub);
        drop(reg);
    }

    #[test]
    fn teardown_resets_everything() {
        let store = GuideStore::new();
        let (seen, sub) = recorder(&store);
        store.register_anchor(AnchorTarget::new("a"), AnchorHandle::next());
        store.start_guide(two_step());

        store.teardown();
        assert!(!sub.is_active());
        assert_eq!(store.listener_count(), 0);
        assert!(!store.is_mounted(&AnchorTarget::new("a")));
        assert_eq!(store.state(), GuideState::idle());
        assert_eq!(store.version(), 1);
        assert!(!store.is_broadcasting());

        // Listeners hear the idle state once, then nothing more.
        assert_eq!(seen.borrow().len(), 2);
        assert_eq!(seen.borrow()[1], GuideState::idle());
        store.next_step();
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn commands_during_teardown_are_discarded() {
        let store = GuideStore::new();
        let inner = store.clone();
        let _sub = store.subscribe(move |state| {
            if !state.has_guide() {
                inner.start_guide(GuideDefinition::new("again").step_at("a"));
            }
        });
        store.teardown();
        assert_eq!(store.state(), GuideState::idle());
        assert_eq!(store.version(), 0);
    }

    #[test]
    fn set_policy_switches_broadcasting() {
        let store = GuideStore::new();
        store.next_step();
        assert_eq!(store.version(), 1);

        store.set_policy(BroadcastPolicy::OnChange);
        assert_eq!(store.policy(), BroadcastPolicy::OnChange);
        store.next_step();
        assert_eq!(store.version(), 1);
    }

    #[test]
    fn clones_share_state() {
        let a = GuideStore::new();
        let b = a.clone();
        assert!(a.same_store(&b));
        a.start_guide(two_step());
        assert_eq!(b.current_step(), 1);
        assert!(!a.same_store(&GuideStore::new()));
    }

    #[test]
    fn panicking_listener_leaves_store_usable() {
        let store = GuideStore::new();
        let armed = Rc::new(Cell::new(true));
        let armed_clone = Rc::clone(&armed);
        let _sub = store.subscribe(move |_| {
            if armed_clone.replace(false) {
                panic!("listener failure");
            }
        });

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            store.start_guide(two_step());
        }));
        assert!(result.is_err());
        assert!(!store.is_broadcasting());

        store.next_step();
        assert_eq!(store.current_step(), 2);
    }

    #[test]
    fn debug_format() {
        let store = GuideStore::new();
        let dbg = format!("{store:?}");
        assert!(dbg.contains("GuideStore"));
        assert!(dbg.contains("version"));
    }
}
