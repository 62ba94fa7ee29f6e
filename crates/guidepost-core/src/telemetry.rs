#![forbid(unsafe_code)]

//! Counters and tracing helpers for guide coordination.
//!
//! - **Tracing spans**: every broadcast runs inside a `guide.broadcast` span
//!   carrying `command`, `version`, `listeners` and `duration_us`.
//! - **Counters**: process-wide monotonic counters for commands, broadcasts,
//!   deferred commands and scroll requests.
//!
//! Installing a subscriber is the host application's job; nothing here
//! initializes global tracing state.

use std::sync::atomic::{AtomicU64, Ordering};
use web_time::Instant;

static COMMANDS_TOTAL: AtomicU64 = AtomicU64::new(0);
static BROADCASTS_TOTAL: AtomicU64 = AtomicU64::new(0);
static DEFERRED_COMMANDS_TOTAL: AtomicU64 = AtomicU64::new(0);
static SCROLL_REQUESTS_TOTAL: AtomicU64 = AtomicU64::new(0);

/// Total commands dispatched to any store.
#[must_use]
pub fn commands_total() -> u64 {
    COMMANDS_TOTAL.load(Ordering::Relaxed)
}

/// Total broadcasts delivered by any store.
#[must_use]
pub fn broadcasts_total() -> u64 {
    BROADCASTS_TOTAL.load(Ordering::Relaxed)
}

/// Total state commands queued because a broadcast was in flight.
#[must_use]
pub fn deferred_commands_total() -> u64 {
    DEFERRED_COMMANDS_TOTAL.load(Ordering::Relaxed)
}

/// Total scroll-into-view requests issued by anchors.
#[must_use]
pub fn scroll_requests_total() -> u64 {
    SCROLL_REQUESTS_TOTAL.load(Ordering::Relaxed)
}

pub(crate) fn record_command(command: &'static str) {
    COMMANDS_TOTAL.fetch_add(1, Ordering::Relaxed);
    tracing::trace!(target: "guidepost.store", command, "command dispatched");
}

pub(crate) fn record_deferred(command: &'static str, queued: usize) {
    DEFERRED_COMMANDS_TOTAL.fetch_add(1, Ordering::Relaxed);
    tracing::debug!(
        target: "guidepost.store",
        command,
        queued = queued as u64,
        "command deferred until broadcast completes"
    );
}

/// Record a scroll request from an anchor.
pub fn record_scroll_request(anchor_target: &str, handle: u64) {
    SCROLL_REQUESTS_TOTAL.fetch_add(1, Ordering::Relaxed);
    tracing::debug!(
        target: "guidepost.anchor",
        anchor_target = %anchor_target,
        handle,
        "scroll into view requested"
    );
}

/// Run `deliver` inside a `guide.broadcast` span.
pub(crate) fn trace_broadcast<F>(command: &'static str, version: u64, listeners: usize, deliver: F)
where
    F: FnOnce(),
{
    BROADCASTS_TOTAL.fetch_add(1, Ordering::Relaxed);

    let start = Instant::now();
    let span = tracing::debug_span!(
        "guide.broadcast",
        command,
        version,
        listeners = listeners as u64,
        duration_us = tracing::field::Empty,
    );
    let _entered = span.enter();

    deliver();

    let duration_us = start.elapsed().as_micros() as u64;
    span.record("duration_us", duration_us);
    tracing::trace!(
        target: "guidepost.store",
        command,
        version,
        duration_us,
        "broadcast delivered"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_are_monotonic() {
        let before = commands_total();
        record_command("next_step");
        assert!(commands_total() > before);

        let before = broadcasts_total();
        let mut ran = false;
        trace_broadcast("next_step", 1, 0, || ran = true);
        assert!(ran);
        assert!(broadcasts_total() > before);

        let before = scroll_requests_total();
        record_scroll_request("a", 1);
        assert!(scroll_requests_total() > before);

        let before = deferred_commands_total();
        record_deferred("close_guide", 1);
        assert!(deferred_commands_total() > before);
    }
}
