//! Change watcher: decides when the document must be rescanned.
//!
//! # Responsibility
//! - Collapse mutation bursts into single rescans (debounce-then-fire-once).
//! - Gate mutation-driven rescans behind elapsed-time and card-count checks.
//! - Poll for navigation changes and run the self-healing fallback check.
//!
//! # Invariants
//! - All bookkeeping lives on this struct; there is no ambient state.
//! - An armed debounce deadline is never reset by further mutations.
//! - Deadlines that fire re-check live document state instead of trusting
//!   the state captured when they were armed.
//!
//! The watcher is host-pumped: the owner calls [`ChangeWatcher::poll`] from
//! its event loop and performs a scan whenever a reason is returned. It runs
//! for the lifetime of the page; there is no terminal state.

use crate::locate::EntityLocator;
use crate::page::{Element, PageDocument, ReadyState};
use crate::render;
use log::debug;
use std::time::{Duration, Instant};

/// Timing knobs for all watcher triggers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatcherConfig {
    /// Delay between a matching mutation and its rescan attempt.
    pub debounce: Duration,
    /// Minimum elapsed time between gate-passing rescans.
    pub min_scan_interval: Duration,
    /// How often the location identifier is compared.
    pub location_poll_interval: Duration,
    /// Delay between a location change and its rescan.
    pub location_rescan_delay: Duration,
    /// How often the self-healing fallback check runs.
    pub fallback_poll_interval: Duration,
    /// Delay between a note edit and its rescan, letting the input surface
    /// dismiss before the tree mutates.
    pub editor_rescan_delay: Duration,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(1000),
            min_scan_interval: Duration::from_millis(2000),
            location_poll_interval: Duration::from_millis(2000),
            location_rescan_delay: Duration::from_millis(1500),
            fallback_poll_interval: Duration::from_millis(10_000),
            editor_rescan_delay: Duration::from_millis(100),
        }
    }
}

/// Why a rescan was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanReason {
    /// First scan of an already-loaded document.
    Startup,
    /// First scan, deferred until the document finished loading.
    DocumentReady,
    /// Debounced mutation trigger that passed the throttle gate.
    Mutation,
    /// Location change; bypasses the throttle gate.
    Navigation,
    /// Cards exist but zero affordances do; bypasses the throttle gate.
    Fallback,
    /// A note was edited; bypasses the throttle gate.
    NoteEdited,
}

/// Explicit watcher object owning every piece of trigger bookkeeping.
pub struct ChangeWatcher {
    config: WatcherConfig,
    waiting_for_ready: bool,
    startup_pending: bool,
    debounce_deadline: Option<Instant>,
    delayed_rescan: Option<(Instant, ScanReason)>,
    last_scan_at: Option<Instant>,
    last_card_count: usize,
    last_location: String,
    next_location_poll: Instant,
    next_fallback_poll: Instant,
}

impl ChangeWatcher {
    /// Creates a watcher for `doc`.
    ///
    /// A document that is still loading defers its first scan to the ready
    /// signal; otherwise the first poll fires the startup scan immediately.
    pub fn new(config: WatcherConfig, doc: &PageDocument, now: Instant) -> Self {
        let waiting_for_ready = doc.ready_state == ReadyState::Loading;
        Self {
            waiting_for_ready,
            startup_pending: !waiting_for_ready,
            debounce_deadline: None,
            delayed_rescan: None,
            last_scan_at: None,
            last_card_count: 0,
            last_location: doc.location.clone(),
            next_location_poll: now + config.location_poll_interval,
            next_fallback_poll: now + config.fallback_poll_interval,
            config,
        }
    }

    /// Returns the active timing configuration.
    pub fn config(&self) -> &WatcherConfig {
        &self.config
    }

    /// Reports one observed subtree insertion.
    ///
    /// Insertions that neither are nor contain an entity card are ignored.
    /// A matching insertion arms the debounce deadline only when none is
    /// pending; an armed deadline is never pushed back.
    pub fn record_mutation<L: EntityLocator>(&mut self, locator: &L, inserted: &Element, now: Instant) {
        if !locator.subtree_has_card(inserted) {
            return;
        }
        if self.debounce_deadline.is_some() {
            return;
        }
        self.debounce_deadline = Some(now + self.config.debounce);
        debug!("event=mutation_armed module=watch status=ok debounce_ms={}", self.config.debounce.as_millis());
    }

    /// Schedules one gate-bypassing rescan after `delay`.
    ///
    /// A single pending slot is kept; when two requests overlap, the
    /// earlier deadline wins.
    pub fn request_rescan(&mut self, reason: ScanReason, delay: Duration, now: Instant) {
        let deadline = now + delay;
        match self.delayed_rescan {
            Some((pending, _)) if pending <= deadline => {}
            _ => self.delayed_rescan = Some((deadline, reason)),
        }
    }

    /// Evaluates every trigger against the live document.
    ///
    /// Returns at most one due rescan reason per call; the host keeps
    /// pumping, so remaining triggers fire on later polls.
    pub fn poll<L: EntityLocator>(
        &mut self,
        doc: &PageDocument,
        locator: &L,
        now: Instant,
    ) -> Option<ScanReason> {
        if self.waiting_for_ready {
            if doc.ready_state != ReadyState::Complete {
                return None;
            }
            self.waiting_for_ready = false;
            return Some(ScanReason::DocumentReady);
        }

        if self.startup_pending {
            self.startup_pending = false;
            return Some(ScanReason::Startup);
        }

        if let Some((deadline, reason)) = self.delayed_rescan {
            if now >= deadline {
                self.delayed_rescan = None;
                return Some(reason);
            }
        }

        if let Some(deadline) = self.debounce_deadline {
            if now >= deadline {
                self.debounce_deadline = None;
                if let Some(reason) = self.evaluate_throttle_gate(doc, locator, now) {
                    return Some(reason);
                }
            }
        }

        if now >= self.next_location_poll {
            self.next_location_poll = now + self.config.location_poll_interval;
            if doc.location != self.last_location {
                self.last_location = doc.location.clone();
                debug!("event=navigation_detected module=watch status=ok location={}", doc.location);
                self.request_rescan(ScanReason::Navigation, self.config.location_rescan_delay, now);
            }
        }

        if now >= self.next_fallback_poll {
            self.next_fallback_poll = now + self.config.fallback_poll_interval;
            let cards = locator.card_paths(doc).len();
            if cards > 0 && render::affordance_count(doc) == 0 {
                debug!("event=fallback_triggered module=watch status=ok cards={cards}");
                return Some(ScanReason::Fallback);
            }
        }

        None
    }

    /// Throttle gate for debounced mutation firings.
    ///
    /// Both checks must pass: minimum elapsed time since the last gated
    /// scan, and a card count differing from the last observed one (an
    /// unchanged non-zero count is a skip). Passing updates the bookkeeping.
    fn evaluate_throttle_gate<L: EntityLocator>(
        &mut self,
        doc: &PageDocument,
        locator: &L,
        now: Instant,
    ) -> Option<ScanReason> {
        if let Some(last) = self.last_scan_at {
            if now.duration_since(last) < self.config.min_scan_interval {
                debug!("event=rescan_gate module=watch status=skip reason=too_soon");
                return None;
            }
        }

        let count = locator.card_paths(doc).len();
        if count == self.last_card_count && count > 0 {
            debug!("event=rescan_gate module=watch status=skip reason=count_unchanged count={count}");
            return None;
        }

        self.last_scan_at = Some(now);
        self.last_card_count = count;
        Some(ScanReason::Mutation)
    }
}
