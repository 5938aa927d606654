//! Cancellable timers keyed by role
//!
//! Each timer is a tokio task that posts a [`TimerFired`] back to the
//! controller loop. A firing is only honoured while the token it carries is
//! still registered for its role, so events already queued when a timer was
//! cancelled or replaced are dropped on arrival.

use std::collections::BTreeMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimerRole {
    /// Per-second countdown, shared by both countdown phases
    Tick,
    /// Wait between navigation and the auto-close phase
    Settle,
    /// Deferred close independent of the countdown
    Backstop,
    LivenessPoll,
    /// Re-check after a close request
    CloseGrace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerFired {
    pub role: TimerRole,
    pub token: u64,
}

#[derive(Debug)]
struct Entry {
    token: u64,
    repeating: bool,
    handle: JoinHandle<()>,
}

#[derive(Debug)]
pub struct TimerSet {
    tx: mpsc::UnboundedSender<TimerFired>,
    entries: BTreeMap<TimerRole, Entry>,
    next_token: u64,
}

impl TimerSet {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TimerFired>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let set = Self {
            tx,
            entries: BTreeMap::new(),
            next_token: 0,
        };
        (set, rx)
    }

    /// Fire once after `delay`, replacing any timer already holding `role`
    pub fn once(&mut self, role: TimerRole, delay: Duration) {
        let fired = self.reserve(role);
        let tx = self.tx.clone();
        let deadline = Instant::now() + delay;

        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let _ = tx.send(fired);
        });

        self.install(role, fired.token, false, handle);
    }

    /// Fire every `period`, first firing one period from now
    pub fn every(&mut self, role: TimerRole, period: Duration) {
        let fired = self.reserve(role);
        let tx = self.tx.clone();
        let start = Instant::now() + period;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(start, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if tx.send(fired).is_err() {
                    break;
                }
            }
        });

        self.install(role, fired.token, true, handle);
    }

    fn reserve(&mut self, role: TimerRole) -> TimerFired {
        self.cancel(role);
        self.next_token += 1;
        TimerFired {
            role,
            token: self.next_token,
        }
    }

    fn install(&mut self, role: TimerRole, token: u64, repeating: bool, handle: JoinHandle<()>) {
        trace!(?role, token, repeating, "Timer armed");
        self.entries.insert(
            role,
            Entry {
                token,
                repeating,
                handle,
            },
        );
    }

    pub fn cancel(&mut self, role: TimerRole) -> bool {
        match self.entries.remove(&role) {
            Some(entry) => {
                entry.handle.abort();
                trace!(?role, token = entry.token, "Timer cancelled");
                true
            }
            None => false,
        }
    }

    /// Abort every timer. Returns how many were pending.
    pub fn cancel_all(&mut self) -> usize {
        let entries = std::mem::take(&mut self.entries);
        let count = entries.len();
        for (_, entry) in entries {
            entry.handle.abort();
        }
        if count > 0 {
            trace!(count, "All timers cancelled");
        }
        count
    }

    /// Whether `fired` belongs to a live timer. One-shot timers are
    /// retired when accepted.
    pub fn accept(&mut self, fired: TimerFired) -> bool {
        match self.entries.get(&fired.role) {
            Some(entry) if entry.token == fired.token => {
                if !entry.repeating {
                    self.entries.remove(&fired.role);
                }
                true
            }
            _ => false,
        }
    }

    pub fn is_armed(&self, role: TimerRole) -> bool {
        self.entries.contains_key(&role)
    }

    pub fn pending(&self) -> usize {
        self.entries.len()
    }
}

impl Drop for TimerSet {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
