//! Drop timer bookkeeping
//!
//! The engine never sleeps or spawns threads. Callers pass in the current
//! instant and the scheduler reports when the next automatic drop is due.

use crate::game::{Action, Game};
use std::time::{Duration, Instant};
use tracing::debug;

/// A single repeating timer, armed only while the game runs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropScheduler {
    interval: Option<Duration>,
    next_due: Option<Instant>,
}

impl DropScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Match the timer to the game's current drop interval.
    ///
    /// A new or changed interval restarts the countdown from `now`. `None`
    /// cancels the timer.
    pub fn sync(&mut self, interval: Option<Duration>, now: Instant) {
        match interval {
            None => {
                if self.next_due.is_some() {
                    debug!("drop timer cancelled");
                }
                self.interval = None;
                self.next_due = None;
            }
            Some(period) => {
                if self.interval != Some(period) || self.next_due.is_none() {
                    debug!(interval_ms = period.as_millis() as u64, "drop timer armed");
                    self.interval = Some(period);
                    self.next_due = Some(now + period);
                }
            }
        }
    }

    /// Drop the current deadline so the next `sync` starts a fresh countdown
    pub fn reset(&mut self) {
        self.next_due = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    /// Consume one due tick, if any. The next deadline is measured from
    /// `now`, so a stalled caller never gets a burst of catch-up drops.
    pub fn poll(&mut self, now: Instant) -> bool {
        match (self.next_due, self.interval) {
            (Some(due), Some(period)) if now >= due => {
                self.next_due = Some(now + period);
                true
            }
            _ => false,
        }
    }

    /// How long a caller may wait before the next tick is due
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }
}

/// A game together with its drop timer
#[derive(Debug, Clone)]
pub struct Driver {
    pub game: Game,
    scheduler: DropScheduler,
}

impl Driver {
    pub fn new(game: Game, now: Instant) -> Self {
        let mut scheduler = DropScheduler::new();
        scheduler.sync(game.drop_interval(), now);
        Self { game, scheduler }
    }

    pub fn scheduler(&self) -> &DropScheduler {
        &self.scheduler
    }

    /// Apply a player action and bring the timer up to date
    pub fn dispatch(&mut self, action: Action, now: Instant) {
        self.game.apply(action);
        // A fresh game gets a full interval before its first drop
        if action == Action::Restart {
            self.scheduler.reset();
        }
        self.scheduler.sync(self.game.drop_interval(), now);
    }

    /// Run any due automatic drop. Returns whether one happened.
    pub fn advance(&mut self, now: Instant) -> bool {
        let due = self.scheduler.poll(now);
        if due {
            self.game.drop_tick();
        }
        self.scheduler.sync(self.game.drop_interval(), now);
        due
    }

    /// Time until `advance` has work to do
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.scheduler.time_until_due(now)
    }
}
