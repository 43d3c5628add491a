//! Timed background jobs: countdown timers and the price alert watcher.
//!
//! The scheduler never runs anything on its own. The shell asks it what is
//! due on every tick and performs the work itself.

use std::time::{Duration, Instant};

/// Which side of the target a price alert is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Above,
    Below,
}

/// A target price for one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceAlert {
    pub symbol: String,
    pub target: f64,
    pub direction: Direction,
}

impl PriceAlert {
    /// Alert whose direction is set by where the price is now.
    pub fn new(symbol: impl Into<String>, target: f64, current: f64) -> Self {
        let direction = if target >= current {
            Direction::Above
        } else {
            Direction::Below
        };
        Self {
            symbol: symbol.into(),
            target,
            direction,
        }
    }

    pub fn is_reached(&self, price: f64) -> bool {
        match self.direction {
            Direction::Above => price >= self.target,
            Direction::Below => price <= self.target,
        }
    }
}

#[derive(Debug)]
struct Timer {
    due: Instant,
    seconds: u64,
}

#[derive(Debug)]
struct Watch {
    alert: PriceAlert,
    interval: Duration,
    next_poll: Instant,
}

/// Pending timers plus at most one price alert.
#[derive(Debug, Default)]
pub struct Scheduler {
    timers: Vec<Timer>,
    watch: Option<Watch>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a countdown. Returns `false`, arming nothing, when the due time
    /// is past what `Instant` can represent.
    pub fn add_timer(&mut self, now: Instant, seconds: u64) -> bool {
        let Some(due) = now.checked_add(Duration::from_secs(seconds)) else {
            log::warn!("timer of {seconds}s is out of range");
            return false;
        };
        self.timers.push(Timer { due, seconds });
        log::debug!("timer armed: {seconds}s ({} pending)", self.timers.len());
        true
    }

    /// Drop all pending timers; returns how many were pending.
    pub fn cancel_timers(&mut self) -> usize {
        let n = self.timers.len();
        self.timers.clear();
        n
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Remove and return (as their durations) the timers due at `now`,
    /// earliest first.
    pub fn expire_timers(&mut self, now: Instant) -> Vec<u64> {
        let (mut due, pending): (Vec<Timer>, Vec<Timer>) =
            self.timers.drain(..).partition(|t| t.due <= now);
        self.timers = pending;
        due.sort_by_key(|t| t.due);
        due.into_iter().map(|t| t.seconds).collect()
    }

    /// Start watching `alert`, replacing any previous one. The first poll is
    /// one interval from `now`.
    pub fn watch(&mut self, alert: PriceAlert, now: Instant, interval: Duration) {
        log::info!("price alert armed: {} {:?} {}", alert.symbol, alert.direction, alert.target);
        self.watch = Some(Watch {
            alert,
            interval,
            next_poll: now + interval,
        });
    }

    /// Stop watching; returns the alert that was active.
    pub fn stop_watch(&mut self) -> Option<PriceAlert> {
        self.watch.take().map(|w| w.alert)
    }

    pub fn alert(&self) -> Option<&PriceAlert> {
        self.watch.as_ref().map(|w| &w.alert)
    }

    /// If the alert is due for a poll, schedule the next one and return it.
    pub fn poll_alert(&mut self, now: Instant) -> Option<PriceAlert> {
        let watch = self.watch.as_mut()?;
        if now < watch.next_poll {
            return None;
        }
        watch.next_poll = now + watch.interval;
        Some(watch.alert.clone())
    }
}
