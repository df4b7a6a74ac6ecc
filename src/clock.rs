//! Time source for every rule that depends on "now".
//!
//! Business rules never read the wall clock directly. They receive a
//! [`Clock`] so the operator (or a test) can move the current instant
//! around freely.

use std::cell::Cell;

use chrono::{Duration, Local, NaiveDateTime};

/// Format used for timestamps on the command line and in summaries.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// An operator-settable instant standing in for the real clock.
#[derive(Debug, Clone)]
pub struct VirtualClock {
    now: Cell<NaiveDateTime>,
}

impl VirtualClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    /// Start at the current wall-clock time.
    pub fn from_system() -> Self {
        Self::new(SystemClock.now())
    }

    pub fn set(&self, now: NaiveDateTime) {
        self.now.set(now);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> NaiveDateTime {
        self.now.get()
    }
}

/// Parse a `YYYY-MM-DD HH:MM` timestamp.
pub fn parse_time(input: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(input.trim(), TIME_FORMAT).ok()
}

pub fn format_time(t: &NaiveDateTime) -> String {
    t.format(TIME_FORMAT).to_string()
}
