//! Clock abstraction so commit messages and event timestamps are reproducible in tests

use chrono::{DateTime, Local};

use super::config::COMMIT_TIMESTAMP_FORMAT;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Clock frozen at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Local>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}

/// Builds an auto-generated commit message such as `Auto-commit: 2024-03-01 09:15:00`
pub fn commit_message(prefix: &str, clock: &dyn Clock) -> String {
    format!("{} {}", prefix, clock.now().format(COMMIT_TIMESTAMP_FORMAT))
}
