//! Time source for key generation timestamps

use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::Timestamp;

/// Supplies the time written to a slot's generation time object
pub trait Clock: Send + std::fmt::Debug {
    /// Current time
    fn now(&self) -> Timestamp;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        Timestamp(u32::try_from(secs).unwrap_or(u32::MAX))
    }
}

/// A clock stuck at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub Timestamp);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}
