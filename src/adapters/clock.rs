use crate::ports::clock::ClockPort;
use chrono::{DateTime, Utc};

/// Wall clock in UTC
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl ClockPort for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
