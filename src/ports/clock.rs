use chrono::{DateTime, Utc};

/// Source of the current time for timestamps written by the workflows
#[mockall::automock]
pub trait ClockPort {
    fn now(&self) -> DateTime<Utc>;
}
