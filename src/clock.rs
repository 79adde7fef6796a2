//! Date source for the `#filedate` pragma
//!
//! Aggregation stamps its output with the current date. Tests and
//! reproducible pipelines inject a [`FixedClock`] instead of reading the
//! system time.

use chrono::{Local, NaiveDate};

/// Supplies "today"
pub trait Clock {
    /// Current calendar date
    fn today(&self) -> NaiveDate;
}

/// Local system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Always returns the same date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
