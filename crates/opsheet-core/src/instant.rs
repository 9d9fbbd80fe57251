//! Day/time-of-day instants.
//!
//! Instants are (day offset, minutes-from-midnight) pairs so that multi-day
//! durations and midnight rollover stay exact. Lunch-window comparisons only
//! look at the time-of-day component; day arithmetic is pure integer carry.
//! The day offset is relative to the posting date, which makes conversion to
//! spreadsheet serial numbers a plain addition.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Minutes in a day
pub(crate) const DAY_MINUTES: f64 = 1440.0;

/// A moment on the timeline: day offset from the posting date plus
/// minutes from midnight in `[0, 1440)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Instant {
    pub day: i64,
    pub minute: f64,
}

impl Instant {
    /// Build an instant, carrying overflowing minutes into the day component
    pub fn new(day: i64, minute: f64) -> Self {
        Self { day, minute }.normalized()
    }

    /// Time of day on day zero
    pub fn from_hm(hour: u32, minute: u32) -> Self {
        Self::new(0, f64::from(hour) * 60.0 + f64::from(minute))
    }

    /// Add a (possibly negative or multi-day) number of minutes
    pub fn add_minutes(self, minutes: f64) -> Self {
        Self::new(self.day, self.minute + minutes)
    }

    /// Replace the time of day, keeping the calendar day component
    pub fn with_minute(self, minute: f64) -> Self {
        Self {
            day: self.day,
            minute,
        }
    }

    /// Time of day as a fraction of a day, the unit spreadsheet time cells use
    pub fn time_frac(self) -> f64 {
        self.minute / DAY_MINUTES
    }

    /// Minutes since day zero's midnight
    pub fn total_minutes(self) -> f64 {
        self.day as f64 * DAY_MINUTES + self.minute
    }

    /// Calendar date of this instant given the posting date
    pub fn date(self, posting: NaiveDate) -> NaiveDate {
        posting + chrono::Duration::days(self.day)
    }

    /// Spreadsheet serial number (1899-12-30 epoch) of this instant
    pub fn serial(self, posting: NaiveDate) -> f64 {
        date_serial(self.date(posting)) + self.time_frac()
    }

    fn normalized(mut self) -> Self {
        let carry = (self.minute / DAY_MINUTES).floor();
        if carry != 0.0 {
            self.day += carry as i64;
            self.minute -= carry * DAY_MINUTES;
        }
        // Guard against -0.0000... landing exactly on 1440 after the carry
        if self.minute >= DAY_MINUTES {
            self.day += 1;
            self.minute -= DAY_MINUTES;
        }
        self
    }
}

/// Spreadsheet serial number of a calendar date (1899-12-30 epoch)
pub fn date_serial(date: NaiveDate) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).expect("valid epoch");
    (date - epoch).num_days() as f64
}
