//! Domain types for FearLab

pub mod result;
pub mod sample;
pub mod signal;
pub mod window;

pub use result::ResultSet;
pub use sample::{CombinedSample, Sample};
pub use signal::{SignalEvent, Status};
pub use window::{FetchWindow, QueryRange, WindowPreset};

use chrono::{Datelike, Days, Months, NaiveDate};

/// Round to 2 decimal places, the precision every price and return is reported at.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `date` moved forward by `months` calendar months, rolling over instead of
/// clamping when the target month is shorter.
///
/// The day-of-month is carried as an offset from the 1st, so Aug 31 + 6
/// months is Mar 3 (Mar 2 when February has 29 days) and Feb 29 + 12 months is
/// Mar 1. `None` past the end of the calendar.
pub fn add_months_rollover(date: NaiveDate, months: Months) -> Option<NaiveDate> {
    date.with_day(1)?
        .checked_add_months(months)?
        .checked_add_days(Days::new(u64::from(date.day0())))
}

/// Backward counterpart of [`add_months_rollover`]: Feb 29 - 12 months is Mar 1.
pub fn sub_months_rollover(date: NaiveDate, months: Months) -> Option<NaiveDate> {
    date.with_day(1)?
        .checked_sub_months(months)?
        .checked_add_days(Days::new(u64::from(date.day0())))
}
