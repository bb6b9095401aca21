//! Per-day price samples, before and after alignment.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day of a single parsed series.
///
/// `price` is always finite and strictly positive: the parser drops null,
/// zero, negative and NaN closes instead of carrying them forward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub date: NaiveDate,
    pub price: f64,
}

impl Sample {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }
}

/// One day present in both the primary (equity) and secondary (volatility) series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombinedSample {
    pub date: NaiveDate,
    pub primary: f64,
    pub secondary: f64,
}

impl CombinedSample {
    pub fn new(date: NaiveDate, primary: f64, secondary: f64) -> Self {
        Self {
            date,
            primary,
            secondary,
        }
    }
}
