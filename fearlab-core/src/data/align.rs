//! Two-series date alignment.
//!
//! Given the equity and volatility samples, keep only the days both series
//! priced. Missing counterparts drop the day; nothing is interpolated or
//! forward-filled.

use crate::domain::{CombinedSample, Sample};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Inner-join `primary` and `secondary` on exact date equality.
///
/// Output follows the primary series' order, which is ascending for
/// upstream data. A date repeated on either side contributes once, from its
/// first occurrence, so the output never outgrows the shorter input.
pub fn combine(primary: &[Sample], secondary: &[Sample]) -> Vec<CombinedSample> {
    let mut by_date: HashMap<NaiveDate, f64> = HashMap::with_capacity(secondary.len());
    for sample in secondary {
        by_date.entry(sample.date).or_insert(sample.price);
    }

    primary
        .iter()
        .filter_map(|p| {
            // Taking the entry out makes a repeated primary date miss.
            by_date
                .remove(&p.date)
                .map(|secondary| CombinedSample::new(p.date, p.price, secondary))
        })
        .collect()
}
