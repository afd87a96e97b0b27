//! Edge-table constraint filtering.

use crate::records::EdgeRecord;

/// User-supplied route constraints. All bounds are inclusive.
///
/// The two halves treat missing data differently on purpose: a missing fare
/// counts as infinitely expensive (the price range is a hard constraint the
/// user opted into), while a missing delay rate counts as 0.0 so that sparse
/// delay data never silently drops a route.
#[derive(Debug, Clone, Copy)]
pub struct Constraints {
    pub price_range: (f64, f64),
    pub max_delay: f64,
}

impl Constraints {
    /// Rows passing both the price and the delay constraint.
    pub fn apply(&self, records: &[EdgeRecord]) -> Vec<EdgeRecord> {
        records
            .iter()
            .filter(|r| self.fare_in_range(r) && delay_at_most(r, self.max_delay))
            .cloned()
            .collect()
    }

    /// Rows passing only the price constraint, delay ignored.
    pub fn price_only(&self, records: &[EdgeRecord]) -> Vec<EdgeRecord> {
        records
            .iter()
            .filter(|r| self.fare_in_range(r))
            .cloned()
            .collect()
    }

    fn fare_in_range(&self, r: &EdgeRecord) -> bool {
        let fare = r.fare.unwrap_or(f64::INFINITY);
        let (lo, hi) = self.price_range;
        fare >= lo && fare <= hi
    }
}

fn delay_at_most(r: &EdgeRecord, max_delay: f64) -> bool {
    r.delay.unwrap_or(0.0) <= max_delay
}

/// Rows whose delay rate is at most `max_delay`, price ignored.
pub fn delay_within(records: &[EdgeRecord], max_delay: f64) -> Vec<EdgeRecord> {
    records
        .iter()
        .filter(|r| delay_at_most(r, max_delay))
        .cloned()
        .collect()
}
