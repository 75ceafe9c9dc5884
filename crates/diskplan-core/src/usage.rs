//! Reproducible monthly consumption used as demo data.
//!
//! Draws are seeded from the `YYYYMM` key of the simulated month, so replaying
//! a month always produces the same figure. This is not a security-relevant
//! generator.

use chrono::NaiveDate;
use diskplan_domain::{year_month_key, ObservationSeries};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::CoreError;

pub const DEFAULT_USAGE_FRACTION_MIN: f64 = 0.30;
pub const DEFAULT_USAGE_FRACTION_MAX: f64 = 0.80;

/// Consumes a random share of the capacity that was still free last month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsageSimulator {
    min_fraction: f64,
    max_fraction: f64,
}

impl Default for UsageSimulator {
    fn default() -> Self {
        Self {
            min_fraction: DEFAULT_USAGE_FRACTION_MIN,
            max_fraction: DEFAULT_USAGE_FRACTION_MAX,
        }
    }
}

impl UsageSimulator {
    pub fn new(min_fraction: f64, max_fraction: f64) -> Result<Self, CoreError> {
        let in_range = |value: f64| (0.0..=1.0).contains(&value);
        if !in_range(min_fraction) || !in_range(max_fraction) || min_fraction > max_fraction {
            return Err(CoreError::Validation(format!(
                "usage fraction range {min_fraction}..{max_fraction} must lie within 0..1 and be ordered"
            )));
        }
        Ok(Self {
            min_fraction,
            max_fraction,
        })
    }

    pub fn fraction_range(&self) -> (f64, f64) {
        (self.min_fraction, self.max_fraction)
    }

    /// Uniform fraction in the configured range for `seed_key`.
    pub fn draw_fraction(&self, seed_key: u64) -> f64 {
        if self.min_fraction >= self.max_fraction {
            return self.min_fraction;
        }
        let mut rng = StdRng::seed_from_u64(seed_key);
        rng.gen_range(self.min_fraction..self.max_fraction)
    }

    /// Usage in TB for the month of `as_of`, given the capacity left free before it.
    pub fn simulate_month_usage(&self, as_of: NaiveDate, available_tb: f64) -> f64 {
        let available = if available_tb.is_finite() {
            available_tb.max(0.0)
        } else {
            0.0
        };
        self.draw_fraction(year_month_key(as_of) as u64) * available
    }
}

/// Capacity left free at the most recent observation before `as_of`.
///
/// Previous active capacity minus cumulative usage up to that observation.
/// Without a previous observation the whole purchased capacity is available.
pub fn available_capacity(
    capacity: &ObservationSeries,
    usage: &ObservationSeries,
    total_purchased_tb: f64,
    as_of: NaiveDate,
) -> f64 {
    match capacity.last_before(as_of) {
        Some(previous) => previous.value - usage.cumulative_through(previous.date),
        None => total_purchased_tb,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn same_month_replays_same_usage() {
        let simulator = UsageSimulator::default();
        let first = simulator.simulate_month_usage(month(2024, 4), 2.0);
        let again = simulator.simulate_month_usage(month(2024, 4), 2.0);
        assert_eq!(first, again);
    }

    #[test]
    fn usage_stays_within_fraction_bounds() {
        let simulator = UsageSimulator::default();
        for m in 1..=12 {
            let usage = simulator.simulate_month_usage(month(2025, m), 4.0);
            assert!((1.2..=3.2).contains(&usage), "usage {usage} out of bounds");
        }
    }

    #[test]
    fn exhausted_capacity_yields_no_usage() {
        let simulator = UsageSimulator::default();
        assert_eq!(simulator.simulate_month_usage(month(2024, 1), -0.5), 0.0);
        assert_eq!(simulator.simulate_month_usage(month(2024, 1), 0.0), 0.0);
    }

    #[test]
    fn degenerate_range_returns_its_bound() {
        let simulator = UsageSimulator::new(0.5, 0.5).unwrap();
        assert_eq!(simulator.simulate_month_usage(month(2024, 1), 2.0), 1.0);
        assert!(UsageSimulator::new(0.9, 0.1).is_err());
        assert!(UsageSimulator::new(-0.1, 0.5).is_err());
    }

    #[test]
    fn available_capacity_uses_previous_month() {
        let mut capacity = ObservationSeries::new();
        let mut usage = ObservationSeries::new();
        assert_eq!(available_capacity(&capacity, &usage, 3.0, month(2024, 1)), 3.0);

        capacity.record(month(2024, 1), 2.0);
        usage.record(month(2024, 1), 0.5);
        capacity.record(month(2024, 2), 2.5);
        usage.record(month(2024, 2), 0.75);

        let available = available_capacity(&capacity, &usage, 3.0, month(2024, 3));
        assert_eq!(available, 2.5 - 1.25);
    }
}
