//! Storage-zone occupancy arithmetic.
//!
//! A zone's load is its capacity plus the volume of every product placed in
//! it. Shelves and warehouses aggregate their zones by summing both figures;
//! the percentage of an aggregate is derived from the sums, never averaged.

use serde::Serialize;

use crate::error::CoreError;

/// Capacity and used volume of one zone or of an aggregate of zones.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ZoneLoad {
    pub capacity_m3: f64,
    pub used_m3: f64,
}

/// A [`ZoneLoad`] together with its derived figures, as returned by the
/// occupancy reports.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Occupancy {
    pub capacity_m3: f64,
    pub used_m3: f64,
    pub free_m3: f64,
    pub percent: f64,
}

impl ZoneLoad {
    pub fn new(capacity_m3: f64, used_m3: f64) -> Self {
        Self {
            capacity_m3,
            used_m3,
        }
    }

    /// Volume still available; never negative.
    pub fn free_volume(&self) -> f64 {
        (self.capacity_m3 - self.used_m3).max(0.0)
    }

    pub fn percent(&self) -> f64 {
        occupancy_percent(self.used_m3, self.capacity_m3)
    }

    pub fn summary(&self) -> Occupancy {
        Occupancy {
            capacity_m3: self.capacity_m3,
            used_m3: self.used_m3,
            free_m3: self.free_volume(),
            percent: self.percent(),
        }
    }
}

/// Used volume as a percentage of capacity, rounded to two decimals.
///
/// Returns `0.0` for a zero or negative capacity. The result can exceed 100
/// when a zone is over-filled.
pub fn occupancy_percent(used_m3: f64, capacity_m3: f64) -> f64 {
    if capacity_m3 <= 0.0 || used_m3 <= 0.0 {
        return 0.0;
    }
    (used_m3 / capacity_m3 * 10_000.0).round() / 100.0
}

/// Volume occupied by `quantity` units of a product of `unit_volume_m3`.
pub fn line_volume(quantity: i32, unit_volume_m3: f64) -> f64 {
    f64::from(quantity.max(0)) * unit_volume_m3.max(0.0)
}

/// Sum a collection of loads into one.
pub fn aggregate<I>(loads: I) -> ZoneLoad
where
    I: IntoIterator<Item = ZoneLoad>,
{
    loads.into_iter().fold(ZoneLoad::default(), |acc, l| ZoneLoad {
        capacity_m3: acc.capacity_m3 + l.capacity_m3,
        used_m3: acc.used_m3 + l.used_m3,
    })
}

/// Refuse a placement that would push the zone past its capacity.
pub fn check_fits(load: &ZoneLoad, extra_m3: f64) -> Result<(), CoreError> {
    const EPSILON: f64 = 1e-9;
    if load.used_m3 + extra_m3 > load.capacity_m3 + EPSILON {
        return Err(CoreError::Validation(format!(
            "Zone capacity exceeded: {:.3} m3 free, {:.3} m3 requested",
            load.free_volume(),
            extra_m3
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_full_zone() {
        let load = ZoneLoad::new(10.0, 5.0);
        assert_eq!(load.percent(), 50.0);
        assert_eq!(load.free_volume(), 5.0);
    }

    #[test]
    fn zero_capacity_reports_zero() {
        assert_eq!(occupancy_percent(3.0, 0.0), 0.0);
        assert_eq!(ZoneLoad::new(0.0, 0.0).summary().percent, 0.0);
    }

    #[test]
    fn percent_is_rounded_to_two_decimals() {
        assert_eq!(occupancy_percent(1.0, 3.0), 33.33);
        assert_eq!(occupancy_percent(2.0, 3.0), 66.67);
    }

    #[test]
    fn overfilled_zone_exceeds_hundred_but_has_no_free_space() {
        let load = ZoneLoad::new(4.0, 5.0);
        assert_eq!(load.percent(), 125.0);
        assert_eq!(load.free_volume(), 0.0);
    }

    #[test]
    fn percent_is_monotonic_in_used_volume() {
        let capacity = 7.5;
        let mut previous = 0.0;
        for step in 0..=100 {
            let used = f64::from(step) * 0.1;
            let p = occupancy_percent(used, capacity);
            assert!(p >= previous, "{p} < {previous} at used={used}");
            previous = p;
        }
    }

    #[test]
    fn aggregate_uses_sums_not_average() {
        // 1/2 = 50% and 9/10 = 90%; the aggregate is 10/12, not 70%.
        let total = aggregate([ZoneLoad::new(2.0, 1.0), ZoneLoad::new(10.0, 9.0)]);
        assert_eq!(total.capacity_m3, 12.0);
        assert_eq!(total.used_m3, 10.0);
        assert_eq!(total.percent(), 83.33);
    }

    #[test]
    fn empty_aggregate_is_zero() {
        let total = aggregate(Vec::new());
        assert_eq!(total, ZoneLoad::default());
        assert_eq!(total.percent(), 0.0);
    }

    #[test]
    fn line_volume_ignores_negative_input() {
        assert_eq!(line_volume(4, 0.25), 1.0);
        assert_eq!(line_volume(-4, 0.25), 0.0);
        assert_eq!(line_volume(4, -1.0), 0.0);
    }

    #[test]
    fn placement_up_to_capacity_fits() {
        let load = ZoneLoad::new(10.0, 7.5);
        assert!(check_fits(&load, 2.5).is_ok());
        assert!(check_fits(&load, 2.6).is_err());
    }
}
