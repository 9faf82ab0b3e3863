//! Unit conversions used by the cost model.

/// Metres in one nautical mile.
pub const METERS_PER_NAUTICAL_MILE: f64 = 1852.0;

/// Metres per second in one knot.
pub const METERS_PER_SECOND_PER_KNOT: f64 = METERS_PER_NAUTICAL_MILE / SECONDS_PER_HOUR;

pub const SECONDS_PER_HOUR: f64 = 3600.0;

pub fn nautical_miles_to_meters(nm: f64) -> f64 {
    nm * METERS_PER_NAUTICAL_MILE
}

pub fn meters_to_nautical_miles(meters: f64) -> f64 {
    meters / METERS_PER_NAUTICAL_MILE
}

pub fn knots_to_meters_per_second(knots: f64) -> f64 {
    knots * METERS_PER_SECOND_PER_KNOT
}

pub fn seconds_to_hours(seconds: f64) -> f64 {
    seconds / SECONDS_PER_HOUR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_knot_covers_one_nautical_mile_per_hour() {
        let meters = nautical_miles_to_meters(1.0);
        let seconds = meters / knots_to_meters_per_second(1.0);
        assert!((seconds_to_hours(seconds) - 1.0).abs() < 1e-12);
        assert!((meters_to_nautical_miles(meters) - 1.0).abs() < 1e-12);
    }
}
