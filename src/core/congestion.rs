//! Congestion Estimator
//!
//! Static rule table keyed by weekday and hour. Rules are evaluated in order
//! and the first match wins:
//!
//! 1. Saturday/Sunday at a weekend-busy location -> padat, 0.3
//! 2. Critical location, 07-09 or 16-19          -> padat, 0.4
//! 3. Critical location, 12-14                   -> sedang, 0.7
//! 4. Otherwise                                  -> lancar, 1.0
//!
//! Hours are inclusive on both ends (hour 9 is still rush hour, 10 is not).

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};

use crate::models::config::LocationRegistry;
use crate::models::types::{CongestionEstimate, CongestionLevel, Location};
use crate::utils::constants::{
    CLEAR_FACTOR, EVENING_RUSH_HOURS, LUNCH_HOURS, LUNCH_HOUR_FACTOR, MORNING_RUSH_HOURS,
    RUSH_HOUR_FACTOR, WEEKEND_FACTOR,
};

pub const REASON_WEEKEND: &str = "weekend congestion";
pub const REASON_RUSH_HOUR: &str = "rush hour";
pub const REASON_LUNCH_HOUR: &str = "lunch hour";
pub const REASON_CLEAR: &str = "clear";

fn within(hour: u32, (from, to): (u32, u32)) -> bool {
    (from..=to).contains(&hour)
}

fn is_weekend(now: &NaiveDateTime) -> bool {
    matches!(now.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Estimate congestion at `location` for local time `now`
pub fn estimate(location: &Location, now: NaiveDateTime) -> CongestionEstimate {
    if is_weekend(&now) && location.weekend_congestion {
        return CongestionEstimate {
            level: CongestionLevel::Padat,
            factor: WEEKEND_FACTOR,
            reason: REASON_WEEKEND,
        };
    }

    let hour = now.hour();
    if location.critical {
        if within(hour, MORNING_RUSH_HOURS) || within(hour, EVENING_RUSH_HOURS) {
            return CongestionEstimate {
                level: CongestionLevel::Padat,
                factor: RUSH_HOUR_FACTOR,
                reason: REASON_RUSH_HOUR,
            };
        }
        if within(hour, LUNCH_HOURS) {
            return CongestionEstimate {
                level: CongestionLevel::Sedang,
                factor: LUNCH_HOUR_FACTOR,
                reason: REASON_LUNCH_HOUR,
            };
        }
    }

    CongestionEstimate {
        level: CongestionLevel::Lancar,
        factor: CLEAR_FACTOR,
        reason: REASON_CLEAR,
    }
}

/// Estimate for every location, in registry order
pub fn snapshot<'a>(
    registry: &'a LocationRegistry,
    now: NaiveDateTime,
) -> Vec<(&'a Location, CongestionEstimate)> {
    registry.iter().map(|loc| (loc, estimate(loc, now))).collect()
}

/// Combined factor for a trip: the worse (smaller) of the two endpoints
pub fn combined_factor(start: &CongestionEstimate, end: &CongestionEstimate) -> f64 {
    start.factor.min(end.factor)
}
