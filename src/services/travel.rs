//! Travel time estimation between two stops
//!
//! The slot engine only needs a two-point-to-minutes function. The Haversine
//! model below is the default; a routing backend can replace it by implementing
//! [`TravelEstimator`], and tests can pass a plain closure.

use crate::services::geo::haversine_distance_km;
use crate::types::GeoLocation;

/// Average city driving speed in km/h
pub const DEFAULT_AVERAGE_SPEED_KMH: f64 = 30.0;

/// Fixed parking/traffic allowance added to every leg
pub const DEFAULT_BUFFER_MINUTES: f64 = 5.0;

/// Estimates whole travel minutes between two locations
pub trait TravelEstimator: Send + Sync {
    fn estimate_minutes(&self, from: &GeoLocation, to: &GeoLocation) -> i64;

    /// Name for logging
    fn name(&self) -> &str {
        "custom"
    }
}

impl<F> TravelEstimator for F
where
    F: Fn(&GeoLocation, &GeoLocation) -> i64 + Send + Sync,
{
    fn estimate_minutes(&self, from: &GeoLocation, to: &GeoLocation) -> i64 {
        self(from, to)
    }
}

/// Great-circle distance at a constant speed plus a fixed buffer, rounded up
#[derive(Debug, Clone, Copy)]
pub struct HaversineEstimator {
    average_speed_kmh: f64,
    buffer_minutes: f64,
}

impl Default for HaversineEstimator {
    fn default() -> Self {
        Self {
            average_speed_kmh: DEFAULT_AVERAGE_SPEED_KMH,
            buffer_minutes: DEFAULT_BUFFER_MINUTES,
        }
    }
}

impl HaversineEstimator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TravelEstimator for HaversineEstimator {
    fn estimate_minutes(&self, from: &GeoLocation, to: &GeoLocation) -> i64 {
        let distance_km = haversine_distance_km(from, to);
        let driving = distance_km / self.average_speed_kmh * 60.0;
        // Ceiling keeps feasibility checks conservative
        (driving + self.buffer_minutes).ceil() as i64
    }

    fn name(&self) -> &str {
        "haversine"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(lat: f64, lng: f64) -> GeoLocation {
        GeoLocation::new(lat, lng, "")
    }

    #[test]
    fn test_same_point_costs_only_buffer() {
        let estimator = HaversineEstimator::new();
        let p = point(50.0647, 19.9450);
        assert_eq!(estimator.estimate_minutes(&p, &p), 5);
    }

    #[test]
    fn test_tenth_degree_on_equator() {
        // ~11.12 km at 30 km/h = 22.24 min, + 5 = 27.24, ceiling = 28
        let estimator = HaversineEstimator::new();
        let minutes = estimator.estimate_minutes(&point(0.0, 0.0), &point(0.0, 0.1));
        assert_eq!(minutes, 28);
    }

    #[test]
    fn test_rounds_up_never_down() {
        // ~0.51 km at 30 km/h is just over 1 minute
        let estimator = HaversineEstimator {
            average_speed_kmh: 30.0,
            buffer_minutes: 0.0,
        };
        let from = point(0.0, 0.0);
        let to = point(0.0, 0.0046);
        let exact = haversine_distance_km(&from, &to) / 30.0 * 60.0;
        assert_eq!(estimator.estimate_minutes(&from, &to), exact.ceil() as i64);
        assert!(estimator.estimate_minutes(&from, &to) as f64 >= exact);
    }

    #[test]
    fn test_faster_speed_shortens_estimate() {
        let estimator = HaversineEstimator {
            average_speed_kmh: 60.0,
            buffer_minutes: 0.0,
        };
        // ~11.12 km at 60 km/h = 11.12 min, ceiling = 12
        assert_eq!(estimator.estimate_minutes(&point(0.0, 0.0), &point(0.0, 0.1)), 12);
    }

    #[test]
    fn test_closure_is_an_estimator() {
        let fixed = |_: &GeoLocation, _: &GeoLocation| 15_i64;
        assert_eq!(fixed.estimate_minutes(&point(0.0, 0.0), &point(1.0, 1.0)), 15);
        assert_eq!(fixed.name(), "custom");
        assert_eq!(HaversineEstimator::new().name(), "haversine");
    }
}
