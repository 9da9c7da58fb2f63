use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::geometry::{Route, route_distance};
use crate::safety::{PointSafety, SafetyLevel, SafetySource, aggregate_safety, assess_route};
use crate::timing::{TravelTimes, estimate_times};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteMetrics {
    pub distance_meters: f64,
    pub times: TravelTimes,
    pub safety: SafetyLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteReport {
    pub metrics: RouteMetrics,
    pub points: Vec<PointSafety>,
}

/// Distance, per-mode times and overall safety for `route`.
///
/// Routes with fewer than two points have nothing to traverse: zero distance,
/// `"0m"` everywhere and [`SafetyLevel::Unknown`], without consulting `source`.
#[tracing::instrument(level = "debug", skip_all, fields(points = route.len()))]
pub fn compute_route_metrics<S: SafetySource + ?Sized>(route: &Route, source: &mut S) -> RouteMetrics {
    let safety = if route.len() < 2 {
        SafetyLevel::Unknown
    } else {
        aggregate_safety(route.points().iter().enumerate().map(|(index, &coordinate)| {
            source
                .assess(index, coordinate)
                .map_or(SafetyLevel::Unknown, |assessment| assessment.level)
        }))
    };
    summarize(route, safety)
}

/// [`compute_route_metrics`] plus the per-point breakdown, stamped `as_of`.
#[tracing::instrument(level = "debug", skip_all, fields(points = route.len()))]
pub fn compute_route_report<S: SafetySource + ?Sized>(
    route: &Route,
    source: &mut S,
    as_of: NaiveDate,
) -> RouteReport {
    let points = if route.len() < 2 { Vec::new() } else { assess_route(route, source, as_of) };
    let safety = if points.is_empty() {
        SafetyLevel::Unknown
    } else {
        aggregate_safety(points.iter().map(|p| p.level))
    };

    RouteReport { metrics: summarize(route, safety), points }
}

fn summarize(route: &Route, safety: SafetyLevel) -> RouteMetrics {
    let distance_meters = route_distance(route);
    let times = estimate_times(distance_meters);
    info!(distance_meters, car = %times.car, ?safety, "route metrics computed");

    RouteMetrics { distance_meters, times, safety }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Coordinate, distance};
    use crate::safety::{FixedSource, GridSource, PatternSource};
    use h3o::Resolution;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    fn patiala_loop() -> Route {
        Route::new(vec![
            Coordinate::new(76.3869, 30.3398),
            Coordinate::new(76.3921, 30.3402),
            Coordinate::new(76.3950, 30.3450),
            Coordinate::new(76.3880, 30.3470),
        ])
    }

    #[test]
    fn empty_and_single_point_routes_degenerate() {
        for route in [Route::default(), Route::new(vec![Coordinate::new(76.3, 30.3)])] {
            let metrics = compute_route_metrics(&route, &mut FixedSource::new(SafetyLevel::Risky));
            assert_eq!(metrics.distance_meters, 0.0);
            assert_eq!(metrics.times, estimate_times(0.0));
            assert_eq!(metrics.times.car, "0m");
            assert_eq!(metrics.safety, SafetyLevel::Unknown);

            let report = compute_route_report(&route, &mut PatternSource::seeded(1), today());
            assert!(report.points.is_empty());
        }
    }

    #[test]
    fn identical_inputs_give_identical_metrics() {
        let route = patiala_loop();
        let a = compute_route_metrics(&route, &mut FixedSource::default());
        let b = compute_route_metrics(&route, &mut FixedSource::default());
        assert_eq!(a.distance_meters.to_bits(), b.distance_meters.to_bits());
        assert_eq!(a.times, b.times);
        assert_eq!(a, b);
    }

    #[test]
    fn fifty_kilometers_due_north() {
        assert_eq!(estimate_times(50_000.0).car, "1h 0m");

        // 50.55 km of arc along a meridian keeps every mode clear of a
        // minute boundary, so float error in the distance cannot flip it.
        let degrees = (50_550.0 / crate::geometry::EARTH_RADIUS_METERS).to_degrees();
        let route = Route::new(vec![Coordinate::new(0.0, 0.0), Coordinate::new(0.0, degrees)]);
        let metrics = compute_route_metrics(&route, &mut FixedSource::default());
        assert!((metrics.distance_meters - 50_550.0).abs() < 1e-6);
        assert_eq!(metrics.times.car, "1h 0m");
        assert_eq!(metrics.times.transit, "1h 41m");
        assert_eq!(metrics.times.bike, "2h 31m");
        assert_eq!(metrics.times.walking, "10h 6m");
    }

    #[test]
    fn metrics_compose_the_parts() {
        let route = patiala_loop();
        let metrics = compute_route_metrics(&route, &mut FixedSource::new(SafetyLevel::Moderate));
        let pts = route.points();
        let expected = distance(pts[0], pts[1]) + distance(pts[1], pts[2]) + distance(pts[2], pts[3]);
        assert_eq!(metrics.distance_meters, expected);
        assert_eq!(metrics.times, estimate_times(expected));
        assert_eq!(metrics.safety, SafetyLevel::Moderate);
    }

    #[test]
    fn report_matches_metrics() {
        let route = patiala_loop();
        let report = compute_route_report(&route, &mut PatternSource::seeded(11), today());
        let metrics = compute_route_metrics(&route, &mut PatternSource::seeded(11));
        assert_eq!(report.metrics, metrics);
        assert_eq!(report.points.len(), route.len());
        // Index 0 always falls in the dangerous bucket.
        assert_eq!(report.points[0].level, SafetyLevel::Dangerous);
    }

    #[test]
    fn grid_without_data_reports_unknown() {
        let grid = GridSource::new(Resolution::Nine);
        let metrics = compute_route_metrics(&patiala_loop(), &mut &grid);
        assert_eq!(metrics.safety, SafetyLevel::Unknown);
        assert!(metrics.distance_meters > 0.0);
    }

    #[test]
    fn grid_hotspot_raises_route_risk() {
        let route = patiala_loop();
        let mut grid = GridSource::new(Resolution::Nine).with_baseline(0.1);
        let clean = compute_route_metrics(&route, &mut &grid);
        assert_eq!(clean.safety, SafetyLevel::VerySafe);

        for &point in route.points() {
            grid.mark_hotspot(point).unwrap();
        }
        let dangerous = compute_route_metrics(&route, &mut &grid);
        assert_eq!(dangerous.safety, SafetyLevel::Dangerous);
    }
}
