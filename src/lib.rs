//! Route distance, travel-time and safety metrics over a directions
//! provider's route geometry, plus a small HTTP adapter serving them.

pub mod config;
pub mod error;
pub mod geometry;
pub mod metrics;
pub mod safety;
pub mod server;
pub mod timing;

pub use error::{Result, TripsafeError};
pub use geometry::{Coordinate, Route, distance, route_distance};
pub use metrics::{RouteMetrics, RouteReport, compute_route_metrics, compute_route_report};
pub use safety::{
    Assessment, FixedSource, GridSource, PatternSource, PointSafety, SafetyLevel, SafetySource,
    aggregate_safety, assess_route, classify_point,
};
pub use timing::{TravelMode, TravelTimes, estimate_times, format_duration};
