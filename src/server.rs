use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router, extract::State};
use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::error::TripsafeError;
use crate::geometry::{Coordinate, Route};
use crate::metrics::{RouteReport, compute_route_report};
use crate::safety::{FixedSource, GridSource, PatternSource, SafetyLevel};

// Shared State for concurrency
pub struct AppState {
    pub grid: GridSource,
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new().allow_methods(Any).allow_origin(Any).allow_headers(Any);

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/route/metrics", post(route_metrics))
        .layer(cors)
        .with_state(state)
}

// --- API DTOs ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyMode {
    #[default]
    Pattern,
    Fixed,
    Grid,
}

/// Exactly one of raw `[lon, lat]` coordinates or the directions provider's
/// GeoJSON response under `route`.
#[derive(Debug, Deserialize)]
pub struct MetricsRequest {
    pub coordinates: Option<Route>,
    pub route: Option<DirectionsResponse>,
    #[serde(default)]
    pub safety: SafetyMode,
    pub seed: Option<u64>,
    pub level: Option<SafetyLevel>,
}

#[derive(Debug, Deserialize)]
pub struct DirectionsResponse {
    pub features: Vec<DirectionsFeature>,
}

#[derive(Debug, Deserialize)]
pub struct DirectionsFeature {
    pub geometry: DirectionsGeometry,
}

#[derive(Debug, Deserialize)]
pub struct DirectionsGeometry {
    pub coordinates: Vec<Coordinate>,
}

#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    #[serde(flatten)]
    pub report: RouteReport,
    pub display: SafetyDisplay,
    pub geometry: GeoJsonLineString,
}

#[derive(Debug, Serialize)]
pub struct SafetyDisplay {
    pub level: SafetyLevel,
    pub color: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

impl From<SafetyLevel> for SafetyDisplay {
    fn from(level: SafetyLevel) -> Self {
        Self { level, color: level.color(), label: level.label(), description: level.description() }
    }
}

#[derive(Debug, Serialize)]
pub struct GeoJsonLineString {
    r#type: String,
    coordinates: Vec<[f64; 2]>, // [lon, lat] standard for GeoJSON
}

impl From<&Route> for GeoJsonLineString {
    fn from(route: &Route) -> Self {
        Self {
            r#type: "LineString".to_string(),
            coordinates: route.points().iter().copied().map(<[f64; 2]>::from).collect(),
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    MissingGeometry,
    AmbiguousGeometry,
    Invalid(TripsafeError),
}

impl From<TripsafeError> for ApiError {
    fn from(err: TripsafeError) -> Self {
        Self::Invalid(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match self {
            Self::MissingGeometry => "request needs either `coordinates` or `route`".to_string(),
            Self::AmbiguousGeometry => "request must not carry both `coordinates` and `route`".to_string(),
            Self::Invalid(err) => err.to_string(),
        };
        (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
    }
}

// --- Handler ---

pub async fn route_metrics(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<MetricsRequest>,
) -> Result<Json<MetricsResponse>, ApiError> {
    build_response(&state, payload).map(Json)
}

fn build_response(state: &AppState, payload: MetricsRequest) -> Result<MetricsResponse, ApiError> {
    let route = match (payload.coordinates, payload.route) {
        (Some(_), Some(_)) => return Err(ApiError::AmbiguousGeometry),
        (Some(route), None) => route,
        // The map view draws the first feature only.
        (None, Some(directions)) => directions
            .features
            .into_iter()
            .next()
            .map(|feature| Route::new(feature.geometry.coordinates))
            .unwrap_or_default(),
        (None, None) => return Err(ApiError::MissingGeometry),
    };

    if let Err(err) = route.validate() {
        warn!(%err, "rejecting route");
        return Err(err.into());
    }

    let as_of = Utc::now().date_naive();
    let report = match payload.safety {
        SafetyMode::Pattern => {
            let rng = match payload.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            compute_route_report(&route, &mut PatternSource::new(rng), as_of)
        }
        SafetyMode::Fixed => {
            let level = payload.level.unwrap_or(SafetyLevel::Safe);
            compute_route_report(&route, &mut FixedSource::new(level), as_of)
        }
        SafetyMode::Grid => compute_route_report(&route, &mut &state.grid, as_of),
    };

    info!(
        points = route.len(),
        mode = ?payload.safety,
        safety = ?report.metrics.safety,
        "served route metrics"
    );

    Ok(MetricsResponse {
        display: report.metrics.safety.into(),
        geometry: GeoJsonLineString::from(&route),
        report,
    })
}
