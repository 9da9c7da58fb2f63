//! Great-circle geometry over route coordinates.
//!
//! Coordinates are `(lon, lat)` in degrees, the GeoJSON order the
//! directions provider returns them in.

use geo::{Coord, LineString, Point};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TripsafeError};

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "[f64; 2]")]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    /// Builds a coordinate without any range check. Upstream geometry is
    /// trusted; use [`Coordinate::try_new`] for user input.
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn try_new(lon: f64, lat: f64) -> Result<Self> {
        let coordinate = Self::new(lon, lat);
        if coordinate.is_valid() {
            Ok(coordinate)
        } else {
            Err(TripsafeError::OutOfRange { lon, lat })
        }
    }

    pub fn is_valid(&self) -> bool {
        self.lon.is_finite()
            && self.lat.is_finite()
            && (-180.0..=180.0).contains(&self.lon)
            && (-90.0..=90.0).contains(&self.lat)
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([lon, lat]: [f64; 2]) -> Self {
        Self::new(lon, lat)
    }
}

/// GeoJSON position; anything after latitude (elevation) is dropped.
impl TryFrom<Vec<f64>> for Coordinate {
    type Error = TripsafeError;

    fn try_from(position: Vec<f64>) -> Result<Self> {
        match position.as_slice() {
            [lon, lat, ..] => Ok(Self::new(*lon, *lat)),
            _ => Err(TripsafeError::ShortPosition(position.len())),
        }
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(c: Coordinate) -> Self {
        [c.lon, c.lat]
    }
}

impl From<Coordinate> for Point {
    fn from(c: Coordinate) -> Self {
        Point::new(c.lon, c.lat)
    }
}

impl From<Coord> for Coordinate {
    fn from(c: Coord) -> Self {
        Self::new(c.x, c.y)
    }
}

impl From<Coordinate> for Coord {
    fn from(c: Coordinate) -> Self {
        Coord { x: c.lon, y: c.lat }
    }
}

/// Haversine distance in meters.
///
/// Out-of-range input is not rejected; it yields a defined but meaningless
/// number (or NaN for non-finite input).
pub fn distance(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let d_phi = (b.lat - a.lat).to_radians();
    let d_lambda = (b.lon - a.lon).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Ordered coordinates in travel order. May be empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Route(Vec<Coordinate>);

impl Route {
    pub fn new(points: Vec<Coordinate>) -> Self {
        Self(points)
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of segment lengths in meters; 0 for fewer than two points.
    pub fn distance(&self) -> f64 {
        route_distance(self)
    }

    /// Fails on the first coordinate that is non-finite or out of range.
    pub fn validate(&self) -> Result<()> {
        match self.0.iter().position(|c| !c.is_valid()) {
            Some(index) => {
                let c = self.0[index];
                Err(TripsafeError::InvalidCoordinate { index, lon: c.lon, lat: c.lat })
            }
            None => Ok(()),
        }
    }
}

impl From<Vec<Coordinate>> for Route {
    fn from(points: Vec<Coordinate>) -> Self {
        Self(points)
    }
}

impl FromIterator<Coordinate> for Route {
    fn from_iter<I: IntoIterator<Item = Coordinate>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<&LineString> for Route {
    fn from(line: &LineString) -> Self {
        line.coords().copied().map(Coordinate::from).collect()
    }
}

impl From<&Route> for LineString {
    fn from(route: &Route) -> Self {
        LineString::new(route.0.iter().copied().map(Coord::from).collect())
    }
}

pub fn route_distance(route: &Route) -> f64 {
    route
        .points()
        .iter()
        .tuple_windows()
        .map(|(&a, &b)| distance(a, b))
        .sum()
}
