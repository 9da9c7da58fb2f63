use std::env;

use h3o::Resolution;
use tracing::debug;

use crate::error::{Result, TripsafeError};
use crate::geometry::Coordinate;
use crate::safety::GridSource;

pub const DEFAULT_BIND: &str = "0.0.0.0:3000";
pub const DEFAULT_RESOLUTION: Resolution = Resolution::Nine;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind: String,
    pub resolution: Resolution,
    /// Points marked as risky on the grid, as `lat,lon` pairs in the env var.
    pub hotspots: Vec<Coordinate>,
}

impl Default for Config {
    fn default() -> Self {
        Self { bind: DEFAULT_BIND.to_string(), resolution: DEFAULT_RESOLUTION, hotspots: Vec::new() }
    }
}

impl Config {
    /// Reads `.env` (if present) and then the process environment.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "loaded .env");
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(bind) = lookup("TRIPSAFE_BIND") {
            config.bind = bind;
        }

        if let Some(raw) = lookup("TRIPSAFE_H3_RESOLUTION") {
            let value: u8 = raw
                .trim()
                .parse()
                .map_err(|_| TripsafeError::Config(format!("TRIPSAFE_H3_RESOLUTION: not a number: {raw}")))?;
            config.resolution = Resolution::try_from(value)
                .map_err(|err| TripsafeError::Config(format!("TRIPSAFE_H3_RESOLUTION: {err}")))?;
        }

        if let Some(raw) = lookup("TRIPSAFE_HOTSPOTS") {
            config.hotspots = parse_hotspots(&raw)?;
        }

        Ok(config)
    }

    pub fn build_grid(&self) -> Result<GridSource> {
        let mut grid = GridSource::new(self.resolution);
        for &hotspot in &self.hotspots {
            grid.mark_hotspot(hotspot)?;
        }
        Ok(grid)
    }
}

/// `lat,lon;lat,lon`, blank entries ignored.
fn parse_hotspots(raw: &str) -> Result<Vec<Coordinate>> {
    raw.split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .enumerate()
        .map(|(index, entry)| {
            let invalid = || TripsafeError::Config(format!("TRIPSAFE_HOTSPOTS: bad entry {entry:?}"));
            let (lat, lon) = entry.split_once(',').ok_or_else(invalid)?;
            let lat: f64 = lat.trim().parse().map_err(|_| invalid())?;
            let lon: f64 = lon.trim().parse().map_err(|_| invalid())?;
            Coordinate::try_new(lon, lat).map_err(|_| TripsafeError::InvalidCoordinate { index, lon, lat })
        })
        .collect()
}
