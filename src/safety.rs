use std::collections::HashMap;
use std::ops::RangeInclusive;

use chrono::NaiveDate;
use h3o::{CellIndex, LatLng, Resolution};
use rand::rngs::{StdRng, ThreadRng};
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::geometry::{Coordinate, Route};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyLevel {
    VerySafe,
    Safe,
    Moderate,
    Risky,
    Dangerous,
    Unknown,
}

impl SafetyLevel {
    pub const SCORED: [SafetyLevel; 5] =
        [Self::VerySafe, Self::Safe, Self::Moderate, Self::Risky, Self::Dangerous];

    /// Ordinal danger score, `None` for [`SafetyLevel::Unknown`].
    pub const fn score(self) -> Option<u8> {
        match self {
            Self::VerySafe => Some(0),
            Self::Safe => Some(1),
            Self::Moderate => Some(2),
            Self::Risky => Some(3),
            Self::Dangerous => Some(4),
            Self::Unknown => None,
        }
    }

    /// Buckets a mean score back into a level.
    pub fn from_mean_score(mean: f64) -> Self {
        if mean < 0.5 {
            Self::VerySafe
        } else if mean < 1.5 {
            Self::Safe
        } else if mean < 2.5 {
            Self::Moderate
        } else if mean < 3.5 {
            Self::Risky
        } else {
            Self::Dangerous
        }
    }

    pub const fn color(self) -> &'static str {
        match self {
            Self::VerySafe => "#16a34a",
            Self::Safe => "#65a30d",
            Self::Moderate => "#ca8a04",
            Self::Risky => "#ea580c",
            Self::Dangerous => "#dc2626",
            Self::Unknown => "#6b7280",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::VerySafe => "Very Safe",
            Self::Safe => "Safe",
            Self::Moderate => "Moderate",
            Self::Risky => "Risky",
            Self::Dangerous => "Dangerous",
            Self::Unknown => "Unknown",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::VerySafe => "Very low crime rate, well-lit and busy area",
            Self::Safe => "Low crime rate, generally safe to travel",
            Self::Moderate => "Some reported incidents, stay alert",
            Self::Risky => "Frequent incidents reported, avoid if possible",
            Self::Dangerous => "High crime rate, avoid this area",
            Self::Unknown => "No safety data available for this area",
        }
    }

    pub const fn tips(self) -> [&'static str; 3] {
        match self {
            Self::VerySafe => [
                "Enjoy your trip",
                "Keep to your planned route",
                "Share your live location with a friend",
            ],
            Self::Safe => [
                "Stay on main roads",
                "Keep your belongings close",
                "Share your live location with a friend",
            ],
            Self::Moderate => [
                "Stay alert to your surroundings",
                "Avoid isolated stretches after dark",
                "Keep emergency contacts handy",
            ],
            Self::Risky => [
                "Avoid stopping in this area",
                "Travel in groups where possible",
                "Keep doors locked and windows up",
            ],
            Self::Dangerous => [
                "Consider an alternative route",
                "Do not travel alone, especially at night",
                "Keep emergency services on speed dial",
            ],
            Self::Unknown => [
                "No recent data for this area",
                "Follow general safety precautions",
                "Check local news before travelling",
            ],
        }
    }

    /// Crime-rate band (0-100) associated with the level.
    pub const fn crime_band(self) -> RangeInclusive<u8> {
        match self {
            Self::VerySafe => 0..=15,
            Self::Safe => 16..=35,
            Self::Moderate => 36..=60,
            Self::Risky => 61..=80,
            Self::Dangerous => 81..=100,
            Self::Unknown => 0..=0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    pub level: SafetyLevel,
    pub crime_rate: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointSafety {
    pub index: usize,
    pub coordinate: Coordinate,
    pub level: SafetyLevel,
    pub crime_rate: u8,
    pub last_updated: NaiveDate,
    pub tips: Vec<String>,
}

/// Supplies a safety assessment for each point of a route.
///
/// `None` means the source has nothing for that point; callers report it as
/// [`SafetyLevel::Unknown`].
pub trait SafetySource {
    fn assess(&mut self, index: usize, coordinate: Coordinate) -> Option<Assessment>;
}

impl<S: SafetySource + ?Sized> SafetySource for &mut S {
    fn assess(&mut self, index: usize, coordinate: Coordinate) -> Option<Assessment> {
        (**self).assess(index, coordinate)
    }
}

/// Index-modulo placeholder policy. Deterministic branches are checked
/// before `rng` is touched.
pub fn classify_point<R: Rng + ?Sized>(index: usize, rng: &mut R) -> SafetyLevel {
    if index % 20 == 0 {
        SafetyLevel::Dangerous
    } else if index % 15 == 0 {
        SafetyLevel::Risky
    } else if index % 10 == 0 {
        SafetyLevel::Moderate
    } else if rng.gen_bool(0.5) {
        SafetyLevel::Safe
    } else {
        SafetyLevel::VerySafe
    }
}

/// Placeholder source: [`classify_point`] with a crime rate drawn from the
/// level's band.
pub struct PatternSource<R = ThreadRng> {
    rng: R,
}

impl<R: Rng> PatternSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl PatternSource<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl Default for PatternSource<ThreadRng> {
    fn default() -> Self {
        Self::new(rand::thread_rng())
    }
}

impl<R: Rng> SafetySource for PatternSource<R> {
    fn assess(&mut self, index: usize, _coordinate: Coordinate) -> Option<Assessment> {
        let level = classify_point(index, &mut self.rng);
        let crime_rate = self.rng.gen_range(level.crime_band());
        Some(Assessment { level, crime_rate })
    }
}

/// Reports the same level for every point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedSource {
    assessment: Assessment,
}

impl FixedSource {
    pub fn new(level: SafetyLevel) -> Self {
        let band = level.crime_band();
        let crime_rate = band.start() + (band.end() - band.start()) / 2;
        Self { assessment: Assessment { level, crime_rate } }
    }
}

impl Default for FixedSource {
    fn default() -> Self {
        Self::new(SafetyLevel::Safe)
    }
}

impl SafetySource for FixedSource {
    fn assess(&mut self, _index: usize, _coordinate: Coordinate) -> Option<Assessment> {
        match self.assessment.level {
            SafetyLevel::Unknown => None,
            _ => Some(self.assessment),
        }
    }
}

// 0.0 = Safe, 1.0 = Dangerous
pub struct GridSource {
    resolution: Resolution,
    cells: HashMap<CellIndex, f32>,
    baseline: Option<f32>,
}

impl GridSource {
    pub const HOTSPOT_RISK: f32 = 0.9;
    pub const RING_RISK: f32 = 0.4;
    pub const RING_SIZE: u32 = 2;

    pub fn new(resolution: Resolution) -> Self {
        Self { resolution, cells: HashMap::new(), baseline: None }
    }

    /// Risk reported for points outside every mapped cell. Without one,
    /// those points have no data.
    pub fn with_baseline(mut self, risk: f32) -> Self {
        self.baseline = Some(risk.clamp(0.0, 1.0));
        self
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn cell(&self, coordinate: Coordinate) -> Result<CellIndex> {
        Ok(LatLng::new(coordinate.lat, coordinate.lon)?.to_cell(self.resolution))
    }

    pub fn set_risk(&mut self, coordinate: Coordinate, risk: f32) -> Result<()> {
        let cell = self.cell(coordinate)?;
        self.cells.insert(cell, risk.clamp(0.0, 1.0));
        Ok(())
    }

    /// Marks the cell as risky and its neighbours as moderate, keeping any
    /// neighbour that is already mapped.
    pub fn mark_hotspot(&mut self, coordinate: Coordinate) -> Result<()> {
        let center = self.cell(coordinate)?;
        self.cells.insert(center, Self::HOTSPOT_RISK);

        for neighbor in center.grid_disk::<Vec<_>>(Self::RING_SIZE) {
            self.cells.entry(neighbor).or_insert(Self::RING_RISK);
        }
        Ok(())
    }

    pub fn risk_at(&self, coordinate: Coordinate) -> Result<Option<f32>> {
        let cell = self.cell(coordinate)?;
        Ok(self.cells.get(&cell).copied().or(self.baseline))
    }

    pub fn level_for_risk(risk: f32) -> SafetyLevel {
        if risk < 0.2 {
            SafetyLevel::VerySafe
        } else if risk < 0.4 {
            SafetyLevel::Safe
        } else if risk < 0.6 {
            SafetyLevel::Moderate
        } else if risk < 0.8 {
            SafetyLevel::Risky
        } else {
            SafetyLevel::Dangerous
        }
    }
}

impl SafetySource for &GridSource {
    fn assess(&mut self, index: usize, coordinate: Coordinate) -> Option<Assessment> {
        let risk = match self.risk_at(coordinate) {
            Ok(risk) => risk?,
            Err(err) => {
                warn!(index, ?coordinate, %err, "point cannot be placed on the risk grid");
                return None;
            }
        };
        Some(Assessment {
            level: GridSource::level_for_risk(risk),
            crime_rate: (risk * 100.0).round().clamp(0.0, 100.0) as u8,
        })
    }
}

/// One [`PointSafety`] per route point, in route order.
pub fn assess_route<S: SafetySource + ?Sized>(
    route: &Route,
    source: &mut S,
    as_of: NaiveDate,
) -> Vec<PointSafety> {
    let points: Vec<PointSafety> = route
        .points()
        .iter()
        .enumerate()
        .map(|(index, &coordinate)| {
            let Assessment { level, crime_rate } = source
                .assess(index, coordinate)
                .unwrap_or(Assessment { level: SafetyLevel::Unknown, crime_rate: 0 });
            PointSafety {
                index,
                coordinate,
                level,
                crime_rate,
                last_updated: as_of,
                tips: level.tips().iter().map(|tip| tip.to_string()).collect(),
            }
        })
        .collect();

    let unknown = points.iter().filter(|p| p.level == SafetyLevel::Unknown).count();
    debug!(points = points.len(), unknown, "assessed route safety");
    points
}

/// Mean ordinal score bucketed back to a level. Unknown entries do not
/// count; no scored entries gives [`SafetyLevel::Unknown`].
pub fn aggregate_safety<I>(levels: I) -> SafetyLevel
where
    I: IntoIterator<Item = SafetyLevel>,
{
    let (sum, count) = levels
        .into_iter()
        .filter_map(SafetyLevel::score)
        .fold((0u64, 0u64), |(sum, count), score| (sum + u64::from(score), count + 1));

    if count == 0 {
        return SafetyLevel::Unknown;
    }
    SafetyLevel::from_mean_score(sum as f64 / count as f64)
}
