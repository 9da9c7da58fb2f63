use thiserror::Error;

#[derive(Error, Debug)]
pub enum TripsafeError {
    #[error("coordinate out of range: ({lon}, {lat})")]
    OutOfRange { lon: f64, lat: f64 },
    #[error("invalid coordinate at position {index}: ({lon}, {lat})")]
    InvalidCoordinate { index: usize, lon: f64, lat: f64 },
    #[error("a position needs at least longitude and latitude, got {0} values")]
    ShortPosition(usize),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("failed to index coordinate into the risk grid")]
    Grid(#[from] h3o::error::InvalidLatLng),
}

pub type Result<T> = std::result::Result<T, TripsafeError>;
