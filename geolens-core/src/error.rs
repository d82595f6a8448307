//! Error types for GeoLens core.

use std::{error::Error, fmt, io};

use crate::domain::Metric;

/// Error type for GeoLens core operations.
#[derive(Debug)]
pub enum GeoLensError {
    /// An underlying I/O error.
    Io(io::Error),
    /// Statistics payload could not be decoded or encoded.
    Json(serde_json::Error),
    /// World geometry could not be parsed as GeoJSON.
    Geo(geojson::Error),
    /// A record with a country lacks the metric being ranked.
    MissingMetric {
        /// Country of the offending record.
        country: String,
        /// Metric that was requested.
        metric: Metric,
    },
    /// A record failed boundary validation.
    InvalidRecord(String),
    /// A catch-all error with a message.
    Other(String),
}

impl fmt::Display for GeoLensError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::Json(err) => write!(f, "json error: {err}"),
            Self::Geo(err) => write!(f, "geojson error: {err}"),
            Self::MissingMetric { country, metric } => {
                write!(f, "missing metric {metric} for country {country}")
            }
            Self::InvalidRecord(message) => write!(f, "invalid record: {message}"),
            Self::Other(message) => write!(f, "{message}"),
        }
    }
}

impl Error for GeoLensError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Geo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for GeoLensError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for GeoLensError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<geojson::Error> for GeoLensError {
    fn from(value: geojson::Error) -> Self {
        Self::Geo(value)
    }
}

/// Convenience result type for GeoLens core.
pub type Result<T> = std::result::Result<T, GeoLensError>;
