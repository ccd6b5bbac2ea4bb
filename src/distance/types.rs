//! Core types for the distance provider contract.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// One end of a delivery: a free-form address or a coordinate pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Location {
    Coordinates { lat: f64, lon: f64 },
    Address(String),
}

impl Location {
    pub fn address(addr: impl Into<String>) -> Self {
        Self::Address(addr.into())
    }

    pub fn coords(lat: f64, lon: f64) -> Self {
        Self::Coordinates { lat, lon }
    }

    /// Reject blank addresses and coordinates outside the valid ranges.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::Address(a) if a.trim().is_empty() => Err("address is empty".into()),
            Self::Address(_) => Ok(()),
            Self::Coordinates { lat, lon } => {
                if !(-90.0..=90.0).contains(lat) || !(-180.0..=180.0).contains(lon) {
                    Err(format!(
                        "invalid coordinates {}, {}. Lat: -90..90, Lon: -180..180",
                        lat, lon
                    ))
                } else {
                    Ok(())
                }
            }
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address(a) => write!(f, "{}", a),
            Self::Coordinates { lat, lon } => write!(f, "{:.5},{:.5}", lat, lon),
        }
    }
}

impl From<&str> for Location {
    /// "lat,lon" parses to coordinates; anything else is an address.
    fn from(s: &str) -> Self {
        if let Some((lat, lon)) = s.split_once(',') {
            if let (Ok(lat), Ok(lon)) = (lat.trim().parse::<f64>(), lon.trim().parse::<f64>()) {
                return Self::Coordinates { lat, lon };
            }
        }
        Self::Address(s.to_string())
    }
}

/// Classified distance lookup failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DistanceError {
    /// One of the two locations cannot be submitted to the provider at all.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// The provider could not resolve one of the two locations.
    #[error("Address not found: {0}")]
    AddressNotFound(String),

    /// The provider failed, timed out, or answered with something unusable.
    #[error("Distance provider error: {0}")]
    ProviderError(String),
}

impl DistanceError {
    /// Wrap any unclassified failure as a provider error.
    pub fn provider(err: impl fmt::Display) -> Self {
        Self::ProviderError(err.to_string())
    }
}
