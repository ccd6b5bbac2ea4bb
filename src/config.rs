//! Restaurant settings at ~/.deliverable/settings.json.
//!
//! Read-only snapshot of the restaurant's origin, zone table, tolerance and
//! provider endpoints. Missing file → defaults. Missing fields default too.

use crate::delivery::resolver::{
    DEFAULT_TOLERANCE_KM, DEFAULT_ZONE_ESTIMATED_TIME, DEFAULT_ZONE_FEE, DEFAULT_ZONE_ID,
    DEFAULT_ZONE_MAX_KM,
};
use crate::delivery::DEFAULT_SESSION_IDLE_TTL;
use crate::distance::providers::{DEFAULT_NOMINATIM_URL, DEFAULT_OSRM_URL, DEFAULT_USER_AGENT};
use crate::distance::{Location, RoadDistanceProvider};
use crate::zone::DeliveryZone;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid settings: {0}")]
    Invalid(String),
}

/// Fallback band for restaurants with no zones configured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackZoneSettings {
    pub max_distance: f64,
    pub fee: f64,
    pub estimated_time: String,
}

impl Default for FallbackZoneSettings {
    fn default() -> Self {
        Self {
            max_distance: DEFAULT_ZONE_MAX_KM,
            fee: DEFAULT_ZONE_FEE,
            estimated_time: DEFAULT_ZONE_ESTIMATED_TIME.to_string(),
        }
    }
}

impl FallbackZoneSettings {
    pub fn to_zone(&self) -> DeliveryZone {
        DeliveryZone::new(DEFAULT_ZONE_ID, 0.0, self.max_distance, self.fee)
            .with_estimated_time(self.estimated_time.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub nominatim_url: String,
    pub osrm_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            nominatim_url: DEFAULT_NOMINATIM_URL.to_string(),
            osrm_url: DEFAULT_OSRM_URL.to_string(),
            timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ProviderSettings {
    pub fn road_provider(&self) -> RoadDistanceProvider {
        RoadDistanceProvider::new(
            &self.nominatim_url,
            &self.osrm_url,
            Duration::from_secs(self.timeout_secs),
            &self.user_agent,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// The restaurant's location.
    pub origin: Option<Location>,
    /// `None`: no zone table configured. `Some(vec![])`: configured but empty,
    /// which resolves against the fallback band.
    pub zones: Option<Vec<DeliveryZone>>,
    /// Margin added to both edges of every zone, in km.
    pub tolerance_km: f64,
    pub fallback_zone: FallbackZoneSettings,
    pub provider: ProviderSettings,
    /// Server sessions idle for longer than this are dropped.
    pub session_idle_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            origin: None,
            zones: None,
            tolerance_km: DEFAULT_TOLERANCE_KM,
            fallback_zone: FallbackZoneSettings::default(),
            provider: ProviderSettings::default(),
            session_idle_secs: DEFAULT_SESSION_IDLE_TTL.as_secs(),
        }
    }
}

impl Settings {
    /// Load from the default location (~/.deliverable/settings.json).
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path())
    }

    /// Load from a specific path. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let settings: Self = serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn session_idle_ttl(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs)
    }

    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".deliverable")
            .join("settings.json")
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.tolerance_km.is_nan() || self.tolerance_km < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "tolerance_km must be >= 0, got {}",
                self.tolerance_km
            )));
        }
        if self.provider.timeout_secs == 0 {
            return Err(ConfigError::Invalid("provider.timeout_secs must be > 0".into()));
        }
        if self.session_idle_secs == 0 {
            return Err(ConfigError::Invalid("session_idle_secs must be > 0".into()));
        }
        Ok(())
    }
}

/// Read a bare zone table (a JSON array of zones).
pub fn load_zones(path: &Path) -> Result<Vec<DeliveryZone>, ConfigError> {
    let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
