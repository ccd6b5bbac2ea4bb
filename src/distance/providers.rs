//! Distance providers: road distance via Nominatim + OSRM, and offline straight-line.
//!
//! These are collaborators of the resolver, not part of the zone engine. They
//! return raw, unrounded kilometers; rounding is the resolver's job.

use super::types::{DistanceError, Location};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Resolves two locations to a travel distance in kilometers.
#[async_trait]
pub trait DistanceProvider: Send + Sync {
    async fn distance(&self, origin: &Location, destination: &Location) -> Result<f64, DistanceError>;
}

// ─── Straight-line provider ─────────────────────────────────────

const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Great-circle distance between two coordinate pairs. Works offline.
#[derive(Debug, Clone, Copy, Default)]
pub struct StraightLineProvider;

#[async_trait]
impl DistanceProvider for StraightLineProvider {
    async fn distance(&self, origin: &Location, destination: &Location) -> Result<f64, DistanceError> {
        let (lat1, lon1) = coordinates_of(origin)?;
        let (lat2, lon2) = coordinates_of(destination)?;
        Ok(haversine_km(lat1, lon1, lat2, lon2))
    }
}

fn coordinates_of(loc: &Location) -> Result<(f64, f64), DistanceError> {
    match loc {
        Location::Coordinates { lat, lon } => Ok((*lat, *lon)),
        Location::Address(a) => Err(DistanceError::InvalidParameters(format!(
            "straight-line distance needs coordinates, got address '{}'",
            a
        ))),
    }
}

/// Haversine distance in kilometers.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

// ─── Road provider (Nominatim + OSRM) ───────────────────────────

pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_OSRM_URL: &str = "https://router.project-osrm.org";
pub const DEFAULT_USER_AGENT: &str = "deliverable/0.3 (delivery-zone-engine)";

#[derive(Deserialize, Debug, Clone)]
struct NominatimResult {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
}

#[derive(Deserialize, Debug)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Deserialize, Debug)]
struct OsrmRoute {
    /// Meters.
    distance: f64,
}

/// Road distance: addresses are geocoded with Nominatim, then routed with OSRM.
///
/// `ureq` is blocking, so every lookup runs on the blocking pool.
#[derive(Clone)]
pub struct RoadDistanceProvider {
    agent: ureq::Agent,
    nominatim_url: String,
    osrm_url: String,
}

impl RoadDistanceProvider {
    pub fn new(nominatim_url: &str, osrm_url: &str, timeout: Duration, user_agent: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(user_agent)
            .build();
        Self {
            agent,
            nominatim_url: nominatim_url.trim_end_matches('/').to_string(),
            osrm_url: osrm_url.trim_end_matches('/').to_string(),
        }
    }

    fn geocode(&self, loc: &Location) -> Result<(f64, f64), DistanceError> {
        let address = match loc {
            Location::Coordinates { lat, lon } => return Ok((*lat, *lon)),
            Location::Address(a) => a,
        };

        let url = format!("{}/search", self.nominatim_url);
        let response = self
            .agent
            .get(&url)
            .query("q", address)
            .query("format", "json")
            .query("limit", "1")
            .call()
            .map_err(|e| match e {
                ureq::Error::Status(code, _) => {
                    DistanceError::ProviderError(format!("geocoder returned HTTP {}", code))
                }
                other => DistanceError::provider(other),
            })?;

        let results: Vec<NominatimResult> = response.into_json().map_err(DistanceError::provider)?;
        let top = results
            .first()
            .ok_or_else(|| DistanceError::AddressNotFound(address.clone()))?;

        let lat = top.lat.parse::<f64>().map_err(DistanceError::provider)?;
        let lon = top.lon.parse::<f64>().map_err(DistanceError::provider)?;
        debug!(address = %address, resolved = %top.display_name, lat, lon, "geocoded");
        Ok((lat, lon))
    }

    fn route_km(&self, from: (f64, f64), to: (f64, f64)) -> Result<f64, DistanceError> {
        let url = format!(
            "{}/route/v1/driving/{},{};{},{}",
            self.osrm_url, from.1, from.0, to.1, to.0
        );

        // OSRM answers routing failures with HTTP 400 and a JSON body.
        let body: OsrmResponse = match self.agent.get(&url).query("overview", "false").call() {
            Ok(resp) => resp.into_json().map_err(DistanceError::provider)?,
            Err(ureq::Error::Status(code, resp)) => resp.into_json().map_err(|_| {
                DistanceError::ProviderError(format!("router returned HTTP {}", code))
            })?,
            Err(e) => return Err(DistanceError::provider(e)),
        };

        interpret_route(body)
    }

    fn blocking_distance(&self, origin: &Location, destination: &Location) -> Result<f64, DistanceError> {
        let from = self.geocode(origin)?;
        let to = self.geocode(destination)?;
        self.route_km(from, to)
    }
}

fn interpret_route(body: OsrmResponse) -> Result<f64, DistanceError> {
    let OsrmResponse { code, message, routes } = body;
    match code.as_str() {
        "Ok" => routes
            .first()
            .map(|r| r.distance / 1000.0)
            .filter(|km| km.is_finite() && *km >= 0.0)
            .ok_or_else(|| DistanceError::ProviderError("router returned no usable route".into())),
        "NoRoute" | "NoSegment" => Err(DistanceError::AddressNotFound(
            message.unwrap_or_else(|| "no route between locations".into()),
        )),
        "InvalidQuery" | "InvalidValue" | "InvalidUrl" => Err(DistanceError::InvalidParameters(
            message.unwrap_or_else(|| code.clone()),
        )),
        other => Err(DistanceError::ProviderError(format!(
            "router answered '{}': {}",
            other,
            message.unwrap_or_default()
        ))),
    }
}

#[async_trait]
impl DistanceProvider for RoadDistanceProvider {
    async fn distance(&self, origin: &Location, destination: &Location) -> Result<f64, DistanceError> {
        let this = self.clone();
        let origin = origin.clone();
        let destination = destination.clone();
        tokio::task::spawn_blocking(move || this.blocking_distance(&origin, &destination))
            .await
            .map_err(DistanceError::provider)?
    }
}
