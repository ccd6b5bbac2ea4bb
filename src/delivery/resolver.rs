//! Delivery-fee resolver: orchestrates one quote.
//!
//! Flow:  validate → effective zones → memo → provider (sole await) → staleness check
//!        → round → match → select → memo update
//!
//! One resolver per calculation session. Calls may race; only a lookup whose
//! destination is still the most recently requested one is authoritative, and
//! the first verdict recorded for a destination is the one every later call sees.

use super::memo::ResolutionMemo;
use super::types::{ResolutionResult, ResolveError};
use crate::distance::{DistanceError, DistanceProvider, Location};
use crate::zone::{find_matching_zones, select_best_match, DeliveryZone};
use std::borrow::Cow;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Tolerance applied when the caller does not configure one.
pub const DEFAULT_TOLERANCE_KM: f64 = 0.2;

/// Fallback band used when a restaurant has no zones configured.
pub const DEFAULT_ZONE_ID: &str = "default";
pub const DEFAULT_ZONE_MAX_KM: f64 = 5.0;
pub const DEFAULT_ZONE_FEE: f64 = 5.0;
pub const DEFAULT_ZONE_ESTIMATED_TIME: &str = "30-45 min";

pub fn default_zone() -> DeliveryZone {
    DeliveryZone::new(DEFAULT_ZONE_ID, 0.0, DEFAULT_ZONE_MAX_KM, DEFAULT_ZONE_FEE)
        .with_estimated_time(DEFAULT_ZONE_ESTIMATED_TIME)
}

/// Round a raw provider distance to two decimals. Applied before any comparison.
pub fn round_km(raw: f64) -> f64 {
    (raw * 100.0).round() / 100.0
}

/// The zones matching actually runs over: the configured ones, or the fallback
/// band when none are configured.
pub fn effective_zones<'z>(zones: &'z [DeliveryZone], fallback: &DeliveryZone) -> Cow<'z, [DeliveryZone]> {
    if zones.is_empty() {
        Cow::Owned(vec![fallback.clone()])
    } else {
        Cow::Borrowed(zones)
    }
}

#[derive(Debug, Default)]
struct SessionState {
    memo: ResolutionMemo,
    /// Destination of the most recent `resolve` call, memo hits included.
    latest: Option<Location>,
}

/// Resolves deliverability, fee and estimated time for one checkout session.
pub struct DeliveryFeeResolver {
    provider: Arc<dyn DistanceProvider>,
    fallback_zone: DeliveryZone,
    state: Mutex<SessionState>,
}

impl DeliveryFeeResolver {
    pub fn new(provider: Arc<dyn DistanceProvider>) -> Self {
        Self {
            provider,
            fallback_zone: default_zone(),
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Replace the fallback band used for restaurants without zones.
    pub fn with_fallback_zone(mut self, zone: DeliveryZone) -> Self {
        self.fallback_zone = zone;
        self
    }

    pub fn fallback_zone(&self) -> &DeliveryZone {
        &self.fallback_zone
    }

    /// Resolve a quote for `destination`.
    ///
    /// `Ok` covers both deliverable and out-of-range outcomes. `Err` is reserved
    /// for invalid input, provider failures, and superseded lookups.
    pub async fn resolve(
        &self,
        origin: &Location,
        destination: &Location,
        zones: &[DeliveryZone],
        tolerance_km: f64,
    ) -> Result<ResolutionResult, ResolveError> {
        validate(origin, destination, zones, tolerance_km)?;
        let zones = effective_zones(zones, &self.fallback_zone);

        {
            let mut state = self.lock();
            state.latest = Some(destination.clone());
            if let Some(previous) = state.memo.lookup(destination) {
                debug!(%destination, deliverable = previous.deliverable, "memo hit, skipping provider");
                return Ok(previous.clone());
            }
        }

        debug!(%origin, %destination, "querying distance provider");
        let lookup = self.provider.distance(origin, destination).await;

        let mut state = self.lock();
        if state.latest.as_ref() != Some(destination) {
            info!(
                %destination,
                latest = %state.latest.as_ref().map(ToString::to_string).unwrap_or_default(),
                "discarding stale distance lookup"
            );
            return Err(ResolveError::Superseded {
                destination: destination.to_string(),
            });
        }

        // A racing call for the same destination already settled the verdict.
        if let Some(settled) = state.memo.lookup(destination) {
            debug!(%destination, deliverable = settled.deliverable, "verdict already settled, discarding lookup");
            return Ok(settled.clone());
        }

        let raw = match lookup.and_then(usable_distance) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(%destination, error = %e, "distance lookup failed");
                state.memo.record_unknown(destination);
                return Err(e.into());
            }
        };

        let distance_km = round_km(raw);
        let matches = find_matching_zones(distance_km, &zones, tolerance_km);
        let result = match select_best_match(&matches) {
            Some(best) => {
                debug!(zone = %best.zone, tier = %best.tier(), distance_km, "zone selected");
                ResolutionResult::deliverable(best.zone, distance_km)
            }
            None => {
                info!(%destination, distance_km, tolerance_km, "outside delivery area");
                ResolutionResult::out_of_range(distance_km)
            }
        };

        state.memo.record(destination, result.clone());
        Ok(result)
    }

    /// Whether the last resolved address was out of range; `None` if unknown.
    pub fn last_was_out_of_range(&self) -> Option<bool> {
        self.lock().memo.last_was_out_of_range()
    }

    pub fn last_address(&self) -> Option<Location> {
        self.lock().memo.last_address().cloned()
    }

    /// Forget the memo, e.g. after the restaurant's zones changed.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.memo.clear();
        state.latest = None;
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn validate(
    origin: &Location,
    destination: &Location,
    zones: &[DeliveryZone],
    tolerance_km: f64,
) -> Result<(), ResolveError> {
    origin
        .validate()
        .map_err(|m| ResolveError::InvalidParameters(format!("origin: {}", m)))?;
    destination
        .validate()
        .map_err(|m| ResolveError::InvalidParameters(format!("destination: {}", m)))?;

    if tolerance_km.is_nan() || tolerance_km < 0.0 {
        return Err(ResolveError::InvalidParameters(format!(
            "tolerance must be a non-negative number of km, got {}",
            tolerance_km
        )));
    }

    if let Some(bad) = zones.iter().find(|z| z.is_malformed()) {
        return Err(ResolveError::InvalidParameters(format!(
            "zone '{}' has a non-numeric distance or fee",
            bad.id
        )));
    }

    Ok(())
}

/// Garbage from the provider is its failure, not an out-of-range verdict.
fn usable_distance(raw: f64) -> Result<f64, DistanceError> {
    if raw.is_finite() && raw >= 0.0 {
        Ok(raw)
    } else {
        Err(DistanceError::ProviderError(format!("unusable distance {}", raw)))
    }
}
