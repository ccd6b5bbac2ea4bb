//! Core types for delivery-fee resolution.

use crate::distance::DistanceError;
use crate::zone::DeliveryZone;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Caller-visible classification of a failed resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidParameters,
    AddressNotFound,
    ProviderError,
    /// A newer destination was requested before this lookup finished.
    Superseded,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameters => write!(f, "invalid_parameters"),
            Self::AddressNotFound => write!(f, "address_not_found"),
            Self::ProviderError => write!(f, "provider_error"),
            Self::Superseded => write!(f, "superseded"),
        }
    }
}

/// Resolution failures. Being out of the delivery area is not one of them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Address not found: {0}")]
    AddressNotFound(String),

    #[error("Distance provider error: {0}")]
    Provider(String),

    #[error("Lookup for '{destination}' superseded by a newer request")]
    Superseded { destination: String },
}

impl ResolveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidParameters(_) => ErrorKind::InvalidParameters,
            Self::AddressNotFound(_) => ErrorKind::AddressNotFound,
            Self::Provider(_) => ErrorKind::ProviderError,
            Self::Superseded { .. } => ErrorKind::Superseded,
        }
    }
}

impl From<DistanceError> for ResolveError {
    fn from(err: DistanceError) -> Self {
        match err {
            DistanceError::InvalidParameters(m) => Self::InvalidParameters(m),
            DistanceError::AddressNotFound(m) => Self::AddressNotFound(m),
            DistanceError::ProviderError(m) => Self::Provider(m),
        }
    }
}

/// Outcome of one resolution, shaped for the UI/API layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionResult {
    pub deliverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<DeliveryZone>,
    /// Rounded to two decimals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResolutionResult {
    pub fn deliverable(zone: &DeliveryZone, distance_km: f64) -> Self {
        Self {
            deliverable: true,
            fee: Some(zone.fee),
            estimated_time: Some(zone.estimated_time.clone()),
            zone: Some(zone.clone()),
            distance_km: Some(distance_km),
            error_kind: None,
            error: None,
        }
    }

    /// Distance known, no zone matched.
    pub fn out_of_range(distance_km: f64) -> Self {
        Self {
            deliverable: false,
            fee: None,
            estimated_time: None,
            zone: None,
            distance_km: Some(distance_km),
            error_kind: None,
            error: None,
        }
    }

    pub fn failed(err: &ResolveError) -> Self {
        Self {
            deliverable: false,
            fee: None,
            estimated_time: None,
            zone: None,
            distance_km: None,
            error_kind: Some(err.kind()),
            error: Some(err.to_string()),
        }
    }

    pub fn is_out_of_range(&self) -> bool {
        !self.deliverable && self.error_kind.is_none()
    }
}

impl From<Result<ResolutionResult, ResolveError>> for ResolutionResult {
    fn from(res: Result<ResolutionResult, ResolveError>) -> Self {
        res.unwrap_or_else(|e| Self::failed(&e))
    }
}
