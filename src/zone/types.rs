//! Core types for zone matching.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Half-width of the band around each zone edge that counts as "on the boundary".
///
/// Fixed: it does not scale with the caller's tolerance, so a distance sitting
/// exactly on an edge registers as a boundary hit even with zero tolerance.
pub const BOUNDARY_EPSILON_KM: f64 = 0.05;

/// One fee/time band of a restaurant's delivery area.
///
/// `min_distance < max_distance` is expected but never enforced here; zone
/// snapshots come from restaurant administration and may overlap or be inverted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryZone {
    pub id: String,
    #[serde(alias = "minDistance")]
    pub min_distance: f64,
    #[serde(alias = "maxDistance")]
    pub max_distance: f64,
    pub fee: f64,
    /// Display string such as "30-45 min", passed through untouched.
    #[serde(alias = "estimatedTime", default)]
    pub estimated_time: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl DeliveryZone {
    pub fn new(id: impl Into<String>, min_distance: f64, max_distance: f64, fee: f64) -> Self {
        Self {
            id: id.into(),
            min_distance,
            max_distance,
            fee,
            estimated_time: String::new(),
            active: true,
        }
    }

    pub fn with_estimated_time(mut self, estimated_time: impl Into<String>) -> Self {
        self.estimated_time = estimated_time.into();
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// True when any numeric field is NaN. Such a zone cannot be compared at all.
    pub fn is_malformed(&self) -> bool {
        self.min_distance.is_nan() || self.max_distance.is_nan() || self.fee.is_nan()
    }
}

impl fmt::Display for DeliveryZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:.2}-{:.2} km, fee {:.2})",
            self.id, self.min_distance, self.max_distance, self.fee
        )
    }
}

/// How strongly a zone matched a distance, ordered weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchTier {
    None,
    Tolerance,
    Boundary,
    Exact,
}

impl fmt::Display for MatchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Tolerance => write!(f, "tolerance"),
            Self::Boundary => write!(f, "boundary"),
            Self::Exact => write!(f, "exact"),
        }
    }
}

/// Per-zone classification of one distance. Recomputed on every call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZoneClassification {
    pub is_exactly_in_zone: bool,
    pub is_on_boundary: bool,
    pub is_in_zone_with_tolerance: bool,
}

impl ZoneClassification {
    /// The strongest flag that is set.
    pub fn tier(&self) -> MatchTier {
        if self.is_exactly_in_zone {
            MatchTier::Exact
        } else if self.is_on_boundary {
            MatchTier::Boundary
        } else if self.is_in_zone_with_tolerance {
            MatchTier::Tolerance
        } else {
            MatchTier::None
        }
    }

    pub fn is_match(&self) -> bool {
        self.tier() != MatchTier::None
    }
}

/// A zone paired with how it classified against the distance being resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneMatch<'a> {
    pub zone: &'a DeliveryZone,
    pub classification: ZoneClassification,
}

impl ZoneMatch<'_> {
    pub fn tier(&self) -> MatchTier {
        self.classification.tier()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_ordering() {
        assert!(MatchTier::Exact > MatchTier::Boundary);
        assert!(MatchTier::Boundary > MatchTier::Tolerance);
        assert!(MatchTier::Tolerance > MatchTier::None);
    }

    #[test]
    fn test_tier_prefers_strongest_flag() {
        let c = ZoneClassification {
            is_exactly_in_zone: true,
            is_on_boundary: true,
            is_in_zone_with_tolerance: true,
        };
        assert_eq!(c.tier(), MatchTier::Exact);

        let c = ZoneClassification {
            is_exactly_in_zone: false,
            is_on_boundary: true,
            is_in_zone_with_tolerance: false,
        };
        assert_eq!(c.tier(), MatchTier::Boundary);
        assert!(!ZoneClassification::default().is_match());
    }

    #[test]
    fn test_zone_deserialize_camel_case() {
        let json = r#"{
            "id": "z1",
            "minDistance": 0,
            "maxDistance": 2.5,
            "fee": 4.9,
            "estimatedTime": "30-45 min"
        }"#;
        let zone: DeliveryZone = serde_json::from_str(json).unwrap();
        assert_eq!(zone.id, "z1");
        assert_eq!(zone.max_distance, 2.5);
        assert_eq!(zone.estimated_time, "30-45 min");
        assert!(zone.active);
    }

    #[test]
    fn test_zone_malformed() {
        assert!(!DeliveryZone::new("a", 0.0, 2.0, 1.0).is_malformed());
        assert!(DeliveryZone::new("a", f64::NAN, 2.0, 1.0).is_malformed());
        // Inverted bands are tolerated, only NaN is malformed.
        assert!(!DeliveryZone::new("a", 5.0, 2.0, 1.0).is_malformed());
    }
}
