//! Zone matcher: classifies zones against a measured distance.
//!
//! Pure functions, no shared state. Safe to call from any number of tasks.

use super::types::{DeliveryZone, ZoneClassification, ZoneMatch, BOUNDARY_EPSILON_KM};

/// Classify a single zone against `distance` (km) with the given tolerance (km).
///
/// Inactive zones are invisible: every flag is false regardless of distance.
pub fn classify(distance: f64, zone: &DeliveryZone, tolerance_km: f64) -> ZoneClassification {
    if !zone.active {
        return ZoneClassification::default();
    }

    let min = zone.min_distance;
    let max = zone.max_distance;

    ZoneClassification {
        is_exactly_in_zone: min <= distance && distance <= max,
        is_on_boundary: near_edge(distance, min) || near_edge(distance, max),
        is_in_zone_with_tolerance: (min - tolerance_km) <= distance
            && distance <= (max + tolerance_km),
    }
}

/// Strictly closer than [`BOUNDARY_EPSILON_KM`] to `edge`.
///
/// Distances arrive rounded to hundredths, so `2.05 - 2.0` lands a hair under
/// 0.05 in binary. The slack keeps both sides of an edge symmetric.
fn near_edge(distance: f64, edge: f64) -> bool {
    (distance - edge).abs() < BOUNDARY_EPSILON_KM - EDGE_NOISE_KM
}

const EDGE_NOISE_KM: f64 = 1e-9;

/// Every zone for which at least one classification flag is set.
///
/// The order of the result carries no meaning; selection must not rely on it.
pub fn find_matching_zones(
    distance: f64,
    zones: &[DeliveryZone],
    tolerance_km: f64,
) -> Vec<ZoneMatch<'_>> {
    zones
        .iter()
        .map(|zone| ZoneMatch {
            zone,
            classification: classify(distance, zone, tolerance_km),
        })
        .filter(|m| m.classification.is_match())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zone::MatchTier;

    fn two_bands() -> Vec<DeliveryZone> {
        vec![
            DeliveryZone::new("near", 0.0, 2.0, 0.0),
            DeliveryZone::new("far", 2.0, 20.0, 7.0),
        ]
    }

    #[test]
    fn test_inactive_zone_never_matches() {
        let zone = DeliveryZone::new("off", 0.0, 10.0, 3.0).inactive();
        for d in [0.0, 0.01, 5.0, 10.0, 10.03, 50.0, -1.0] {
            for tol in [0.0, 0.2, 1.0, 100.0] {
                assert_eq!(classify(d, &zone, tol), ZoneClassification::default());
            }
        }
    }

    #[test]
    fn test_exact_interval_is_closed() {
        let zone = DeliveryZone::new("z", 2.0, 5.0, 1.0);
        assert!(classify(2.0, &zone, 0.0).is_exactly_in_zone);
        assert!(classify(5.0, &zone, 0.0).is_exactly_in_zone);
        assert!(classify(3.5, &zone, 0.0).is_exactly_in_zone);
        assert!(!classify(1.99, &zone, 0.0).is_exactly_in_zone);
        assert!(!classify(5.01, &zone, 0.0).is_exactly_in_zone);
    }

    #[test]
    fn test_boundary_independent_of_tolerance() {
        let zone = DeliveryZone::new("z", 2.0, 5.0, 1.0);
        for d in [1.9, 1.97, 2.0, 2.03, 2.2, 4.96, 5.0, 5.04, 5.5] {
            assert_eq!(
                classify(d, &zone, 0.0).is_on_boundary,
                classify(d, &zone, 1.0).is_on_boundary,
                "boundary flag changed with tolerance at d={}",
                d
            );
        }
        assert!(classify(2.0, &zone, 0.0).is_on_boundary);
        assert!(classify(5.0, &zone, 0.0).is_on_boundary);
    }

    #[test]
    fn test_boundary_outside_band_without_tolerance() {
        // Just outside the edge: no exact hit, no tolerance, still a boundary hit.
        let zone = DeliveryZone::new("z", 2.0, 5.0, 1.0);
        let c = classify(5.02, &zone, 0.0);
        assert!(!c.is_exactly_in_zone);
        assert!(!c.is_in_zone_with_tolerance);
        assert!(c.is_on_boundary);
        assert_eq!(c.tier(), MatchTier::Boundary);
    }

    #[test]
    fn test_tolerance_widens_both_edges() {
        let zone = DeliveryZone::new("z", 2.0, 5.0, 1.0);
        assert!(classify(1.5, &zone, 0.5).is_in_zone_with_tolerance);
        assert!(classify(5.5, &zone, 0.5).is_in_zone_with_tolerance);
        assert!(!classify(5.6, &zone, 0.5).is_in_zone_with_tolerance);
        assert_eq!(classify(5.5, &zone, 0.5).tier(), MatchTier::Tolerance);
    }

    #[test]
    fn test_boundary_symmetric_around_edge() {
        let zone = DeliveryZone::new("z", 2.0, 5.0, 1.0);
        // Exactly 0.05 km from an edge on either side is not a boundary hit.
        for d in [1.95, 2.05, 4.95, 5.05] {
            assert!(!classify(d, &zone, 0.0).is_on_boundary, "d={}", d);
        }
        for d in [1.96, 2.04, 4.96, 5.04] {
            assert!(classify(d, &zone, 0.0).is_on_boundary, "d={}", d);
        }
    }

    #[test]
    fn test_just_past_edge_without_tolerance_is_out() {
        let zones = vec![DeliveryZone::new("near", 0.0, 2.0, 0.0)];
        assert!(find_matching_zones(2.05, &zones, 0.0).is_empty());
        assert_eq!(find_matching_zones(2.04, &zones, 0.0).len(), 1);
    }

    #[test]
    fn test_inverted_zone_is_tolerated() {
        let zone = DeliveryZone::new("bad", 5.0, 2.0, 1.0);
        let c = classify(3.0, &zone, 0.0);
        assert!(!c.is_exactly_in_zone);
        assert!(!c.is_in_zone_with_tolerance);
        assert!(!c.is_on_boundary);
    }

    #[test]
    fn test_scenario_a_no_boundary_flags() {
        let zones = two_bands();
        let matches = find_matching_zones(2.27, &zones, 1.0);
        assert_eq!(matches.len(), 2);
        for m in &matches {
            assert!(!m.classification.is_on_boundary, "{} flagged as boundary", m.zone.id);
        }
        let far = matches.iter().find(|m| m.zone.id == "far").unwrap();
        assert!(far.classification.is_exactly_in_zone);
        let near = matches.iter().find(|m| m.zone.id == "near").unwrap();
        assert_eq!(near.tier(), MatchTier::Tolerance);
    }

    #[test]
    fn test_scenario_b_shared_edge() {
        let zones = two_bands();
        let matches = find_matching_zones(2.0, &zones, 1.0);
        assert_eq!(matches.len(), 2);
        for m in &matches {
            assert!(m.classification.is_on_boundary);
            assert!(m.classification.is_exactly_in_zone);
        }
    }

    #[test]
    fn test_scenario_c_nothing_matches() {
        let zones = two_bands();
        assert!(find_matching_zones(25.0, &zones, 1.0).is_empty());
    }
}
