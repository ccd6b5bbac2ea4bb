//! Zone selector: picks exactly one zone (or none) out of the matches.
//!
//! Certainty wins over tolerance-assisted matches; among equally certain
//! zones the customer gets the cheapest fee.

use super::types::{DeliveryZone, MatchTier, ZoneMatch};
use std::cmp::Ordering;

/// Select the best zone: highest tier present, then lowest fee, then lowest id.
pub fn select_best<'a>(matches: &[ZoneMatch<'a>]) -> Option<&'a DeliveryZone> {
    select_best_match(matches).map(|m| m.zone)
}

/// Same as [`select_best`] but keeps the classification of the winner.
pub fn select_best_match<'a, 'm>(matches: &'m [ZoneMatch<'a>]) -> Option<&'m ZoneMatch<'a>> {
    let top = matches.iter().map(|m| m.tier()).max()?;
    if top == MatchTier::None {
        return None;
    }

    matches
        .iter()
        .filter(|m| m.tier() == top)
        .min_by(|a, b| cheaper(a.zone, b.zone))
}

fn cheaper(a: &DeliveryZone, b: &DeliveryZone) -> Ordering {
    a.fee.total_cmp(&b.fee).then_with(|| a.id.cmp(&b.id))
}
