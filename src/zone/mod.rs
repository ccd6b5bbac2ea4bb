//! Zone rule engine: classification of delivery bands and tie-break selection.

pub mod matcher;
pub mod selector;
pub mod types;

pub use matcher::{classify, find_matching_zones};
pub use selector::{select_best, select_best_match};
pub use types::{DeliveryZone, MatchTier, ZoneClassification, ZoneMatch, BOUNDARY_EPSILON_KM};
