//! Distance lookup: the provider contract and its concrete implementations.

pub mod providers;
pub mod types;

pub use providers::{haversine_km, DistanceProvider, RoadDistanceProvider, StraightLineProvider};
pub use types::{DistanceError, Location};
