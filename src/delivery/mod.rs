//! Delivery-fee resolution: the resolver, its stability memo, and sessions.

pub mod memo;
pub mod resolver;
pub mod session;
pub mod types;

pub use memo::ResolutionMemo;
pub use resolver::{
    default_zone, effective_zones, round_km, DeliveryFeeResolver, DEFAULT_TOLERANCE_KM,
    DEFAULT_ZONE_FEE,
};
pub use session::{SessionRegistry, DEFAULT_SESSION_IDLE_TTL};
pub use types::{ErrorKind, ResolutionResult, ResolveError};
