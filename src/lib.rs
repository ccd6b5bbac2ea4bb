//! Delivery-zone resolution engine.
//!
//! Given a travel distance between a restaurant and a customer, decides whether
//! the order is deliverable and which fee/time band applies, without flapping
//! for unchanged input.

pub mod config;
pub mod delivery;
pub mod distance;
pub mod logging;
pub mod server;
pub mod zone;
