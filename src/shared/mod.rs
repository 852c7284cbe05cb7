//! Shared utilities and types used across all layers
//!
//! This module contains:
//! - Protocol definitions (intake records, outcomes, snapshots)
//! - Plane geometry
//! - Prometheus metrics

pub mod geometry;
pub mod metrics;
pub mod protocol;

// Re-export commonly used types
pub use geometry::{distance, Location};
pub use protocol::{
    AdvanceOrderRequest, AssignmentEvent, AssignmentOutcome, CustomerId, EngineSnapshot,
    KitchenId, NewOrderRequest, OrderId, OrderStatus, OrderView, ReadyTime, RiderId, RiderSpec,
    RiderView,
};
