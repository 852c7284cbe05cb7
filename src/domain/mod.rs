//! Domain Layer - Core Business Logic
//!
//! Pure batching and assignment logic with no I/O. Everything here is
//! synchronous and single-owner; the application layer decides how requests
//! reach it.
//!
//! ## Modules
//! - `order`, `rider`: entities
//! - `registry`: insertion-ordered order and rider collections
//! - `matching`: batching rules and the `BatchMatcher` seam
//! - `assignment`: nearest-rider selection and binding
//! - `batcher`: the engine tying the pieces together
//! - `validation`: intake checks

pub mod assignment;
pub mod batcher;
pub mod error;
pub mod matching;
pub mod order;
pub mod registry;
pub mod rider;
pub mod validation;

// Re-export key types
pub use batcher::{BatchingConfig, BatchingEngine};
pub use error::{AssignmentError, EngineError};
pub use matching::{BatchMatcher, BatchingRule, MatchTolerance, RuleEngine, RuleMatch};
pub use order::Order;
pub use registry::{OrderRegistry, RiderRegistry};
pub use rider::Rider;
