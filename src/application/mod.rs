/// Application Layer - Use Cases and Services
///
/// This layer orchestrates domain logic to implement the operations intake
/// can request. It depends on the domain layer but knows nothing about how
/// requests arrive or how outcomes are rendered.
///
/// ## Modules
/// - `use_cases`: Submit and advance operations
/// - `services`: BatchingService (command loop owning the engine)

pub mod services;
pub mod use_cases;

// Re-export key services
pub use services::{BatchingService, EngineCommand, EngineOutput};
