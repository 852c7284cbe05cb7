/// Application Services
///
/// Services own long-lived state and feed it requests in a controlled order.
///
/// - `BatchingService`: single-writer actor around the batching engine

pub mod batching_service;

pub use batching_service::{BatchingService, EngineCommand, EngineOutput, SharedSnapshot};
