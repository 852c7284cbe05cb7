/// Infrastructure Layer - Technical Implementations
///
/// Everything that talks to the outside world on behalf of the service:
/// currently the HTTP observability endpoints. The domain layer never
/// depends on this layer.
///
/// ## Modules
/// - `observability`: Metrics export, health checks, snapshot feed

pub mod observability;

// Re-export key types
pub use observability::{HealthChecker, ObservabilityServer};
