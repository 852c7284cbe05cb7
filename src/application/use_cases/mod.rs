/// Use Cases - High-level business operations
///
/// Each use case represents a specific operation intake can request. Use
/// cases borrow the batching engine for the duration of one request.
///
/// ## Available Use Cases
/// - `SubmitOrderUseCase`: validate, batch and assign a new order
/// - `AdvanceOrderUseCase`: pickup / delivery status updates

pub mod advance_order;
pub mod submit_order;

// Re-export key types
pub use advance_order::{AdvanceOrderError, AdvanceOrderResult, AdvanceOrderUseCase};
pub use submit_order::{SubmitOrderError, SubmitOrderUseCase};
