/// Submit Order Use Case
///
/// Entry point for a new order coming from intake. Validates the record,
/// then hands it to the batching engine, which registers it, searches for a
/// batching partner and assigns the batch to the nearest rider.
///
/// ## Workflow
/// 1. Validate the request (coordinates, ready time, unused identity)
/// 2. Submit to the engine
/// 3. Return the assignment outcome
///
/// ## Example
/// ```rust,ignore
/// use delivery_batcher::application::use_cases::SubmitOrderUseCase;
///
/// let use_case = SubmitOrderUseCase::new(OrderValidator::new());
/// let outcome = use_case.execute(&mut engine, request)?;
/// ```

use crate::domain::batcher::BatchingEngine;
use crate::domain::error::EngineError;
use crate::domain::matching::BatchMatcher;
use crate::domain::validation::{OrderValidator, ValidationError};
use crate::shared::protocol::{AssignmentOutcome, NewOrderRequest};

/// Error types for submit order use case
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubmitOrderError {
    /// Intake record rejected before reaching the engine
    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
}

impl SubmitOrderError {
    /// Label used for the errors_total metric
    pub fn kind(&self) -> &'static str {
        match self {
            SubmitOrderError::ValidationFailed(_) => "invalid_input",
            SubmitOrderError::Engine(_) => "engine",
        }
    }
}

/// Submit Order Use Case
pub struct SubmitOrderUseCase {
    validator: OrderValidator,
}

impl SubmitOrderUseCase {
    pub fn new(validator: OrderValidator) -> Self {
        Self { validator }
    }

    /// Executes the submit order use case
    ///
    /// # Returns
    /// * `Ok(AssignmentOutcome)` - assigned, no match, or no rider available
    /// * `Err(SubmitOrderError)` - the order was not registered
    pub fn execute<M: BatchMatcher>(
        &self,
        engine: &mut BatchingEngine<M>,
        request: NewOrderRequest,
    ) -> Result<AssignmentOutcome, SubmitOrderError> {
        // Step 1: Validate the order
        self.validator.validate_against(&request, engine.orders())?;

        // Step 2: Match and assign
        Ok(engine.submit(request)?)
    }

    pub fn validator(&self) -> &OrderValidator {
        &self.validator
    }
}

impl Default for SubmitOrderUseCase {
    fn default() -> Self {
        Self::new(OrderValidator::new())
    }
}
