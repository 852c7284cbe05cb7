/// Advance Order Use Case
///
/// Moves an assigned order further along its lifecycle once the rider picks
/// it up or delivers it. Only forward moves past `assigned` are accepted;
/// `assigned` itself is reached exclusively through batch assignment.

use crate::domain::batcher::BatchingEngine;
use crate::domain::error::EngineError;
use crate::domain::matching::BatchMatcher;
use crate::shared::protocol::{AdvanceOrderRequest, OrderId, OrderStatus};

/// Result of advancing an order
#[derive(Debug, Clone, PartialEq)]
pub struct AdvanceOrderResult {
    pub order_id: OrderId,
    pub status: OrderStatus,
}

/// Error types for advance order use case
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AdvanceOrderError {
    #[error("status {0} cannot be requested")]
    UnsupportedTarget(OrderStatus),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
}

/// Advance Order Use Case
#[derive(Debug, Default)]
pub struct AdvanceOrderUseCase;

impl AdvanceOrderUseCase {
    pub fn new() -> Self {
        Self
    }

    pub fn execute<M: BatchMatcher>(
        &self,
        engine: &mut BatchingEngine<M>,
        request: AdvanceOrderRequest,
    ) -> Result<AdvanceOrderResult, AdvanceOrderError> {
        match request.status {
            OrderStatus::WaitingPickup => engine.mark_waiting_pickup(request.order_id)?,
            OrderStatus::Delivered => engine.mark_delivered(request.order_id)?,
            other => return Err(AdvanceOrderError::UnsupportedTarget(other)),
        }

        Ok(AdvanceOrderResult {
            order_id: request.order_id,
            status: request.status,
        })
    }
}
