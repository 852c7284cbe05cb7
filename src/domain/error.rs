//! Domain error types
//!
//! Expected outcomes of a submission (no rule matched, no rider available)
//! are reported through `AssignmentOutcome`; the enums here cover the cases
//! where a caller asked for something the registries cannot do.

use crate::shared::geometry::Location;
use crate::shared::protocol::{OrderId, OrderStatus, RiderId};

/// 引擎操作错误
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("order {0} is already registered")]
    DuplicateOrder(OrderId),

    #[error("rider {0} is already registered")]
    DuplicateRider(RiderId),

    /// NaN 或无穷坐标无法参与距离比较
    #[error("rider {rider_id} has non-finite location {location}")]
    InvalidRiderLocation { rider_id: RiderId, location: Location },

    #[error("unknown order {0}")]
    UnknownOrder(OrderId),

    #[error("unknown rider {0}")]
    UnknownRider(RiderId),

    #[error("order {order_id} cannot move from {from} to {to}")]
    InvalidTransition {
        order_id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    },
}

/// 派单错误
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssignmentError {
    /// Rider registry is empty
    #[error("no rider available")]
    NoRiderAvailable,

    #[error("order {order_id} is {status}, only created orders can be assigned")]
    NotAssignable {
        order_id: OrderId,
        status: OrderStatus,
    },

    #[error(transparent)]
    Engine(#[from] EngineError),
}
