//! Intake records, outcome messages and snapshot views
//!
//! Everything that crosses the boundary between the batching core and its
//! collaborators (intake, reporting sink, visualization feed) is defined
//! here so the domain layer never depends on a presentation format.

use crate::shared::geometry::Location;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type OrderId = u64;
pub type KitchenId = u64;
pub type CustomerId = u64;
pub type RiderId = u64;

/// 订单就绪时间（分钟）
pub type ReadyTime = i64;

/// Order lifecycle status
///
/// Transitions only move forward:
/// `Created -> Assigned -> (WaitingPickup ->) Delivered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Created,
    Assigned,
    WaitingPickup,
    Delivered,
}

impl OrderStatus {
    /// Whether the lifecycle allows moving from `self` to `next`
    pub fn can_advance_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Created, Assigned)
                | (Assigned, WaitingPickup)
                | (Assigned, Delivered)
                | (WaitingPickup, Delivered)
        )
    }

    /// Assigned or any later state
    pub fn is_bound(self) -> bool {
        !matches!(self, OrderStatus::Created)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Created => "created",
            OrderStatus::Assigned => "assigned",
            OrderStatus::WaitingPickup => "waiting_pickup",
            OrderStatus::Delivered => "delivered",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 新订单请求，由接入层提交
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrderRequest {
    pub order_id: OrderId,
    pub kitchen_id: KitchenId,
    pub customer_id: CustomerId,
    pub ready_time: ReadyTime,
    pub kitchen_location: Location,
}

/// 订单状态推进请求（取餐 / 送达）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdvanceOrderRequest {
    pub order_id: OrderId,
    pub status: OrderStatus,
}

/// One roster entry supplied at start-up
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiderSpec {
    pub rider_id: RiderId,
    pub location: Location,
}

/// Order as seen by collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderView {
    pub order_id: OrderId,
    pub kitchen_id: KitchenId,
    pub customer_id: CustomerId,
    pub ready_time: ReadyTime,
    pub kitchen_location: Location,
    pub status: OrderStatus,
    pub assigned_rider: Option<RiderId>,
}

/// Rider as seen by collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiderView {
    pub rider_id: RiderId,
    pub location: Location,
    pub order_count: usize,
    pub assigned_orders: Vec<OrderId>,
}

/// Successful batch assignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentEvent {
    /// The order that triggered matching
    pub order_id: OrderId,
    /// Existing order it was batched with
    pub matched_order_id: OrderId,
    /// Priority number (1..=6) of the rule that produced the match
    pub rule: u8,
    pub rider_id: RiderId,
    /// Distance from the matched kitchen to the rider
    pub distance: f64,
    /// Full detail of every order bound in this step, matched order first
    pub orders: Vec<OrderView>,
    /// Rider's cumulative assignment list after binding
    pub rider_orders: Vec<OrderId>,
}

/// 每次提交订单后的结果，发送给报告层
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AssignmentOutcome {
    Assigned(AssignmentEvent),
    NoMatch {
        order_id: OrderId,
    },
    NoRiderAvailable {
        order_id: OrderId,
        matched_order_id: OrderId,
        rule: u8,
    },
}

impl AssignmentOutcome {
    /// Identity of the submitted order this outcome belongs to
    pub fn order_id(&self) -> OrderId {
        match self {
            AssignmentOutcome::Assigned(event) => event.order_id,
            AssignmentOutcome::NoMatch { order_id } => *order_id,
            AssignmentOutcome::NoRiderAvailable { order_id, .. } => *order_id,
        }
    }

    /// Short label used for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            AssignmentOutcome::Assigned(_) => "assigned",
            AssignmentOutcome::NoMatch { .. } => "no_match",
            AssignmentOutcome::NoRiderAvailable { .. } => "no_rider_available",
        }
    }
}

/// Point-in-time view of both registries (visualization feed)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub orders: Vec<OrderView>,
    pub riders: Vec<RiderView>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::*;

    #[test]
    fn test_forward_transitions() {
        assert!(Created.can_advance_to(Assigned));
        assert!(Assigned.can_advance_to(WaitingPickup));
        assert!(Assigned.can_advance_to(Delivered));
        assert!(WaitingPickup.can_advance_to(Delivered));
    }

    #[test]
    fn test_no_regression_or_skip() {
        assert!(!Assigned.can_advance_to(Created));
        assert!(!Delivered.can_advance_to(WaitingPickup));
        assert!(!Created.can_advance_to(Delivered));
        assert!(!Created.can_advance_to(WaitingPickup));
        assert!(!Assigned.can_advance_to(Assigned));
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = AssignmentOutcome::NoMatch { order_id: 7 };
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("\"outcome\":\"no_match\""));
        assert!(json.contains("\"order_id\":7"));

        let back: AssignmentOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(back.order_id(), 7);
        assert_eq!(back.kind(), "no_match");
    }

    #[test]
    fn test_request_from_json_line() {
        let line = r#"{"order_id":3,"kitchen_id":2,"customer_id":2,"ready_time":10,"kitchen_location":{"x":1.5,"y":-2.0}}"#;
        let request: NewOrderRequest = serde_json::from_str(line).unwrap();
        assert_eq!(request.order_id, 3);
        assert_eq!(request.kitchen_location, Location::new(1.5, -2.0));
    }
}
