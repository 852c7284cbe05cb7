//! Order entity and its lifecycle

use crate::shared::geometry::Location;
use crate::shared::protocol::{
    CustomerId, KitchenId, NewOrderRequest, OrderId, OrderStatus, OrderView, ReadyTime, RiderId,
};

/// A delivery order registered with the engine
///
/// Identity and kitchen data are immutable after submission. The status and
/// rider reference only change through the engine, which keeps
/// `assigned_rider.is_some() == status.is_bound()` at all times.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: OrderId,
    pub kitchen_id: KitchenId,
    pub customer_id: CustomerId,
    pub ready_time: ReadyTime,
    pub kitchen_location: Location,
    status: OrderStatus,
    assigned_rider: Option<RiderId>,
}

impl Order {
    pub fn new(
        id: OrderId,
        kitchen_id: KitchenId,
        customer_id: CustomerId,
        ready_time: ReadyTime,
        kitchen_location: Location,
    ) -> Self {
        Self {
            id,
            kitchen_id,
            customer_id,
            ready_time,
            kitchen_location,
            status: OrderStatus::Created,
            assigned_rider: None,
        }
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Weak reference to the rider carrying this order
    pub fn assigned_rider(&self) -> Option<RiderId> {
        self.assigned_rider
    }

    /// Still waiting for a batching partner
    pub fn is_unassigned(&self) -> bool {
        self.status == OrderStatus::Created
    }

    /// Absolute ready-time difference to another order
    #[inline]
    pub fn ready_time_gap(&self, other: &Order) -> u64 {
        self.ready_time.abs_diff(other.ready_time)
    }

    pub(crate) fn bind_to(&mut self, rider_id: RiderId) {
        debug_assert!(self.status.can_advance_to(OrderStatus::Assigned));
        self.assigned_rider = Some(rider_id);
        self.status = OrderStatus::Assigned;
    }

    /// Moves to a later lifecycle state. Caller checks `can_advance_to` first.
    pub(crate) fn advance(&mut self, next: OrderStatus) {
        debug_assert!(self.status.can_advance_to(next));
        debug_assert!(next != OrderStatus::Assigned);
        self.status = next;
    }

    pub fn view(&self) -> OrderView {
        OrderView {
            order_id: self.id,
            kitchen_id: self.kitchen_id,
            customer_id: self.customer_id,
            ready_time: self.ready_time,
            kitchen_location: self.kitchen_location,
            status: self.status,
            assigned_rider: self.assigned_rider,
        }
    }
}

impl From<NewOrderRequest> for Order {
    fn from(request: NewOrderRequest) -> Self {
        Order::new(
            request.order_id,
            request.kitchen_id,
            request.customer_id,
            request.ready_time,
            request.kitchen_location,
        )
    }
}
