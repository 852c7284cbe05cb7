//! Rider entity

use crate::shared::geometry::Location;
use crate::shared::protocol::{OrderId, RiderId, RiderSpec, RiderView};

/// A rider with a fixed position for the whole run
#[derive(Debug, Clone, PartialEq)]
pub struct Rider {
    pub id: RiderId,
    pub location: Location,
    assigned_orders: Vec<OrderId>,
    // 与 assigned_orders.len() 保持一致
    order_count: usize,
}

impl Rider {
    pub fn new(id: RiderId, location: Location) -> Self {
        Self {
            id,
            location,
            assigned_orders: Vec::new(),
            order_count: 0,
        }
    }

    /// Orders bound to this rider, in binding order
    pub fn assigned_orders(&self) -> &[OrderId] {
        &self.assigned_orders
    }

    pub fn order_count(&self) -> usize {
        self.order_count
    }

    pub(crate) fn push_order(&mut self, order_id: OrderId) {
        self.assigned_orders.push(order_id);
        self.order_count += 1;
        debug_assert_eq!(self.order_count, self.assigned_orders.len());
    }

    pub fn view(&self) -> RiderView {
        RiderView {
            rider_id: self.id,
            location: self.location,
            order_count: self.order_count,
            assigned_orders: self.assigned_orders.clone(),
        }
    }
}

impl From<RiderSpec> for Rider {
    fn from(spec: RiderSpec) -> Self {
        Rider::new(spec.rider_id, spec.location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_tracks_sequence() {
        let mut rider = Rider::new(1, Location::new(2.0, 2.0));
        assert_eq!(rider.order_count(), 0);
        assert!(rider.assigned_orders().is_empty());

        rider.push_order(5);
        rider.push_order(6);
        assert_eq!(rider.assigned_orders(), &[5, 6]);
        assert_eq!(rider.order_count(), 2);
        assert_eq!(rider.view().order_count, rider.view().assigned_orders.len());
    }
}
