//! Order and rider registries
//!
//! Both registries keep entities in insertion order (rule scans and the
//! nearest-rider tie-break depend on it) plus an id → index map for direct
//! lookups. Neither supports removal.

use super::error::EngineError;
use super::order::Order;
use super::rider::Rider;
use crate::shared::protocol::{OrderId, RiderId, RiderSpec};
use std::collections::BTreeMap;

/// Append-only collection of every submitted order
#[derive(Debug, Clone, Default)]
pub struct OrderRegistry {
    orders: Vec<Order>,
    // order_id -> Vec 索引
    index: BTreeMap<OrderId, usize>,
}

impl OrderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an order, rejecting an identity that is already present
    pub fn insert(&mut self, order: Order) -> Result<usize, EngineError> {
        if self.index.contains_key(&order.id) {
            return Err(EngineError::DuplicateOrder(order.id));
        }
        let position = self.orders.len();
        self.index.insert(order.id, position);
        self.orders.push(order);
        Ok(position)
    }

    pub fn get(&self, order_id: OrderId) -> Option<&Order> {
        self.index.get(&order_id).map(|&i| &self.orders[i])
    }

    pub(crate) fn get_mut(&mut self, order_id: OrderId) -> Option<&mut Order> {
        match self.index.get(&order_id) {
            Some(&i) => Some(&mut self.orders[i]),
            None => None,
        }
    }

    pub fn contains(&self, order_id: OrderId) -> bool {
        self.index.contains_key(&order_id)
    }

    /// Orders in submission order
    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

/// Fixed roster of riders
#[derive(Debug, Clone, Default)]
pub struct RiderRegistry {
    riders: Vec<Rider>,
    index: BTreeMap<RiderId, usize>,
}

impl RiderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the roster in the given order
    pub fn from_roster<I>(roster: I) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = RiderSpec>,
    {
        let mut registry = Self::new();
        for spec in roster {
            registry.register(Rider::from(spec))?;
        }
        Ok(registry)
    }

    /// Appends a rider. Duplicate ids and non-finite locations are rejected.
    pub fn register(&mut self, rider: Rider) -> Result<(), EngineError> {
        if self.index.contains_key(&rider.id) {
            return Err(EngineError::DuplicateRider(rider.id));
        }
        if !rider.location.is_finite() {
            return Err(EngineError::InvalidRiderLocation {
                rider_id: rider.id,
                location: rider.location,
            });
        }
        self.index.insert(rider.id, self.riders.len());
        self.riders.push(rider);
        Ok(())
    }

    pub fn get(&self, rider_id: RiderId) -> Option<&Rider> {
        self.index.get(&rider_id).map(|&i| &self.riders[i])
    }

    pub(crate) fn get_mut(&mut self, rider_id: RiderId) -> Option<&mut Rider> {
        match self.index.get(&rider_id) {
            Some(&i) => Some(&mut self.riders[i]),
            None => None,
        }
    }

    /// Riders in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Rider> {
        self.riders.iter()
    }

    pub fn len(&self) -> usize {
        self.riders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.riders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::geometry::Location;

    fn order(id: OrderId) -> Order {
        Order::new(id, 1, 1, 10, Location::default())
    }

    #[test]
    fn test_insert_keeps_submission_order() {
        let mut registry = OrderRegistry::new();
        for id in [30, 10, 20] {
            registry.insert(order(id)).unwrap();
        }
        let ids: Vec<_> = registry.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![30, 10, 20]);
        assert_eq!(registry.get(10).map(|o| o.id), Some(10));
        assert!(registry.get(99).is_none());
    }

    #[test]
    fn test_duplicate_order_rejected() {
        let mut registry = OrderRegistry::new();
        registry.insert(order(1)).unwrap();
        assert_eq!(registry.insert(order(1)), Err(EngineError::DuplicateOrder(1)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_roster_duplicate_rider_rejected() {
        let roster = vec![
            RiderSpec { rider_id: 1, location: Location::new(0.0, 0.0) },
            RiderSpec { rider_id: 1, location: Location::new(1.0, 1.0) },
        ];
        let result = RiderRegistry::from_roster(roster);
        assert!(matches!(result, Err(EngineError::DuplicateRider(1))));
    }

    #[test]
    fn test_roster_non_finite_location_rejected() {
        for bad in [
            Location::new(f64::NAN, 0.0),
            Location::new(0.0, f64::INFINITY),
            Location::new(f64::NEG_INFINITY, f64::NAN),
        ] {
            let roster = vec![
                RiderSpec { rider_id: 1, location: Location::new(0.0, 0.0) },
                RiderSpec { rider_id: 2, location: bad },
            ];
            let result = RiderRegistry::from_roster(roster);
            assert!(matches!(
                result,
                Err(EngineError::InvalidRiderLocation { rider_id: 2, .. })
            ));
        }

        let mut registry = RiderRegistry::new();
        let rejected = registry.register(Rider::from(RiderSpec {
            rider_id: 4,
            location: Location::new(f64::NAN, f64::NAN),
        }));
        assert!(rejected.is_err());
        assert!(registry.is_empty());
        assert!(registry.get(4).is_none());
    }

    #[test]
    fn test_roster_order_preserved() {
        let roster = (1..=3).map(|i| RiderSpec {
            rider_id: 10 - i,
            location: Location::new(i as f64, i as f64),
        });
        let registry = RiderRegistry::from_roster(roster).unwrap();
        let ids: Vec<_> = registry.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![9, 8, 7]);
    }
}
