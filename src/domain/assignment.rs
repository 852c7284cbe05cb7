//! Nearest-rider selection and order binding
//!
//! Binding touches both registries. Every precondition is checked before the
//! first mutation, so a failed assignment leaves orders and riders exactly as
//! they were.

use super::error::{AssignmentError, EngineError};
use super::registry::{OrderRegistry, RiderRegistry};
use crate::shared::geometry::{distance, Location};
use crate::shared::protocol::{OrderId, OrderStatus, RiderId};

/// Selected rider and its distance to the pickup point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiderChoice {
    pub rider_id: RiderId,
    pub distance: f64,
}

/// Rider closest to `pickup`
///
/// Linear scan in registration order with a strict `<` comparison, so of
/// several equally close riders the earliest registered one is returned.
/// Non-finite distances never win.
pub fn nearest_rider(riders: &RiderRegistry, pickup: Location) -> Option<RiderChoice> {
    let mut best: Option<RiderChoice> = None;

    for rider in riders.iter() {
        let d = distance(pickup, rider.location);
        if !d.is_finite() {
            continue;
        }
        match best {
            Some(current) if d >= current.distance => {}
            _ => {
                best = Some(RiderChoice {
                    rider_id: rider.id,
                    distance: d,
                })
            }
        }
    }

    best
}

/// Binds every order in `batch` to `rider_id`
///
/// Each order gets its rider reference and `Assigned` status, and is appended
/// to the rider's sequence in batch order.
pub fn bind_batch(
    orders: &mut OrderRegistry,
    riders: &mut RiderRegistry,
    batch: &[OrderId],
    rider_id: RiderId,
) -> Result<(), AssignmentError> {
    if riders.get(rider_id).is_none() {
        return Err(EngineError::UnknownRider(rider_id).into());
    }
    for (i, &order_id) in batch.iter().enumerate() {
        let order = orders.get(order_id).ok_or(EngineError::UnknownOrder(order_id))?;
        if !order.status().can_advance_to(OrderStatus::Assigned) || batch[..i].contains(&order_id) {
            return Err(AssignmentError::NotAssignable {
                order_id,
                status: order.status(),
            });
        }
    }

    // 以下不会失败：前置条件已全部检查
    for &order_id in batch {
        if let Some(order) = orders.get_mut(order_id) {
            order.bind_to(rider_id);
        }
        if let Some(rider) = riders.get_mut(rider_id) {
            rider.push_order(order_id);
        }
    }

    Ok(())
}

/// Assigns a batch to the rider nearest to its first order's kitchen
///
/// The first id is the matched (anchor) order. With an empty roster this
/// returns `NoRiderAvailable` and nothing changes.
pub fn assign(
    orders: &mut OrderRegistry,
    riders: &mut RiderRegistry,
    batch: &[OrderId],
) -> Result<RiderChoice, AssignmentError> {
    let anchor = batch
        .first()
        .and_then(|&id| orders.get(id))
        .ok_or_else(|| EngineError::UnknownOrder(batch.first().copied().unwrap_or_default()))?;

    let choice = nearest_rider(riders, anchor.kitchen_location).ok_or(AssignmentError::NoRiderAvailable)?;
    bind_batch(orders, riders, batch, choice.rider_id)?;
    Ok(choice)
}
