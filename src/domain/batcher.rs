//! Batching engine
//!
//! Owns the order and rider registries and runs the whole submission step:
//! register → find partner → pick nearest rider → bind. Registries are only
//! reachable through `&self` accessors, so every mutation goes through the
//! methods below and the cross-registry invariants hold between calls.

use super::assignment::{self, RiderChoice};
use super::error::{AssignmentError, EngineError};
use super::matching::{BatchMatcher, MatchTolerance, RuleEngine, RuleMatch};
use super::order::Order;
use super::registry::{OrderRegistry, RiderRegistry};
use crate::shared::protocol::{
    AssignmentEvent, AssignmentOutcome, EngineSnapshot, NewOrderRequest, OrderId, OrderStatus,
    RiderSpec,
};
use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};

/// Engine tunables
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchingConfig {
    /// Rule thresholds
    pub tolerance: MatchTolerance,

    /// Move freshly assigned orders straight to `waiting_pickup`
    pub auto_waiting_pickup: bool,
}

/// Single-owner batching engine
///
/// # Type Parameters
/// * `M` - partner search strategy, the six-rule `RuleEngine` by default
#[derive(Debug, Clone)]
pub struct BatchingEngine<M: BatchMatcher = RuleEngine> {
    orders: OrderRegistry,
    riders: RiderRegistry,
    matcher: M,
    config: BatchingConfig,
}

impl BatchingEngine<RuleEngine> {
    /// Creates an engine with the standard rule set and a fixed roster
    pub fn new<I>(config: BatchingConfig, roster: I) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = RiderSpec>,
    {
        Self::with_matcher(RuleEngine::new(config.tolerance), config, roster)
    }
}

impl<M: BatchMatcher> BatchingEngine<M> {
    pub fn with_matcher<I>(matcher: M, config: BatchingConfig, roster: I) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = RiderSpec>,
    {
        Ok(Self {
            orders: OrderRegistry::new(),
            riders: RiderRegistry::from_roster(roster)?,
            matcher,
            config,
        })
    }

    /// Registers a new order and tries to batch and assign it
    ///
    /// The order is appended to the registry first and stays there whatever
    /// the outcome. `NoMatch` and `NoRiderAvailable` are normal outcomes; the
    /// `Err` side is reserved for requests the registry cannot accept.
    pub fn submit(&mut self, request: NewOrderRequest) -> Result<AssignmentOutcome, EngineError> {
        let order_id = request.order_id;
        self.orders.insert(Order::from(request))?;

        let found = match self.orders.get(order_id) {
            Some(incoming) => self.matcher.find_partner(&self.orders, incoming),
            None => return Err(EngineError::UnknownOrder(order_id)),
        };

        let Some(RuleMatch { rule, order_id: matched_order_id }) = found else {
            return Ok(AssignmentOutcome::NoMatch { order_id });
        };

        // 批次：先匹配到的旧订单，再新订单
        let batch: SmallVec<[OrderId; 2]> = smallvec![matched_order_id, order_id];

        let choice = match assignment::assign(&mut self.orders, &mut self.riders, &batch) {
            Ok(choice) => choice,
            Err(AssignmentError::NoRiderAvailable) => {
                return Ok(AssignmentOutcome::NoRiderAvailable {
                    order_id,
                    matched_order_id,
                    rule: rule.number(),
                })
            }
            Err(AssignmentError::NotAssignable { order_id, status }) => {
                return Err(EngineError::InvalidTransition {
                    order_id,
                    from: status,
                    to: OrderStatus::Assigned,
                })
            }
            Err(AssignmentError::Engine(e)) => return Err(e),
        };

        if self.config.auto_waiting_pickup {
            for &id in &batch {
                self.advance(id, OrderStatus::WaitingPickup)?;
            }
        }

        Ok(AssignmentOutcome::Assigned(self.assignment_event(
            order_id,
            matched_order_id,
            rule.number(),
            choice,
            &batch,
        )))
    }

    fn assignment_event(
        &self,
        order_id: OrderId,
        matched_order_id: OrderId,
        rule: u8,
        choice: RiderChoice,
        batch: &[OrderId],
    ) -> AssignmentEvent {
        AssignmentEvent {
            order_id,
            matched_order_id,
            rule,
            rider_id: choice.rider_id,
            distance: choice.distance,
            orders: batch
                .iter()
                .filter_map(|&id| self.orders.get(id))
                .map(Order::view)
                .collect(),
            rider_orders: self
                .riders
                .get(choice.rider_id)
                .map(|r| r.assigned_orders().to_vec())
                .unwrap_or_default(),
        }
    }

    /// `assigned -> waiting_pickup`
    pub fn mark_waiting_pickup(&mut self, order_id: OrderId) -> Result<(), EngineError> {
        self.advance(order_id, OrderStatus::WaitingPickup)
    }

    /// `assigned | waiting_pickup -> delivered`
    pub fn mark_delivered(&mut self, order_id: OrderId) -> Result<(), EngineError> {
        self.advance(order_id, OrderStatus::Delivered)
    }

    fn advance(&mut self, order_id: OrderId, next: OrderStatus) -> Result<(), EngineError> {
        let order = self
            .orders
            .get_mut(order_id)
            .ok_or(EngineError::UnknownOrder(order_id))?;

        // Assigned 只能通过派单进入
        if next == OrderStatus::Assigned || !order.status().can_advance_to(next) {
            return Err(EngineError::InvalidTransition {
                order_id,
                from: order.status(),
                to: next,
            });
        }
        order.advance(next);
        Ok(())
    }

    pub fn orders(&self) -> &OrderRegistry {
        &self.orders
    }

    pub fn riders(&self) -> &RiderRegistry {
        &self.riders
    }

    pub fn config(&self) -> &BatchingConfig {
        &self.config
    }

    /// Visualization feed: every order and rider, in registry order
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            orders: self.orders.iter().map(Order::view).collect(),
            riders: self.riders.iter().map(|r| r.view()).collect(),
        }
    }
}
