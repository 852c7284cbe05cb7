//! Priority-ordered batching rules
//!
//! Each rule is a predicate between an existing order `E` and the incoming
//! order `N`. Rules are tried in priority order; within a rule the registry is
//! scanned in submission order and the first qualifying order wins. All rules
//! share the ready-time window `|E.ready_time - N.ready_time| <= time`.
//!
//! | # | predicate                                   |
//! |---|---------------------------------------------|
//! | 1 | same kitchen, same customer                 |
//! | 2 | same customer, different kitchen            |
//! | 3 | same kitchen, different customer            |
//! | 4 | same customer                               |
//! | 5 | kitchens within the spatial tolerance       |
//! | 6 | same kitchen                                |

use super::traits::{BatchMatcher, RuleMatch};
use crate::domain::order::Order;
use crate::domain::registry::OrderRegistry;
use crate::shared::geometry::distance;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default ready-time window (minutes)
pub const DEFAULT_TIME_TOLERANCE: u64 = 10;

/// Default kitchen proximity for rule 5 (plane units)
pub const DEFAULT_SPATIAL_TOLERANCE: f64 = 1.0;

/// Thresholds shared by every rule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchTolerance {
    /// Max ready-time difference, inclusive
    pub time: u64,
    /// Max kitchen distance for rule 5, inclusive
    pub spatial: f64,
}

impl Default for MatchTolerance {
    fn default() -> Self {
        Self {
            time: DEFAULT_TIME_TOLERANCE,
            spatial: DEFAULT_SPATIAL_TOLERANCE,
        }
    }
}

/// One batching rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchingRule {
    SameKitchenSameCustomer,
    SameCustomerOtherKitchen,
    SameKitchenOtherCustomer,
    SameCustomer,
    NearbyKitchen,
    SameKitchen,
}

impl BatchingRule {
    /// Evaluation order, highest priority first
    pub const PRIORITY: [BatchingRule; 6] = [
        BatchingRule::SameKitchenSameCustomer,
        BatchingRule::SameCustomerOtherKitchen,
        BatchingRule::SameKitchenOtherCustomer,
        BatchingRule::SameCustomer,
        BatchingRule::NearbyKitchen,
        BatchingRule::SameKitchen,
    ];

    /// Priority number, 1 is tried first
    pub fn number(self) -> u8 {
        match self {
            BatchingRule::SameKitchenSameCustomer => 1,
            BatchingRule::SameCustomerOtherKitchen => 2,
            BatchingRule::SameKitchenOtherCustomer => 3,
            BatchingRule::SameCustomer => 4,
            BatchingRule::NearbyKitchen => 5,
            BatchingRule::SameKitchen => 6,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        Self::PRIORITY.iter().copied().find(|r| r.number() == number)
    }

    /// Does `existing` batch with `incoming` under this rule
    pub fn matches(self, existing: &Order, incoming: &Order, tolerance: &MatchTolerance) -> bool {
        if existing.ready_time_gap(incoming) > tolerance.time {
            return false;
        }

        let same_kitchen = existing.kitchen_id == incoming.kitchen_id;
        let same_customer = existing.customer_id == incoming.customer_id;

        match self {
            BatchingRule::SameKitchenSameCustomer => same_kitchen && same_customer,
            BatchingRule::SameCustomerOtherKitchen => same_customer && !same_kitchen,
            BatchingRule::SameKitchenOtherCustomer => same_kitchen && !same_customer,
            BatchingRule::SameCustomer => same_customer,
            BatchingRule::NearbyKitchen => {
                distance(existing.kitchen_location, incoming.kitchen_location) <= tolerance.spatial
            }
            BatchingRule::SameKitchen => same_kitchen,
        }
    }
}

impl fmt::Display for BatchingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rule {}", self.number())
    }
}

/// The six-rule matcher
#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    tolerance: MatchTolerance,
}

impl RuleEngine {
    pub fn new(tolerance: MatchTolerance) -> Self {
        Self { tolerance }
    }

    pub fn tolerance(&self) -> &MatchTolerance {
        &self.tolerance
    }

    pub fn rules(&self) -> &'static [BatchingRule] {
        &BatchingRule::PRIORITY
    }

    /// Orders that may serve as a partner for `incoming`
    ///
    /// The incoming order never partners with itself, and orders already
    /// bound to a rider are out of the pool.
    fn candidates<'a>(
        pool: &'a OrderRegistry,
        incoming: &'a Order,
    ) -> impl Iterator<Item = &'a Order> + 'a {
        pool.iter()
            .filter(move |existing| existing.id != incoming.id && existing.is_unassigned())
    }

    /// First order satisfying a single rule, in registry order
    pub fn scan<'a>(
        &self,
        rule: BatchingRule,
        pool: &'a OrderRegistry,
        incoming: &'a Order,
    ) -> Option<&'a Order> {
        Self::candidates(pool, incoming).find(|existing| rule.matches(existing, incoming, &self.tolerance))
    }
}

impl BatchMatcher for RuleEngine {
    fn find_partner(&self, pool: &OrderRegistry, incoming: &Order) -> Option<RuleMatch> {
        self.rules().iter().find_map(|&rule| {
            self.scan(rule, pool, incoming).map(|existing| RuleMatch {
                rule,
                order_id: existing.id,
            })
        })
    }
}
