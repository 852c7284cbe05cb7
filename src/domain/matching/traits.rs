/// BatchMatcher Trait - Domain Layer Abstraction
///
/// A batch matcher looks at the order registry and decides which existing
/// order, if any, a newly submitted order should travel with.
///
/// ## Implementations
/// - `RuleEngine`: the fixed six-rule priority list
///
/// The batching engine is generic over this trait so tests can drive the
/// assignment path with a scripted matcher.

use super::rules::BatchingRule;
use crate::domain::order::Order;
use crate::domain::registry::OrderRegistry;
use crate::shared::protocol::OrderId;

/// A batching partner together with the rule that selected it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleMatch {
    pub rule: BatchingRule,
    pub order_id: OrderId,
}

/// Finds a batching partner for an incoming order
pub trait BatchMatcher {
    /// Scans `pool` for a partner of `incoming`
    ///
    /// `pool` already contains `incoming` (the registry is appended to before
    /// matching). Returns `None` when nothing qualifies, which is an
    /// expected outcome rather than an error.
    fn find_partner(&self, pool: &OrderRegistry, incoming: &Order) -> Option<RuleMatch>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::geometry::Location;

    // Always picks the oldest order, whatever it is
    struct OldestFirst;

    impl BatchMatcher for OldestFirst {
        fn find_partner(&self, pool: &OrderRegistry, _incoming: &Order) -> Option<RuleMatch> {
            pool.iter().next().map(|o| RuleMatch {
                rule: BatchingRule::SameKitchen,
                order_id: o.id,
            })
        }
    }

    #[test]
    fn test_trait_object_usable() {
        let matcher: Box<dyn BatchMatcher> = Box::new(OldestFirst);
        let mut pool = OrderRegistry::new();
        let incoming = Order::new(2, 1, 1, 0, Location::default());

        assert!(matcher.find_partner(&pool, &incoming).is_none());

        pool.insert(Order::new(1, 9, 9, 500, Location::default())).unwrap();
        let found = matcher.find_partner(&pool, &incoming).unwrap();
        assert_eq!(found.order_id, 1);
    }
}
