/// Domain Layer - Matching Module
///
/// Decides which existing order a newly submitted order is batched with.
///
/// ## Production Implementation
/// - `RuleEngine`: six fixed rules tried in priority order, first match wins
///   - Linear scan of the registry per rule, no scoring
///   - Deterministic for a given registry order
///
/// ## Trait Abstraction
/// The `BatchMatcher` trait lets the batching engine run with a different
/// matcher in tests.

pub mod rules;
pub mod traits;

pub use rules::{BatchingRule, MatchTolerance, RuleEngine};
pub use traits::{BatchMatcher, RuleMatch};
