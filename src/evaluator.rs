//! Evaluator construction.
//!
//! This module provides:
//! - Composite group-key selectors built from ordered field names
//! - Filter predicates built from field-name to candidate-value maps
//! - A concurrent cache of built evaluators keyed on their specification
//!
//! Field accessors are resolved once per build; evaluating a record then
//! runs a fixed sequence of accessor calls and comparisons.

pub mod cache;
pub mod filter;
pub mod group_key;

pub use cache::{CacheKey, CacheStats, EvaluatorCache, EvaluatorKind};
pub use filter::{build_filter_predicate, FilterPredicate, FilterSpec};
pub use group_key::{build_group_key_selector, CompositeKey, GroupKeySelector};
