// crates/onex-navigation/src/guard.rs
// ============================================================================
// Module: Onex Transition Guards
// Description: Composable boolean algebra over named context facts.
// Purpose: Evaluate transition guards and state preconditions deterministically.
// Dependencies: onex-core, serde, smallvec
// ============================================================================

//! ## Overview
//! Guards are composable boolean conditions over a context of named schema
//! values. The logical operators (All, Any, Not) are universal, while fact
//! comparisons are the boundary where domain data is consulted. Evaluation
//! short-circuits and fails closed: a missing or type-mismatched fact never
//! satisfies a comparison.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use onex_core::SchemaValue;
use serde::Deserialize;
use serde::Serialize;
use smallvec::SmallVec;

// ============================================================================
// SECTION: Guard Context
// ============================================================================

/// Evaluation context holding named facts.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GuardContext {
    /// Facts keyed by name.
    facts: BTreeMap<String, SchemaValue>,
}

impl GuardContext {
    /// Creates an empty context.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            facts: BTreeMap::new(),
        }
    }

    /// Creates a context from a fact map.
    #[must_use]
    pub const fn from_facts(facts: BTreeMap<String, SchemaValue>) -> Self {
        Self {
            facts,
        }
    }

    /// Returns a context with the fact added.
    #[must_use]
    pub fn with_fact(mut self, key: impl Into<String>, value: SchemaValue) -> Self {
        self.facts.insert(key.into(), value);
        self
    }

    /// Looks up a fact by name.
    #[must_use]
    pub fn fact(&self, key: &str) -> Option<&SchemaValue> {
        self.facts.get(key)
    }
}

// ============================================================================
// SECTION: Fact Comparators
// ============================================================================

/// Comparator applied to a context fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactComparator {
    /// Fact equals the expected value.
    Equals,
    /// Fact differs from the expected value.
    NotEquals,
    /// Fact is present, regardless of value.
    Exists,
    /// Fact is absent.
    NotExists,
    /// Fact is numeric and strictly greater than the expected number.
    GreaterThan,
    /// Fact is numeric and strictly less than the expected number.
    LessThan,
}

// ============================================================================
// SECTION: Guard Conditions
// ============================================================================

/// Composable guard condition over context facts.
///
/// An empty [`GuardCondition::All`] is trivially satisfied and serves as the
/// guard for unconditioned transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardCondition {
    /// All sub-conditions must hold; short-circuits on the first failure.
    All(SmallVec<[Box<Self>; 4]>),
    /// At least one sub-condition must hold; short-circuits on the first success.
    Any(SmallVec<[Box<Self>; 4]>),
    /// Inverts the sub-condition.
    Not(Box<Self>),
    /// Atomic comparison against a named fact.
    Fact {
        /// Fact name consulted in the context.
        key: String,
        /// Comparator applied to the fact.
        comparator: FactComparator,
        /// Expected value for value comparators; ignored by existence checks.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expected: Option<SchemaValue>,
    },
}

impl Default for GuardCondition {
    fn default() -> Self {
        Self::All(SmallVec::new())
    }
}

impl GuardCondition {
    /// Returns the trivially satisfied guard.
    #[must_use]
    pub fn always() -> Self {
        Self::default()
    }

    /// Builds an equality fact condition.
    #[must_use]
    pub fn fact_equals(key: impl Into<String>, expected: SchemaValue) -> Self {
        Self::Fact {
            key: key.into(),
            comparator: FactComparator::Equals,
            expected: Some(expected),
        }
    }

    /// Builds an existence fact condition.
    #[must_use]
    pub fn fact_exists(key: impl Into<String>) -> Self {
        Self::Fact {
            key: key.into(),
            comparator: FactComparator::Exists,
            expected: None,
        }
    }

    /// Evaluates the condition against a context with short-circuiting.
    #[must_use]
    pub fn evaluate(&self, ctx: &GuardContext) -> bool {
        match self {
            Self::All(conditions) => conditions.iter().all(|condition| condition.evaluate(ctx)),
            Self::Any(conditions) => conditions.iter().any(|condition| condition.evaluate(ctx)),
            Self::Not(condition) => !condition.evaluate(ctx),
            Self::Fact {
                key,
                comparator,
                expected,
            } => evaluate_fact(ctx.fact(key), *comparator, expected.as_ref()),
        }
    }
}

// ============================================================================
// SECTION: Fact Evaluation
// ============================================================================

/// Evaluates a fact comparison, failing closed on missing data.
fn evaluate_fact(
    fact: Option<&SchemaValue>,
    comparator: FactComparator,
    expected: Option<&SchemaValue>,
) -> bool {
    match comparator {
        FactComparator::Exists => fact.is_some(),
        FactComparator::NotExists => fact.is_none(),
        FactComparator::Equals => match (fact, expected) {
            (Some(found), Some(wanted)) => found == wanted,
            _ => false,
        },
        FactComparator::NotEquals => match (fact, expected) {
            (Some(found), Some(wanted)) => found != wanted,
            _ => false,
        },
        FactComparator::GreaterThan => compare_numeric(fact, expected, |found, wanted| found > wanted),
        FactComparator::LessThan => compare_numeric(fact, expected, |found, wanted| found < wanted),
    }
}

/// Applies a numeric ordering predicate, failing closed on non-numbers.
fn compare_numeric(
    fact: Option<&SchemaValue>,
    expected: Option<&SchemaValue>,
    predicate: impl Fn(f64, f64) -> bool,
) -> bool {
    match (fact.and_then(SchemaValue::as_number), expected.and_then(SchemaValue::as_number)) {
        (Some(found), Some(wanted)) => predicate(found.as_f64(), wanted.as_f64()),
        _ => false,
    }
}
