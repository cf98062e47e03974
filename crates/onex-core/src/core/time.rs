// crates/onex-core/src/core/time.rs
// ============================================================================
// Module: Onex Time Model
// Description: Canonical timestamp and duration representations for audit records.
// Purpose: Provide deterministic, replayable time values across resolution records.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Onex embeds explicit time values in route plans and tier attempts to keep
//! replay deterministic. The resolver never reads wall-clock time for
//! decisions; hosts supply timestamps through the resolver context. Attempt
//! durations are audit metadata only and carry no decision weight.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Time Values
// ============================================================================

/// Canonical timestamp used in Onex resolution and planning records.
///
/// # Invariants
/// - Values are explicitly provided by callers; the core never reads wall-clock time.
/// - No validation is performed; monotonicity is a caller responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Timestamp {
    /// Unix epoch milliseconds.
    UnixMillis(i64),
    /// Monotonic logical time value.
    Logical(u64),
}

impl Timestamp {
    /// Returns the timestamp as unix milliseconds when available.
    #[must_use]
    pub const fn as_unix_millis(&self) -> Option<i64> {
        match self {
            Self::UnixMillis(value) => Some(*value),
            Self::Logical(_) => None,
        }
    }

    /// Returns the timestamp as logical time when available.
    #[must_use]
    pub const fn as_logical(&self) -> Option<u64> {
        match self {
            Self::UnixMillis(_) => None,
            Self::Logical(value) => Some(*value),
        }
    }
}

// ============================================================================
// SECTION: Durations
// ============================================================================

/// Elapsed milliseconds recorded on tier attempts.
///
/// # Invariants
/// - Durations are audit metadata and are excluded from determinism guarantees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DurationMillis(u64);

impl DurationMillis {
    /// Creates a duration from milliseconds.
    #[must_use]
    pub const fn new(millis: u64) -> Self {
        Self(millis)
    }

    /// Returns the duration in milliseconds.
    #[must_use]
    pub const fn as_millis(&self) -> u64 {
        self.0
    }
}

impl From<u64> for DurationMillis {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}
