// crates/onex-core/src/core/route.rs
// ============================================================================
// Module: Onex Route Records
// Description: Route plans, tier attempts, and structured resolution results.
// Purpose: Provide complete, replayable records of every tiered resolution.
// Dependencies: crate::core::{hashing, identifiers, time, trust}, serde
// ============================================================================

//! ## Overview
//! A route plan is the complete record of how a resolution happened, not just
//! what was resolved: every attempted tier appears in the progression, and
//! the three determinism hashes pin the snapshot, policy bundle, and trust
//! graph the decision was made against. Failures carry the same progression
//! so operators can see exactly which tiers were tried and why each failed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::hashing::HashDigest;
use crate::core::identifiers::CapabilityId;
use crate::core::identifiers::DomainId;
use crate::core::identifiers::PlanId;
use crate::core::identifiers::ProviderId;
use crate::core::time::DurationMillis;
use crate::core::time::Timestamp;
use crate::core::trust::ResolutionTier;

// ============================================================================
// SECTION: Failure Codes
// ============================================================================

/// Structured failure codes for tiered resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionFailureCode {
    /// No candidate was registered at the attempted tier.
    NoCandidateAtTier,
    /// Candidates exist but reference trust domains that are not declared.
    UnknownTrustDomain,
    /// The dependency classification exceeds what candidate domains permit.
    ClassificationGateDenied,
    /// Required proofs are not satisfiable by any candidate domain.
    ProofNotSatisfied,
}

/// Structured failure returned when no tier yields a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredFailure {
    /// Failure code of the most-escalated attempt.
    pub code: ResolutionFailureCode,
    /// Human-readable failure summary.
    pub reason: String,
}

// ============================================================================
// SECTION: Tier Attempts
// ============================================================================

/// Audit record of one resolver attempt at one tier.
///
/// # Invariants
/// - Attempts are append-only; the progression is never rewritten.
/// - `duration` is audit metadata and carries no decision weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierAttempt {
    /// Tier attempted.
    pub tier: ResolutionTier,
    /// Timestamp supplied by the resolver context.
    pub observed_at: Timestamp,
    /// Candidates found at this tier before filtering.
    pub candidates_found: u32,
    /// Candidates surviving the classification and proof filters.
    pub candidates_surviving: u32,
    /// Failure code when the attempt yielded no surviving candidate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_code: Option<ResolutionFailureCode>,
    /// Failure reason when the attempt yielded no surviving candidate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    /// Elapsed attempt duration.
    pub duration: DurationMillis,
}

// ============================================================================
// SECTION: Route Hops
// ============================================================================

/// One step in a resolved route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteHop {
    /// Zero-based, monotonically increasing hop index.
    pub hop_index: u32,
    /// Provider adapter serving this hop.
    pub provider_id: ProviderId,
    /// Trust domain of the provider.
    pub domain_id: DomainId,
    /// Tier the hop was resolved at.
    pub tier: ResolutionTier,
}

// ============================================================================
// SECTION: Route Plans
// ============================================================================

/// Complete, replayable record of a successful resolution.
///
/// # Invariants
/// - At least one hop; hop indexes are contiguous from zero.
/// - `resolution_tier_used` is the tier of every hop and of the final
///   (successful) progression entry.
/// - The three hashes pin the exact registry, policy, and trust inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutePlan {
    /// Plan identifier.
    pub plan_id: PlanId,
    /// Capability the plan resolves.
    pub capability_id: CapabilityId,
    /// Ordered route hops.
    pub hops: Vec<RouteHop>,
    /// Timestamp the resolution was requested at.
    pub resolved_at: Timestamp,
    /// Tier the plan was resolved at.
    pub resolution_tier_used: ResolutionTier,
    /// Full escalation history including the successful attempt.
    pub tier_progression: Vec<TierAttempt>,
    /// BLAKE3 hash of the provider registry snapshot.
    pub registry_snapshot_hash: HashDigest,
    /// SHA-256 hash of the active policy bundle.
    pub policy_bundle_hash: HashDigest,
    /// SHA-256 hash of the trust graph.
    pub trust_graph_hash: HashDigest,
}

impl RoutePlan {
    /// Validates route plan invariants.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError`] when the plan is structurally malformed.
    pub fn validate(&self) -> Result<(), RouteError> {
        if self.hops.is_empty() {
            return Err(RouteError::EmptyRoute);
        }
        for (index, hop) in self.hops.iter().enumerate() {
            let expected = u32::try_from(index).map_err(|_| RouteError::HopIndexOverflow)?;
            if hop.hop_index != expected {
                return Err(RouteError::NonContiguousHops {
                    expected,
                    found: hop.hop_index,
                });
            }
            if hop.tier != self.resolution_tier_used {
                return Err(RouteError::TierMismatch {
                    hop_index: hop.hop_index,
                });
            }
        }
        if self.tier_progression.is_empty() {
            return Err(RouteError::EmptyProgression);
        }
        Ok(())
    }
}

/// Route plan validation errors.
#[derive(Debug, Error)]
pub enum RouteError {
    /// Route plan carries no hops.
    #[error("route plan must contain at least one hop")]
    EmptyRoute,
    /// Hop indexes are not contiguous from zero.
    #[error("route hop index mismatch: expected {expected}, found {found}")]
    NonContiguousHops {
        /// Expected hop index.
        expected: u32,
        /// Found hop index.
        found: u32,
    },
    /// Hop count exceeds the representable index range.
    #[error("route hop index overflow")]
    HopIndexOverflow,
    /// A hop references a tier other than the resolution tier.
    #[error("route hop {hop_index} tier differs from resolution tier")]
    TierMismatch {
        /// Offending hop index.
        hop_index: u32,
    },
    /// Tier progression is empty.
    #[error("route plan must record at least one tier attempt")]
    EmptyProgression,
}

// ============================================================================
// SECTION: Resolution Results
// ============================================================================

/// Tagged outcome of a tiered resolution.
///
/// Exactly one variant is populated; a result can never carry both a plan
/// and a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionOutcome {
    /// Resolution produced a route plan.
    Resolved {
        /// The resolved route plan.
        plan: RoutePlan,
    },
    /// Resolution failed at every tier in range.
    Failed {
        /// The structured failure.
        failure: StructuredFailure,
    },
}

/// Complete result of a tiered resolution.
///
/// # Invariants
/// - `fail_closed` is always true: the resolver never downgrades trust
///   silently, and constructors do not accept a value for it.
/// - `final_tier` is the last tier attempted (the resolution tier on
///   success).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TieredResolutionResult {
    /// Capability the resolution targeted.
    pub capability_id: CapabilityId,
    /// Resolution outcome (plan or structured failure).
    pub outcome: ResolutionOutcome,
    /// Full escalation history.
    pub tier_progression: Vec<TierAttempt>,
    /// Last tier attempted.
    pub final_tier: ResolutionTier,
    /// Fail-closed marker; always true.
    pub fail_closed: bool,
}

impl TieredResolutionResult {
    /// Creates a successful result from a route plan.
    #[must_use]
    pub fn resolved(plan: RoutePlan) -> Self {
        Self {
            capability_id: plan.capability_id.clone(),
            tier_progression: plan.tier_progression.clone(),
            final_tier: plan.resolution_tier_used,
            outcome: ResolutionOutcome::Resolved {
                plan,
            },
            fail_closed: true,
        }
    }

    /// Creates a failed result with the full progression.
    #[must_use]
    pub const fn failed(
        capability_id: CapabilityId,
        failure: StructuredFailure,
        tier_progression: Vec<TierAttempt>,
        final_tier: ResolutionTier,
    ) -> Self {
        Self {
            capability_id,
            outcome: ResolutionOutcome::Failed {
                failure,
            },
            tier_progression,
            final_tier,
            fail_closed: true,
        }
    }

    /// Returns the route plan when resolution succeeded.
    #[must_use]
    pub const fn route_plan(&self) -> Option<&RoutePlan> {
        match &self.outcome {
            ResolutionOutcome::Resolved {
                plan,
            } => Some(plan),
            ResolutionOutcome::Failed {
                ..
            } => None,
        }
    }

    /// Returns the structured failure when resolution failed.
    #[must_use]
    pub const fn structured_failure(&self) -> Option<&StructuredFailure> {
        match &self.outcome {
            ResolutionOutcome::Resolved {
                ..
            } => None,
            ResolutionOutcome::Failed {
                failure,
            } => Some(failure),
        }
    }

    /// Returns true when resolution produced a plan.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self.outcome, ResolutionOutcome::Resolved { .. })
    }
}
