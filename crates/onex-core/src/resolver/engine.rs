// crates/onex-core/src/resolver/engine.rs
// ============================================================================
// Module: Onex Tiered Capability Resolver
// Description: Deterministic tier escalation with trust filtering and audit trails.
// Purpose: Resolve capabilities into replayable route plans or structured failures.
// Dependencies: crate::{core, resolver::config}
// ============================================================================

//! ## Overview
//! The tiered resolver is the single canonical resolution path for Onex.
//! Starting at the configured minimum tier it queries the frozen snapshot,
//! applies the classification gate and proof filter, and stops at the first
//! tier with a surviving candidate. Candidates are never compared across
//! tiers, selection within a tier is lexicographic by provider id, and every
//! attempt is recorded so failures are as auditable as successes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Instant;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::CapabilityId;
use crate::core::DurationMillis;
use crate::core::PlanId;
use crate::core::ProviderCandidate;
use crate::core::ProviderRegistrySnapshot;
use crate::core::ResolutionFailureCode;
use crate::core::ResolutionTier;
use crate::core::RouteHop;
use crate::core::RoutePlan;
use crate::core::StructuredFailure;
use crate::core::TierAttempt;
use crate::core::TieredResolutionResult;
use crate::core::Timestamp;
use crate::core::TrustDomainRegistry;
use crate::resolver::config::ConfigError;
use crate::resolver::config::TieredResolutionConfig;

// ============================================================================
// SECTION: Resolver Context
// ============================================================================

/// Caller-supplied context for one resolution request.
///
/// # Invariants
/// - The resolver never reads wall-clock time or mints identifiers itself;
///   both are host concerns so that replays are reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverContext {
    /// Plan identifier to assign on success.
    pub plan_id: PlanId,
    /// Timestamp of the resolution request.
    pub requested_at: Timestamp,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Resolver input errors.
///
/// These represent malformed requests, not resolution failures; a resolution
/// that exhausts its tiers returns a [`TieredResolutionResult`] value.
#[derive(Debug, Error)]
pub enum ResolverError {
    /// Capability identifier is empty.
    #[error("capability identifier is empty")]
    EmptyCapabilityId,
    /// Resolution configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

// ============================================================================
// SECTION: Tiered Capability Resolver
// ============================================================================

/// Deterministic tiered capability resolver.
///
/// # Invariants
/// - Pure over its inputs: no I/O, no shared mutable state.
/// - Fail closed: no candidate outside `[min_tier, max_tier]` is ever
///   returned, and the first tier with a surviving candidate always wins.
#[derive(Debug, Clone)]
pub struct TieredCapabilityResolver {
    /// Frozen provider registry snapshot.
    snapshot: ProviderRegistrySnapshot,
    /// Trust domain registry.
    trust: TrustDomainRegistry,
}

impl TieredCapabilityResolver {
    /// Creates a resolver over a frozen snapshot and trust registry.
    #[must_use]
    pub const fn new(snapshot: ProviderRegistrySnapshot, trust: TrustDomainRegistry) -> Self {
        Self {
            snapshot,
            trust,
        }
    }

    /// Returns the snapshot the resolver operates on.
    #[must_use]
    pub const fn snapshot(&self) -> &ProviderRegistrySnapshot {
        &self.snapshot
    }

    /// Returns the trust registry the resolver operates on.
    #[must_use]
    pub const fn trust(&self) -> &TrustDomainRegistry {
        &self.trust
    }

    /// Resolves a capability through tier escalation.
    ///
    /// Tiers from `min_tier` through `max_tier` are attempted in escalation
    /// order. At each tier the classification gate runs before the proof
    /// filter; the first tier with a surviving candidate wins and the
    /// lexicographically smallest provider id is selected. Candidate-less
    /// tiers above the floor are skipped without an attempt record, so the
    /// progression lists the floor plus every tier that had candidates to
    /// evaluate. Exhausting the range yields a failed result carrying the
    /// full progression.
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError`] when the capability identifier is empty or
    /// the configuration is invalid. Resolution failures are not errors;
    /// they are returned as structured result values.
    pub fn resolve(
        &self,
        capability_id: &CapabilityId,
        config: &TieredResolutionConfig,
        ctx: &ResolverContext,
    ) -> Result<TieredResolutionResult, ResolverError> {
        if capability_id.as_str().trim().is_empty() {
            return Err(ResolverError::EmptyCapabilityId);
        }
        config.validate()?;

        let mut progression: Vec<TierAttempt> = Vec::new();
        for tier in ResolutionTier::escalation(config.min_tier, config.max_tier) {
            let started = Instant::now();
            let candidates = self.snapshot.candidates_at(capability_id, tier);
            // Candidate-less tiers above the configured floor carry no
            // information to evaluate and are skipped without an attempt
            // record; the floor itself is always recorded.
            if candidates.is_empty() && tier != config.min_tier {
                continue;
            }
            let outcome = self.filter_candidates(&candidates, config);
            let duration = duration_since(started);

            match outcome {
                TierOutcome::Selected {
                    candidate,
                    surviving,
                } => {
                    progression.push(TierAttempt {
                        tier,
                        observed_at: ctx.requested_at,
                        candidates_found: count(candidates.len()),
                        candidates_surviving: count(surviving),
                        failure_code: None,
                        failure_reason: None,
                        duration,
                    });
                    let plan = self.build_plan(capability_id, tier, candidate, ctx, progression);
                    return Ok(TieredResolutionResult::resolved(plan));
                }
                TierOutcome::Exhausted {
                    code,
                    reason,
                } => {
                    progression.push(TierAttempt {
                        tier,
                        observed_at: ctx.requested_at,
                        candidates_found: count(candidates.len()),
                        candidates_surviving: 0,
                        failure_code: Some(code),
                        failure_reason: Some(reason),
                        duration,
                    });
                }
            }
        }

        let failure = final_failure(&progression);
        let final_tier = progression.last().map_or(config.min_tier, |attempt| attempt.tier);
        Ok(TieredResolutionResult::failed(
            capability_id.clone(),
            failure,
            progression,
            final_tier,
        ))
    }

    /// Applies the classification gate and proof filter at one tier.
    fn filter_candidates<'snap>(
        &self,
        candidates: &[&'snap ProviderCandidate],
        config: &TieredResolutionConfig,
    ) -> TierOutcome<'snap> {
        if candidates.is_empty() {
            return TierOutcome::Exhausted {
                code: ResolutionFailureCode::NoCandidateAtTier,
                reason: "no candidate registered at tier".to_string(),
            };
        }

        let mut unknown_domains = 0_usize;
        let mut known: Vec<&ProviderCandidate> = Vec::new();
        for candidate in candidates.iter().copied() {
            if self.trust.lookup(&candidate.domain_id).is_some() {
                known.push(candidate);
            } else {
                unknown_domains += 1;
            }
        }
        if known.is_empty() {
            return TierOutcome::Exhausted {
                code: ResolutionFailureCode::UnknownTrustDomain,
                reason: format!("{unknown_domains} candidate(s) reference undeclared trust domains"),
            };
        }

        // Classification gate runs before the proof filter.
        let known_count = known.len();
        let mut classified: Vec<&ProviderCandidate> = Vec::new();
        for candidate in known {
            if let Some(domain) = self.trust.lookup(&candidate.domain_id)
                && domain.permits_classification(config.classification)
            {
                classified.push(candidate);
            }
        }
        if classified.is_empty() {
            return TierOutcome::Exhausted {
                code: ResolutionFailureCode::ClassificationGateDenied,
                reason: format!(
                    "classification {} exceeds what {known_count} candidate domain(s) permit",
                    config.classification
                ),
            };
        }

        let classified_count = classified.len();
        let mut surviving: Vec<&ProviderCandidate> = Vec::new();
        for candidate in classified {
            if let Some(domain) = self.trust.lookup(&candidate.domain_id)
                && domain.satisfies_proofs(&config.require_proofs)
            {
                surviving.push(candidate);
            }
        }
        if surviving.is_empty() {
            return TierOutcome::Exhausted {
                code: ResolutionFailureCode::ProofNotSatisfied,
                reason: format!(
                    "required proofs not satisfiable by {classified_count} candidate domain(s)"
                ),
            };
        }

        // Deterministic tie-break: lexicographically smallest provider id.
        surviving.sort_by(|left, right| left.provider_id.cmp(&right.provider_id));
        TierOutcome::Selected {
            candidate: surviving[0],
            surviving: surviving.len(),
        }
    }

    /// Builds the route plan for a selected candidate.
    fn build_plan(
        &self,
        capability_id: &CapabilityId,
        tier: ResolutionTier,
        candidate: &ProviderCandidate,
        ctx: &ResolverContext,
        tier_progression: Vec<TierAttempt>,
    ) -> RoutePlan {
        RoutePlan {
            plan_id: ctx.plan_id,
            capability_id: capability_id.clone(),
            hops: vec![RouteHop {
                hop_index: 0,
                provider_id: candidate.provider_id.clone(),
                domain_id: candidate.domain_id.clone(),
                tier,
            }],
            resolved_at: ctx.requested_at,
            resolution_tier_used: tier,
            tier_progression,
            registry_snapshot_hash: self.snapshot.snapshot_hash().clone(),
            policy_bundle_hash: self.trust.policy_bundle_hash().clone(),
            trust_graph_hash: self.trust.trust_graph_hash().clone(),
        }
    }
}

// ============================================================================
// SECTION: Tier Outcome
// ============================================================================

/// Outcome of filtering one tier's candidates.
enum TierOutcome<'snap> {
    /// A candidate survived; resolution stops at this tier.
    Selected {
        /// Selected candidate after the lexicographic tie-break.
        candidate: &'snap ProviderCandidate,
        /// Number of candidates surviving both filters.
        surviving: usize,
    },
    /// No candidate survived; escalation continues.
    Exhausted {
        /// Failure code for the attempt.
        code: ResolutionFailureCode,
        /// Failure reason for the attempt.
        reason: String,
    },
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Converts a collection length to a saturating u32 count.
fn count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

/// Measures elapsed milliseconds since an instant, saturating.
fn duration_since(started: Instant) -> DurationMillis {
    DurationMillis::new(u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX))
}

/// Derives the overall structured failure from the progression.
///
/// The most-escalated attempt carries the operative failure; earlier
/// attempts remain visible through the progression itself.
fn final_failure(progression: &[TierAttempt]) -> StructuredFailure {
    progression.last().map_or_else(
        || StructuredFailure {
            code: ResolutionFailureCode::NoCandidateAtTier,
            reason: "no tier attempted".to_string(),
        },
        |attempt| StructuredFailure {
            code: attempt.failure_code.unwrap_or(ResolutionFailureCode::NoCandidateAtTier),
            reason: attempt
                .failure_reason
                .clone()
                .unwrap_or_else(|| "no candidate survived".to_string()),
        },
    )
}
