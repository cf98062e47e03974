// crates/onex-core/src/core/snapshot.rs
// ============================================================================
// Module: Onex Provider Registry Snapshot
// Description: Immutable, hashed view of capability providers.
// Purpose: Provide a deterministic candidate source for tiered resolution.
// Dependencies: crate::core::{hashing, identifiers, trust}, serde
// ============================================================================

//! ## Overview
//! A provider registry snapshot is a point-in-time, BLAKE3-hashed view of the
//! capability-to-provider mapping. Snapshots are built through a
//! register-then-freeze builder and are never mutated in place; rebuilding
//! after registry changes yields a fresh snapshot with a fresh hash, which is
//! how route plans stay replayable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::hashing::HashDigest;
use crate::core::hashing::HashError;
use crate::core::hashing::SNAPSHOT_HASH_ALGORITHM;
use crate::core::hashing::hash_canonical_json;
use crate::core::identifiers::CapabilityId;
use crate::core::identifiers::DomainId;
use crate::core::identifiers::ProviderId;
use crate::core::trust::ResolutionTier;

// ============================================================================
// SECTION: Provider Candidates
// ============================================================================

/// Candidate provider for a capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderCandidate {
    /// Provider identifier.
    pub provider_id: ProviderId,
    /// Trust domain the provider belongs to.
    pub domain_id: DomainId,
    /// Tier this candidate is eligible to serve.
    pub tier: ResolutionTier,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Snapshot construction errors.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// A provider was registered twice for the same capability.
    #[error("duplicate provider {provider_id} for capability {capability_id}")]
    DuplicateProvider {
        /// Capability the duplicate registration targeted.
        capability_id: String,
        /// Duplicated provider identifier.
        provider_id: String,
    },
    /// Snapshot hashing failed.
    #[error("snapshot hashing failed: {0}")]
    Hashing(#[from] HashError),
}

// ============================================================================
// SECTION: Snapshot Builder
// ============================================================================

/// Mutable accumulator that freezes into an immutable snapshot.
///
/// # Invariants
/// - Registration is single-threaded; only the frozen snapshot is shared.
/// - A (capability, provider) pair may be registered at most once.
#[derive(Debug, Clone, Default)]
pub struct SnapshotBuilder {
    /// Accumulated candidates keyed by capability.
    entries: BTreeMap<CapabilityId, Vec<ProviderCandidate>>,
}

impl SnapshotBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Creates a builder seeded from an existing snapshot.
    ///
    /// This is the copy-on-write path: the source snapshot is left untouched
    /// and freezing the builder yields an independent snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &ProviderRegistrySnapshot) -> Self {
        Self {
            entries: snapshot.entries.clone(),
        }
    }

    /// Registers a candidate provider for a capability.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::DuplicateProvider`] when the (capability,
    /// provider) pair is already registered.
    pub fn register(
        &mut self,
        capability_id: CapabilityId,
        candidate: ProviderCandidate,
    ) -> Result<(), SnapshotError> {
        let candidates = self.entries.entry(capability_id.clone()).or_default();
        if candidates.iter().any(|existing| existing.provider_id == candidate.provider_id) {
            return Err(SnapshotError::DuplicateProvider {
                capability_id: capability_id.to_string(),
                provider_id: candidate.provider_id.to_string(),
            });
        }
        candidates.push(candidate);
        Ok(())
    }

    /// Freezes the builder into an immutable, hashed snapshot.
    ///
    /// Candidates are sorted by provider identifier at freeze time so that
    /// snapshot hashes and resolver tie-breaks are order-independent.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Hashing`] when canonical hashing fails.
    pub fn freeze(mut self) -> Result<ProviderRegistrySnapshot, SnapshotError> {
        for candidates in self.entries.values_mut() {
            candidates.sort_by(|left, right| left.provider_id.cmp(&right.provider_id));
        }
        let snapshot_hash = hash_canonical_json(SNAPSHOT_HASH_ALGORITHM, &self.entries)?;
        Ok(ProviderRegistrySnapshot {
            entries: self.entries,
            snapshot_hash,
        })
    }
}

// ============================================================================
// SECTION: Provider Registry Snapshot
// ============================================================================

/// Immutable, hashed view of available capability providers.
///
/// # Invariants
/// - Never mutated after freeze; rebuilds go through [`SnapshotBuilder`].
/// - Candidate lists are sorted by provider identifier.
/// - `snapshot_hash` is BLAKE3 over the canonical JSON entry map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRegistrySnapshot {
    /// Candidates keyed by capability identifier.
    entries: BTreeMap<CapabilityId, Vec<ProviderCandidate>>,
    /// BLAKE3 hash of the canonical entry map.
    snapshot_hash: HashDigest,
}

impl ProviderRegistrySnapshot {
    /// Returns candidates for a capability at a specific tier.
    ///
    /// The returned slice preserves the frozen provider-id ordering.
    #[must_use]
    pub fn candidates_at(
        &self,
        capability_id: &CapabilityId,
        tier: ResolutionTier,
    ) -> Vec<&ProviderCandidate> {
        self.entries
            .get(capability_id)
            .map(|candidates| {
                candidates.iter().filter(|candidate| candidate.tier == tier).collect()
            })
            .unwrap_or_default()
    }

    /// Returns all candidates for a capability across tiers.
    #[must_use]
    pub fn candidates(&self, capability_id: &CapabilityId) -> &[ProviderCandidate] {
        self.entries.get(capability_id).map_or(&[], Vec::as_slice)
    }

    /// Returns the registered capabilities in identifier order.
    pub fn capabilities(&self) -> impl Iterator<Item = &CapabilityId> {
        self.entries.keys()
    }

    /// Returns the snapshot hash.
    #[must_use]
    pub const fn snapshot_hash(&self) -> &HashDigest {
        &self.snapshot_hash
    }
}
