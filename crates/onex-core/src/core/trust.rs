// crates/onex-core/src/core/trust.rs
// ============================================================================
// Module: Onex Trust Model
// Description: Resolution tiers, classifications, proofs, and trust domains.
// Purpose: Provide the trust lattice used to filter capability providers.
// Dependencies: crate::core::{hashing, identifiers}, serde
// ============================================================================

//! ## Overview
//! Trust domains bound what a provider candidate may be used for. Each domain
//! declares its resolution tier, the proofs it can satisfy, and the highest
//! data classification it may handle. The tiered resolver consults this model
//! on every attempt and fails closed on unknown or insufficient domains.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::hashing::DEFAULT_HASH_ALGORITHM;
use crate::core::hashing::HashDigest;
use crate::core::hashing::HashError;
use crate::core::hashing::hash_canonical_json;
use crate::core::identifiers::DomainId;
use crate::core::identifiers::TrustRootRef;

// ============================================================================
// SECTION: Resolution Tiers
// ============================================================================

/// Ordered trust and locality tier used for capability resolution.
///
/// Lower ordinals are preferred; the resolver escalates upward and never
/// compares candidates across tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionTier {
    /// Exact match within the local node registry.
    LocalExact,
    /// Fuzzy match within the local node registry.
    LocalFuzzy,
    /// Organization-trusted provider pool.
    OrgTrusted,
    /// Federated partner provider pool.
    FedPartner,
    /// Quarantine pool requiring maximal scrutiny.
    Quarantine,
}

impl ResolutionTier {
    /// All tiers in escalation order.
    pub const ALL: [Self; 5] =
        [Self::LocalExact, Self::LocalFuzzy, Self::OrgTrusted, Self::FedPartner, Self::Quarantine];

    /// Returns the tier ordinal (lower is preferred).
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::LocalExact => 0,
            Self::LocalFuzzy => 1,
            Self::OrgTrusted => 2,
            Self::FedPartner => 3,
            Self::Quarantine => 4,
        }
    }

    /// Returns tiers from `min` through `max` in escalation order.
    pub fn escalation(min: Self, max: Self) -> impl Iterator<Item = Self> {
        Self::ALL
            .into_iter()
            .filter(move |tier| tier.rank() >= min.rank() && tier.rank() <= max.rank())
    }

    /// Returns the canonical snake_case tier name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LocalExact => "local_exact",
            Self::LocalFuzzy => "local_fuzzy",
            Self::OrgTrusted => "org_trusted",
            Self::FedPartner => "fed_partner",
            Self::Quarantine => "quarantine",
        }
    }
}

impl fmt::Display for ResolutionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Classifications
// ============================================================================

/// Ordered data classification label carried by dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Public data, handled by any domain.
    #[default]
    Public,
    /// Internal data, restricted to trusted domains.
    Internal,
    /// Confidential data.
    Confidential,
    /// Restricted data requiring the strongest handling guarantees.
    Restricted,
}

impl Classification {
    /// Returns the classification ordinal (higher is more sensitive).
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Public => 0,
            Self::Internal => 1,
            Self::Confidential => 2,
            Self::Restricted => 3,
        }
    }

    /// Returns the canonical snake_case classification name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Internal => "internal",
            Self::Confidential => "confidential",
            Self::Restricted => "restricted",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Proof Kinds
// ============================================================================

/// Proof a trust domain can satisfy for resolved dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProofKind {
    /// Signature anchored at the domain trust root.
    TrustRootSignature,
    /// Attestation of the domain operating environment.
    DomainAttestation,
    /// End-to-end provenance chain for provider artifacts.
    ProvenanceChain,
}

// ============================================================================
// SECTION: Trust Domains
// ============================================================================

/// Declared trust domain with tier, proofs, and classification ceiling.
///
/// # Invariants
/// - `domain_id` is dot-notation with alpha-starting segments, enforced at
///   registry construction.
/// - Domains are immutable once declared; changing one requires a new
///   registry (and therefore a new trust graph hash).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustDomain {
    /// Trust domain identifier in dot notation.
    pub domain_id: DomainId,
    /// Resolution tier this domain is eligible for.
    pub tier: ResolutionTier,
    /// Optional locator for trust root key material.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust_root_ref: Option<TrustRootRef>,
    /// Proofs this domain can satisfy.
    #[serde(default)]
    pub satisfiable_proofs: BTreeSet<ProofKind>,
    /// Highest classification this domain may handle.
    #[serde(default)]
    pub max_classification: Classification,
}

impl TrustDomain {
    /// Returns true when every required proof is satisfiable by this domain.
    #[must_use]
    pub fn satisfies_proofs(&self, required: &[ProofKind]) -> bool {
        required.iter().all(|proof| self.satisfiable_proofs.contains(proof))
    }

    /// Returns true when the domain may handle the given classification.
    #[must_use]
    pub const fn permits_classification(&self, classification: Classification) -> bool {
        self.max_classification.rank() >= classification.rank()
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Trust model construction errors.
#[derive(Debug, Error)]
pub enum TrustError {
    /// Domain identifier violates dot-notation rules.
    #[error("invalid trust domain id {domain_id}: {reason}")]
    InvalidDomainId {
        /// Offending domain identifier.
        domain_id: String,
        /// Violated rule description.
        reason: String,
    },
    /// Duplicate domain identifiers detected.
    #[error("duplicate trust domain id: {0}")]
    DuplicateDomain(String),
    /// Trust graph hashing failed.
    #[error("trust graph hashing failed: {0}")]
    Hashing(#[from] HashError),
}

// ============================================================================
// SECTION: Domain Id Validation
// ============================================================================

/// Validates a trust domain identifier.
///
/// Identifiers are dot-notation; each segment must start with an ASCII
/// alphabetic character and may continue with alphanumerics or underscores.
///
/// # Errors
///
/// Returns [`TrustError::InvalidDomainId`] when the identifier is malformed.
pub fn validate_domain_id(domain_id: &DomainId) -> Result<(), TrustError> {
    let raw = domain_id.as_str();
    if raw.is_empty() {
        return Err(TrustError::InvalidDomainId {
            domain_id: raw.to_string(),
            reason: "identifier is empty".to_string(),
        });
    }
    for segment in raw.split('.') {
        let mut chars = segment.chars();
        let Some(first) = chars.next() else {
            return Err(TrustError::InvalidDomainId {
                domain_id: raw.to_string(),
                reason: "empty segment".to_string(),
            });
        };
        if !first.is_ascii_alphabetic() {
            return Err(TrustError::InvalidDomainId {
                domain_id: raw.to_string(),
                reason: format!("segment {segment} must start with an alphabetic character"),
            });
        }
        if !chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_') {
            return Err(TrustError::InvalidDomainId {
                domain_id: raw.to_string(),
                reason: format!("segment {segment} contains unsupported characters"),
            });
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Trust Domain Registry
// ============================================================================

/// Immutable lookup table of declared trust domains.
///
/// # Invariants
/// - Domain identifiers are unique and dot-notation valid.
/// - `trust_graph_hash` is computed once over the canonical domain list and
///   never mutated; callers compare it to detect trust graph drift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustDomainRegistry {
    /// Declared domains keyed by domain identifier.
    domains: BTreeMap<DomainId, TrustDomain>,
    /// SHA-256 hash of the active policy bundle.
    policy_bundle_hash: HashDigest,
    /// SHA-256 hash of the canonical domain list.
    trust_graph_hash: HashDigest,
}

impl TrustDomainRegistry {
    /// Builds a registry from declared domains and a policy bundle hash.
    ///
    /// # Errors
    ///
    /// Returns [`TrustError`] when a domain identifier is malformed or
    /// duplicated, or when trust graph hashing fails.
    pub fn new(
        domains: Vec<TrustDomain>,
        policy_bundle_hash: HashDigest,
    ) -> Result<Self, TrustError> {
        let mut indexed: BTreeMap<DomainId, TrustDomain> = BTreeMap::new();
        for domain in domains {
            validate_domain_id(&domain.domain_id)?;
            if indexed.contains_key(&domain.domain_id) {
                return Err(TrustError::DuplicateDomain(domain.domain_id.to_string()));
            }
            indexed.insert(domain.domain_id.clone(), domain);
        }
        let trust_graph_hash = hash_canonical_json(DEFAULT_HASH_ALGORITHM, &indexed)?;
        Ok(Self {
            domains: indexed,
            policy_bundle_hash,
            trust_graph_hash,
        })
    }

    /// Looks up a trust domain by identifier.
    #[must_use]
    pub fn lookup(&self, domain_id: &DomainId) -> Option<&TrustDomain> {
        self.domains.get(domain_id)
    }

    /// Returns the declared domains in identifier order.
    pub fn domains(&self) -> impl Iterator<Item = &TrustDomain> {
        self.domains.values()
    }

    /// Returns the policy bundle hash.
    #[must_use]
    pub const fn policy_bundle_hash(&self) -> &HashDigest {
        &self.policy_bundle_hash
    }

    /// Returns the trust graph hash.
    #[must_use]
    pub const fn trust_graph_hash(&self) -> &HashDigest {
        &self.trust_graph_hash
    }
}
