// crates/onex-core/src/resolver/config.rs
// ============================================================================
// Module: Onex Resolver Configuration
// Description: YAML-declared tiered resolution and trust domain configuration.
// Purpose: Provide strict, fail-closed contract parsing with hard limits.
// Dependencies: crate::core, serde, serde_yaml
// ============================================================================

//! ## Overview
//! Resolution contracts are declared in YAML: a list of trust domains plus a
//! list of dependencies, each bounding its resolution by `[min_tier,
//! max_tier]`, required proofs, and a classification label. Parsing is strict
//! with hard size limits; missing or invalid configuration fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::CapabilityId;
use crate::core::Classification;
use crate::core::DomainId;
use crate::core::ProofKind;
use crate::core::ResolutionTier;
use crate::core::TrustDomain;
use crate::core::TrustError;
use crate::core::TrustRootRef;
use crate::core::validate_domain_id;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum resolution contract document size in bytes.
pub(crate) const MAX_CONTRACT_SIZE: usize = 1024 * 1024;
/// Maximum number of trust domain declarations per contract.
pub(crate) const MAX_TRUST_DOMAINS: usize = 256;
/// Maximum number of dependency declarations per contract.
pub(crate) const MAX_DEPENDENCIES: usize = 1024;
/// Maximum number of required proofs per dependency.
pub(crate) const MAX_REQUIRED_PROOFS: usize = 16;

// ============================================================================
// SECTION: Tiered Resolution Config
// ============================================================================

/// Per-dependency bounds for tiered resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TieredResolutionConfig {
    /// Lowest tier the resolver may start at.
    #[serde(default = "default_min_tier")]
    pub min_tier: ResolutionTier,
    /// Highest tier the resolver may escalate to.
    #[serde(default = "default_max_tier")]
    pub max_tier: ResolutionTier,
    /// Proofs every candidate domain must be able to satisfy.
    #[serde(default)]
    pub require_proofs: Vec<ProofKind>,
    /// Classification label of the dependency.
    #[serde(default)]
    pub classification: Classification,
}

impl Default for TieredResolutionConfig {
    fn default() -> Self {
        Self {
            min_tier: default_min_tier(),
            max_tier: default_max_tier(),
            require_proofs: Vec::new(),
            classification: Classification::default(),
        }
    }
}

impl TieredResolutionConfig {
    /// Validates the configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the tier range is inverted or the proof
    /// list is malformed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_tier.rank() > self.max_tier.rank() {
            return Err(ConfigError::InvertedTierRange {
                min_tier: self.min_tier,
                max_tier: self.max_tier,
            });
        }
        if self.require_proofs.len() > MAX_REQUIRED_PROOFS {
            return Err(ConfigError::TooManyProofs {
                count: self.require_proofs.len(),
            });
        }
        let unique: BTreeSet<ProofKind> = self.require_proofs.iter().copied().collect();
        if unique.len() != self.require_proofs.len() {
            return Err(ConfigError::DuplicateProof);
        }
        Ok(())
    }
}

/// Default lowest tier for dependency resolution.
const fn default_min_tier() -> ResolutionTier {
    ResolutionTier::LocalExact
}

/// Default highest tier for dependency resolution.
const fn default_max_tier() -> ResolutionTier {
    ResolutionTier::Quarantine
}

// ============================================================================
// SECTION: Trust Domain Config
// ============================================================================

/// YAML-declared trust domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrustDomainConfig {
    /// Trust domain identifier in dot notation.
    pub domain_id: DomainId,
    /// Resolution tier the domain is eligible for.
    pub tier: ResolutionTier,
    /// Optional locator for trust root key material.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust_root_ref: Option<TrustRootRef>,
    /// Proofs the domain can satisfy.
    #[serde(default)]
    pub satisfiable_proofs: Vec<ProofKind>,
    /// Highest classification the domain may handle.
    #[serde(default)]
    pub max_classification: Classification,
}

impl TrustDomainConfig {
    /// Converts the declaration into a validated trust domain.
    ///
    /// # Errors
    ///
    /// Returns [`TrustError`] when the domain identifier is malformed.
    pub fn into_domain(self) -> Result<TrustDomain, TrustError> {
        validate_domain_id(&self.domain_id)?;
        Ok(TrustDomain {
            domain_id: self.domain_id,
            tier: self.tier,
            trust_root_ref: self.trust_root_ref,
            satisfiable_proofs: self.satisfiable_proofs.into_iter().collect(),
            max_classification: self.max_classification,
        })
    }
}

// ============================================================================
// SECTION: Resolution Contract
// ============================================================================

/// Dependency declaration binding a capability to its resolution bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DependencySpec {
    /// Capability the dependency resolves.
    pub capability: CapabilityId,
    /// Tiered resolution bounds for the dependency.
    #[serde(default)]
    pub tiered_resolution: TieredResolutionConfig,
}

/// Top-level resolution contract document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolverContract {
    /// Declared trust domains.
    #[serde(default)]
    pub trust_domains: Vec<TrustDomainConfig>,
    /// Declared dependencies.
    #[serde(default)]
    pub dependencies: Vec<DependencySpec>,
}

impl ResolverContract {
    /// Parses a resolution contract from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the document is oversized, unparsable,
    /// or violates contract invariants.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        if text.len() > MAX_CONTRACT_SIZE {
            return Err(ConfigError::ContractTooLarge {
                size: text.len(),
                limit: MAX_CONTRACT_SIZE,
            });
        }
        let contract: Self =
            serde_yaml::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))?;
        contract.validate()?;
        Ok(contract)
    }

    /// Validates the contract invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when limits are exceeded or declarations are
    /// duplicated or malformed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trust_domains.len() > MAX_TRUST_DOMAINS {
            return Err(ConfigError::TooManyTrustDomains {
                count: self.trust_domains.len(),
            });
        }
        if self.dependencies.len() > MAX_DEPENDENCIES {
            return Err(ConfigError::TooManyDependencies {
                count: self.dependencies.len(),
            });
        }

        let mut seen_domains: BTreeSet<&DomainId> = BTreeSet::new();
        for domain in &self.trust_domains {
            validate_domain_id(&domain.domain_id)?;
            if !seen_domains.insert(&domain.domain_id) {
                return Err(ConfigError::DuplicateDomain(domain.domain_id.to_string()));
            }
        }

        let mut seen_capabilities: BTreeSet<&CapabilityId> = BTreeSet::new();
        for dependency in &self.dependencies {
            if dependency.capability.as_str().trim().is_empty() {
                return Err(ConfigError::EmptyCapability);
            }
            if !seen_capabilities.insert(&dependency.capability) {
                return Err(ConfigError::DuplicateCapability(
                    dependency.capability.to_string(),
                ));
            }
            dependency.tiered_resolution.validate()?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Resolver configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Contract document exceeds the size limit.
    #[error("resolution contract too large: {size} bytes exceeds limit {limit}")]
    ContractTooLarge {
        /// Observed document size in bytes.
        size: usize,
        /// Maximum permitted size in bytes.
        limit: usize,
    },
    /// YAML parsing failed.
    #[error("failed to parse resolution contract: {0}")]
    Parse(String),
    /// Tier range has min above max.
    #[error("inverted tier range: min {min_tier} above max {max_tier}")]
    InvertedTierRange {
        /// Declared minimum tier.
        min_tier: ResolutionTier,
        /// Declared maximum tier.
        max_tier: ResolutionTier,
    },
    /// Required proof list exceeds the limit.
    #[error("too many required proofs: {count}")]
    TooManyProofs {
        /// Declared proof count.
        count: usize,
    },
    /// Required proof list contains duplicates.
    #[error("duplicate required proof")]
    DuplicateProof,
    /// Trust domain list exceeds the limit.
    #[error("too many trust domains: {count}")]
    TooManyTrustDomains {
        /// Declared domain count.
        count: usize,
    },
    /// Dependency list exceeds the limit.
    #[error("too many dependencies: {count}")]
    TooManyDependencies {
        /// Declared dependency count.
        count: usize,
    },
    /// Duplicate trust domain declaration.
    #[error("duplicate trust domain: {0}")]
    DuplicateDomain(String),
    /// Duplicate dependency capability declaration.
    #[error("duplicate dependency capability: {0}")]
    DuplicateCapability(String),
    /// Dependency capability identifier is empty.
    #[error("dependency capability identifier is empty")]
    EmptyCapability,
    /// Trust domain declaration is malformed.
    #[error(transparent)]
    Trust(#[from] TrustError),
}
