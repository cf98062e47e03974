// crates/onex-core/src/core/mod.rs
// ============================================================================
// Module: Onex Core Types
// Description: Canonical Onex trust, snapshot, and route structures.
// Purpose: Provide stable, serializable types for tiered capability resolution.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Onex core types define trust domains, provider registry snapshots, and
//! route records. These types are the canonical source of truth for any
//! derived API surfaces and for the navigation and contract crates.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod hashing;
pub mod identifiers;
pub mod route;
pub mod snapshot;
pub mod time;
pub mod trust;
pub mod value;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use hashing::DEFAULT_HASH_ALGORITHM;
pub use hashing::HashAlgorithm;
pub use hashing::HashDigest;
pub use hashing::HashError;
pub use hashing::SNAPSHOT_HASH_ALGORITHM;
pub use hashing::canonical_json_bytes;
pub use hashing::hash_bytes;
pub use hashing::hash_canonical_json;
pub use hashing::strip_null_members;
pub use identifiers::CapabilityId;
pub use identifiers::ContractId;
pub use identifiers::DomainId;
pub use identifiers::PlanId;
pub use identifiers::ProviderId;
pub use identifiers::StateId;
pub use identifiers::TransitionId;
pub use identifiers::TrustRootRef;
pub use route::ResolutionFailureCode;
pub use route::ResolutionOutcome;
pub use route::RouteError;
pub use route::RouteHop;
pub use route::RoutePlan;
pub use route::StructuredFailure;
pub use route::TierAttempt;
pub use route::TieredResolutionResult;
pub use snapshot::ProviderCandidate;
pub use snapshot::ProviderRegistrySnapshot;
pub use snapshot::SnapshotBuilder;
pub use snapshot::SnapshotError;
pub use time::DurationMillis;
pub use time::Timestamp;
pub use trust::Classification;
pub use trust::ProofKind;
pub use trust::ResolutionTier;
pub use trust::TrustDomain;
pub use trust::TrustDomainRegistry;
pub use trust::TrustError;
pub use trust::validate_domain_id;
pub use value::SchemaNumber;
pub use value::SchemaValue;
