// crates/onex-core/tests/trust_domains.rs
// ============================================================================
// Module: Trust Domain Tests
// Description: Tier ordering, domain id validation, and registry invariants.
// Purpose: Ensure the trust lattice and registry fail closed on bad input.
// Dependencies: onex-core, serde_json
// ============================================================================
//! ## Overview
//! Validates tier rank ordering and escalation ranges, dot-notation domain
//! id validation, classification ceilings, proof satisfaction, and trust
//! graph hash stability.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only panic-based assertions are permitted."
)]

use std::collections::BTreeSet;

use onex_core::Classification;
use onex_core::DomainId;
use onex_core::HashAlgorithm;
use onex_core::ProofKind;
use onex_core::ResolutionTier;
use onex_core::TrustDomain;
use onex_core::TrustDomainRegistry;
use onex_core::hash_bytes;
use onex_core::validate_domain_id;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds a minimal trust domain.
fn domain(domain_id: &str, tier: ResolutionTier) -> TrustDomain {
    TrustDomain {
        domain_id: DomainId::new(domain_id),
        tier,
        trust_root_ref: None,
        satisfiable_proofs: BTreeSet::new(),
        max_classification: Classification::Public,
    }
}

// ============================================================================
// SECTION: Tier Ordering
// ============================================================================

#[test]
fn tier_ranks_escalate_from_local_to_quarantine() {
    let ranks: Vec<u8> = ResolutionTier::ALL.iter().map(|tier| tier.rank()).collect::<Vec<u8>>();
    assert_eq!(ranks, vec![0, 1, 2, 3, 4]);
}

#[test]
fn escalation_range_is_inclusive_and_ordered() {
    let tiers: Vec<ResolutionTier> =
        ResolutionTier::escalation(ResolutionTier::LocalFuzzy, ResolutionTier::FedPartner)
            .collect::<Vec<ResolutionTier>>();
    assert_eq!(
        tiers,
        vec![ResolutionTier::LocalFuzzy, ResolutionTier::OrgTrusted, ResolutionTier::FedPartner]
    );
}

#[test]
fn tier_serializes_as_snake_case() {
    let json = serde_json::to_string(&ResolutionTier::LocalExact).expect("serialize");
    assert_eq!(json, "\"local_exact\"");
    let parsed: ResolutionTier = serde_json::from_str("\"fed_partner\"").expect("deserialize");
    assert_eq!(parsed, ResolutionTier::FedPartner);
}

// ============================================================================
// SECTION: Domain Id Validation
// ============================================================================

#[test]
fn dotted_alpha_identifiers_are_valid() {
    for raw in ["org", "org.zone", "org.zone_a.node7"] {
        validate_domain_id(&DomainId::new(raw)).expect("valid id");
    }
}

#[test]
fn malformed_identifiers_are_rejected() {
    for raw in ["", ".", "org.", "7org", "org.7zone", "org zone", "org.zo-ne"] {
        assert!(validate_domain_id(&DomainId::new(raw)).is_err(), "accepted: {raw}");
    }
}

// ============================================================================
// SECTION: Classification and Proofs
// ============================================================================

#[test]
fn classification_ceiling_permits_up_to_its_rank() {
    let mut trusted = domain("org.zone", ResolutionTier::OrgTrusted);
    trusted.max_classification = Classification::Confidential;

    assert!(trusted.permits_classification(Classification::Public));
    assert!(trusted.permits_classification(Classification::Confidential));
    assert!(!trusted.permits_classification(Classification::Restricted));
}

#[test]
fn proof_satisfaction_requires_every_proof() {
    let mut attested = domain("org.zone", ResolutionTier::OrgTrusted);
    attested.satisfiable_proofs =
        BTreeSet::from([ProofKind::TrustRootSignature, ProofKind::DomainAttestation]);

    assert!(attested.satisfies_proofs(&[]));
    assert!(attested.satisfies_proofs(&[ProofKind::TrustRootSignature]));
    assert!(!attested
        .satisfies_proofs(&[ProofKind::TrustRootSignature, ProofKind::ProvenanceChain]));
}

// ============================================================================
// SECTION: Registry Invariants
// ============================================================================

#[test]
fn duplicate_domains_are_rejected_at_construction() {
    let result = TrustDomainRegistry::new(
        vec![
            domain("org.zone", ResolutionTier::OrgTrusted),
            domain("org.zone", ResolutionTier::FedPartner),
        ],
        hash_bytes(HashAlgorithm::Sha256, b"policy-bundle-v1"),
    );
    assert!(result.is_err());
}

#[test]
fn malformed_domain_ids_are_rejected_at_construction() {
    let result = TrustDomainRegistry::new(
        vec![domain("org..zone", ResolutionTier::OrgTrusted)],
        hash_bytes(HashAlgorithm::Sha256, b"policy-bundle-v1"),
    );
    assert!(result.is_err());
}

#[test]
fn trust_graph_hash_is_declaration_order_independent() {
    let policy = hash_bytes(HashAlgorithm::Sha256, b"policy-bundle-v1");
    let forward = TrustDomainRegistry::new(
        vec![
            domain("aaa.zone", ResolutionTier::LocalExact),
            domain("zzz.zone", ResolutionTier::OrgTrusted),
        ],
        policy.clone(),
    )
    .expect("registry builds");
    let reversed = TrustDomainRegistry::new(
        vec![
            domain("zzz.zone", ResolutionTier::OrgTrusted),
            domain("aaa.zone", ResolutionTier::LocalExact),
        ],
        policy,
    )
    .expect("registry builds");

    assert_eq!(forward.trust_graph_hash(), reversed.trust_graph_hash());
}

#[test]
fn trust_graph_hash_tracks_domain_changes() {
    let policy = hash_bytes(HashAlgorithm::Sha256, b"policy-bundle-v1");
    let base = TrustDomainRegistry::new(
        vec![domain("org.zone", ResolutionTier::OrgTrusted)],
        policy.clone(),
    )
    .expect("registry builds");
    let changed = TrustDomainRegistry::new(
        vec![domain("org.zone", ResolutionTier::FedPartner)],
        policy,
    )
    .expect("registry builds");

    assert_ne!(base.trust_graph_hash(), changed.trust_graph_hash());
}
