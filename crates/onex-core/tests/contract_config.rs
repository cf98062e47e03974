// crates/onex-core/tests/contract_config.rs
// ============================================================================
// Module: Resolution Contract Config Tests
// Description: YAML parsing, defaults, and fail-closed validation limits.
// Purpose: Ensure contract declarations parse strictly and fail closed.
// Dependencies: onex-core
// ============================================================================
//! ## Overview
//! Validates YAML resolution contracts: trust domain and dependency blocks,
//! tier range defaults, unknown-field rejection, and the hard limits applied
//! before any declaration is trusted.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only panic-based assertions are permitted."
)]

use onex_core::Classification;
use onex_core::ProofKind;
use onex_core::ResolutionTier;
use onex_core::ResolverContract;
use onex_core::TieredResolutionConfig;

// ============================================================================
// SECTION: Parsing
// ============================================================================

#[test]
fn full_contract_parses_from_yaml() {
    let text = r"
trust_domains:
  - domain_id: org.zone
    tier: org_trusted
    trust_root_ref: keyring://org-zone
    satisfiable_proofs: [trust_root_signature, domain_attestation]
    max_classification: confidential
dependencies:
  - capability: cap.store
    tiered_resolution:
      min_tier: local_exact
      max_tier: org_trusted
      require_proofs: [trust_root_signature]
      classification: internal
";
    let contract = ResolverContract::from_yaml_str(text).expect("parse");
    assert_eq!(contract.trust_domains.len(), 1);
    assert_eq!(contract.trust_domains[0].tier, ResolutionTier::OrgTrusted);
    assert_eq!(contract.dependencies.len(), 1);

    let resolution = &contract.dependencies[0].tiered_resolution;
    assert_eq!(resolution.min_tier, ResolutionTier::LocalExact);
    assert_eq!(resolution.max_tier, ResolutionTier::OrgTrusted);
    assert_eq!(resolution.require_proofs, vec![ProofKind::TrustRootSignature]);
    assert_eq!(resolution.classification, Classification::Internal);
}

#[test]
fn omitted_resolution_block_uses_full_range_defaults() {
    let text = r"
dependencies:
  - capability: cap.store
";
    let contract = ResolverContract::from_yaml_str(text).expect("parse");
    let resolution = &contract.dependencies[0].tiered_resolution;
    assert_eq!(resolution.min_tier, ResolutionTier::LocalExact);
    assert_eq!(resolution.max_tier, ResolutionTier::Quarantine);
    assert!(resolution.require_proofs.is_empty());
    assert_eq!(resolution.classification, Classification::Public);
}

#[test]
fn trust_domain_config_converts_into_domain() {
    let text = r"
trust_domains:
  - domain_id: org.zone
    tier: org_trusted
    satisfiable_proofs: [provenance_chain]
";
    let contract = ResolverContract::from_yaml_str(text).expect("parse");
    let converted =
        contract.trust_domains[0].clone().into_domain().expect("convert");
    assert!(converted.satisfiable_proofs.contains(&ProofKind::ProvenanceChain));
    assert_eq!(converted.max_classification, Classification::Public);
}

// ============================================================================
// SECTION: Fail-Closed Rejection
// ============================================================================

#[test]
fn unknown_fields_are_rejected() {
    let text = r"
dependencies:
  - capability: cap.store
    tiered_resolution:
      min_tier: local_exact
      surprise: true
";
    assert!(ResolverContract::from_yaml_str(text).is_err());
}

#[test]
fn unknown_tier_names_are_rejected() {
    let text = r"
dependencies:
  - capability: cap.store
    tiered_resolution:
      min_tier: galactic
";
    assert!(ResolverContract::from_yaml_str(text).is_err());
}

#[test]
fn inverted_tier_range_is_rejected() {
    let config = TieredResolutionConfig {
        min_tier: ResolutionTier::FedPartner,
        max_tier: ResolutionTier::LocalFuzzy,
        ..TieredResolutionConfig::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn duplicate_required_proofs_are_rejected() {
    let config = TieredResolutionConfig {
        require_proofs: vec![ProofKind::TrustRootSignature, ProofKind::TrustRootSignature],
        ..TieredResolutionConfig::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn duplicate_dependency_capabilities_are_rejected() {
    let text = r"
dependencies:
  - capability: cap.store
  - capability: cap.store
";
    assert!(ResolverContract::from_yaml_str(text).is_err());
}

#[test]
fn malformed_trust_domain_ids_are_rejected() {
    let text = r"
trust_domains:
  - domain_id: 9org.zone
    tier: org_trusted
";
    assert!(ResolverContract::from_yaml_str(text).is_err());
}

#[test]
fn oversized_documents_are_rejected() {
    let mut text = String::from("dependencies:\n");
    let filler = "# padding line to exceed the contract size limit\n";
    while text.len() <= 1024 * 1024 {
        text.push_str(filler);
    }
    assert!(ResolverContract::from_yaml_str(&text).is_err());
}
