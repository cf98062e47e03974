// crates/onex-contract/src/document.rs
// ============================================================================
// Module: Onex Contract Documents
// Description: Content-hashed contract documents with subcontract references.
// Purpose: Provide the canonical contract shape consumed by merge and expansion.
// Dependencies: onex-core, serde
// ============================================================================

//! ## Overview
//! A contract document is a flat map of named schema values plus references
//! to subcontracts that are inlined during expansion. Documents are content
//! addressed: the SHA-256 canonical hash identifies a document's exact
//! semantic content independent of field declaration order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use onex_core::ContractId;
use onex_core::DEFAULT_HASH_ALGORITHM;
use onex_core::HashDigest;
use onex_core::HashError;
use onex_core::SchemaValue;
use onex_core::hash_canonical_json;
use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Contract Documents
// ============================================================================

/// Canonical contract document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractDocument {
    /// Contract identifier.
    pub contract_id: ContractId,
    /// Named contract fields with deterministic ordering.
    #[serde(default)]
    pub fields: BTreeMap<String, SchemaValue>,
    /// References to subcontracts inlined during expansion.
    #[serde(default)]
    pub subcontracts: BTreeSet<ContractId>,
}

impl ContractDocument {
    /// Creates an empty document with the given identifier.
    #[must_use]
    pub const fn new(contract_id: ContractId) -> Self {
        Self {
            contract_id,
            fields: BTreeMap::new(),
            subcontracts: BTreeSet::new(),
        }
    }

    /// Returns a document with the field set.
    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>, value: SchemaValue) -> Self {
        self.fields.insert(field.into(), value);
        self
    }

    /// Returns a document with the subcontract reference added.
    #[must_use]
    pub fn with_subcontract(mut self, contract_id: ContractId) -> Self {
        self.subcontracts.insert(contract_id);
        self
    }

    /// Computes the SHA-256 canonical content hash of the document.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::Canonicalization`] when serialization fails.
    pub fn content_hash(&self) -> Result<HashDigest, HashError> {
        hash_canonical_json(DEFAULT_HASH_ALGORITHM, self)
    }
}
