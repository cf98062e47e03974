// crates/onex-contract/src/expand.rs
// ============================================================================
// Module: Onex Contract Expansion
// Description: Recursive subcontract inlining against a contract catalog.
// Purpose: Produce fully expanded contracts with all references resolved.
// Dependencies: crate::document, onex-core, serde
// ============================================================================

//! ## Overview
//! Expansion inlines every subcontract reference, recursively, until the
//! document is self-contained. A contract's own fields override fields
//! inherited from its subcontracts; two sibling subcontracts contributing
//! different values for the same field is a conflict. Unresolvable and
//! cyclic references fail expansion rather than producing a partially
//! expanded document.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use onex_core::ContractId;
use onex_core::HashDigest;
use onex_core::HashError;
use onex_core::SchemaValue;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::document::ContractDocument;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Expansion failures.
#[derive(Debug, Error)]
pub enum ExpandError {
    /// Referenced subcontract is not in the catalog.
    #[error("subcontract not in catalog: {0}")]
    MissingSubcontract(String),
    /// Subcontract references form a cycle.
    #[error("cyclic subcontract reference: {0}")]
    CyclicReference(String),
    /// Two subcontracts contribute conflicting values for a field.
    #[error("field {field} conflicts between subcontracts (second contributor: {contract_id})")]
    FieldConflict {
        /// Conflicting field name.
        field: String,
        /// Contract contributing the conflicting value.
        contract_id: String,
    },
    /// Catalog contains duplicate contract identifiers.
    #[error("duplicate catalog contract: {0}")]
    DuplicateCatalogEntry(String),
    /// Content hashing failed.
    #[error("expansion hashing failed: {0}")]
    Hashing(#[from] HashError),
}

// ============================================================================
// SECTION: Subcontract Catalog
// ============================================================================

/// Lookup catalog of contracts available for inlining.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SubcontractCatalog {
    /// Catalog contracts keyed by identifier.
    contracts: BTreeMap<ContractId, ContractDocument>,
}

impl SubcontractCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            contracts: BTreeMap::new(),
        }
    }

    /// Builds a catalog from contract documents.
    ///
    /// # Errors
    ///
    /// Returns [`ExpandError::DuplicateCatalogEntry`] on duplicate contract
    /// identifiers.
    pub fn from_contracts(documents: Vec<ContractDocument>) -> Result<Self, ExpandError> {
        let mut contracts: BTreeMap<ContractId, ContractDocument> = BTreeMap::new();
        for document in documents {
            if contracts.contains_key(&document.contract_id) {
                return Err(ExpandError::DuplicateCatalogEntry(document.contract_id.to_string()));
            }
            contracts.insert(document.contract_id.clone(), document);
        }
        Ok(Self {
            contracts,
        })
    }

    /// Looks up a contract by identifier.
    #[must_use]
    pub fn lookup(&self, contract_id: &ContractId) -> Option<&ContractDocument> {
        self.contracts.get(contract_id)
    }
}

// ============================================================================
// SECTION: Expanded Contracts
// ============================================================================

/// Fully expanded contract with all subcontracts inlined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpandedContract {
    /// Self-contained expanded document; `subcontracts` is empty.
    pub document: ContractDocument,
    /// Content hash of the pre-expansion source document.
    pub source_hash: HashDigest,
    /// Content hash of the expanded document.
    pub expanded_hash: HashDigest,
}

// ============================================================================
// SECTION: Expansion
// ============================================================================

/// Expands a document by inlining all subcontract references.
///
/// # Errors
///
/// Returns [`ExpandError`] on missing subcontracts, reference cycles, field
/// conflicts between siblings, or hashing failures.
pub fn expand(
    document: &ContractDocument,
    catalog: &SubcontractCatalog,
) -> Result<ExpandedContract, ExpandError> {
    let source_hash = document.content_hash()?;

    let mut path: BTreeSet<ContractId> = BTreeSet::new();
    path.insert(document.contract_id.clone());
    let mut fields: BTreeMap<String, SchemaValue> = BTreeMap::new();
    for subcontract in &document.subcontracts {
        let inherited = flatten(subcontract, catalog, &mut path)?;
        merge_inherited(&mut fields, inherited, subcontract)?;
    }
    // Own fields override anything inherited from subcontracts.
    for (field, value) in &document.fields {
        fields.insert(field.clone(), value.clone());
    }

    let expanded = ContractDocument {
        contract_id: document.contract_id.clone(),
        fields,
        subcontracts: BTreeSet::new(),
    };
    let expanded_hash = expanded.content_hash()?;
    Ok(ExpandedContract {
        document: expanded,
        source_hash,
        expanded_hash,
    })
}

/// Recursively flattens a subcontract into its effective field map.
fn flatten(
    contract_id: &ContractId,
    catalog: &SubcontractCatalog,
    path: &mut BTreeSet<ContractId>,
) -> Result<BTreeMap<String, SchemaValue>, ExpandError> {
    let Some(document) = catalog.lookup(contract_id) else {
        return Err(ExpandError::MissingSubcontract(contract_id.to_string()));
    };
    if !path.insert(contract_id.clone()) {
        return Err(ExpandError::CyclicReference(contract_id.to_string()));
    }

    let mut fields: BTreeMap<String, SchemaValue> = BTreeMap::new();
    for subcontract in &document.subcontracts {
        let inherited = flatten(subcontract, catalog, path)?;
        merge_inherited(&mut fields, inherited, subcontract)?;
    }
    for (field, value) in &document.fields {
        fields.insert(field.clone(), value.clone());
    }

    path.remove(contract_id);
    Ok(fields)
}

/// Merges inherited fields, rejecting conflicting sibling contributions.
fn merge_inherited(
    fields: &mut BTreeMap<String, SchemaValue>,
    inherited: BTreeMap<String, SchemaValue>,
    contributor: &ContractId,
) -> Result<(), ExpandError> {
    for (field, value) in inherited {
        if let Some(existing) = fields.get(&field) {
            if existing != &value {
                return Err(ExpandError::FieldConflict {
                    field,
                    contract_id: contributor.to_string(),
                });
            }
        } else {
            fields.insert(field, value);
        }
    }
    Ok(())
}
