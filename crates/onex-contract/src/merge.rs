// crates/onex-contract/src/merge.rs
// ============================================================================
// Module: Onex Contract Merge Engine
// Description: Patch application and overlay stacking with content hashing.
// Purpose: Produce content-addressed merged contracts from base plus patches.
// Dependencies: crate::{document, patch}, onex-core, serde
// ============================================================================

//! ## Overview
//! The merge engine applies patch operations to a base document and records
//! both the base and merged content hashes so merges are content addressed.
//! Multiple patches stack in overlay scope precedence order (org, team,
//! local) with stable ordering within a scope; removal of data that is not
//! present is a merge failure, not a silent no-op.

// ============================================================================
// SECTION: Imports
// ============================================================================

use onex_core::HashDigest;
use onex_core::HashError;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::document::ContractDocument;
use crate::patch::ContractPatch;
use crate::patch::PatchOp;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Merge engine failures.
#[derive(Debug, Error)]
pub enum MergeError {
    /// Patch removes a field the base does not carry.
    #[error("patch removes missing field: {0}")]
    RemoveMissingField(String),
    /// Patch removes a subcontract the base does not reference.
    #[error("patch removes missing subcontract: {0}")]
    RemoveMissingSubcontract(String),
    /// Patch adds a subcontract reference that already exists.
    #[error("patch adds duplicate subcontract: {0}")]
    DuplicateSubcontract(String),
    /// Content hashing failed.
    #[error("merge hashing failed: {0}")]
    Hashing(#[from] HashError),
}

// ============================================================================
// SECTION: Merged Contracts
// ============================================================================

/// Content-addressed merge result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedContract {
    /// Merged document.
    pub document: ContractDocument,
    /// Content hash of the base document.
    pub base_hash: HashDigest,
    /// Content hash of the merged document.
    pub content_hash: HashDigest,
}

// ============================================================================
// SECTION: Patch Application
// ============================================================================

/// Applies a single patch to a base document.
///
/// # Errors
///
/// Returns [`MergeError`] when an operation removes data the base does not
/// carry or duplicates a subcontract reference.
pub fn apply_patch(
    base: &ContractDocument,
    patch: &ContractPatch,
) -> Result<ContractDocument, MergeError> {
    let mut merged = base.clone();
    for op in &patch.ops {
        match op {
            PatchOp::SetField {
                field,
                value,
            } => {
                merged.fields.insert(field.clone(), value.clone());
            }
            PatchOp::RemoveField {
                field,
            } => {
                if merged.fields.remove(field).is_none() {
                    return Err(MergeError::RemoveMissingField(field.clone()));
                }
            }
            PatchOp::AddSubcontract {
                contract_id,
            } => {
                if !merged.subcontracts.insert(contract_id.clone()) {
                    return Err(MergeError::DuplicateSubcontract(contract_id.to_string()));
                }
            }
            PatchOp::RemoveSubcontract {
                contract_id,
            } => {
                if !merged.subcontracts.remove(contract_id) {
                    return Err(MergeError::RemoveMissingSubcontract(contract_id.to_string()));
                }
            }
        }
    }
    Ok(merged)
}

/// Applies a patch and records base and merged content hashes.
///
/// # Errors
///
/// Returns [`MergeError`] when application or hashing fails.
pub fn merge_contract(
    base: &ContractDocument,
    patch: &ContractPatch,
) -> Result<MergedContract, MergeError> {
    let base_hash = base.content_hash()?;
    let document = apply_patch(base, patch)?;
    let content_hash = document.content_hash()?;
    Ok(MergedContract {
        document,
        base_hash,
        content_hash,
    })
}

/// Applies stacked patches in overlay scope precedence order.
///
/// The sort is stable: patches within the same scope apply in input order,
/// and higher-precedence scopes apply later so they override lower ones.
///
/// # Errors
///
/// Returns [`MergeError`] when any patch application fails.
pub fn stack_patches(
    base: &ContractDocument,
    patches: &[ContractPatch],
) -> Result<ContractDocument, MergeError> {
    let mut ordered: Vec<&ContractPatch> = patches.iter().collect();
    ordered.sort_by_key(|patch| patch.scope.precedence());
    let mut merged = base.clone();
    for patch in ordered {
        merged = apply_patch(&merged, patch)?;
    }
    Ok(merged)
}
