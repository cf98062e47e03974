// crates/onex-contract/src/validators.rs
// ============================================================================
// Module: Onex Phase Validators
// Description: Patch, merge, and expanded-contract validators.
// Purpose: Provide the per-phase checks run by the validation pipeline.
// Dependencies: crate::{document, expand, patch}, onex-core, serde
// ============================================================================

//! ## Overview
//! Each pipeline phase has a dedicated validator. The patch validator checks
//! a patch in isolation, the merge validator checks the merged document, and
//! the expanded validator checks cross-field consistency that is only
//! visible once subcontracts are inlined. Validators return violation lists;
//! an empty list means the phase passed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use onex_core::SchemaValue;
use serde::Deserialize;
use serde::Serialize;

use crate::document::ContractDocument;
use crate::expand::ExpandedContract;
use crate::patch::ContractPatch;
use crate::patch::PatchOp;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum nesting depth for patched field values.
pub(crate) const MAX_FIELD_DEPTH: usize = 32;
/// Maximum number of fields in a merged document.
pub(crate) const MAX_FIELDS: usize = 1024;

// ============================================================================
// SECTION: Violations
// ============================================================================

/// Specific violated constraint surfaced by a validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractViolation {
    /// Stable constraint identifier.
    pub constraint: String,
    /// Human-readable violation description.
    pub message: String,
}

impl ContractViolation {
    /// Creates a violation.
    #[must_use]
    pub fn new(constraint: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            constraint: constraint.into(),
            message: message.into(),
        }
    }
}

// ============================================================================
// SECTION: Patch Validator
// ============================================================================

/// Validates a patch in isolation, independent of any base contract.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContractPatchValidator;

impl ContractPatchValidator {
    /// Creates a new patch validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Checks structural well-formedness and field-level constraints.
    #[must_use]
    pub fn validate(&self, patch: &ContractPatch) -> Vec<ContractViolation> {
        let mut violations = Vec::new();
        if patch.ops.is_empty() {
            violations.push(ContractViolation::new(
                "patch.ops.nonempty",
                "patch must contain at least one operation",
            ));
            return violations;
        }

        let mut set_fields: BTreeSet<&str> = BTreeSet::new();
        let mut removed_fields: BTreeSet<&str> = BTreeSet::new();
        let mut added_subcontracts: BTreeSet<&str> = BTreeSet::new();
        let mut removed_subcontracts: BTreeSet<&str> = BTreeSet::new();
        for op in &patch.ops {
            match op {
                PatchOp::SetField {
                    field,
                    value,
                } => {
                    if field.trim().is_empty() {
                        violations.push(ContractViolation::new(
                            "patch.field.name",
                            "set field name is empty",
                        ));
                    }
                    if !set_fields.insert(field.as_str()) {
                        violations.push(ContractViolation::new(
                            "patch.field.duplicate_set",
                            format!("field {field} set more than once"),
                        ));
                    }
                    if value_depth(value) > MAX_FIELD_DEPTH {
                        violations.push(ContractViolation::new(
                            "patch.field.depth",
                            format!("field {field} value exceeds nesting depth {MAX_FIELD_DEPTH}"),
                        ));
                    }
                }
                PatchOp::RemoveField {
                    field,
                } => {
                    if field.trim().is_empty() {
                        violations.push(ContractViolation::new(
                            "patch.field.name",
                            "removed field name is empty",
                        ));
                    }
                    removed_fields.insert(field.as_str());
                }
                PatchOp::AddSubcontract {
                    contract_id,
                } => {
                    added_subcontracts.insert(contract_id.as_str());
                }
                PatchOp::RemoveSubcontract {
                    contract_id,
                } => {
                    removed_subcontracts.insert(contract_id.as_str());
                }
            }
        }

        for field in set_fields.intersection(&removed_fields) {
            violations.push(ContractViolation::new(
                "patch.field.set_and_remove",
                format!("field {field} both set and removed"),
            ));
        }
        for contract_id in added_subcontracts.intersection(&removed_subcontracts) {
            violations.push(ContractViolation::new(
                "patch.subcontract.add_and_remove",
                format!("subcontract {contract_id} both added and removed"),
            ));
        }
        violations
    }
}

// ============================================================================
// SECTION: Merge Validator
// ============================================================================

/// Validates a merged contract document.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeValidator;

impl MergeValidator {
    /// Creates a new merge validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Checks the merged document's structural invariants.
    #[must_use]
    pub fn validate(&self, merged: &ContractDocument) -> Vec<ContractViolation> {
        let mut violations = Vec::new();
        if merged.contract_id.as_str().trim().is_empty() {
            violations.push(ContractViolation::new(
                "merge.contract_id",
                "merged contract identifier is empty",
            ));
        }
        if merged.fields.len() > MAX_FIELDS {
            violations.push(ContractViolation::new(
                "merge.field_limit",
                format!("merged contract exceeds {MAX_FIELDS} fields"),
            ));
        }
        if merged.subcontracts.contains(&merged.contract_id) {
            violations.push(ContractViolation::new(
                "merge.subcontract.self",
                "merged contract references itself as a subcontract",
            ));
        }
        violations
    }
}

// ============================================================================
// SECTION: Expanded Validator
// ============================================================================

/// Validates a fully expanded contract.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpandedContractValidator;

impl ExpandedContractValidator {
    /// Creates a new expanded-contract validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Checks cross-field consistency that is only visible post-expansion.
    ///
    /// A `requires` field listing field names asserts that every named field
    /// exists somewhere in the expanded document, including fields inherited
    /// from subcontracts.
    #[must_use]
    pub fn validate(&self, expanded: &ExpandedContract) -> Vec<ContractViolation> {
        let mut violations = Vec::new();
        if !expanded.document.subcontracts.is_empty() {
            violations.push(ContractViolation::new(
                "expanded.subcontracts.inlined",
                "expanded contract still carries subcontract references",
            ));
        }
        for (field, value) in &expanded.document.fields {
            if value.is_null() {
                violations.push(ContractViolation::new(
                    "expanded.field.null",
                    format!("expanded field {field} is null"),
                ));
            }
        }
        if let Some(SchemaValue::Array(required)) = expanded.document.fields.get("requires") {
            for entry in required {
                if let SchemaValue::String(name) = entry
                    && !expanded.document.fields.contains_key(name)
                {
                    violations.push(ContractViolation::new(
                        "expanded.requires.missing",
                        format!("required field {name} missing from expanded contract"),
                    ));
                }
            }
        }
        violations
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Measures the nesting depth of a schema value.
fn value_depth(value: &SchemaValue) -> usize {
    match value {
        SchemaValue::Null
        | SchemaValue::Bool(_)
        | SchemaValue::Number(_)
        | SchemaValue::String(_) => 1,
        SchemaValue::Array(elements) => {
            1 + elements.iter().map(value_depth).max().unwrap_or(0)
        }
        SchemaValue::Object(members) => {
            1 + members.values().map(value_depth).max().unwrap_or(0)
        }
    }
}
