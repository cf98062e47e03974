// crates/onex-contract/src/pipeline.rs
// ============================================================================
// Module: Onex Contract Validation Pipeline
// Description: Three-phase patch validation with a pluggable constraint seam.
// Purpose: Orchestrate PATCH, MERGE, and EXPANDED validation with short-circuiting.
// Dependencies: crate::{document, expand, merge, patch, validators}, serde
// ============================================================================

//! ## Overview
//! The pipeline runs three strictly ordered phases over a proposed patch:
//! the patch in isolation, the patch applied to the base, and the merged
//! result fully expanded. A failure at any phase halts the pipeline with a
//! phase-tagged result; later phases and the injected constraint validator
//! never run speculatively past a failure.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::document::ContractDocument;
use crate::expand::ExpandedContract;
use crate::expand::SubcontractCatalog;
use crate::expand::expand;
use crate::merge::MergedContract;
use crate::merge::merge_contract;
use crate::patch::ContractPatch;
use crate::validators::ContractPatchValidator;
use crate::validators::ContractViolation;
use crate::validators::ExpandedContractValidator;
use crate::validators::MergeValidator;

// ============================================================================
// SECTION: Validation Phases
// ============================================================================

/// Pipeline phase identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPhase {
    /// Patch checked in isolation.
    Patch,
    /// Patch applied to the base and the merged result checked.
    Merge,
    /// Merged result fully expanded and checked.
    Expanded,
}

impl ValidationPhase {
    /// Returns the canonical snake_case phase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Patch => "patch",
            Self::Merge => "merge",
            Self::Expanded => "expanded",
        }
    }
}

impl fmt::Display for ValidationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Constraint Validator Seam
// ============================================================================

/// Verdict returned by an injected constraint validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConstraintVerdict {
    /// All constraints hold.
    Satisfied,
    /// One or more constraints are violated.
    Violated {
        /// Violated constraints.
        violations: Vec<ContractViolation>,
    },
}

/// Pluggable constraint validation seam invoked during the merge phase.
///
/// Implementations must be deterministic over their inputs; the pipeline
/// invokes them at most once per request and never after a phase failure.
pub trait ConstraintValidator {
    /// Validates the base, patch, and merged document together.
    fn validate(
        &self,
        base: &ContractDocument,
        patch: &ContractPatch,
        merged: &ContractDocument,
    ) -> ConstraintVerdict;
}

// ============================================================================
// SECTION: Pipeline Results
// ============================================================================

/// Outcome of a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineResult {
    /// All phases passed.
    Accepted {
        /// Content-addressed merge result.
        merged: MergedContract,
        /// Fully expanded contract.
        expanded: ExpandedContract,
    },
    /// A phase failed and halted the pipeline.
    Halted {
        /// Phase the pipeline halted at.
        phase: ValidationPhase,
        /// Violations surfaced by the failing phase.
        violations: Vec<ContractViolation>,
    },
}

impl PipelineResult {
    /// Returns true when all phases passed.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    /// Returns the halting phase when the pipeline failed.
    #[must_use]
    pub const fn halted_phase(&self) -> Option<ValidationPhase> {
        match self {
            Self::Accepted {
                ..
            } => None,
            Self::Halted {
                phase, ..
            } => Some(*phase),
        }
    }
}

// ============================================================================
// SECTION: Contract Validation Pipeline
// ============================================================================

/// Three-phase contract validation pipeline.
///
/// # Invariants
/// - Phases run in PATCH, MERGE, EXPANDED order; the first failure halts.
/// - The pipeline owns no state beyond the request being processed.
pub struct ContractValidationPipeline {
    /// Catalog used to resolve subcontracts during expansion.
    catalog: SubcontractCatalog,
    /// Phase 1 validator.
    patch_validator: ContractPatchValidator,
    /// Phase 2 validator.
    merge_validator: MergeValidator,
    /// Phase 3 validator.
    expanded_validator: ExpandedContractValidator,
    /// Optional injected constraint validator for the merge phase.
    constraint_validator: Option<Box<dyn ConstraintValidator>>,
}

impl ContractValidationPipeline {
    /// Creates a pipeline over a subcontract catalog.
    #[must_use]
    pub const fn new(catalog: SubcontractCatalog) -> Self {
        Self {
            catalog,
            patch_validator: ContractPatchValidator::new(),
            merge_validator: MergeValidator::new(),
            expanded_validator: ExpandedContractValidator::new(),
            constraint_validator: None,
        }
    }

    /// Returns the pipeline with a constraint validator injected.
    #[must_use]
    pub fn with_constraint_validator(
        mut self,
        validator: Box<dyn ConstraintValidator>,
    ) -> Self {
        self.constraint_validator = Some(validator);
        self
    }

    /// Validates a patch against a base contract through all three phases.
    #[must_use]
    pub fn validate(&self, base: &ContractDocument, patch: &ContractPatch) -> PipelineResult {
        // Phase 1: the patch in isolation.
        let patch_violations = self.patch_validator.validate(patch);
        if !patch_violations.is_empty() {
            return PipelineResult::Halted {
                phase: ValidationPhase::Patch,
                violations: patch_violations,
            };
        }

        // Phase 2: apply and check the merged result.
        let merged = match merge_contract(base, patch) {
            Ok(merged) => merged,
            Err(err) => {
                return PipelineResult::Halted {
                    phase: ValidationPhase::Merge,
                    violations: vec![ContractViolation::new("merge.apply", err.to_string())],
                };
            }
        };
        let merge_violations = self.merge_validator.validate(&merged.document);
        if !merge_violations.is_empty() {
            return PipelineResult::Halted {
                phase: ValidationPhase::Merge,
                violations: merge_violations,
            };
        }
        if let Some(validator) = &self.constraint_validator
            && let ConstraintVerdict::Violated {
                violations,
            } = validator.validate(base, patch, &merged.document)
        {
            return PipelineResult::Halted {
                phase: ValidationPhase::Merge,
                violations,
            };
        }

        // Phase 3: expand and check the fully inlined contract.
        let expanded = match expand(&merged.document, &self.catalog) {
            Ok(expanded) => expanded,
            Err(err) => {
                return PipelineResult::Halted {
                    phase: ValidationPhase::Expanded,
                    violations: vec![ContractViolation::new("expanded.expand", err.to_string())],
                };
            }
        };
        let expanded_violations = self.expanded_validator.validate(&expanded);
        if !expanded_violations.is_empty() {
            return PipelineResult::Halted {
                phase: ValidationPhase::Expanded,
                violations: expanded_violations,
            };
        }

        PipelineResult::Accepted {
            merged,
            expanded,
        }
    }
}
