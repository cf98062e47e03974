// crates/onex-contract/src/patch.rs
// ============================================================================
// Module: Onex Contract Patches
// Description: Proposed contract deltas with overlay scope precedence.
// Purpose: Define the patch operations applied by the merge engine.
// Dependencies: onex-core, serde
// ============================================================================

//! ## Overview
//! A contract patch is a proposed delta: an ordered list of field and
//! subcontract operations tagged with an overlay scope. Scopes form an
//! ordered precedence (org below team below local) governing the order in
//! which stacked patches apply; a later scope overrides an earlier one for
//! the same field.

// ============================================================================
// SECTION: Imports
// ============================================================================

use onex_core::ContractId;
use onex_core::SchemaValue;
use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Overlay Scopes
// ============================================================================

/// Precedence tier governing patch stacking order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayScope {
    /// Organization-wide overlay, applied first.
    Org,
    /// Team overlay, applied over org.
    Team,
    /// Local overlay, applied last and overriding all others.
    Local,
}

impl OverlayScope {
    /// Returns the precedence ordinal (higher applies later and wins).
    #[must_use]
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Org => 0,
            Self::Team => 1,
            Self::Local => 2,
        }
    }
}

// ============================================================================
// SECTION: Patch Operations
// ============================================================================

/// One patch operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PatchOp {
    /// Sets or replaces a field value.
    SetField {
        /// Field name.
        field: String,
        /// Field value.
        value: SchemaValue,
    },
    /// Removes an existing field.
    RemoveField {
        /// Field name.
        field: String,
    },
    /// Adds a subcontract reference.
    AddSubcontract {
        /// Referenced contract identifier.
        contract_id: ContractId,
    },
    /// Removes an existing subcontract reference.
    RemoveSubcontract {
        /// Referenced contract identifier.
        contract_id: ContractId,
    },
}

// ============================================================================
// SECTION: Contract Patches
// ============================================================================

/// Proposed contract delta scoped to an overlay tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractPatch {
    /// Overlay scope of the patch.
    pub scope: OverlayScope,
    /// Ordered patch operations.
    pub ops: Vec<PatchOp>,
}

impl ContractPatch {
    /// Creates an empty patch at the given scope.
    #[must_use]
    pub const fn new(scope: OverlayScope) -> Self {
        Self {
            scope,
            ops: Vec::new(),
        }
    }

    /// Returns the patch with the operation appended.
    #[must_use]
    pub fn with_op(mut self, op: PatchOp) -> Self {
        self.ops.push(op);
        self
    }
}
