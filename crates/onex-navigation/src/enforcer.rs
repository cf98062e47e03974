// crates/onex-navigation/src/enforcer.rs
// ============================================================================
// Module: Onex Graph Boundary Enforcer
// Description: Validation of proposed transitions against the action set.
// Purpose: Reject out-of-set, guard-failing, or precondition-violating moves.
// Dependencies: crate::{actions, graph, guard}, serde
// ============================================================================

//! ## Overview
//! The boundary enforcer validates a proposed typed action in a fixed check
//! order: membership in the enumerated action set, then the transition
//! guard, then the target state's preconditions. The first failing check
//! short-circuits; later checks are never evaluated after a rejection.

// ============================================================================
// SECTION: Imports
// ============================================================================

use onex_core::StateId;
use serde::Deserialize;
use serde::Serialize;

use crate::actions::ActionSetEnumerator;
use crate::actions::TypedAction;
use crate::graph::ContractGraph;
use crate::guard::GuardContext;

// ============================================================================
// SECTION: Validation Results
// ============================================================================

/// Reason a proposed transition was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    /// Action is not in the enumerated action set for the state.
    NotInActionSet,
    /// Transition guard evaluated false against the context.
    GuardFailed,
    /// Target state preconditions are unsatisfied.
    PreconditionNotSatisfied,
}

/// Outcome of boundary validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransitionValidation {
    /// The proposed transition is valid.
    Valid,
    /// The proposed transition was rejected.
    Rejected {
        /// Rejection reason.
        reason: RejectionReason,
    },
}

impl TransitionValidation {
    /// Returns true when the validation passed.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

// ============================================================================
// SECTION: Graph Boundary Enforcer
// ============================================================================

/// Validates proposed transitions against the contract graph.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphBoundaryEnforcer {
    /// Enumerator supplying the closed action set.
    enumerator: ActionSetEnumerator,
}

impl GraphBoundaryEnforcer {
    /// Creates a new enforcer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            enumerator: ActionSetEnumerator::new(),
        }
    }

    /// Validates a proposed action at a state against a guard context.
    ///
    /// Checks run in fixed order and short-circuit: action-set membership,
    /// transition guard, target preconditions.
    #[must_use]
    pub fn validate(
        &self,
        graph: &ContractGraph,
        state_id: &StateId,
        proposed: &TypedAction,
        ctx: &GuardContext,
    ) -> TransitionValidation {
        let actions = self.enumerator.enumerate(graph, state_id);
        if !actions.contains(proposed) {
            return TransitionValidation::Rejected {
                reason: RejectionReason::NotInActionSet,
            };
        }

        let Some(transition) = graph.transition(&proposed.transition_id) else {
            return TransitionValidation::Rejected {
                reason: RejectionReason::NotInActionSet,
            };
        };
        if !transition.guard.evaluate(ctx) {
            return TransitionValidation::Rejected {
                reason: RejectionReason::GuardFailed,
            };
        }

        let Some(target) = graph.state(&transition.target) else {
            return TransitionValidation::Rejected {
                reason: RejectionReason::NotInActionSet,
            };
        };
        if !target.preconditions.iter().all(|precondition| precondition.evaluate(ctx)) {
            return TransitionValidation::Rejected {
                reason: RejectionReason::PreconditionNotSatisfied,
            };
        }

        TransitionValidation::Valid
    }
}
