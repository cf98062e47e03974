// crates/onex-navigation/src/actions.rs
// ============================================================================
// Module: Onex Typed Actions
// Description: Typed action wrappers and per-state action enumeration.
// Purpose: Give the enforcer and planner a closed, inspectable action set.
// Dependencies: crate::graph, onex-core, serde
// ============================================================================

//! ## Overview
//! Typed actions are the only currency the enforcer and planner reason over;
//! raw transitions never cross that boundary. Enumerating a state yields
//! exactly its outgoing transitions wrapped as actions, with stable
//! transition-id ordering for reproducible assertions.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use onex_core::StateId;
use onex_core::TransitionId;
use serde::Deserialize;
use serde::Serialize;

use crate::graph::ContractGraph;
use crate::graph::ContractTransition;
use crate::graph::TransitionCost;

// ============================================================================
// SECTION: Typed Actions
// ============================================================================

/// Strongly typed action derived from an available contract transition.
///
/// Ordering is by transition id first, which keeps enumeration output stable.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypedAction {
    /// Transition the action fires.
    pub transition_id: TransitionId,
    /// Source state of the transition.
    pub source: StateId,
    /// Target state of the transition.
    pub target: StateId,
    /// Cost metadata carried from the transition.
    pub cost: TransitionCost,
}

impl TypedAction {
    /// Wraps a contract transition as a typed action.
    #[must_use]
    pub fn from_transition(transition: &ContractTransition) -> Self {
        Self {
            transition_id: transition.transition_id.clone(),
            source: transition.source.clone(),
            target: transition.target.clone(),
            cost: transition.cost,
        }
    }
}

// ============================================================================
// SECTION: Action Set Enumerator
// ============================================================================

/// Enumerates the typed actions legally available at a state.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionSetEnumerator;

impl ActionSetEnumerator {
    /// Creates a new enumerator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Returns the typed actions available at `state_id`.
    ///
    /// The set contains exactly the outgoing transitions of the state; an
    /// undeclared state has an empty action set.
    #[must_use]
    pub fn enumerate(&self, graph: &ContractGraph, state_id: &StateId) -> BTreeSet<TypedAction> {
        graph
            .outgoing(state_id)
            .iter()
            .filter_map(|transition_id| graph.transition(transition_id))
            .map(TypedAction::from_transition)
            .collect()
    }
}
