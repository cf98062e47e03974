// crates/onex-navigation/src/graph.rs
// ============================================================================
// Module: Onex Contract Graph
// Description: Declared contract states, typed transitions, and graph building.
// Purpose: Build an immutable, totally-valid graph from a node registry snapshot.
// Dependencies: crate::guard, onex-core, serde
// ============================================================================

//! ## Overview
//! The contract graph is built once per node registry snapshot and treated as
//! read-only for the lifetime of a planning session. Building fails loudly on
//! dangling references or duplicate identifiers rather than producing a graph
//! with unreachable or ambiguous edges; downstream enumeration, enforcement,
//! and planning all assume total edge validity.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use onex_core::CapabilityId;
use onex_core::StateId;
use onex_core::TransitionId;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::guard::GuardCondition;

// ============================================================================
// SECTION: Contract States
// ============================================================================

/// Declared, schema-validated node contract state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractState {
    /// State identifier.
    pub state_id: StateId,
    /// Capabilities the state declares.
    #[serde(default)]
    pub capabilities: BTreeSet<CapabilityId>,
    /// Preconditions that must hold to enter the state.
    #[serde(default)]
    pub preconditions: Vec<GuardCondition>,
}

// ============================================================================
// SECTION: Contract Transitions
// ============================================================================

/// Planner cost metadata for transition ordering.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TransitionCost(u32);

impl TransitionCost {
    /// Creates a transition cost.
    #[must_use]
    pub const fn new(cost: u32) -> Self {
        Self(cost)
    }

    /// Returns the raw cost value.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

/// Typed edge between two contract states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractTransition {
    /// Transition identifier.
    pub transition_id: TransitionId,
    /// Source state identifier.
    pub source: StateId,
    /// Target state identifier.
    pub target: StateId,
    /// Guard that must hold for the transition to fire.
    #[serde(default)]
    pub guard: GuardCondition,
    /// Cost metadata for planner ordering.
    #[serde(default)]
    pub cost: TransitionCost,
}

// ============================================================================
// SECTION: Node Registry Snapshot
// ============================================================================

/// One node registry entry: a state plus the transitions it declares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryNode {
    /// Declared contract state.
    pub state: ContractState,
    /// Transitions declared by the node; sources must be the node's state.
    #[serde(default)]
    pub transitions: Vec<ContractTransition>,
}

/// Point-in-time collection of node registry entries.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeRegistrySnapshot {
    /// Registry entries.
    pub nodes: Vec<RegistryNode>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Graph construction errors.
///
/// These are programmer errors in the registry data, raised at build time so
/// planning never observes a partially-valid graph.
#[derive(Debug, Error)]
pub enum GraphBuildError {
    /// Snapshot contains no nodes.
    #[error("node registry snapshot must contain at least one node")]
    EmptyRegistry,
    /// Duplicate state identifiers detected.
    #[error("duplicate contract state: {0}")]
    DuplicateState(String),
    /// Duplicate transition identifiers detected.
    #[error("duplicate contract transition: {0}")]
    DuplicateTransition(String),
    /// Transition declared under a node it does not start from.
    #[error("transition {transition_id} declared by state {declared_by} but starts at {actual_source}")]
    SourceMismatch {
        /// Offending transition identifier.
        transition_id: String,
        /// State that declared the transition.
        declared_by: String,
        /// Actual source of the transition.
        actual_source: String,
    },
    /// Transition references an undeclared target state.
    #[error("transition {transition_id} targets undeclared state {target}")]
    DanglingTarget {
        /// Offending transition identifier.
        transition_id: String,
        /// Undeclared target state identifier.
        target: String,
    },
}

// ============================================================================
// SECTION: Contract Graph
// ============================================================================

/// Immutable graph of contract states and typed transitions.
///
/// # Invariants
/// - Every transition's source and target are declared states.
/// - Identifier maps are unique; adjacency lists are sorted by transition id.
/// - Rebuilding requires a fresh snapshot; the graph itself never mutates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractGraph {
    /// States keyed by identifier.
    states: BTreeMap<StateId, ContractState>,
    /// Transitions keyed by identifier.
    transitions: BTreeMap<TransitionId, ContractTransition>,
    /// Outgoing transition ids per state.
    outgoing: BTreeMap<StateId, Vec<TransitionId>>,
    /// Incoming transition ids per state.
    incoming: BTreeMap<StateId, Vec<TransitionId>>,
}

impl ContractGraph {
    /// Looks up a state by identifier.
    #[must_use]
    pub fn state(&self, state_id: &StateId) -> Option<&ContractState> {
        self.states.get(state_id)
    }

    /// Looks up a transition by identifier.
    #[must_use]
    pub fn transition(&self, transition_id: &TransitionId) -> Option<&ContractTransition> {
        self.transitions.get(transition_id)
    }

    /// Returns outgoing transition ids for a state, sorted by identifier.
    #[must_use]
    pub fn outgoing(&self, state_id: &StateId) -> &[TransitionId] {
        self.outgoing.get(state_id).map_or(&[], Vec::as_slice)
    }

    /// Returns incoming transition ids for a state, sorted by identifier.
    #[must_use]
    pub fn incoming(&self, state_id: &StateId) -> &[TransitionId] {
        self.incoming.get(state_id).map_or(&[], Vec::as_slice)
    }

    /// Returns all states in identifier order.
    pub fn states(&self) -> impl Iterator<Item = &ContractState> {
        self.states.values()
    }

    /// Returns all transitions in identifier order.
    pub fn transitions(&self) -> impl Iterator<Item = &ContractTransition> {
        self.transitions.values()
    }
}

// ============================================================================
// SECTION: Contract Graph Builder
// ============================================================================

/// Builder producing immutable contract graphs from registry snapshots.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContractGraphBuilder;

impl ContractGraphBuilder {
    /// Creates a new builder.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Builds a contract graph from a node registry snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`GraphBuildError`] on empty registries, duplicate
    /// identifiers, source mismatches, or dangling targets. The builder
    /// never silently drops an invalid edge.
    pub fn build(&self, snapshot: &NodeRegistrySnapshot) -> Result<ContractGraph, GraphBuildError> {
        if snapshot.nodes.is_empty() {
            return Err(GraphBuildError::EmptyRegistry);
        }

        let mut states: BTreeMap<StateId, ContractState> = BTreeMap::new();
        for node in &snapshot.nodes {
            if states.contains_key(&node.state.state_id) {
                return Err(GraphBuildError::DuplicateState(node.state.state_id.to_string()));
            }
            states.insert(node.state.state_id.clone(), node.state.clone());
        }

        let mut transitions: BTreeMap<TransitionId, ContractTransition> = BTreeMap::new();
        for node in &snapshot.nodes {
            for transition in &node.transitions {
                if transitions.contains_key(&transition.transition_id) {
                    return Err(GraphBuildError::DuplicateTransition(
                        transition.transition_id.to_string(),
                    ));
                }
                if transition.source != node.state.state_id {
                    return Err(GraphBuildError::SourceMismatch {
                        transition_id: transition.transition_id.to_string(),
                        declared_by: node.state.state_id.to_string(),
                        actual_source: transition.source.to_string(),
                    });
                }
                if !states.contains_key(&transition.target) {
                    return Err(GraphBuildError::DanglingTarget {
                        transition_id: transition.transition_id.to_string(),
                        target: transition.target.to_string(),
                    });
                }
                transitions.insert(transition.transition_id.clone(), transition.clone());
            }
        }

        let mut outgoing: BTreeMap<StateId, Vec<TransitionId>> = BTreeMap::new();
        let mut incoming: BTreeMap<StateId, Vec<TransitionId>> = BTreeMap::new();
        for transition in transitions.values() {
            outgoing
                .entry(transition.source.clone())
                .or_default()
                .push(transition.transition_id.clone());
            incoming
                .entry(transition.target.clone())
                .or_default()
                .push(transition.transition_id.clone());
        }
        for ids in outgoing.values_mut() {
            ids.sort();
        }
        for ids in incoming.values_mut() {
            ids.sort();
        }

        Ok(ContractGraph {
            states,
            transitions,
            outgoing,
            incoming,
        })
    }
}
