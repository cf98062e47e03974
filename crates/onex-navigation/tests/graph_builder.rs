// crates/onex-navigation/tests/graph_builder.rs
// ============================================================================
// Module: Contract Graph Builder Tests
// Description: Graph construction, adjacency, and fail-loud build errors.
// Purpose: Ensure invalid registries never produce a partially-valid graph.
// Dependencies: onex-navigation
// ============================================================================
//! ## Overview
//! Validates that building succeeds on well-formed registries with sorted
//! adjacency, and fails loudly on empty registries, duplicates, source
//! mismatches, and dangling transition targets.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only panic-based assertions are permitted."
)]

use onex_core::StateId;
use onex_core::TransitionId;
use onex_navigation::ContractGraphBuilder;
use onex_navigation::ContractState;
use onex_navigation::ContractTransition;
use onex_navigation::GraphBuildError;
use onex_navigation::GuardCondition;
use onex_navigation::NodeRegistrySnapshot;
use onex_navigation::RegistryNode;
use onex_navigation::TransitionCost;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds a contract state with no capabilities or preconditions.
fn state(state_id: &str) -> ContractState {
    ContractState {
        state_id: StateId::new(state_id),
        capabilities: std::collections::BTreeSet::new(),
        preconditions: Vec::new(),
    }
}

/// Builds an unguarded transition.
fn transition(transition_id: &str, source: &str, target: &str) -> ContractTransition {
    ContractTransition {
        transition_id: TransitionId::new(transition_id),
        source: StateId::new(source),
        target: StateId::new(target),
        guard: GuardCondition::always(),
        cost: TransitionCost::default(),
    }
}

// ============================================================================
// SECTION: Successful Builds
// ============================================================================

#[test]
fn well_formed_registry_builds_with_sorted_adjacency() {
    let snapshot = NodeRegistrySnapshot {
        nodes: vec![
            RegistryNode {
                state: state("st.a"),
                transitions: vec![
                    transition("tr.zeta", "st.a", "st.b"),
                    transition("tr.alpha", "st.a", "st.b"),
                ],
            },
            RegistryNode {
                state: state("st.b"),
                transitions: Vec::new(),
            },
        ],
    };
    let graph = ContractGraphBuilder::new().build(&snapshot).expect("build");

    let outgoing: Vec<&str> = graph
        .outgoing(&StateId::new("st.a"))
        .iter()
        .map(TransitionId::as_str)
        .collect::<Vec<&str>>();
    assert_eq!(outgoing, vec!["tr.alpha", "tr.zeta"]);

    let incoming: Vec<&str> = graph
        .incoming(&StateId::new("st.b"))
        .iter()
        .map(TransitionId::as_str)
        .collect::<Vec<&str>>();
    assert_eq!(incoming, vec!["tr.alpha", "tr.zeta"]);
    assert!(graph.outgoing(&StateId::new("st.b")).is_empty());
}

// ============================================================================
// SECTION: Build Errors
// ============================================================================

#[test]
fn empty_registry_fails_to_build() {
    let result = ContractGraphBuilder::new().build(&NodeRegistrySnapshot::default());
    assert!(matches!(result, Err(GraphBuildError::EmptyRegistry)));
}

#[test]
fn duplicate_states_fail_to_build() {
    let snapshot = NodeRegistrySnapshot {
        nodes: vec![
            RegistryNode {
                state: state("st.a"),
                transitions: Vec::new(),
            },
            RegistryNode {
                state: state("st.a"),
                transitions: Vec::new(),
            },
        ],
    };
    let result = ContractGraphBuilder::new().build(&snapshot);
    assert!(matches!(result, Err(GraphBuildError::DuplicateState(_))));
}

#[test]
fn duplicate_transitions_fail_to_build() {
    let snapshot = NodeRegistrySnapshot {
        nodes: vec![
            RegistryNode {
                state: state("st.a"),
                transitions: vec![
                    transition("tr.ab", "st.a", "st.b"),
                    transition("tr.ab", "st.a", "st.b"),
                ],
            },
            RegistryNode {
                state: state("st.b"),
                transitions: Vec::new(),
            },
        ],
    };
    let result = ContractGraphBuilder::new().build(&snapshot);
    assert!(matches!(result, Err(GraphBuildError::DuplicateTransition(_))));
}

#[test]
fn transition_declared_by_foreign_state_fails_to_build() {
    let snapshot = NodeRegistrySnapshot {
        nodes: vec![
            RegistryNode {
                state: state("st.a"),
                transitions: vec![transition("tr.bc", "st.b", "st.a")],
            },
            RegistryNode {
                state: state("st.b"),
                transitions: Vec::new(),
            },
        ],
    };
    let result = ContractGraphBuilder::new().build(&snapshot);
    assert!(matches!(result, Err(GraphBuildError::SourceMismatch { .. })));
}

#[test]
fn dangling_target_fails_to_build_instead_of_dropping() {
    let snapshot = NodeRegistrySnapshot {
        nodes: vec![RegistryNode {
            state: state("st.a"),
            transitions: vec![transition("tr.ax", "st.a", "st.ghost")],
        }],
    };
    let result = ContractGraphBuilder::new().build(&snapshot);
    assert!(matches!(result, Err(GraphBuildError::DanglingTarget { .. })));
}
