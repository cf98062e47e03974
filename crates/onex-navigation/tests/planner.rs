// crates/onex-navigation/tests/planner.rs
// ============================================================================
// Module: Backward-Chaining Planner Tests
// Description: Plan ordering, cost tie-breaks, cycles, and depth bounds.
// Purpose: Ensure plans execute forward and obstructions report structured reasons.
// Dependencies: onex-core, onex-navigation
// ============================================================================
//! ## Overview
//! Validates the planner: goal-satisfied short-circuit, forward-ordered plan
//! output, deterministic cost-based predecessor choice, cycle detection,
//! depth bounding, and the missing-transition reason for unreachable goals.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only panic-based assertions are permitted."
)]

use std::collections::BTreeSet;

use onex_core::CapabilityId;
use onex_core::StateId;
use onex_core::TransitionId;
use onex_navigation::BackwardChainingPlanner;
use onex_navigation::ContractGraph;
use onex_navigation::ContractGraphBuilder;
use onex_navigation::ContractState;
use onex_navigation::ContractTransition;
use onex_navigation::GoalCondition;
use onex_navigation::GuardCondition;
use onex_navigation::NoPlanReason;
use onex_navigation::NodeRegistrySnapshot;
use onex_navigation::PlanResult;
use onex_navigation::PlannerConfig;
use onex_navigation::RegistryNode;
use onex_navigation::TransitionCost;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds a state declaring the given capabilities.
fn state(state_id: &str, capabilities: &[&str]) -> ContractState {
    ContractState {
        state_id: StateId::new(state_id),
        capabilities: capabilities
            .iter()
            .map(|capability| CapabilityId::new(*capability))
            .collect::<BTreeSet<CapabilityId>>(),
        preconditions: Vec::new(),
    }
}

/// Builds an unguarded transition with a cost.
fn transition(transition_id: &str, source: &str, target: &str, cost: u32) -> ContractTransition {
    ContractTransition {
        transition_id: TransitionId::new(transition_id),
        source: StateId::new(source),
        target: StateId::new(target),
        guard: GuardCondition::always(),
        cost: TransitionCost::new(cost),
    }
}

/// Builds a graph from nodes.
fn graph(nodes: Vec<RegistryNode>) -> ContractGraph {
    ContractGraphBuilder::new()
        .build(&NodeRegistrySnapshot {
            nodes,
        })
        .expect("build")
}

/// Builds the default planner.
fn planner() -> BackwardChainingPlanner {
    BackwardChainingPlanner::new(PlannerConfig::default())
}

// ============================================================================
// SECTION: Goal Short-Circuit
// ============================================================================

#[test]
fn satisfied_goal_returns_without_searching() {
    let graph = graph(vec![RegistryNode {
        state: state("st.a", &["cap.serve"]),
        transitions: Vec::new(),
    }]);
    let result = planner()
        .plan(
            &graph,
            &StateId::new("st.a"),
            &GoalCondition::DeclaresCapability {
                capability_id: CapabilityId::new("cap.serve"),
            },
        )
        .expect("plan");
    assert_eq!(result, PlanResult::GoalAlreadySatisfied);
}

#[test]
fn unknown_current_state_is_an_input_error() {
    let graph = graph(vec![RegistryNode {
        state: state("st.a", &[]),
        transitions: Vec::new(),
    }]);
    let result = planner().plan(
        &graph,
        &StateId::new("st.ghost"),
        &GoalCondition::StateIs {
            state_id: StateId::new("st.a"),
        },
    );
    assert!(result.is_err());
}

// ============================================================================
// SECTION: Forward-Ordered Plans
// ============================================================================

#[test]
fn linear_chain_plans_in_forward_execution_order() {
    let graph = graph(vec![
        RegistryNode {
            state: state("st.a", &[]),
            transitions: vec![transition("tr.ab", "st.a", "st.b", 1)],
        },
        RegistryNode {
            state: state("st.b", &[]),
            transitions: vec![transition("tr.bc", "st.b", "st.c", 1)],
        },
        RegistryNode {
            state: state("st.c", &["cap.goal"]),
            transitions: Vec::new(),
        },
    ]);
    let result = planner()
        .plan(
            &graph,
            &StateId::new("st.a"),
            &GoalCondition::StateIs {
                state_id: StateId::new("st.c"),
            },
        )
        .expect("plan");

    let PlanResult::Planned {
        plan,
    } = result
    else {
        panic!("expected a plan");
    };
    let ids: Vec<&str> =
        plan.steps.iter().map(|step| step.transition_id.as_str()).collect::<Vec<&str>>();
    assert_eq!(ids, vec!["tr.ab", "tr.bc"]);
    // Steps chain: each target is the next step's source.
    assert_eq!(plan.steps[0].source.as_str(), "st.a");
    assert_eq!(plan.steps[0].target.as_str(), plan.steps[1].source.as_str());
    assert_eq!(plan.steps[1].target.as_str(), "st.c");
    assert_eq!(plan.steps[0].step_index, 0);
    assert_eq!(plan.steps[1].step_index, 1);
}

#[test]
fn cheaper_predecessor_edge_wins_deterministically() {
    let graph = graph(vec![
        RegistryNode {
            state: state("st.a", &[]),
            transitions: vec![
                transition("tr.costly", "st.a", "st.goal", 9),
                transition("tr.cheap", "st.a", "st.goal", 1),
            ],
        },
        RegistryNode {
            state: state("st.goal", &[]),
            transitions: Vec::new(),
        },
    ]);
    let result = planner()
        .plan(
            &graph,
            &StateId::new("st.a"),
            &GoalCondition::StateIs {
                state_id: StateId::new("st.goal"),
            },
        )
        .expect("plan");

    let PlanResult::Planned {
        plan,
    } = result
    else {
        panic!("expected a plan");
    };
    assert_eq!(plan.steps.len(), 1);
    assert_eq!(plan.steps[0].transition_id.as_str(), "tr.cheap");
}

#[test]
fn capability_goal_reaches_any_declaring_state() {
    let graph = graph(vec![
        RegistryNode {
            state: state("st.a", &[]),
            transitions: vec![transition("tr.ab", "st.a", "st.b", 1)],
        },
        RegistryNode {
            state: state("st.b", &["cap.goal"]),
            transitions: Vec::new(),
        },
    ]);
    let result = planner()
        .plan(
            &graph,
            &StateId::new("st.a"),
            &GoalCondition::DeclaresCapability {
                capability_id: CapabilityId::new("cap.goal"),
            },
        )
        .expect("plan");
    assert!(matches!(result, PlanResult::Planned { .. }));
}

// ============================================================================
// SECTION: Structured No-Plan Reasons
// ============================================================================

#[test]
fn goal_with_no_incoming_transitions_reports_missing_transition() {
    let graph = graph(vec![
        RegistryNode {
            state: state("st.a", &[]),
            transitions: Vec::new(),
        },
        RegistryNode {
            state: state("st.island", &["cap.goal"]),
            transitions: Vec::new(),
        },
    ]);
    let result = planner()
        .plan(
            &graph,
            &StateId::new("st.a"),
            &GoalCondition::StateIs {
                state_id: StateId::new("st.island"),
            },
        )
        .expect("plan");
    assert_eq!(
        result,
        PlanResult::NoPlanFound {
            reason: NoPlanReason::RequiredTransitionNotInGraph
        }
    );
}

#[test]
fn backward_cycle_reports_cycle_without_looping() {
    // st.b and st.c feed each other; the goal st.c is reachable backward
    // only through that cycle, and st.a never connects in.
    let graph = graph(vec![
        RegistryNode {
            state: state("st.a", &[]),
            transitions: Vec::new(),
        },
        RegistryNode {
            state: state("st.b", &[]),
            transitions: vec![transition("tr.bc", "st.b", "st.c", 1)],
        },
        RegistryNode {
            state: state("st.c", &["cap.goal"]),
            transitions: vec![transition("tr.cb", "st.c", "st.b", 1)],
        },
    ]);
    let result = planner()
        .plan(
            &graph,
            &StateId::new("st.a"),
            &GoalCondition::StateIs {
                state_id: StateId::new("st.c"),
            },
        )
        .expect("plan");
    assert_eq!(
        result,
        PlanResult::NoPlanFound {
            reason: NoPlanReason::CycleDetected
        }
    );
}

#[test]
fn depth_bound_reports_max_depth_exceeded() {
    // Chain st.s0 -> st.s1 -> ... -> st.s5 with a tight depth bound.
    let mut nodes = Vec::new();
    for index in 0..5_u32 {
        nodes.push(RegistryNode {
            state: state(&format!("st.s{index}"), &[]),
            transitions: vec![transition(
                &format!("tr.s{index}"),
                &format!("st.s{index}"),
                &format!("st.s{}", index + 1),
                1,
            )],
        });
    }
    nodes.push(RegistryNode {
        state: state("st.s5", &["cap.goal"]),
        transitions: Vec::new(),
    });
    let graph = graph(nodes);

    let bounded = BackwardChainingPlanner::new(PlannerConfig {
        max_depth: 2,
    });
    let result = bounded
        .plan(
            &graph,
            &StateId::new("st.s0"),
            &GoalCondition::StateIs {
                state_id: StateId::new("st.s5"),
            },
        )
        .expect("plan");
    assert_eq!(
        result,
        PlanResult::NoPlanFound {
            reason: NoPlanReason::MaxDepthExceeded
        }
    );
}

#[test]
fn deep_chain_plans_when_within_the_bound() {
    let mut nodes = Vec::new();
    for index in 0..5_u32 {
        nodes.push(RegistryNode {
            state: state(&format!("st.s{index}"), &[]),
            transitions: vec![transition(
                &format!("tr.s{index}"),
                &format!("st.s{index}"),
                &format!("st.s{}", index + 1),
                1,
            )],
        });
    }
    nodes.push(RegistryNode {
        state: state("st.s5", &["cap.goal"]),
        transitions: Vec::new(),
    });
    let graph = graph(nodes);

    let result = planner()
        .plan(
            &graph,
            &StateId::new("st.s0"),
            &GoalCondition::StateIs {
                state_id: StateId::new("st.s5"),
            },
        )
        .expect("plan");
    let PlanResult::Planned {
        plan,
    } = result
    else {
        panic!("expected a plan");
    };
    assert_eq!(plan.steps.len(), 5);
}
