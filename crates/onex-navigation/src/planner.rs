// crates/onex-navigation/src/planner.rs
// ============================================================================
// Module: Onex Backward-Chaining Planner
// Description: Goal-conditioned backward search over the contract graph.
// Purpose: Produce forward-executable plans or structured no-plan reasons.
// Dependencies: crate::graph, onex-core, serde
// ============================================================================

//! ## Overview
//! The planner searches backward from states satisfying the goal toward the
//! current state, walking predecessor edges with path-local cycle detection
//! and a configurable depth bound. Successful searches are reversed before
//! returning, so callers always receive a plan executable forward from the
//! current state. Guard contexts are not consulted; the boundary enforcer
//! re-validates each step at execution time.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use onex_core::CapabilityId;
use onex_core::StateId;
use onex_core::TransitionId;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::graph::ContractGraph;
use crate::graph::ContractState;
use crate::graph::ContractTransition;

// ============================================================================
// SECTION: Goal Conditions
// ============================================================================

/// Declared predicate over contract states used as the search target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GoalCondition {
    /// Goal is reaching a specific state.
    StateIs {
        /// Target state identifier.
        state_id: StateId,
    },
    /// Goal is reaching any state declaring the capability.
    DeclaresCapability {
        /// Required capability identifier.
        capability_id: CapabilityId,
    },
}

impl GoalCondition {
    /// Returns true when the state satisfies the goal.
    #[must_use]
    pub fn satisfied_by(&self, state: &ContractState) -> bool {
        match self {
            Self::StateIs {
                state_id,
            } => &state.state_id == state_id,
            Self::DeclaresCapability {
                capability_id,
            } => state.capabilities.contains(capability_id),
        }
    }
}

// ============================================================================
// SECTION: Plans
// ============================================================================

/// One forward-executable plan step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStep {
    /// Zero-based step index.
    pub step_index: u32,
    /// Transition to fire.
    pub transition_id: TransitionId,
    /// Source state of the step.
    pub source: StateId,
    /// Target state of the step.
    pub target: StateId,
}

/// Ordered sequence of plan steps from current state to goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    /// Forward-ordered plan steps.
    pub steps: Vec<PlanStep>,
}

/// Reason no plan could be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoPlanReason {
    /// A required backward transition does not exist in the graph.
    RequiredTransitionNotInGraph,
    /// Backward search revisited a state on the current path.
    CycleDetected,
    /// Search exceeded the configured depth bound.
    MaxDepthExceeded,
}

/// Outcome of a planning request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanResult {
    /// The goal already holds at the current state.
    GoalAlreadySatisfied,
    /// A forward-executable plan was found.
    Planned {
        /// The plan.
        plan: Plan,
    },
    /// No plan exists within the search bounds.
    NoPlanFound {
        /// Structured reason.
        reason: NoPlanReason,
    },
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Planner input errors.
#[derive(Debug, Error)]
pub enum PlanError {
    /// Current state is not declared in the graph.
    #[error("current state not declared in graph: {0}")]
    UnknownCurrentState(String),
}

// ============================================================================
// SECTION: Planner Configuration
// ============================================================================

/// Default maximum backward search depth.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Planner configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Maximum backward search depth in transitions.
    pub max_depth: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

// ============================================================================
// SECTION: Backward-Chaining Planner
// ============================================================================

/// Search obstruction flags accumulated during backward walks.
#[derive(Debug, Default)]
struct SearchFlags {
    /// A state on the current path was revisited.
    cycle_hit: bool,
    /// The depth bound was reached on some branch.
    depth_hit: bool,
}

/// Goal-conditioned backward-chaining planner.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackwardChainingPlanner {
    /// Planner configuration.
    config: PlannerConfig,
}

impl BackwardChainingPlanner {
    /// Creates a planner with the provided configuration.
    #[must_use]
    pub const fn new(config: PlannerConfig) -> Self {
        Self {
            config,
        }
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> PlannerConfig {
        self.config
    }

    /// Plans a forward-executable path from the current state to the goal.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::UnknownCurrentState`] when the current state is
    /// not declared in the graph. Unreachable goals are not errors; they are
    /// returned as [`PlanResult::NoPlanFound`] values.
    pub fn plan(
        &self,
        graph: &ContractGraph,
        current: &StateId,
        goal: &GoalCondition,
    ) -> Result<PlanResult, PlanError> {
        let Some(current_state) = graph.state(current) else {
            return Err(PlanError::UnknownCurrentState(current.to_string()));
        };
        if goal.satisfied_by(current_state) {
            return Ok(PlanResult::GoalAlreadySatisfied);
        }

        let mut flags = SearchFlags::default();
        // Goal states iterate in identifier order for deterministic output.
        for goal_state in graph.states().filter(|state| goal.satisfied_by(state)) {
            let mut on_path: BTreeSet<StateId> = BTreeSet::new();
            on_path.insert(goal_state.state_id.clone());
            if let Some(backward) = self.search_backward(
                graph,
                &goal_state.state_id,
                current,
                &mut on_path,
                0,
                &mut flags,
            ) {
                return Ok(PlanResult::Planned {
                    plan: build_plan(graph, backward),
                });
            }
        }

        let reason = if flags.depth_hit {
            NoPlanReason::MaxDepthExceeded
        } else if flags.cycle_hit {
            NoPlanReason::CycleDetected
        } else {
            NoPlanReason::RequiredTransitionNotInGraph
        };
        Ok(PlanResult::NoPlanFound {
            reason,
        })
    }

    /// Walks backward from `target_state` toward `current`.
    ///
    /// Returns transition ids in backward discovery order (goal-side first);
    /// the caller reverses them into execution order. Predecessor edges are
    /// visited in (cost, transition id) order so plans are deterministic.
    fn search_backward(
        &self,
        graph: &ContractGraph,
        target_state: &StateId,
        current: &StateId,
        on_path: &mut BTreeSet<StateId>,
        depth: usize,
        flags: &mut SearchFlags,
    ) -> Option<Vec<TransitionId>> {
        let mut entering: Vec<&ContractTransition> = graph
            .incoming(target_state)
            .iter()
            .filter_map(|transition_id| graph.transition(transition_id))
            .collect();
        entering.sort_by(|left, right| {
            left.cost.cmp(&right.cost).then_with(|| left.transition_id.cmp(&right.transition_id))
        });

        for transition in entering {
            let predecessor = &transition.source;
            if predecessor == current {
                return Some(vec![transition.transition_id.clone()]);
            }
            if on_path.contains(predecessor) {
                flags.cycle_hit = true;
                continue;
            }
            if depth + 1 >= self.config.max_depth {
                flags.depth_hit = true;
                continue;
            }
            on_path.insert(predecessor.clone());
            if let Some(rest) = self.search_backward(
                graph,
                predecessor,
                current,
                on_path,
                depth + 1,
                flags,
            ) {
                let mut backward = vec![transition.transition_id.clone()];
                backward.extend(rest);
                return Some(backward);
            }
            on_path.remove(predecessor);
        }
        None
    }
}

// ============================================================================
// SECTION: Plan Construction
// ============================================================================

/// Reverses a backward transition list into a forward-executable plan.
fn build_plan(graph: &ContractGraph, mut backward: Vec<TransitionId>) -> Plan {
    backward.reverse();
    let steps = backward
        .iter()
        .enumerate()
        .filter_map(|(index, transition_id)| {
            graph.transition(transition_id).map(|transition| PlanStep {
                step_index: u32::try_from(index).unwrap_or(u32::MAX),
                transition_id: transition.transition_id.clone(),
                source: transition.source.clone(),
                target: transition.target.clone(),
            })
        })
        .collect();
    Plan {
        steps,
    }
}
