//! # Internal Model
//!
//! One search result packaged for the training loop: the objects it was
//! planned over, the policy, the rejected siblings and a reward slot.
//!
//! When the distance model is retrained, [`InternalModel::rescore`] brings
//! the stored costs up to date without searching again.

use crate::action::{Action, action_cost};
use crate::distance::{DistanceModel, Scorer};
use crate::policy::PolicyExtractor;
use crate::search::{SearchOutcome, heuristic};
use crate::tree::Node;
use crate::{Object, PlanError, State};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A stored search result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InternalModel {
    /// Candidate objects the search ran over.
    pub objects: Vec<Object>,
    /// Root-to-goal nodes.
    pub policy: Vec<Node>,
    /// Rejected alternatives, ordered by depth.
    pub siblings: Vec<Node>,
    /// Reward assigned by the training loop.
    pub reward: f64,
}

impl InternalModel {
    /// Package a search outcome.
    #[must_use]
    pub fn from_outcome(objects: Vec<Object>, outcome: SearchOutcome) -> Self {
        Self {
            objects,
            policy: outcome.policy,
            siblings: outcome.siblings,
            reward: 0.0,
        }
    }

    /// Number of stored nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.policy.len() + self.siblings.len()
    }

    /// Recompute distance, g, h and f of every node under `model`, then
    /// repair the policy path.
    ///
    /// A policy node builds on the previous policy node; a sibling builds on
    /// the policy node one level above it.
    ///
    /// # Errors
    ///
    /// - `EmptyDemonstration` if `observed` is empty
    /// - `IndexOutOfRange` if a node is aligned past the last observed state
    pub fn rescore(
        &mut self,
        observed: &[State],
        actions: &[Action],
        model: &dyn DistanceModel,
        step_cost: f64,
    ) -> Result<(), PlanError> {
        let goal = observed
            .len()
            .checked_sub(1)
            .ok_or(PlanError::EmptyDemonstration)?;
        let scorer = Scorer::new(model, 0.0);

        let mut parent_g = 0.0;
        for node in &mut self.policy {
            rescore_node(node, parent_g, observed, actions, &scorer, goal, step_cost)?;
            parent_g = node.g;
        }

        for sibling in &mut self.siblings {
            let parent_g = sibling
                .depth
                .checked_sub(1)
                .and_then(|level| self.policy.get(level))
                .map_or(0.0, |parent| parent.g);
            rescore_node(sibling, parent_g, observed, actions, &scorer, goal, step_cost)?;
        }

        PolicyExtractor::backpropagate_path(&mut self.policy);
        Ok(())
    }
}

fn rescore_node(
    node: &mut Node,
    parent_g: f64,
    observed: &[State],
    actions: &[Action],
    scorer: &Scorer<'_>,
    goal: usize,
    step_cost: f64,
) -> Result<(), PlanError> {
    let index = node.state.index;
    let aligned = observed.get(index).ok_or(PlanError::IndexOutOfRange {
        index,
        len: observed.len(),
    })?;

    node.state.distance = scorer.estimate(aligned, &node.state.state);
    node.g = parent_g + action_cost(actions, node.state.action) + node.state.distance;
    node.h = heuristic(index, goal, step_cost);
    node.f = node.g + node.h;
    Ok(())
}

impl fmt::Display for InternalModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.reward, self.node_count())?;
        writeln!(f, "{}", self.objects.len())?;
        for object in &self.objects {
            writeln!(f, "{}", object)?;
        }
        for node in &self.policy {
            write!(f, "1 {}", node)?;
        }
        for node in &self.siblings {
            write!(f, "0 {}", node)?;
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
