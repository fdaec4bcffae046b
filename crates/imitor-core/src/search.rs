//! # Search Module
//!
//! Best-first search that aligns the imitator's own actions to a sequence
//! of observed milestone states.
//!
//! The graph is built lazily: every expansion calls the successor generator
//! and grows the [`SearchTree`]. A node is a goal when it is aligned to the
//! last observed state; the search stops as soon as a goal reaches the
//! front of the open list.
//!
//! ## Costs
//!
//! - `g(child) = g(parent) + cost(action) + distance(observed[index], state)`
//! - `h = sum over remaining milestones i of (goal - i) * step_cost`
//! - `g(root) = distance(observed[start], start)`
//!
//! ## Duplicate Handling
//!
//! A successor whose identity (state and index) already lives in the tree
//! is dropped unless it is strictly cheaper; a strictly cheaper duplicate
//! replaces the old node and its whole subtree. If the old node is the node
//! being expanded or one of its ancestors, the successor is dropped instead.

use crate::action::{Action, action_cost};
use crate::config::{SearchConfig, SearchMode};
use crate::distance::{DistanceModel, Scorer};
use crate::policy::PolicyExtractor;
use crate::successor::{InternalState, SuccessorGenerator};
use crate::tree::{Node, SearchTree};
use crate::{NodeIndex, Object, PlanError, State};
use rand::Rng;
use std::collections::{BTreeSet, VecDeque};
use tracing::{debug, info, trace, warn};

/// Heuristic for a node aligned to `index` when the goal is `goal`.
///
/// Zero at the goal and monotonically non-increasing in `index`.
#[must_use]
pub fn heuristic(index: usize, goal: usize, step_cost: f64) -> f64 {
    (index..goal).map(|i| (goal - i) as f64 * step_cost).sum()
}

/// The result of one successful search.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Nodes from the root to the goal.
    pub policy: Vec<Node>,
    /// Alternatives branching off the policy, ordered by depth.
    pub siblings: Vec<Node>,
    /// Number of nodes expanded.
    pub expanded: usize,
    /// Live nodes in the final tree.
    pub tree_size: usize,
}

/// The search engine.
///
/// Holds the tree, open and closed lists of the most recent search.
pub struct Planner<'a> {
    actions: &'a [Action],
    objects: &'a [Object],
    config: SearchConfig,
    tree: SearchTree,
    open: VecDeque<NodeIndex>,
    closed: Vec<NodeIndex>,
}

impl<'a> Planner<'a> {
    /// Create a planner over the given action templates and candidate objects.
    #[must_use]
    pub fn new(actions: &'a [Action], objects: &'a [Object], config: SearchConfig) -> Self {
        Self {
            actions,
            objects,
            config,
            tree: SearchTree::new(),
            open: VecDeque::new(),
            closed: Vec::new(),
        }
    }

    /// The planner configuration.
    #[must_use]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// The tree of the most recent search.
    #[must_use]
    pub fn tree(&self) -> &SearchTree {
        &self.tree
    }

    /// Run one search from `start` toward the last of `observed`.
    ///
    /// Any previous tree is discarded first.
    ///
    /// # Errors
    ///
    /// - `EmptyDemonstration` if `observed` is empty
    /// - `IndexOutOfRange` if `start` is aligned past the last observed state
    /// - `OpenListExhausted` if pruning empties the open list before a goal
    /// - execution errors from successor generation
    pub fn search<R: Rng>(
        &mut self,
        start: InternalState,
        observed: &[State],
        model: &dyn DistanceModel,
        rng: &mut R,
    ) -> Result<SearchOutcome, PlanError> {
        let goal = observed
            .len()
            .checked_sub(1)
            .ok_or(PlanError::EmptyDemonstration)?;
        let aligned = observed.get(start.index).ok_or(PlanError::IndexOutOfRange {
            index: start.index,
            len: observed.len(),
        })?;

        let scorer = Scorer::new(model, self.config.exploration_std_dev);
        let mut start = start;
        start.distance = scorer.estimate(aligned, &start.state);
        let h = heuristic(start.index, goal, self.config.step_cost);
        let distance = start.distance;
        let root = Node::new(start, 0, distance, h);

        self.open.clear();
        self.closed.clear();
        let root = self.tree.reset(root);
        self.open.push_back(root);

        let mut expanded = 0;
        let goal_node = loop {
            let front = *self
                .open
                .front()
                .ok_or(PlanError::OpenListExhausted { expanded })?;
            let current = self
                .tree
                .get(front)
                .cloned()
                .ok_or(PlanError::GoalNotInTree(front))?;

            if current.state.index == goal {
                break front;
            }

            self.open.pop_front();
            debug!(
                node = front.0,
                depth = current.depth,
                index = current.state.index,
                f = current.f,
                open = self.open.len(),
                closed = self.closed.len(),
                "expanding"
            );
            self.expand(front, &current, observed, goal, &scorer, rng)?;
            self.closed.push(front);
            expanded += 1;
        };

        let (policy, siblings) = PolicyExtractor::finish(&mut self.tree, goal_node)?;
        info!(
            expanded,
            tree_size = self.tree.len(),
            policy_len = policy.len(),
            siblings = siblings.len(),
            "goal reached"
        );

        self.open.clear();
        self.closed.clear();
        Ok(SearchOutcome {
            policy,
            siblings,
            expanded,
            tree_size: self.tree.len(),
        })
    }

    /// Expand one node: score, prune and enqueue its successors.
    fn expand<R: Rng>(
        &mut self,
        parent: NodeIndex,
        current: &Node,
        observed: &[State],
        goal: usize,
        scorer: &Scorer<'_>,
        rng: &mut R,
    ) -> Result<(), PlanError> {
        let mut successors = SuccessorGenerator::generate(
            &current.state,
            self.actions,
            self.objects,
            &self.config.roles,
        )?;

        if self.config.mode == SearchMode::Exploration {
            successors = Self::shuffle_by_sample(successors, observed, scorer, rng);
        }

        let mut front_taken = false;
        for mut successor in successors {
            let Some(aligned) = observed.get(successor.index) else {
                continue;
            };
            successor.distance = scorer.estimate(aligned, &successor.state);
            let g = current.g + action_cost(self.actions, successor.action) + successor.distance;
            let h = heuristic(successor.index, goal, self.config.step_cost);
            let node = Node::new(successor, current.depth + 1, g, h);

            if !self.admit(parent, &node) {
                continue;
            }

            let index = self.tree.append_child(parent, node)?;
            match self.config.mode {
                SearchMode::Exploitation => self.insert_sorted(index),
                SearchMode::Exploration if !front_taken => {
                    self.open.push_front(index);
                    front_taken = true;
                }
                SearchMode::Exploration => self.open.push_back(index),
            }
        }
        Ok(())
    }

    /// Dominance check. Returns whether `node` should enter the tree,
    /// removing a strictly worse duplicate when it should.
    fn admit(&mut self, parent: NodeIndex, node: &Node) -> bool {
        let Some(existing) = self.tree.find(&node.state) else {
            return true;
        };
        let existing_g = self.tree.get(existing).map_or(f64::INFINITY, |n| n.g);

        if existing_g <= node.g {
            trace!(existing = existing.0, g = node.g, existing_g, "dominated successor dropped");
            return false;
        }
        if self.tree.is_ancestor_or_self(existing, parent) {
            warn!(
                existing = existing.0,
                parent = parent.0,
                "cheaper duplicate of an ancestor dropped"
            );
            return false;
        }

        let freed: BTreeSet<NodeIndex> = self.tree.remove_subtree(existing).into_iter().collect();
        self.open.retain(|i| !freed.contains(i));
        self.closed.retain(|i| !freed.contains(i));
        trace!(existing = existing.0, freed = freed.len(), "dominated subtree replaced");
        true
    }

    /// Insert before the first open node with a strictly greater f.
    fn insert_sorted(&mut self, index: NodeIndex) {
        let f = self.tree.get(index).map_or(f64::INFINITY, |n| n.f);
        let position = self
            .open
            .iter()
            .position(|i| {
                self.tree
                    .get(*i)
                    .is_some_and(|n| n.f.total_cmp(&f).is_gt())
            })
            .unwrap_or(self.open.len());
        self.open.insert(position, index);
    }

    /// Reorder successors by sampled distance, lowest first. Ties keep
    /// generation order.
    fn shuffle_by_sample<R: Rng>(
        successors: Vec<InternalState>,
        observed: &[State],
        scorer: &Scorer<'_>,
        rng: &mut R,
    ) -> Vec<InternalState> {
        let mut sampled: Vec<(f64, InternalState)> = successors
            .into_iter()
            .map(|s| {
                let sample = observed
                    .get(s.index)
                    .map_or(f64::INFINITY, |o| {
                        scorer.distance(o, &s.state, SearchMode::Exploration, rng)
                    });
                (sample, s)
            })
            .collect();
        sampled.sort_by(|a, b| a.0.total_cmp(&b.0));
        sampled.into_iter().map(|(_, s)| s).collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================
