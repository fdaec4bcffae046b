//! # Policy Module
//!
//! Turning a finished search tree into a policy and training siblings.
//!
//! Order of operations once a goal is found:
//!
//! 1. Tree pass: every node's f becomes `max(f, min f of its children)`,
//!    leaves first, root included.
//! 2. Extraction: the goal-to-root path reversed is the policy; every other
//!    child of each policy node's parent is a sibling.
//! 3. Path pass: walking the policy from the goal back to the root, a node
//!    whose child has a larger f is raised to that f.
//!
//! Raising f always raises h and keeps g, so `f == g + h` holds throughout.
//! After step 3 no policy node has a smaller f than its child on the path.

use crate::tree::{Node, SearchTree};
use crate::{NodeIndex, PlanError};

/// The PolicyExtractor post-processes a search tree.
pub struct PolicyExtractor;

impl PolicyExtractor {
    /// Run the full pipeline for `goal` and return `(policy, siblings)`.
    ///
    /// # Errors
    ///
    /// Returns `PlanError::GoalNotInTree` if `goal` is not live.
    pub fn finish(tree: &mut SearchTree, goal: NodeIndex) -> Result<(Vec<Node>, Vec<Node>), PlanError> {
        Self::backpropagate_tree(tree);
        let (mut policy, siblings) = Self::extract(tree, goal)?;
        Self::backpropagate_path(&mut policy);
        Ok((policy, siblings))
    }

    /// Min-max pass over the whole tree.
    pub fn backpropagate_tree(tree: &mut SearchTree) {
        for index in tree.preorder().into_iter().rev() {
            let best_child = tree
                .children(index)
                .iter()
                .filter_map(|c| tree.get(*c))
                .map(|n| n.f)
                .min_by(f64::total_cmp);
            if let (Some(best), Some(node)) = (best_child, tree.get_mut(index)) {
                node.raise_to(best);
            }
        }
    }

    /// Copy out the root-to-goal path and its siblings.
    ///
    /// Siblings are grouped by depth, in child order within a level.
    ///
    /// # Errors
    ///
    /// Returns `PlanError::GoalNotInTree` if `goal` is not live.
    pub fn extract(tree: &SearchTree, goal: NodeIndex) -> Result<(Vec<Node>, Vec<Node>), PlanError> {
        if !tree.contains(goal) {
            return Err(PlanError::GoalNotInTree(goal));
        }

        let mut path = Vec::new();
        let mut cursor = Some(goal);
        while let Some(index) = cursor {
            path.push(index);
            cursor = tree.parent(index);
        }
        path.reverse();

        let mut siblings = Vec::new();
        for pair in path.windows(2) {
            let (parent, chosen) = (pair[0], pair[1]);
            siblings.extend(
                tree.children(parent)
                    .iter()
                    .filter(|c| **c != chosen)
                    .filter_map(|c| tree.get(*c))
                    .cloned(),
            );
        }

        let policy = path
            .iter()
            .map(|i| tree.get(*i).cloned().ok_or(PlanError::GoalNotInTree(*i)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((policy, siblings))
    }

    /// Path-only pass, goal back to root.
    pub fn backpropagate_path(policy: &mut [Node]) {
        for i in (1..policy.len()).rev() {
            let child_f = policy[i].f;
            policy[i - 1].raise_to(child_f);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
