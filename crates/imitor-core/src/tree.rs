//! # Search Tree
//!
//! Arena storage for the nodes of one search.
//!
//! Nodes live in slots addressed by [`NodeIndex`]. Parents own an ordered
//! child list; children point back to their parent. Removing a subtree frees
//! its slots for reuse, so a freed index may later name a different node.
//! Open and closed lists hold indices, never references.

use crate::successor::InternalState;
use crate::{NodeIndex, PlanError};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// NODE
// =============================================================================

/// One search node: an internal state plus its costs.
///
/// `f == g + h` holds after every update made through [`Node::raise_to`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// The aligned world state.
    pub state: InternalState,
    /// Distance from the root in tree edges.
    pub depth: usize,
    /// Accumulated cost.
    pub g: f64,
    /// Heuristic estimate of the remaining cost.
    pub h: f64,
    /// Total estimate.
    pub f: f64,
}

impl Node {
    /// Create a node with `f = g + h`.
    #[must_use]
    pub fn new(state: InternalState, depth: usize, g: f64, h: f64) -> Self {
        Self {
            state,
            depth,
            g,
            h,
            f: g + h,
        }
    }

    /// Raise `f` to `target` by raising `h`. Never lowers.
    pub fn raise_to(&mut self, target: f64) {
        if target > self.f {
            self.h = target - self.g;
            self.f = target;
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.depth, self.h)?;
        write!(f, "{}", self.state)
    }
}

// =============================================================================
// TREE
// =============================================================================

#[derive(Debug, Clone)]
struct Slot {
    node: Node,
    parent: Option<NodeIndex>,
    children: Vec<NodeIndex>,
}

/// The arena.
#[derive(Debug, Clone, Default)]
pub struct SearchTree {
    slots: Vec<Option<Slot>>,
    free: Vec<NodeIndex>,
    root: Option<NodeIndex>,
    live: usize,
}

impl SearchTree {
    /// Create a new empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every node and start over with `root`.
    pub fn reset(&mut self, root: Node) -> NodeIndex {
        self.slots.clear();
        self.free.clear();
        self.live = 0;
        let index = self.alloc(Slot {
            node: root,
            parent: None,
            children: Vec::new(),
        });
        self.root = Some(index);
        index
    }

    /// Append `node` as the last child of `parent`.
    ///
    /// # Errors
    ///
    /// Returns `PlanError::GoalNotInTree` if `parent` is not live.
    pub fn append_child(&mut self, parent: NodeIndex, node: Node) -> Result<NodeIndex, PlanError> {
        if !self.contains(parent) {
            return Err(PlanError::GoalNotInTree(parent));
        }
        let index = self.alloc(Slot {
            node,
            parent: Some(parent),
            children: Vec::new(),
        });
        if let Some(slot) = self.slot_mut(parent) {
            slot.children.push(index);
        }
        Ok(index)
    }

    /// Detach and free `index` and all its descendants.
    ///
    /// Returns the freed indices.
    pub fn remove_subtree(&mut self, index: NodeIndex) -> Vec<NodeIndex> {
        if !self.contains(index) {
            return Vec::new();
        }
        if let Some(slot) = self.parent(index).and_then(|p| self.slot_mut(p)) {
            slot.children.retain(|c| *c != index);
        }
        if self.root == Some(index) {
            self.root = None;
        }

        let mut freed = Vec::new();
        let mut stack = vec![index];
        while let Some(current) = stack.pop() {
            if let Some(slot) = self.slots.get_mut(current.0).and_then(Option::take) {
                stack.extend(slot.children);
                self.free.push(current);
                self.live -= 1;
                freed.push(current);
            }
        }
        tracing::trace!(root = index.0, freed = freed.len(), "removed subtree");
        freed
    }

    /// The root, if the tree is non-empty.
    #[must_use]
    pub fn root(&self) -> Option<NodeIndex> {
        self.root
    }

    /// Check if `index` names a live node.
    #[must_use]
    pub fn contains(&self, index: NodeIndex) -> bool {
        self.slot(index).is_some()
    }

    /// Get a node.
    #[must_use]
    pub fn get(&self, index: NodeIndex) -> Option<&Node> {
        self.slot(index).map(|s| &s.node)
    }

    /// Get a node mutably.
    pub fn get_mut(&mut self, index: NodeIndex) -> Option<&mut Node> {
        self.slot_mut(index).map(|s| &mut s.node)
    }

    /// The parent of a node; `None` for the root or a dead index.
    #[must_use]
    pub fn parent(&self, index: NodeIndex) -> Option<NodeIndex> {
        self.slot(index).and_then(|s| s.parent)
    }

    /// Children in insertion order.
    #[must_use]
    pub fn children(&self, index: NodeIndex) -> &[NodeIndex] {
        self.slot(index).map_or(&[], |s| s.children.as_slice())
    }

    /// The live node with the same identity as `state`, if any.
    #[must_use]
    pub fn find(&self, state: &InternalState) -> Option<NodeIndex> {
        self.iter()
            .find(|(_, node)| node.state == *state)
            .map(|(index, _)| index)
    }

    /// Check if `ancestor` is `index` or lies on its path to the root.
    #[must_use]
    pub fn is_ancestor_or_self(&self, ancestor: NodeIndex, index: NodeIndex) -> bool {
        let mut cursor = Some(index);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// Nodes from the root down, children after their parent.
    #[must_use]
    pub fn preorder(&self) -> Vec<NodeIndex> {
        let mut order = Vec::with_capacity(self.live);
        let mut stack: Vec<NodeIndex> = self.root.into_iter().collect();
        while let Some(current) = stack.pop() {
            order.push(current);
            stack.extend(self.children(current).iter().rev());
        }
        order
    }

    /// Iterate live nodes in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeIndex, &Node)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|s| (NodeIndex(i), &s.node)))
    }

    /// Number of live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live
    }

    /// Check if the tree has no live nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    fn alloc(&mut self, slot: Slot) -> NodeIndex {
        self.live += 1;
        let reusable = self.free.pop().filter(|i| i.0 < self.slots.len());
        if let Some(index) = reusable {
            self.slots[index.0] = Some(slot);
            return index;
        }
        self.slots.push(Some(slot));
        NodeIndex(self.slots.len() - 1)
    }

    fn slot(&self, index: NodeIndex) -> Option<&Slot> {
        self.slots.get(index.0).and_then(Option::as_ref)
    }

    fn slot_mut(&mut self, index: NodeIndex) -> Option<&mut Slot> {
        self.slots.get_mut(index.0).and_then(Option::as_mut)
    }
}

// =============================================================================
// TESTS
// =============================================================================
