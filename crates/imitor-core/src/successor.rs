//! # Successor Module
//!
//! Internal states and the lazy expansion of the search graph.
//!
//! - Enumerate the legal bindings of every action over the candidate objects
//! - Keep only bindings whose preconditions hold
//! - Emit each executed result twice: aligned to the current observed state
//!   and to the next one, since it is unknown which physical step matches
//!   which demonstrated milestone
//! - Always emit one no-op successor that only advances the alignment index

use crate::action::{Action, ActionKind};
use crate::config::ObjectRoles;
use crate::{ActionId, Object, PlanError, State};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// INTERNAL STATE
// =============================================================================

/// A world state aligned to a position in the observed sequence.
///
/// Identity (`==`) is state equality plus index equality; the action and the
/// distance are bookkeeping and do not participate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InternalState {
    /// The action that produced this state; `None` for the start and no-op.
    pub action: Option<ActionId>,
    /// The imitator's world state.
    pub state: State,
    /// Index into the observed-state sequence.
    pub index: usize,
    /// Distance to the aligned observed state, once scored.
    pub distance: f64,
}

impl InternalState {
    /// Create an unscored internal state.
    #[must_use]
    pub fn new(action: Option<ActionId>, state: State, index: usize) -> Self {
        Self {
            action,
            state,
            index,
            distance: 0.0,
        }
    }

    /// The start state of a search: aligned to index 0, adjacency derived
    /// from its facts.
    #[must_use]
    pub fn start(mut state: State) -> Self {
        state.update_next_to();
        Self::new(None, state, 0)
    }
}

impl PartialEq for InternalState {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.state == other.state
    }
}

impl fmt::Display for InternalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.action {
            Some(id) => write!(f, "{}", id)?,
            None => f.write_str("-1")?,
        }
        writeln!(f, " {} {}", self.distance, self.index)?;
        write!(f, "{}", self.state)
    }
}

// =============================================================================
// SUCCESSOR GENERATOR
// =============================================================================

/// One candidate parameter binding `(first, second)`.
pub type Candidate = (String, Option<String>);

/// The SuccessorGenerator expands one internal state.
pub struct SuccessorGenerator;

impl SuccessorGenerator {
    /// Generate every successor of `current`.
    ///
    /// Successor order: actions in the given order, bindings in enumeration
    /// order, `[same index, next index]` per satisfied binding, then the no-op.
    ///
    /// # Errors
    ///
    /// Propagates execution errors (a DROP template with no precondition).
    pub fn generate(
        current: &InternalState,
        actions: &[Action],
        objects: &[Object],
        roles: &ObjectRoles,
    ) -> Result<Vec<InternalState>, PlanError> {
        let mut successors = Vec::new();

        for action in actions {
            for (first, second) in Self::bindings(action.kind, objects, roles) {
                let bound = action.bind(&first, second.as_deref());
                if !bound.is_satisfied(&current.state) {
                    continue;
                }
                let next = bound.execute(&current.state)?;

                successors.push(InternalState::new(
                    Some(action.id),
                    next.clone(),
                    current.index,
                ));
                successors.push(InternalState::new(
                    Some(action.id),
                    next,
                    current.index.saturating_add(1),
                ));
            }
        }

        successors.push(InternalState::new(
            None,
            current.state.clone(),
            current.index.saturating_add(1),
        ));

        tracing::trace!(
            index = current.index,
            successors = successors.len(),
            "generated successors"
        );
        Ok(successors)
    }

    /// Legal bindings of an action kind over the candidate objects.
    ///
    /// - MOVE: any object
    /// - GRAB / DROP: portable objects only
    /// - PUSH: push the first candidate toward any other candidate unless it
    ///   is fixed; if the second candidate is pushable, push it toward the
    ///   first and toward the third
    /// - OTHER: no bindings
    ///
    /// Candidates without a concrete name are skipped.
    #[must_use]
    pub fn bindings(kind: ActionKind, objects: &[Object], roles: &ObjectRoles) -> Vec<Candidate> {
        let names: Vec<&str> = objects.iter().filter_map(Object::name_str).collect();

        match kind {
            ActionKind::Move => names.iter().map(|n| (n.to_string(), None)).collect(),
            ActionKind::Grab | ActionKind::Drop => names
                .iter()
                .filter(|n| roles.is_portable(n))
                .map(|n| (n.to_string(), None))
                .collect(),
            ActionKind::Push => Self::push_bindings(&names, roles),
            ActionKind::Other => Vec::new(),
        }
    }

    /// PUSH bindings: `(anchor, pushed)`, the pushed object moves toward
    /// the anchor.
    fn push_bindings(names: &[&str], roles: &ObjectRoles) -> Vec<Candidate> {
        let mut bindings = Vec::new();

        if let Some(&first) = names.first().filter(|n| !roles.is_push_fixed(n)) {
            for anchor in names.iter().skip(1) {
                bindings.push((anchor.to_string(), Some(first.to_string())));
            }
        }

        if let Some(&second) = names.get(1).filter(|n| roles.is_pushable(n)) {
            for anchor in [names.first(), names.get(2)].into_iter().flatten() {
                bindings.push((anchor.to_string(), Some(second.to_string())));
            }
        }

        bindings
    }
}

// =============================================================================
// TESTS
// =============================================================================
