//! # Action Module
//!
//! Parameter-templated manipulation actions and their execution semantics.
//!
//! An [`Action`] is a read-only template: preconditions and postconditions
//! written over the placeholders `PARA_1` / `PARA_2`. Binding a template to
//! concrete objects produces an independent [`BoundAction`] that owns its own
//! substituted copies, so sibling bindings of one template never share state.
//!
//! ## Execution
//!
//! `execute` = remove preconditions, apply the kind's side effect on the
//! adjacency bookkeeping, add postconditions. Callers are expected to check
//! [`BoundAction::is_satisfied`] first; execution does not re-check it.

use crate::primitives::{AWAY, IMITATOR, NEXT, PARAM_1, PARAM_2, TRASHCAN};
use crate::{ActionId, PlanError, Relation, State, Term};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// ACTION KIND
// =============================================================================

/// The closed family of action kinds. Each kind owns one side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    /// Relocate next to parameter 1.
    Move,
    /// Pick up parameter 1.
    Grab,
    /// Put down parameter 1.
    Drop,
    /// Push parameter 2 toward parameter 1.
    Push,
    /// Any other action: generic pre/post update only.
    Other,
}

impl ActionKind {
    /// Kind implied by the loading layer's id convention (0..=3).
    #[must_use]
    pub fn from_id(id: ActionId) -> Self {
        match id.0 {
            0 => ActionKind::Move,
            1 => ActionKind::Grab,
            2 => ActionKind::Drop,
            3 => ActionKind::Push,
            _ => ActionKind::Other,
        }
    }

    /// Get the kind name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::Move => "MOVE",
            ActionKind::Grab => "GRAB",
            ActionKind::Drop => "DROP",
            ActionKind::Push => "PUSH",
            ActionKind::Other => "OTHER",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// ACTION TEMPLATE
// =============================================================================

/// A reusable action template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Identifier assigned by the loading layer.
    pub id: ActionId,
    /// Which side effect execution applies.
    pub kind: ActionKind,
    /// Human-readable name.
    pub name: String,
    /// Facts required before, written over placeholders.
    pub pre_conds: State,
    /// Facts added after, written over placeholders.
    pub post_conds: State,
    /// Cost charged for one execution.
    pub cost: f64,
}

impl Action {
    /// Create a template whose kind follows the id convention.
    #[must_use]
    pub fn new(
        id: ActionId,
        name: impl Into<String>,
        pre_conds: State,
        post_conds: State,
        cost: f64,
    ) -> Self {
        Self {
            id,
            kind: ActionKind::from_id(id),
            name: name.into(),
            pre_conds,
            post_conds,
            cost,
        }
    }

    /// Override the kind derived from the id.
    #[must_use]
    pub fn with_kind(mut self, kind: ActionKind) -> Self {
        self.kind = kind;
        self
    }

    /// Bind the placeholders to concrete objects.
    ///
    /// Returns an independent copy; the template is untouched. A missing
    /// second parameter leaves `PARA_2` in place.
    #[must_use]
    pub fn bind(&self, first: &str, second: Option<&str>) -> BoundAction<'_> {
        let binding = Binding {
            first: first.to_string(),
            second: second.map(str::to_string),
        };
        BoundAction {
            pre_conds: binding.substitute(&self.pre_conds),
            post_conds: binding.substitute(&self.post_conds),
            template: self,
            binding,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {} {}", self.id, self.name, self.cost)?;
        write!(f, "{}{}", self.pre_conds, self.post_conds)
    }
}

/// Cost of the step that produced a node. The no-op step is free.
#[must_use]
pub fn action_cost(actions: &[Action], id: Option<ActionId>) -> f64 {
    id.and_then(|id| actions.iter().find(|a| a.id == id))
        .map(|a| a.cost)
        .unwrap_or(0.0)
}

// =============================================================================
// BINDING
// =============================================================================

/// The concrete parameters of one binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    /// Replaces `PARA_1`.
    pub first: String,
    /// Replaces `PARA_2`, when given.
    pub second: Option<String>,
}

impl Binding {
    /// Substitute placeholders field by field. Relation kinds are never
    /// substituted.
    fn substitute(&self, template: &State) -> State {
        template
            .iter()
            .map(|fact| Relation {
                kind: fact.kind.clone(),
                subject_a: self.substitute_term(&fact.subject_a),
                subject_b: self.substitute_term(&fact.subject_b),
            })
            .collect()
    }

    fn substitute_term(&self, term: &Term) -> Term {
        if term.is_symbol(PARAM_1) {
            return Term::is(self.first.as_str());
        }
        match (&self.second, term.is_symbol(PARAM_2)) {
            (Some(second), true) => Term::is(second.as_str()),
            _ => term.clone(),
        }
    }
}

// =============================================================================
// BOUND ACTION
// =============================================================================

/// An action template bound to concrete parameters.
#[derive(Debug, Clone)]
pub struct BoundAction<'a> {
    template: &'a Action,
    binding: Binding,
    pre_conds: State,
    post_conds: State,
}

impl BoundAction<'_> {
    /// The template's id.
    #[must_use]
    pub fn id(&self) -> ActionId {
        self.template.id
    }

    /// The template's kind.
    #[must_use]
    pub fn kind(&self) -> ActionKind {
        self.template.kind
    }

    /// The concrete parameters.
    #[must_use]
    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    /// Substituted preconditions.
    #[must_use]
    pub fn pre_conds(&self) -> &State {
        &self.pre_conds
    }

    /// Substituted postconditions.
    #[must_use]
    pub fn post_conds(&self) -> &State {
        &self.post_conds
    }

    /// Check whether the preconditions hold in `state`.
    #[must_use]
    pub fn is_satisfied(&self, state: &State) -> bool {
        state.contains(&self.pre_conds)
    }

    /// Execute against `state` and return the successor state.
    ///
    /// # Errors
    ///
    /// Returns `PlanError::MissingDropTarget` for a DROP whose precondition
    /// list is empty while no trashcan is adjacent.
    pub fn execute(&self, state: &State) -> Result<State, PlanError> {
        let mut next = state.clone();
        next.remove(&self.pre_conds);

        let first = self.binding.first.as_str();
        match self.template.kind {
            ActionKind::Move => relocate(&mut next, first),
            ActionKind::Push => {
                relocate(&mut next, first);
                if let Some(second) = self.binding.second.as_deref() {
                    push_toward(&mut next, state, first, second);
                }
            }
            ActionKind::Grab => next.remove_adjacent(first),
            ActionKind::Drop => self.put_down(&mut next, first)?,
            ActionKind::Other => {}
        }

        next.add_state(&self.post_conds);
        Ok(next)
    }

    /// DROP side effect.
    ///
    /// The restored adjacency target is read positionally from the first
    /// precondition fact, whatever its shape.
    fn put_down(&self, next: &mut State, dropped: &str) -> Result<(), PlanError> {
        let actor_next = Relation::new(NEXT, IMITATOR, Term::Any);
        if let Some(target) = next.find_pattern(&actor_next).map(|f| f.subject_b.clone()) {
            let mut adjacent = next.next_to().to_vec();
            if adjacent.is_empty() {
                adjacent.extend(target.as_str().map(str::to_string));
            }
            adjacent.push(dropped.to_string());
            next.set_adjacent(adjacent);
        }

        // Dropped next to the trashcan: the object is consumed.
        if next.find_pattern(&Relation::new(NEXT, IMITATOR, TRASHCAN)).is_some() {
            return Ok(());
        }

        let restored = self
            .pre_conds
            .facts()
            .first()
            .ok_or(PlanError::MissingDropTarget {
                action: self.template.id,
            })?;
        next.add(Relation::new(NEXT, IMITATOR, restored.subject_b.clone()));
        Ok(())
    }
}

// =============================================================================
// SIDE EFFECTS
// =============================================================================

/// MOVE side effect: every `NEXT` fact becomes `AWAY`, except facts toward
/// members of the current adjacency cluster when the destination is itself
/// in that cluster.
fn relocate(next: &mut State, destination: &str) {
    let cluster: Vec<String> = if next.is_adjacent(destination) {
        next.next_to().to_vec()
    } else {
        Vec::new()
    };

    for fact in next.facts_mut() {
        if !fact.is_kind(NEXT) {
            continue;
        }
        let stays = fact
            .subject_b
            .as_str()
            .is_some_and(|target| cluster.iter().any(|n| n == target));
        if !stays {
            *fact = Relation::new(AWAY, fact.subject_a.clone(), fact.subject_b.clone());
        }
    }
}

/// PUSH side effect: the pushed object leaves its cluster and, when the
/// anchor was adjacent to the actor, forms the cluster `[pushed, anchor]`.
fn push_toward(next: &mut State, before: &State, anchor: &str, pushed: &str) {
    next.remove_adjacent(pushed);

    let anchor_adjacent = next.is_adjacent(anchor)
        || before
            .find_pattern(&Relation::new(NEXT, IMITATOR, anchor))
            .is_some();
    if anchor_adjacent {
        next.set_adjacent(vec![pushed.to_string(), anchor.to_string()]);
    }
}

// =============================================================================
// TESTS
// =============================================================================
