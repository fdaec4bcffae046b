//! # State Module
//!
//! An ordered multiset of facts plus the derived adjacency list.
//!
//! - Facts may repeat; `len()` counts every copy
//! - Lookups are existential and wildcard-aware (pattern on the query side)
//! - Iteration order is insertion order and only affects output
//!
//! ## Adjacency Invariant
//!
//! `next_to` lists the objects currently adjacent to the implicit actor. It
//! holds either zero or at least two names: being adjacent to exactly one
//! thing carries no information for planning, so a single member collapses
//! to empty. Every write goes through [`State::set_adjacent`], which enforces
//! this.

use crate::primitives::NEXT;
use crate::Relation;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A world state: facts and the adjacency list derived from them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct State {
    /// Facts in insertion order.
    facts: Vec<Relation>,

    /// Names adjacent to the actor. Never exactly one member.
    #[serde(skip)]
    next_to: Vec<String>,
}

impl State {
    /// Create a new empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a state from facts. Adjacency is left empty until
    /// [`State::update_next_to`] is called.
    #[must_use]
    pub fn from_facts(facts: impl IntoIterator<Item = Relation>) -> Self {
        Self {
            facts: facts.into_iter().collect(),
            next_to: Vec::new(),
        }
    }

    /// Append one fact. No deduplication.
    pub fn add(&mut self, fact: Relation) {
        self.facts.push(fact);
    }

    /// Append every fact of `other`, in order.
    pub fn add_state(&mut self, other: &State) {
        self.facts.extend(other.facts.iter().cloned());
    }

    /// For each fact of `other`, delete the first fact of `self` matching it.
    ///
    /// Patterns with no match are ignored.
    pub fn remove(&mut self, other: &State) {
        for pattern in &other.facts {
            if let Some(pos) = self.position(pattern) {
                self.facts.remove(pos);
            }
        }
    }

    /// True iff every pattern in `other` matches some fact of `self`.
    ///
    /// Existential per pattern: two patterns may be satisfied by the same fact.
    #[must_use]
    pub fn contains(&self, other: &State) -> bool {
        other.facts.iter().all(|pattern| self.position(pattern).is_some())
    }

    /// The first fact matching `pattern`, if any.
    #[must_use]
    pub fn find_pattern(&self, pattern: &Relation) -> Option<&Relation> {
        self.facts.iter().find(|fact| fact.matches(pattern))
    }

    /// Recompute adjacency from every `NEXT` fact.
    pub fn update_next_to(&mut self) {
        let adjacent = self
            .facts
            .iter()
            .filter(|fact| fact.is_kind(NEXT))
            .filter_map(|fact| fact.subject_b.as_str().map(str::to_string))
            .collect();
        self.set_adjacent(adjacent);
    }

    /// Names adjacent to the actor.
    #[must_use]
    pub fn next_to(&self) -> &[String] {
        &self.next_to
    }

    /// Check if `name` is in the adjacency list.
    #[must_use]
    pub fn is_adjacent(&self, name: &str) -> bool {
        self.next_to.iter().any(|n| n == name)
    }

    /// The adjacency list rendered space-separated.
    #[must_use]
    pub fn next_to_objects(&self) -> String {
        self.next_to.join(" ")
    }

    /// Number of facts, counting repeats.
    #[must_use]
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// Check if the state has no facts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Facts in insertion order.
    #[must_use]
    pub fn facts(&self) -> &[Relation] {
        &self.facts
    }

    /// Iterate facts in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Relation> {
        self.facts.iter()
    }

    /// Remove every fact and the adjacency list.
    pub fn clear(&mut self) {
        self.facts.clear();
        self.next_to.clear();
    }

    // =========================================================================
    // CRATE-INTERNAL MUTATORS (action side effects)
    // =========================================================================

    /// Index of the first fact matching `pattern`.
    pub(crate) fn position(&self, pattern: &Relation) -> Option<usize> {
        self.facts.iter().position(|fact| fact.matches(pattern))
    }

    /// Mutable access to facts for in-place relabeling.
    pub(crate) fn facts_mut(&mut self) -> &mut [Relation] {
        &mut self.facts
    }

    /// Replace the adjacency list, collapsing a single member to empty.
    pub(crate) fn set_adjacent(&mut self, adjacent: Vec<String>) {
        self.next_to = adjacent;
        if self.next_to.len() < 2 {
            self.next_to.clear();
        }
    }

    /// Drop the first occurrence of `name` from the adjacency list.
    pub(crate) fn remove_adjacent(&mut self, name: &str) {
        let mut adjacent = std::mem::take(&mut self.next_to);
        if let Some(pos) = adjacent.iter().position(|n| n == name) {
            adjacent.remove(pos);
        }
        self.set_adjacent(adjacent);
    }
}

/// Same size and mutual containment. Adjacency is derived and not compared.
impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.contains(other) && other.contains(self)
    }
}

impl FromIterator<Relation> for State {
    fn from_iter<I: IntoIterator<Item = Relation>>(iter: I) -> Self {
        Self::from_facts(iter)
    }
}

impl<'a> IntoIterator for &'a State {
    type Item = &'a Relation;
    type IntoIter = std::slice::Iter<'a, Relation>;

    fn into_iter(self) -> Self::IntoIter {
        self.facts.iter()
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.facts.len())?;
        for fact in &self.facts {
            writeln!(f, "{}", fact)?;
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
