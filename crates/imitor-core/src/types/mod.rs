//! # Core Type Definitions
//!
//! This module contains the atomic types of the Imitor relational model:
//! - Field values with an explicit "don't care" marker (`Term`)
//! - Facts and entity descriptors (`Relation`, `Object`)
//! - Identifiers (`ActionId`, `NodeIndex`)
//! - Error types (`PlanError`)
//!
//! ## Wildcards
//!
//! A wildcard is a distinct [`Term::Any`] value, never a magic string. A
//! literal `"?"` is ordinary data. Matching is directional: only wildcards on
//! the *pattern* side match anything; a wildcard stored in a fact only
//! matches a wildcard pattern.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// TERM
// =============================================================================

/// One field of a fact or object descriptor.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Term {
    /// Matches any value when used on the pattern side.
    Any,
    /// A concrete symbol.
    Is(String),
}

impl Term {
    /// Create a concrete term.
    #[must_use]
    pub fn is(value: impl Into<String>) -> Self {
        Self::Is(value.into())
    }

    /// Whether this term, used as a pattern, accepts `value`.
    #[must_use]
    pub fn accepts(&self, value: &Term) -> bool {
        match self {
            Term::Any => true,
            Term::Is(_) => self == value,
        }
    }

    /// The concrete symbol, if any.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Term::Any => None,
            Term::Is(s) => Some(s),
        }
    }

    /// Check if this term is the wildcard.
    #[must_use]
    pub fn is_any(&self) -> bool {
        matches!(self, Term::Any)
    }

    /// Check if this term is exactly the given symbol.
    #[must_use]
    pub fn is_symbol(&self, symbol: &str) -> bool {
        self.as_str() == Some(symbol)
    }
}

impl From<&str> for Term {
    fn from(value: &str) -> Self {
        Self::Is(value.to_string())
    }
}

impl From<String> for Term {
    fn from(value: String) -> Self {
        Self::Is(value)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Any => f.write_str("?"),
            Term::Is(s) => f.write_str(s),
        }
    }
}

// =============================================================================
// RELATION
// =============================================================================

/// A fact `KIND subject_a subject_b`, e.g. `NEXT Imitator ObjA`.
///
/// Immutable once built; field substitution always produces a new value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Relation {
    /// The relation kind (`NEXT`, `ON`, ...).
    pub kind: Term,
    /// The first participant, usually the actor.
    pub subject_a: Term,
    /// The second participant, usually the target object.
    pub subject_b: Term,
}

impl Relation {
    /// Create a new relation.
    #[must_use]
    pub fn new(kind: impl Into<Term>, subject_a: impl Into<Term>, subject_b: impl Into<Term>) -> Self {
        Self {
            kind: kind.into(),
            subject_a: subject_a.into(),
            subject_b: subject_b.into(),
        }
    }

    /// The pattern that matches every relation.
    #[must_use]
    pub fn any() -> Self {
        Self::new(Term::Any, Term::Any, Term::Any)
    }

    /// Wildcard-aware equality with `pattern` on the query side.
    #[must_use]
    pub fn matches(&self, pattern: &Relation) -> bool {
        pattern.kind.accepts(&self.kind)
            && pattern.subject_a.accepts(&self.subject_a)
            && pattern.subject_b.accepts(&self.subject_b)
    }

    /// Check if this relation has the given concrete kind.
    #[must_use]
    pub fn is_kind(&self, kind: &str) -> bool {
        self.kind.is_symbol(kind)
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.kind, self.subject_a, self.subject_b)
    }
}

// =============================================================================
// OBJECT
// =============================================================================

/// A named entity with perceptual attributes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Object {
    /// Object name, referenced by relations.
    pub name: Term,
    /// Color attribute.
    pub color: Term,
    /// Texture attribute.
    pub texture: Term,
}

impl Object {
    /// Create a new object descriptor.
    #[must_use]
    pub fn new(name: impl Into<Term>, color: impl Into<Term>, texture: impl Into<Term>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
            texture: texture.into(),
        }
    }

    /// Wildcard-aware equality with `pattern` on the query side.
    #[must_use]
    pub fn matches(&self, pattern: &Object) -> bool {
        pattern.name.accepts(&self.name)
            && pattern.color.accepts(&self.color)
            && pattern.texture.accepts(&self.texture)
    }

    /// The concrete name, or `None` for a wildcard descriptor.
    #[must_use]
    pub fn name_str(&self) -> Option<&str> {
        self.name.as_str()
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.name, self.color, self.texture)
    }
}

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Identifier of an action template, as assigned by the loading layer.
///
/// The synthetic no-op step has no id; it is modelled as `Option::None`
/// wherever an action id may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActionId(pub u32);

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable slot of a node in the search arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeIndex(pub usize);

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Imitor CORE.
///
/// - No silent failures
/// - Use `Result<T, PlanError>` for fallible operations
/// - The CORE should never panic; all errors must be recoverable
#[derive(Debug, Error)]
pub enum PlanError {
    /// The observed-state sequence is empty, so there is no goal.
    #[error("Demonstration has no observed states")]
    EmptyDemonstration,

    /// A state is aligned past the end of the observed sequence.
    #[error("Observed index {index} out of range for {len} observed states")]
    IndexOutOfRange { index: usize, len: usize },

    /// A DROP action was executed with an empty precondition list.
    #[error("DROP action {action} has no precondition to restore adjacency from")]
    MissingDropTarget { action: ActionId },

    /// The open list ran dry before a goal node reached its front.
    #[error("Open list exhausted after {expanded} expansions")]
    OpenListExhausted { expanded: usize },

    /// A node index does not refer to a live node of the search tree.
    #[error("Node not in search tree: {0:?}")]
    GoalNotInTree(NodeIndex),

    /// Configuration could not be parsed or is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

// =============================================================================
// TESTS
// =============================================================================
