//! # Symbol Mapping
//!
//! Translation from the demonstrator's vocabulary to the imitator's.
//!
//! Unmapped symbols translate to themselves. Wildcards stay wildcards.
//! Translated states carry no adjacency; callers derive it with
//! [`State::update_next_to`] (as [`InternalState::start`] does).
//!
//! [`InternalState::start`]: crate::InternalState::start

use crate::{Object, Relation, State, Term};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A symbol-to-symbol translation table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolMap {
    symbols: BTreeMap<String, String>,
}

impl SymbolMap {
    /// Create an empty (identity) map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `from` to `to`, returning the previous target.
    pub fn insert(&mut self, from: impl Into<String>, to: impl Into<String>) -> Option<String> {
        self.symbols.insert(from.into(), to.into())
    }

    /// Translate one symbol.
    #[must_use]
    pub fn translate<'a>(&'a self, symbol: &'a str) -> &'a str {
        self.symbols.get(symbol).map_or(symbol, String::as_str)
    }

    /// Translate one term.
    #[must_use]
    pub fn map_term(&self, term: &Term) -> Term {
        match term {
            Term::Any => Term::Any,
            Term::Is(s) => Term::is(self.translate(s)),
        }
    }

    /// Translate every field of a relation.
    #[must_use]
    pub fn map_relation(&self, relation: &Relation) -> Relation {
        Relation {
            kind: self.map_term(&relation.kind),
            subject_a: self.map_term(&relation.subject_a),
            subject_b: self.map_term(&relation.subject_b),
        }
    }

    /// Translate every field of an object descriptor.
    #[must_use]
    pub fn map_object(&self, object: &Object) -> Object {
        Object {
            name: self.map_term(&object.name),
            color: self.map_term(&object.color),
            texture: self.map_term(&object.texture),
        }
    }

    /// Translate every fact, keeping order.
    #[must_use]
    pub fn map_state(&self, state: &State) -> State {
        state.iter().map(|fact| self.map_relation(fact)).collect()
    }

    /// Number of explicit entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Check if the map is the identity.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SymbolMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            symbols: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
