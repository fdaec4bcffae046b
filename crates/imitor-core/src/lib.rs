//! # imitor-core
//!
//! The relational planning engine for Imitor - THE LOGIC.
//!
//! This crate aligns an imitator's own action repertoire to a demonstrated
//! sequence of milestone states. Given the observed states, a set of action
//! templates and the candidate objects, it searches a lazily built graph of
//! world states for the cheapest action sequence that reproduces the
//! demonstration, and returns that policy together with the alternatives it
//! rejected along the way.
//!
//! ## Layers
//!
//! - `types`, `state`: facts with explicit wildcards and fact multisets
//! - `action`: parameter-templated actions and their side effects
//! - `successor`: lazy graph expansion
//! - `distance`, `mapping`: scoring against the demonstration
//! - `tree`, `search`, `policy`: best-first search and cost repair
//! - `model`: packaged results for the training loop
//!
//! ## Architectural Constraints
//!
//! - Single-threaded and synchronous; one search owns its tree
//! - Randomness only through an explicit RNG handle
//! - No I/O: inputs arrive already parsed
//! - Never panics; every failure is a [`PlanError`]

// =============================================================================
// MODULES
// =============================================================================

pub mod action;
pub mod config;
pub mod distance;
pub mod mapping;
pub mod model;
pub mod policy;
pub mod primitives;
pub mod search;
pub mod state;
pub mod successor;
pub mod tree;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{ActionId, NodeIndex, Object, PlanError, Relation, Term};

// =============================================================================
// RE-EXPORTS: Planning Engine
// =============================================================================

pub use action::{Action, ActionKind, Binding, BoundAction, action_cost};
pub use config::{ObjectRoles, SearchConfig, SearchMode};
pub use distance::{DistanceModel, ProfileDistance, Scorer};
pub use mapping::SymbolMap;
pub use model::InternalModel;
pub use policy::PolicyExtractor;
pub use search::{Planner, SearchOutcome, heuristic};
pub use state::State;
pub use successor::{InternalState, SuccessorGenerator};
pub use tree::{Node, SearchTree};
