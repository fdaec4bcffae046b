//! # Innate Primitives
//!
//! Hardcoded vocabulary and constants for the Imitor CORE.
//!
//! The planner starts with a fixed action family and a fixed set of
//! well-known symbols. These primitives are compiled into the binary and are
//! immutable at runtime; anything scenario-specific lives in
//! [`SearchConfig`](crate::config::SearchConfig).
//!
//! ## Primitives
//!
//! 1. **Placeholders**: names substituted by concrete objects when an action
//!    template is bound.
//! 2. **Actors**: the implicit agent of every adjacency fact.
//! 3. **Relation kinds**: the kinds the side effects of MOVE/PUSH/GRAB/DROP
//!    inspect and rewrite.

// =============================================================================
// ACTION TEMPLATE PLACEHOLDERS
// =============================================================================

/// Placeholder replaced by the first parameter of a binding.
pub const PARAM_1: &str = "PARA_1";

/// Placeholder replaced by the second parameter of a binding.
pub const PARAM_2: &str = "PARA_2";

// =============================================================================
// WELL-KNOWN OBJECTS
// =============================================================================

/// The actor of the internal model. Adjacency facts read `NEXT Imitator X`.
pub const IMITATOR: &str = "Imitator";

/// The actor of the observed (demonstrated) model.
pub const DEMONSTRATOR: &str = "Demo";

/// Dropping an object while adjacent to the trashcan consumes the object.
pub const TRASHCAN: &str = "Trashcan";

/// Holder of grabbed objects: `ON Gripper X`.
pub const GRIPPER: &str = "Gripper";

// =============================================================================
// RELATION KINDS
// =============================================================================

/// Adjacency between the actor and an object.
pub const NEXT: &str = "NEXT";

/// Former adjacency invalidated by relocation.
pub const AWAY: &str = "AWAY";

/// Support relation (`ON Gripper X`).
pub const ON: &str = "ON";

// =============================================================================
// SEARCH DEFAULTS
// =============================================================================

/// Default heuristic cost charged per remaining milestone step.
pub const DEFAULT_STEP_COST: f64 = 30.0;

/// Default standard deviation of exploration sampling.
pub const DEFAULT_EXPLORATION_STD_DEV: f64 = 30.0;

/// Default per-cell weight of the hand-coded profile distance.
pub const DEFAULT_PROFILE_WEIGHT: f64 = 10.0;

/// Objects GRAB and DROP may be bound to by default.
pub const DEFAULT_PORTABLE: [&str; 5] = ["ObjA", "ObjB", "Toy", "Futon1", "Futon2"];

/// Objects too heavy to be pushed when listed first among the candidates.
pub const DEFAULT_PUSH_FIXED: [&str; 2] = ["Futon1", "Futon2"];

/// Second-candidate objects that may be pushed toward another object.
pub const DEFAULT_PUSHABLE: [&str; 2] = ["ObjA", "Toy"];
