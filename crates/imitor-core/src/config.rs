//! # Search Configuration
//!
//! Tunables for one planner, loadable from TOML.
//!
//! ```toml
//! step_cost = 30.0
//! exploration_std_dev = 30.0
//! mode = "exploration"
//!
//! [roles]
//! portable = ["ObjA", "Toy"]
//! push_fixed = ["Futon1"]
//! pushable = ["ObjA"]
//! ```
//!
//! Every key is optional; missing keys take the defaults from
//! [`primitives`](crate::primitives).

use crate::PlanError;
use crate::primitives::{
    DEFAULT_EXPLORATION_STD_DEV, DEFAULT_PORTABLE, DEFAULT_PUSH_FIXED, DEFAULT_PUSHABLE,
    DEFAULT_STEP_COST,
};
use serde::{Deserialize, Serialize};

/// How successors are ordered on the open list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Deterministic: open list kept sorted by f.
    #[default]
    Exploitation,
    /// Stochastic: successors reordered by sampled distance, best sampled
    /// to the front of the open list, the rest to the back.
    Exploration,
}

/// Object-role eligibility used by successor generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectRoles {
    /// Objects GRAB and DROP may be bound to.
    pub portable: Vec<String>,
    /// Objects too heavy to be pushed as the first candidate.
    pub push_fixed: Vec<String>,
    /// Second-candidate objects that may be pushed.
    pub pushable: Vec<String>,
}

impl Default for ObjectRoles {
    fn default() -> Self {
        Self {
            portable: DEFAULT_PORTABLE.iter().map(|s| s.to_string()).collect(),
            push_fixed: DEFAULT_PUSH_FIXED.iter().map(|s| s.to_string()).collect(),
            pushable: DEFAULT_PUSHABLE.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ObjectRoles {
    /// Check if GRAB/DROP may take `name`.
    #[must_use]
    pub fn is_portable(&self, name: &str) -> bool {
        self.portable.iter().any(|n| n == name)
    }

    /// Check if `name` may not be pushed as the first candidate.
    #[must_use]
    pub fn is_push_fixed(&self, name: &str) -> bool {
        self.push_fixed.iter().any(|n| n == name)
    }

    /// Check if `name` may be pushed.
    #[must_use]
    pub fn is_pushable(&self, name: &str) -> bool {
        self.pushable.iter().any(|n| n == name)
    }
}

/// Planner configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Heuristic cost per remaining milestone step.
    pub step_cost: f64,
    /// Standard deviation of exploration sampling.
    pub exploration_std_dev: f64,
    /// Open-list policy.
    pub mode: SearchMode,
    /// Object-role eligibility.
    pub roles: ObjectRoles,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            step_cost: DEFAULT_STEP_COST,
            exploration_std_dev: DEFAULT_EXPLORATION_STD_DEV,
            mode: SearchMode::default(),
            roles: ObjectRoles::default(),
        }
    }
}

impl SearchConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, PlanError> {
        let config: Self =
            toml::from_str(source).map_err(|e| PlanError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Same configuration with a different mode.
    #[must_use]
    pub fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Reject negative or non-finite tunables.
    pub fn validate(&self) -> Result<(), PlanError> {
        if !self.step_cost.is_finite() || self.step_cost < 0.0 {
            return Err(PlanError::InvalidConfig(format!(
                "step_cost must be finite and >= 0, got {}",
                self.step_cost
            )));
        }
        if !self.exploration_std_dev.is_finite() || self.exploration_std_dev < 0.0 {
            return Err(PlanError::InvalidConfig(format!(
                "exploration_std_dev must be finite and >= 0, got {}",
                self.exploration_std_dev
            )));
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
