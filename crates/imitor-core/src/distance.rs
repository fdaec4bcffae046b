//! # Distance Module
//!
//! Scoring how far an internal state is from its aligned observed state.
//!
//! - [`DistanceModel`]: the pluggable deterministic estimator (a learned
//!   model lives behind this trait outside the crate)
//! - [`Scorer`]: applies a [`SearchMode`] on top of a model; exploration
//!   draws a truncated Gaussian around the deterministic estimate
//! - [`ProfileDistance`]: a hand-coded symbolic estimator comparing
//!   per-object attribute profiles
//!
//! Every estimate is clamped to `>= 0`.

use crate::config::SearchMode;
use crate::primitives::{DEFAULT_PROFILE_WEIGHT, DEMONSTRATOR, GRIPPER, IMITATOR, ON};
use crate::{Object, Relation, State, Term};
use rand::Rng;
use std::f64::consts::PI;

// =============================================================================
// DISTANCE MODEL
// =============================================================================

/// A deterministic distance estimator.
pub trait DistanceModel {
    /// Estimate the distance between an observed and an internal state.
    fn estimate(&self, observed: &State, internal: &State) -> f64;
}

impl<F> DistanceModel for F
where
    F: Fn(&State, &State) -> f64,
{
    fn estimate(&self, observed: &State, internal: &State) -> f64 {
        self(observed, internal)
    }
}

// =============================================================================
// SCORER
// =============================================================================

/// A distance model plus the exploration sampling parameters.
pub struct Scorer<'a> {
    model: &'a dyn DistanceModel,
    std_dev: f64,
}

impl<'a> Scorer<'a> {
    /// Create a scorer sampling with the given standard deviation.
    #[must_use]
    pub fn new(model: &'a dyn DistanceModel, std_dev: f64) -> Self {
        Self { model, std_dev }
    }

    /// The deterministic estimate, clamped to `>= 0`.
    ///
    /// A NaN estimate is treated as zero.
    #[must_use]
    pub fn estimate(&self, observed: &State, internal: &State) -> f64 {
        self.model.estimate(observed, internal).max(0.0)
    }

    /// Score under `mode`.
    pub fn distance<R: Rng>(
        &self,
        observed: &State,
        internal: &State,
        mode: SearchMode,
        rng: &mut R,
    ) -> f64 {
        match mode {
            SearchMode::Exploitation => self.estimate(observed, internal),
            SearchMode::Exploration => self.sample(observed, internal, rng),
        }
    }

    /// A Gaussian sample around the estimate, redrawn until non-negative.
    ///
    /// A non-positive or non-finite spread returns the estimate unchanged.
    pub fn sample<R: Rng>(&self, observed: &State, internal: &State, rng: &mut R) -> f64 {
        let mean = self.estimate(observed, internal);
        if !(self.std_dev.is_finite() && self.std_dev > 0.0) {
            return mean;
        }
        // mean >= 0, so each draw succeeds with probability >= 1/2.
        loop {
            let value = mean + self.std_dev * standard_normal(rng);
            if value >= 0.0 {
                return value;
            }
        }
    }
}

/// One standard normal draw (Box-Muller).
fn standard_normal<R: Rng>(rng: &mut R) -> f64 {
    // u1 in (0, 1] keeps the logarithm finite.
    let u1 = 1.0 - rng.random::<f64>();
    let u2 = rng.random::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

// =============================================================================
// PROFILE DISTANCE
// =============================================================================

/// One profile row: relation kind, color, texture. `None` is an empty cell.
type Row<'a> = [Option<&'a str>; 3];

/// Hand-coded distance over per-object attribute profiles.
///
/// A profile has one row per known object, describing the first fact that
/// links the actor to it, and one trailing row for what the gripper holds.
/// Observed states are profiled against the demonstrator and the observed
/// objects, internal states against the imitator and the internal objects.
#[derive(Debug, Clone)]
pub struct ProfileDistance {
    observed_actor: String,
    internal_actor: String,
    observed_objects: Vec<Object>,
    internal_objects: Vec<Object>,
    weight: f64,
}

impl ProfileDistance {
    /// Create a profile distance with the default actors and weight.
    #[must_use]
    pub fn new(observed_objects: Vec<Object>, internal_objects: Vec<Object>) -> Self {
        Self {
            observed_actor: DEMONSTRATOR.to_string(),
            internal_actor: IMITATOR.to_string(),
            observed_objects,
            internal_objects,
            weight: DEFAULT_PROFILE_WEIGHT,
        }
    }

    /// Override the actor names.
    #[must_use]
    pub fn with_actors(mut self, observed: impl Into<String>, internal: impl Into<String>) -> Self {
        self.observed_actor = observed.into();
        self.internal_actor = internal.into();
        self
    }

    /// Override the per-cell weight.
    #[must_use]
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Build the profile of `state` as seen by `actor` over `objects`.
    fn profile<'a>(state: &'a State, actor: &str, objects: &'a [Object]) -> Profile<'a> {
        let rows = objects
            .iter()
            .map(|object| {
                let pattern = Relation::new(Term::Any, actor, object.name.clone());
                match state.find_pattern(&pattern) {
                    Some(fact) => [
                        fact.kind.as_str(),
                        object.color.as_str(),
                        object.texture.as_str(),
                    ],
                    None => [None; 3],
                }
            })
            .collect();

        let held = state
            .find_pattern(&Relation::new(ON, GRIPPER, Term::Any))
            .and_then(|fact| objects.iter().find(|o| o.name == fact.subject_b));
        let held = match held {
            Some(object) => [Some(ON), object.color.as_str(), object.texture.as_str()],
            None => [Some(ON), None, None],
        };
        Profile { rows, held }
    }
}

/// Object rows in object order plus the gripper row.
struct Profile<'a> {
    rows: Vec<Row<'a>>,
    held: Row<'a>,
}

impl Profile<'_> {
    /// Count differing cells; object rows present on one side only count fully.
    fn differing_cells(&self, other: &Profile<'_>) -> usize {
        let paired: usize = self.rows.iter().zip(&other.rows).map(|(x, y)| cells(x, y)).sum();
        let unpaired = self.rows.len().abs_diff(other.rows.len()) * 3;
        paired + unpaired + cells(&self.held, &other.held)
    }
}

fn cells(x: &Row<'_>, y: &Row<'_>) -> usize {
    x.iter().zip(y).filter(|(p, q)| p != q).count()
}

impl DistanceModel for ProfileDistance {
    fn estimate(&self, observed: &State, internal: &State) -> f64 {
        let seen = Self::profile(observed, &self.observed_actor, &self.observed_objects);
        let own = Self::profile(internal, &self.internal_actor, &self.internal_objects);
        seen.differing_cells(&own) as f64 * self.weight
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rel(kind: &str, a: &str, b: &str) -> Relation {
        Relation::new(kind, a, b)
    }

    fn profile_distance() -> ProfileDistance {
        ProfileDistance::new(
            vec![
                Object::new("Cup", "RED", "PLASTIC"),
                Object::new("Bin", "BLACK", "METAL"),
            ],
            vec![
                Object::new("ObjA", "RED", "PLASTIC"),
                Object::new("Trashcan", "BLACK", "METAL"),
            ],
        )
    }

    #[test]
    fn closures_are_distance_models() {
        let model = |_: &State, internal: &State| internal.len() as f64;
        let state = State::from_facts([rel("NEXT", "Imitator", "ObjA")]);
        assert_eq!(model.estimate(&State::new(), &state), 1.0);
    }

    #[test]
    fn negative_estimates_are_clamped() {
        let model = |_: &State, _: &State| -5.0;
        let scorer = Scorer::new(&model, 30.0);
        assert_eq!(scorer.estimate(&State::new(), &State::new()), 0.0);
    }

    #[test]
    fn exploitation_is_deterministic() {
        let model = |_: &State, _: &State| 12.0;
        let scorer = Scorer::new(&model, 30.0);
        let mut rng = StdRng::seed_from_u64(7);
        let d = scorer.distance(&State::new(), &State::new(), SearchMode::Exploitation, &mut rng);
        assert_eq!(d, 12.0);
    }

    #[test]
    fn exploration_samples_are_non_negative() {
        let model = |_: &State, _: &State| 1.0;
        let scorer = Scorer::new(&model, 30.0);
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let d = scorer.distance(&State::new(), &State::new(), SearchMode::Exploration, &mut rng);
            assert!(d >= 0.0);
        }
    }

    #[test]
    fn standard_normal_is_centered() {
        let mut rng = StdRng::seed_from_u64(5);
        let n = 4000;
        let mean = (0..n).map(|_| standard_normal(&mut rng)).sum::<f64>() / n as f64;
        assert!(mean.abs() < 0.1);
    }

    #[test]
    fn zero_std_dev_returns_the_estimate() {
        let model = |_: &State, _: &State| 9.0;
        let scorer = Scorer::new(&model, 0.0);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(scorer.sample(&State::new(), &State::new(), &mut rng), 9.0);
    }

    #[test]
    fn seeded_exploration_is_reproducible() {
        let model = |_: &State, _: &State| 50.0;
        let scorer = Scorer::new(&model, 30.0);
        let mut a = StdRng::seed_from_u64(3);
        let mut b = StdRng::seed_from_u64(3);
        let xs: Vec<f64> = (0..10).map(|_| scorer.sample(&State::new(), &State::new(), &mut a)).collect();
        let ys: Vec<f64> = (0..10).map(|_| scorer.sample(&State::new(), &State::new(), &mut b)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn matching_profiles_have_zero_distance() {
        let observed = State::from_facts([rel("NEXT", "Demo", "Cup"), rel("ON", "Gripper", "Bin")]);
        let internal = State::from_facts([
            rel("NEXT", "Imitator", "ObjA"),
            rel("ON", "Gripper", "Trashcan"),
        ]);
        assert_eq!(profile_distance().estimate(&observed, &internal), 0.0);
    }

    #[test]
    fn each_differing_cell_costs_the_weight() {
        let observed = State::from_facts([rel("NEXT", "Demo", "Cup")]);
        let internal = State::from_facts([rel("AWAY", "Imitator", "ObjA")]);
        assert_eq!(profile_distance().estimate(&observed, &internal), 10.0);

        let nothing = State::new();
        // Kind, color and texture of the Cup row all differ.
        assert_eq!(profile_distance().estimate(&observed, &nothing), 30.0);
    }

    #[test]
    fn held_object_attributes_are_compared() {
        let observed = State::from_facts([rel("ON", "Gripper", "Cup")]);
        let internal = State::from_facts([rel("ON", "Gripper", "Trashcan")]);
        let d = profile_distance().with_weight(1.0).estimate(&observed, &internal);
        assert_eq!(d, 2.0);
    }

    #[test]
    fn unequal_object_counts_penalize_missing_rows() {
        let model = ProfileDistance::new(vec![Object::new("Cup", "RED", "PLASTIC")], Vec::new())
            .with_weight(1.0);
        assert_eq!(model.estimate(&State::new(), &State::new()), 3.0);
    }
}
