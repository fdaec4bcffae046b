//! # Validation Tier Tests (T0-T4)
//!
//! If ANY tier fails, the planner is INVALID.
//!
//! ## Tiers
//! - T0: Relational Integrity
//! - T1: Action Semantics
//! - T2: Successor Generation
//! - T3: Search
//! - T4: Cost Repair and Rescoring

use imitor_core::{
    Action, ActionId, InternalModel, InternalState, Object, ObjectRoles, PlanError, Planner,
    PolicyExtractor, Relation, SearchConfig, SearchMode, State, SuccessorGenerator, Term,
};
use imitor_core::primitives::{PARAM_1, PARAM_2};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn rel(kind: &str, a: &str, b: &str) -> Relation {
    Relation::new(kind, a, b)
}

fn state(facts: &[(&str, &str, &str)]) -> State {
    let mut s: State = facts.iter().map(|(k, a, b)| rel(k, a, b)).collect();
    s.update_next_to();
    s
}

fn move_action() -> Action {
    Action::new(
        ActionId(0),
        "MOVE",
        State::new(),
        State::from_facts([rel("NEXT", "Imitator", PARAM_1)]),
        5.0,
    )
}

fn grab_action() -> Action {
    Action::new(
        ActionId(1),
        "GRAB",
        State::from_facts([rel("NEXT", "Imitator", PARAM_1)]),
        State::from_facts([rel("ON", "Gripper", PARAM_1)]),
        2.0,
    )
}

fn drop_action() -> Action {
    Action::new(
        ActionId(2),
        "DROP",
        State::from_facts([rel("ON", "Gripper", PARAM_1)]),
        State::new(),
        2.0,
    )
}

fn push_action() -> Action {
    Action::new(
        ActionId(3),
        "PUSH",
        State::new(),
        State::from_facts([rel("NEXT", "Imitator", PARAM_2)]),
        8.0,
    )
}

fn scene_objects() -> Vec<Object> {
    vec![
        Object::new("Imitator", "WHITE", "METAL"),
        Object::new("Trashcan", "BLACK", "PLASTIC"),
        Object::new("ObjA", "RED", "PLASTIC"),
    ]
}

/// Route planner events to the test output; `RUST_LOG=imitor_core=debug`
/// shows every expansion.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// 50 per fact present on one side only.
fn symmetric(observed: &State, internal: &State) -> f64 {
    let missing = observed.iter().filter(|f| internal.find_pattern(f).is_none()).count();
    let extra = internal.iter().filter(|f| observed.find_pattern(f).is_none()).count();
    (missing + extra) as f64 * 50.0
}

// =============================================================================
// TIER T0: RELATIONAL INTEGRITY
// =============================================================================

mod t0_relational_integrity {
    use super::*;

    /// T0.1: The full wildcard matches every relation.
    #[test]
    fn full_wildcard_matches_everything() {
        let pattern = Relation::any();
        for fact in [rel("NEXT", "Imitator", "ObjA"), rel("ON", "Gripper", "?")] {
            assert!(fact.matches(&pattern));
        }
    }

    /// T0.2: Exact triples match only themselves.
    #[test]
    fn exact_triples_match_only_themselves() {
        let a = rel("NEXT", "Imitator", "ObjA");
        assert!(a.matches(&a.clone()));
        assert!(!a.matches(&rel("NEXT", "Imitator", "Toy")));
        assert!(!a.matches(&rel("NEXT", "Demo", "ObjA")));
    }

    /// T0.3: A literal "?" is data, not a wildcard.
    #[test]
    fn literal_question_mark_is_data() {
        let stored = rel("NEXT", "Imitator", "?");
        assert!(!rel("NEXT", "Imitator", "ObjA").matches(&stored));
        assert!(rel("NEXT", "Imitator", "ObjA").matches(&Relation::new("NEXT", "Imitator", Term::Any)));
    }

    /// T0.4: Every state contains the empty state and itself.
    #[test]
    fn containment_reflexive() {
        let s = state(&[("NEXT", "Imitator", "ObjA"), ("ON", "Gripper", "Toy")]);
        assert!(s.contains(&State::new()));
        assert!(s.contains(&s));
    }

    /// T0.5: Adjacency is never a single member.
    #[test]
    fn adjacency_never_single() {
        let one = state(&[("NEXT", "Imitator", "ObjA")]);
        assert!(one.next_to().is_empty());

        let two = state(&[("NEXT", "Imitator", "ObjA"), ("NEXT", "Imitator", "Toy")]);
        assert_eq!(two.next_to().len(), 2);
    }
}

// =============================================================================
// TIER T1: ACTION SEMANTICS
// =============================================================================

mod t1_action_semantics {
    use super::*;

    /// T1.1: Rebinding a template never leaks substitutions.
    #[test]
    fn action_reuse_isolated() {
        let template = Action::new(
            ActionId(5),
            "PLACE",
            State::from_facts([rel("ON", PARAM_1, PARAM_2)]),
            State::new(),
            1.0,
        );
        let first = template.bind("Cup", Some("Table"));
        let second = template.bind("Book", Some("Shelf"));

        assert_eq!(first.pre_conds().facts(), &[rel("ON", "Cup", "Table")]);
        assert_eq!(second.pre_conds().facts(), &[rel("ON", "Book", "Shelf")]);
        assert_eq!(template.pre_conds.facts(), &[rel("ON", PARAM_1, PARAM_2)]);
    }

    /// T1.2: PUSH(B toward A) yields [B, A] in that order.
    #[test]
    fn push_effect_order() {
        let start = state(&[("NEXT", "Imitator", "A")]);
        let push = push_action();
        let bound = push.bind("A", Some("B"));
        assert!(bound.is_satisfied(&start));

        let after = bound.execute(&start).expect("push");
        assert_eq!(after.next_to(), &["B".to_string(), "A".to_string()]);
    }

    /// T1.3: GRAB removes adjacency to the grabbed object.
    #[test]
    fn grab_end_to_end() {
        let start = state(&[("NEXT", "Imitator", "ObjA")]);
        let grab = grab_action();
        let after = grab.bind("ObjA", None).execute(&start).expect("grab");

        assert!(after.contains(&State::from_facts([rel("ON", "Gripper", "ObjA")])));
        assert!(after.find_pattern(&rel("NEXT", "Imitator", "ObjA")).is_none());
        assert!(after.next_to().is_empty());
    }

    /// T1.4: DROP next to the trashcan discards the object.
    #[test]
    fn drop_into_trashcan_discards() {
        let start = state(&[("NEXT", "Imitator", "ObjA")]);
        let grab = grab_action();
        let mut held = grab.bind("ObjA", None).execute(&start).expect("grab");
        held.add(rel("NEXT", "Imitator", "Trashcan"));

        let drop = drop_action();
        let after = drop.bind("ObjA", None).execute(&held).expect("drop");
        assert!(after.find_pattern(&rel("NEXT", "Imitator", "ObjA")).is_none());
        assert!(after.find_pattern(&rel("ON", "Gripper", "ObjA")).is_none());
    }

    /// T1.5: A DROP template with no precondition is an error, not a panic.
    #[test]
    fn malformed_drop_reported() {
        let broken = Action::new(ActionId(2), "DROP", State::new(), State::new(), 1.0);
        let result = broken.bind("ObjA", None).execute(&State::new());
        assert!(matches!(result, Err(PlanError::MissingDropTarget { .. })));
    }
}

// =============================================================================
// TIER T2: SUCCESSOR GENERATION
// =============================================================================

mod t2_successor_generation {
    use super::*;

    /// T2.1: Some successor always advances the index.
    #[test]
    fn successor_completeness() {
        let actions = vec![move_action(), grab_action(), drop_action(), push_action()];
        let current = InternalState::new(None, state(&[("NEXT", "Imitator", "ObjA")]), 2);
        let successors = SuccessorGenerator::generate(
            &current,
            &actions,
            &scene_objects(),
            &ObjectRoles::default(),
        )
        .expect("generate");

        assert!(successors.iter().any(|s| s.index == 3));
        assert!(successors.iter().all(|s| s.index == 2 || s.index == 3));
    }

    /// T2.2: Every executed binding appears at both alignments.
    #[test]
    fn both_alignments_emitted() {
        let actions = vec![move_action()];
        let current = InternalState::start(State::new());
        let successors = SuccessorGenerator::generate(
            &current,
            &actions,
            &scene_objects(),
            &ObjectRoles::default(),
        )
        .expect("generate");

        // Three MOVE targets, two alignments each, plus the no-op.
        assert_eq!(successors.len(), 7);
        for pair in successors[..6].chunks(2) {
            assert_eq!(pair[0].state, pair[1].state);
            assert_eq!(pair[0].index + 1, pair[1].index);
        }
    }

    /// T2.3: Unsatisfied bindings produce nothing.
    #[test]
    fn unsatisfied_bindings_skipped() {
        let actions = vec![drop_action()];
        let current = InternalState::start(state(&[("NEXT", "Imitator", "ObjA")]));
        let successors = SuccessorGenerator::generate(
            &current,
            &actions,
            &scene_objects(),
            &ObjectRoles::default(),
        )
        .expect("generate");
        assert_eq!(successors.len(), 1);
    }
}

// =============================================================================
// TIER T3: SEARCH
// =============================================================================

mod t3_search {
    use super::*;

    fn demonstration() -> Vec<State> {
        vec![
            State::from_facts([rel("NEXT", "Imitator", "ObjA")]),
            State::from_facts([rel("ON", "Gripper", "ObjA")]),
            State::from_facts([rel("ON", "Gripper", "ObjA"), rel("NEXT", "Imitator", "Trashcan")]),
            State::from_facts([rel("NEXT", "Imitator", "Trashcan")]),
        ]
    }

    fn actions() -> Vec<Action> {
        vec![move_action(), grab_action(), drop_action()]
    }

    /// T3.1: The demonstrated grab-and-discard is reproduced.
    #[test]
    fn grab_move_drop_policy() {
        init_tracing();
        let actions = actions();
        let objects = scene_objects();
        let observed = demonstration();
        let mut planner = Planner::new(&actions, &objects, SearchConfig::default());
        let mut rng = StdRng::seed_from_u64(0);

        let start = InternalState::start(observed[0].clone());
        let outcome = planner
            .search(start, &observed, &symmetric, &mut rng)
            .expect("search");

        let steps: Vec<Option<ActionId>> = outcome.policy.iter().map(|n| n.state.action).collect();
        assert_eq!(steps, vec![None, Some(ActionId(1)), Some(ActionId(0)), Some(ActionId(2))]);

        let goal = outcome.policy.last().expect("goal");
        assert_eq!(goal.state.index, 3);
        assert_eq!(goal.g, 9.0);
        assert_eq!(goal.state.state, observed[3]);
        assert!(!outcome.siblings.is_empty());
        assert_eq!(outcome.tree_size, planner.tree().len());
    }

    /// T3.2: No two live nodes share an identity.
    #[test]
    fn node_dominance() {
        let actions = actions();
        let objects = scene_objects();
        let observed = demonstration();
        let mut planner = Planner::new(&actions, &objects, SearchConfig::default());
        let mut rng = StdRng::seed_from_u64(0);

        planner
            .search(InternalState::start(observed[0].clone()), &observed, &symmetric, &mut rng)
            .expect("search");

        let nodes: Vec<_> = planner.tree().iter().collect();
        for (i, (_, a)) in nodes.iter().enumerate() {
            for (_, b) in nodes.iter().skip(i + 1) {
                assert_ne!(a.state, b.state);
            }
        }
    }

    /// T3.3: Parents are always one level above their children.
    #[test]
    fn tree_depths_consistent() {
        let actions = actions();
        let objects = scene_objects();
        let observed = demonstration();
        let mut planner = Planner::new(&actions, &objects, SearchConfig::default());
        let mut rng = StdRng::seed_from_u64(0);

        planner
            .search(InternalState::start(observed[0].clone()), &observed, &symmetric, &mut rng)
            .expect("search");

        let tree = planner.tree();
        for (index, node) in tree.iter() {
            match tree.parent(index) {
                Some(parent) => {
                    let parent = tree.get(parent).expect("parent");
                    assert_eq!(parent.depth + 1, node.depth);
                }
                None => assert_eq!(Some(index), tree.root()),
            }
        }
    }

    /// T3.4: Exploration still terminates at a goal.
    #[test]
    fn exploration_reaches_goal() {
        init_tracing();
        let actions = actions();
        let objects = scene_objects();
        let observed = demonstration();
        let config = SearchConfig::default().with_mode(SearchMode::Exploration);
        let mut planner = Planner::new(&actions, &objects, config);

        for seed in 0..5 {
            let mut rng = StdRng::seed_from_u64(seed);
            let outcome = planner
                .search(InternalState::start(observed[0].clone()), &observed, &symmetric, &mut rng)
                .expect("search");
            assert_eq!(outcome.policy.last().map(|n| n.state.index), Some(3));
        }
    }

    /// T3.5: A fresh search discards the previous tree.
    #[test]
    fn search_resets_tree() {
        let actions = actions();
        let objects = scene_objects();
        let observed = demonstration();
        let mut planner = Planner::new(&actions, &objects, SearchConfig::default());
        let mut rng = StdRng::seed_from_u64(0);

        planner
            .search(InternalState::start(observed[0].clone()), &observed, &symmetric, &mut rng)
            .expect("search");
        let single = vec![observed[0].clone()];
        let outcome = planner
            .search(InternalState::start(observed[0].clone()), &single, &symmetric, &mut rng)
            .expect("search");
        assert_eq!(outcome.tree_size, 1);
        assert_eq!(planner.tree().len(), 1);
    }
}

// =============================================================================
// TIER T4: COST REPAIR AND RESCORING
// =============================================================================

mod t4_cost_repair {
    use super::*;

    fn outcome() -> (Vec<Action>, Vec<State>, imitor_core::SearchOutcome) {
        let actions = vec![move_action(), grab_action(), drop_action()];
        let observed = vec![
            State::from_facts([rel("NEXT", "Imitator", "ObjA")]),
            State::from_facts([rel("ON", "Gripper", "ObjA")]),
            State::from_facts([rel("NEXT", "Imitator", "Trashcan")]),
        ];
        let objects = scene_objects();
        let mut planner = Planner::new(&actions, &objects, SearchConfig::default());
        let mut rng = StdRng::seed_from_u64(0);
        let outcome = planner
            .search(InternalState::start(observed[0].clone()), &observed, &symmetric, &mut rng)
            .expect("search");
        (actions, observed, outcome)
    }

    /// T4.1: Along the policy, parents never report less than children.
    #[test]
    fn backpropagation_monotonicity() {
        let (_, _, outcome) = outcome();
        for pair in outcome.policy.windows(2) {
            assert!(pair[0].f >= pair[1].f);
        }
        for node in outcome.policy.iter().chain(&outcome.siblings) {
            assert_eq!(node.f, node.g + node.h);
        }
    }

    /// T4.2: Siblings are ordered by depth and never on the policy.
    #[test]
    fn siblings_off_policy() {
        let (_, _, outcome) = outcome();
        for pair in outcome.siblings.windows(2) {
            assert!(pair[0].depth <= pair[1].depth);
        }
        for sibling in &outcome.siblings {
            assert!(sibling.depth >= 1);
            assert_ne!(outcome.policy[sibling.depth].state, sibling.state);
        }
    }

    /// T4.3: Rescoring under the same model keeps the policy cost.
    #[test]
    fn rescore_with_same_model_is_stable() {
        let (actions, observed, outcome) = outcome();
        let goal_g = outcome.policy.last().map(|n| n.g);
        let mut model = InternalModel::from_outcome(scene_objects(), outcome);

        model.rescore(&observed, &actions, &symmetric, 30.0).expect("rescore");
        assert_eq!(model.policy.last().map(|n| n.g), goal_g);
        for pair in model.policy.windows(2) {
            assert!(pair[0].f >= pair[1].f);
        }
    }

    /// T4.4: Rescoring under a new model updates every node.
    #[test]
    fn rescore_with_new_model() {
        let (actions, observed, outcome) = outcome();
        let mut model = InternalModel::from_outcome(scene_objects(), outcome);
        let flat = |_: &State, _: &State| 7.0;

        model.rescore(&observed, &actions, &flat, 30.0).expect("rescore");
        for node in model.policy.iter().chain(&model.siblings) {
            assert_eq!(node.state.distance, 7.0);
        }
        assert_eq!(model.policy[0].g, 7.0);
    }

    /// T4.5: The path pass is idempotent.
    #[test]
    fn path_pass_idempotent() {
        let (_, _, outcome) = outcome();
        let mut policy = outcome.policy.clone();
        PolicyExtractor::backpropagate_path(&mut policy);
        assert_eq!(policy, outcome.policy);
    }
}
