//! Property-based tests for machines and the manager.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated inputs.

use chrono::Utc;
use machinist::core::{Guard, State, StateHistory, StateTransition};
use machinist::{
    state_enum, MachineEvent, MachineManager, ManagerOptions, StateMachineBuilder,
    TransitionBuilder,
};
use proptest::prelude::*;
use serde_json::json;

state_enum! {
    enum TestState {
        Initial,
        Processing,
        Complete,
        Failed,
    }
    initial: Initial
    final: [Complete, Failed]
}

prop_compose! {
    fn arbitrary_state()(variant in 0..4u8) -> TestState {
        match variant {
            0 => TestState::Initial,
            1 => TestState::Processing,
            2 => TestState::Complete,
            _ => TestState::Failed,
        }
    }
}

/// A caller request against a manager hosting one counter machine.
#[derive(Clone, Debug)]
enum Op {
    Increment,
    Decrement,
    Query,
    Reset,
}

fn arbitrary_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => Just(Op::Increment),
        2 => Just(Op::Decrement),
        3 => Just(Op::Query),
        1 => Just(Op::Reset),
    ]
}

state_enum! {
    enum Level {
        Zero,
        Positive,
    }
    initial: Zero
}

/// Counts up and down but never below zero; the state tracks whether the
/// count is positive.
fn level_machine() -> machinist::StateMachine<Level, i64> {
    let step = |from: Level, event: &str, to: Level, delta: i64| {
        TransitionBuilder::new()
            .from(from)
            .on(event)
            .to(to)
            .reduce(move |count: &mut i64, _: &MachineEvent| *count += delta)
    };

    StateMachineBuilder::new("level")
        .initial(Level::Zero)
        .context(0i64)
        .transition(step(Level::Zero, "up", Level::Positive, 1))
        .transition(
            step(Level::Positive, "down", Level::Zero, -1)
                .when(|count: &i64, _: &MachineEvent| *count == 1),
        )
        .transition(step(Level::Positive, "down", Level::Positive, -1))
        .transition(step(Level::Positive, "up", Level::Positive, 1))
        .build()
        .unwrap()
}

/// Sequential model of `level_machine` under `ops`; one expected count per op.
fn model(ops: &[Op]) -> Vec<i64> {
    let mut count = 0i64;
    ops.iter()
        .map(|op| {
            match op {
                Op::Increment => count += 1,
                Op::Decrement if count > 0 => count -= 1,
                Op::Decrement | Op::Query => {}
                Op::Reset => count = 0,
            }
            count
        })
        .collect()
}

proptest! {
    #[test]
    fn guard_is_deterministic(count in 0..100u32, threshold in 0..100u32) {
        let guard = Guard::new(move |count: &u32, _: &MachineEvent| *count < threshold);
        let event = MachineEvent::new("retry", "attempt");
        prop_assert_eq!(guard.check(&count, &event), guard.check(&count, &event));
        prop_assert_eq!(guard.check(&count, &event), count < threshold);
    }

    #[test]
    fn state_final_is_deterministic(state in arbitrary_state()) {
        let final1 = state.is_final();
        let final2 = state.is_final();
        prop_assert_eq!(final1, final2);
        prop_assert_eq!(final1, matches!(state, TestState::Complete | TestState::Failed));
    }

    #[test]
    fn history_preserves_order(
        transitions in prop::collection::vec(arbitrary_state(), 1..10)
    ) {
        let mut history = StateHistory::new();
        let mut expected_path = vec![TestState::Initial];

        for (i, to_state) in transitions.iter().enumerate() {
            let from_state = if i == 0 {
                TestState::Initial
            } else {
                transitions[i - 1].clone()
            };

            let transition = StateTransition {
                from: from_state.clone(),
                to: to_state.clone(),
                event: format!("step-{i}"),
                event_id: None,
                timestamp: Utc::now(),
            };

            history = history.record(transition);
            expected_path.push(to_state.clone());
        }

        let path = history.get_path();
        prop_assert_eq!(path.len(), expected_path.len());

        for (i, state) in path.iter().enumerate() {
            prop_assert_eq!(*state, &expected_path[i]);
        }

        let events = history.events();
        prop_assert_eq!(events.len(), transitions.len());
        prop_assert_eq!(events.first().copied(), Some("step-0"));
    }

    #[test]
    fn history_record_is_pure(state1 in arbitrary_state(), state2 in arbitrary_state()) {
        let history = StateHistory::new();

        let transition = StateTransition {
            from: state1,
            to: state2,
            event: "advance".to_string(),
            event_id: Some("evt-1".to_string()),
            timestamp: Utc::now(),
        };

        let new_history = history.record(transition);

        // Original history unchanged
        prop_assert_eq!(history.transitions().len(), 0);
        // New history has the transition
        prop_assert_eq!(new_history.transitions().len(), 1);
    }

    #[test]
    fn ensure_id_is_stable(name in "[a-z_]{1,12}", preset in proptest::option::of("[a-z0-9-]{1,20}")) {
        let mut event = MachineEvent::new("tokens", name);
        if let Some(id) = &preset {
            event = event.with_id(id.clone());
        }

        let first = event.ensure_id().to_string();
        let second = event.ensure_id().to_string();

        prop_assert_eq!(&first, &second);
        if let Some(id) = preset {
            prop_assert_eq!(first, id);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Requests issued back to back without awaiting resolve exactly as if
    /// each had been awaited before issuing the next.
    #[test]
    fn queued_requests_match_sequential_model(ops in prop::collection::vec(arbitrary_op(), 1..40)) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let expected = model(&ops);

        let observed = runtime.block_on(async {
            let manager = MachineManager::new(ManagerOptions::new("model"));
            manager.add_machine_if_absent(level_machine());

            let pending: Vec<_> = ops
                .iter()
                .map(|op| match op {
                    Op::Increment => manager.send(MachineEvent::new("level", "up")),
                    Op::Decrement => manager.send(MachineEvent::new("level", "down")),
                    Op::Query => manager.current_state("level"),
                    Op::Reset => manager.reset_machine("level"),
                })
                .collect();

            let mut observed = Vec::with_capacity(pending.len());
            for result in pending {
                observed.push(result.await.unwrap());
            }
            observed
        });

        for (snapshot, count) in observed.iter().zip(&expected) {
            prop_assert_eq!(&snapshot.context, &json!(count));
            prop_assert_eq!(snapshot.is("Positive"), *count > 0);
        }
    }
}
