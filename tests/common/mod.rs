//! Machines shared by the manager integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use machinist::{
    state_enum, EventBroker, Machine, MachineError, MachineEvent, StateMachine,
    StateMachineBuilder, StateSnapshot, TransitionBuilder, TransitionListener, TransitionUpdate,
};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

/// Route manager logs through the test harness. Set `RUST_LOG=machinist=debug`
/// to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

state_enum! {
    pub enum Counting {
        Counting,
    }
    initial: Counting
}

/// Single-state machine whose context counts `increment` events.
pub fn counter(name: &str) -> StateMachine<Counting, u32> {
    StateMachineBuilder::new(name)
        .initial(Counting::Counting)
        .default_context()
        .transition(
            TransitionBuilder::new()
                .from(Counting::Counting)
                .on("increment")
                .to(Counting::Counting)
                .reduce(|count: &mut u32, _: &MachineEvent| *count += 1),
        )
        .build()
        .unwrap()
}

state_enum! {
    pub enum Relay {
        Ready,
    }
    initial: Ready
}

/// Machine that reacts to `event` by emitting `emits` and staying put.
pub fn relay(name: &str, event: &str, emits: Vec<MachineEvent>) -> StateMachine<Relay, ()> {
    let mut row = TransitionBuilder::new()
        .from(Relay::Ready)
        .on(event)
        .to(Relay::Ready);
    for follow_up in emits {
        row = row.emit(follow_up);
    }

    StateMachineBuilder::new(name)
        .initial(Relay::Ready)
        .context(())
        .transition(row)
        .build()
        .unwrap()
}

/// Shared log of event names collected by a listener.
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn listener(&self) -> impl Fn(&TransitionUpdate) + Send + Sync + 'static {
        let log = Arc::clone(&self.0);
        move |update: &TransitionUpdate| {
            log.lock()
                .unwrap()
                .push(format!("{}:{}", update.machine, update.event.name()))
        }
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// Hand-written machine that records every event it accepts.
///
/// `fail` makes it reject the event, `explode` panics inside `accept` and
/// any other name is recorded and, if a forward target is set, passed on.
pub struct Recorder {
    name: String,
    seen: Arc<Mutex<Vec<String>>>,
    forward_to: Option<String>,
    listeners: Vec<TransitionListener>,
    broker: BrokerSlot,
}

/// The broker a manager attached to a [`Recorder`], reachable from the test.
pub type BrokerSlot = Arc<Mutex<Option<Arc<dyn EventBroker>>>>;

impl Recorder {
    pub fn new(name: &str) -> (Self, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = Self {
            name: name.to_string(),
            seen: Arc::clone(&seen),
            forward_to: None,
            listeners: Vec::new(),
            broker: BrokerSlot::default(),
        };
        (recorder, seen)
    }

    pub fn broker_slot(&self) -> BrokerSlot {
        Arc::clone(&self.broker)
    }

    pub fn forwarding_to(mut self, machine: &str) -> Self {
        self.forward_to = Some(machine.to_string());
        self
    }

    fn count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait]
impl Machine for Recorder {
    fn name(&self) -> &str {
        &self.name
    }

    async fn accept(&mut self, event: MachineEvent) -> Result<(), MachineError> {
        match event.name() {
            "explode" => panic!("recorder '{}' exploded", self.name),
            "fail" => Err(MachineError::Rejected {
                machine: self.name.clone(),
                event: event.name().to_string(),
                reason: "told to fail".to_string(),
            }),
            name => {
                self.seen.lock().unwrap().push(name.to_string());
                let broker = self.broker.lock().unwrap().clone();
                if let (Some(target), Some(broker)) = (&self.forward_to, broker) {
                    broker.dispatch(MachineEvent::new(target.clone(), name));
                }
                let update = TransitionUpdate {
                    machine: self.name.clone(),
                    previous_state: "Recording".to_string(),
                    event,
                    next_state: "Recording".to_string(),
                    context: json!({ "seen": self.count() }),
                };
                for listener in &self.listeners {
                    listener(&update);
                }
                Ok(())
            }
        }
    }

    fn current_state(&self) -> Result<StateSnapshot, MachineError> {
        Ok(StateSnapshot::new(
            "Recording",
            json!({ "seen": self.count() }),
        ))
    }

    fn add_listener(&mut self, listener: TransitionListener) {
        self.listeners.push(listener);
    }

    fn add_broker(&mut self, broker: Arc<dyn EventBroker>) {
        *self.broker.lock().unwrap() = Some(broker);
    }

    fn restart(&self) -> Box<dyn Machine> {
        Box::new(Self {
            name: self.name.clone(),
            seen: Arc::new(Mutex::new(Vec::new())),
            forward_to: self.forward_to.clone(),
            listeners: self.listeners.clone(),
            broker: BrokerSlot::default(),
        })
    }
}

state_enum! {
    pub enum Ledger {
        Open,
        Closed,
    }
    initial: Open
}

/// Machine whose context has non-string map keys, which JSON cannot hold,
/// so every snapshot of it fails.
pub fn unserializable(name: &str) -> StateMachine<Ledger, BTreeMap<Vec<u8>, u32>> {
    StateMachineBuilder::new(name)
        .initial(Ledger::Open)
        .context(BTreeMap::from([(vec![1u8], 1u32)]))
        .on(Ledger::Open, "close", Ledger::Closed)
        .build()
        .unwrap()
}
