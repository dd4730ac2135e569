//! Serialized coordination of a set of named machines.
//!
//! A [`MachineManager`] owns a registry of machines and two FIFO queues:
//!
//! - the **API queue** of caller-issued requests (add a machine, attach a
//!   listener, query a snapshot, send an event, reset a machine)
//! - the **cross-machine queue** of events awaiting routing while one
//!   `send` request is processed
//!
//! Every public operation appends a request to the API queue and returns a
//! [`Pending`] result immediately. If no drain loop is running, one is
//! spawned; it pops requests one at a time until the API queue is empty and
//! then goes idle. Exactly one request is ever in flight per manager, so the
//! registry and queues need no further coordination.
//!
//! # Propagation order
//!
//! Processing a `send` pushes the event onto the cross-machine queue and
//! drains it to exhaustion. Follow-up events emitted by a machine are
//! appended at the tail, so siblings are handled breadth-first: if `a`
//! emits events for `b` and `c`, and `b` then emits one for `c`, machine `c`
//! sees `a`'s event before `b`'s. The caller's result resolves with the
//! addressed machine's snapshot only after the whole cascade has settled.
//!
//! # Failures
//!
//! An error while processing a request rejects that request only. If it
//! happens mid-cascade, events still queued from that cascade are dropped.
//! A machine whose `accept` never completes blocks the manager
//! indefinitely; no timeout is imposed.
//!
//! # Stray events
//!
//! The broker a manager attaches can be called at any time, but its events
//! are only drained while a request is being processed. An event dispatched
//! outside `accept` (say, from a task spawned by an action) waits in the
//! cross-machine queue and is routed at the head of the next `send` or reset
//! cascade, whichever request that is. Its failure then fails that request
//! and discards the rest of the cascade.

mod error;
mod queue;
mod registry;
mod request;

pub use error::ManagerError;
pub use request::Pending;

use crate::core::{MachineEvent, StateSnapshot};
use crate::machine::{EventBroker, Machine, TransitionUpdate};
use queue::{EventQueue, QueueBroker};
use registry::Registry;
use request::{InternalRequest, Responder};
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tracing::{debug, debug_span, trace, Instrument};

/// Configuration for a [`MachineManager`].
#[derive(Clone, Debug)]
pub struct ManagerOptions {
    /// Used in diagnostics and error messages only.
    pub name: String,
}

impl ManagerOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self::new("machine-manager")
    }
}

/// Handle to a set of cooperating machines.
///
/// Cloning the handle shares the same registry and queues.
///
/// # Panics
///
/// Operations spawn the drain loop on the current Tokio runtime and panic if
/// called outside one. Such a call leaves the manager untouched and usable
/// from a runtime afterwards.
///
/// # Example
///
/// ```rust
/// use machinist::builder::StateMachineBuilder;
/// use machinist::core::MachineEvent;
/// use machinist::manager::{MachineManager, ManagerOptions};
/// use machinist::state_enum;
///
/// state_enum! {
///     enum Light {
///         Off,
///         On,
///     }
/// }
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let manager = MachineManager::new(ManagerOptions::new("home"));
/// let light = StateMachineBuilder::new("light")
///     .initial(Light::Off)
///     .context(())
///     .on(Light::Off, "toggle", Light::On)
///     .on(Light::On, "toggle", Light::Off)
///     .build()
///     .unwrap();
///
/// manager.add_machine_if_absent(light).await.unwrap();
/// let snapshot = manager.send(MachineEvent::new("light", "toggle")).await.unwrap();
/// assert_eq!(snapshot.state, "On");
/// # });
/// ```
#[derive(Clone)]
pub struct MachineManager {
    shared: Arc<Shared>,
}

impl MachineManager {
    pub fn new(options: ManagerOptions) -> Self {
        Self {
            shared: Arc::new(Shared {
                registry: tokio::sync::Mutex::new(Registry::new(options.name.clone())),
                name: options.name,
                api: Mutex::new(ApiQueue::default()),
                events: EventQueue::default(),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Register `machine` unless one with the same name already exists.
    ///
    /// A duplicate is not an error: the existing machine is kept untouched and
    /// its snapshot is returned.
    pub fn add_machine_if_absent<M>(&self, machine: M) -> Pending<StateSnapshot>
    where
        M: Machine + 'static,
    {
        self.add_boxed_machine_if_absent(Box::new(machine))
    }

    pub fn add_boxed_machine_if_absent(&self, machine: Box<dyn Machine>) -> Pending<StateSnapshot> {
        self.submit(|respond| InternalRequest::AddMachine { machine, respond })
    }

    /// Attach a transition listener to a registered machine.
    ///
    /// The returned result may be dropped; the listener is attached either way
    /// once the request is processed. It rejects with
    /// [`ManagerError::NotFound`] if `machine` is not registered by then.
    pub fn add_listener<F>(&self, machine: impl Into<String>, listener: F) -> Pending<()>
    where
        F: Fn(&TransitionUpdate) + Send + Sync + 'static,
    {
        let machine = machine.into();
        self.submit(|respond| InternalRequest::AddListener {
            machine,
            listener: Arc::new(listener),
            respond,
        })
    }

    /// Snapshot of `machine` after every request queued before this one.
    pub fn current_state(&self, machine: impl Into<String>) -> Pending<StateSnapshot> {
        let machine = machine.into();
        self.submit(|respond| InternalRequest::QueryCurrentState { machine, respond })
    }

    /// Deliver `event` and every follow-up event it causes, then resolve with
    /// the snapshot of the machine `event` was addressed to.
    pub fn send(&self, event: MachineEvent) -> Pending<StateSnapshot> {
        self.submit(|respond| InternalRequest::SendEvent { event, respond })
    }

    /// Replace `machine` with its own restarted copy and resolve with the
    /// fresh snapshot.
    pub fn reset_machine(&self, machine: impl Into<String>) -> Pending<StateSnapshot> {
        let machine = machine.into();
        self.submit(|respond| InternalRequest::ResetMachine { machine, respond })
    }

    /// Names of all registered machines, sorted.
    pub fn machine_names(&self) -> Pending<Vec<String>> {
        self.submit(|respond| InternalRequest::ListMachines { respond })
    }

    fn submit<T>(&self, request: impl FnOnce(Responder<T>) -> InternalRequest) -> Pending<T> {
        let (respond, pending) = Pending::new(self.shared.name.clone());
        Shared::enqueue(&self.shared, request(respond));
        pending
    }
}

impl fmt::Debug for MachineManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MachineManager")
            .field("name", &self.shared.name)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
struct ApiQueue {
    requests: VecDeque<InternalRequest>,
    draining: bool,
    stopped: bool,
}

struct Shared {
    name: String,
    api: Mutex<ApiQueue>,
    /// Locked by the drain loop for its whole run; only one loop exists at a time.
    registry: tokio::sync::Mutex<Registry>,
    events: EventQueue,
}

impl Shared {
    fn lock_api(&self) -> MutexGuard<'_, ApiQueue> {
        self.api.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a request, starting the drain loop if it is idle.
    ///
    /// The runtime is resolved before the queue is touched, so a call made
    /// outside one panics without leaving the queue marked as draining.
    fn enqueue(this: &Arc<Self>, request: InternalRequest) {
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(err) => panic!(
                "machine manager '{}' used outside a Tokio runtime: {err}",
                this.name
            ),
        };

        let start = {
            let mut api = this.lock_api();
            if api.stopped {
                debug!(
                    manager = %this.name,
                    kind = request.kind(),
                    "manager stopped, rejecting request"
                );
                return;
            }
            api.requests.push_back(request);
            !std::mem::replace(&mut api.draining, true)
        };

        if start {
            let shared = Arc::clone(this);
            let span = debug_span!("drain", manager = %this.name);
            runtime.spawn(shared.drain().instrument(span));
        }
    }

    fn next_request(&self) -> Option<InternalRequest> {
        let mut api = self.lock_api();
        let next = api.requests.pop_front();
        if next.is_none() {
            api.draining = false;
        }
        next
    }

    async fn drain(self: Arc<Self>) {
        let guard = StopOnAbort {
            shared: &self,
            finished: false,
        };
        let mut registry = self.registry.lock().await;

        while let Some(request) = self.next_request() {
            let span = debug_span!("request", kind = request.kind());
            self.process(&mut registry, request).instrument(span).await;
        }

        guard.finish();
    }

    async fn process(&self, registry: &mut Registry, request: InternalRequest) {
        match request {
            InternalRequest::QueryCurrentState { machine, respond } => {
                self.reply(respond, registry.snapshot(&machine));
            }
            InternalRequest::AddMachine { machine, respond } => {
                let name = machine.name().to_string();
                self.install(registry, machine);
                self.reply(respond, registry.snapshot(&name));
            }
            InternalRequest::AddListener {
                machine,
                listener,
                respond,
            } => {
                let result = match registry.get_mut(&machine) {
                    Some(target) => {
                        target.add_listener(listener);
                        Ok(())
                    }
                    None => Err(registry.not_found(&machine)),
                };
                self.reply(respond, result);
            }
            InternalRequest::ResetMachine { machine, respond } => {
                let result = self
                    .propagate(registry, MachineEvent::reset(machine.clone()))
                    .await
                    .and_then(|()| registry.snapshot(&machine));
                self.reply(respond, result);
            }
            InternalRequest::SendEvent { event, respond } => {
                let target = event.to_machine.clone().unwrap_or_default();
                let result = self
                    .propagate(registry, event)
                    .await
                    .and_then(|()| registry.snapshot(&target));
                self.reply(respond, result);
            }
            InternalRequest::ListMachines { respond } => {
                self.reply(respond, Ok(registry.names()));
            }
        }
    }

    fn install(&self, registry: &mut Registry, mut machine: Box<dyn Machine>) {
        if registry.contains(machine.name()) {
            debug!(
                manager = %self.name,
                machine = machine.name(),
                "state machine already exists, keeping the registered instance"
            );
            return;
        }
        machine.add_broker(self.broker());
        registry.insert(machine);
    }

    fn broker(&self) -> Arc<dyn EventBroker> {
        Arc::new(QueueBroker {
            manager: self.name.clone(),
            queue: self.events.clone(),
        })
    }

    /// Push `event` and drain the cross-machine queue until it is empty.
    async fn propagate(
        &self,
        registry: &mut Registry,
        event: MachineEvent,
    ) -> Result<(), ManagerError> {
        self.events.push(event);

        while let Some(mut event) = self.events.pop() {
            event.ensure_id();
            if let Err(err) = self.route_event(registry, event).await {
                let dropped = self.events.clear();
                if dropped > 0 {
                    debug!(manager = %self.name, dropped, "discarding rest of failed cascade");
                }
                return Err(err);
            }
        }

        Ok(())
    }

    async fn route_event(
        &self,
        registry: &mut Registry,
        event: MachineEvent,
    ) -> Result<(), ManagerError> {
        let event_id = event.id.clone().unwrap_or_default();
        let Some(target) = event.to_machine.clone() else {
            return Err(ManagerError::MissingRoute { event_id });
        };

        if event.is_reset() {
            let mut fresh = registry.get(&target)?.restart();
            fresh.add_broker(self.broker());
            registry.replace(&target, fresh);
            debug!(manager = %self.name, machine = %target, %event_id, "machine restarted");
            return Ok(());
        }

        match registry.get_mut(&target) {
            Some(machine) => Ok(machine.accept(event).await?),
            None => {
                debug!(
                    manager = %self.name,
                    machine = %target,
                    event = event.name(),
                    %event_id,
                    "cannot route event to unregistered machine, skipping"
                );
                Ok(())
            }
        }
    }

    fn reply<T>(&self, respond: Responder<T>, result: Result<T, ManagerError>) {
        if let Err(err) = &result {
            debug!(manager = %self.name, error = %err, "request failed");
        }
        if respond.send(result).is_err() {
            trace!(manager = %self.name, "caller no longer waiting for result");
        }
    }
}

/// Marks the manager stopped if the drain loop is dropped before finishing
/// (a machine panicked, or the runtime shut down mid-request), so queued and
/// future callers observe [`ManagerError::Stopped`] instead of waiting forever.
struct StopOnAbort<'a> {
    shared: &'a Shared,
    finished: bool,
}

impl StopOnAbort<'_> {
    fn finish(mut self) {
        self.finished = true;
    }
}

impl Drop for StopOnAbort<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }

        let orphaned = {
            let mut api = self.shared.lock_api();
            api.stopped = true;
            api.draining = false;
            std::mem::take(&mut api.requests)
        };
        self.shared.events.clear();
        debug!(
            manager = %self.shared.name,
            orphaned = orphaned.len(),
            "drain loop aborted, manager stopped"
        );
    }
}
