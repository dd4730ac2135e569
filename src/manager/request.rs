//! Internal request protocol between `MachineManager` handles and the
//! drain loop. Not exposed outside the manager module.

use crate::core::{MachineEvent, StateSnapshot};
use crate::machine::{Machine, TransitionListener};
use crate::manager::error::ManagerError;
use std::future::Future;
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use tokio::sync::oneshot;

pub(super) type Responder<T> = oneshot::Sender<Result<T, ManagerError>>;

/// One caller-issued operation waiting in the API queue.
pub(super) enum InternalRequest {
    /// Occupies a queue slot so the snapshot reflects everything queued before it
    QueryCurrentState {
        machine: String,
        respond: Responder<StateSnapshot>,
    },
    AddMachine {
        machine: Box<dyn Machine>,
        respond: Responder<StateSnapshot>,
    },
    AddListener {
        machine: String,
        listener: TransitionListener,
        respond: Responder<()>,
    },
    ResetMachine {
        machine: String,
        respond: Responder<StateSnapshot>,
    },
    SendEvent {
        event: MachineEvent,
        respond: Responder<StateSnapshot>,
    },
    ListMachines {
        respond: Responder<Vec<String>>,
    },
}

impl InternalRequest {
    pub(super) fn kind(&self) -> &'static str {
        match self {
            Self::QueryCurrentState { .. } => "query_current_state",
            Self::AddMachine { .. } => "add_machine",
            Self::AddListener { .. } => "add_listener",
            Self::ResetMachine { .. } => "reset_machine",
            Self::SendEvent { .. } => "send_event",
            Self::ListMachines { .. } => "list_machines",
        }
    }
}

/// Result of a queued manager request.
///
/// The request is already in the queue by the time this is returned; awaiting
/// it only waits for the drain loop to reach it. Dropping it does not cancel
/// the request.
pub struct Pending<T> {
    manager: String,
    receiver: oneshot::Receiver<Result<T, ManagerError>>,
}

impl<T> Pending<T> {
    pub(super) fn new(manager: String) -> (Responder<T>, Self) {
        let (respond, receiver) = oneshot::channel();
        (respond, Self { manager, receiver })
    }
}

impl<T> Future for Pending<T> {
    type Output = Result<T, ManagerError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let received = ready!(Pin::new(&mut self.receiver).poll(cx));
        Poll::Ready(received.unwrap_or_else(|_| {
            Err(ManagerError::Stopped {
                manager: self.manager.clone(),
            })
        }))
    }
}
