//! Events routed between machines.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Identifier attached to every event once it enters a manager's
/// cross-machine queue.
pub type EventId = String;

/// What an event asks the addressed machine to do.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum EventKind {
    /// Replace the addressed machine with a freshly restarted instance.
    /// Handled by the manager; never delivered to `accept`.
    Reset,

    /// An ordinary event, matched by name against a transition table.
    Named(String),
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reset => f.write_str("reset"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

/// An event addressed to a machine by name.
///
/// # Example
///
/// ```rust
/// use machinist::core::MachineEvent;
/// use serde_json::json;
///
/// let event = MachineEvent::new("signIn", "submit")
///     .with_payload(json!({ "username": "ada" }));
///
/// assert_eq!(event.name(), "submit");
/// assert_eq!(event.to_machine.as_deref(), Some("signIn"));
/// assert!(event.id.is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MachineEvent {
    /// Assigned on entry to the cross-machine queue when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EventId>,

    /// Routing key. Events without one fail routing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_machine: Option<String>,

    pub kind: EventKind,

    #[serde(default)]
    pub payload: Value,
}

impl MachineEvent {
    /// Named event addressed to `to_machine`, with a null payload.
    pub fn new(to_machine: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: None,
            to_machine: Some(to_machine.into()),
            kind: EventKind::Named(name.into()),
            payload: Value::Null,
        }
    }

    /// Named event with no routing key.
    ///
    /// Machines emitting one of these get it addressed back to themselves;
    /// sent straight to a manager it fails with a missing-route error.
    pub fn unrouted(name: impl Into<String>) -> Self {
        Self {
            id: None,
            to_machine: None,
            kind: EventKind::Named(name.into()),
            payload: Value::Null,
        }
    }

    /// Reset event for `to_machine`.
    pub fn reset(to_machine: impl Into<String>) -> Self {
        Self {
            id: None,
            to_machine: Some(to_machine.into()),
            kind: EventKind::Reset,
            payload: Value::Null,
        }
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }

    pub fn with_id(mut self, id: impl Into<EventId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn to(mut self, machine: impl Into<String>) -> Self {
        self.to_machine = Some(machine.into());
        self
    }

    /// Event name for matching and diagnostics. Reset events report `"reset"`.
    pub fn name(&self) -> &str {
        match &self.kind {
            EventKind::Reset => "reset",
            EventKind::Named(name) => name,
        }
    }

    pub fn is_reset(&self) -> bool {
        matches!(self.kind, EventKind::Reset)
    }

    /// Return the event id, generating a v4 UUID if none was assigned.
    pub fn ensure_id(&mut self) -> &str {
        self.id.get_or_insert_with(|| Uuid::new_v4().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ensure_id_generates_once() {
        let mut event = MachineEvent::new("tokens", "store");
        let first = event.ensure_id().to_string();
        let second = event.ensure_id().to_string();

        assert_eq!(first, second);
        assert!(Uuid::parse_str(&first).is_ok());
    }

    #[test]
    fn ensure_id_keeps_preassigned_id() {
        let mut event = MachineEvent::new("tokens", "store").with_id("evt-1");
        assert_eq!(event.ensure_id(), "evt-1");
    }

    #[test]
    fn reset_is_distinct_from_a_named_reset() {
        let reset = MachineEvent::reset("signIn");
        let named = MachineEvent::new("signIn", "reset");

        assert!(reset.is_reset());
        assert!(!named.is_reset());
        assert_eq!(reset.name(), named.name());
        assert_ne!(reset, named);
    }

    #[test]
    fn unrouted_event_can_be_addressed_later() {
        let event = MachineEvent::unrouted("retry");
        assert!(event.to_machine.is_none());

        let event = event.to("signIn");
        assert_eq!(event.to_machine.as_deref(), Some("signIn"));
    }

    #[test]
    fn event_serializes_with_tagged_kind() {
        let event = MachineEvent::new("signIn", "submit").with_payload(json!({ "user": "ada" }));
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(
            value,
            json!({
                "to_machine": "signIn",
                "kind": { "kind": "named", "name": "submit" },
                "payload": { "user": "ada" },
            })
        );

        let back: MachineEvent = serde_json::from_value(value).unwrap();
        assert_eq!(back, event);
    }
}
