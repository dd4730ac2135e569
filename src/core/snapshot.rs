//! Type-erased view of a machine's state and context.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A machine's state name plus its context, as returned to manager callers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub state: String,
    pub context: Value,
}

impl StateSnapshot {
    pub fn new(state: impl Into<String>, context: Value) -> Self {
        Self {
            state: state.into(),
            context,
        }
    }

    /// Decode the context back into the machine's concrete context type.
    ///
    /// # Example
    ///
    /// ```rust
    /// use machinist::core::StateSnapshot;
    /// use serde::Deserialize;
    /// use serde_json::json;
    ///
    /// #[derive(Deserialize, PartialEq, Debug)]
    /// struct Attempts {
    ///     count: u32,
    /// }
    ///
    /// let snapshot = StateSnapshot::new("Retrying", json!({ "count": 2 }));
    /// let attempts: Attempts = snapshot.context_as().unwrap();
    /// assert_eq!(attempts, Attempts { count: 2 });
    /// ```
    pub fn context_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.context)
    }

    pub fn is(&self, state: &str) -> bool {
        self.state == state
    }
}
