//! State and context traits for typed machines.
//!
//! Typed machines keep their state as a Rust enum and their context as an
//! arbitrary serializable value. The manager only ever sees both through a
//! [`StateSnapshot`](super::StateSnapshot), so these traits carry the bounds
//! needed to erase them.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Trait for state machine states.
///
/// # Example
///
/// ```rust
/// use machinist::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum SignInState {
///     Idle,
///     SigningIn,
///     SignedIn,
/// }
///
/// impl State for SignInState {
///     fn name(&self) -> &str {
///         match self {
///             Self::Idle => "Idle",
///             Self::SigningIn => "SigningIn",
///             Self::SignedIn => "SignedIn",
///         }
///     }
///
///     fn is_final(&self) -> bool {
///         matches!(self, Self::SignedIn)
///     }
/// }
///
/// assert_eq!(SignInState::SigningIn.name(), "SigningIn");
/// ```
pub trait State:
    Clone + PartialEq + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync + 'static
{
    /// Name reported in snapshots, listener updates and diagnostics.
    fn name(&self) -> &str;

    /// Whether the machine expects no further transitions from here.
    ///
    /// Default implementation returns `false`.
    fn is_final(&self) -> bool {
        false
    }
}

/// Context carried alongside a machine's state.
///
/// Blanket-implemented for every cloneable, serializable, thread-safe type,
/// so plain `#[derive(Clone, Debug, Serialize)]` structs qualify.
pub trait MachineContext: Clone + Debug + Serialize + Send + Sync + 'static {}

impl<T> MachineContext for T where T: Clone + Debug + Serialize + Send + Sync + 'static {}
