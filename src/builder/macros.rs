//! Macros for ergonomic machine definitions.

/// Generate a `State` implementation for a plain enum.
///
/// The optional `initial:` clause also derives `Default`, which pairs with
/// [`StateMachineBuilder::initial`](crate::builder::StateMachineBuilder::initial)
/// when several machines share a state type.
///
/// # Example
///
/// ```
/// use machinist::core::State;
/// use machinist::state_enum;
///
/// state_enum! {
///     pub enum SignUp {
///         Idle,
///         Confirming,
///         Confirmed,
///         Failed,
///     }
///     initial: Idle
///     final: [Confirmed, Failed]
/// }
///
/// assert_eq!(SignUp::default(), SignUp::Idle);
/// assert!(SignUp::Failed.is_final());
/// assert_eq!(SignUp::Confirming.name(), "Confirming");
/// ```
#[macro_export]
macro_rules! state_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }

        $(initial: $initial:ident)?
        $(final: [$($final:ident),* $(,)?])?
    ) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::State for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }

            #[allow(unreachable_patterns)]
            fn is_final(&self) -> bool {
                match self {
                    $($(Self::$final => true,)*)?
                    _ => false,
                }
            }
        }

        $(
            impl ::std::default::Default for $name {
                fn default() -> Self {
                    Self::$initial
                }
            }
        )?
    };
}
