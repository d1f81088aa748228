//! Core State trait for controller states.
//!
//! Operating levels implement this trait, which provides pure methods for
//! inspecting state properties without side effects.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Trait for state machine states.
///
/// All methods are pure - no side effects. States represent immutable
/// values that describe the current position in a state machine.
///
/// # Required Traits
///
/// - `Clone`: States are copied into transition records
/// - `PartialEq`: States must be comparable for transition logic
/// - `Debug`: States must be debuggable for diagnostics
/// - `Serialize` + `Deserialize`: States must be serializable for persistence
///
/// # Example
///
/// ```rust
/// use tierguard::core::{Level, State};
///
/// assert_eq!(Level::Limited.name(), "Limited");
/// assert!(!Level::Minimal.is_final());
/// assert!(Level::Minimal.is_error());
/// ```
pub trait State:
    Clone + PartialEq + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync
{
    /// Get the state's name for display/logging.
    fn name(&self) -> &str;

    /// Check if this is a final (terminal) state.
    ///
    /// Default implementation returns `false`.
    fn is_final(&self) -> bool {
        false
    }

    /// Check if this is an error state.
    ///
    /// Default implementation returns `false`.
    fn is_error(&self) -> bool {
        false
    }
}
