//! Base trait for machine state.

use std::fmt::Debug;

/// Marker trait for state objects.
///
/// States should be:
/// - Immutable (Clone to create new states)
/// - Self-contained (everything observers need)
/// - Comparable (PartialEq for detecting changes)
pub trait MachineState: Clone + PartialEq + Debug + Send + Sync + 'static {}
