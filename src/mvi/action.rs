//! Base trait for actions.

use std::fmt::Debug;

/// Marker trait for action objects.
///
/// Actions represent:
/// - User actions (sign in, tab selection)
/// - System events (API responses, push notifications)
/// - Timer expirations
///
/// Actions are processed by reducers to produce new states. `Debug` is
/// required so every dispatched action can be logged.
pub trait Action: Debug + Send + 'static {}
