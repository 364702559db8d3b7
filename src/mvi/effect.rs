//! Effects and their interpreter.

use std::fmt::Debug;

use async_trait::async_trait;

use super::action::Action;
use super::runtime::ActionSender;

/// Marker trait for effect objects.
///
/// An effect describes a side effect (navigation, HTTP call, timer) without
/// performing it. Reducers return effects; only an [`EffectHandler`] runs them.
pub trait Effect: Debug + Send + 'static {}

/// Executes effects produced by a reducer.
///
/// Handlers never mutate machine state. Results flow back by dispatching new
/// actions through the provided [`ActionSender`].
#[async_trait]
pub trait EffectHandler: Send + Sync + 'static {
    type Action: Action;
    type Effect: Effect;

    async fn apply(&self, effect: Self::Effect, dispatcher: &ActionSender<Self::Action>);
}
