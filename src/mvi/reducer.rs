//! Reducer trait and its result type.

use super::action::Action;
use super::effect::Effect;
use super::error::IllegalActionError;
use super::state::MachineState;

/// New state paired with the effects to run after it is installed.
#[derive(Debug, Clone, PartialEq)]
pub struct ReducerResult<S, E> {
    pub state: S,
    pub effects: Vec<E>,
}

impl<S, E> ReducerResult<S, E> {
    /// Result without effects.
    pub fn new(state: S) -> Self {
        Self {
            state,
            effects: Vec::new(),
        }
    }

    pub fn with_effects(state: S, effects: Vec<E>) -> Self {
        Self { state, effects }
    }

    pub fn with_effect(state: S, effect: E) -> Self {
        Self {
            state,
            effects: vec![effect],
        }
    }

    /// Lift a sub-state result into its parent, keeping the effects.
    pub fn map_state<T>(self, f: impl FnOnce(S) -> T) -> ReducerResult<T, E> {
        ReducerResult {
            state: f(self.state),
            effects: self.effects,
        }
    }

    /// Append effects after the ones already collected.
    pub fn and(mut self, effects: impl IntoIterator<Item = E>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Reducer transforms state based on actions.
///
/// The reducer is the only place where state transitions happen.
/// It must be a pure function: `(State, Action) -> (State, Effects)`.
/// No I/O, no clocks other than the ones injected into `self`.
pub trait Reducer: Send + 'static {
    /// The state type this reducer operates on.
    type State: MachineState;

    /// The action type this reducer handles.
    type Action: Action;

    /// The effect type this reducer emits.
    type Effect: Effect;

    /// Process an action and return the new state with its effects.
    ///
    /// Returns [`IllegalActionError`] when the action is not accepted in
    /// the current state.
    fn reduce(
        &self,
        state: &Self::State,
        action: Self::Action,
    ) -> Result<ReducerResult<Self::State, Self::Effect>, IllegalActionError>;

    /// Effects derived from a state change, appended after the reducer's own.
    fn on_state_changed(&self, _old: &Self::State, _new: &Self::State) -> Vec<Self::Effect> {
        Vec::new()
    }

    /// Effect emitted instead of the transition when an illegal action is
    /// downgraded to a reported no-op.
    fn illegal_action_effect(&self, _error: &IllegalActionError) -> Option<Self::Effect> {
        None
    }
}
