//! Synchronous state machine core.

use tracing::{debug, warn};

use super::error::{IllegalActionError, IllegalActionPolicy};
use super::reducer::Reducer;

/// Holds the current state and applies reductions one at a time.
///
/// This is the single-threaded core; [`MachineRuntime`](super::MachineRuntime)
/// wraps it in a task fed by an action queue.
pub struct StateMachine<R: Reducer> {
    reducer: R,
    state: R::State,
    policy: IllegalActionPolicy,
}

impl<R: Reducer> StateMachine<R> {
    pub fn new(reducer: R, initial: R::State, policy: IllegalActionPolicy) -> Self {
        Self {
            reducer,
            state: initial,
            policy,
        }
    }

    pub fn state(&self) -> &R::State {
        &self.state
    }

    /// Reduce one action, install the new state and return the effects to run.
    ///
    /// Effects are the reducer's own followed by the state-changed effects.
    /// An illegal action leaves the state untouched: under
    /// [`IllegalActionPolicy::Strict`] the error is returned, under
    /// [`IllegalActionPolicy::Report`] the reducer's reporting effect is.
    pub fn handle_action(&mut self, action: R::Action) -> Result<Vec<R::Effect>, IllegalActionError> {
        debug!(?action, "handling action");
        match self.reducer.reduce(&self.state, action) {
            Ok(result) => {
                let mut effects = result.effects;
                if result.state != self.state {
                    effects.extend(self.reducer.on_state_changed(&self.state, &result.state));
                    self.state = result.state;
                }
                Ok(effects)
            }
            Err(error) => match self.policy {
                IllegalActionPolicy::Strict => Err(error),
                IllegalActionPolicy::Report => {
                    warn!(%error, "illegal action ignored");
                    Ok(self.reducer.illegal_action_effect(&error).into_iter().collect())
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mvi::{Action, Effect, MachineState, ReducerResult};

    #[derive(Debug, Clone, PartialEq)]
    enum Light {
        Off,
        On,
    }

    impl MachineState for Light {}

    #[derive(Debug)]
    enum Switch {
        Press,
        Break,
    }

    impl Action for Switch {}

    #[derive(Debug, PartialEq)]
    enum Out {
        Changed,
        Report(String),
    }

    impl Effect for Out {}

    struct LightReducer;

    impl Reducer for LightReducer {
        type State = Light;
        type Action = Switch;
        type Effect = Out;

        fn reduce(
            &self,
            state: &Light,
            action: Switch,
        ) -> Result<ReducerResult<Light, Out>, IllegalActionError> {
            match (state, action) {
                (Light::Off, Switch::Press) => Ok(ReducerResult::new(Light::On)),
                (Light::On, Switch::Press) => Ok(ReducerResult::new(Light::Off)),
                (state, action @ Switch::Break) => Err(IllegalActionError::new(&action, state)),
            }
        }

        fn on_state_changed(&self, _old: &Light, _new: &Light) -> Vec<Out> {
            vec![Out::Changed]
        }

        fn illegal_action_effect(&self, error: &IllegalActionError) -> Option<Out> {
            Some(Out::Report(error.action.clone()))
        }
    }

    #[test]
    fn transition_emits_state_changed_effect() {
        let mut machine = StateMachine::new(LightReducer, Light::Off, IllegalActionPolicy::Strict);
        let effects = machine.handle_action(Switch::Press).unwrap();
        assert_eq!(machine.state(), &Light::On);
        assert_eq!(effects, vec![Out::Changed]);
    }

    #[test]
    fn strict_policy_returns_error_and_keeps_state() {
        let mut machine = StateMachine::new(LightReducer, Light::On, IllegalActionPolicy::Strict);
        let err = machine.handle_action(Switch::Break).unwrap_err();
        assert_eq!(err.action, "Break");
        assert_eq!(machine.state(), &Light::On);
    }

    #[test]
    fn report_policy_emits_reporting_effect() {
        let mut machine = StateMachine::new(LightReducer, Light::On, IllegalActionPolicy::Report);
        let effects = machine.handle_action(Switch::Break).unwrap();
        assert_eq!(effects, vec![Out::Report("Break".to_string())]);
        assert_eq!(machine.state(), &Light::On);
    }
}
