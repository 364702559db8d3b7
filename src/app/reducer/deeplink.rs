//! Pending deep link storage and the race against the check timeout.

use crate::app::action::AppAction;
use crate::app::deeplink::DeeplinkResult;
use crate::app::effect::{AppEffect, TimerKey};
use crate::app::state::DeeplinkState;
use crate::mvi::{IllegalActionError, ReducerResult};

pub struct DeeplinkReducer;

impl DeeplinkReducer {
    /// `accepts_late_link` holds only while nobody is signed in and no login
    /// is running. It is always false before the app is initialized.
    ///
    /// Whichever of `DeeplinkChecked` and `DeeplinkCheckTimeout` arrives
    /// first while `Checking` decides the result; the loser is a no-op.
    pub fn reduce(
        &self,
        action: AppAction,
        accepts_late_link: bool,
        state: &DeeplinkState,
    ) -> Result<ReducerResult<DeeplinkState, AppEffect>, IllegalActionError> {
        match action {
            AppAction::DeeplinkChecked(result) => Ok(self.checked(result, accepts_late_link, state)),
            AppAction::DeeplinkCheckTimeout => Ok(match state {
                DeeplinkState::Checking => {
                    ReducerResult::new(DeeplinkState::Resolved(DeeplinkResult::NoDeeplink))
                }
                other => ReducerResult::new(other.clone()),
            }),
            other => Err(IllegalActionError::new(&other, state)),
        }
    }

    fn checked(
        &self,
        result: DeeplinkResult,
        accepts_late_link: bool,
        state: &DeeplinkState,
    ) -> ReducerResult<DeeplinkState, AppEffect> {
        match state {
            DeeplinkState::Checking => ReducerResult::with_effect(
                DeeplinkState::Resolved(result),
                AppEffect::CancelTimer(TimerKey::DeeplinkCheck),
            ),
            // A link opened later only counts while nobody is signed in or signing in.
            _ => match result {
                DeeplinkResult::Params(params) if accepts_late_link => {
                    ReducerResult::new(DeeplinkState::Resolved(DeeplinkResult::Params(params)))
                }
                _ => ReducerResult::new(state.clone()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_while_checking_resolves_to_no_deeplink() {
        let result = DeeplinkReducer
            .reduce(AppAction::DeeplinkCheckTimeout, false, &DeeplinkState::Checking)
            .unwrap();
        assert_eq!(result.state, DeeplinkState::Resolved(DeeplinkResult::NoDeeplink));
        assert!(result.effects.is_empty());
    }

    #[test]
    fn result_while_checking_cancels_timer() {
        let result = DeeplinkReducer
            .reduce(
                AppAction::DeeplinkChecked(DeeplinkResult::NoDeeplink),
                false,
                &DeeplinkState::Checking,
            )
            .unwrap();
        assert_eq!(result.effects, vec![AppEffect::CancelTimer(TimerKey::DeeplinkCheck)]);
    }

    #[test]
    fn late_error_result_is_ignored() {
        let resolved = DeeplinkState::Resolved(DeeplinkResult::NoDeeplink);
        let late = DeeplinkResult::Error("late".into());
        let result = DeeplinkReducer
            .reduce(
                AppAction::DeeplinkChecked(late),
                true,
                &resolved,
            )
            .unwrap();
        assert_eq!(result.state, resolved);
    }

    #[test]
    fn late_params_are_dropped_unless_accepted() {
        let resolved = DeeplinkState::Resolved(DeeplinkResult::NoDeeplink);
        let late = || {
            DeeplinkResult::from_url("https://visits.example/?publishable_key=pk&email=a@b.c")
        };
        let refused = DeeplinkReducer
            .reduce(AppAction::DeeplinkChecked(late()), false, &resolved)
            .unwrap();
        assert_eq!(refused.state, resolved);
        assert!(refused.effects.is_empty());

        let accepted = DeeplinkReducer
            .reduce(AppAction::DeeplinkChecked(late()), true, &resolved)
            .unwrap();
        assert!(matches!(
            accepted.state,
            DeeplinkState::Resolved(DeeplinkResult::Params(_))
        ));
    }

    #[test]
    fn other_actions_are_illegal() {
        assert!(DeeplinkReducer
            .reduce(AppAction::SignOut, false, &DeeplinkState::Checking)
            .is_err());
    }
}
