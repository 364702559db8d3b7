//! Sign-in sequencing and sign-out.

use thiserror::Error;

use crate::app::action::AppAction;
use crate::app::effect::{AppEffect, Destination, TimerKey};
use crate::app::model::{LoginRequest, StoredUser};
use crate::app::state::{InitializedState, Tab, UserSession, UserState, ViewState};
use crate::mvi::{IllegalActionError, ReducerResult};

use super::trips::TripsReducer;

/// A second sign-in was requested while one is in flight.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("login already in progress")]
pub struct LoginAlreadyInProgress;

pub struct LoginReducer;

impl LoginReducer {
    pub fn reduce(
        &self,
        action: AppAction,
        state: &InitializedState,
        trips: &TripsReducer,
    ) -> Result<ReducerResult<InitializedState, AppEffect>, IllegalActionError> {
        match action {
            AppAction::InitiateLogin(request) => Ok(self.initiate(state.clone(), request)),

            AppAction::LoginSucceeded(session) if state.login_in_progress => {
                let stored = StoredUser::from(session.clone());
                let session = UserSession::new(session);
                let effects = vec![
                    AppEffect::PersistUser(stored),
                    AppEffect::Navigate(Destination::Tabs(Tab::Map)),
                    trips.start_refresh(),
                    trips.load(&session),
                ];
                let next = InitializedState {
                    user: UserState::LoggedIn(Box::new(session)),
                    view: ViewState::Tabs(Tab::Map),
                    show_progressbar: false,
                    login_in_progress: false,
                    ..state.clone()
                };
                Ok(ReducerResult::with_effects(next, effects))
            }

            AppAction::LoginFailed { error } if state.login_in_progress => {
                let mut next = InitializedState {
                    show_progressbar: false,
                    login_in_progress: false,
                    ..state.clone()
                };
                let mut effects = vec![AppEffect::ShowError(error)];
                if next.view == ViewState::Splash {
                    next.view = ViewState::SignIn;
                    effects.push(AppEffect::Navigate(Destination::SignIn));
                }
                Ok(ReducerResult::with_effects(next, effects))
            }

            AppAction::SignOut => match &state.user {
                UserState::LoggedIn(session) => {
                    let effects = vec![
                        AppEffect::CancelTimer(TimerKey::TripsRefresh),
                        AppEffect::SetTracking {
                            device_id: session.device_id.clone(),
                            enabled: false,
                        },
                        AppEffect::ClearStoredUser,
                        AppEffect::Navigate(Destination::SignIn),
                    ];
                    let next = InitializedState {
                        user: UserState::NotLoggedIn,
                        view: ViewState::SignIn,
                        ..state.clone()
                    };
                    Ok(ReducerResult::with_effects(next, effects))
                }
                UserState::NotLoggedIn => Err(IllegalActionError::new(&AppAction::SignOut, state)),
            },

            other => Err(IllegalActionError::new(&other, state)),
        }
    }

    /// Start a sign-in unless one is already running.
    pub fn initiate(
        &self,
        state: InitializedState,
        request: LoginRequest,
    ) -> ReducerResult<InitializedState, AppEffect> {
        if state.login_in_progress {
            return ReducerResult::with_effect(
                state,
                AppEffect::ReportError(LoginAlreadyInProgress.to_string()),
            );
        }
        let next = InitializedState {
            show_progressbar: true,
            login_in_progress: true,
            ..state
        };
        ReducerResult::with_effect(next, AppEffect::Login(request))
    }
}
