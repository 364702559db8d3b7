//! App reducer composition.
//!
//! [`AppReducer`] routes each action by state and action shape to a
//! sub-reducer, merges the returned sub-state back into the tree and
//! concatenates effects in the order the sub-reducers produced them.
//!
//! - `deeplink.rs` - pending deep link and its check timeout
//! - `login.rs` - sign-in guard, success/failure, sign-out
//! - `history.rs` - per-day history cache
//! - `tracking.rs` - tracking toggles and SDK state
//! - `trips.rs` - trip list refreshes

mod deeplink;
mod history;
mod login;
mod tracking;
mod trips;

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

pub use deeplink::DeeplinkReducer;
pub use history::HistoryReducer;
pub use login::{LoginAlreadyInProgress, LoginReducer};
pub use tracking::{TrackingReducer, PERMISSIONS_DENIED_MESSAGE};
pub use trips::TripsReducer;

use super::action::AppAction;
use super::clock::Clock;
use super::deeplink::DeeplinkResult;
use super::effect::{AppEffect, Destination, TimerKey};
use super::model::{LoginRequest, PushMessage, Session};
use super::state::{
    AppState, DeeplinkState, InitializedState, NotInitializedState, Tab, UserSession, UserState,
    ViewState,
};
use crate::mvi::{IllegalActionError, Reducer, ReducerResult};

/// Timing knobs the reducer needs. Built from the loaded configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReducerConfig {
    pub deeplink_timeout: Duration,
    pub trips_refresh_interval: Duration,
    pub history_ttl: Duration,
}

impl Default for ReducerConfig {
    fn default() -> Self {
        Self {
            deeplink_timeout: Duration::from_millis(3000),
            trips_refresh_interval: Duration::from_secs(60),
            history_ttl: Duration::from_secs(60),
        }
    }
}

type AppResult = Result<ReducerResult<AppState, AppEffect>, IllegalActionError>;
type InitializedResult = ReducerResult<InitializedState, AppEffect>;

pub struct AppReducer {
    config: ReducerConfig,
    clock: Arc<dyn Clock>,
    deeplink: DeeplinkReducer,
    login: LoginReducer,
    history: HistoryReducer,
    tracking: TrackingReducer,
    trips: TripsReducer,
}

impl AppReducer {
    pub fn new(config: ReducerConfig, clock: Arc<dyn Clock>) -> Self {
        let ttl = chrono::Duration::from_std(config.history_ttl).unwrap_or_else(|_| chrono::Duration::weeks(52));
        Self {
            config,
            clock: Arc::clone(&clock),
            deeplink: DeeplinkReducer,
            login: LoginReducer,
            history: HistoryReducer::new(clock, ttl),
            tracking: TrackingReducer,
            trips: TripsReducer::new(config.trips_refresh_interval),
        }
    }

    fn reduce_not_initialized(&self, state: &NotInitializedState, action: AppAction) -> AppResult {
        match action {
            AppAction::AppCreated { stored_user } => {
                let user = match stored_user {
                    Some(stored) => {
                        info!(device_id = %stored.device_id, "restored signed-in user");
                        UserState::LoggedIn(Box::new(UserSession::new(Session::from(stored))))
                    }
                    None => UserState::NotLoggedIn,
                };
                let initialized = InitializedState {
                    user,
                    view: ViewState::Splash,
                    deeplink: state.deeplink.clone(),
                    splash_shown: state.splash_shown,
                    show_progressbar: false,
                    login_in_progress: false,
                    push_enabled: true,
                };
                let mut effects = Vec::new();
                if initialized.deeplink.is_checking() {
                    effects.push(AppEffect::StartTimer {
                        key: TimerKey::DeeplinkCheck,
                        after: self.config.deeplink_timeout,
                    });
                }
                let resolved = self.resolve_pending_deeplink(initialized);
                effects.extend(resolved.effects);
                Ok(ReducerResult::with_effects(
                    AppState::Initialized(resolved.state),
                    effects,
                ))
            }
            AppAction::SplashScreenShown => Ok(ReducerResult::new(AppState::NotInitialized(
                NotInitializedState {
                    splash_shown: true,
                    ..state.clone()
                },
            ))),
            action @ (AppAction::DeeplinkChecked(_) | AppAction::DeeplinkCheckTimeout) => {
                let result = self.deeplink.reduce(action, false, &state.deeplink)?;
                Ok(result.map_state(|deeplink| {
                    AppState::NotInitialized(NotInitializedState {
                        deeplink,
                        ..state.clone()
                    })
                }))
            }
            other => Err(IllegalActionError::new(&other, state)),
        }
    }

    fn reduce_initialized(&self, state: &InitializedState, action: AppAction) -> AppResult {
        let result = match action {
            AppAction::SplashScreenShown => {
                let next = InitializedState {
                    splash_shown: true,
                    ..state.clone()
                };
                self.resolve_pending_deeplink(next)
            }

            action @ (AppAction::DeeplinkChecked(_) | AppAction::DeeplinkCheckTimeout) => {
                let accepts_late_link =
                    matches!(state.user, UserState::NotLoggedIn) && !state.login_in_progress;
                let result = self.deeplink.reduce(action, accepts_late_link, &state.deeplink)?;
                let next = InitializedState {
                    deeplink: result.state,
                    ..state.clone()
                };
                let resolved = self.resolve_pending_deeplink(next);
                ReducerResult::with_effects(resolved.state, result.effects).and(resolved.effects)
            }

            action @ (AppAction::InitiateLogin(_)
            | AppAction::LoginSucceeded(_)
            | AppAction::LoginFailed { .. }
            | AppAction::SignOut) => self.login.reduce(action, state, &self.trips)?,

            action @ (AppAction::SetTracking(_) | AppAction::TrackingStateChanged(_)) => {
                if matches!(action, AppAction::TrackingStateChanged(_))
                    && !state.user.is_logged_in()
                {
                    // Sign-out stops tracking after the session is gone.
                    debug!(?action, "dropping tracking state for signed-out user");
                    return Ok(ReducerResult::new(AppState::Initialized(state.clone())));
                }
                self.with_session(state, action, |session, action| {
                    self.tracking.reduce(action, session)
                })?
            }

            action @ (AppAction::LoadHistory { .. } | AppAction::HistoryLoaded { .. }) => {
                if matches!(action, AppAction::HistoryLoaded { .. }) && !state.user.is_logged_in() {
                    debug!("dropping history result for signed-out user");
                    return Ok(ReducerResult::new(AppState::Initialized(state.clone())));
                }
                self.with_session(state, action, |session, action| {
                    let result = self.history.reduce(action, session, &session.history)?;
                    Ok(result.map_state(|history| UserSession {
                        history,
                        ..session.clone()
                    }))
                })?
            }

            action @ (AppAction::RefreshTrips
            | AppAction::TripsRefreshTick
            | AppAction::TripsLoaded { .. }) => {
                if !matches!(action, AppAction::RefreshTrips) && !state.user.is_logged_in() {
                    // Timer ticks and responses can outlive a sign-out.
                    debug!(?action, "dropping trips action for signed-out user");
                    return Ok(ReducerResult::new(AppState::Initialized(state.clone())));
                }
                self.with_session(state, action, |session, action| {
                    self.trips.reduce(action, session)
                })?
            }

            AppAction::PushReceived(message) => self.push_received(state, message),

            AppAction::PushPermission(enabled) => ReducerResult::new(InitializedState {
                push_enabled: enabled,
                ..state.clone()
            }),

            AppAction::SelectTab(tab) => self.select_tab(state, tab)?,

            other @ AppAction::AppCreated { .. } => {
                return Err(IllegalActionError::new(&other, state));
            }
        };
        Ok(result.map_state(AppState::Initialized))
    }

    /// Run `f` against the signed-in user's scope and merge it back.
    fn with_session(
        &self,
        state: &InitializedState,
        action: AppAction,
        f: impl FnOnce(
            &UserSession,
            AppAction,
        ) -> Result<ReducerResult<UserSession, AppEffect>, IllegalActionError>,
    ) -> Result<InitializedResult, IllegalActionError> {
        match &state.user {
            UserState::LoggedIn(session) => {
                let result = f(session, action)?;
                Ok(result.map_state(|session| InitializedState {
                    user: UserState::LoggedIn(Box::new(session)),
                    ..state.clone()
                }))
            }
            UserState::NotLoggedIn => Err(IllegalActionError::new(&action, state)),
        }
    }

    /// Leave the splash screen once it was shown and the deep link check
    /// finished, or act on a link that arrived on the sign-in screen.
    fn resolve_pending_deeplink(&self, state: InitializedState) -> InitializedResult {
        match (&state.view, &state.deeplink) {
            (ViewState::Splash, DeeplinkState::Resolved(result)) if state.splash_shown => {
                let result = result.clone();
                let state = InitializedState {
                    deeplink: DeeplinkState::Consumed,
                    ..state
                };
                match result {
                    DeeplinkResult::Params(params) => {
                        info!("signing in from deep link");
                        self.login.initiate(state, LoginRequest::Deeplink(params))
                    }
                    DeeplinkResult::Error(error) => {
                        let landed = self.land(state);
                        ReducerResult::with_effect(landed.state, AppEffect::ShowError(error))
                            .and(landed.effects)
                    }
                    DeeplinkResult::NoDeeplink => self.land(state),
                }
            }
            (ViewState::SignIn, DeeplinkState::Resolved(DeeplinkResult::Params(params))) => {
                let request = LoginRequest::Deeplink(params.clone());
                let state = InitializedState {
                    deeplink: DeeplinkState::Consumed,
                    ..state
                };
                self.login.initiate(state, request)
            }
            _ => ReducerResult::new(state),
        }
    }

    /// First screen after the splash without a deep link.
    fn land(&self, state: InitializedState) -> InitializedResult {
        match &state.user {
            UserState::LoggedIn(session) => {
                let effects = vec![
                    AppEffect::Navigate(Destination::Tabs(Tab::Map)),
                    self.trips.start_refresh(),
                    self.trips.load(session),
                ];
                let next = InitializedState {
                    view: ViewState::Tabs(Tab::Map),
                    ..state
                };
                ReducerResult::with_effects(next, effects)
            }
            UserState::NotLoggedIn => ReducerResult::with_effect(
                InitializedState {
                    view: ViewState::SignIn,
                    ..state
                },
                AppEffect::Navigate(Destination::SignIn),
            ),
        }
    }

    fn push_received(&self, state: &InitializedState, message: PushMessage) -> InitializedResult {
        let Some(session) = state.user.session() else {
            return ReducerResult::with_effect(
                state.clone(),
                AppEffect::ReportError("push notification received while signed out".to_string()),
            );
        };
        let mut effects = Vec::new();
        let (title, body, refresh) = match message {
            PushMessage::TripUpdate { title, body } => (title, body, true),
            PushMessage::Message { title, body } => (title, body, false),
        };
        if state.push_enabled {
            effects.push(AppEffect::Notify { title, body });
        }
        if refresh {
            effects.push(self.trips.load(session));
        }
        ReducerResult::with_effects(state.clone(), effects)
    }

    fn select_tab(
        &self,
        state: &InitializedState,
        tab: Tab,
    ) -> Result<InitializedResult, IllegalActionError> {
        if !matches!(state.view, ViewState::Tabs(_)) {
            return Err(IllegalActionError::new(&AppAction::SelectTab(tab), state));
        }
        let next = InitializedState {
            view: ViewState::Tabs(tab),
            ..state.clone()
        };
        if tab != Tab::History {
            return Ok(ReducerResult::new(next));
        }
        let today = self.clock.today();
        self.with_session(&next, AppAction::LoadHistory { day: today }, |session, action| {
            let result = self.history.reduce(action, session, &session.history)?;
            Ok(result.map_state(|history| UserSession {
                history,
                ..session.clone()
            }))
        })
    }
}

impl Reducer for AppReducer {
    type State = AppState;
    type Action = AppAction;
    type Effect = AppEffect;

    fn reduce(&self, state: &AppState, action: AppAction) -> AppResult {
        match state {
            AppState::NotInitialized(state) => self.reduce_not_initialized(state, action),
            AppState::Initialized(state) => self.reduce_initialized(state, action),
        }
    }

    /// Re-render whenever the screen or the progress indicator changes.
    fn on_state_changed(&self, old: &AppState, new: &AppState) -> Vec<AppEffect> {
        let AppState::Initialized(new) = new else {
            return Vec::new();
        };
        let changed = match old {
            AppState::Initialized(old) => {
                old.view != new.view || old.show_progressbar != new.show_progressbar
            }
            AppState::NotInitialized(_) => true,
        };
        if changed {
            vec![AppEffect::Render(new.snapshot())]
        } else {
            Vec::new()
        }
    }

    fn illegal_action_effect(&self, error: &IllegalActionError) -> Option<AppEffect> {
        Some(AppEffect::ReportError(error.to_string()))
    }
}
