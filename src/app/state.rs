//! Application state tree.
//!
//! ```text
//! AppState
//! ├── NotInitialized { splash_shown, deeplink }
//! └── Initialized
//!     ├── user: UserState
//!     │   ├── NotLoggedIn
//!     │   └── LoggedIn(UserSession)      // per-user scope
//!     │       ├── device_id, publishable_key, user_data
//!     │       ├── tracking: TrackingState
//!     │       ├── history: day → LoadingState<History>
//!     │       └── trips: Vec<TripSummary>
//!     ├── view: ViewState                // Splash | SignIn | Tabs(tab)
//!     ├── deeplink: DeeplinkState
//!     └── splash_shown, show_progressbar, login_in_progress, push_enabled
//! ```
//!
//! State changes only happen through the app reducer.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::deeplink::DeeplinkResult;
use super::model::{
    DeviceId, History, LoadingState, PublishableKey, Session, TrackingState, TripSummary,
    UserData,
};
use crate::mvi::MachineState;

pub type HistoryCache = BTreeMap<NaiveDate, LoadingState<History>>;

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    NotInitialized(NotInitializedState),
    Initialized(InitializedState),
}

impl Default for AppState {
    fn default() -> Self {
        AppState::NotInitialized(NotInitializedState::default())
    }
}

impl MachineState for AppState {}

impl AppState {
    pub fn is_initialized(&self) -> bool {
        matches!(self, AppState::Initialized(_))
    }

    pub fn view(&self) -> Option<&ViewState> {
        match self {
            AppState::Initialized(state) => Some(&state.view),
            AppState::NotInitialized(_) => None,
        }
    }

    pub fn session(&self) -> Option<&UserSession> {
        match self {
            AppState::Initialized(state) => state.user.session(),
            AppState::NotInitialized(_) => None,
        }
    }

    pub fn deeplink(&self) -> &DeeplinkState {
        match self {
            AppState::NotInitialized(state) => &state.deeplink,
            AppState::Initialized(state) => &state.deeplink,
        }
    }
}

/// Before the app finished starting. Deep link results may already arrive here.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NotInitializedState {
    pub splash_shown: bool,
    pub deeplink: DeeplinkState,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InitializedState {
    pub user: UserState,
    pub view: ViewState,
    pub deeplink: DeeplinkState,
    pub splash_shown: bool,
    pub show_progressbar: bool,
    /// Guard against concurrent sign-in attempts.
    pub login_in_progress: bool,
    pub push_enabled: bool,
}

impl InitializedState {
    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            view: self.view,
            show_progressbar: self.show_progressbar,
            user: self
                .user
                .session()
                .and_then(|s| s.user_data.display_id().map(str::to_string)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UserState {
    NotLoggedIn,
    LoggedIn(Box<UserSession>),
}

impl UserState {
    pub fn session(&self) -> Option<&UserSession> {
        match self {
            UserState::LoggedIn(session) => Some(session),
            UserState::NotLoggedIn => None,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self, UserState::LoggedIn(_))
    }
}

/// Everything that lives exactly as long as a signed-in user.
#[derive(Debug, Clone, PartialEq)]
pub struct UserSession {
    pub device_id: DeviceId,
    pub publishable_key: PublishableKey,
    pub user_data: UserData,
    pub tracking: TrackingState,
    pub history: HistoryCache,
    pub trips: Vec<TripSummary>,
}

impl UserSession {
    pub fn new(session: Session) -> Self {
        Self {
            device_id: session.device_id,
            publishable_key: session.publishable_key,
            user_data: session.user_data,
            tracking: TrackingState::Unknown,
            history: HistoryCache::new(),
            trips: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Splash,
    SignIn,
    Tabs(Tab),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Map,
    Orders,
    History,
    Profile,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DeeplinkState {
    /// Launch-time check still running.
    #[default]
    Checking,
    Resolved(DeeplinkResult),
    /// The resolved link was acted upon.
    Consumed,
}

impl DeeplinkState {
    pub fn is_checking(&self) -> bool {
        matches!(self, DeeplinkState::Checking)
    }
}

/// What the presentation layer needs to draw the current screen.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSnapshot {
    pub view: ViewState,
    pub show_progressbar: bool,
    pub user: Option<String>,
}
