//! Everything that can happen to the app becomes an [`AppAction`].

use chrono::NaiveDate;

use super::deeplink::DeeplinkResult;
use super::model::{History, LoginRequest, PushMessage, Session, StoredUser, TrackingState, TripSummary};
use super::state::Tab;
use crate::mvi::Action;

#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    // Initialization
    /// Process started; carries the session restored from storage, if any.
    AppCreated { stored_user: Option<StoredUser> },
    SplashScreenShown,
    DeeplinkChecked(DeeplinkResult),
    DeeplinkCheckTimeout,

    // Login
    InitiateLogin(LoginRequest),
    LoginSucceeded(Session),
    LoginFailed { error: String },
    SignOut,

    // Tracking
    SetTracking(bool),
    TrackingStateChanged(TrackingState),

    // History
    LoadHistory { day: NaiveDate },
    HistoryLoaded { day: NaiveDate, result: Result<History, String> },

    // Trips
    RefreshTrips,
    TripsRefreshTick,
    TripsLoaded { result: Result<Vec<TripSummary>, String> },

    // Push notifications
    PushReceived(PushMessage),
    PushPermission(bool),

    // Navigation
    SelectTab(Tab),
}

impl Action for AppAction {}
