//! Side effects requested by the app reducer.

use std::time::Duration;

use chrono::NaiveDate;

use super::action::AppAction;
use super::model::{DeviceId, LoginRequest, PublishableKey, StoredUser};
use super::state::{Tab, ViewSnapshot};
use crate::mvi::Effect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKey {
    /// Upper bound on how long the splash screen waits for a deep link.
    DeeplinkCheck,
    /// Periodic trips refresh while signed in.
    TripsRefresh,
}

impl TimerKey {
    /// Action dispatched when the timer expires.
    pub fn action(self) -> AppAction {
        match self {
            TimerKey::DeeplinkCheck => AppAction::DeeplinkCheckTimeout,
            TimerKey::TripsRefresh => AppAction::TripsRefreshTick,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    SignIn,
    Tabs(Tab),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppEffect {
    Navigate(Destination),
    /// User-visible error message.
    ShowError(String),
    /// Non-fatal error sent to crash reporting.
    ReportError(String),
    StartTimer { key: TimerKey, after: Duration },
    CancelTimer(TimerKey),
    Login(LoginRequest),
    LoadHistory {
        device_id: DeviceId,
        publishable_key: PublishableKey,
        day: NaiveDate,
    },
    LoadTrips {
        device_id: DeviceId,
        publishable_key: PublishableKey,
    },
    SetTracking { device_id: DeviceId, enabled: bool },
    PersistUser(StoredUser),
    ClearStoredUser,
    Notify { title: String, body: String },
    /// Derived from a view or progress change.
    Render(ViewSnapshot),
}

impl Effect for AppEffect {}
