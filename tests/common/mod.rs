//! Shared fixtures and fake services.

#![allow(dead_code, unused_imports)]

pub mod mock_backend;

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use parking_lot::Mutex;

use visits::api::ApiError;
use visits::app::model::{
    DeviceId, History, LoginRequest, PublishableKey, Session, StoredUser, TripStatus,
    TripSummary, UserData,
};
use visits::app::services::{
    AuthService, HistoryService, LocalTracker, RecordingPresenter, Services, TripsService,
};
use visits::app::state::{
    AppState, DeeplinkState, InitializedState, UserSession, UserState, ViewState,
};
use visits::app::ManualClock;
use visits::store::MemoryUserStore;

/// 2024-05-14 09:30 UTC.
pub fn noon_ish() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 14, 9, 30, 0).unwrap()
}

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 14).unwrap()
}

pub fn yesterday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 13).unwrap()
}

pub fn manual_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(noon_ish()))
}

pub fn session() -> Session {
    Session {
        device_id: DeviceId("device-1".to_string()),
        publishable_key: PublishableKey("pk_test_123".to_string()),
        user_data: UserData::with_email("driver@example.com"),
    }
}

pub fn stored_user() -> StoredUser {
    StoredUser::from(session())
}

pub fn key_login() -> LoginRequest {
    LoginRequest::PublishableKey {
        key: PublishableKey("pk_test_123".to_string()),
        user_data: UserData::with_email("driver@example.com"),
    }
}

pub fn history_for(day: NaiveDate) -> History {
    History {
        day,
        total_distance_m: 12_500,
        drive_duration_s: 1_800,
        visits: Vec::new(),
    }
}

pub fn trip(id: &str) -> TripSummary {
    TripSummary {
        trip_id: id.to_string(),
        status: TripStatus::Active,
        orders: 2,
    }
}

/// Initialized state on the given view.
pub fn initialized(user: UserState, view: ViewState) -> InitializedState {
    InitializedState {
        user,
        view,
        deeplink: DeeplinkState::Consumed,
        splash_shown: true,
        show_progressbar: false,
        login_in_progress: false,
        push_enabled: true,
    }
}

pub fn logged_in(view: ViewState) -> AppState {
    AppState::Initialized(initialized(
        UserState::LoggedIn(Box::new(UserSession::new(session()))),
        view,
    ))
}

pub fn signed_out(view: ViewState) -> AppState {
    AppState::Initialized(initialized(UserState::NotLoggedIn, view))
}

/// Auth service answering from a script; signs in successfully when empty.
#[derive(Default)]
pub struct FakeAuth {
    pub replies: Mutex<VecDeque<Result<Session, ApiError>>>,
    pub calls: Mutex<Vec<LoginRequest>>,
}

impl FakeAuth {
    pub fn failing(status: u16) -> Self {
        let auth = Self::default();
        auth.replies.lock().push_back(Err(ApiError::Status {
            status,
            body: "rejected".to_string(),
        }));
        auth
    }
}

#[async_trait]
impl AuthService for FakeAuth {
    async fn sign_in(&self, request: &LoginRequest) -> Result<Session, ApiError> {
        self.calls.lock().push(request.clone());
        match self.replies.lock().pop_front() {
            Some(reply) => reply,
            None => Ok(Session {
                device_id: DeviceId("device-1".to_string()),
                publishable_key: request.publishable_key().clone(),
                user_data: request.user_data(),
            }),
        }
    }
}

#[derive(Default)]
pub struct FakeHistory {
    pub calls: Mutex<Vec<NaiveDate>>,
}

#[async_trait]
impl HistoryService for FakeHistory {
    async fn load_history(
        &self,
        _device_id: &DeviceId,
        _key: &PublishableKey,
        day: NaiveDate,
    ) -> Result<History, ApiError> {
        self.calls.lock().push(day);
        Ok(history_for(day))
    }
}

#[derive(Default)]
pub struct FakeTrips {
    pub calls: Mutex<usize>,
}

#[async_trait]
impl TripsService for FakeTrips {
    async fn load_trips(
        &self,
        _device_id: &DeviceId,
        _key: &PublishableKey,
    ) -> Result<Vec<TripSummary>, ApiError> {
        *self.calls.lock() += 1;
        Ok(vec![trip("trip-1")])
    }
}

/// Handles to the fakes behind a [`Services`] bundle.
pub struct Fakes {
    pub auth: Arc<FakeAuth>,
    pub history: Arc<FakeHistory>,
    pub trips: Arc<FakeTrips>,
    pub tracker: Arc<LocalTracker>,
    pub store: Arc<MemoryUserStore>,
    pub presenter: Arc<RecordingPresenter>,
    pub reporter: Arc<RecordingReporter>,
}

impl Fakes {
    pub fn new(auth: FakeAuth, store: MemoryUserStore) -> Self {
        Self {
            auth: Arc::new(auth),
            history: Arc::new(FakeHistory::default()),
            trips: Arc::new(FakeTrips::default()),
            tracker: Arc::new(LocalTracker::default()),
            store: Arc::new(store),
            presenter: Arc::new(RecordingPresenter::default()),
            reporter: Arc::new(RecordingReporter::default()),
        }
    }

    pub fn services(&self) -> Services {
        Services {
            auth: self.auth.clone(),
            history: self.history.clone(),
            trips: self.trips.clone(),
            tracking: self.tracker.clone(),
            store: self.store.clone(),
            presenter: self.presenter.clone(),
            reporter: self.reporter.clone(),
        }
    }
}

#[derive(Default)]
pub struct RecordingReporter {
    pub reports: Mutex<Vec<String>>,
}

impl visits::app::services::ErrorReporter for RecordingReporter {
    fn report(&self, message: &str) {
        self.reports.lock().push(message.to_string());
    }
}
