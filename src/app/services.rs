//! Collaborators the effect handler talks to.
//!
//! Network-facing services are async; local ones are plain calls.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;
use tracing::{error, info, warn};

use super::effect::Destination;
use super::model::{
    DeviceId, History, LoginRequest, PublishableKey, Session, TrackingState, TripSummary,
};
use super::state::ViewSnapshot;
use crate::api::ApiError;
use crate::store::UserStore;

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn sign_in(&self, request: &LoginRequest) -> Result<Session, ApiError>;
}

#[async_trait]
pub trait HistoryService: Send + Sync {
    async fn load_history(
        &self,
        device_id: &DeviceId,
        key: &PublishableKey,
        day: NaiveDate,
    ) -> Result<History, ApiError>;
}

#[async_trait]
pub trait TripsService: Send + Sync {
    async fn load_trips(
        &self,
        device_id: &DeviceId,
        key: &PublishableKey,
    ) -> Result<Vec<TripSummary>, ApiError>;
}

/// Location tracking switch. Returns the state after the change.
pub trait TrackingControl: Send + Sync {
    fn set_tracking(&self, device_id: &DeviceId, enabled: bool) -> TrackingState;
}

/// Presentation layer: screens, messages and notifications.
pub trait Presenter: Send + Sync {
    fn navigate(&self, destination: Destination);
    fn show_error(&self, message: &str);
    fn render(&self, snapshot: &ViewSnapshot);
    fn notify(&self, title: &str, body: &str);
}

/// Non-fatal error sink (crash reporting).
pub trait ErrorReporter: Send + Sync {
    fn report(&self, message: &str);
}

/// Everything the effect handler needs.
#[derive(Clone)]
pub struct Services {
    pub auth: Arc<dyn AuthService>,
    pub history: Arc<dyn HistoryService>,
    pub trips: Arc<dyn TripsService>,
    pub tracking: Arc<dyn TrackingControl>,
    pub store: Arc<dyn UserStore>,
    pub presenter: Arc<dyn Presenter>,
    pub reporter: Arc<dyn ErrorReporter>,
}

/// Tracking switch without a location SDK behind it.
#[derive(Default)]
pub struct LocalTracker {
    tracking: Mutex<Option<DeviceId>>,
}

impl LocalTracker {
    pub fn tracked_device(&self) -> Option<DeviceId> {
        self.tracking.lock().clone()
    }
}

impl TrackingControl for LocalTracker {
    fn set_tracking(&self, device_id: &DeviceId, enabled: bool) -> TrackingState {
        let mut tracking = self.tracking.lock();
        if enabled {
            *tracking = Some(device_id.clone());
            TrackingState::Tracking
        } else {
            *tracking = None;
            TrackingState::Stopped
        }
    }
}

/// Presenter for the command line: prints screens and messages to stdout.
pub struct ConsolePresenter;

impl Presenter for ConsolePresenter {
    fn navigate(&self, destination: Destination) {
        info!(?destination, "navigate");
    }

    fn show_error(&self, message: &str) {
        warn!(message, "user-visible error");
        println!("error: {}", message);
    }

    fn render(&self, snapshot: &ViewSnapshot) {
        let progress = if snapshot.show_progressbar { " (working…)" } else { "" };
        match &snapshot.user {
            Some(user) => println!("[{:?}] {}{}", snapshot.view, user, progress),
            None => println!("[{:?}]{}", snapshot.view, progress),
        }
    }

    fn notify(&self, title: &str, body: &str) {
        println!("notification: {} - {}", title, body);
    }
}

/// What a [`RecordingPresenter`] saw.
#[derive(Debug, Clone, PartialEq)]
pub enum PresenterEvent {
    Navigate(Destination),
    ShowError(String),
    Render(ViewSnapshot),
    Notify { title: String, body: String },
}

/// Presenter that keeps every call, in order.
#[derive(Default)]
pub struct RecordingPresenter {
    events: Mutex<Vec<PresenterEvent>>,
}

impl RecordingPresenter {
    pub fn events(&self) -> Vec<PresenterEvent> {
        self.events.lock().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                PresenterEvent::ShowError(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Presenter for RecordingPresenter {
    fn navigate(&self, destination: Destination) {
        self.events.lock().push(PresenterEvent::Navigate(destination));
    }

    fn show_error(&self, message: &str) {
        self.events
            .lock()
            .push(PresenterEvent::ShowError(message.to_string()));
    }

    fn render(&self, snapshot: &ViewSnapshot) {
        self.events.lock().push(PresenterEvent::Render(snapshot.clone()));
    }

    fn notify(&self, title: &str, body: &str) {
        self.events.lock().push(PresenterEvent::Notify {
            title: title.to_string(),
            body: body.to_string(),
        });
    }
}

pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, message: &str) {
        error!(target: "visits::report", message);
    }
}
