//! Domain values shared by state, actions and effects.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::deeplink::DeeplinkParams;

/// Identifier assigned to the device by the tracking backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(pub String);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Account publishable key. Redacted in `Debug` output so it never lands in logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublishableKey(pub String);

impl PublishableKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PublishableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let visible: String = self.0.chars().take(4).collect();
        write!(f, "PublishableKey({}…)", visible)
    }
}

/// Driver identity and free-form metadata attached to the device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl UserData {
    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Self::default()
        }
    }

    /// Best human-readable identifier for logs and the profile tab.
    pub fn display_id(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .or(self.driver_id.as_deref())
            .or(self.phone.as_deref())
    }
}

/// Session persisted between launches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredUser {
    pub device_id: DeviceId,
    pub publishable_key: PublishableKey,
    pub user_data: UserData,
}

/// What a sign-in attempt is based on.
#[derive(Debug, Clone, PartialEq)]
pub enum LoginRequest {
    PublishableKey {
        key: PublishableKey,
        user_data: UserData,
    },
    Deeplink(DeeplinkParams),
}

impl LoginRequest {
    pub fn publishable_key(&self) -> &PublishableKey {
        match self {
            LoginRequest::PublishableKey { key, .. } => key,
            LoginRequest::Deeplink(params) => &params.publishable_key,
        }
    }

    pub fn user_data(&self) -> UserData {
        match self {
            LoginRequest::PublishableKey { user_data, .. } => user_data.clone(),
            LoginRequest::Deeplink(params) => params.user_data(),
        }
    }
}

/// Result of a successful sign-in.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub device_id: DeviceId,
    pub publishable_key: PublishableKey,
    pub user_data: UserData,
}

impl From<Session> for StoredUser {
    fn from(session: Session) -> Self {
        StoredUser {
            device_id: session.device_id,
            publishable_key: session.publishable_key,
            user_data: session.user_data,
        }
    }
}

impl From<StoredUser> for Session {
    fn from(user: StoredUser) -> Self {
        Session {
            device_id: user.device_id,
            publishable_key: user.publishable_key,
            user_data: user.user_data,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingState {
    #[default]
    Unknown,
    Tracking,
    Stopped,
    PermissionsDenied,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    pub place_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub arrived_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exited_at: Option<DateTime<Utc>>,
}

/// One day of device history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct History {
    pub day: NaiveDate,
    #[serde(default)]
    pub total_distance_m: u64,
    #[serde(default)]
    pub drive_duration_s: u64,
    #[serde(default)]
    pub visits: Vec<Visit>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripStatus {
    Active,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripSummary {
    pub trip_id: String,
    pub status: TripStatus,
    #[serde(default)]
    pub orders: u32,
}

/// Push notification delivered to the device.
#[derive(Debug, Clone, PartialEq)]
pub enum PushMessage {
    /// Trips or orders changed on the backend.
    TripUpdate { title: String, body: String },
    /// Informational message with no data to refresh.
    Message { title: String, body: String },
}

/// Progress of a cached remote value.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadingState<T> {
    Loading,
    LoadingSuccess { value: T, loaded_at: DateTime<Utc> },
    LoadingFailure { error: String },
}

impl<T> LoadingState<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            LoadingState::LoadingSuccess { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadingState::Loading)
    }
}
