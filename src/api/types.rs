//! Wire types for the backend REST API.

use serde::{Deserialize, Serialize};

use crate::app::model::{DeviceId, TripSummary, UserData};

#[derive(Debug, Serialize)]
pub struct SignInRequest<'a> {
    pub publishable_key: &'a str,
    pub user: &'a UserData,
}

#[derive(Debug, Deserialize)]
pub struct SignInResponse {
    pub device_id: DeviceId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TripsResponse {
    #[serde(default)]
    pub trips: Vec<TripSummary>,
}
