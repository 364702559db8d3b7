//! HTTP implementation of the auth, history and trips services.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use url::Url;
use uuid::Uuid;

use super::error::ApiError;
use super::types::{SignInRequest, SignInResponse, TripsResponse};
use crate::app::model::{DeviceId, History, LoginRequest, PublishableKey, Session, TripSummary};
use crate::app::services::{AuthService, HistoryService, TripsService};

/// Header carrying a per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

pub struct ApiClient {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url).map_err(|err| ApiError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: err.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "not a hierarchical URL".to_string(),
            });
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            client,
            base_url: parsed,
            timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Base URL with `segments` appended, each one percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "not a hierarchical URL".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        url: Url,
        request: RequestBuilder,
        key: &PublishableKey,
    ) -> Result<T, ApiError> {
        let request_id = Uuid::new_v4().to_string();
        tracing::debug!(url = %url, request_id = %request_id, "backend request");

        let response = request
            .bearer_auth(key.as_str())
            .header(REQUEST_ID_HEADER, &request_id)
            .send()
            .await
            .map_err(|err| self.classify(&url, err))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| self.classify(&url, err))?;

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                request_id = %request_id,
                "backend returned error"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    fn classify(&self, url: &Url, err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout {
                seconds: self.timeout.as_secs(),
            }
        } else {
            ApiError::Connection {
                url: url.to_string(),
                source: err,
            }
        }
    }
}

#[async_trait]
impl AuthService for ApiClient {
    async fn sign_in(&self, request: &LoginRequest) -> Result<Session, ApiError> {
        let key = request.publishable_key();
        let user_data = request.user_data();
        let url = self.endpoint(&["v1", "auth", "sign-in"])?;
        let body = SignInRequest {
            publishable_key: key.as_str(),
            user: &user_data,
        };

        let builder = self.client.post(url.clone()).json(&body);
        let response: SignInResponse = self.execute(url, builder, key).await?;
        tracing::info!(device_id = %response.device_id, "signed in");

        Ok(Session {
            device_id: response.device_id,
            publishable_key: key.clone(),
            user_data,
        })
    }
}

#[async_trait]
impl HistoryService for ApiClient {
    async fn load_history(
        &self,
        device_id: &DeviceId,
        key: &PublishableKey,
        day: NaiveDate,
    ) -> Result<History, ApiError> {
        let day = day.format("%Y-%m-%d").to_string();
        let url = self.endpoint(&["v1", "devices", &device_id.0, "history", &day])?;
        let builder = self.client.get(url.clone());
        self.execute(url, builder, key).await
    }
}

#[async_trait]
impl TripsService for ApiClient {
    async fn load_trips(
        &self,
        device_id: &DeviceId,
        key: &PublishableKey,
    ) -> Result<Vec<TripSummary>, ApiError> {
        let url = self.endpoint(&["v1", "devices", &device_id.0, "trips"])?;
        let builder = self.client.get(url.clone());
        let response: TripsResponse = self.execute(url, builder, key).await?;
        Ok(response.trips)
    }
}
