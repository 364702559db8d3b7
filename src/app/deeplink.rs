//! Deep link parsing.
//!
//! Login links arrive either from the link-resolution service on launch or
//! pasted by the user. Two shapes are accepted:
//!
//! ```text
//! https://app.example/login?publishable_key=pk&email=driver@x.io&metadata=<json|base64url json>
//! https://app.example/login?data=<base64url json with the same fields>
//! ```

use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use url::Url;

use super::model::{PublishableKey, UserData};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeeplinkError {
    #[error("invalid deep link URL: {0}")]
    InvalidUrl(String),

    #[error("deep link has no publishable key")]
    MissingPublishableKey,

    #[error("deep link has no email, phone or driver id")]
    MissingIdentifier,

    #[error("invalid deep link metadata: {0}")]
    InvalidMetadata(String),

    #[error("invalid deep link data payload: {0}")]
    InvalidPayload(String),
}

/// Login parameters carried by a deep link.
#[derive(Debug, Clone, PartialEq)]
pub struct DeeplinkParams {
    pub publishable_key: PublishableKey,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub driver_id: Option<String>,
    pub metadata: Map<String, Value>,
}

impl DeeplinkParams {
    pub fn user_data(&self) -> UserData {
        UserData {
            email: self.email.clone(),
            phone: self.phone.clone(),
            driver_id: self.driver_id.clone(),
            name: self
                .metadata
                .get("name")
                .and_then(Value::as_str)
                .map(str::to_string),
            metadata: self.metadata.clone(),
        }
    }
}

/// Outcome of the launch-time deep link check.
#[derive(Debug, Clone, PartialEq)]
pub enum DeeplinkResult {
    NoDeeplink,
    Params(DeeplinkParams),
    Error(String),
}

impl DeeplinkResult {
    /// Parse a link, folding parse failures into [`DeeplinkResult::Error`].
    pub fn from_url(url: &str) -> Self {
        match parse_deeplink(url) {
            Ok(params) => DeeplinkResult::Params(params),
            Err(err) => DeeplinkResult::Error(err.to_string()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct DataPayload {
    #[serde(alias = "publishableKey")]
    publishable_key: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    #[serde(alias = "driverId")]
    driver_id: Option<String>,
    #[serde(default)]
    metadata: Option<Value>,
}

pub fn parse_deeplink(input: &str) -> Result<DeeplinkParams, DeeplinkError> {
    let url = Url::parse(input.trim()).map_err(|e| DeeplinkError::InvalidUrl(e.to_string()))?;

    let mut payload = DataPayload::default();
    let mut raw_metadata: Option<String> = None;

    for (name, value) in url.query_pairs() {
        let value = value.into_owned();
        if value.is_empty() {
            continue;
        }
        match name.as_ref() {
            "publishable_key" | "publishableKey" => payload.publishable_key = Some(value),
            "email" => payload.email = Some(value),
            "phone" => payload.phone = Some(value),
            "driver_id" | "driverId" => payload.driver_id = Some(value),
            "metadata" => raw_metadata = Some(value),
            "data" => merge_payload(&mut payload, decode_data(&value)?),
            _ => {}
        }
    }

    let publishable_key = payload
        .publishable_key
        .filter(|k| !k.trim().is_empty())
        .ok_or(DeeplinkError::MissingPublishableKey)?;

    if payload.email.is_none() && payload.phone.is_none() && payload.driver_id.is_none() {
        return Err(DeeplinkError::MissingIdentifier);
    }

    let metadata = match (raw_metadata, payload.metadata) {
        (Some(raw), _) => parse_metadata(&raw)?,
        (None, Some(Value::Object(map))) => map,
        (None, Some(Value::Null)) | (None, None) => Map::new(),
        (None, Some(other)) => {
            return Err(DeeplinkError::InvalidMetadata(format!(
                "expected object, got {}",
                other
            )))
        }
    };

    Ok(DeeplinkParams {
        publishable_key: PublishableKey(publishable_key),
        email: payload.email,
        phone: payload.phone,
        driver_id: payload.driver_id,
        metadata,
    })
}

/// Query parameters win over fields from the `data` payload.
fn merge_payload(target: &mut DataPayload, decoded: DataPayload) {
    target.publishable_key = target.publishable_key.take().or(decoded.publishable_key);
    target.email = target.email.take().or(decoded.email);
    target.phone = target.phone.take().or(decoded.phone);
    target.driver_id = target.driver_id.take().or(decoded.driver_id);
    target.metadata = target.metadata.take().or(decoded.metadata);
}

fn decode_base64(value: &str) -> Option<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(value)
        .or_else(|_| URL_SAFE.decode(value))
        .ok()
}

fn decode_data(value: &str) -> Result<DataPayload, DeeplinkError> {
    let bytes = decode_base64(value)
        .ok_or_else(|| DeeplinkError::InvalidPayload("not base64url".to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| DeeplinkError::InvalidPayload(e.to_string()))
}

fn parse_metadata(raw: &str) -> Result<Map<String, Value>, DeeplinkError> {
    let json = if raw.trim_start().starts_with('{') {
        raw.to_string()
    } else {
        let bytes = decode_base64(raw)
            .ok_or_else(|| DeeplinkError::InvalidMetadata("neither JSON nor base64url".to_string()))?;
        String::from_utf8(bytes).map_err(|e| DeeplinkError::InvalidMetadata(e.to_string()))?
    };

    match serde_json::from_str::<Value>(&json) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(DeeplinkError::InvalidMetadata(format!(
            "expected object, got {}",
            other
        ))),
        Err(e) => Err(DeeplinkError::InvalidMetadata(e.to_string())),
    }
}
