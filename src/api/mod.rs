//! REST client for the tracking backend.

pub mod client;
pub mod error;
pub mod types;

pub use client::ApiClient;
pub use error::ApiError;
