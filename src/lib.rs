//! Field visits client.
//!
//! The application is a single state machine ([`app::AppReducer`]) driven by
//! actions and interpreted through effects ([`app::AppEffectHandler`]). The
//! generic machinery lives in [`mvi`]; the backend client in [`api`].

pub mod api;
pub mod app;
pub mod config;
pub mod logging;
pub mod mvi;
pub mod store;
