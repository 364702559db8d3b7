//! The visits application: state tree, actions, effects and their wiring.

pub mod action;
pub mod clock;
pub mod deeplink;
pub mod effect;
pub mod handler;
pub mod interactor;
pub mod model;
pub mod reducer;
pub mod services;
pub mod state;

pub use action::AppAction;
pub use clock::{Clock, ManualClock, SystemClock};
pub use deeplink::{parse_deeplink, DeeplinkError, DeeplinkParams, DeeplinkResult};
pub use effect::{AppEffect, Destination, TimerKey};
pub use handler::AppEffectHandler;
pub use interactor::AppInteractor;
pub use reducer::{AppReducer, ReducerConfig};
pub use services::Services;
pub use state::{AppState, DeeplinkState, InitializedState, Tab, UserState, ViewState};
