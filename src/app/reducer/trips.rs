use std::time::Duration;

use crate::app::action::AppAction;
use crate::app::effect::{AppEffect, TimerKey};
use crate::app::state::UserSession;
use crate::mvi::{IllegalActionError, ReducerResult};

/// Trip list refreshes: on demand, on push, and on a re-armed timer.
pub struct TripsReducer {
    refresh_interval: Duration,
}

impl TripsReducer {
    pub fn new(refresh_interval: Duration) -> Self {
        Self { refresh_interval }
    }

    pub fn start_refresh(&self) -> AppEffect {
        AppEffect::StartTimer {
            key: TimerKey::TripsRefresh,
            after: self.refresh_interval,
        }
    }

    pub fn load(&self, session: &UserSession) -> AppEffect {
        AppEffect::LoadTrips {
            device_id: session.device_id.clone(),
            publishable_key: session.publishable_key.clone(),
        }
    }

    pub fn reduce(
        &self,
        action: AppAction,
        session: &UserSession,
    ) -> Result<ReducerResult<UserSession, AppEffect>, IllegalActionError> {
        match action {
            AppAction::RefreshTrips => Ok(ReducerResult::with_effect(
                session.clone(),
                self.load(session),
            )),
            AppAction::TripsRefreshTick => Ok(ReducerResult::with_effects(
                session.clone(),
                vec![self.load(session), self.start_refresh()],
            )),
            AppAction::TripsLoaded { result: Ok(trips) } => {
                let mut next = session.clone();
                next.trips = trips;
                Ok(ReducerResult::new(next))
            }
            AppAction::TripsLoaded { result: Err(error) } => Ok(ReducerResult::with_effect(
                session.clone(),
                AppEffect::ReportError(format!("trips refresh failed: {}", error)),
            )),
            other => Err(IllegalActionError::new(&other, session)),
        }
    }
}
