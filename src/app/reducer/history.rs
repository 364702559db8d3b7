//! Per-day history cache with a reload threshold for today.

use std::sync::Arc;

use crate::app::action::AppAction;
use crate::app::clock::Clock;
use crate::app::effect::AppEffect;
use crate::app::model::LoadingState;
use crate::app::state::{HistoryCache, UserSession};
use crate::mvi::{IllegalActionError, ReducerResult};

pub struct HistoryReducer {
    clock: Arc<dyn Clock>,
    ttl: chrono::Duration,
}

impl HistoryReducer {
    pub fn new(clock: Arc<dyn Clock>, ttl: chrono::Duration) -> Self {
        Self { clock, ttl }
    }

    /// A day is (re)loaded only if it was never loaded, the last load
    /// failed, or it is today and the cached copy is older than the TTL.
    /// Past days that loaded successfully are final.
    pub fn reduce(
        &self,
        action: AppAction,
        session: &UserSession,
        cache: &HistoryCache,
    ) -> Result<ReducerResult<HistoryCache, AppEffect>, IllegalActionError> {
        match action {
            AppAction::LoadHistory { day } => {
                if !self.should_load(cache.get(&day), day == self.clock.today()) {
                    return Ok(ReducerResult::new(cache.clone()));
                }
                let mut cache = cache.clone();
                cache.insert(day, LoadingState::Loading);
                Ok(ReducerResult::with_effect(
                    cache,
                    AppEffect::LoadHistory {
                        device_id: session.device_id.clone(),
                        publishable_key: session.publishable_key.clone(),
                        day,
                    },
                ))
            }
            AppAction::HistoryLoaded { day, result } => {
                // Results nobody is waiting for are dropped.
                if !cache.get(&day).is_some_and(LoadingState::is_loading) {
                    return Ok(ReducerResult::new(cache.clone()));
                }
                let mut cache = cache.clone();
                match result {
                    Ok(history) => {
                        cache.insert(
                            day,
                            LoadingState::LoadingSuccess {
                                value: history,
                                loaded_at: self.clock.now(),
                            },
                        );
                        Ok(ReducerResult::new(cache))
                    }
                    Err(error) => {
                        let message = format!("Failed to load history for {}: {}", day, error);
                        cache.insert(day, LoadingState::LoadingFailure { error });
                        Ok(ReducerResult::with_effect(cache, AppEffect::ShowError(message)))
                    }
                }
            }
            other => Err(IllegalActionError::new(&other, cache)),
        }
    }

    fn should_load<T>(&self, entry: Option<&LoadingState<T>>, is_today: bool) -> bool {
        match entry {
            None => true,
            Some(LoadingState::Loading) => false,
            Some(LoadingState::LoadingFailure { .. }) => true,
            Some(LoadingState::LoadingSuccess { loaded_at, .. }) => {
                is_today && self.clock.now() - *loaded_at > self.ttl
            }
        }
    }
}
