//! Interpreter for [`AppEffect`].
//!
//! Local effects run inline, in order. Network effects are spawned so the
//! effect loop keeps moving; their results come back as actions.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, trace, warn};

use super::action::AppAction;
use super::effect::{AppEffect, TimerKey};
use super::services::Services;
use crate::mvi::{ActionSender, EffectHandler, TimerRegistry};

pub struct AppEffectHandler {
    services: Services,
    timers: Arc<TimerRegistry<TimerKey, AppAction>>,
}

impl AppEffectHandler {
    pub fn new(services: Services) -> Self {
        Self {
            services,
            timers: Arc::new(TimerRegistry::new()),
        }
    }

    /// Timer registry shared with the handler, for inspection.
    pub fn timers(&self) -> Arc<TimerRegistry<TimerKey, AppAction>> {
        Arc::clone(&self.timers)
    }

    fn send(dispatcher: &ActionSender<AppAction>, action: AppAction) {
        if dispatcher.send(action).is_err() {
            trace!("result dropped, state machine stopped");
        }
    }
}

#[async_trait]
impl EffectHandler for AppEffectHandler {
    type Action = AppAction;
    type Effect = AppEffect;

    async fn apply(&self, effect: AppEffect, dispatcher: &ActionSender<AppAction>) {
        match effect {
            AppEffect::Navigate(destination) => self.services.presenter.navigate(destination),
            AppEffect::ShowError(message) => self.services.presenter.show_error(&message),
            AppEffect::ReportError(message) => self.services.reporter.report(&message),
            AppEffect::Render(snapshot) => self.services.presenter.render(&snapshot),
            AppEffect::Notify { title, body } => self.services.presenter.notify(&title, &body),

            AppEffect::StartTimer { key, after } => {
                self.timers.start(key, after, key.action(), dispatcher);
            }
            AppEffect::CancelTimer(key) => {
                self.timers.cancel(&key);
            }

            AppEffect::Login(request) => {
                let auth = Arc::clone(&self.services.auth);
                let dispatcher = dispatcher.clone();
                tokio::spawn(async move {
                    let action = match auth.sign_in(&request).await {
                        Ok(session) => AppAction::LoginSucceeded(session),
                        Err(err) => {
                            warn!(%err, "sign-in failed");
                            AppAction::LoginFailed {
                                error: err.user_message(),
                            }
                        }
                    };
                    Self::send(&dispatcher, action);
                });
            }

            AppEffect::LoadHistory {
                device_id,
                publishable_key,
                day,
            } => {
                let history = Arc::clone(&self.services.history);
                let dispatcher = dispatcher.clone();
                tokio::spawn(async move {
                    let result = history
                        .load_history(&device_id, &publishable_key, day)
                        .await
                        .map_err(|err| err.user_message());
                    Self::send(&dispatcher, AppAction::HistoryLoaded { day, result });
                });
            }

            AppEffect::LoadTrips {
                device_id,
                publishable_key,
            } => {
                let trips = Arc::clone(&self.services.trips);
                let dispatcher = dispatcher.clone();
                tokio::spawn(async move {
                    let result = trips
                        .load_trips(&device_id, &publishable_key)
                        .await
                        .map_err(|err| err.to_string());
                    Self::send(&dispatcher, AppAction::TripsLoaded { result });
                });
            }

            AppEffect::SetTracking { device_id, enabled } => {
                let state = self.services.tracking.set_tracking(&device_id, enabled);
                debug!(%device_id, enabled, ?state, "tracking switched");
                Self::send(dispatcher, AppAction::TrackingStateChanged(state));
            }

            AppEffect::PersistUser(user) => {
                let store = Arc::clone(&self.services.store);
                let saved = tokio::task::spawn_blocking(move || store.save(&user)).await;
                match saved {
                    Ok(Ok(())) => debug!("user persisted"),
                    Ok(Err(err)) => self.services.reporter.report(&format!("persist user: {}", err)),
                    Err(err) => self.services.reporter.report(&format!("persist user: {}", err)),
                }
            }

            AppEffect::ClearStoredUser => {
                let store = Arc::clone(&self.services.store);
                let cleared = tokio::task::spawn_blocking(move || store.clear()).await;
                match cleared {
                    Ok(Ok(())) => debug!("stored user cleared"),
                    Ok(Err(err)) => self.services.reporter.report(&format!("clear user: {}", err)),
                    Err(err) => self.services.reporter.report(&format!("clear user: {}", err)),
                }
            }
        }
    }
}
