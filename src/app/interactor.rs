//! Running application: reducer, effect handler and timers behind one handle.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use super::action::AppAction;
use super::clock::Clock;
use super::handler::AppEffectHandler;
use super::reducer::{AppReducer, ReducerConfig};
use super::services::Services;
use super::state::AppState;
use crate::mvi::{IllegalActionPolicy, MachineError, MachineHandle, MachineRuntime, StateMachine};

pub struct AppInteractor {
    handle: MachineHandle<AppReducer>,
}

impl AppInteractor {
    /// Spawn the machine. Must be called inside a tokio runtime.
    pub fn start(
        config: ReducerConfig,
        policy: IllegalActionPolicy,
        clock: Arc<dyn Clock>,
        services: Services,
    ) -> Self {
        let reducer = AppReducer::new(config, clock);
        let machine = StateMachine::new(reducer, AppState::default(), policy);
        let handler = AppEffectHandler::new(services);
        info!(?policy, "starting application state machine");
        Self {
            handle: MachineRuntime::spawn(machine, handler),
        }
    }

    /// Read the stored session and announce app creation.
    ///
    /// An unreadable store is reported and treated as signed out.
    pub async fn launch(&self, services: &Services) -> Result<(), MachineError> {
        let store = Arc::clone(&services.store);
        let stored_user = match tokio::task::spawn_blocking(move || store.load()).await {
            Ok(Ok(user)) => user,
            Ok(Err(err)) => {
                warn!(%err, "stored user unreadable");
                services.reporter.report(&format!("load user: {}", err));
                None
            }
            Err(err) => {
                services.reporter.report(&format!("load user: {}", err));
                None
            }
        };
        self.handle_action(AppAction::AppCreated { stored_user })
    }

    pub fn handle_action(&self, action: AppAction) -> Result<(), MachineError> {
        self.handle.dispatch(action)
    }

    pub fn state(&self) -> AppState {
        self.handle.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.handle.subscribe()
    }

    pub async fn wait_for(
        &self,
        predicate: impl FnMut(&AppState) -> bool,
    ) -> Result<AppState, MachineError> {
        self.handle.wait_for(predicate).await
    }

    pub async fn shutdown(self) -> Result<AppState, MachineError> {
        self.handle.shutdown().await
    }
}
