//! Actor wrapper around [`StateMachine`].
//!
//! One task owns the machine and reduces queued actions in arrival order.
//! A second task applies effect batches in the order they were produced, so
//! slow effects never delay the next reduction.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::effect::EffectHandler;
use super::error::{IllegalActionError, MachineError};
use super::machine::StateMachine;
use super::reducer::Reducer;

/// Cloneable entry point into the action queue.
pub struct ActionSender<A> {
    tx: mpsc::UnboundedSender<A>,
}

impl<A> Clone for ActionSender<A> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<A> ActionSender<A> {
    /// Detached sender/receiver pair, for driving effect handlers or timers
    /// without a running machine.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<A>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Queue an action. Fails once the machine has stopped.
    pub fn send(&self, action: A) -> Result<(), MachineError> {
        self.tx.send(action).map_err(|_| MachineError::Stopped)
    }
}

pub struct MachineRuntime;

impl MachineRuntime {
    /// Start the reducer and effect tasks. Must be called inside a tokio runtime.
    pub fn spawn<R, H>(machine: StateMachine<R>, handler: H) -> MachineHandle<R>
    where
        R: Reducer,
        H: EffectHandler<Action = R::Action, Effect = R::Effect>,
    {
        let (sender, action_rx) = ActionSender::channel();
        let (effect_tx, effect_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(machine.state().clone());
        let (stop_tx, stop_rx) = oneshot::channel();

        let reducer_task = tokio::spawn(run_reducer(machine, action_rx, stop_rx, state_tx, effect_tx));
        let effect_task = tokio::spawn(run_effects(Arc::new(handler), effect_rx, sender.clone()));

        MachineHandle {
            sender,
            state_rx,
            stop_tx: Some(stop_tx),
            reducer_task,
            effect_task,
        }
    }
}

async fn run_reducer<R: Reducer>(
    mut machine: StateMachine<R>,
    mut actions: mpsc::UnboundedReceiver<R::Action>,
    mut stop: oneshot::Receiver<()>,
    state_tx: watch::Sender<R::State>,
    effect_tx: mpsc::UnboundedSender<Vec<R::Effect>>,
) -> Result<R::State, IllegalActionError> {
    loop {
        let action = tokio::select! {
            biased;
            Some(action) = actions.recv() => action,
            _ = &mut stop => break,
        };
        step(&mut machine, action, &state_tx, &effect_tx)?;
    }

    // Drain whatever was queued before the stop signal.
    while let Ok(action) = actions.try_recv() {
        step(&mut machine, action, &state_tx, &effect_tx)?;
    }

    debug!("reducer loop finished");
    Ok(machine.state().clone())
}

fn step<R: Reducer>(
    machine: &mut StateMachine<R>,
    action: R::Action,
    state_tx: &watch::Sender<R::State>,
    effect_tx: &mpsc::UnboundedSender<Vec<R::Effect>>,
) -> Result<(), IllegalActionError> {
    let effects = machine.handle_action(action).map_err(|err| {
        error!(%err, "illegal action, stopping state machine");
        err
    })?;

    let next = machine.state();
    state_tx.send_if_modified(|current| {
        if current != next {
            *current = next.clone();
            true
        } else {
            false
        }
    });

    if !effects.is_empty() {
        // The effect task only goes away on shutdown.
        let _ = effect_tx.send(effects);
    }
    Ok(())
}

async fn run_effects<H: EffectHandler>(
    handler: Arc<H>,
    mut batches: mpsc::UnboundedReceiver<Vec<H::Effect>>,
    dispatcher: ActionSender<H::Action>,
) {
    while let Some(batch) = batches.recv().await {
        for effect in batch {
            debug!(?effect, "applying effect");
            handler.apply(effect, &dispatcher).await;
        }
    }
    debug!("effect loop finished");
}

/// Handle to a running machine.
pub struct MachineHandle<R: Reducer> {
    sender: ActionSender<R::Action>,
    state_rx: watch::Receiver<R::State>,
    stop_tx: Option<oneshot::Sender<()>>,
    reducer_task: JoinHandle<Result<R::State, IllegalActionError>>,
    effect_task: JoinHandle<()>,
}

impl<R: Reducer> MachineHandle<R> {
    pub fn dispatch(&self, action: R::Action) -> Result<(), MachineError> {
        self.sender.send(action)
    }

    pub fn sender(&self) -> ActionSender<R::Action> {
        self.sender.clone()
    }

    /// Latest published state.
    pub fn state(&self) -> R::State {
        self.state_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<R::State> {
        self.state_rx.clone()
    }

    /// Wait until the published state satisfies `predicate`.
    pub async fn wait_for(
        &self,
        predicate: impl FnMut(&R::State) -> bool,
    ) -> Result<R::State, MachineError> {
        let mut rx = self.state_rx.clone();
        let state = rx.wait_for(predicate).await.map_err(|_| MachineError::Stopped)?;
        Ok((*state).clone())
    }

    /// Stop after reducing the already queued actions, let the effect task
    /// finish its pending batches and return the final state.
    pub async fn shutdown(mut self) -> Result<R::State, MachineError> {
        if let Some(stop) = self.stop_tx.take() {
            let _ = stop.send(());
        }

        let result = match self.reducer_task.await {
            Ok(result) => result.map_err(MachineError::from),
            Err(_) => Err(MachineError::Stopped),
        };

        // The effect channel closes with the reducer task.
        let _ = self.effect_task.await;
        info!(ok = result.is_ok(), "state machine shut down");
        result
    }
}
