//! Keyed, cancelable timers that fire actions.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::AbortHandle;
use tracing::{debug, trace};

use super::runtime::ActionSender;

struct TimerEntry {
    generation: u64,
    handle: AbortHandle,
}

/// Timers keyed by `K`. Starting a timer whose key is already active
/// aborts the previous instance.
pub struct TimerRegistry<K, A> {
    timers: Arc<Mutex<HashMap<K, TimerEntry>>>,
    generation: AtomicU64,
    _action: std::marker::PhantomData<fn(A)>,
}

impl<K, A> TimerRegistry<K, A>
where
    K: Eq + Hash + Clone + Debug + Send + 'static,
    A: Send + 'static,
{
    pub fn new() -> Self {
        Self {
            timers: Arc::new(Mutex::new(HashMap::new())),
            generation: AtomicU64::new(0),
            _action: std::marker::PhantomData,
        }
    }

    /// Dispatch `action` after `after`, replacing any timer with the same key.
    pub fn start(&self, key: K, after: Duration, action: A, dispatcher: &ActionSender<A>) {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let timers = Arc::clone(&self.timers);
        let dispatcher = dispatcher.clone();
        let task_key = key.clone();

        // Hold the lock across spawn so the task cannot observe the map
        // before its own entry is inserted.
        let mut guard = self.timers.lock();
        let task = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            {
                let mut timers = timers.lock();
                match timers.get(&task_key) {
                    Some(entry) if entry.generation == generation => {
                        timers.remove(&task_key);
                    }
                    _ => return,
                }
            }
            trace!(key = ?task_key, "timer fired");
            let _ = dispatcher.send(action);
        });

        let entry = TimerEntry {
            generation,
            handle: task.abort_handle(),
        };
        if let Some(previous) = guard.insert(key.clone(), entry) {
            previous.handle.abort();
            debug!(?key, "timer restarted");
        } else {
            debug!(?key, ?after, "timer started");
        }
    }

    /// Cancel the timer for `key`. Returns whether one was active.
    pub fn cancel(&self, key: &K) -> bool {
        match self.timers.lock().remove(key) {
            Some(entry) => {
                entry.handle.abort();
                debug!(?key, "timer cancelled");
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&self) {
        for (_, entry) in self.timers.lock().drain() {
            entry.handle.abort();
        }
    }

    pub fn is_active(&self, key: &K) -> bool {
        self.timers.lock().contains_key(key)
    }

    pub fn active_count(&self) -> usize {
        self.timers.lock().len()
    }
}

impl<K, A> Default for TimerRegistry<K, A>
where
    K: Eq + Hash + Clone + Debug + Send + 'static,
    A: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, A> Drop for TimerRegistry<K, A> {
    fn drop(&mut self) {
        for (_, entry) in self.timers.lock().drain() {
            entry.handle.abort();
        }
    }
}
