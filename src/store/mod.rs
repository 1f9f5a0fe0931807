pub mod events;
pub mod reducer;
pub mod selectors;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::{ContainerState, Selection};

pub use events::Event;
pub use reducer::{apply, reduce};

pub type Listener = Arc<dyn Fn(&ContainerState) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// The single state container. State changes only through [`Store::dispatch`];
/// each applied event replaces the state wholesale and notifies listeners
/// with the new snapshot.
pub struct Store {
    state: Mutex<Arc<ContainerState>>,
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
    next_id: AtomicU64,
}

impl Store {
    pub fn new(selection: Selection) -> Self {
        Self {
            state: Mutex::new(Arc::new(ContainerState::new(selection))),
            listeners: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Current snapshot.
    pub fn state(&self) -> Arc<ContainerState> {
        lock(&self.state).clone()
    }

    /// Apply `event` atomically. Returns `false` when the event was a late
    /// response and was discarded.
    pub fn dispatch(&self, event: Event) -> bool {
        let name = event.name();
        let snapshot = {
            let mut current = lock(&self.state);
            match reduce(&current, event) {
                Some(next) => {
                    *current = Arc::new(next);
                    current.clone()
                }
                None => {
                    tracing::debug!(event = name, "Discarded stale event");
                    return false;
                }
            }
        };
        tracing::trace!(event = name, "Applied event");

        let listeners: Vec<Listener> = lock(&self.listeners)
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(&snapshot);
        }
        true
    }

    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&ContainerState) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        lock(&self.listeners).push((id, Arc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = lock(&self.listeners);
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
