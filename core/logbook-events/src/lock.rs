//! Per-event transition locks.

use logbook_types::EventId;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Set of events with a visibility transition in flight.
#[derive(Debug, Clone, Default)]
pub struct TransitionLocks {
    held: Arc<Mutex<HashSet<EventId>>>,
}

impl TransitionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn held(&self) -> MutexGuard<'_, HashSet<EventId>> {
        self.held.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claims `event`, or returns `None` if it is already claimed.
    pub fn try_acquire(&self, event: &EventId) -> Option<TransitionGuard> {
        if !self.held().insert(event.clone()) {
            return None;
        }
        Some(TransitionGuard {
            locks: self.clone(),
            event: event.clone(),
        })
    }

    /// Returns true if a transition of `event` is in flight.
    pub fn is_held(&self, event: &EventId) -> bool {
        self.held().contains(event)
    }
}

/// Releases the claim on drop.
#[derive(Debug)]
pub struct TransitionGuard {
    locks: TransitionLocks,
    event: EventId,
}

impl TransitionGuard {
    pub fn event(&self) -> &EventId {
        &self.event
    }
}

impl Drop for TransitionGuard {
    fn drop(&mut self) {
        self.locks.held().remove(&self.event);
    }
}
