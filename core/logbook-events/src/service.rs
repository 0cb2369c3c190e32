//! Event service.

use crate::error::{EventsError, EventsResult, VisibilityError, VisibilityResult};
use crate::lock::{TransitionGuard, TransitionLocks};
use logbook_blobstore::ObjectStore;
use logbook_remote::DataService;
use logbook_types::{Event, EventId};
use std::sync::Arc;

/// Runs the event flows against a data service and an object store.
///
/// Cloning is cheap; clones share the transition locks.
#[derive(Clone)]
pub struct EventService {
    data: Arc<dyn DataService>,
    store: Arc<dyn ObjectStore>,
    locks: TransitionLocks,
}

impl EventService {
    pub fn new(data: Arc<dyn DataService>, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            data,
            store,
            locks: TransitionLocks::new(),
        }
    }

    pub fn data(&self) -> &Arc<dyn DataService> {
        &self.data
    }

    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    pub fn locks(&self) -> &TransitionLocks {
        &self.locks
    }

    /// Fetches the current snapshot of an event.
    pub async fn event(&self, id: &EventId) -> EventsResult<Event> {
        self.data
            .get_event(id)
            .await?
            .ok_or_else(|| EventsError::NotFound(format!("event {id}")))
    }

    pub(crate) fn lock(&self, event: &EventId) -> VisibilityResult<TransitionGuard> {
        self.locks
            .try_acquire(event)
            .ok_or_else(|| VisibilityError::TransitionInFlight(event.clone()))
    }
}
