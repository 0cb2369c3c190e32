//! Error types for the event flows.

use crate::visibility::{ReconcileDecision, SagaStep};
use logbook_remote::RemoteError;
use logbook_types::{Event, EventId, PublicEventId, PublicProjectId, Visibility};
use thiserror::Error;

/// Result type for visibility transitions.
pub type VisibilityResult<T> = Result<T, VisibilityError>;

/// Errors that can occur while moving an event between private and public.
#[derive(Debug, Error)]
pub enum VisibilityError {
    /// The owning project has no public counterpart. No remote call was made.
    #[error("project of event {event} is not public")]
    ProjectNotPublic { event: EventId },

    /// Another transition of the same event has not finished.
    #[error("a visibility transition is already in flight for event {0}")]
    TransitionInFlight(EventId),

    /// The event is in an intermediate state and must be reconciled first.
    #[error("event {event} is stranded ({state}); reconcile it first")]
    Stranded { event: EventId, state: Visibility },

    /// A remote call failed partway through a transition.
    #[error("{step} failed for event {}, left {state}: {source}", .event.id)]
    Remote {
        step: SagaStep,
        /// Last snapshot of the event the service returned.
        event: Box<Event>,
        /// State the event is left in.
        state: Visibility,
        /// A mirror that was created but is not linked to the event.
        orphan: Option<PublicEventId>,
        #[source]
        source: RemoteError,
    },

    /// The project lost its public counterpart after the event was marked
    /// visible.
    #[error("public project of event {} disappeared, left {}", .event.id, Visibility::PendingPublic)]
    PublicProjectMissing { event: Box<Event> },

    /// The mirror belongs to a different public project than the event.
    #[error("mirror {mirror} of event {event} is under {found:?}, expected {expected}")]
    MirrorMismatch {
        event: EventId,
        mirror: PublicEventId,
        expected: PublicProjectId,
        found: Option<PublicProjectId>,
    },

    /// Another event already links the mirror.
    #[error("mirror {mirror} is already linked by event {linked_by}")]
    MirrorInUse {
        event: EventId,
        mirror: PublicEventId,
        linked_by: EventId,
    },

    /// The decision does not apply to the event's state.
    #[error("{decision} does not apply to an event that is {state}")]
    InvalidDecision {
        state: Visibility,
        decision: ReconcileDecision,
    },

    /// The event is already consistent.
    #[error("event {event} is already {state}, nothing to reconcile")]
    NothingToReconcile { event: EventId, state: Visibility },
}

impl VisibilityError {
    /// Returns the intermediate state a failed transition left behind.
    pub fn stranded_state(&self) -> Option<Visibility> {
        match self {
            VisibilityError::Remote { state, .. } if !state.is_consistent() => Some(state.clone()),
            VisibilityError::Stranded { state, .. } => Some(state.clone()),
            VisibilityError::PublicProjectMissing { .. } => Some(Visibility::PendingPublic),
            _ => None,
        }
    }

    /// Returns the last known snapshot of the event, if the service returned one.
    pub fn snapshot(&self) -> Option<&Event> {
        match self {
            VisibilityError::Remote { event, .. }
            | VisibilityError::PublicProjectMissing { event } => Some(event),
            _ => None,
        }
    }
}

/// Result type for the edit, delete, project and import flows.
pub type EventsResult<T> = Result<T, EventsError>;

/// Errors that can occur in the edit, delete, project and import flows.
#[derive(Debug, Error)]
pub enum EventsError {
    /// Remote data service error.
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    /// Record decoding error.
    #[error(transparent)]
    Types(#[from] logbook_types::Error),

    /// The import document could not be parsed.
    #[error("invalid import document: {0}")]
    InvalidDocument(#[from] serde_json::Error),

    /// Reading an input file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The requested record does not exist.
    #[error("{0} not found")]
    NotFound(String),
}
