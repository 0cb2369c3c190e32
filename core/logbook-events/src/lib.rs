//! Event flows for Logbook.
//!
//! - [`EventService::toggle_visibility`] and [`EventService::reconcile`]
//!   move an event between private and public
//! - [`EventService::edit_note`] updates an event's note and its mirror's
//! - [`EventService::delete_event`] deletes an event, its mirror and files
//! - [`ProjectService`] manages projects and imports JSON exports
//!
//! All flows talk to the remote service through
//! [`DataService`](logbook_remote::DataService) and to file storage through
//! [`ObjectStore`](logbook_blobstore::ObjectStore).

mod error;
mod import;
mod lock;
mod notes;
mod projects;
mod removal;
mod service;
mod visibility;
mod warning;

pub use error::{EventsError, EventsResult, VisibilityError, VisibilityResult};
pub use import::{ImportDocument, ImportFailure, ImportReport, ImportedEvent};
pub use lock::{TransitionGuard, TransitionLocks};
pub use notes::{MirrorSync, NoteEdit};
pub use projects::ProjectService;
pub use removal::{DeleteReport, FileFailure, RemovalOutcome};
pub use service::EventService;
pub use visibility::{ReconcileDecision, SagaStep, Transition};
pub use warning::InconsistencyWarning;
