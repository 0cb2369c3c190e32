//! Core type definitions for Logbook.
//!
//! This crate defines the types shared by every other crate in the
//! workspace:
//! - Identifiers handed out by the remote data service
//! - `Project`, `Event`, `PublicProject` and `PublicEvent` records as the
//!   client sees them
//! - Encoded note text
//! - The explicit per-event `Visibility` state
//!
//! Nothing here talks to the network; the records are plain data that
//! deserialize straight from the service's responses.

mod ids;
mod model;
mod note;
mod visibility;
mod wire;

pub use ids::{EventId, ProjectId, PublicEventId, PublicProjectId};
pub use model::{Event, Project, ProjectRef, PublicEvent, PublicProject};
pub use note::EncodedNote;
pub use visibility::Visibility;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid note encoding: {0}")]
    InvalidNoteEncoding(String),
}
