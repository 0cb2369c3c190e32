//! Records exchanged with the remote data service.
//!
//! Field names follow the service's camelCase schema. References arrive as
//! nested objects (`publicEvent { id }`) and are flattened to optional ids.

use crate::wire::{hidden_by_default, nested_id, null_as_default, null_as_hidden};
use crate::{
    EncodedNote, EventId, ProjectId, PublicEventId, PublicProjectId, Result, Visibility,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A private project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Public counterpart; only public-capable projects have one.
    #[serde(default, with = "nested_id")]
    pub public_project: Option<PublicProjectId>,
}

impl Project {
    /// Returns true if events of this project may be published.
    #[must_use]
    pub fn is_public_capable(&self) -> bool {
        self.public_project.is_some()
    }

    /// Returns the reference an event of this project carries.
    #[must_use]
    pub fn to_ref(&self) -> ProjectRef {
        ProjectRef {
            id: self.id.clone(),
            public_project: self.public_project.clone(),
        }
    }
}

/// The owning project as seen from an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRef {
    pub id: ProjectId,
    #[serde(default, with = "nested_id")]
    pub public_project: Option<PublicProjectId>,
}

/// A private event. This record is the source of truth for its mirror.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub note: EncodedNote,
    pub time: DateTime<Utc>,
    /// Storage keys in insertion order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub filenames: Vec<String>,
    #[serde(default = "hidden_by_default", deserialize_with = "null_as_hidden")]
    pub hidden: bool,
    #[serde(default)]
    pub project: Option<ProjectRef>,
    #[serde(default, with = "nested_id")]
    pub public_event: Option<PublicEventId>,
    /// Record version used for conditional updates.
    #[serde(rename = "_version", default)]
    pub version: u64,
}

impl Event {
    /// Returns the explicit visibility state encoded by `hidden` and the
    /// mirror link.
    #[must_use]
    pub fn visibility(&self) -> Visibility {
        Visibility::from_flags(self.hidden, self.public_event.clone())
    }

    /// Returns the public project of the owning project, if any.
    #[must_use]
    pub fn public_project(&self) -> Option<&PublicProjectId> {
        self.project.as_ref().and_then(|p| p.public_project.as_ref())
    }

    /// Decodes the note for display.
    pub fn decoded_note(&self) -> Result<String> {
        self.note.decode()
    }
}

/// A public mirror of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicEvent {
    pub id: PublicEventId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub filenames: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub note: EncodedNote,
    pub time: DateTime<Utc>,
    #[serde(default, with = "nested_id")]
    pub public_project: Option<PublicProjectId>,
}

/// The public counterpart of a project. Never created by this client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicProject {
    pub id: PublicProjectId,
    #[serde(default)]
    pub name: Option<String>,
}
