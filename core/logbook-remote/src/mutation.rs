//! Typed mutations against the remote data service.
//!
//! Every user-supplied value lives in an input struct and is sent as a
//! GraphQL variable; the request document itself only ever contains static
//! operation and type names.

use crate::error::{RemoteError, RemoteResult};
use chrono::{DateTime, Utc};
use logbook_types::{
    EncodedNote, Event, EventId, Project, ProjectId, PublicEvent, PublicEventId, PublicProjectId,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error type the service reports for a conditional update that lost.
pub const CONFLICT_ERROR_TYPES: &[&str] = &["ConflictUnhandled", "ConditionalCheckFailed"];

/// Error type reported when the addressed record does not exist.
pub const NOT_FOUND_ERROR_TYPE: &str = "NotFound";

pub(crate) const EVENT_FIELDS: &str =
    "id note time filenames hidden _version project { id publicProject { id } } publicEvent { id }";
pub(crate) const PUBLIC_EVENT_FIELDS: &str = "id filenames note time publicProject { id }";
pub(crate) const PROJECT_FIELDS: &str = "id name publicProject { id }";
const DELETED_FIELDS: &str = "id";

/// Input for `createEvent`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventInput {
    /// Explicit id; imports preserve ids verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<EventId>,
    #[serde(rename = "eventProjectId")]
    pub project_id: ProjectId,
    pub note: EncodedNote,
    pub time: DateTime<Utc>,
    pub filenames: Vec<String>,
    pub hidden: bool,
}

/// Input for `updateEvent`. Unset fields are left untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventInput {
    pub id: EventId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<EncodedNote>,
    /// `Some(None)` clears the mirror link.
    #[serde(rename = "eventPublicEventId", skip_serializing_if = "Option::is_none")]
    pub public_event_id: Option<Option<PublicEventId>>,
    #[serde(rename = "_version", skip_serializing_if = "Option::is_none")]
    pub expected_version: Option<u64>,
}

impl UpdateEventInput {
    /// Creates an update that changes nothing yet.
    pub fn new(id: EventId) -> Self {
        Self {
            id,
            hidden: None,
            note: None,
            public_event_id: None,
            expected_version: None,
        }
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = Some(hidden);
        self
    }

    pub fn note(mut self, note: EncodedNote) -> Self {
        self.note = Some(note);
        self
    }

    pub fn link_mirror(mut self, mirror: PublicEventId) -> Self {
        self.public_event_id = Some(Some(mirror));
        self
    }

    pub fn unlink_mirror(mut self) -> Self {
        self.public_event_id = Some(None);
        self
    }

    /// Makes the update conditional on the record still being at `version`.
    pub fn expected_version(mut self, version: u64) -> Self {
        self.expected_version = Some(version);
        self
    }
}

/// Input for `createPublicEvent`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePublicEventInput {
    pub filenames: Vec<String>,
    pub note: EncodedNote,
    pub time: DateTime<Utc>,
    #[serde(rename = "publicEventPublicProjectId")]
    pub public_project_id: PublicProjectId,
}

impl CreatePublicEventInput {
    /// Builds a mirror of `event` under `public_project_id`.
    pub fn mirror_of(event: &Event, public_project_id: PublicProjectId) -> Self {
        Self {
            filenames: event.filenames.clone(),
            note: event.note.clone(),
            time: event.time,
            public_project_id,
        }
    }
}

/// Input for `updatePublicEvent`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePublicEventInput {
    pub id: PublicEventId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<EncodedNote>,
}

/// Input for `createProject`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ProjectId>,
    pub name: String,
}

/// Input for every `delete*` mutation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeleteInput<T> {
    pub id: T,
}

/// The mutation operations this client issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MutationKind {
    CreateEvent,
    UpdateEvent,
    DeleteEvent,
    CreatePublicEvent,
    UpdatePublicEvent,
    DeletePublicEvent,
    CreateProject,
    DeleteProject,
}

impl MutationKind {
    /// The operation's field name in the remote schema.
    pub fn operation_name(self) -> &'static str {
        match self {
            MutationKind::CreateEvent => "createEvent",
            MutationKind::UpdateEvent => "updateEvent",
            MutationKind::DeleteEvent => "deleteEvent",
            MutationKind::CreatePublicEvent => "createPublicEvent",
            MutationKind::UpdatePublicEvent => "updatePublicEvent",
            MutationKind::DeletePublicEvent => "deletePublicEvent",
            MutationKind::CreateProject => "createProject",
            MutationKind::DeleteProject => "deleteProject",
        }
    }

    /// The GraphQL input type of the operation's `input` argument.
    pub fn input_type(self) -> &'static str {
        match self {
            MutationKind::CreateEvent => "CreateEventInput",
            MutationKind::UpdateEvent => "UpdateEventInput",
            MutationKind::DeleteEvent => "DeleteEventInput",
            MutationKind::CreatePublicEvent => "CreatePublicEventInput",
            MutationKind::UpdatePublicEvent => "UpdatePublicEventInput",
            MutationKind::DeletePublicEvent => "DeletePublicEventInput",
            MutationKind::CreateProject => "CreateProjectInput",
            MutationKind::DeleteProject => "DeleteProjectInput",
        }
    }

    /// Fields read back from the operation's result.
    pub fn selection(self) -> &'static str {
        match self {
            MutationKind::CreateEvent | MutationKind::UpdateEvent => EVENT_FIELDS,
            MutationKind::CreatePublicEvent | MutationKind::UpdatePublicEvent => {
                PUBLIC_EVENT_FIELDS
            }
            MutationKind::CreateProject => PROJECT_FIELDS,
            MutationKind::DeleteEvent
            | MutationKind::DeletePublicEvent
            | MutationKind::DeleteProject => DELETED_FIELDS,
        }
    }

    /// Parses the operation's result object.
    pub(crate) fn parse_output(self, value: serde_json::Value) -> serde_json::Result<MutationOutput> {
        Ok(match self {
            MutationKind::CreateEvent | MutationKind::UpdateEvent => {
                MutationOutput::Event(serde_json::from_value(value)?)
            }
            MutationKind::CreatePublicEvent | MutationKind::UpdatePublicEvent => {
                MutationOutput::PublicEvent(serde_json::from_value(value)?)
            }
            MutationKind::CreateProject => MutationOutput::Project(serde_json::from_value(value)?),
            MutationKind::DeleteEvent
            | MutationKind::DeletePublicEvent
            | MutationKind::DeleteProject => {
                #[derive(Deserialize)]
                struct Deleted {
                    id: String,
                }
                let deleted: Deleted = serde_json::from_value(value)?;
                MutationOutput::Deleted { id: deleted.id }
            }
        })
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.operation_name())
    }
}

/// A single mutation with its input.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    CreateEvent(CreateEventInput),
    UpdateEvent(UpdateEventInput),
    DeleteEvent(DeleteInput<EventId>),
    CreatePublicEvent(CreatePublicEventInput),
    UpdatePublicEvent(UpdatePublicEventInput),
    DeletePublicEvent(DeleteInput<PublicEventId>),
    CreateProject(CreateProjectInput),
    DeleteProject(DeleteInput<ProjectId>),
}

impl Mutation {
    pub fn delete_event(id: EventId) -> Self {
        Mutation::DeleteEvent(DeleteInput { id })
    }

    pub fn delete_public_event(id: PublicEventId) -> Self {
        Mutation::DeletePublicEvent(DeleteInput { id })
    }

    pub fn delete_project(id: ProjectId) -> Self {
        Mutation::DeleteProject(DeleteInput { id })
    }

    pub fn kind(&self) -> MutationKind {
        match self {
            Mutation::CreateEvent(_) => MutationKind::CreateEvent,
            Mutation::UpdateEvent(_) => MutationKind::UpdateEvent,
            Mutation::DeleteEvent(_) => MutationKind::DeleteEvent,
            Mutation::CreatePublicEvent(_) => MutationKind::CreatePublicEvent,
            Mutation::UpdatePublicEvent(_) => MutationKind::UpdatePublicEvent,
            Mutation::DeletePublicEvent(_) => MutationKind::DeletePublicEvent,
            Mutation::CreateProject(_) => MutationKind::CreateProject,
            Mutation::DeleteProject(_) => MutationKind::DeleteProject,
        }
    }

    /// Serializes the input as the value of the mutation's variable.
    pub fn input_json(&self) -> serde_json::Result<serde_json::Value> {
        match self {
            Mutation::CreateEvent(input) => serde_json::to_value(input),
            Mutation::UpdateEvent(input) => serde_json::to_value(input),
            Mutation::DeleteEvent(input) => serde_json::to_value(input),
            Mutation::CreatePublicEvent(input) => serde_json::to_value(input),
            Mutation::UpdatePublicEvent(input) => serde_json::to_value(input),
            Mutation::DeletePublicEvent(input) => serde_json::to_value(input),
            Mutation::CreateProject(input) => serde_json::to_value(input),
            Mutation::DeleteProject(input) => serde_json::to_value(input),
        }
    }
}

/// Mutations submitted together in one request.
///
/// The service runs each mutation on its own; one failing does not undo
/// the others.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MutationBatch {
    mutations: Vec<Mutation>,
}

impl MutationBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(mutation: Mutation) -> Self {
        Self {
            mutations: vec![mutation],
        }
    }

    pub fn push(&mut self, mutation: Mutation) {
        self.mutations.push(mutation);
    }

    /// Appends a mutation, builder style.
    pub fn with(mut self, mutation: Mutation) -> Self {
        self.push(mutation);
        self
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mutation> {
        self.mutations.iter()
    }

    pub fn kinds(&self) -> Vec<MutationKind> {
        self.mutations.iter().map(Mutation::kind).collect()
    }
}

impl IntoIterator for MutationBatch {
    type Item = Mutation;
    type IntoIter = std::vec::IntoIter<Mutation>;

    fn into_iter(self) -> Self::IntoIter {
        self.mutations.into_iter()
    }
}

/// What a successful mutation returned.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutput {
    Event(Event),
    PublicEvent(PublicEvent),
    Project(Project),
    Deleted { id: String },
}

impl MutationOutput {
    pub fn into_event(self) -> RemoteResult<Event> {
        match self {
            MutationOutput::Event(event) => Ok(event),
            _ => Err(RemoteError::UnexpectedOutput("event")),
        }
    }

    pub fn into_public_event(self) -> RemoteResult<PublicEvent> {
        match self {
            MutationOutput::PublicEvent(mirror) => Ok(mirror),
            _ => Err(RemoteError::UnexpectedOutput("public event")),
        }
    }

    pub fn into_project(self) -> RemoteResult<Project> {
        match self {
            MutationOutput::Project(project) => Ok(project),
            _ => Err(RemoteError::UnexpectedOutput("project")),
        }
    }

    pub fn into_deleted_id(self) -> RemoteResult<String> {
        match self {
            MutationOutput::Deleted { id } => Ok(id),
            _ => Err(RemoteError::UnexpectedOutput("deleted id")),
        }
    }
}

/// A mutation the service rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} failed: {message}")]
pub struct MutationFailure {
    pub kind: MutationKind,
    pub message: String,
    /// Service-specific classification, e.g. `ConflictUnhandled`.
    pub error_type: Option<String>,
}

impl MutationFailure {
    pub fn new(kind: MutationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            error_type: None,
        }
    }

    pub fn with_type(mut self, error_type: impl Into<String>) -> Self {
        self.error_type = Some(error_type.into());
        self
    }

    pub fn is_conflict(&self) -> bool {
        self.error_type
            .as_deref()
            .is_some_and(|t| CONFLICT_ERROR_TYPES.iter().any(|c| t.contains(c)))
    }

    pub fn is_not_found(&self) -> bool {
        self.error_type
            .as_deref()
            .is_some_and(|t| t.contains(NOT_FOUND_ERROR_TYPE))
    }
}

/// Per-mutation result inside a batch.
pub type MutationOutcome = Result<MutationOutput, MutationFailure>;

/// Results of a batch, in submission order.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResponse {
    outcomes: Vec<MutationOutcome>,
}

impl BatchResponse {
    pub fn new(outcomes: Vec<MutationOutcome>) -> Self {
        Self { outcomes }
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Returns true if every mutation succeeded.
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(Result::is_ok)
    }

    pub fn outcome(&self, index: usize) -> Option<&MutationOutcome> {
        self.outcomes.get(index)
    }

    pub fn into_outcomes(self) -> Vec<MutationOutcome> {
        self.outcomes
    }
}
