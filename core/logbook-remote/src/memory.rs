//! In-memory implementation of [`DataService`].
//!
//! Behaves like the hosted service for the operations this client uses:
//! mutations are individually atomic, updates honor `expectedVersion`,
//! deletes never cascade and references are not cleaned up. It also records
//! every call and can inject failures or park a mutation mid-flight, which
//! makes it the backend for tests and dry runs.

use crate::error::{RemoteError, RemoteResult};
use crate::mutation::{
    BatchResponse, Mutation, MutationBatch, MutationFailure, MutationKind, MutationOutcome,
    MutationOutput, NOT_FOUND_ERROR_TYPE,
};
use crate::service::DataService;
use async_trait::async_trait;
use logbook_types::{
    Event, EventId, Project, ProjectId, ProjectRef, PublicEvent, PublicEventId, PublicProjectId,
};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;
use tracing::debug;

/// A call observed by the in-memory service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    /// One request carrying these mutations, in order.
    Submit(Vec<MutationKind>),
    /// A read query, by operation name.
    Query(&'static str),
}

#[derive(Debug)]
struct FailureRule {
    /// `None` fails the whole request.
    kind: Option<MutationKind>,
    /// Matching mutations to let through before failing.
    skip: usize,
    /// `None` fails forever.
    remaining: Option<usize>,
    message: String,
}

/// Parks the next mutation of one kind until released.
#[derive(Debug, Default)]
pub struct PauseHandle {
    reached: Notify,
    release: Notify,
}

impl PauseHandle {
    /// Waits until a request carrying the paused mutation arrives.
    pub async fn reached(&self) {
        self.reached.notified().await;
    }

    /// Lets the parked request proceed.
    pub fn release(&self) {
        self.release.notify_one();
    }
}

#[derive(Debug, Default)]
struct State {
    projects: BTreeMap<ProjectId, Project>,
    events: BTreeMap<EventId, Event>,
    public_events: BTreeMap<PublicEventId, PublicEvent>,
    next_event: u64,
    next_public_event: u64,
    next_project: u64,
    calls: Vec<RemoteCall>,
    failures: Vec<FailureRule>,
    pauses: Vec<(MutationKind, Arc<PauseHandle>)>,
}

impl State {
    fn take_failure(&mut self, kind: Option<MutationKind>) -> Option<String> {
        let index = self.failures.iter().position(|rule| rule.kind == kind)?;
        let rule = &mut self.failures[index];
        if rule.skip > 0 {
            rule.skip -= 1;
            return None;
        }
        let message = rule.message.clone();
        let exhausted = match rule.remaining.as_mut() {
            Some(n) => {
                *n = n.saturating_sub(1);
                *n == 0
            }
            None => false,
        };
        if exhausted {
            self.failures.remove(index);
        }
        Some(message)
    }

    /// Refreshes the project reference so it reflects the current project.
    fn resolve(&self, event: &Event) -> Event {
        let mut event = event.clone();
        if let Some(project) = event
            .project
            .as_ref()
            .and_then(|p| self.projects.get(&p.id))
        {
            event.project = Some(project.to_ref());
        }
        event
    }

    fn apply(&mut self, mutation: Mutation) -> MutationOutcome {
        let kind = mutation.kind();
        if let Some(message) = self.take_failure(Some(kind)) {
            return Err(MutationFailure::new(kind, message).with_type("InjectedFailure"));
        }

        match mutation {
            Mutation::CreateEvent(input) => {
                let id = match input.id {
                    Some(id) => id,
                    None => {
                        self.next_event += 1;
                        EventId::from(format!("e{}", self.next_event))
                    }
                };
                if self.events.contains_key(&id) {
                    return Err(MutationFailure::new(kind, format!("event {id} already exists"))
                        .with_type("ConditionalCheckFailed"));
                }
                let project = self
                    .projects
                    .get(&input.project_id)
                    .map(Project::to_ref)
                    .unwrap_or(ProjectRef {
                        id: input.project_id,
                        public_project: None,
                    });
                let event = Event {
                    id: id.clone(),
                    note: input.note,
                    time: input.time,
                    filenames: input.filenames,
                    hidden: input.hidden,
                    project: Some(project),
                    public_event: None,
                    version: 1,
                };
                self.events.insert(id, event.clone());
                Ok(MutationOutput::Event(event))
            }
            Mutation::UpdateEvent(input) => {
                let Some(event) = self.events.get_mut(&input.id) else {
                    return Err(not_found(kind, input.id.as_str()));
                };
                if let Some(expected) = input.expected_version {
                    if expected != event.version {
                        return Err(MutationFailure::new(
                            kind,
                            format!(
                                "event {} is at version {}, expected {expected}",
                                event.id, event.version
                            ),
                        )
                        .with_type("ConflictUnhandled"));
                    }
                }
                if let Some(hidden) = input.hidden {
                    event.hidden = hidden;
                }
                if let Some(note) = input.note {
                    event.note = note;
                }
                if let Some(link) = input.public_event_id {
                    event.public_event = link;
                }
                event.version += 1;
                let event = event.clone();
                Ok(MutationOutput::Event(self.resolve(&event)))
            }
            Mutation::DeleteEvent(input) => match self.events.remove(&input.id) {
                Some(_) => Ok(MutationOutput::Deleted {
                    id: input.id.into_inner(),
                }),
                None => Err(not_found(kind, input.id.as_str())),
            },
            Mutation::CreatePublicEvent(input) => {
                self.next_public_event += 1;
                let mirror = PublicEvent {
                    id: PublicEventId::from(format!("pe{}", self.next_public_event)),
                    filenames: input.filenames,
                    note: input.note,
                    time: input.time,
                    public_project: Some(input.public_project_id),
                };
                self.public_events.insert(mirror.id.clone(), mirror.clone());
                Ok(MutationOutput::PublicEvent(mirror))
            }
            Mutation::UpdatePublicEvent(input) => {
                let Some(mirror) = self.public_events.get_mut(&input.id) else {
                    return Err(not_found(kind, input.id.as_str()));
                };
                if let Some(note) = input.note {
                    mirror.note = note;
                }
                Ok(MutationOutput::PublicEvent(mirror.clone()))
            }
            Mutation::DeletePublicEvent(input) => match self.public_events.remove(&input.id) {
                Some(_) => Ok(MutationOutput::Deleted {
                    id: input.id.into_inner(),
                }),
                None => Err(not_found(kind, input.id.as_str())),
            },
            Mutation::CreateProject(input) => {
                let id = match input.id {
                    Some(id) => id,
                    None => {
                        self.next_project += 1;
                        ProjectId::from(format!("project-{}", self.next_project))
                    }
                };
                if self.projects.contains_key(&id) {
                    return Err(
                        MutationFailure::new(kind, format!("project {id} already exists"))
                            .with_type("ConditionalCheckFailed"),
                    );
                }
                let project = Project {
                    id: id.clone(),
                    name: input.name,
                    public_project: None,
                };
                self.projects.insert(id, project.clone());
                Ok(MutationOutput::Project(project))
            }
            Mutation::DeleteProject(input) => match self.projects.remove(&input.id) {
                Some(_) => Ok(MutationOutput::Deleted {
                    id: input.id.into_inner(),
                }),
                None => Err(not_found(kind, input.id.as_str())),
            },
        }
    }
}

fn not_found(kind: MutationKind, id: &str) -> MutationFailure {
    MutationFailure::new(kind, format!("no record with id {id}")).with_type(NOT_FOUND_ERROR_TYPE)
}

/// In-memory data service.
#[derive(Debug, Default)]
pub struct InMemoryDataService {
    state: Mutex<State>,
}

impl InMemoryDataService {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Seeding and inspection ──────────────────────────────────────

    pub fn insert_project(&self, project: Project) {
        self.state().projects.insert(project.id.clone(), project);
    }

    pub fn insert_event(&self, event: Event) {
        self.state().events.insert(event.id.clone(), event);
    }

    pub fn insert_public_event(&self, mirror: PublicEvent) {
        self.state().public_events.insert(mirror.id.clone(), mirror);
    }

    /// Changes a project's public counterpart behind the client's back.
    pub fn set_public_project(&self, project_id: &ProjectId, public: Option<PublicProjectId>) {
        if let Some(project) = self.state().projects.get_mut(project_id) {
            project.public_project = public;
        }
    }

    pub fn event(&self, id: &EventId) -> Option<Event> {
        let state = self.state();
        state.events.get(id).map(|e| state.resolve(e))
    }

    pub fn public_event(&self, id: &PublicEventId) -> Option<PublicEvent> {
        self.state().public_events.get(id).cloned()
    }

    pub fn public_events(&self) -> Vec<PublicEvent> {
        self.state().public_events.values().cloned().collect()
    }

    pub fn project(&self, id: &ProjectId) -> Option<Project> {
        self.state().projects.get(id).cloned()
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<RemoteCall> {
        self.state().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    // ── Failure injection ───────────────────────────────────────────

    /// Rejects the next mutation of `kind`.
    pub fn fail_next(&self, kind: MutationKind, message: impl Into<String>) {
        self.fail_times(kind, 1, message);
    }

    /// Rejects the next `times` mutations of `kind`. Zero times is a no-op.
    pub fn fail_times(&self, kind: MutationKind, times: usize, message: impl Into<String>) {
        if times == 0 {
            return;
        }
        self.state().failures.push(FailureRule {
            kind: Some(kind),
            skip: 0,
            remaining: Some(times),
            message: message.into(),
        });
    }

    /// Lets `skip` mutations of `kind` through, then rejects the next one.
    pub fn fail_after(&self, kind: MutationKind, skip: usize, message: impl Into<String>) {
        self.state().failures.push(FailureRule {
            kind: Some(kind),
            skip,
            remaining: Some(1),
            message: message.into(),
        });
    }

    /// Rejects every mutation of `kind`.
    pub fn fail_always(&self, kind: MutationKind, message: impl Into<String>) {
        self.state().failures.push(FailureRule {
            kind: Some(kind),
            skip: 0,
            remaining: None,
            message: message.into(),
        });
    }

    /// Fails the next request as a whole, like a lost connection.
    pub fn fail_next_request(&self, message: impl Into<String>) {
        self.state().failures.push(FailureRule {
            kind: None,
            skip: 0,
            remaining: Some(1),
            message: message.into(),
        });
    }

    /// Parks the next request that carries a mutation of `kind`.
    pub fn pause_next(&self, kind: MutationKind) -> Arc<PauseHandle> {
        let handle = Arc::new(PauseHandle::default());
        self.state().pauses.push((kind, Arc::clone(&handle)));
        handle
    }

    fn begin(&self, call: RemoteCall) -> RemoteResult<()> {
        let mut state = self.state();
        state.calls.push(call);
        match state.take_failure(None) {
            Some(message) => Err(RemoteError::Api {
                status: 503,
                body: message,
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DataService for InMemoryDataService {
    fn service_name(&self) -> &'static str {
        "in-memory"
    }

    async fn submit(&self, batch: MutationBatch) -> RemoteResult<BatchResponse> {
        let kinds = batch.kinds();
        debug!("in-memory submit: {:?}", kinds);
        self.begin(RemoteCall::Submit(kinds.clone()))?;

        let pause = {
            let mut state = self.state();
            state
                .pauses
                .iter()
                .position(|(kind, _)| kinds.contains(kind))
                .map(|index| state.pauses.remove(index).1)
        };
        if let Some(pause) = pause {
            pause.reached.notify_one();
            pause.release.notified().await;
        }

        let mut state = self.state();
        let outcomes = batch.into_iter().map(|m| state.apply(m)).collect();
        Ok(BatchResponse::new(outcomes))
    }

    async fn list_projects(&self) -> RemoteResult<Vec<Project>> {
        self.begin(RemoteCall::Query("listProjects"))?;
        Ok(self.state().projects.values().cloned().collect())
    }

    async fn get_project(&self, id: &ProjectId) -> RemoteResult<Option<Project>> {
        self.begin(RemoteCall::Query("getProject"))?;
        Ok(self.state().projects.get(id).cloned())
    }

    async fn get_event(&self, id: &EventId) -> RemoteResult<Option<Event>> {
        self.begin(RemoteCall::Query("getEvent"))?;
        Ok(self.event(id))
    }

    async fn get_public_event(&self, id: &PublicEventId) -> RemoteResult<Option<PublicEvent>> {
        self.begin(RemoteCall::Query("getPublicEvent"))?;
        Ok(self.public_event(id))
    }

    async fn list_events(&self, project_id: &ProjectId) -> RemoteResult<Vec<Event>> {
        self.begin(RemoteCall::Query("eventsByProject"))?;
        let state = self.state();
        if !state.projects.contains_key(project_id) {
            return Err(RemoteError::NotFound {
                operation: "getProject",
                message: format!("project {project_id}"),
            });
        }
        let mut events: Vec<Event> = state
            .events
            .values()
            .filter(|e| e.project.as_ref().is_some_and(|p| &p.id == project_id))
            .map(|e| state.resolve(e))
            .collect();
        events.sort_by(|a, b| a.time.cmp(&b.time));
        Ok(events)
    }
}
