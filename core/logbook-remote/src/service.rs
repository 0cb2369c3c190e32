//! Remote data service abstraction.
//!
//! Defines the interface every backend (HTTP GraphQL, in-memory) provides.

use crate::error::{RemoteError, RemoteResult};
use crate::mutation::{
    BatchResponse, CreateEventInput, CreateProjectInput, CreatePublicEventInput, Mutation,
    MutationBatch, MutationOutput, UpdateEventInput, UpdatePublicEventInput,
};
use async_trait::async_trait;
use logbook_types::{Event, EventId, Project, ProjectId, PublicEvent, PublicEventId};

/// Abstract remote data service.
///
/// Each mutation is atomic on its own; nothing spans mutations, including
/// the mutations of one batch.
#[async_trait]
pub trait DataService: Send + Sync {
    /// Returns a short name of the backend, for logs.
    fn service_name(&self) -> &'static str;

    /// Submits a batch of mutations in one request.
    ///
    /// `Err` means the request as a whole failed; per-mutation failures are
    /// reported inside the response.
    async fn submit(&self, batch: MutationBatch) -> RemoteResult<BatchResponse>;

    /// Lists all projects of the signed-in user.
    async fn list_projects(&self) -> RemoteResult<Vec<Project>>;

    /// Fetches a project.
    async fn get_project(&self, id: &ProjectId) -> RemoteResult<Option<Project>>;

    /// Fetches an event.
    async fn get_event(&self, id: &EventId) -> RemoteResult<Option<Event>>;

    /// Fetches a public mirror.
    async fn get_public_event(&self, id: &PublicEventId) -> RemoteResult<Option<PublicEvent>>;

    /// Lists the events of a project, oldest first.
    async fn list_events(&self, project_id: &ProjectId) -> RemoteResult<Vec<Event>>;

    /// Submits a single mutation and returns its output.
    async fn submit_one(&self, mutation: Mutation) -> RemoteResult<MutationOutput> {
        let kind = mutation.kind();
        self.submit(MutationBatch::single(mutation))
            .await?
            .into_outcomes()
            .into_iter()
            .next()
            .ok_or_else(|| RemoteError::MissingData(kind.operation_name().to_string()))?
            .map_err(RemoteError::from)
    }

    async fn create_event(&self, input: CreateEventInput) -> RemoteResult<Event> {
        self.submit_one(Mutation::CreateEvent(input)).await?.into_event()
    }

    async fn update_event(&self, input: UpdateEventInput) -> RemoteResult<Event> {
        self.submit_one(Mutation::UpdateEvent(input)).await?.into_event()
    }

    async fn delete_event(&self, id: EventId) -> RemoteResult<()> {
        self.submit_one(Mutation::delete_event(id)).await?.into_deleted_id()?;
        Ok(())
    }

    async fn create_public_event(&self, input: CreatePublicEventInput) -> RemoteResult<PublicEvent> {
        self.submit_one(Mutation::CreatePublicEvent(input))
            .await?
            .into_public_event()
    }

    async fn update_public_event(&self, input: UpdatePublicEventInput) -> RemoteResult<PublicEvent> {
        self.submit_one(Mutation::UpdatePublicEvent(input))
            .await?
            .into_public_event()
    }

    async fn delete_public_event(&self, id: PublicEventId) -> RemoteResult<()> {
        self.submit_one(Mutation::delete_public_event(id))
            .await?
            .into_deleted_id()?;
        Ok(())
    }

    async fn create_project(&self, input: CreateProjectInput) -> RemoteResult<Project> {
        self.submit_one(Mutation::CreateProject(input)).await?.into_project()
    }

    async fn delete_project(&self, id: ProjectId) -> RemoteResult<()> {
        self.submit_one(Mutation::delete_project(id)).await?.into_deleted_id()?;
        Ok(())
    }
}
