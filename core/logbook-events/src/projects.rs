//! Project management.

use crate::error::{EventsError, EventsResult};
use logbook_remote::{CreateProjectInput, DataService};
use logbook_types::{Event, Project, ProjectId};
use std::sync::Arc;
use tracing::info;

/// Lists, creates and deletes projects, and imports them from JSON.
#[derive(Clone)]
pub struct ProjectService {
    data: Arc<dyn DataService>,
}

impl ProjectService {
    pub fn new(data: Arc<dyn DataService>) -> Self {
        Self { data }
    }

    pub(crate) fn data(&self) -> &Arc<dyn DataService> {
        &self.data
    }

    /// Lists all projects.
    pub async fn list(&self) -> EventsResult<Vec<Project>> {
        Ok(self.data.list_projects().await?)
    }

    /// Fetches one project.
    pub async fn get(&self, id: &ProjectId) -> EventsResult<Project> {
        self.data
            .get_project(id)
            .await?
            .ok_or_else(|| EventsError::NotFound(format!("project {id}")))
    }

    /// Lists the events of a project, oldest first.
    pub async fn events(&self, id: &ProjectId) -> EventsResult<Vec<Event>> {
        Ok(self.data.list_events(id).await?)
    }

    /// Creates a private project. The service assigns an id unless one is given.
    pub async fn create(&self, name: &str, id: Option<ProjectId>) -> EventsResult<Project> {
        let project = self
            .data
            .create_project(CreateProjectInput {
                id,
                name: name.to_string(),
            })
            .await?;
        info!("Created project {} ({})", project.id, project.name);
        Ok(project)
    }

    /// Deletes a project. Its events are left to the service.
    pub async fn delete(&self, id: ProjectId) -> EventsResult<()> {
        self.data.delete_project(id.clone()).await?;
        info!("Deleted project {}", id);
        Ok(())
    }
}
