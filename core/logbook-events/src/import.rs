//! Project import from a JSON export.
//!
//! ```json
//! {
//!   "name": "Garden",
//!   "projectid": "p-garden",
//!   "public": false,
//!   "events": [
//!     { "id": "e-1", "name": "Planted tomatoes", "filenames": ["t.jpg"] }
//!   ]
//! }
//! ```
//!
//! Ids are kept verbatim; an event exported without one gets a fresh id.
//! Each event name becomes the event's note. Events are always imported
//! hidden. The `public` flag is reported but not carried onto the created
//! project, not even as its `archived` flag.

use crate::error::EventsResult;
use crate::projects::ProjectService;
use chrono::{DateTime, Utc};
use logbook_remote::CreateEventInput;
use logbook_types::{EncodedNote, EventId, Project, ProjectId};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

/// A project export.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImportDocument {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "projectid")]
    pub project_id: ProjectId,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub events: Vec<ImportedEvent>,
}

/// One event of a project export.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImportedEvent {
    #[serde(default)]
    pub id: Option<EventId>,
    /// Note text.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub filenames: Vec<String>,
    #[serde(default)]
    pub time: Option<DateTime<Utc>>,
}

impl ImportDocument {
    pub fn parse(json: &str) -> EventsResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses an export file.
    pub async fn load(path: impl AsRef<Path>) -> EventsResult<Self> {
        let json = tokio::fs::read_to_string(path).await?;
        Self::parse(&json)
    }
}

/// An event the import could not create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportFailure {
    pub event: EventId,
    pub error: String,
}

/// Result of an import.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportReport {
    pub project: Project,
    /// Created events, in document order.
    pub created: Vec<EventId>,
    pub failed: Vec<ImportFailure>,
    /// The export asked for a public project; nothing was published.
    pub public_requested: bool,
}

impl ProjectService {
    /// Replays an export: one project, then its events one by one.
    pub async fn import(&self, document: &ImportDocument) -> EventsResult<ImportReport> {
        self.import_at(document, Utc::now()).await
    }

    /// Like [`import`](Self::import), stamping events without a time with `now`.
    pub async fn import_at(
        &self,
        document: &ImportDocument,
        now: DateTime<Utc>,
    ) -> EventsResult<ImportReport> {
        let project = self
            .create(&document.name, Some(document.project_id.clone()))
            .await
            .inspect_err(|e| warn!("Import of project {} aborted: {}", document.project_id, e))?;

        if document.public {
            warn!(
                "Project {} was exported as public; events are imported private",
                project.id
            );
        }

        let mut created = Vec::with_capacity(document.events.len());
        let mut failed = Vec::new();
        for imported in &document.events {
            let id = imported.id.clone().unwrap_or_else(EventId::generate);
            let input = CreateEventInput {
                id: Some(id.clone()),
                project_id: project.id.clone(),
                note: EncodedNote::encode(&imported.name),
                time: imported.time.unwrap_or(now),
                filenames: imported.filenames.clone(),
                hidden: true,
            };
            match self.data().create_event(input).await {
                Ok(event) => {
                    debug!("Imported event {}", event.id);
                    created.push(event.id);
                }
                Err(e) => {
                    warn!("Failed to import event {}: {}", id, e);
                    failed.push(ImportFailure {
                        event: id,
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Imported project {}: {} event(s) created, {} failed",
            project.id,
            created.len(),
            failed.len()
        );

        Ok(ImportReport {
            project,
            created,
            failed,
            public_requested: document.public,
        })
    }
}

