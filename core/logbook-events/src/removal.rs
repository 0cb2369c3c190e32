//! Event deletion.

use crate::service::EventService;
use logbook_remote::{Mutation, MutationBatch, MutationOutcome};
use logbook_types::Event;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Outcome of deleting one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum RemovalOutcome {
    Deleted,
    /// The record did not exist.
    AlreadyGone,
    Failed(String),
    /// Nothing to delete.
    Skipped,
}

impl RemovalOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, RemovalOutcome::Failed(_))
    }

    fn from_outcome(outcome: Option<MutationOutcome>) -> Self {
        match outcome {
            Some(Ok(_)) => RemovalOutcome::Deleted,
            Some(Err(failure)) if failure.is_not_found() => RemovalOutcome::AlreadyGone,
            Some(Err(failure)) => RemovalOutcome::Failed(failure.to_string()),
            None => RemovalOutcome::Failed("response is missing the outcome".to_string()),
        }
    }
}

/// A file that could not be removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub key: String,
    pub error: String,
}

/// Result of deleting an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteReport {
    pub event: RemovalOutcome,
    pub mirror: RemovalOutcome,
    /// Keys removed from the object store, in order.
    pub removed: Vec<String>,
    pub failed: Vec<FileFailure>,
}

impl DeleteReport {
    /// Returns true if nothing failed.
    pub fn is_complete(&self) -> bool {
        !self.event.is_failed() && !self.mirror.is_failed() && self.failed.is_empty()
    }
}

impl EventService {
    /// Deletes an event and its mirror, then removes its files.
    ///
    /// File removal runs whatever the outcome of the deletes, and one failed
    /// removal does not stop the others.
    pub async fn delete_event(&self, event: &Event) -> DeleteReport {
        let mut batch = MutationBatch::single(Mutation::delete_event(event.id.clone()));
        if let Some(mirror) = &event.public_event {
            batch.push(Mutation::delete_public_event(mirror.clone()));
        }
        let has_mirror = batch.len() > 1;

        let (event_outcome, mirror_outcome) = match self.data().submit(batch).await {
            Ok(response) => {
                let mut outcomes = response.into_outcomes().into_iter();
                let event_outcome = RemovalOutcome::from_outcome(outcomes.next());
                let mirror_outcome = if has_mirror {
                    RemovalOutcome::from_outcome(outcomes.next())
                } else {
                    RemovalOutcome::Skipped
                };
                (event_outcome, mirror_outcome)
            }
            Err(e) => {
                warn!("Delete request for event {} failed: {}", event.id, e);
                let mirror_outcome = if has_mirror {
                    RemovalOutcome::Failed(e.to_string())
                } else {
                    RemovalOutcome::Skipped
                };
                (RemovalOutcome::Failed(e.to_string()), mirror_outcome)
            }
        };

        let mut removed = Vec::new();
        let mut failed = Vec::new();
        for key in &event.filenames {
            debug!("Removing {} from {}", key, self.store().store_name());
            match self.store().remove(key).await {
                Ok(()) => removed.push(key.clone()),
                Err(e) => {
                    warn!("Failed to remove {} of event {}: {}", key, event.id, e);
                    failed.push(FileFailure {
                        key: key.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Deleted event {}: event {:?}, mirror {:?}, {} file(s) removed, {} failed",
            event.id,
            event_outcome,
            mirror_outcome,
            removed.len(),
            failed.len()
        );

        DeleteReport {
            event: event_outcome,
            mirror: mirror_outcome,
            removed,
            failed,
        }
    }
}
