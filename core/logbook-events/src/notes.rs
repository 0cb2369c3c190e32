//! Note editing.

use crate::error::EventsResult;
use crate::service::EventService;
use logbook_remote::{Mutation, MutationBatch, RemoteError, UpdateEventInput, UpdatePublicEventInput};
use logbook_types::{EncodedNote, Event};
use serde::Serialize;
use tracing::{debug, info, warn};

/// What happened to the mirror's copy of the note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum MirrorSync {
    /// The event has no mirror.
    NoMirror,
    /// The note did not change, nothing was sent.
    Unchanged,
    Updated,
    /// The event was updated but its mirror was not.
    Failed(String),
}

/// Result of a note edit.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteEdit {
    pub event: Event,
    pub changed: bool,
    pub mirror: MirrorSync,
}

impl EventService {
    /// Replaces the note of `event`, and of its mirror if it has one, in a
    /// single request.
    pub async fn edit_note(&self, event: &Event, text: &str) -> EventsResult<NoteEdit> {
        let note = EncodedNote::encode(text);
        if note == event.note {
            debug!("Note of event {} unchanged", event.id);
            return Ok(NoteEdit {
                event: event.clone(),
                changed: false,
                mirror: MirrorSync::Unchanged,
            });
        }

        let mut batch = MutationBatch::single(Mutation::UpdateEvent(
            UpdateEventInput::new(event.id.clone())
                .note(note.clone())
                .expected_version(event.version),
        ));
        if let Some(mirror) = &event.public_event {
            batch.push(Mutation::UpdatePublicEvent(UpdatePublicEventInput {
                id: mirror.clone(),
                note: Some(note),
            }));
        }

        let mut outcomes = self.data().submit(batch).await?.into_outcomes().into_iter();
        let updated = outcomes
            .next()
            .ok_or_else(|| RemoteError::MissingData("updateEvent".to_string()))?
            .map_err(RemoteError::from)?
            .into_event()?;

        let mirror = match outcomes.next() {
            None => MirrorSync::NoMirror,
            Some(Ok(_)) => MirrorSync::Updated,
            Some(Err(failure)) => {
                warn!("Mirror of event {} kept its old note: {}", updated.id, failure);
                MirrorSync::Failed(failure.message)
            }
        };

        info!("Updated note of event {}", updated.id);
        Ok(NoteEdit {
            event: updated,
            changed: true,
            mirror,
        })
    }
}
