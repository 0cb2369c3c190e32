//! Public/private visibility transitions.
//!
//! Publishing an event creates a [`PublicEvent`] mirror under the project's
//! public counterpart and links it from the event; unpublishing deletes the
//! mirror and clears the link. Each step is its own remote call and commits
//! on its own, so a failure partway leaves the event in one of the
//! intermediate [`Visibility`] states. Those are never repaired implicitly:
//! [`EventService::reconcile`] takes an explicit [`ReconcileDecision`].
//!
//! State-changing event updates carry the version of the snapshot they were
//! derived from, so a write based on a stale snapshot is rejected by the
//! service instead of overwriting a newer state.

use crate::error::{VisibilityError, VisibilityResult};
use crate::service::EventService;
use crate::warning::InconsistencyWarning;
use logbook_remote::{CreatePublicEventInput, RemoteError, UpdateEventInput};
use logbook_types::{Event, PublicEvent, PublicEventId, Visibility};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

/// One remote call of a visibility transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SagaStep {
    /// `updateEvent { hidden: false }`
    Publish,
    /// `createPublicEvent`
    CreateMirror,
    /// `updateEvent { eventPublicEventId: <mirror> }`
    LinkMirror,
    /// `updateEvent { hidden: true }`
    Unpublish,
    /// `deletePublicEvent`
    DeleteMirror,
    /// `updateEvent { eventPublicEventId: null }`
    UnlinkMirror,
    /// `getPublicEvent` before reusing an existing mirror
    VerifyMirror,
}

impl SagaStep {
    pub fn as_str(self) -> &'static str {
        match self {
            SagaStep::Publish => "publish",
            SagaStep::CreateMirror => "create mirror",
            SagaStep::LinkMirror => "link mirror",
            SagaStep::Unpublish => "unpublish",
            SagaStep::DeleteMirror => "delete mirror",
            SagaStep::UnlinkMirror => "unlink mirror",
            SagaStep::VerifyMirror => "verify mirror",
        }
    }
}

impl fmt::Display for SagaStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How to repair a stranded event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileDecision {
    /// `PendingPublic`: link a mirror that already exists.
    ReuseMirror(PublicEventId),
    /// `PendingPublic`: create and link a new mirror.
    CreateMirror,
    /// `PendingPublic`: mark the event hidden again.
    RevertToPrivate,
    /// `OrphanMirror`: delete the mirror and clear the link.
    DeleteMirror,
    /// `OrphanMirror`: mark the event visible and keep the link.
    Republish,
}

impl fmt::Display for ReconcileDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReuseMirror(mirror) => write!(f, "reuse mirror {mirror}"),
            Self::CreateMirror => f.write_str("create mirror"),
            Self::RevertToPrivate => f.write_str("revert to private"),
            Self::DeleteMirror => f.write_str("delete mirror"),
            Self::Republish => f.write_str("republish"),
        }
    }
}

/// A completed visibility transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// The event as the service last returned it.
    pub event: Event,
    pub from: Visibility,
    pub to: Visibility,
    /// The mirror the event is public through after this transition.
    pub mirror: Option<PublicEvent>,
    pub warnings: Vec<InconsistencyWarning>,
}

fn step_failed(
    step: SagaStep,
    snapshot: &Event,
    orphan: Option<PublicEventId>,
    source: RemoteError,
) -> VisibilityError {
    let state = snapshot.visibility();
    warn!(
        "{} failed for event {} (left {}): {}",
        step, snapshot.id, state, source
    );
    VisibilityError::Remote {
        step,
        event: Box::new(snapshot.clone()),
        state,
        orphan,
        source,
    }
}

fn finish(
    from: Visibility,
    event: Event,
    mirror: Option<PublicEvent>,
    warnings: Vec<InconsistencyWarning>,
) -> Transition {
    let to = event.visibility();
    info!("Event {} moved from {} to {}", event.id, from, to);
    Transition {
        event,
        from,
        to,
        mirror,
        warnings,
    }
}

impl EventService {
    /// Flips an event between private and public.
    ///
    /// Fails without any remote call if the owning project has no public
    /// counterpart, if the event is in an intermediate state, or if another
    /// transition of the same event is in flight.
    pub async fn toggle_visibility(&self, event: &Event) -> VisibilityResult<Transition> {
        if event.public_project().is_none() {
            return Err(VisibilityError::ProjectNotPublic {
                event: event.id.clone(),
            });
        }

        let from = event.visibility();
        if !from.is_consistent() {
            return Err(VisibilityError::Stranded {
                event: event.id.clone(),
                state: from,
            });
        }

        let _guard = self.lock(&event.id)?;
        match from {
            Visibility::Private => self.publish(event).await,
            _ => self.unpublish(event).await,
        }
    }

    /// Applies `decision` to an event stranded in an intermediate state.
    pub async fn reconcile(
        &self,
        event: &Event,
        decision: ReconcileDecision,
    ) -> VisibilityResult<Transition> {
        let from = event.visibility();
        if from.is_consistent() {
            return Err(VisibilityError::NothingToReconcile {
                event: event.id.clone(),
                state: from,
            });
        }

        let _guard = self.lock(&event.id)?;
        debug!("Reconciling event {} ({}): {}", event.id, from, decision);

        match (from.clone(), decision) {
            (Visibility::PendingPublic, ReconcileDecision::ReuseMirror(mirror)) => {
                let found = self.verify_mirror(event, &mirror).await?;
                let linked = self
                    .update_step(
                        SagaStep::LinkMirror,
                        event,
                        UpdateEventInput::new(event.id.clone()).link_mirror(found.id.clone()),
                        Some(&found.id),
                    )
                    .await?;
                Ok(finish(from, linked, Some(found), Vec::new()))
            }
            (Visibility::PendingPublic, ReconcileDecision::CreateMirror) => {
                if event.public_project().is_none() {
                    return Err(VisibilityError::ProjectNotPublic {
                        event: event.id.clone(),
                    });
                }
                let (linked, mirror) = self.attach_mirror(event).await?;
                Ok(finish(from, linked, Some(mirror), Vec::new()))
            }
            (Visibility::PendingPublic, ReconcileDecision::RevertToPrivate) => {
                let reverted = self
                    .update_step(
                        SagaStep::Unpublish,
                        event,
                        UpdateEventInput::new(event.id.clone()).hidden(true),
                        None,
                    )
                    .await?;
                Ok(finish(from, reverted, None, Vec::new()))
            }
            (Visibility::OrphanMirror { mirror }, ReconcileDecision::DeleteMirror) => {
                let mut warnings = Vec::new();
                let detached = self.detach_mirror(event, mirror, &mut warnings).await?;
                Ok(finish(from, detached, None, warnings))
            }
            (Visibility::OrphanMirror { mirror }, ReconcileDecision::Republish) => {
                let found = self.verify_mirror(event, &mirror).await?;
                let republished = self
                    .update_step(
                        SagaStep::Publish,
                        event,
                        UpdateEventInput::new(event.id.clone()).hidden(false),
                        None,
                    )
                    .await?;
                Ok(finish(from, republished, Some(found), Vec::new()))
            }
            (state, decision) => Err(VisibilityError::InvalidDecision { state, decision }),
        }
    }

    async fn publish(&self, event: &Event) -> VisibilityResult<Transition> {
        let from = event.visibility();
        let marked = self
            .update_step(
                SagaStep::Publish,
                event,
                UpdateEventInput::new(event.id.clone()).hidden(false),
                None,
            )
            .await?;

        let (linked, mirror) = self.attach_mirror(&marked).await?;
        Ok(finish(from, linked, Some(mirror), Vec::new()))
    }

    async fn unpublish(&self, event: &Event) -> VisibilityResult<Transition> {
        let from = event.visibility();
        let marked = self
            .update_step(
                SagaStep::Unpublish,
                event,
                UpdateEventInput::new(event.id.clone()).hidden(true),
                None,
            )
            .await?;

        let mut warnings = Vec::new();
        let done = match marked.public_event.clone() {
            Some(mirror) => self.detach_mirror(&marked, mirror, &mut warnings).await?,
            None => {
                let warning = InconsistencyWarning::MissingMirrorLink {
                    event: marked.id.clone(),
                };
                warn!("{}", warning);
                warnings.push(warning);
                marked
            }
        };
        Ok(finish(from, done, None, warnings))
    }

    /// Creates a mirror of `event` and links it.
    async fn attach_mirror(&self, event: &Event) -> VisibilityResult<(Event, PublicEvent)> {
        let Some(public_project) = event.public_project().cloned() else {
            warn!(
                "Public project of event {} disappeared, left {}",
                event.id,
                event.visibility()
            );
            return Err(VisibilityError::PublicProjectMissing {
                event: Box::new(event.clone()),
            });
        };

        debug!("{} for event {}", SagaStep::CreateMirror, event.id);
        let mirror = self
            .data()
            .create_public_event(CreatePublicEventInput::mirror_of(event, public_project))
            .await
            .map_err(|source| step_failed(SagaStep::CreateMirror, event, None, source))?;

        let linked = self
            .update_step(
                SagaStep::LinkMirror,
                event,
                UpdateEventInput::new(event.id.clone()).link_mirror(mirror.id.clone()),
                Some(&mirror.id),
            )
            .await?;
        Ok((linked, mirror))
    }

    /// Deletes `mirror` and clears the event's link to it.
    async fn detach_mirror(
        &self,
        event: &Event,
        mirror: PublicEventId,
        warnings: &mut Vec<InconsistencyWarning>,
    ) -> VisibilityResult<Event> {
        debug!("{} {} of event {}", SagaStep::DeleteMirror, mirror, event.id);
        match self.data().delete_public_event(mirror.clone()).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                let warning = InconsistencyWarning::MirrorAlreadyDeleted {
                    event: event.id.clone(),
                    mirror,
                };
                warn!("{}", warning);
                warnings.push(warning);
            }
            Err(source) => return Err(step_failed(SagaStep::DeleteMirror, event, None, source)),
        }

        self.update_step(
            SagaStep::UnlinkMirror,
            event,
            UpdateEventInput::new(event.id.clone()).unlink_mirror(),
            None,
        )
        .await
    }

    /// Checks that `mirror` exists, sits under the event's public project and
    /// is not linked by any other event of the project.
    async fn verify_mirror(
        &self,
        event: &Event,
        mirror: &PublicEventId,
    ) -> VisibilityResult<PublicEvent> {
        let Some(expected) = event.public_project().cloned() else {
            return Err(VisibilityError::ProjectNotPublic {
                event: event.id.clone(),
            });
        };

        debug!("{} {} for event {}", SagaStep::VerifyMirror, mirror, event.id);
        let found = self
            .data()
            .get_public_event(mirror)
            .await
            .map_err(|source| step_failed(SagaStep::VerifyMirror, event, None, source))?
            .ok_or_else(|| {
                step_failed(
                    SagaStep::VerifyMirror,
                    event,
                    None,
                    RemoteError::NotFound {
                        operation: "getPublicEvent",
                        message: format!("public event {mirror}"),
                    },
                )
            })?;

        if found.public_project.as_ref() != Some(&expected) {
            warn!(
                "Mirror {} is under {:?}, event {} publishes to {}",
                mirror, found.public_project, event.id, expected
            );
            return Err(VisibilityError::MirrorMismatch {
                event: event.id.clone(),
                mirror: mirror.clone(),
                expected,
                found: found.public_project,
            });
        }

        if let Some(project) = &event.project {
            let siblings = self
                .data()
                .list_events(&project.id)
                .await
                .map_err(|source| step_failed(SagaStep::VerifyMirror, event, None, source))?;
            if let Some(other) = siblings
                .into_iter()
                .find(|e| e.id != event.id && e.public_event.as_ref() == Some(mirror))
            {
                warn!("Mirror {} is already linked by event {}", mirror, other.id);
                return Err(VisibilityError::MirrorInUse {
                    event: event.id.clone(),
                    mirror: mirror.clone(),
                    linked_by: other.id,
                });
            }
        }

        Ok(found)
    }

    /// Issues one conditional event update of a transition.
    async fn update_step(
        &self,
        step: SagaStep,
        snapshot: &Event,
        input: UpdateEventInput,
        orphan: Option<&PublicEventId>,
    ) -> VisibilityResult<Event> {
        debug!("{} event {} at version {}", step, snapshot.id, snapshot.version);
        self.data()
            .update_event(input.expected_version(snapshot.version))
            .await
            .map_err(|source| step_failed(step, snapshot, orphan.cloned(), source))
    }
}
