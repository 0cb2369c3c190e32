//! Non-fatal inconsistencies found during a transition.

use logbook_types::{EventId, PublicEventId};
use serde::Serialize;
use std::fmt;

/// Something the service reported that does not match what the client
/// expected. The transition still succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InconsistencyWarning {
    /// A public event had no mirror linked when it was made private.
    MissingMirrorLink { event: EventId },
    /// The linked mirror was already gone when it was deleted.
    MirrorAlreadyDeleted {
        event: EventId,
        mirror: PublicEventId,
    },
}

impl fmt::Display for InconsistencyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingMirrorLink { event } => {
                write!(f, "event {event} was public without a linked mirror")
            }
            Self::MirrorAlreadyDeleted { event, mirror } => {
                write!(f, "mirror {mirror} of event {event} was already deleted")
            }
        }
    }
}
