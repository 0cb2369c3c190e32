//! Per-event visibility state.

use crate::PublicEventId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Visibility of an event, derived from its `hidden` flag and mirror link.
///
/// `Private` and `Public` are the consistent states. The other two are only
/// reached when a visibility transition fails partway.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Visibility {
    /// Hidden, no mirror.
    Private,
    /// Visible and linked to its mirror.
    Public { mirror: PublicEventId },
    /// Marked visible but no mirror is linked.
    PendingPublic,
    /// Marked hidden but still linked to a mirror.
    OrphanMirror { mirror: PublicEventId },
}

impl Visibility {
    /// Derives the state from the raw flag pair.
    #[must_use]
    pub fn from_flags(hidden: bool, mirror: Option<PublicEventId>) -> Self {
        match (hidden, mirror) {
            (true, None) => Self::Private,
            (false, Some(mirror)) => Self::Public { mirror },
            (false, None) => Self::PendingPublic,
            (true, Some(mirror)) => Self::OrphanMirror { mirror },
        }
    }

    /// Returns true for `Private` and `Public`.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        matches!(self, Self::Private | Self::Public { .. })
    }

    /// Returns the `hidden` flag this state implies.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        matches!(self, Self::Private | Self::OrphanMirror { .. })
    }

    /// Returns the linked mirror, if any.
    #[must_use]
    pub fn mirror(&self) -> Option<&PublicEventId> {
        match self {
            Self::Public { mirror } | Self::OrphanMirror { mirror } => Some(mirror),
            Self::Private | Self::PendingPublic => None,
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Private => f.write_str("private"),
            Self::Public { mirror } => write!(f, "public (mirror {mirror})"),
            Self::PendingPublic => f.write_str("pending public (no mirror)"),
            Self::OrphanMirror { mirror } => write!(f, "private with orphan mirror {mirror}"),
        }
    }
}
