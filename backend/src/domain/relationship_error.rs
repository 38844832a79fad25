//! Typed failures and outcomes of relationship operations.
//!
//! Every failure names the entity kind and the relation it concerns, carries
//! one specific message, and converts deterministically into the transport
//! agnostic [`Error`].

use std::fmt;

use serde_json::json;
use thiserror::Error as ThisError;

use super::entity::EntityKind;
use super::error::Error;
use super::ids::PubId;
use super::ports::StoreError;

/// Which side of a relationship an entity plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRole {
    /// The entity whose list is changed first.
    Primary,
    /// The entity being added to or removed from the primary's list.
    Related,
}

/// The relation lists managed by the relationship service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// `Pub::beers`, mirrored by `Beer::pubs`.
    Tap,
    /// `User::tasted`, mirrored by `Beer::tasted_by`.
    Tasted,
    /// `User::visited`; not mirrored.
    Visited,
}

impl RelationKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tap => "tap",
            Self::Tasted => "tasted",
            Self::Visited => "visited",
        }
    }

    const fn list_name(self) -> &'static str {
        match self {
            Self::Tap => "tap list",
            Self::Tasted => "tasted beers",
            Self::Visited => "visited pubs",
        }
    }

    const fn duplicate_code(self) -> &'static str {
        match self {
            Self::Tap => "already_on_tap",
            Self::Tasted => "already_tasted",
            Self::Visited => "already_visited",
        }
    }

    const fn missing_code(self) -> &'static str {
        match self {
            Self::Tap => "not_on_tap",
            Self::Tasted => "not_tasted",
            Self::Visited => "not_visited",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.list_name())
    }
}

/// An entity named by kind and id, displayed as `"pub 3fa8…"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: String,
}

impl EntityRef {
    pub fn new(kind: EntityKind, id: impl fmt::Display) -> Self {
        Self {
            kind,
            id: id.to_string(),
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

/// The first invariant a relationship operation found violated.
#[derive(Debug, ThisError)]
pub enum RelationshipError {
    #[error("{entity} not found")]
    NotFound {
        role: EntityRole,
        entity: EntityRef,
        relation: RelationKind,
    },
    #[error("{related} is already in the {relation} of {primary}")]
    Duplicate {
        relation: RelationKind,
        primary: EntityRef,
        related: EntityRef,
    },
    #[error("{related} is not in the {relation} of {primary}")]
    Missing {
        relation: RelationKind,
        primary: EntityRef,
        related: EntityRef,
    },
    #[error("pub {pub_id} has no free taps ({on_tap} of {taps} in use)")]
    CapacityExceeded {
        pub_id: PubId,
        taps: u32,
        on_tap: usize,
    },
    #[error("update of {entity} in the {relation} returned no document")]
    UpdateFailed {
        entity: EntityRef,
        relation: RelationKind,
    },
    #[error("{kind} store failed while changing the {relation}: {source}")]
    Store {
        kind: EntityKind,
        relation: RelationKind,
        #[source]
        source: StoreError,
    },
}

impl RelationshipError {
    /// Stable identifier placed in `details.code` of the converted error.
    pub fn detail_code(&self) -> Option<String> {
        match self {
            Self::NotFound { entity, .. } => Some(format!("{}_not_found", entity.kind)),
            Self::Duplicate { relation, .. } => Some(relation.duplicate_code().to_owned()),
            Self::Missing { relation, .. } => Some(relation.missing_code().to_owned()),
            Self::CapacityExceeded { .. } => Some("capacity_exceeded".to_owned()),
            Self::UpdateFailed { .. } => Some("update_failed".to_owned()),
            Self::Store { .. } => None,
        }
    }

    pub const fn relation(&self) -> RelationKind {
        match self {
            Self::NotFound { relation, .. }
            | Self::Duplicate { relation, .. }
            | Self::Missing { relation, .. }
            | Self::UpdateFailed { relation, .. }
            | Self::Store { relation, .. } => *relation,
            Self::CapacityExceeded { .. } => RelationKind::Tap,
        }
    }
}

/// Map a store failure on `kind` while changing `relation`.
pub(crate) fn store_failure(
    kind: EntityKind,
    relation: RelationKind,
) -> impl FnOnce(StoreError) -> RelationshipError {
    move |source| RelationshipError::Store {
        kind,
        relation,
        source,
    }
}

impl From<RelationshipError> for Error {
    fn from(err: RelationshipError) -> Self {
        let message = err.to_string();
        let details = |code: String| {
            json!({
                "code": code,
                "relation": err.relation().as_str(),
            })
        };
        match &err {
            RelationshipError::NotFound { .. } | RelationshipError::UpdateFailed { .. } => {
                let code = err.detail_code().unwrap_or_default();
                Error::not_found(message).with_details(details(code))
            }
            RelationshipError::Duplicate { .. }
            | RelationshipError::Missing { .. }
            | RelationshipError::CapacityExceeded { .. } => {
                let code = err.detail_code().unwrap_or_default();
                Error::conflict(message).with_details(details(code))
            }
            RelationshipError::Store { source, .. } => match source {
                StoreError::Connection { .. } => Error::service_unavailable(message),
                StoreError::Query { .. } => Error::internal(message),
                StoreError::Conflict { .. } => Error::conflict(message),
            },
        }
    }
}

/// Whether both sides of a relationship were written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Consistency {
    /// Primary list and back reference agree.
    Synchronized,
    /// The primary write succeeded but the back reference on `entity` was
    /// not written.
    Partial { entity: EntityRef, reason: String },
}

impl Consistency {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Synchronized => "synchronized",
            Self::Partial { .. } => "partial",
        }
    }

    pub const fn is_synchronized(&self) -> bool {
        matches!(self, Self::Synchronized)
    }
}

/// Result of a successful relationship change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipOutcome<P, R> {
    /// The primary entity as written.
    pub primary: P,
    /// The related entity after its back reference was written. `None` when
    /// the relation has no back reference or the back reference failed.
    pub related: Option<R>,
    pub consistency: Consistency,
}
