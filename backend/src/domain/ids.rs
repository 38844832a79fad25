//! Strongly typed entity identifiers.
//!
//! Every identifier wraps a UUID and is surfaced to callers as its hyphenated
//! string form. Relation lists hold identifiers only, so equality between
//! entities is always decided by id.

use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Validation errors raised when parsing an identifier from caller input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdValidationError {
    /// Identifier was missing or blank.
    #[error("{entity} id must not be empty")]
    Empty { entity: &'static str },
    /// Identifier was not a hyphenated UUID.
    #[error("{entity} id must be a valid UUID")]
    Invalid { entity: &'static str },
}

/// Behaviour shared by all entity identifiers.
pub trait EntityId:
    Copy + Eq + Hash + Ord + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    /// Generate a fresh identifier for a newly created document.
    fn random() -> Self;

    /// Wrap a UUID read back from storage.
    fn from_uuid(uuid: Uuid) -> Self;

    /// Access the underlying UUID.
    fn as_uuid(&self) -> &Uuid;
}

macro_rules! define_entity_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(Uuid);

        impl $name {
            /// Validate and construct the identifier from caller input.
            pub fn new(id: impl AsRef<str>) -> Result<Self, IdValidationError> {
                let raw = id.as_ref();
                if raw.trim().is_empty() {
                    return Err(IdValidationError::Empty { entity: $label });
                }
                if raw.trim() != raw {
                    return Err(IdValidationError::Invalid { entity: $label });
                }
                Uuid::parse_str(raw)
                    .map(Self)
                    .map_err(|_| IdValidationError::Invalid { entity: $label })
            }
        }

        impl EntityId for $name {
            fn random() -> Self {
                Self(Uuid::new_v4())
            }

            fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.to_string()
            }
        }
    };
}

define_entity_id!(
    /// Identifier of a [`crate::domain::Beer`].
    BeerId,
    "beer"
);
define_entity_id!(
    /// Identifier of a [`crate::domain::Pub`].
    PubId,
    "pub"
);
define_entity_id!(
    /// Identifier of a [`crate::domain::User`].
    UserId,
    "user"
);

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", IdValidationError::Empty { entity: "pub" })]
    #[case("   ", IdValidationError::Empty { entity: "pub" })]
    #[case("p1", IdValidationError::Invalid { entity: "pub" })]
    #[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6", IdValidationError::Invalid { entity: "pub" })]
    fn rejects_malformed_ids(#[case] raw: &str, #[case] expected: IdValidationError) {
        let err = PubId::new(raw).expect_err("malformed id must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn accepts_hyphenated_uuid() {
        let id = BeerId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("valid id");
        assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    }

    #[rstest]
    fn serde_uses_plain_strings() {
        let id = UserId::random();
        let json = serde_json::to_value(id).expect("serialise id");
        assert_eq!(json, serde_json::Value::String(id.to_string()));

        let back: UserId = serde_json::from_value(json).expect("deserialise id");
        assert_eq!(back, id);
    }

    #[rstest]
    fn error_message_names_the_entity() {
        let err = UserId::new("nope").expect_err("invalid");
        assert_eq!(err.to_string(), "user id must be a valid UUID");
    }
}
