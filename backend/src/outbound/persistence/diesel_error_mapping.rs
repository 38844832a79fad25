//! Diesel error mapping shared by the entity stores.

use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::EntityKind;
use crate::domain::ports::StoreError;

/// Column named by a unique index such as `users_email_key`.
fn unique_field<'a>(kind: EntityKind, constraint: &'a str) -> &'a str {
    let table_prefix = match kind {
        EntityKind::Beer => "beers_",
        EntityKind::Pub => "pubs_",
        EntityKind::User => "users_",
    };
    constraint
        .strip_prefix(table_prefix)
        .and_then(|rest| rest.strip_suffix("_key"))
        .unwrap_or(constraint)
}

fn conflict(kind: EntityKind, info: &dyn DatabaseErrorInformation) -> StoreError {
    match info.constraint_name() {
        Some(constraint) => StoreError::conflict(format!(
            "{kind} with the same {} already exists",
            unique_field(kind, constraint)
        )),
        None => StoreError::conflict(format!("{kind} already exists")),
    }
}

/// Map a Diesel failure for `operation` on a `kind` collection.
///
/// Unique violations become conflicts, dropped connections become connection
/// errors and everything else is a query error.
pub(crate) fn map_diesel_error(
    kind: EntityKind,
    operation: &'static str,
) -> impl FnOnce(DieselError) -> StoreError {
    move |error| {
        match &error {
            DieselError::DatabaseError(db_kind, info) => {
                debug!(
                    %kind,
                    %operation,
                    ?db_kind,
                    message = info.message(),
                    "diesel operation failed"
                );
            }
            other => debug!(%kind, %operation, error = %other, "diesel operation failed"),
        }

        match error {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                conflict(kind, info.as_ref())
            }
            DieselError::DatabaseError(
                DatabaseErrorKind::ClosedConnection | DatabaseErrorKind::UnableToSendCommand,
                info,
            ) => StoreError::connection(info.message().to_owned()),
            DieselError::BrokenTransactionManager => {
                StoreError::connection("transaction manager broken")
            }
            other => StoreError::query(format!("{operation} {kind}: {other}")),
        }
    }
}

/// Stored column could not be turned back into a domain value.
pub(crate) fn corrupt_row(
    kind: EntityKind,
    column: &str,
    reason: impl std::fmt::Display,
) -> StoreError {
    StoreError::query(format!("stored {kind} has invalid {column}: {reason}"))
}
