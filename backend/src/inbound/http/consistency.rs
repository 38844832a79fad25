//! Response helper for relationship changes.

use actix_web::HttpResponse;
use serde::Serialize;
use tracing::warn;

use crate::domain::Consistency;

/// Response header reporting whether both sides of a relation were written.
pub const RELATIONSHIP_CONSISTENCY_HEADER: &str = "Relationship-Consistency";

/// `200 OK` with `body` and the consistency header.
pub(crate) fn relationship_response<T: Serialize>(
    body: T,
    consistency: &Consistency,
) -> HttpResponse {
    if let Consistency::Partial { entity, reason } = consistency {
        warn!(%entity, %reason, "responding with partially applied relationship change");
    }
    HttpResponse::Ok()
        .insert_header((RELATIONSHIP_CONSISTENCY_HEADER, consistency.as_str()))
        .json(body)
}
