//! OpenAPI schema definitions for domain types.
//!
//! The domain does not derive `ToSchema`; these mirrors register its error
//! payload with utoipa from the adapter layer instead.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    #[schema(rename = "unauthorized")]
    Unauthorized,
    #[schema(rename = "forbidden")]
    Forbidden,
    #[schema(rename = "not_found")]
    NotFound,
    /// Duplicate relation, full tap list, or a taken unique field.
    #[schema(rename = "conflict")]
    Conflict,
    /// The entity store could not be reached.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
///
/// Relationship failures put a machine-readable reason such as
/// `capacity_exceeded` or `already_tasted` in `details.code`.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    #[schema(example = "conflict")]
    code: ErrorCodeSchema,
    #[schema(example = "pub 3fa85f64-5717-4562-b3fc-2c963f66afa6 has no free taps (4 of 4 in use)")]
    message: String,
    #[schema(example = "01HZY8B2W6X5Y7Z9ABCD1234")]
    trace_id: Option<String>,
    #[schema(example = json!({"code": "capacity_exceeded", "relation": "tap"}))]
    details: Option<serde_json::Value>,
}
