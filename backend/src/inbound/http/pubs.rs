//! Pub catalogue and tap list handlers.
//!
//! ```text
//! GET    /api/v1/pubs
//! GET    /api/v1/pubs/{id}
//! POST   /api/v1/pubs                         (admin)
//! DELETE /api/v1/pubs/{id}                    (admin)
//! PATCH  /api/v1/pubs/{pubId}/taps/{beerId}   (admin)
//! DELETE /api/v1/pubs/{pubId}/taps/{beerId}   (admin)
//! ```

use std::path::PathBuf;

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::NewPub;
use crate::domain::{BeerId, PubId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::require_admin;
use crate::inbound::http::consistency::relationship_response;
use crate::inbound::http::responses::{PubDetailsResponse, PubResponse};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

/// Body for `POST /api/v1/pubs`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePubRequest {
    pub name: String,
    pub address: String,
    pub owner: String,
    /// Number of taps; a pub never serves more beers than this.
    #[schema(example = 8, maximum = 2147483647)]
    pub taps: u32,
    /// Logo image, relative to the upload staging directory.
    #[schema(value_type = String, example = "logo-puerto.png")]
    pub logo_path: PathBuf,
}

impl From<CreatePubRequest> for NewPub {
    fn from(value: CreatePubRequest) -> Self {
        Self {
            name: value.name,
            address: value.address,
            owner: value.owner,
            taps: value.taps,
            logo_path: value.logo_path,
        }
    }
}

/// Path segments for tap changes.
#[derive(Debug, Deserialize)]
pub struct TapPath {
    pub pub_id: String,
    pub beer_id: String,
}

impl TapPath {
    fn parse(&self) -> ApiResult<(PubId, BeerId)> {
        Ok((
            parse_id(FieldName::new("pubId"), &self.pub_id)?,
            parse_id(FieldName::new("beerId"), &self.beer_id)?,
        ))
    }
}

/// List every pub.
#[utoipa::path(
    get,
    path = "/api/v1/pubs",
    responses(
        (status = 200, description = "Pubs", body = [PubResponse]),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["pubs"],
    operation_id = "listPubs",
    security([])
)]
#[get("/pubs")]
pub async fn list_pubs(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<PubResponse>>> {
    let pubs = state.catalogue_query.list_pubs().await?;
    Ok(web::Json(pubs.into_iter().map(PubResponse::from).collect()))
}

/// Fetch a pub with its beers on tap.
#[utoipa::path(
    get,
    path = "/api/v1/pubs/{id}",
    params(("id" = String, Path, description = "Pub identifier")),
    responses(
        (status = 200, description = "Pub", body = PubDetailsResponse),
        (status = 400, description = "Invalid identifier", body = ErrorSchema),
        (status = 404, description = "Unknown pub", body = ErrorSchema)
    ),
    tags = ["pubs"],
    operation_id = "getPub",
    security([])
)]
#[get("/pubs/{id}")]
pub async fn get_pub(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<PubDetailsResponse>> {
    let pub_id: PubId = parse_id(FieldName::new("id"), &path)?;
    let details = state.catalogue_query.get_pub(pub_id).await?;
    Ok(web::Json(details.into()))
}

/// Open a pub with an empty tap list.
#[utoipa::path(
    post,
    path = "/api/v1/pubs",
    request_body = CreatePubRequest,
    responses(
        (status = 201, description = "Pub created", body = PubResponse),
        (status = 400, description = "Invalid request or logo", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Admin role required", body = ErrorSchema),
        (status = 409, description = "Name already used", body = ErrorSchema)
    ),
    tags = ["pubs"],
    operation_id = "createPub"
)]
#[post("/pubs")]
pub async fn create_pub(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreatePubRequest>,
) -> ApiResult<HttpResponse> {
    require_admin(&state, &session).await?;
    let pub_ = state.catalogue.create_pub(payload.into_inner().into()).await?;
    Ok(HttpResponse::Created().json(PubResponse::from(pub_)))
}

/// Close a pub and remove its logo.
#[utoipa::path(
    delete,
    path = "/api/v1/pubs/{id}",
    params(("id" = String, Path, description = "Pub identifier")),
    responses(
        (status = 200, description = "Deleted pub", body = PubResponse),
        (status = 403, description = "Admin role required", body = ErrorSchema),
        (status = 404, description = "Unknown pub", body = ErrorSchema)
    ),
    tags = ["pubs"],
    operation_id = "deletePub"
)]
#[delete("/pubs/{id}")]
pub async fn delete_pub(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<PubResponse>> {
    require_admin(&state, &session).await?;
    let pub_id: PubId = parse_id(FieldName::new("id"), &path)?;
    let deleted = state.catalogue.delete_pub(pub_id).await?;
    Ok(web::Json(deleted.into()))
}

/// Put a beer on tap.
#[utoipa::path(
    patch,
    path = "/api/v1/pubs/{pubId}/taps/{beerId}",
    params(
        ("pubId" = String, Path, description = "Pub identifier"),
        ("beerId" = String, Path, description = "Beer identifier")
    ),
    responses(
        (
            status = 200,
            description = "Updated pub",
            headers(("Relationship-Consistency" = String, description = "synchronized or partial")),
            body = PubResponse
        ),
        (status = 400, description = "Invalid identifier", body = ErrorSchema),
        (status = 403, description = "Admin role required", body = ErrorSchema),
        (status = 404, description = "Pub or beer not found", body = ErrorSchema),
        (status = 409, description = "Already on tap or no free taps", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["pubs"],
    operation_id = "addBeerToTap"
)]
#[patch("/pubs/{pub_id}/taps/{beer_id}")]
pub async fn add_beer_to_tap(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<TapPath>,
) -> ApiResult<HttpResponse> {
    require_admin(&state, &session).await?;
    let (pub_id, beer_id) = path.parse()?;
    let outcome = state.taps.add_beer_to_tap(pub_id, beer_id).await?;
    Ok(relationship_response(
        PubResponse::from(outcome.primary),
        &outcome.consistency,
    ))
}

/// Take a beer off tap.
#[utoipa::path(
    delete,
    path = "/api/v1/pubs/{pubId}/taps/{beerId}",
    params(
        ("pubId" = String, Path, description = "Pub identifier"),
        ("beerId" = String, Path, description = "Beer identifier")
    ),
    responses(
        (
            status = 200,
            description = "Updated pub",
            headers(("Relationship-Consistency" = String, description = "synchronized or partial")),
            body = PubResponse
        ),
        (status = 403, description = "Admin role required", body = ErrorSchema),
        (status = 404, description = "Pub or beer not found", body = ErrorSchema),
        (status = 409, description = "Beer not on tap", body = ErrorSchema)
    ),
    tags = ["pubs"],
    operation_id = "removeBeerFromTap"
)]
#[delete("/pubs/{pub_id}/taps/{beer_id}")]
pub async fn remove_beer_from_tap(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<TapPath>,
) -> ApiResult<HttpResponse> {
    require_admin(&state, &session).await?;
    let (pub_id, beer_id) = path.parse()?;
    let outcome = state.taps.remove_beer_from_tap(pub_id, beer_id).await?;
    Ok(relationship_response(
        PubResponse::from(outcome.primary),
        &outcome.consistency,
    ))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_pubs)
        .service(get_pub)
        .service(create_pub)
        .service(delete_pub)
        .service(add_beer_to_tap)
        .service(remove_beer_from_tap);
}

#[cfg(test)]
#[path = "pubs_tests.rs"]
mod tests;
