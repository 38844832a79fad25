//! Beer catalogue handlers.
//!
//! ```text
//! GET    /api/v1/beers
//! GET    /api/v1/beers/{id}
//! POST   /api/v1/beers        (admin)
//! DELETE /api/v1/beers/{id}   (admin)
//! ```

use std::path::PathBuf;

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::BeerId;
use crate::domain::ports::NewBeer;
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::require_admin;
use crate::inbound::http::responses::{BeerDetailsResponse, BeerResponse};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

/// Body for `POST /api/v1/beers`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBeerRequest {
    pub name: String,
    pub brewer: String,
    pub style: String,
    #[schema(example = "6.4%")]
    pub alcohol: String,
    /// Label image, relative to the upload staging directory.
    #[schema(value_type = String, example = "label-7f3a.png")]
    pub image_path: PathBuf,
}

impl From<CreateBeerRequest> for NewBeer {
    fn from(value: CreateBeerRequest) -> Self {
        Self {
            name: value.name,
            brewer: value.brewer,
            style: value.style,
            alcohol: value.alcohol,
            image_path: value.image_path,
        }
    }
}

/// List every beer.
#[utoipa::path(
    get,
    path = "/api/v1/beers",
    responses(
        (status = 200, description = "Beers", body = [BeerResponse]),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["beers"],
    operation_id = "listBeers",
    security([])
)]
#[get("/beers")]
pub async fn list_beers(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<BeerResponse>>> {
    let beers = state.catalogue_query.list_beers().await?;
    Ok(web::Json(beers.into_iter().map(BeerResponse::from).collect()))
}

/// Fetch a beer with the pubs serving it.
#[utoipa::path(
    get,
    path = "/api/v1/beers/{id}",
    params(("id" = String, Path, description = "Beer identifier")),
    responses(
        (status = 200, description = "Beer", body = BeerDetailsResponse),
        (status = 400, description = "Invalid identifier", body = ErrorSchema),
        (status = 404, description = "Unknown beer", body = ErrorSchema)
    ),
    tags = ["beers"],
    operation_id = "getBeer",
    security([])
)]
#[get("/beers/{id}")]
pub async fn get_beer(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<BeerDetailsResponse>> {
    let beer_id: BeerId = parse_id(FieldName::new("id"), &path)?;
    let details = state.catalogue_query.get_beer(beer_id).await?;
    Ok(web::Json(details.into()))
}

/// Add a beer; the caller becomes its author.
#[utoipa::path(
    post,
    path = "/api/v1/beers",
    request_body = CreateBeerRequest,
    responses(
        (status = 201, description = "Beer created", body = BeerResponse),
        (status = 400, description = "Invalid request or image", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Admin role required", body = ErrorSchema),
        (status = 409, description = "Name already used", body = ErrorSchema)
    ),
    tags = ["beers"],
    operation_id = "createBeer"
)]
#[post("/beers")]
pub async fn create_beer(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateBeerRequest>,
) -> ApiResult<HttpResponse> {
    let admin = require_admin(&state, &session).await?;
    let beer = state
        .catalogue
        .create_beer(admin.id, payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(BeerResponse::from(beer)))
}

/// Remove a beer and its label image.
#[utoipa::path(
    delete,
    path = "/api/v1/beers/{id}",
    params(("id" = String, Path, description = "Beer identifier")),
    responses(
        (status = 200, description = "Deleted beer", body = BeerResponse),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Admin role required", body = ErrorSchema),
        (status = 404, description = "Unknown beer", body = ErrorSchema)
    ),
    tags = ["beers"],
    operation_id = "deleteBeer"
)]
#[delete("/beers/{id}")]
pub async fn delete_beer(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<BeerResponse>> {
    require_admin(&state, &session).await?;
    let beer_id: BeerId = parse_id(FieldName::new("id"), &path)?;
    let deleted = state.catalogue.delete_beer(beer_id).await?;
    Ok(web::Json(deleted.into()))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_beers)
        .service(get_beer)
        .service(create_beer)
        .service(delete_beer);
}
