//! Account and history handlers.
//!
//! ```text
//! POST   /api/v1/users/register
//! POST   /api/v1/users/login
//! POST   /api/v1/users/logout
//! GET    /api/v1/users/me
//! PATCH  /api/v1/users/me/tasted/{beerId}
//! DELETE /api/v1/users/me/tasted/{beerId}
//! PATCH  /api/v1/users/me/visited/{pubId}
//! DELETE /api/v1/users/me/visited/{pubId}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    BeerId, Error, LoginCredentials, PubId, Registration, RegistrationInput, Role,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::admin_id;
use crate::inbound::http::consistency::relationship_response;
use crate::inbound::http::responses::{ProfileResponse, UserResponse};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, map_login_validation_error, map_registration_error, parse_id, parse_role,
};

const PRIVATE_NO_CACHE: (&str, &str) = ("Cache-Control", "private, no-cache, must-revalidate");

/// Registration body for `POST /api/v1/users/register`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub surname: String,
    #[schema(example = 30, minimum = 18, maximum = 100)]
    pub age: i64,
    pub username: String,
    #[schema(example = "ana@example.com")]
    pub email: String,
    pub password: String,
    /// `user` (default) or `admin`.
    pub role: Option<String>,
}

/// Login body for `POST /api/v1/users/login`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = Error;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.email, &value.password).map_err(map_login_validation_error)
    }
}

/// Register a new account.
///
/// The admin role can only be requested by an admin session unless admin
/// self-registration is enabled.
#[utoipa::path(
    post,
    path = "/api/v1/users/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Admin role not allowed", body = ErrorSchema),
        (status = 409, description = "Email or username taken", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "register",
    security([])
)]
#[post("/users/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let role = parse_role(payload.role.as_deref())?;
    if role == Role::Admin
        && !state.allow_admin_signup
        && admin_id(&state, &session).await?.is_none()
    {
        return Err(Error::forbidden("only admins can create admin accounts"));
    }

    let registration = Registration::try_from_input(RegistrationInput {
        name: &payload.name,
        surname: &payload.surname,
        age: payload.age,
        username: &payload.username,
        email: &payload.email,
        password: &payload.password,
        role,
    })
    .map_err(map_registration_error)?;
    let user = state.accounts.register(registration).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/users/login",
    request_body = LoginRequest,
    responses(
        (
            status = 200,
            description = "Login success",
            headers(("Set-Cookie" = String, description = "Session cookie")),
            body = UserResponse
        ),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/users/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = LoginCredentials::try_from(payload.into_inner())?;
    let user = state.accounts.login(&credentials).await?;
    session.persist_user(user.id)?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// End the current session.
#[utoipa::path(
    post,
    path = "/api/v1/users/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["users"],
    operation_id = "logout"
)]
#[post("/users/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.forget();
    HttpResponse::NoContent().finish()
}

/// The caller's account with tasted beers and visited pubs resolved.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "Account no longer exists", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn me(state: web::Data<HttpState>, session: SessionContext) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let profile = state.accounts.profile(user_id).await?;
    Ok(HttpResponse::Ok()
        .insert_header(PRIVATE_NO_CACHE)
        .json(ProfileResponse::from(profile)))
}

/// Record a tasted beer.
#[utoipa::path(
    patch,
    path = "/api/v1/users/me/tasted/{beerId}",
    params(("beerId" = String, Path, description = "Beer identifier")),
    responses(
        (
            status = 200,
            description = "Updated user",
            headers(("Relationship-Consistency" = String, description = "synchronized or partial")),
            body = UserResponse
        ),
        (status = 400, description = "Invalid identifier", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "User or beer not found", body = ErrorSchema),
        (status = 409, description = "Already tasted", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "addTastedBeer"
)]
#[patch("/users/me/tasted/{beer_id}")]
pub async fn add_tasted_beer(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let beer_id: BeerId = parse_id(FieldName::new("beerId"), &path)?;
    let outcome = state.history.add_tasted_beer(user_id, beer_id).await?;
    Ok(relationship_response(
        UserResponse::from(outcome.primary),
        &outcome.consistency,
    ))
}

/// Forget a tasted beer.
#[utoipa::path(
    delete,
    path = "/api/v1/users/me/tasted/{beerId}",
    params(("beerId" = String, Path, description = "Beer identifier")),
    responses(
        (
            status = 200,
            description = "Updated user",
            headers(("Relationship-Consistency" = String, description = "synchronized or partial")),
            body = UserResponse
        ),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "User or beer not found", body = ErrorSchema),
        (status = 409, description = "Beer not tasted", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "removeTastedBeer"
)]
#[delete("/users/me/tasted/{beer_id}")]
pub async fn remove_tasted_beer(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let beer_id: BeerId = parse_id(FieldName::new("beerId"), &path)?;
    let outcome = state.history.remove_tasted_beer(user_id, beer_id).await?;
    Ok(relationship_response(
        UserResponse::from(outcome.primary),
        &outcome.consistency,
    ))
}

/// Record a visited pub.
#[utoipa::path(
    patch,
    path = "/api/v1/users/me/visited/{pubId}",
    params(("pubId" = String, Path, description = "Pub identifier")),
    responses(
        (
            status = 200,
            description = "Updated user",
            headers(("Relationship-Consistency" = String, description = "Always synchronized")),
            body = UserResponse
        ),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "User or pub not found", body = ErrorSchema),
        (status = 409, description = "Already visited", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "addVisitedPub"
)]
#[patch("/users/me/visited/{pub_id}")]
pub async fn add_visited_pub(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let pub_id: PubId = parse_id(FieldName::new("pubId"), &path)?;
    let outcome = state.history.add_visited_pub(user_id, pub_id).await?;
    Ok(relationship_response(
        UserResponse::from(outcome.primary),
        &outcome.consistency,
    ))
}

/// Forget a visited pub.
#[utoipa::path(
    delete,
    path = "/api/v1/users/me/visited/{pubId}",
    params(("pubId" = String, Path, description = "Pub identifier")),
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "User or pub not found", body = ErrorSchema),
        (status = 409, description = "Pub not visited", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "removeVisitedPub"
)]
#[delete("/users/me/visited/{pub_id}")]
pub async fn remove_visited_pub(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let pub_id: PubId = parse_id(FieldName::new("pubId"), &path)?;
    let outcome = state.history.remove_visited_pub(user_id, pub_id).await?;
    Ok(relationship_response(
        UserResponse::from(outcome.primary),
        &outcome.consistency,
    ))
}

/// Register every handler in this module.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(register)
        .service(login)
        .service(logout)
        .service(me)
        .service(add_tasted_beer)
        .service(remove_tasted_beer)
        .service(add_visited_pub)
        .service(remove_visited_pub);
}
