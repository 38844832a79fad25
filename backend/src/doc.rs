//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every REST handler together with the request and
//! response bodies and the session cookie security scheme. Swagger UI serves
//! it in debug builds.

use crate::inbound::http::beers::CreateBeerRequest;
use crate::inbound::http::health::{HealthResponse, StoreBackend};
use crate::inbound::http::pubs::CreatePubRequest;
use crate::inbound::http::responses::{
    BeerDetailsResponse, BeerResponse, ImageResponse, ProfileResponse, PubDetailsResponse,
    PubResponse, UserResponse,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::users::{LoginRequest, RegisterRequest};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/users/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Taplist API",
        description = "Pubs, beers and drinkers: tap lists and tasting history.",
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::me,
        crate::inbound::http::users::add_tasted_beer,
        crate::inbound::http::users::remove_tasted_beer,
        crate::inbound::http::users::add_visited_pub,
        crate::inbound::http::users::remove_visited_pub,
        crate::inbound::http::beers::list_beers,
        crate::inbound::http::beers::get_beer,
        crate::inbound::http::beers::create_beer,
        crate::inbound::http::beers::delete_beer,
        crate::inbound::http::pubs::list_pubs,
        crate::inbound::http::pubs::get_pub,
        crate::inbound::http::pubs::create_pub,
        crate::inbound::http::pubs::delete_pub,
        crate::inbound::http::pubs::add_beer_to_tap,
        crate::inbound::http::pubs::remove_beer_from_tap,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        RegisterRequest,
        LoginRequest,
        CreateBeerRequest,
        CreatePubRequest,
        ImageResponse,
        BeerResponse,
        BeerDetailsResponse,
        PubResponse,
        PubDetailsResponse,
        UserResponse,
        ProfileResponse,
        HealthResponse,
        StoreBackend,
        ErrorSchema,
        ErrorCodeSchema,
    )),
    tags(
        (name = "users", description = "Accounts, sessions and drinking history"),
        (name = "beers", description = "The beer catalogue"),
        (name = "pubs", description = "Pubs and their tap lists"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
