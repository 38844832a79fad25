//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpResponse, test, web};

use crate::domain::ports::{
    MockAccountService, MockCatalogueCommand, MockCatalogueQuery, MockHistoryCommand,
    MockTapCommand,
};
use crate::domain::{
    Beer, BeerId, EntityId, ImageDescriptor, PasswordHash, Pub, PubId, Role, User, UserId,
};

use super::ApiResult;
use super::session::SessionContext;
use super::state::HttpState;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// The session cookie set by `res`.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}

/// Request that signs the test client in as `user_id` without credentials.
pub fn sign_in_request(user_id: UserId) -> test::TestRequest {
    test::TestRequest::post().uri(&format!("/api/v1/test/session/{user_id}"))
}

async fn sign_in(session: SessionContext, path: web::Path<String>) -> ApiResult<HttpResponse> {
    let user_id = UserId::new(path.into_inner()).expect("test user id");
    session.persist_user(user_id)?;
    Ok(HttpResponse::NoContent().finish())
}

/// Mocked driving ports; tests set expectations then call [`Self::into_state`].
#[derive(Default)]
pub struct MockPorts {
    pub accounts: MockAccountService,
    pub catalogue: MockCatalogueCommand,
    pub catalogue_query: MockCatalogueQuery,
    pub taps: MockTapCommand,
    pub history: MockHistoryCommand,
}

impl MockPorts {
    /// Expect `require_admin` for `admin` and answer with it.
    pub fn allow_admin(&mut self, admin: &User) {
        let admin = admin.clone();
        self.accounts
            .expect_require_admin()
            .returning(move |_| Ok(admin.clone()));
    }

    pub fn into_state(self) -> HttpState {
        HttpState::new(
            Arc::new(self.accounts),
            Arc::new(self.catalogue),
            Arc::new(self.catalogue_query),
            Arc::new(self.taps),
            Arc::new(self.history),
        )
    }
}

/// App with `state`, a session-wrapped `/api/v1` scope holding `routes`, and
/// the test sign-in route.
pub fn test_app<F>(
    state: HttpState,
    routes: F,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    F: FnOnce(&mut web::ServiceConfig),
{
    App::new().app_data(web::Data::new(state)).service(
        web::scope("/api/v1")
            .wrap(test_session_middleware())
            .route("/test/session/{user_id}", web::post().to(sign_in))
            .configure(routes),
    )
}

pub fn user(role: Role) -> User {
    User {
        id: UserId::random(),
        name: "Iker".into(),
        surname: "Etxeberria".into(),
        age: 41,
        username: format!("iker-{}", role.as_str()),
        email: format!("iker.{}@example.com", role.as_str()),
        password_hash: PasswordHash::new("sha256$00$00"),
        role,
        tasted: Vec::new(),
        visited: Vec::new(),
    }
}

pub fn beer(name: &str) -> Beer {
    Beer {
        id: BeerId::random(),
        name: name.to_owned(),
        brewer: "Hijos de Rivera".into(),
        style: "Lager".into(),
        alcohol: "5.5%".into(),
        image: ImageDescriptor {
            url: "/images/label.png".into(),
            public_id: "label".into(),
            size: 1024,
            format: "png".into(),
        },
        author: UserId::random(),
        pubs: Vec::new(),
        tasted_by: Vec::new(),
    }
}

pub fn pub_with_taps(taps: u32) -> Pub {
    Pub {
        id: PubId::random(),
        name: "Cervecería Internacional".into(),
        logo: ImageDescriptor::default(),
        address: "Calle Echegaray 21".into(),
        owner: "Marta".into(),
        taps,
        beers: Vec::new(),
    }
}
