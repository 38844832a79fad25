//! Tests for the account service.

use super::*;
use crate::domain::ports::{InMemoryEntityStore, MockPasswordHasher, PasswordHasherError};
use crate::domain::{
    BeerId, EntityId, ErrorCode, ImageDescriptor, PasswordHash, PubId, RegistrationInput, Role,
};
use rstest::{fixture, rstest};

type Service = UserAccountService<
    InMemoryEntityStore<User>,
    InMemoryEntityStore<Beer>,
    InMemoryEntityStore<Pub>,
    MockPasswordHasher,
>;

fn hasher() -> MockPasswordHasher {
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .returning(|password| Ok(PasswordHash::new(format!("plain${password}"))));
    hasher.expect_verify().returning(|password, hash| {
        Ok(hash.as_str() == format!("plain${password}"))
    });
    hasher
}

fn service(
    users: Vec<User>,
    beers: Vec<Beer>,
    pubs: Vec<Pub>,
    hasher: MockPasswordHasher,
) -> Service {
    UserAccountService::new(
        Arc::new(InMemoryEntityStore::with_documents(users)),
        Arc::new(InMemoryEntityStore::with_documents(beers)),
        Arc::new(InMemoryEntityStore::with_documents(pubs)),
        Arc::new(hasher),
    )
}

#[fixture]
fn registration() -> Registration {
    Registration::try_from_input(RegistrationInput {
        name: "Nerea",
        surname: "Olabarria",
        age: 29,
        username: "nerea",
        email: "nerea@example.com",
        password: "txakoli99",
        role: Role::User,
    })
    .expect("valid registration")
}

fn existing_user(role: Role) -> User {
    User {
        id: UserId::random(),
        name: "Jordi".into(),
        surname: "Puig".into(),
        age: 52,
        username: "jordi".into(),
        email: "jordi@example.com".into(),
        password_hash: PasswordHash::new("plain$moritz2024"),
        role,
        tasted: Vec::new(),
        visited: Vec::new(),
    }
}

#[rstest]
#[tokio::test]
async fn register_hashes_the_password(registration: Registration) {
    let service = service(Vec::new(), Vec::new(), Vec::new(), hasher());

    let user = service.register(registration).await.expect("registered");

    assert_eq!(user.password_hash.as_str(), "plain$txakoli99");
    assert!(user.tasted.is_empty());
    assert_eq!(user.role, Role::User);
}

#[rstest]
#[tokio::test]
async fn hashing_runs_off_the_async_worker(registration: Registration) {
    let worker = std::thread::current().id();
    let mut hasher = MockPasswordHasher::new();
    hasher.expect_hash().returning(move |password| {
        assert_ne!(std::thread::current().id(), worker);
        Ok(PasswordHash::new(format!("plain${password}")))
    });
    let service = service(Vec::new(), Vec::new(), Vec::new(), hasher);

    service.register(registration).await.expect("registered");
}

#[rstest]
#[tokio::test]
async fn hashing_failures_are_internal_and_store_nothing(registration: Registration) {
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .returning(|_| Err(PasswordHasherError::hashing("memory cost too low")));
    let users = Arc::new(InMemoryEntityStore::<User>::default());
    let service: Service = UserAccountService::new(
        Arc::clone(&users),
        Arc::new(InMemoryEntityStore::default()),
        Arc::new(InMemoryEntityStore::default()),
        Arc::new(hasher),
    );

    let err = service.register(registration).await.expect_err("hash failed");

    assert_eq!(err.code(), ErrorCode::InternalError);
    assert!(users.list().await.expect("list").is_empty());
}

#[rstest]
#[tokio::test]
async fn register_rejects_taken_email(registration: Registration) {
    let mut taken = existing_user(Role::User);
    taken.email = "nerea@example.com".into();
    let service = service(vec![taken], Vec::new(), Vec::new(), hasher());

    let err = service.register(registration).await.expect_err("email taken");

    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(
        err.details().and_then(|d| d.get("field")).and_then(|v| v.as_str()),
        Some("email")
    );
}

#[rstest]
#[case("jordi@example.com", "moritz2024", true)]
#[case("jordi@example.com", "wrong-pass1", false)]
#[case("nobody@example.com", "moritz2024", false)]
#[tokio::test]
async fn login_fails_uniformly(#[case] email: &str, #[case] password: &str, #[case] ok: bool) {
    let user = existing_user(Role::User);
    let service = service(vec![user.clone()], Vec::new(), Vec::new(), hasher());
    let credentials = LoginCredentials::try_from_parts(email, password).expect("shape");

    match (ok, service.login(&credentials).await) {
        (true, Ok(found)) => assert_eq!(found.id, user.id),
        (false, Err(err)) => {
            assert_eq!(err.code(), ErrorCode::Unauthorized);
            assert_eq!(err.message(), "invalid email or password");
        }
        (true, Err(err)) => panic!("expected success, got {err:?}"),
        (false, Ok(found)) => panic!("expected failure, got {found:?}"),
    }
}

#[tokio::test]
async fn malformed_stored_hash_is_internal() {
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_verify()
        .returning(|_, _| Err(PasswordHasherError::malformed_hash("missing salt")));
    let service = service(vec![existing_user(Role::User)], Vec::new(), Vec::new(), hasher);
    let credentials =
        LoginCredentials::try_from_parts("jordi@example.com", "moritz2024").expect("shape");

    let err = service.login(&credentials).await.expect_err("bad hash");

    assert_eq!(err.code(), ErrorCode::InternalError);
}

#[tokio::test]
async fn profile_resolves_histories_and_skips_dangling_ids() {
    let beer = Beer {
        id: BeerId::random(),
        name: "Cerveza Alhambra".into(),
        brewer: "Alhambra".into(),
        style: "Lager".into(),
        alcohol: "5.4%".into(),
        image: ImageDescriptor::default(),
        author: UserId::random(),
        pubs: Vec::new(),
        tasted_by: Vec::new(),
    };
    let pub_ = Pub {
        id: PubId::random(),
        name: "Bar Manolo".into(),
        logo: ImageDescriptor::default(),
        address: "Calle Real 2".into(),
        owner: "Manolo".into(),
        taps: 2,
        beers: Vec::new(),
    };
    let mut user = existing_user(Role::User);
    user.tasted = vec![beer.id, BeerId::random()];
    user.visited = vec![PubId::random(), pub_.id];
    let service = service(vec![user.clone()], vec![beer.clone()], vec![pub_.clone()], hasher());

    let profile = service.profile(user.id).await.expect("profile");

    assert_eq!(profile.tasted, vec![beer]);
    assert_eq!(profile.visited, vec![pub_]);
    assert_eq!(profile.user.tasted.len(), 2);
}

#[rstest]
#[case(Role::Admin, None)]
#[case(Role::User, Some(ErrorCode::Forbidden))]
#[tokio::test]
async fn require_admin_checks_role(#[case] role: Role, #[case] expected: Option<ErrorCode>) {
    let user = existing_user(role);
    let service = service(vec![user.clone()], Vec::new(), Vec::new(), hasher());

    let result = service.require_admin(user.id).await;

    assert_eq!(result.err().map(|err| err.code()), expected);
}

#[tokio::test]
async fn require_admin_for_unknown_user_is_unauthorized() {
    let service = service(Vec::new(), Vec::new(), Vec::new(), hasher());
    let err = service
        .require_admin(UserId::random())
        .await
        .expect_err("unknown user");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}
