//! Account use-cases: registration, login, profiles and role checks.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::try_join;
use tracing::{info, warn};
use zeroize::Zeroizing;

use super::auth::{LoginCredentials, Registration};
use super::beer::Beer;
use super::catalogue_service::resolve_references;
use super::error::Error;
use super::ids::UserId;
use super::ports::{AccountService, EntityStore, PasswordHasher, UserProfile};
use super::pubs::Pub;
use super::user::{PasswordHash, User, UserDraft, UserFilter};

const INVALID_CREDENTIALS: &str = "invalid email or password";

/// Implements [`AccountService`] over the user store.
pub struct UserAccountService<U: ?Sized, B: ?Sized, P: ?Sized, H: ?Sized> {
    users: Arc<U>,
    beers: Arc<B>,
    pubs: Arc<P>,
    hasher: Arc<H>,
}

impl<U: ?Sized, B: ?Sized, P: ?Sized, H: ?Sized> Clone for UserAccountService<U, B, P, H> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            beers: Arc::clone(&self.beers),
            pubs: Arc::clone(&self.pubs),
            hasher: Arc::clone(&self.hasher),
        }
    }
}

impl<U: ?Sized, B: ?Sized, P: ?Sized, H: ?Sized> UserAccountService<U, B, P, H> {
    pub fn new(users: Arc<U>, beers: Arc<B>, pubs: Arc<P>, hasher: Arc<H>) -> Self {
        Self {
            users,
            beers,
            pubs,
            hasher,
        }
    }
}

impl<U: ?Sized, B: ?Sized, P: ?Sized, H: ?Sized> UserAccountService<U, B, P, H>
where
    U: EntityStore<User>,
{
    async fn find_user(&self, user_id: UserId) -> Result<User, Error> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("user {user_id} not found")))
    }

    async fn ensure_unused(&self, filter: UserFilter, field: &str) -> Result<(), Error> {
        if self.users.find_by(filter).await?.is_empty() {
            Ok(())
        } else {
            Err(Error::conflict(format!("{field} is already registered"))
                .with_details(serde_json::json!({ "field": field, "code": "taken" })))
        }
    }
}

impl<U: ?Sized, B: ?Sized, P: ?Sized, H: ?Sized> UserAccountService<U, B, P, H>
where
    H: PasswordHasher + 'static,
{
    async fn hash_off_thread(&self, password: &str) -> Result<PasswordHash, Error> {
        let hasher = Arc::clone(&self.hasher);
        let password = Zeroizing::new(password.to_owned());
        run_blocking(move || hasher.hash(&password))
            .await?
            .map_err(|err| {
                warn!(error = %err, "password hashing failed");
                Error::internal("password hashing failed")
            })
    }
}

/// Run CPU-bound hashing on the blocking pool so actix workers keep serving.
async fn run_blocking<T, F>(task: F) -> Result<T, Error>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(task).await.map_err(|err| {
        warn!(error = %err, "password task failed");
        Error::internal("password task failed")
    })
}

#[async_trait]
impl<U: ?Sized, B: ?Sized, P: ?Sized, H: ?Sized> AccountService for UserAccountService<U, B, P, H>
where
    U: EntityStore<User> + 'static,
    B: EntityStore<Beer> + 'static,
    P: EntityStore<Pub> + 'static,
    H: PasswordHasher + 'static,
{
    async fn register(&self, registration: Registration) -> Result<User, Error> {
        self.ensure_unused(UserFilter::Email(registration.email().to_owned()), "email")
            .await?;
        self.ensure_unused(
            UserFilter::Username(registration.username().to_owned()),
            "username",
        )
        .await?;

        let password_hash = self.hash_off_thread(registration.password()).await?;
        let draft = UserDraft {
            name: registration.name().to_owned(),
            surname: registration.surname().to_owned(),
            age: registration.age(),
            username: registration.username().to_owned(),
            email: registration.email().to_owned(),
            password_hash,
            role: registration.role(),
        };
        let user = self.users.create(draft).await?;
        info!(user_id = %user.id, role = %user.role, "user registered");
        Ok(user)
    }

    async fn login(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let mut matches = self
            .users
            .find_by(UserFilter::Email(credentials.email().to_owned()))
            .await?;
        let Some(user) = matches.pop() else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        let hasher = Arc::clone(&self.hasher);
        let password = Zeroizing::new(credentials.password().to_owned());
        let stored = user.password_hash.clone();
        let verified = run_blocking(move || hasher.verify(&password, &stored))
            .await?
            .map_err(|err| {
                warn!(user_id = %user.id, error = %err, "stored password hash rejected");
                Error::internal("password verification failed")
            })?;
        if verified {
            Ok(user)
        } else {
            Err(Error::unauthorized(INVALID_CREDENTIALS))
        }
    }

    async fn profile(&self, user_id: UserId) -> Result<UserProfile, Error> {
        let user = self.find_user(user_id).await?;
        let (tasted, visited) = try_join(
            resolve_references(self.beers.as_ref(), &user.tasted),
            resolve_references(self.pubs.as_ref(), &user.visited),
        )
        .await?;
        Ok(UserProfile {
            user,
            tasted,
            visited,
        })
    }

    async fn require_admin(&self, user_id: UserId) -> Result<User, Error> {
        let user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| Error::unauthorized("session user no longer exists"))?;
        if user.is_admin() {
            Ok(user)
        } else {
            Err(Error::forbidden("admin role required"))
        }
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
