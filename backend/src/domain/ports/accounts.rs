//! Driving ports for registration, login and profiles.

use async_trait::async_trait;

use crate::domain::{Beer, Error, LoginCredentials, Pub, Registration, User, UserId};

/// A user with both history lists resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub user: User,
    pub tasted: Vec<Beer>,
    pub visited: Vec<Pub>,
}

/// Account use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Create a user. Email and username must be unused.
    async fn register(&self, registration: Registration) -> Result<User, Error>;

    /// Authenticate credentials and return the matching user.
    ///
    /// Unknown emails and wrong passwords fail identically.
    async fn login(&self, credentials: &LoginCredentials) -> Result<User, Error>;

    async fn profile(&self, user_id: UserId) -> Result<UserProfile, Error>;

    /// Fail with `Forbidden` unless the user exists and is an admin.
    async fn require_admin(&self, user_id: UserId) -> Result<User, Error>;
}
