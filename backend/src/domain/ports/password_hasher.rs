//! Driven port for password hashing.

use crate::domain::PasswordHash;

use super::define_port_error;

define_port_error! {
    /// Failures raised while hashing or verifying a password.
    pub enum PasswordHasherError {
        /// The stored hash is not in a form this hasher understands.
        MalformedHash { message: String } => "stored password hash is malformed: {message}",
        /// The hashing algorithm refused its input or parameters.
        Hashing { message: String } => "password hashing failed: {message}",
    }
}

/// Hash and verify user passwords.
///
/// Implementations are CPU-bound and synchronous; async callers run them on
/// the blocking pool.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Produce a self-describing, salted hash of `password`.
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHasherError>;

    /// Check `password` against a stored hash.
    fn verify(&self, password: &str, hash: &PasswordHash) -> Result<bool, PasswordHasherError>;
}
