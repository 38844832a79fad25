//! Authentication primitives: login credentials and registration input.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use zeroize::Zeroizing;

use super::user::Role;

/// Youngest age accepted at registration.
pub const MIN_AGE: u8 = 18;
/// Oldest age accepted at registration.
pub const MAX_AGE: u8 = 100;
/// Minimum password length in characters.
pub const PASSWORD_MIN: usize = 8;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        #[expect(
            clippy::expect_used,
            reason = "email pattern is a compile-time constant"
        )]
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex")
    })
}

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    EmptyEmail,
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials used by the account service.
///
/// ## Invariants
/// - `email` is trimmed, lowercased and non-empty.
/// - `password` is non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use taplist::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" Ana@Example.com ", "s3cretpass").unwrap();
/// assert_eq!(creds.email(), "ana@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = normalize_email(email);
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            email: normalized,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validation failures for [`Registration`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationValidationError {
    EmptyField { field: &'static str },
    InvalidEmail,
    AgeOutOfRange { min: u8, max: u8 },
    WeakPassword { min: usize },
}

impl fmt::Display for RegistrationValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyField { field } => write!(f, "{field} must not be empty"),
            Self::InvalidEmail => write!(f, "email must be a valid address"),
            Self::AgeOutOfRange { min, max } => {
                write!(f, "age must be between {min} and {max}")
            }
            Self::WeakPassword { min } => write!(
                f,
                "password must be at least {min} characters and contain a letter and a digit",
            ),
        }
    }
}

impl std::error::Error for RegistrationValidationError {}

impl RegistrationValidationError {
    /// Name of the offending input field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyField { field } => field,
            Self::InvalidEmail => "email",
            Self::AgeOutOfRange { .. } => "age",
            Self::WeakPassword { .. } => "password",
        }
    }
}

/// Raw registration values as received from an inbound adapter.
#[derive(Debug, Clone)]
pub struct RegistrationInput<'a> {
    pub name: &'a str,
    pub surname: &'a str,
    pub age: i64,
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub role: Role,
}

/// Validated registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    name: String,
    surname: String,
    age: u8,
    username: String,
    email: String,
    password: Zeroizing<String>,
    role: Role,
}

impl Registration {
    pub fn try_from_input(
        input: RegistrationInput<'_>,
    ) -> Result<Self, RegistrationValidationError> {
        let name = required("name", input.name)?;
        let surname = required("surname", input.surname)?;
        let username = required("username", input.username)?;

        let email = normalize_email(input.email);
        if email.is_empty() {
            return Err(RegistrationValidationError::EmptyField { field: "email" });
        }
        if !email_regex().is_match(&email) {
            return Err(RegistrationValidationError::InvalidEmail);
        }

        let age = u8::try_from(input.age)
            .ok()
            .filter(|age| (MIN_AGE..=MAX_AGE).contains(age))
            .ok_or(RegistrationValidationError::AgeOutOfRange {
                min: MIN_AGE,
                max: MAX_AGE,
            })?;

        if !is_strong_password(input.password) {
            return Err(RegistrationValidationError::WeakPassword { min: PASSWORD_MIN });
        }

        Ok(Self {
            name,
            surname,
            age,
            username,
            email,
            password: Zeroizing::new(input.password.to_owned()),
            role: input.role,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn surname(&self) -> &str {
        &self.surname
    }

    pub fn age(&self) -> u8 {
        self.age
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    pub fn role(&self) -> Role {
        self.role
    }
}

fn required(field: &'static str, value: &str) -> Result<String, RegistrationValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RegistrationValidationError::EmptyField { field });
    }
    Ok(trimmed.to_owned())
}

fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn is_strong_password(password: &str) -> bool {
    password.chars().count() >= PASSWORD_MIN
        && password.chars().any(char::is_alphabetic)
        && password.chars().any(|c| c.is_ascii_digit())
}
