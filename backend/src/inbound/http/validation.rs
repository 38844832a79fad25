//! Shared validation helpers for inbound HTTP adapters.

use std::str::FromStr;

use serde_json::json;

use crate::domain::{
    Error, IdValidationError, LoginValidationError, RegistrationValidationError, Role,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidRole,
    InvalidEmail,
    OutOfRange,
    WeakPassword,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidRole => "invalid_role",
            ErrorCode::InvalidEmail => "invalid_email",
            ErrorCode::OutOfRange => "out_of_range",
            ErrorCode::WeakPassword => "weak_password",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &'static str {
        self.0
    }
}

fn field_error(field: &str, message: impl Into<String>, code: ErrorCode) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code.as_str(),
    }))
}

fn field_error_with_value(
    field: &str,
    message: impl Into<String>,
    code: ErrorCode,
    value: &str,
) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "value": value,
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    field_error(
        field.as_str(),
        format!("missing required field: {}", field.as_str()),
        ErrorCode::MissingField,
    )
}

/// Parse a path or body identifier, reporting the offending field.
pub(crate) fn parse_id<I>(field: FieldName, raw: &str) -> Result<I, Error>
where
    I: FromStr<Err = IdValidationError>,
{
    raw.parse().map_err(|err: IdValidationError| {
        let code = match err {
            IdValidationError::Empty { .. } => ErrorCode::MissingField,
            IdValidationError::Invalid { .. } => ErrorCode::InvalidUuid,
        };
        field_error_with_value(field.as_str(), err.to_string(), code, raw)
    })
}

/// Parse an optional role name. Absent means the default role.
pub(crate) fn parse_role(raw: Option<&str>) -> Result<Role, Error> {
    match raw {
        None => Ok(Role::default()),
        Some(value) => value.parse().map_err(|_| {
            field_error_with_value(
                "role",
                "role must be admin or user",
                ErrorCode::InvalidRole,
                value,
            )
        }),
    }
}

pub(crate) fn map_login_validation_error(err: LoginValidationError) -> Error {
    let field = match err {
        LoginValidationError::EmptyEmail => "email",
        LoginValidationError::EmptyPassword => "password",
    };
    field_error(field, err.to_string(), ErrorCode::MissingField)
}

pub(crate) fn map_registration_error(err: RegistrationValidationError) -> Error {
    let code = match err {
        RegistrationValidationError::EmptyField { .. } => ErrorCode::MissingField,
        RegistrationValidationError::InvalidEmail => ErrorCode::InvalidEmail,
        RegistrationValidationError::AgeOutOfRange { .. } => ErrorCode::OutOfRange,
        RegistrationValidationError::WeakPassword { .. } => ErrorCode::WeakPassword,
    };
    field_error(err.field(), err.to_string(), code)
}
