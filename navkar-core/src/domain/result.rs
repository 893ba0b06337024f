//! Result and error types for the core library

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Infrastructure error type for the storage port
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl Error {
    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}

impl From<duckdb::Error> for Error {
    fn from(e: duckdb::Error) -> Self {
        Self::Database(e.to_string())
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Why a login or signup attempt was refused.
///
/// These are reported as data on the failure branch of the auth operations;
/// the `Display` text is what the sign-in form shows.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid email or password. Try demo@navkarbesan.com / password123")]
    InvalidCredentials,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Password must be at least 6 characters long")]
    PasswordTooShort,

    #[error("An account with this email already exists")]
    EmailAlreadyRegistered,

    #[error("Another sign-in request is already in progress")]
    RequestInFlight,

    #[error("Could not save your session: {0}")]
    Storage(String),
}

impl AuthError {
    /// Short machine-readable code, used in the event log
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::PasswordMismatch => "password_mismatch",
            AuthError::PasswordTooShort => "password_too_short",
            AuthError::EmailAlreadyRegistered => "email_already_registered",
            AuthError::RequestInFlight => "request_in_flight",
            AuthError::Storage(_) => "storage",
        }
    }
}

impl From<Error> for AuthError {
    fn from(e: Error) -> Self {
        AuthError::Storage(e.to_string())
    }
}

/// Operation result for JSON output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> OperationResult<T> {
    /// Create a successful result
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create a failed result
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

impl<T, E: std::fmt::Display> From<std::result::Result<T, E>> for OperationResult<T> {
    fn from(result: std::result::Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::fail(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_result_ok() {
        let result: OperationResult<i32> = OperationResult::ok(42);
        assert!(result.success);
        assert_eq!(result.data, Some(42));
        assert!(result.error.is_none());
    }

    #[test]
    fn test_operation_result_fail() {
        let result: OperationResult<i32> = OperationResult::fail("Something went wrong");
        assert!(!result.success);
        assert!(result.data.is_none());
        assert_eq!(result.error, Some("Something went wrong".to_string()));
    }

    #[test]
    fn test_from_auth_result() {
        let err: std::result::Result<i32, AuthError> = Err(AuthError::EmailAlreadyRegistered);
        let result: OperationResult<i32> = err.into();
        assert!(!result.success);
        assert_eq!(
            result.error.unwrap(),
            "An account with this email already exists"
        );
    }

    #[test]
    fn test_storage_error_converts_to_auth_error() {
        let auth: AuthError = Error::storage("disk full").into();
        assert_eq!(auth.code(), "storage");
        assert!(auth.to_string().contains("disk full"));
    }

    #[test]
    fn test_duckdb_error_is_database_error() {
        let err: Error = duckdb::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, Error::Database(_)));

        let auth: AuthError = err.into();
        assert_eq!(auth.code(), "storage");
    }
}
