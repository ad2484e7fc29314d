//! Domain error types shared by every layer of the application.
//!
//! Expected failures are described by [`DomainError`] and travel inside a
//! failed [`ResultValue`](crate::ResultValue). When a failure has to unwind
//! the stack it is wrapped in a [`DomainException`] and propagated with `?`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Structured description of an expected failure.
///
/// Error codes follow the `<Component>-<Operation>-<Sequence>` convention,
/// e.g. `GetByIdQuery-E01`.
#[derive(Debug, Clone)]
pub struct DomainError {
    /// Machine-readable error code.
    pub error_code: String,
    /// Human-readable message.
    pub message: String,
    /// Underlying failure, if any.
    pub cause: Option<Arc<anyhow::Error>>,
    /// HTTP-like status code.
    pub status: u16,
}

impl DomainError {
    /// Status used when none is given.
    pub const DEFAULT_STATUS: u16 = 404;

    /// Creates a new error with the default status.
    #[must_use]
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            cause: None,
            status: Self::DEFAULT_STATUS,
        }
    }

    /// Sets the status code.
    #[must_use]
    pub const fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Attaches the underlying failure.
    #[must_use]
    pub fn with_cause(mut self, cause: impl Into<anyhow::Error>) -> Self {
        self.cause = Some(Arc::new(cause.into()));
        self
    }

    /// Replaces the error code, keeping everything else.
    #[must_use]
    pub fn with_error_code(mut self, error_code: impl Into<String>) -> Self {
        self.error_code = error_code.into();
        self
    }

    /// Creates a not found error (404).
    pub fn not_found(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(error_code, message).with_status(404)
    }

    /// Creates a validation error (400).
    pub fn validation(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(error_code, message).with_status(400)
    }

    /// Creates an unauthorized error (401).
    pub fn unauthorized(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(error_code, message).with_status(401)
    }

    /// Creates a forbidden error (403).
    pub fn forbidden(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(error_code, message).with_status(403)
    }

    /// Creates a conflict error (409).
    pub fn conflict(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(error_code, message).with_status(409)
    }

    /// Creates an internal error (500).
    pub fn internal(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(error_code, message).with_status(500)
    }

    /// Display text of the cause, empty when there is none.
    pub fn cause_text(&self) -> String {
        self.cause
            .as_ref()
            .map(|cause| cause.to_string())
            .unwrap_or_default()
    }

    /// Serialized form returned to callers. Never contains a backtrace.
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error_code: self.error_code.clone(),
            message: self.message.clone(),
            exception: self.cause_text(),
        }
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_code, self.message)?;
        if let Some(cause) = &self.cause {
            write!(f, "\nException: {cause}")?;
        }
        Ok(())
    }
}

/// Body of an error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Error code.
    pub error_code: String,
    /// Error message.
    pub message: String,
    /// Display text of the cause.
    pub exception: String,
}

impl From<&DomainError> for ErrorResponse {
    fn from(error: &DomainError) -> Self {
        error.to_response()
    }
}

/// A [`DomainError`] raised for immediate propagation.
#[derive(Error, Debug, Clone)]
#[error("{error}")]
pub struct DomainException {
    error: DomainError,
}

impl DomainException {
    /// Status used by [`DomainException::new`] when none is given.
    pub const DEFAULT_STATUS: u16 = 400;

    /// Creates an exception from a code and message.
    #[must_use]
    pub fn new(error_code: impl Into<String>, message: impl Into<String>, status: Option<u16>) -> Self {
        Self {
            error: DomainError::new(error_code, message)
                .with_status(status.unwrap_or(Self::DEFAULT_STATUS)),
        }
    }

    /// Wraps an existing error.
    #[must_use]
    pub const fn from_error(error: DomainError) -> Self {
        Self { error }
    }

    /// Creates a not found exception (404).
    pub fn not_found(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        DomainError::not_found(error_code, message).into()
    }

    /// Creates a validation exception (400).
    pub fn validation(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        DomainError::validation(error_code, message).into()
    }

    /// Creates an unauthorized exception (401).
    pub fn unauthorized(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        DomainError::unauthorized(error_code, message).into()
    }

    /// Creates a forbidden exception (403).
    pub fn forbidden(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        DomainError::forbidden(error_code, message).into()
    }

    /// Creates a conflict exception (409).
    pub fn conflict(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        DomainError::conflict(error_code, message).into()
    }

    /// Creates an internal exception (500).
    pub fn internal(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        DomainError::internal(error_code, message).into()
    }

    /// The wrapped error.
    pub const fn error(&self) -> &DomainError {
        &self.error
    }

    /// Unwraps the error.
    pub fn into_error(self) -> DomainError {
        self.error
    }

    /// Error code of the wrapped error.
    pub fn error_code(&self) -> &str {
        &self.error.error_code
    }

    /// Status code of the wrapped error.
    pub const fn status(&self) -> u16 {
        self.error.status
    }

    /// Attaches a cause to the wrapped error.
    #[must_use]
    pub fn with_cause(self, cause: impl Into<anyhow::Error>) -> Self {
        Self {
            error: self.error.with_cause(cause),
        }
    }
}

impl From<DomainError> for DomainException {
    fn from(error: DomainError) -> Self {
        Self { error }
    }
}

impl From<DomainException> for DomainError {
    fn from(exception: DomainException) -> Self {
        exception.error
    }
}

impl From<serde_json::Error> for DomainException {
    fn from(err: serde_json::Error) -> Self {
        Self::internal("Serialization-Json-E01", format!("JSON error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_status_is_not_found() {
        let error = DomainError::new("Test-E01", "missing");
        assert_eq!(error.status, 404);
        assert!(error.cause.is_none());
    }

    #[test]
    fn test_exception_default_status_is_bad_request() {
        let exception = DomainException::new("Test-E01", "bad", None);
        assert_eq!(exception.status(), 400);

        let exception = DomainException::new("Test-E01", "gone", Some(410));
        assert_eq!(exception.status(), 410);
    }

    #[test]
    fn test_constructors() {
        assert_eq!(DomainError::validation("A", "b").status, 400);
        assert_eq!(DomainError::unauthorized("A", "b").status, 401);
        assert_eq!(DomainError::forbidden("A", "b").status, 403);
        assert_eq!(DomainError::not_found("A", "b").status, 404);
        assert_eq!(DomainError::conflict("A", "b").status, 409);
        assert_eq!(DomainError::internal("A", "b").status, 500);
    }

    #[test]
    fn test_display_without_cause() {
        let exception = DomainException::new("AddCommand-E01", "Could not add entity", None);
        assert_eq!(exception.to_string(), "AddCommand-E01: Could not add entity");
    }

    #[test]
    fn test_display_with_cause() {
        let error = DomainError::new("Store-E00", "Unhandled exception")
            .with_cause(anyhow::anyhow!("connection reset"));
        assert_eq!(
            error.to_string(),
            "Store-E00: Unhandled exception\nException: connection reset"
        );
    }

    #[test]
    fn test_response_has_no_backtrace() {
        let error = DomainError::new("Store-E00", "Unhandled exception")
            .with_cause(anyhow::anyhow!("timeout"));
        let response = error.to_response();

        assert_eq!(response.error_code, "Store-E00");
        assert_eq!(response.exception, "timeout");

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["errorCode"], "Store-E00");
        assert_eq!(json["message"], "Unhandled exception");
        assert_eq!(json["exception"], "timeout");
        assert_eq!(json.as_object().unwrap().len(), 3);
    }

    #[test]
    fn test_response_without_cause_has_empty_exception() {
        let response = ErrorResponse::from(&DomainError::new("A-E01", "b"));
        assert_eq!(response.exception, "");
    }

    #[test]
    fn test_error_code_override() {
        let error = DomainError::new("Inner-E01", "failed").with_error_code("Outer-E01");
        assert_eq!(error.error_code, "Outer-E01");
        assert_eq!(error.message, "failed");
    }

    #[test]
    fn test_exception_round_trip_through_anyhow() {
        let exception = DomainException::forbidden("AuthCheck-E00", "denied");
        let opaque: anyhow::Error = exception.into();
        let recovered = opaque.downcast::<DomainException>().unwrap();
        assert_eq!(recovered.error_code(), "AuthCheck-E00");
        assert_eq!(recovered.status(), 403);
    }

    #[test]
    fn test_from_serde_error() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let exception = DomainException::from(err);
        assert_eq!(exception.error_code(), "Serialization-Json-E01");
        assert_eq!(exception.status(), 500);
    }
}
