// --- File: crates/seatpick_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// The base error type for all SeatPick errors.
///
/// This enum provides a common set of error variants that can be used across all crates.
/// Each crate can extend this by implementing From<SpecificError> for SeatpickError.
#[derive(Error, Debug)]
pub enum SeatpickError {
    /// The request never reached the server or never returned
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Error occurred while parsing data
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Missing, expired or rejected credential
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// The server refused a malformed request
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error occurred during external service call
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    /// The resource is already taken (e.g. a slot claimed by someone else)
    #[error("Conflict: {0}")]
    ConflictError(String),

    /// Error occurred due to a resource not being found
    #[error("Not found: {0}")]
    NotFoundError(String),

    /// Error occurred due to a timeout
    #[error("Timeout: {0}")]
    TimeoutError(String),

    /// Error occurred due to an internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl SeatpickError {
    /// Builds the error matching a non-success HTTP status returned by `service_name`.
    pub fn from_status(service_name: &str, status: u16, message: String) -> Self {
        match status {
            400 | 422 => SeatpickError::ValidationError(message),
            401 | 403 => SeatpickError::AuthError(message),
            404 => SeatpickError::NotFoundError(message),
            409 => SeatpickError::ConflictError(message),
            408 | 504 => SeatpickError::TimeoutError(message),
            _ => external_service_error(
                service_name,
                format!("Status: {}, Message: {}", status, message),
            ),
        }
    }
}

/// Wraps local I/O failures with what was being attempted.
pub trait Context<T, E> {
    fn with_context<C, F>(self, f: F) -> Result<T, SeatpickError>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E: std::error::Error + Send + Sync + 'static> Context<T, E> for Result<T, E> {
    fn with_context<C, F>(self, f: F) -> Result<T, SeatpickError>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|error| SeatpickError::InternalError(format!("{}: {}", f(), error)))
    }
}

// Common error conversions
impl From<reqwest::Error> for SeatpickError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SeatpickError::TimeoutError(err.to_string())
        } else if err.is_decode() {
            SeatpickError::ParseError(err.to_string())
        } else {
            SeatpickError::HttpError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SeatpickError {
    fn from(err: serde_json::Error) -> Self {
        SeatpickError::ParseError(err.to_string())
    }
}

impl From<std::io::Error> for SeatpickError {
    fn from(err: std::io::Error) -> Self {
        SeatpickError::InternalError(err.to_string())
    }
}

// Utility functions for error handling
pub fn config_error<T: fmt::Display>(message: T) -> SeatpickError {
    SeatpickError::ConfigError(message.to_string())
}

pub fn validation_error<T: fmt::Display>(message: T) -> SeatpickError {
    SeatpickError::ValidationError(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> SeatpickError {
    SeatpickError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_classifies_backend_verdicts() {
        assert!(matches!(
            SeatpickError::from_status("api", 409, "taken".into()),
            SeatpickError::ConflictError(m) if m == "taken"
        ));
        assert!(matches!(
            SeatpickError::from_status("api", 400, "bad date".into()),
            SeatpickError::ValidationError(m) if m == "bad date"
        ));
        assert!(matches!(
            SeatpickError::from_status("api", 401, "expired".into()),
            SeatpickError::AuthError(_)
        ));
        assert!(matches!(
            SeatpickError::from_status("api", 503, "down".into()),
            SeatpickError::ExternalServiceError { .. }
        ));
    }

    #[test]
    fn test_rate_limited_requests_surface_as_service_errors() {
        let err = SeatpickError::from_status("Reservation API", 429, "slow down".into());
        assert_eq!(
            err.to_string(),
            "External service error: Reservation API - Status: 429, Message: slow down"
        );
    }

    #[test]
    fn test_with_context_wraps_io_errors() {
        let result: Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
        let err = result.with_context(|| "writing credentials").unwrap_err();
        assert_eq!(err.to_string(), "Internal error: writing credentials: disk full");
    }
}
