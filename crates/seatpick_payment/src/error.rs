// --- File: crates/seatpick_payment/src/error.rs ---
use seatpick_common::{external_service_error, SeatpickError};
use thiserror::Error;

/// Payment gateway error types.
#[derive(Error, Debug)]
pub enum PaymentError {
    /// No payment module is wired up, so the widget cannot be invoked
    #[error("Payment module is unavailable")]
    GatewayUnavailable,

    /// Error occurred while delivering the request to the gateway
    #[error("Payment gateway request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Error returned by the gateway
    #[error("Payment gateway returned an error: {message} (Status: {status_code})")]
    ApiError { status_code: u16, message: String },

    /// Error parsing the gateway callback
    #[error("Failed to parse payment gateway response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Missing or incomplete payment configuration
    #[error("Payment configuration missing or incomplete")]
    ConfigError,
}

/// Convert PaymentError to SeatpickError
impl From<PaymentError> for SeatpickError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::GatewayUnavailable => {
                external_service_error("Payment gateway", "payment module is unavailable")
            }
            PaymentError::RequestError(e) => {
                SeatpickError::HttpError(format!("Payment gateway request error: {}", e))
            }
            PaymentError::ApiError {
                status_code,
                message,
            } => external_service_error(
                "Payment gateway",
                format!("Status: {}, Message: {}", status_code, message),
            ),
            PaymentError::ParseError(e) => {
                SeatpickError::ParseError(format!("Payment gateway response parse error: {}", e))
            }
            PaymentError::ConfigError => SeatpickError::ConfigError(
                "Payment configuration missing or incomplete".to_string(),
            ),
        }
    }
}
