// --- File: crates/seatpick_common/src/http.rs ---
use reqwest::Response;
use serde::Deserialize;

use crate::error::SeatpickError;

// Include the client module
pub mod client;

/// Service name used in errors raised for the reservation backend.
pub const RESERVATION_API: &str = "Reservation API";

/// Shapes the backend uses for error bodies: `{"message": ..}` or `{"error": {"message": ..}}`.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum ErrorBody {
    Flat { message: String },
    Nested { error: NestedError },
}

#[derive(Deserialize, Debug)]
struct NestedError {
    message: String,
}

/// Pulls a human readable message out of an error body, falling back to the raw text.
pub fn extract_message(body: &str) -> Option<String> {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody::Flat { message }) => Some(message),
        Ok(ErrorBody::Nested { error }) => Some(error.message),
        Err(_) => {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
    }
}

/// Passes successful responses through and turns everything else into a classified error.
pub async fn ensure_success(response: Response) -> Result<Response, SeatpickError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = extract_message(&body).unwrap_or_else(|| match status.as_u16() {
        409 => "the slot is already taken".to_string(),
        _ => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    });
    Err(SeatpickError::from_status(
        RESERVATION_API,
        status.as_u16(),
        message,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_message_handles_known_shapes() {
        assert_eq!(
            extract_message(r#"{"message":"already booked"}"#).as_deref(),
            Some("already booked")
        );
        assert_eq!(
            extract_message(r#"{"error":{"message":"bad","code":400}}"#).as_deref(),
            Some("bad")
        );
        assert_eq!(extract_message("plain text").as_deref(), Some("plain text"));
        assert_eq!(extract_message("  "), None);
    }
}
