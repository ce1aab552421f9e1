// --- File: crates/seatpick_common/src/lib.rs ---

pub mod error;    // Error handling
pub mod features; // Runtime feature switches
pub mod http;     // HTTP utilities and the API client
pub mod logging;  // Logging utilities
pub mod models;   // Shared wire and domain types
pub mod services; // Service abstractions
pub mod session;  // Credential capture and storage

// Re-export error types and utilities for easier access
pub use error::{config_error, external_service_error, validation_error, Context, SeatpickError};

// Re-export HTTP utilities for easier access
pub use http::{
    client::{create_client, ApiClient, HTTP_CLIENT},
    ensure_success, extract_message, RESERVATION_API,
};

// Re-export logging utilities for easier access
pub use logging::{init_from_config, init_with_level, log_result};

pub use features::{is_feature_enabled, is_payment_enabled};
pub use session::{CredentialStore, Credentials, FileCredentialStore, SessionContext};
