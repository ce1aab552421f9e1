// --- File: crates/seatpick_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- Reservation API Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    pub base_url: String, // e.g. http://localhost:8080/api
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

// --- Buyer Profile ---
// Sent along with every payment request.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct BuyerConfig {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
}

// --- Payment Gateway Config ---
// Holds non-secret gateway config. The api key is usually "secret_from_env" (PAYMENT_API_KEY).
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PaymentConfig {
    pub provider: String,   // Mandatory, e.g. "html5_inicis"
    pub pay_method: String, // Mandatory, e.g. "card"
    pub endpoint: String,   // Mandatory, where request_pay is delivered
    #[serde(default)]
    pub api_key: Option<String>,
    pub item_name: Option<String>,
    /// Amount charged per slot, in the smallest currency unit.
    pub unit_amount: i64,
    #[serde(default)]
    pub buyer: BuyerConfig,
}

// --- Booking Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BookingConfig {
    /// Fixed length of one slot; the booking end time is derived from it.
    #[serde(default = "default_slot_duration")]
    pub slot_duration_minutes: i64,
}

fn default_slot_duration() -> i64 {
    60
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            slot_duration_minutes: default_slot_duration(),
        }
    }
}

// --- Session Config ---
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct SessionConfig {
    /// Where the access/refresh credentials are persisted. In-memory only when absent.
    pub credential_file: Option<String>,
}

// --- Logging Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Daily rolling log files are written here when set.
    pub directory: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
        }
    }
}

// --- Unified App Configuration ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Reservation API config is mandatory
    pub api: ApiConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_payment: bool,

    // --- Optional Sections ---
    #[serde(default)]
    pub payment: Option<PaymentConfig>,
    #[serde(default)]
    pub booking: BookingConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}
