// --- File: crates/seatpick_payment/src/lib.rs ---

pub mod error;
pub mod logic;
pub mod service;
pub mod widget;

pub use error::PaymentError; // Re-export the error type
pub use logic::{MerchantUidGenerator, PayRequest, PayResponse};
pub use service::{GatewayPaymentAdapter, PaymentSettings}; // Re-export the payment adapter
pub use widget::{HttpPaymentWidget, PayCallback, PaymentWidget};
