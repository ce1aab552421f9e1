// --- File: crates/seatpick_payment/src/logic.rs ---

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};

// --- Data Structures ---

/// The payload handed to the gateway's `request_pay`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PayRequest {
    pub payment_provider: String,
    pub pay_method: String,
    pub merchant_uid: String,
    pub item_name: String,
    pub amount: i64,
    pub buyer_email: String,
    pub buyer_name: String,
    pub buyer_phone: String,
}

/// What the gateway passes to the `request_pay` callback.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PayResponse {
    pub success: bool,
    #[serde(default)]
    pub error_message: Option<String>,
    pub merchant_uid: String,
    #[serde(default)]
    pub provider_transaction_id: Option<String>,
}

impl PayResponse {
    /// A failed callback produced on the client side (e.g. the gateway was unreachable).
    pub fn failure(merchant_uid: &str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_message: Some(message.into()),
            merchant_uid: merchant_uid.to_string(),
            provider_transaction_id: None,
        }
    }
}

// --- Merchant identifiers ---

/// Issues `mid_<unix millis>` identifiers.
///
/// Two calls in the same millisecond still get distinct values: the counter never
/// repeats or goes backwards within one generator.
#[derive(Debug, Default)]
pub struct MerchantUidGenerator {
    last: AtomicI64,
}

impl MerchantUidGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_uid(&self) -> String {
        let now = Utc::now().timestamp_millis();
        let mut previous = self.last.load(Ordering::SeqCst);
        loop {
            let candidate = now.max(previous + 1);
            match self
                .last
                .compare_exchange(previous, candidate, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => return format!("mid_{}", candidate),
                Err(actual) => previous = actual,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_merchant_uids_are_unique_and_time_derived() {
        let generator = MerchantUidGenerator::new();
        let before = Utc::now().timestamp_millis();

        let uids: Vec<String> = (0..500).map(|_| generator.next_uid()).collect();

        let unique: HashSet<&String> = uids.iter().collect();
        assert_eq!(unique.len(), uids.len());
        let first: i64 = uids[0].trim_start_matches("mid_").parse().unwrap();
        assert!(first >= before);
        assert!(uids.iter().all(|uid| uid.starts_with("mid_")));
    }

    #[test]
    fn test_pay_response_reads_gateway_callback() {
        let response: PayResponse = serde_json::from_str(
            r#"{"success":false,"errorMessage":"user cancelled","merchantUid":"mid_1"}"#,
        )
        .unwrap();
        assert!(!response.success);
        assert_eq!(response.error_message.as_deref(), Some("user cancelled"));
        assert_eq!(response.provider_transaction_id, None);
    }
}
