// --- File: crates/seatpick_payment/src/widget.rs ---
//! The callback-style payment widget boundary.

use reqwest::Client;
use seatpick_common::{create_client, extract_message, HTTP_CLIENT};
use seatpick_config::PaymentConfig;
use tracing::{debug, warn};

use crate::error::PaymentError;
use crate::logic::{PayRequest, PayResponse};

/// Invoked at most once with the gateway's verdict.
pub type PayCallback = Box<dyn FnOnce(PayResponse) + Send + 'static>;

/// A third-party payment widget: `request_pay(params, callback)`.
///
/// Implementations call `callback` at most once. Dropping it without calling means
/// the attempt was abandoned.
pub trait PaymentWidget: Send + Sync {
    fn request_pay(&self, request: PayRequest, callback: PayCallback);
}

/// Delivers `request_pay` to an HTTP gateway endpoint and feeds its JSON answer
/// to the callback from a background task.
pub struct HttpPaymentWidget {
    endpoint: String,
    api_key: Option<String>,
    http: Client,
}

impl HttpPaymentWidget {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key,
            http: HTTP_CLIENT.clone(),
        }
    }

    pub fn from_config(config: &PaymentConfig, timeout_secs: u64) -> Result<Self, PaymentError> {
        if config.endpoint.is_empty() {
            return Err(PaymentError::ConfigError);
        }
        Ok(Self {
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            http: create_client(timeout_secs, true)?,
        })
    }
}

async fn deliver(
    http: Client,
    endpoint: String,
    api_key: Option<String>,
    request: &PayRequest,
) -> Result<PayResponse, PaymentError> {
    let mut builder = http.post(&endpoint).json(request);
    if let Some(key) = api_key {
        builder = builder.bearer_auth(key);
    }
    let response = builder.send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(PaymentError::ApiError {
            status_code: status.as_u16(),
            message: extract_message(&body).unwrap_or_else(|| status.to_string()),
        });
    }
    Ok(serde_json::from_str(&body)?)
}

impl PaymentWidget for HttpPaymentWidget {
    fn request_pay(&self, request: PayRequest, callback: PayCallback) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            callback(PayResponse::failure(
                &request.merchant_uid,
                "payment widget needs an async runtime",
            ));
            return;
        };

        let http = self.http.clone();
        let endpoint = self.endpoint.clone();
        let api_key = self.api_key.clone();
        runtime.spawn(async move {
            debug!("request_pay {} -> {}", request.merchant_uid, endpoint);
            let response = match deliver(http, endpoint, api_key, &request).await {
                Ok(response) => response,
                Err(e) => {
                    warn!("payment gateway call for {} failed: {}", request.merchant_uid, e);
                    PayResponse::failure(&request.merchant_uid, e.to_string())
                }
            };
            callback(response);
        });
    }
}
