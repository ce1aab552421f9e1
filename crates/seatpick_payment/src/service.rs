use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{info, warn};

use seatpick_common::is_payment_enabled;
use seatpick_common::services::{BoxFuture, PaymentGateway, PaymentOutcome, PaymentRequest};
use seatpick_common::SeatpickError;
use seatpick_config::{AppConfig, BuyerConfig, PaymentConfig};

use crate::error::PaymentError;
use crate::logic::{MerchantUidGenerator, PayRequest, PayResponse};
use crate::widget::{HttpPaymentWidget, PaymentWidget};

/// Provider-level settings copied into every `request_pay`.
#[derive(Debug, Clone)]
pub struct PaymentSettings {
    pub provider: String,
    pub pay_method: String,
    pub item_name: Option<String>,
    pub buyer: BuyerConfig,
}

impl From<&PaymentConfig> for PaymentSettings {
    fn from(config: &PaymentConfig) -> Self {
        Self {
            provider: config.provider.clone(),
            pay_method: config.pay_method.clone(),
            item_name: config.item_name.clone(),
            buyer: config.buyer.clone(),
        }
    }
}

/// Wraps a callback-based [`PaymentWidget`] into a [`PaymentGateway`].
///
/// Each `initiate` mints a fresh merchant identifier, invokes the widget exactly once and
/// resolves with exactly one outcome. There are no retries.
pub struct GatewayPaymentAdapter {
    widget: Option<Arc<dyn PaymentWidget>>,
    settings: PaymentSettings,
    uids: MerchantUidGenerator,
}

impl GatewayPaymentAdapter {
    pub fn new(widget: Arc<dyn PaymentWidget>, settings: PaymentSettings) -> Self {
        Self {
            widget: Some(widget),
            settings,
            uids: MerchantUidGenerator::new(),
        }
    }

    /// An adapter whose payment module failed to load; every attempt fails immediately.
    pub fn unavailable(settings: PaymentSettings) -> Self {
        Self {
            widget: None,
            settings,
            uids: MerchantUidGenerator::new(),
        }
    }

    /// Builds the adapter from the `[payment]` section. Without it (or with `use_payment`
    /// off) the adapter reports the gateway as unavailable.
    pub fn from_config(config: &AppConfig) -> Result<Self, PaymentError> {
        let Some(payment) = config.payment.as_ref() else {
            return Ok(Self::unavailable(PaymentSettings {
                provider: String::new(),
                pay_method: String::new(),
                item_name: None,
                buyer: BuyerConfig::default(),
            }));
        };
        let settings = PaymentSettings::from(payment);
        if !is_payment_enabled(config) {
            return Ok(Self::unavailable(settings));
        }
        let widget = HttpPaymentWidget::from_config(payment, config.api.timeout_secs)?;
        Ok(Self::new(Arc::new(widget), settings))
    }

    fn pay_request(&self, merchant_uid: &str, request: &PaymentRequest) -> PayRequest {
        let item_name = match (&self.settings.item_name, &request.space_name) {
            (Some(name), _) => name.clone(),
            (None, Some(space)) => format!("{} {} {}", space, request.date, request.time),
            (None, None) => format!("Space {} {} {}", request.space_id, request.date, request.time),
        };
        PayRequest {
            payment_provider: self.settings.provider.clone(),
            pay_method: self.settings.pay_method.clone(),
            merchant_uid: merchant_uid.to_string(),
            item_name,
            amount: request.amount,
            buyer_email: self.settings.buyer.email.clone(),
            buyer_name: self.settings.buyer.name.clone(),
            buyer_phone: self.settings.buyer.phone.clone(),
        }
    }
}

fn outcome_from(response: PayResponse, merchant_uid: String) -> PaymentOutcome {
    if response.merchant_uid != merchant_uid {
        warn!(
            "callback for {} arrived on attempt {}",
            response.merchant_uid, merchant_uid
        );
        return PaymentOutcome::Failed {
            merchant_uid,
            reason: "payment gateway answered for a different attempt".to_string(),
        };
    }
    if response.success {
        PaymentOutcome::Succeeded {
            merchant_uid,
            provider_transaction_id: response.provider_transaction_id,
        }
    } else {
        PaymentOutcome::Failed {
            merchant_uid,
            reason: response
                .error_message
                .unwrap_or_else(|| "payment was declined".to_string()),
        }
    }
}

impl PaymentGateway for GatewayPaymentAdapter {
    fn initiate(&self, request: PaymentRequest) -> BoxFuture<'_, PaymentOutcome, SeatpickError> {
        Box::pin(async move {
            let widget = self
                .widget
                .as_ref()
                .ok_or(PaymentError::GatewayUnavailable)?;

            let merchant_uid = self.uids.next_uid();
            let pay_request = self.pay_request(&merchant_uid, &request);
            info!(
                "requesting payment {} of {} for space {} on {} at {}",
                merchant_uid, request.amount, request.space_id, request.date, request.time
            );

            let (tx, rx) = oneshot::channel();
            widget.request_pay(
                pay_request,
                Box::new(move |response| {
                    // The attempt may have been dropped already; nothing left to tell.
                    let _ = tx.send(response);
                }),
            );

            let outcome = match rx.await {
                Ok(response) => outcome_from(response, merchant_uid),
                Err(_) => PaymentOutcome::Abandoned { merchant_uid },
            };
            info!(
                "payment {} resolved, succeeded: {}",
                outcome.merchant_uid(),
                outcome.succeeded()
            );
            Ok(outcome)
        })
    }
}
