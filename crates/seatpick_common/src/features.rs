//! Runtime feature switches.
//!
//! A feature is on when its `use_*` flag is set *and* its config section is present.

use seatpick_config::AppConfig;

/// Check if a feature is enabled at runtime based on configuration.
pub fn is_feature_enabled<T>(use_feature: bool, feature_config: Option<&T>) -> bool {
    use_feature && feature_config.is_some()
}

/// Check if the payment gateway is wired up.
pub fn is_payment_enabled(config: &AppConfig) -> bool {
    is_feature_enabled(config.use_payment, config.payment.as_ref())
}
