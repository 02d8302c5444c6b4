//! Site-wide settings singleton.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::config::{
    DEFAULT_CURRENCY, DEFAULT_CURRENCY_SYMBOL, DEFAULT_FREE_SHIPPING_THRESHOLD,
    DEFAULT_MAINTENANCE_MESSAGE, DEFAULT_SHIPPING_FEE, DEFAULT_SITE_NAME,
};

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub site_name: String,
    pub contact_email: Option<String>,
    #[schema(example = "INR")]
    pub default_currency: String,
    pub currency_symbol: String,
    pub shipping_fee: f64,
    pub free_shipping_threshold: f64,
    pub maintenance_mode: bool,
    pub maintenance_message: String,
    pub allow_registration: bool,
    pub updated_at: DateTime<Utc>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            site_name: DEFAULT_SITE_NAME.to_string(),
            contact_email: None,
            default_currency: DEFAULT_CURRENCY.to_string(),
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
            shipping_fee: DEFAULT_SHIPPING_FEE,
            free_shipping_threshold: DEFAULT_FREE_SHIPPING_THRESHOLD,
            maintenance_mode: false,
            maintenance_message: DEFAULT_MAINTENANCE_MESSAGE.to_string(),
            allow_registration: true,
            updated_at: Utc::now(),
        }
    }
}

/// Symbol shown next to prices for a currency code.
pub fn currency_symbol(currency: &str) -> &'static str {
    match currency.to_ascii_uppercase().as_str() {
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        _ => DEFAULT_CURRENCY_SYMBOL,
    }
}

/// Partial settings update; absent fields keep their value
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    #[validate(length(min = 1, max = 100, message = "Site name cannot be empty"))]
    pub site_name: Option<String>,
    #[validate(email(message = "Invalid contact email"))]
    pub contact_email: Option<String>,
    #[validate(length(equal = 3, message = "Currency must be a 3-letter code"))]
    pub default_currency: Option<String>,
    #[validate(range(min = 0.0, message = "Shipping fee cannot be negative"))]
    pub shipping_fee: Option<f64>,
    #[validate(range(min = 0.0, message = "Free shipping threshold cannot be negative"))]
    pub free_shipping_threshold: Option<f64>,
    pub maintenance_mode: Option<bool>,
    #[validate(length(max = 500))]
    pub maintenance_message: Option<String>,
    pub allow_registration: Option<bool>,
}

impl Settings {
    /// Merge an update. A currency change re-derives the symbol.
    pub fn apply(&mut self, update: SettingsUpdate) {
        if let Some(site_name) = update.site_name {
            self.site_name = site_name;
        }
        if let Some(email) = update.contact_email {
            self.contact_email = Some(email);
        }
        if let Some(currency) = update.default_currency {
            let currency = currency.to_ascii_uppercase();
            self.currency_symbol = currency_symbol(&currency).to_string();
            self.default_currency = currency;
        }
        if let Some(fee) = update.shipping_fee {
            self.shipping_fee = fee;
        }
        if let Some(threshold) = update.free_shipping_threshold {
            self.free_shipping_threshold = threshold;
        }
        if let Some(mode) = update.maintenance_mode {
            self.maintenance_mode = mode;
        }
        if let Some(message) = update.maintenance_message {
            self.maintenance_message = message;
        }
        if let Some(allow) = update.allow_registration {
            self.allow_registration = allow;
        }
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_table() {
        assert_eq!(currency_symbol("USD"), "$");
        assert_eq!(currency_symbol("eur"), "€");
        assert_eq!(currency_symbol("GBP"), "£");
        assert_eq!(currency_symbol("JPY"), "₹");
        assert_eq!(currency_symbol("INR"), "₹");
    }

    #[test]
    fn test_currency_change_derives_symbol() {
        let mut settings = Settings::default();
        settings.apply(SettingsUpdate {
            default_currency: Some("usd".into()),
            ..Default::default()
        });
        assert_eq!(settings.default_currency, "USD");
        assert_eq!(settings.currency_symbol, "$");
    }

    #[test]
    fn test_partial_update_keeps_other_fields() {
        let mut settings = Settings::default();
        settings.apply(SettingsUpdate {
            maintenance_mode: Some(true),
            ..Default::default()
        });
        assert!(settings.maintenance_mode);
        assert_eq!(settings.site_name, DEFAULT_SITE_NAME);
        assert_eq!(settings.currency_symbol, DEFAULT_CURRENCY_SYMBOL);
        assert!(settings.allow_registration);
    }
}
