//! Coupon engine rules.
//!
//! Validation checks run in a fixed order and the first failure wins:
//! active flag, expiry, usage cap, minimum order amount.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::config::DYNAMIC_COUPON_PREFIX;
use crate::errors::{AppError, AppResult};

static DYNAMIC_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^{}(\d+)$", DYNAMIC_COUPON_PREFIX)).expect("valid coupon regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    /// Flat amount off
    Fixed,
    /// Percentage of the order amount
    Percentage,
    /// Amount encoded in the code itself (FLAT150 → 150)
    Dynamic,
}

impl DiscountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountType::Fixed => "fixed",
            DiscountType::Percentage => "percentage",
            DiscountType::Dynamic => "dynamic",
        }
    }
}

impl std::str::FromStr for DiscountType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fixed" => Ok(DiscountType::Fixed),
            "percentage" => Ok(DiscountType::Percentage),
            "dynamic" => Ok(DiscountType::Dynamic),
            other => Err(AppError::internal(format!("Unknown discount type: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: Uuid,
    #[schema(example = "SAVE10")]
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_amount: Option<f64>,
    pub minimum_amount: f64,
    pub usage_limit: i32,
    pub used_count: i32,
    pub is_active: bool,
    pub expiry_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outcome of a validity check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CouponValidation {
    pub valid: bool,
    pub message: String,
}

impl CouponValidation {
    fn ok() -> Self {
        Self {
            valid: true,
            message: "Coupon is valid".to_string(),
        }
    }

    fn rejected(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
        }
    }
}

impl Coupon {
    /// Check the coupon against an order amount at time `now`.
    pub fn is_valid(&self, order_amount: f64, now: DateTime<Utc>) -> CouponValidation {
        if !self.is_active {
            return CouponValidation::rejected("Coupon is inactive");
        }
        if self.expiry_date < now {
            return CouponValidation::rejected("Coupon has expired");
        }
        if self.used_count >= self.usage_limit {
            return CouponValidation::rejected("Coupon usage limit reached");
        }
        if order_amount < self.minimum_amount {
            return CouponValidation::rejected(format!(
                "Minimum order amount of {:.2} required",
                self.minimum_amount
            ));
        }
        CouponValidation::ok()
    }

    /// Discount for `order_amount`, clamped to `[0, order_amount]`.
    pub fn calculate_discount(&self, order_amount: f64) -> f64 {
        let raw = match self.discount_type {
            DiscountType::Fixed => self.discount_amount.unwrap_or(0.0),
            DiscountType::Percentage => {
                order_amount * self.discount_amount.unwrap_or(0.0) / 100.0
            }
            DiscountType::Dynamic => dynamic_amount(&self.code),
        };

        round_money(raw.clamp(0.0, order_amount.max(0.0)))
    }

    /// Validate and price in one step, as shown to shoppers.
    pub fn quote(&self, order_amount: f64, now: DateTime<Utc>) -> CouponQuote {
        let validation = self.is_valid(order_amount, now);
        let discount = if validation.valid {
            self.calculate_discount(order_amount)
        } else {
            0.0
        };

        CouponQuote {
            valid: validation.valid,
            message: validation.message,
            code: self.code.clone(),
            discount,
            final_amount: round_money(order_amount - discount),
        }
    }
}

/// Amount carried by a dynamic code, 0 when the code has no numeric suffix.
pub fn dynamic_amount(code: &str) -> f64 {
    DYNAMIC_CODE
        .captures(code)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Codes are stored and matched upper-cased.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

pub fn round_money(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Validate/apply response
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CouponQuote {
    pub valid: bool,
    pub message: String,
    pub code: String,
    pub discount: f64,
    pub final_amount: f64,
}

/// Validate/apply request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CouponCheck {
    #[validate(length(min = 1, max = 50, message = "Coupon code is required"))]
    #[schema(example = "SAVE10")]
    pub code: String,
    #[validate(range(min = 0.0, message = "Order amount cannot be negative"))]
    pub order_amount: f64,
}

/// Coupon create payload
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CouponInput {
    #[validate(length(min = 3, max = 50, message = "Code must be 3 to 50 characters"))]
    pub code: String,
    pub discount_type: DiscountType,
    #[validate(range(min = 0.0, message = "Discount amount cannot be negative"))]
    pub discount_amount: Option<f64>,
    #[validate(range(min = 0.0, message = "Minimum amount cannot be negative"))]
    #[serde(default)]
    pub minimum_amount: f64,
    #[validate(range(min = 1, message = "Usage limit must be at least 1"))]
    pub usage_limit: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub expiry_date: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl CouponInput {
    /// Cross-field rules the derive cannot express.
    pub fn check(&self) -> AppResult<()> {
        check_amount(self.discount_type, self.discount_amount)
    }
}

/// Partial coupon update payload
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CouponUpdate {
    #[validate(length(min = 3, max = 50, message = "Code must be 3 to 50 characters"))]
    pub code: Option<String>,
    pub discount_type: Option<DiscountType>,
    #[validate(range(min = 0.0, message = "Discount amount cannot be negative"))]
    pub discount_amount: Option<f64>,
    #[validate(range(min = 0.0, message = "Minimum amount cannot be negative"))]
    pub minimum_amount: Option<f64>,
    #[validate(range(min = 1, message = "Usage limit must be at least 1"))]
    pub usage_limit: Option<i32>,
    pub is_active: Option<bool>,
    pub expiry_date: Option<DateTime<Utc>>,
}

impl Coupon {
    /// Apply a partial update, re-checking the cross-field rules.
    pub fn apply_update(&mut self, update: CouponUpdate) -> AppResult<()> {
        if let Some(code) = update.code {
            self.code = normalize_code(&code);
        }
        if let Some(discount_type) = update.discount_type {
            self.discount_type = discount_type;
        }
        if update.discount_amount.is_some() {
            self.discount_amount = update.discount_amount;
        }
        if let Some(minimum) = update.minimum_amount {
            self.minimum_amount = minimum;
        }
        if let Some(limit) = update.usage_limit {
            self.usage_limit = limit;
        }
        if let Some(active) = update.is_active {
            self.is_active = active;
        }
        if let Some(expiry) = update.expiry_date {
            self.expiry_date = expiry;
        }
        self.updated_at = Utc::now();

        check_amount(self.discount_type, self.discount_amount)
    }
}

fn check_amount(discount_type: DiscountType, amount: Option<f64>) -> AppResult<()> {
    match (discount_type, amount) {
        (DiscountType::Dynamic, _) => Ok(()),
        (_, None) => Err(AppError::validation(
            "Discount amount is required unless the coupon is dynamic",
        )),
        (DiscountType::Percentage, Some(pct)) if pct > 100.0 => Err(AppError::validation(
            "Percentage discount cannot exceed 100",
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn coupon(code: &str, discount_type: DiscountType, amount: Option<f64>) -> Coupon {
        let now = Utc::now();
        Coupon {
            id: Uuid::new_v4(),
            code: code.to_string(),
            discount_type,
            discount_amount: amount,
            minimum_amount: 50.0,
            usage_limit: 100,
            used_count: 0,
            is_active: true,
            expiry_date: now + Duration::days(30),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_percentage_discount() {
        let save10 = coupon("SAVE10", DiscountType::Percentage, Some(10.0));
        assert_eq!(save10.calculate_discount(200.0), 20.0);
    }

    #[test]
    fn test_dynamic_flat_code() {
        let flat = coupon("FLAT150", DiscountType::Dynamic, None);
        assert_eq!(flat.calculate_discount(500.0), 150.0);
        assert_eq!(dynamic_amount("FLAT150"), 150.0);
        assert_eq!(dynamic_amount("FLATX"), 0.0);
        assert_eq!(dynamic_amount("SUMMER150"), 0.0);
    }

    #[test]
    fn test_discount_never_exceeds_order_amount() {
        let cases = [
            coupon("BIGFIXED", DiscountType::Fixed, Some(1_000.0)),
            coupon("ALL", DiscountType::Percentage, Some(100.0)),
            coupon("FLAT999", DiscountType::Dynamic, None),
            coupon("NEG", DiscountType::Fixed, Some(-5.0)),
        ];
        for c in &cases {
            for amount in [0.0, 0.5, 10.0, 99.99, 150.0, 10_000.0] {
                let discount = c.calculate_discount(amount);
                assert!(discount <= amount, "{} gave {} on {}", c.code, discount, amount);
                assert!(discount >= 0.0);
            }
        }
    }

    #[test]
    fn test_validation_order_short_circuits() {
        let mut c = coupon("SAVE10", DiscountType::Percentage, Some(10.0));
        c.is_active = false;
        c.expiry_date = Utc::now() - Duration::days(1);
        c.used_count = c.usage_limit;
        assert_eq!(c.is_valid(10.0, Utc::now()).message, "Coupon is inactive");

        c.is_active = true;
        assert_eq!(c.is_valid(10.0, Utc::now()).message, "Coupon has expired");

        c.expiry_date = Utc::now() + Duration::days(1);
        assert_eq!(c.is_valid(10.0, Utc::now()).message, "Coupon usage limit reached");

        c.used_count = 0;
        let result = c.is_valid(10.0, Utc::now());
        assert!(!result.valid);
        assert!(result.message.starts_with("Minimum order amount"));

        assert!(c.is_valid(60.0, Utc::now()).valid);
    }

    #[test]
    fn test_exhausted_coupon_is_invalid_regardless_of_amount() {
        let mut c = coupon("SAVE10", DiscountType::Percentage, Some(10.0));
        c.used_count = 100;
        c.minimum_amount = 0.0;
        for amount in [0.0, 50.0, 1_000_000.0] {
            assert!(!c.is_valid(amount, Utc::now()).valid);
        }
    }

    #[test]
    fn test_quote_zeroes_discount_when_invalid() {
        let c = coupon("SAVE10", DiscountType::Percentage, Some(10.0));
        let quote = c.quote(20.0, Utc::now());
        assert!(!quote.valid);
        assert_eq!(quote.discount, 0.0);
        assert_eq!(quote.final_amount, 20.0);

        let quote = c.quote(200.0, Utc::now());
        assert_eq!(quote.discount, 20.0);
        assert_eq!(quote.final_amount, 180.0);
    }

    #[test]
    fn test_amount_rules() {
        assert!(check_amount(DiscountType::Dynamic, None).is_ok());
        assert!(check_amount(DiscountType::Fixed, None).is_err());
        assert!(check_amount(DiscountType::Percentage, Some(120.0)).is_err());
        assert!(check_amount(DiscountType::Percentage, Some(15.0)).is_ok());
    }

    #[test]
    fn test_update_rechecks_rules() {
        let mut c = coupon("FLAT100", DiscountType::Dynamic, None);
        let err = c
            .apply_update(CouponUpdate {
                discount_type: Some(DiscountType::Fixed),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        c.apply_update(CouponUpdate {
            code: Some(" flat200 ".into()),
            discount_type: Some(DiscountType::Dynamic),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(c.code, "FLAT200");
    }
}
