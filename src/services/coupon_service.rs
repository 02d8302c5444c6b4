//! Coupon service - Admin CRUD plus quote and redemption.
//!
//! `apply` counts a redemption on its own; checkout counts another one when
//! the same code is passed with the order.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::coupon::normalize_code;
use crate::domain::{Coupon, CouponInput, CouponQuote, CouponUpdate};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

#[async_trait]
pub trait CouponService: Send + Sync {
    async fn create(&self, input: CouponInput) -> AppResult<Coupon>;

    async fn list(&self) -> AppResult<Vec<Coupon>>;

    async fn get(&self, id: Uuid) -> AppResult<Coupon>;

    async fn update(&self, id: Uuid, update: CouponUpdate) -> AppResult<Coupon>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;

    /// Price `order_amount` with the code without redeeming it
    async fn validate(&self, code: &str, order_amount: f64) -> AppResult<CouponQuote>;

    /// Validate and count one redemption
    async fn apply(&self, code: &str, order_amount: f64) -> AppResult<CouponQuote>;
}

pub struct CouponManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> CouponManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn by_code(&self, code: &str) -> AppResult<Coupon> {
        self.uow
            .coupons()
            .find_by_code(&normalize_code(code))
            .await?
            .ok_or_else(|| AppError::validation("Invalid coupon code"))
    }
}

#[async_trait]
impl<U: UnitOfWork> CouponService for CouponManager<U> {
    async fn create(&self, input: CouponInput) -> AppResult<Coupon> {
        input.check()?;

        let code = normalize_code(&input.code);
        if self.uow.coupons().find_by_code(&code).await?.is_some() {
            return Err(AppError::conflict("Coupon"));
        }

        let now = Utc::now();
        let coupon = Coupon {
            id: Uuid::new_v4(),
            code,
            discount_type: input.discount_type,
            discount_amount: input.discount_amount,
            minimum_amount: input.minimum_amount,
            usage_limit: input.usage_limit,
            used_count: 0,
            is_active: input.is_active,
            expiry_date: input.expiry_date,
            created_at: now,
            updated_at: now,
        };

        let coupon = self.uow.coupons().create(coupon).await?;
        tracing::info!(code = %coupon.code, "Coupon created");
        Ok(coupon)
    }

    async fn list(&self) -> AppResult<Vec<Coupon>> {
        self.uow.coupons().list().await
    }

    async fn get(&self, id: Uuid) -> AppResult<Coupon> {
        self.uow
            .coupons()
            .find_by_id(id)
            .await?
            .ok_or_not_found("Coupon")
    }

    async fn update(&self, id: Uuid, update: CouponUpdate) -> AppResult<Coupon> {
        let mut coupon = self.get(id).await?;
        let old_code = coupon.code.clone();
        coupon.apply_update(update)?;

        if coupon.code != old_code
            && self.uow.coupons().find_by_code(&coupon.code).await?.is_some()
        {
            return Err(AppError::conflict("Coupon"));
        }

        self.uow.coupons().update(coupon).await
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.uow.coupons().delete(id).await
    }

    async fn validate(&self, code: &str, order_amount: f64) -> AppResult<CouponQuote> {
        let coupon = self.by_code(code).await?;
        Ok(coupon.quote(order_amount, Utc::now()))
    }

    async fn apply(&self, code: &str, order_amount: f64) -> AppResult<CouponQuote> {
        let coupon = self.by_code(code).await?;
        let quote = coupon.quote(order_amount, Utc::now());
        if !quote.valid {
            return Err(AppError::validation(quote.message));
        }

        if !self.uow.coupons().try_increment_usage(coupon.id).await? {
            return Err(AppError::validation("Coupon usage limit reached"));
        }

        tracing::info!(code = %coupon.code, discount = quote.discount, "Coupon redeemed");
        Ok(quote)
    }
}
