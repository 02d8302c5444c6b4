use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::coupon::{self, Entity as CouponEntity};
use crate::domain::Coupon;
use crate::errors::{AppError, AppResult, OptionExt};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CouponRepository: Send + Sync {
    /// All coupons, newest first
    async fn list(&self) -> AppResult<Vec<Coupon>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Coupon>>;

    /// Lookup by normalized (upper-cased) code
    async fn find_by_code(&self, code: &str) -> AppResult<Option<Coupon>>;

    async fn create(&self, coupon: Coupon) -> AppResult<Coupon>;

    /// Save editable fields; `used_count` is only touched by redemption
    async fn update(&self, coupon: Coupon) -> AppResult<Coupon>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;

    /// Count one redemption if the limit allows it
    async fn try_increment_usage(&self, id: Uuid) -> AppResult<bool>;
}

pub struct CouponStore {
    db: DatabaseConnection,
}

impl CouponStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

pub(crate) async fn find_coupon_by_code<C: ConnectionTrait>(
    db: &C,
    code: &str,
) -> AppResult<Option<Coupon>> {
    CouponEntity::find()
        .filter(coupon::Column::Code.eq(code))
        .one(db)
        .await?
        .map(Coupon::try_from)
        .transpose()
}

/// Conditional `used_count + 1`, guarded by `used_count < usage_limit`.
pub(crate) async fn try_increment_usage<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<bool> {
    let result = CouponEntity::update_many()
        .col_expr(
            coupon::Column::UsedCount,
            Expr::col(coupon::Column::UsedCount).add(1),
        )
        .col_expr(coupon::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(coupon::Column::Id.eq(id))
        .filter(Expr::col(coupon::Column::UsedCount).lt(Expr::col(coupon::Column::UsageLimit)))
        .exec(db)
        .await?;

    Ok(result.rows_affected == 1)
}

#[async_trait]
impl CouponRepository for CouponStore {
    async fn list(&self) -> AppResult<Vec<Coupon>> {
        CouponEntity::find()
            .order_by_desc(coupon::Column::CreatedAt)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Coupon::try_from)
            .collect()
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Coupon>> {
        CouponEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Coupon::try_from)
            .transpose()
    }

    async fn find_by_code(&self, code: &str) -> AppResult<Option<Coupon>> {
        find_coupon_by_code(&self.db, code).await
    }

    async fn create(&self, coupon: Coupon) -> AppResult<Coupon> {
        let model = coupon::ActiveModel {
            id: Set(coupon.id),
            code: Set(coupon.code),
            discount_type: Set(coupon.discount_type.as_str().to_string()),
            discount_amount: Set(coupon.discount_amount),
            minimum_amount: Set(coupon.minimum_amount),
            usage_limit: Set(coupon.usage_limit),
            used_count: Set(coupon.used_count),
            is_active: Set(coupon.is_active),
            expiry_date: Set(coupon.expiry_date),
            created_at: Set(coupon.created_at),
            updated_at: Set(coupon.updated_at),
        }
        .insert(&self.db)
        .await?;

        Coupon::try_from(model)
    }

    async fn update(&self, coupon: Coupon) -> AppResult<Coupon> {
        let existing = CouponEntity::find_by_id(coupon.id)
            .one(&self.db)
            .await?
            .ok_or_not_found("Coupon")?;

        let mut active: coupon::ActiveModel = existing.into();
        active.code = Set(coupon.code);
        active.discount_type = Set(coupon.discount_type.as_str().to_string());
        active.discount_amount = Set(coupon.discount_amount);
        active.minimum_amount = Set(coupon.minimum_amount);
        active.usage_limit = Set(coupon.usage_limit);
        active.is_active = Set(coupon.is_active);
        active.expiry_date = Set(coupon.expiry_date);
        active.updated_at = Set(coupon.updated_at);

        let model = active.update(&self.db).await?;
        Coupon::try_from(model)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = CouponEntity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::not_found("Coupon"));
        }
        Ok(())
    }

    async fn try_increment_usage(&self, id: Uuid) -> AppResult<bool> {
        try_increment_usage(&self.db, id).await
    }
}
