//! Coupon database entity.

use sea_orm::entity::prelude::*;

use crate::domain::{Coupon, DiscountType};
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "coupons")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub discount_type: String,
    #[sea_orm(column_type = "Double", nullable)]
    pub discount_amount: Option<f64>,
    #[sea_orm(column_type = "Double")]
    pub minimum_amount: f64,
    pub usage_limit: i32,
    pub used_count: i32,
    pub is_active: bool,
    pub expiry_date: DateTimeUtc,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Coupon {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Coupon {
            id: model.id,
            code: model.code,
            discount_type: model.discount_type.parse::<DiscountType>()?,
            discount_amount: model.discount_amount,
            minimum_amount: model.minimum_amount,
            usage_limit: model.usage_limit,
            used_count: model.used_count,
            is_active: model.is_active,
            expiry_date: model.expiry_date,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
