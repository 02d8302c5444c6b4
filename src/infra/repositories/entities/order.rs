//! Order header entity. Line items live in `order_items`.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub ship_street: String,
    pub ship_city: String,
    pub ship_state: String,
    pub ship_country: String,
    pub ship_zip: String,
    #[sea_orm(column_type = "Double")]
    pub subtotal: f64,
    pub coupon_code: Option<String>,
    #[sea_orm(column_type = "Double")]
    pub discount: f64,
    #[sea_orm(column_type = "Double")]
    pub total_amount: f64,
    pub is_gift: bool,
    pub gift_message: Option<String>,
    pub status: String,
    pub payment_method: String,
    pub payment_status: String,
    pub tracking_number: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItem,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
