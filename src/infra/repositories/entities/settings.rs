//! Settings singleton row (always `id = 1`).

use sea_orm::entity::prelude::*;

use crate::domain::Settings;

pub const SINGLETON_ID: i32 = 1;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub site_name: String,
    pub contact_email: Option<String>,
    pub default_currency: String,
    pub currency_symbol: String,
    #[sea_orm(column_type = "Double")]
    pub shipping_fee: f64,
    #[sea_orm(column_type = "Double")]
    pub free_shipping_threshold: f64,
    pub maintenance_mode: bool,
    pub maintenance_message: String,
    pub allow_registration: bool,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Settings {
    fn from(model: Model) -> Self {
        Settings {
            site_name: model.site_name,
            contact_email: model.contact_email,
            default_currency: model.default_currency,
            currency_symbol: model.currency_symbol,
            shipping_fee: model.shipping_fee,
            free_shipping_threshold: model.free_shipping_threshold,
            maintenance_mode: model.maintenance_mode,
            maintenance_message: model.maintenance_message,
            allow_registration: model.allow_registration,
            updated_at: model.updated_at,
        }
    }
}
