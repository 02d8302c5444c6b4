//! Product database entity.

use sea_orm::entity::prelude::*;

use crate::domain::Product;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Double")]
    pub price: f64,
    pub stock: i32,
    pub is_bestseller: bool,
    pub avg_rating: i32,
    pub image_url: Option<String>,
    pub major_category_id: Uuid,
    pub sub_category_id: Option<Uuid>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::MajorCategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
    #[sea_orm(
        belongs_to = "super::subcategory::Entity",
        from = "Column::SubCategoryId",
        to = "super::subcategory::Column::Id"
    )]
    SubCategory,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::subcategory::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SubCategory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Product {
    fn from(model: Model) -> Self {
        Product {
            id: model.id,
            name: model.name,
            description: model.description,
            price: model.price,
            stock: model.stock,
            is_bestseller: model.is_bestseller,
            avg_rating: model.avg_rating,
            image_url: model.image_url,
            major_category_id: model.major_category_id,
            sub_category_id: model.sub_category_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
