use sea_orm_migration::prelude::*;

use super::Products;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Ratings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Ratings::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Ratings::UserId).uuid().not_null())
                    .col(ColumnDef::new(Ratings::ProductId).uuid().not_null())
                    .col(ColumnDef::new(Ratings::OrderId).uuid().not_null())
                    .col(ColumnDef::new(Ratings::Rating).integer().not_null())
                    .col(ColumnDef::new(Ratings::Review).text().null())
                    .col(
                        ColumnDef::new(Ratings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Ratings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ratings_product")
                            .from(Ratings::Table, Ratings::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One rating per (user, product, order)
        manager
            .create_index(
                Index::create()
                    .name("idx_ratings_user_product_order")
                    .table(Ratings::Table)
                    .col(Ratings::UserId)
                    .col(Ratings::ProductId)
                    .col(Ratings::OrderId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ratings_product_id")
                    .table(Ratings::Table)
                    .col(Ratings::ProductId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Ratings::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Ratings {
    Table,
    Id,
    UserId,
    ProductId,
    OrderId,
    Rating,
    Review,
    CreatedAt,
    UpdatedAt,
}
