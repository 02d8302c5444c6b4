use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Single row; created with defaults on first read
        manager
            .create_table(
                Table::create()
                    .table(Settings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Settings::Id).integer().not_null().primary_key())
                    .col(ColumnDef::new(Settings::SiteName).string_len(100).not_null())
                    .col(ColumnDef::new(Settings::ContactEmail).string_len(255).null())
                    .col(ColumnDef::new(Settings::DefaultCurrency).string_len(3).not_null())
                    .col(ColumnDef::new(Settings::CurrencySymbol).string_len(8).not_null())
                    .col(ColumnDef::new(Settings::ShippingFee).double().not_null())
                    .col(ColumnDef::new(Settings::FreeShippingThreshold).double().not_null())
                    .col(
                        ColumnDef::new(Settings::MaintenanceMode)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Settings::MaintenanceMessage).string_len(500).not_null())
                    .col(
                        ColumnDef::new(Settings::AllowRegistration)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Settings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Settings::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Settings {
    Table,
    Id,
    SiteName,
    ContactEmail,
    DefaultCurrency,
    CurrencySymbol,
    ShippingFee,
    FreeShippingThreshold,
    MaintenanceMode,
    MaintenanceMessage,
    AllowRegistration,
    UpdatedAt,
}
