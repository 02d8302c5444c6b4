//! Database migrations.
//!
//! Each migration is a separate module following SeaORM conventions.
//! Migration names follow the pattern: m{YYYYMMDD}_{NNNNNN}_{description}

use sea_orm_migration::prelude::*;

mod m20240101_000001_create_users_table;
mod m20240101_000002_create_catalog_tables;
mod m20240101_000003_create_cart_tables;
mod m20240101_000004_create_coupons_table;
mod m20240101_000005_create_orders_tables;
mod m20240101_000006_create_ratings_table;
mod m20240101_000007_create_settings_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users_table::Migration),
            Box::new(m20240101_000002_create_catalog_tables::Migration),
            Box::new(m20240101_000003_create_cart_tables::Migration),
            Box::new(m20240101_000004_create_coupons_table::Migration),
            Box::new(m20240101_000005_create_orders_tables::Migration),
            Box::new(m20240101_000006_create_ratings_table::Migration),
            Box::new(m20240101_000007_create_settings_table::Migration),
        ]
    }
}

/// Identifiers shared by more than one migration.
#[derive(Iden)]
pub(crate) enum Users {
    Table,
    Id,
}

#[derive(Iden)]
pub(crate) enum Products {
    Table,
    Id,
}
