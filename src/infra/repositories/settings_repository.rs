use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

use super::entities::settings::{self, Entity as SettingsEntity, SINGLETON_ID};
use crate::domain::Settings;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// The singleton, inserted with defaults when missing
    async fn get_or_create(&self) -> AppResult<Settings>;

    async fn save(&self, settings: Settings) -> AppResult<Settings>;
}

pub struct SettingsStore {
    db: DatabaseConnection,
}

impl SettingsStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn active_model(settings: Settings) -> settings::ActiveModel {
    settings::ActiveModel {
        id: Set(SINGLETON_ID),
        site_name: Set(settings.site_name),
        contact_email: Set(settings.contact_email),
        default_currency: Set(settings.default_currency),
        currency_symbol: Set(settings.currency_symbol),
        shipping_fee: Set(settings.shipping_fee),
        free_shipping_threshold: Set(settings.free_shipping_threshold),
        maintenance_mode: Set(settings.maintenance_mode),
        maintenance_message: Set(settings.maintenance_message),
        allow_registration: Set(settings.allow_registration),
        updated_at: Set(settings.updated_at),
    }
}

#[async_trait]
impl SettingsRepository for SettingsStore {
    async fn get_or_create(&self) -> AppResult<Settings> {
        if let Some(model) = SettingsEntity::find_by_id(SINGLETON_ID).one(&self.db).await? {
            return Ok(Settings::from(model));
        }

        // Concurrent first reads may race; the loser's insert is dropped
        SettingsEntity::insert(active_model(Settings::default()))
            .on_conflict(
                OnConflict::column(settings::Column::Id)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        tracing::info!("Settings initialized with defaults");

        SettingsEntity::find_by_id(SINGLETON_ID)
            .one(&self.db)
            .await?
            .map(Settings::from)
            .ok_or_else(|| AppError::internal("Settings row missing after initialization"))
    }

    async fn save(&self, settings: Settings) -> AppResult<Settings> {
        let model = active_model(settings).update(&self.db).await?;
        Ok(Settings::from(model))
    }
}
