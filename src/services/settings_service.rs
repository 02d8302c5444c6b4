use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

use crate::domain::{Settings, SettingsUpdate};
use crate::errors::AppResult;
use crate::infra::UnitOfWork;

/// Site settings provider, injected wherever settings are read.
#[async_trait]
pub trait SettingsService: Send + Sync {
    /// The singleton, created with defaults on first access
    async fn get(&self) -> AppResult<Settings>;

    async fn update(&self, update: SettingsUpdate) -> AppResult<Settings>;

    async fn is_maintenance_mode(&self) -> AppResult<bool>;
}

pub struct SettingsManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> SettingsManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> SettingsService for SettingsManager<U> {
    async fn get(&self) -> AppResult<Settings> {
        self.uow.settings().get_or_create().await
    }

    async fn update(&self, update: SettingsUpdate) -> AppResult<Settings> {
        let mut settings = self.get().await?;
        let was_in_maintenance = settings.maintenance_mode;

        settings.apply(update);
        settings.updated_at = Utc::now();
        let settings = self.uow.settings().save(settings).await?;

        if settings.maintenance_mode != was_in_maintenance {
            tracing::info!(
                maintenance_mode = settings.maintenance_mode,
                "Maintenance mode toggled"
            );
        }
        Ok(settings)
    }

    async fn is_maintenance_mode(&self) -> AppResult<bool> {
        Ok(self.get().await?.maintenance_mode)
    }
}
