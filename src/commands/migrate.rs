//! Migrate command - schema management without starting the server.

use sea_orm::DbErr;

use crate::cli::args::{MigrateAction, MigrateArgs};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::Database;

fn migration_error(e: DbErr) -> AppError {
    AppError::internal(format!("Migration failed: {}", e))
}

/// Execute the migrate command
pub async fn execute(args: MigrateArgs, config: Config) -> AppResult<()> {
    if let MigrateAction::Fresh { force: false } = args.action {
        return Err(AppError::validation(
            "`migrate fresh` drops all store data; re-run with --force",
        ));
    }

    let db = Database::connect_without_migrations(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;

    match args.action {
        MigrateAction::Up => {
            db.run_migrations().await.map_err(migration_error)?;
            tracing::info!("Migrations applied");
        }
        MigrateAction::Down { steps } => {
            tracing::info!(steps, "Rolling back migrations");
            db.rollback_migrations(steps).await.map_err(migration_error)?;
            tracing::info!("Rollback complete");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await.map_err(migration_error)?;
            let applied = status.iter().filter(|(_, applied)| *applied).count();
            for (name, is_applied) in &status {
                let marker = if *is_applied { "applied" } else { "pending" };
                println!("{:<8} {}", marker, name);
            }
            println!("{} of {} migrations applied", applied, status.len());
        }
        MigrateAction::Fresh { .. } => {
            tracing::warn!("Dropping all tables and re-running migrations");
            db.fresh_migrations().await.map_err(migration_error)?;
            tracing::info!("Fresh schema ready");
        }
    }

    Ok(())
}
