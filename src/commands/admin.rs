//! Admin command - Bootstrap admin accounts from the shell.

use crate::cli::args::{AdminAction, AdminArgs};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::Database;
use crate::services::{ServiceContainer, Services};

/// Execute the admin command
pub async fn execute(args: AdminArgs, config: Config) -> AppResult<()> {
    let db = Database::connect(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;
    let services = Services::from_connection(db.get_connection(), config);

    match args.action {
        AdminAction::Create {
            name,
            email,
            password,
        } => {
            let user = services
                .users()
                .bootstrap_admin(name, email, password)
                .await?;
            println!("Admin ready: {} <{}> ({})", user.name, user.email, user.id);
        }
    }

    Ok(())
}
