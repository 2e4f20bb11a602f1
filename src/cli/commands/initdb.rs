use anyhow::{Context, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::Database;
use tracing::info;

pub async fn init_database(database_url: &str) -> Result<()> {
    info!("Initializing database: {}", database_url);

    // For SQLite URLs, make sure the parent directory exists before
    // connecting; the driver will not create it.
    if let Some(raw_path) = database_url.strip_prefix("sqlite://") {
        let path = raw_path.split('?').next().unwrap_or(raw_path);
        if path != ":memory:" {
            if let Some(parent) = std::path::Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("failed to create directory {}", parent.display())
                    })?;
                }
            }
        }
    }

    let db = Database::connect(database_url)
        .await
        .context("failed to connect to database")?;

    Migrator::up(&db, None)
        .await
        .context("failed to run migrations")?;

    info!("Database initialized successfully");
    Ok(())
}
