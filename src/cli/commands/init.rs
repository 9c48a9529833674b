use anyhow::{Context as _, Result};

use crate::adapters::config::ConfigLoader;
use crate::adapters::sqlite::{create_pool, run_migrations};
use crate::cli::InitArgs;

/// Handle the init command: create the database and apply migrations.
pub async fn execute(args: InitArgs, json: bool) -> Result<()> {
    let config = match &args.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };

    let pool = create_pool(&config.database)
        .await
        .context("Failed to create database")?;
    run_migrations(&pool).await.context("Failed to apply migrations")?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "database": config.database.path, "status": "ready" })
        );
    } else {
        println!("Database ready at {}", config.database.path);
    }
    Ok(())
}
