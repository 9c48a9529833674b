use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::adapters::config::ConfigLoader;
use crate::adapters::http::{HttpLegalSearch, OpenAiClient};
use crate::adapters::sqlite::{
    create_pool, run_migrations, SqliteCacheRepository, SqliteRegulationStore,
    SqliteSessionRepository,
};
use crate::application::QueryPipeline;
use crate::cli::AskArgs;
use crate::domain::models::Query;

/// Handle the ask command: run one query through the pipeline.
pub async fn execute(args: AskArgs, json: bool) -> Result<()> {
    let config = ConfigLoader::load()?;

    let pool = create_pool(&config.database)
        .await
        .context("Failed to open database")?;
    run_migrations(&pool).await.context("Failed to migrate database")?;

    let store = Arc::new(SqliteRegulationStore::new(pool.clone()));
    let search = Arc::new(HttpLegalSearch::new(&config.search)?);
    let llm = Arc::new(OpenAiClient::new(&config.llm)?);
    let cache = Arc::new(SqliteCacheRepository::new(pool.clone()));
    let sessions = Arc::new(SqliteSessionRepository::new(pool));

    let pipeline = QueryPipeline::new(store, search, llm, cache, sessions, &config);

    let mut query = Query::new(args.query);
    if let Some(session) = args.session {
        query = query.with_session(session);
    }
    if let Some(model) = args.model {
        query = query.with_model(model);
    }
    if args.no_cache {
        query = query.bypassing_cache();
    }

    let response = pipeline.handle(query).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!("{}", response.response);
        println!();
        println!(
            "confidence: {:.2}  |  {} ms  |  cached: {}",
            response.confidence, response.execution_time_ms, response.sources.cached
        );
    }
    Ok(())
}
