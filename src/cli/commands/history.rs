use anyhow::{Context as _, Result};
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};

use crate::adapters::config::ConfigLoader;
use crate::adapters::sqlite::{create_pool, run_migrations, SqliteSessionRepository};
use crate::cli::HistoryArgs;
use crate::domain::ports::SessionRepository;

/// Handle the history command: list the recorded turns of a session.
pub async fn execute(args: HistoryArgs, json: bool) -> Result<()> {
    let config = ConfigLoader::load()?;

    let pool = create_pool(&config.database)
        .await
        .context("Failed to open database")?;
    run_migrations(&pool).await.context("Failed to migrate database")?;

    let sessions = SqliteSessionRepository::new(pool);
    let turns = sessions
        .recent_turns(&args.session, args.limit)
        .await
        .context("Failed to read session history")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&turns)?);
        return Ok(());
    }

    if turns.is_empty() {
        println!("No turns recorded for session '{}'.", args.session);
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "Query", "Confidence", "At"]);

    for turn in &turns {
        table.add_row(vec![
            turn.turn_number.to_string(),
            truncate(&turn.query, 60),
            format!("{:.2}", turn.confidence),
            turn.created_at.format("%Y-%m-%d %H:%M").to_string(),
        ]);
    }

    println!("{table}");
    println!("\nShowing {} turn(s)", turns.len());
    Ok(())
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let prefix: String = text.chars().take(max_chars).collect();
        format!("{prefix}…")
    }
}
