//! System status command.

use anyhow::Result;
use console::style;

use botforge_core::port::HistoryStore;

use crate::state::AppState;

/// Display configuration and the bots cached under the data directory.
///
/// Runs without the server: it reads the local `{name}.bot.json` blobs
/// directly, so it shows what a fresh process could seed from disk.
pub async fn status(state: &AppState, json: bool) -> Result<()> {
    let names = local_bot_names(state).await?;

    let mut bots = Vec::new();
    for name in &names {
        if let Ok(Some(config)) = state.history_store.load_config(name).await {
            bots.push(config);
        }
    }

    if json {
        let status = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "data_dir": state.data_dir.display().to_string(),
            "memory": state.config.memory_url,
            "generator": state.registry.generator_availability(),
            "bots": bots,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Botforge v{}",
        style("⚡").bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("  Data dir:  {}", state.data_dir.display());
    println!("  Memory:    {}", state.config.memory_url);
    println!(
        "  Generator: {}",
        state.registry.generator_availability()
    );
    println!();
    if bots.is_empty() {
        println!("  {}", style("No bots cached locally.").dim());
    } else {
        println!("  Cached bots:");
        for config in &bots {
            println!(
                "    {} {} ({} tokens max)",
                style("•").bold(),
                style(&config.name).cyan(),
                config.max_length
            );
        }
    }
    println!();
    Ok(())
}

/// Bot names derived from `{name}.bot.json` files in the data directory.
async fn local_bot_names(state: &AppState) -> Result<Vec<String>> {
    let mut names = Vec::new();
    let mut entries = match tokio::fs::read_dir(&state.data_dir).await {
        Ok(entries) => entries,
        Err(_) => return Ok(names),
    };

    while let Some(entry) = entries.next_entry().await? {
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        if let Some(name) = file_name.strip_suffix(".bot.json") {
            names.push(name.to_string());
        }
    }

    names.sort();
    Ok(names)
}
