use anyhow::Result;

use coinwire_core::{Aggregator, AppConfig};

pub fn run(config: &AppConfig) -> Result<()> {
    let aggregator = Aggregator::from_config(config)?;

    if aggregator.sources().is_empty() {
        println!("All sources are disabled.");
        println!("\nEnable them under [sources] in:");
        println!("  {}", AppConfig::config_path().display());
        return Ok(());
    }

    println!("Sources ({}):\n", aggregator.sources().len());
    for source in aggregator.sources() {
        println!("  {}", source.name());
        println!("    URL: {}", source.endpoint());
    }

    let disabled: Vec<&str> = [
        ("news", config.sources.news.enabled),
        ("trending", config.sources.trending.enabled),
        ("status_updates", config.sources.status_updates.enabled),
    ]
    .iter()
    .filter(|(_, enabled)| !enabled)
    .map(|(key, _)| *key)
    .collect();

    if !disabled.is_empty() {
        println!("\nDisabled: {}", disabled.join(", "));
    }

    Ok(())
}
