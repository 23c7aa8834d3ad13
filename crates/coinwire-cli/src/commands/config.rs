use anyhow::Result;

use coinwire_core::AppConfig;

pub fn run(config: &AppConfig) -> Result<()> {
    let path = AppConfig::config_path();
    let note = if path.exists() { "" } else { " (not found, using defaults)" };

    println!("# Config file: {}{}", path.display(), note);
    println!("# Log file: {}\n", config.log_path().display());
    print!("{}", config.to_toml()?);

    Ok(())
}
