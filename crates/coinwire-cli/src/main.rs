use std::fs::{self, OpenOptions};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use coinwire_core::AppConfig;

mod commands;

#[derive(Parser)]
#[command(name = "coinwire")]
#[command(author, version, about = "A terminal crypto news reader")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the TUI
    Run,
    /// Run one fetch cycle and print the result
    Fetch {
        /// Only keep articles matching this category tag
        #[arg(short, long, default_value = "all")]
        category: String,
        /// Only keep articles whose title, description or source contains this text
        #[arg(short, long, default_value = "")]
        search: String,
        /// Print JSON instead of text cards
        #[arg(long)]
        json: bool,
        /// Maximum number of articles to print
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// List configured news sources
    Sources,
    /// Show the configuration file path and effective settings
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Arc::new(AppConfig::load()?);

    let tui = matches!(cli.command, Some(Commands::Run) | None);
    init_logging(&config, tui)?;

    // Handle commands
    match cli.command {
        Some(Commands::Run) | None => commands::run::run(config).await,
        Some(Commands::Fetch {
            category,
            search,
            json,
            limit,
        }) => commands::fetch::run(&config, &category, &search, json, limit).await,
        Some(Commands::Sources) => commands::sources::run(&config),
        Some(Commands::Config) => commands::config::run(&config),
    }
}

/// Install the tracing subscriber. `RUST_LOG` wins over `general.log_level`;
/// the TUI logs to a file so output does not corrupt the screen.
fn init_logging(config: &AppConfig, tui: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    if tui {
        let log_path = config.log_path();
        if let Some(parent) = log_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&log_path)?;

        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    Ok(())
}
