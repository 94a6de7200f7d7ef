mod check;
mod config;
mod dispatch;
mod gateway;
mod payload;
mod platform;
mod reply;
mod resolver;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::dispatch::Dispatcher;

#[derive(Parser)]
#[command(name = "bridgebot", about = "Configuration-driven chat-to-HTTP bridge bot")]
struct Cli {
    /// Path to the YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Suppress non-critical output
    #[arg(long)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the bot
    Start,
    /// Check that the configured API endpoints are reachable
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;
    if cli.quiet {
        config.bot.quiet = true;
    }

    init_tracing(&config)?;

    // Startup-fatal shape errors surface here, before the dispatcher exists
    config.validate()?;

    info!("Configuration loaded from {}", cli.config.display());
    info!("  Channels: {}", config.channels.0.len());

    match cli.command {
        Command::Start => {
            let dispatcher = Arc::new(Dispatcher::new(Arc::new(config)));
            info!("Bot is starting...");
            platform::telegram::run(dispatcher).await?;
        }
        Command::Check => check::run(&config).await,
    }

    Ok(())
}

fn init_tracing(config: &Config) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,bridgebot=debug".into());

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer());

    match &config.bot.log_location {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
            let log_path = dir.join("bridgebot.log");
            let file = std::fs::File::create(&log_path)
                .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Arc::new(file)),
                )
                .init();
        }
        None => registry.init(),
    }

    Ok(())
}
