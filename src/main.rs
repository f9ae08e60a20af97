//! Main entry point for the translation router CLI

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use translation_router::adapters::builtin_registry;
use translation_router::cli::commands::{self, Commands};
use translation_router::{RouterConfig, TranslationRouter};

/// Translation Router - route translations across adapters with caching and fallback
#[derive(Parser, Debug)]
#[command(name = "translation-router", version, about, long_about = None)]
struct Args {
    /// Configuration file (YAML, JSON or TOML); defaults to ROUTER_CONFIG or environment
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Glossary file for the glossary adapter
    #[arg(long)]
    glossary: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("translation_router={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let Some(command) = args.command else {
        println!("Please specify a command. Use --help for more information.");
        return Ok(());
    };

    let mut config = match args.config {
        Some(path) => RouterConfig::from_file(path)?,
        None => RouterConfig::load()?,
    };

    // CLI args override config
    if let Some(glossary) = args.glossary {
        config.glossary_path = Some(glossary);
    }
    config.validate()?;

    let registry = builtin_registry(&config)?;
    let router = TranslationRouter::with_memory_cache(config, registry)?;

    commands::run(&router, command).await
}
