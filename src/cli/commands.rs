//! CLI command definitions and handlers

use clap::Subcommand;
use std::path::PathBuf;
use tracing::info;

use crate::core::models::{TranslateOptions, TranslationRequest};
use crate::core::router::TranslationRouter;

/// Commands for the translation router
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Translate a single text
    Translate {
        /// Text to translate
        text: String,

        /// Source language (auto-detect if not specified)
        #[arg(long)]
        source_lang: Option<String>,

        /// Target language (default: configured default)
        #[arg(short, long)]
        target_lang: Option<String>,

        /// Force a specific adapter
        #[arg(long)]
        adapter: Option<String>,
    },

    /// Translate several texts, preserving order
    Batch {
        /// Texts to translate
        texts: Vec<String>,

        /// Read texts from a file, one per line
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Source language (auto-detect if not specified)
        #[arg(long)]
        source_lang: Option<String>,

        /// Target language (default: configured default)
        #[arg(short, long)]
        target_lang: Option<String>,

        /// Force a specific adapter
        #[arg(long)]
        adapter: Option<String>,
    },

    /// Detect the language of a text
    Detect {
        /// Text to inspect
        text: String,
    },

    /// List languages offered by registered adapters
    Languages,

    /// Check whether any adapter supports a language pair
    SupportsPair {
        /// Source language
        source: String,

        /// Target language
        target: String,
    },

    /// Show registered adapters and their availability
    Status,
}

/// Dispatch a parsed command
pub async fn run(router: &TranslationRouter, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Translate {
            text,
            source_lang,
            target_lang,
            adapter,
        } => handle_translate(router, text, source_lang, target_lang, adapter).await,
        Commands::Batch {
            texts,
            file,
            source_lang,
            target_lang,
            adapter,
        } => handle_batch(router, texts, file, source_lang, target_lang, adapter).await,
        Commands::Detect { text } => handle_detect(router, text).await,
        Commands::Languages => handle_languages(router).await,
        Commands::SupportsPair { source, target } => {
            handle_supports_pair(router, source, target).await
        }
        Commands::Status => handle_status(router).await,
    }
}

fn options_for(adapter: Option<String>) -> TranslateOptions {
    TranslateOptions {
        adapter,
        ..Default::default()
    }
}

/// Handle single translation command
pub async fn handle_translate(
    router: &TranslationRouter,
    text: String,
    source_lang: Option<String>,
    target_lang: Option<String>,
    adapter: Option<String>,
) -> anyhow::Result<()> {
    let target_lang =
        target_lang.unwrap_or_else(|| router.config().default_target_language.clone());
    info!("Translating into {}", target_lang);

    let mut request = TranslationRequest::new(text, target_lang).with_options(options_for(adapter));
    request.source_lang = source_lang;

    let translation = router.translate(&request).await?;
    println!("{}", translation);
    Ok(())
}

/// Handle batch translation command
pub async fn handle_batch(
    router: &TranslationRouter,
    mut texts: Vec<String>,
    file: Option<PathBuf>,
    source_lang: Option<String>,
    target_lang: Option<String>,
    adapter: Option<String>,
) -> anyhow::Result<()> {
    if let Some(file) = file {
        let content = tokio::fs::read_to_string(&file).await?;
        texts.extend(
            content
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(str::to_string),
        );
    }

    if texts.is_empty() {
        anyhow::bail!("No texts to translate");
    }

    let target_lang =
        target_lang.unwrap_or_else(|| router.config().default_target_language.clone());
    info!("Translating {} texts into {}", texts.len(), target_lang);

    let translations = router
        .translate_batch(&texts, source_lang.as_deref(), &target_lang, &options_for(adapter))
        .await?;

    for translation in translations {
        println!("{}", translation);
    }
    Ok(())
}

/// Handle detect command
pub async fn handle_detect(router: &TranslationRouter, text: String) -> anyhow::Result<()> {
    let detection = router.detect_language(&text).await?;
    println!("{} (confidence {:.2})", detection.language, detection.confidence);
    Ok(())
}

/// Handle languages command
pub async fn handle_languages(router: &TranslationRouter) -> anyhow::Result<()> {
    let languages = router.supported_languages().await?;

    if languages.is_empty() {
        println!("No adapter reports supported languages");
        return Ok(());
    }

    for entry in languages {
        let targets: Vec<&str> = entry.targets.iter().map(String::as_str).collect();
        println!("{:<4} {:<20} -> {}", entry.code, entry.name, targets.join(", "));
    }
    Ok(())
}

/// Handle supports-pair command
pub async fn handle_supports_pair(
    router: &TranslationRouter,
    source: String,
    target: String,
) -> anyhow::Result<()> {
    let supported = router.supports_pair(&source, &target).await;
    println!("{} -> {}: {}", source, target, if supported { "supported" } else { "not supported" });
    Ok(())
}

/// Handle status command
pub async fn handle_status(router: &TranslationRouter) -> anyhow::Result<()> {
    for descriptor in router.adapters().await {
        println!(
            "{:<16} priority {:>4}  {}",
            descriptor.adapter_id,
            descriptor.priority,
            if descriptor.available { "available" } else { "unavailable" }
        );
    }

    println!(
        "Credentials configured: {}",
        if router.any_adapter_configured() { "yes" } else { "no" }
    );
    Ok(())
}
