//! Main entry point for Batch Translator CLI

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use batch_translator::cli::commands::{self, Commands, TranslateOverrides};
use batch_translator::TranslatorConfig;

/// Batch Translator - chunked translation client and service
#[derive(Parser, Debug)]
#[command(name = "batch-translator", version, about, long_about = None)]
struct Args {
    /// Configuration file (JSON or TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

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
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{}={}", env!("CARGO_PKG_NAME").replace('-', "_"), log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Execute command
    match args.command {
        Some(Commands::Translate {
            texts,
            file,
            output,
            host,
            port,
            source_lang,
            target_lang,
            batch_size,
            max_concurrent,
            fallback,
        }) => {
            let config = TranslatorConfig::load(args.config.as_ref())?;
            let overrides = TranslateOverrides {
                host,
                port,
                source_lang,
                target_lang,
                batch_size,
                max_concurrent,
                fallback,
            };
            commands::handle_translate(config, overrides, file, texts, output).await?;
        }
        Some(Commands::Serve {
            host,
            port,
            timeout_ms,
        }) => {
            commands::handle_serve(host, port, timeout_ms).await?;
        }
        None => {
            println!("Please specify a command. Use --help for more information.");
        }
    }

    Ok(())
}
