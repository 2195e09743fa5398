//! CLI command definitions and handlers

use clap::Subcommand;
use std::path::PathBuf;

use crate::core::config::{FallbackMode, TranslatorConfig};

/// Commands for Batch Translator
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Translate texts through a translation service
    Translate {
        /// Texts to translate (ignored when --file is given)
        texts: Vec<String>,

        /// Read texts from a file, one per line ("-" for stdin)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Write translations to a file, one per line (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Service host
        #[arg(long)]
        host: Option<String>,

        /// Service port
        #[arg(short, long)]
        port: Option<u16>,

        /// Source language
        #[arg(long)]
        source_lang: Option<String>,

        /// Target language
        #[arg(short, long)]
        target_lang: Option<String>,

        /// Texts per request
        #[arg(short, long)]
        batch_size: Option<usize>,

        /// Maximum chunks in flight
        #[arg(long)]
        max_concurrent: Option<usize>,

        /// What to keep when a chunk fails
        #[arg(long, value_enum)]
        fallback: Option<FallbackMode>,
    },

    /// Start the translation service
    Serve {
        /// Bind address (default: 0.0.0.0)
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Listen port (default: 50051)
        #[arg(short, long, default_value_t = 50051)]
        port: u16,

        /// Timeout for upstream translation requests in milliseconds
        #[arg(long, default_value_t = 10000)]
        timeout_ms: u64,
    },
}

/// Command-line overrides for the translate command
#[derive(Debug, Default)]
pub struct TranslateOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub source_lang: Option<String>,
    pub target_lang: Option<String>,
    pub batch_size: Option<usize>,
    pub max_concurrent: Option<usize>,
    pub fallback: Option<FallbackMode>,
}

impl TranslateOverrides {
    /// Apply on top of loaded configuration
    pub fn apply(self, mut config: TranslatorConfig) -> TranslatorConfig {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(source_lang) = self.source_lang {
            config.source_lang = source_lang;
        }
        if let Some(target_lang) = self.target_lang {
            config.target_lang = target_lang;
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(max_concurrent) = self.max_concurrent {
            config.max_concurrent = max_concurrent;
        }
        if let Some(fallback) = self.fallback {
            config.fallback = fallback;
        }
        config
    }
}

/// Read input texts, one per line. Empty lines are kept.
async fn read_texts(file: Option<PathBuf>, texts: Vec<String>) -> anyhow::Result<Vec<String>> {
    use tokio::io::AsyncReadExt;

    let content = match file {
        None => return Ok(texts),
        Some(path) if path.as_os_str() == "-" => {
            let mut content = String::new();
            tokio::io::stdin().read_to_string(&mut content).await?;
            content
        }
        Some(path) => tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| anyhow::anyhow!("failed to read {}: {}", path.display(), e))?,
    };

    Ok(content.lines().map(str::to_string).collect())
}

/// One translation per line; line breaks inside a translation become spaces
/// so output line `i` always belongs to input line `i`
fn render_lines(translations: &[String]) -> String {
    let mut rendered = String::new();
    for text in translations {
        let line = text.replace("\r\n", " ").replace(['\n', '\r'], " ");
        rendered.push_str(&line);
        rendered.push('\n');
    }
    rendered
}

/// Handle translate command
pub async fn handle_translate(
    config: TranslatorConfig,
    overrides: TranslateOverrides,
    file: Option<PathBuf>,
    texts: Vec<String>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    use crate::core::client::TranslatorClient;
    use crate::core::models::ChunkOutcome;
    use crate::core::orchestrator::{plan_chunks, ChunkEvent};
    use indicatif::{ProgressBar, ProgressStyle};
    use tracing::info;

    let config = overrides.apply(config);
    let texts = read_texts(file, texts).await?;

    if texts.is_empty() {
        anyhow::bail!("No texts to translate");
    }

    info!("Starting translation");
    info!("Service: {}", config.endpoint());
    info!("Languages: {}", config.language_pair());
    info!("Texts: {}, batch size: {}", texts.len(), config.batch_size);

    let client = TranslatorClient::connect(config)?;
    let chunk_count = plan_chunks(texts.len(), client.config().batch_size).len();

    // Create progress bar
    let pb = ProgressBar::new(chunk_count as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({eta}) {msg}")?
            .progress_chars("=>-"),
    );

    let on_chunk = |event: &ChunkEvent| {
        if event.outcome == ChunkOutcome::FallenBack {
            pb.set_message(format!("chunk {} kept original text", event.chunk_index + 1));
        }
        pb.inc(1);
    };

    let report = client
        .translate_all_with(&texts, &client.language_pair(), Some(&on_chunk))
        .await;
    client.close();

    pb.finish_with_message("Completed");

    let rendered = render_lines(&report.translations);

    match &output {
        Some(path) => {
            tokio::fs::write(path, rendered)
                .await
                .map_err(|e| anyhow::anyhow!("failed to write {}: {}", path.display(), e))?;
            info!("Wrote {} translations to {}", report.translations.len(), path.display());
        }
        None => print!("{}", rendered),
    }

    eprintln!("\n✅ Translation completed!");
    eprintln!("   Texts: {}", report.translations.len());
    eprintln!("   Chunks: {}", report.chunk_count);
    eprintln!("   Degraded chunks: {}", report.degraded_chunks.len());
    eprintln!("   Untranslated texts: {}", report.untranslated_items);
    eprintln!("   Time: {:?}", report.elapsed);

    Ok(())
}

/// Handle serve command
pub async fn handle_serve(host: String, port: u16, timeout_ms: u64) -> anyhow::Result<()> {
    use crate::server::api::run_server;
    use crate::server::google::GoogleTranslateEngine;
    use std::sync::Arc;
    use std::time::Duration;
    use tracing::info;

    let engine = GoogleTranslateEngine::new(Duration::from_millis(timeout_ms))?;

    info!("Starting translation service on {}:{}", host, port);
    eprintln!("🚀 Translation service starting on http://{}:{}", host, port);

    run_server(host, port, Arc::new(engine)).await
}
