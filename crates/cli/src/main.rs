mod cli;

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;

use parchment_core::config::{load_dotenv, Config};
use parchment_extract::{extract_text, MIME_DOCX, MIME_PDF, MIME_TEXT};
use parchment_llm::providers::create_provider;
use parchment_query::{AnswerPipeline, ProgressSink};

use crate::cli::CliArgs;

/// Map a file extension to one of the supported MIME types.
fn mime_from_path(path: &Path) -> Option<&'static str> {
    match path.extension()?.to_str()? {
        "pdf" => Some(MIME_PDF),
        "docx" => Some(MIME_DOCX),
        "txt" | "text" | "md" => Some(MIME_TEXT),
        _ => None,
    }
}

/// Logs each completed fraction as a percentage.
struct LogSink;

impl ProgressSink for LogSink {
    fn report(&self, fraction: f32) {
        info!("progress: {:.0}%", fraction * 100.0);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();

    load_dotenv();
    let mut config = Config::from_env();
    if let Some(provider) = args.provider {
        config.llm.provider = provider;
    }
    if let Some(chunk_bytes) = args.chunk_bytes {
        config.query.max_chunk_bytes = chunk_bytes;
    }
    if let Some(concurrency) = args.concurrency {
        config.query.max_concurrency = concurrency;
    }
    if let Some(max_retries) = args.max_retries {
        config.query.max_retries = max_retries;
    }
    config.log_summary();

    let mime = match args.mime.as_deref() {
        Some(m) => m,
        None => match mime_from_path(&args.file) {
            Some(m) => m,
            None => bail!(
                "cannot detect file type of {}; pass --mime",
                args.file.display()
            ),
        },
    };

    let bytes = std::fs::read(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let text = extract_text(&bytes, mime).context("text extraction failed")?;
    info!("extracted {} bytes of text", text.len());

    let provider = create_provider(&config.llm, &config.ollama)
        .context("failed to create LLM provider")?;

    let pipeline = AnswerPipeline::new(Arc::from(provider), config.query.clone())
        .with_sampling(config.llm.temperature, config.llm.max_tokens);
    let answer = pipeline
        .answer(&text, &args.question, &LogSink)
        .await
        .context("query failed")?;

    println!("{}", answer);
    Ok(())
}
