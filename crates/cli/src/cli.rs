use std::path::PathBuf;

use clap::Parser;

/// Ask questions about a contract document.
///
/// Extracts text from a PDF, DOCX, or plain-text file, splits it into
/// chunks, and queries the configured LLM provider over each chunk
/// concurrently, joining the per-chunk answers.
#[derive(Parser, Debug)]
#[command(name = "parchment", about = "Ask questions about a contract document")]
pub struct CliArgs {
    /// Document to analyze (.pdf, .docx, or .txt)
    #[arg(long)]
    pub file: PathBuf,

    /// MIME type override (detected from the file extension if not set)
    #[arg(long)]
    pub mime: Option<String>,

    /// The question to answer
    pub question: String,

    /// LLM provider override: openai, anthropic, or ollama
    #[arg(long)]
    pub provider: Option<String>,

    /// Per-call chunk bound in UTF-8 bytes
    #[arg(long, env = "PARCHMENT_CHUNK_BYTES")]
    pub chunk_bytes: Option<usize>,

    /// Concurrent in-flight chunk queries
    #[arg(long, env = "PARCHMENT_CONCURRENCY")]
    pub concurrency: Option<usize>,

    /// Rate-limited attempts per chunk before giving up
    #[arg(long, env = "PARCHMENT_MAX_RETRIES")]
    pub max_retries: Option<u32>,
}
