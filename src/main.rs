use anyhow::Context;
use clap::Parser;
use llm_read::{Config, DEFAULT_ENDPOINT, FileFilterConfig, Pipeline, TokenizerKind};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    name = "llm-read",
    version,
    about = "Send files + prompt to an LLM endpoint with chunking",
    long_about = "Send files + prompt to an LLM endpoint with chunking.\n\n\
    Text files found under the given paths are split into chunks of at most \
    20 KiB characters and sent, together with a system instruction and a \
    prompt, as one chat-completion request.\n\n\
    USAGE EXAMPLES:\n  \
      # Ask about a single file\n  \
      llm-read llama3.2 \"Be terse.\" \"What does this do?\" src/main.rs\n\n  \
      # Ask about a project, skipping lock files\n  \
      llm-read qwen2.5-coder \"You review code.\" \"Find bugs.\" . --exclude '**/*.lock'\n\n  \
      # Only count tokens\n  \
      llm-read llama3.2 \"Be terse.\" \"Summarize.\" docs --dry-run"
)]
struct Cli {
    /// Model name
    model: String,

    /// System instruction for the model
    instruction: String,

    /// User prompt/question
    prompt: String,

    /// File(s) or directory(ies) to include
    #[arg(required = true, value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Chat-completion endpoint URL
    #[arg(long, env = "LLM_READ_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Sampling temperature
    #[arg(long, default_value_t = 0.0)]
    temperature: f64,

    /// Max characters per chunk
    #[arg(long, default_value_t = llm_read::MAX_CHUNK_SIZE)]
    max_chunk_size: usize,

    /// Glob pattern of files or directories to skip (repeatable)
    #[arg(long, value_name = "GLOB")]
    exclude: Vec<String>,

    /// Honor .gitignore files while walking directories
    #[arg(long)]
    gitignore: bool,

    /// Keep duplicate paths reachable through several inputs
    #[arg(long)]
    keep_duplicates: bool,

    /// Tokenizer used for the token count
    #[arg(long, value_enum, default_value = "cl100k")]
    tokenizer: CliTokenizer,

    /// HTTP timeout in seconds (no timeout by default)
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Build the request and count tokens without sending it
    #[arg(long)]
    dry_run: bool,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliTokenizer {
    Cl100k,
    Simple,
}

impl From<CliTokenizer> for TokenizerKind {
    fn from(t: CliTokenizer) -> Self {
        match t {
            CliTokenizer::Cl100k => Self::Cl100k,
            CliTokenizer::Simple => Self::Simple,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose);

    let mut builder = Config::builder()
        .endpoint(cli.endpoint)
        .model(cli.model)
        .temperature(cli.temperature)
        .max_chunk_size(cli.max_chunk_size)
        .file_filter_config(FileFilterConfig::default().exclude(cli.exclude))
        .respect_gitignore(cli.gitignore)
        .dedupe_paths(!cli.keep_duplicates)
        .tokenizer(cli.tokenizer.into())
        .dry_run(cli.dry_run);

    if let Some(secs) = cli.timeout {
        builder = builder.request_timeout(Duration::from_secs(secs));
    }

    let config = builder.build().context("Failed to build configuration")?;
    let pipeline = Pipeline::new(config).context("Failed to create pipeline")?;

    let prepared = pipeline
        .prepare(&cli.instruction, &cli.prompt, &cli.paths)
        .context("Failed to prepare request")?;

    println!("Token count: {}", prepared.token_count);

    if pipeline.config().dry_run {
        println!("Files:");
        for file in &prepared.files {
            println!(" - {}", file.display());
        }
        return Ok(());
    }

    let report = pipeline.send(prepared).context("Request failed")?;

    println!(
        "\n>> Response took :\n {} seconds \n {}",
        report.elapsed_secs(),
        report.answer.unwrap_or_default()
    );

    Ok(())
}

fn setup_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => EnvFilter::new("llm_read=warn"),
        1 => EnvFilter::new("llm_read=info"),
        2 => EnvFilter::new("llm_read=debug"),
        _ => EnvFilter::new("llm_read=trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
