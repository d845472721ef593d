//! # llm-read
//!
//! Send local files plus a prompt to a chat-completion endpoint.
//!
//! ## Quick Start
//!
//! ```no_run
//! use llm_read::{Config, Pipeline};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::builder()
//!     .model("llama3.2")
//!     .endpoint("http://localhost:11434/v1/chat/completions")
//!     .build()?;
//!
//! let report = Pipeline::new(config)?.run(
//!     "You are a code reviewer.",
//!     "Where is the config parsed?",
//!     &["./src"],
//! )?;
//! println!("{}", report.answer.unwrap_or_default());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The library follows a linear pipeline:
//! 1. **Scanner**: selects text files, pruning ignored directories
//! 2. **Splitter**: cuts each file into fixed-size character chunks
//! 3. **Message builder**: turns chunks into an ordered conversation
//! 4. **Client**: posts the request and extracts the answer

#![warn(
    missing_docs,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(clippy::module_name_repetitions)]

mod client;
mod config;
mod error;
mod file;
mod filter;
mod message;
mod pipeline;
mod scanner;
mod splitter;
mod stopwatch;
mod token;

pub use client::{ChatClient, ChatRequest, StructuredRequest};
pub use config::{Config, ConfigBuilder, DEFAULT_ENDPOINT};
pub use error::{Error, Result};
pub use file::{DEFAULT_IGNORED_DIRS, DEFAULT_IGNORED_SUFFIXES};
pub use filter::FileFilterConfig;
pub use message::{GUARDRAIL, Message, PROMPT_PREFIX, Role, build_messages};
pub use pipeline::{Pipeline, PreparedRequest, RunReport};
pub use scanner::select_files;
pub use splitter::{ChunkMap, ChunkSet, MAX_CHUNK_SIZE, chunk, chunk_file, split_text};
pub use stopwatch::Stopwatch;
pub use token::{TokenEstimator, TokenizerKind};

/// Runs the whole pipeline with the given configuration.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration is invalid
/// - A selected file cannot be read
/// - The request fails or the response has no answer
pub fn run<P: AsRef<std::path::Path>>(
    config: Config,
    instruction: &str,
    prompt: &str,
    paths: &[P],
) -> Result<RunReport> {
    Pipeline::new(config)?.run(instruction, prompt, paths)
}
