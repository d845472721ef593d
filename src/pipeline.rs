use crate::{
    client::{ChatClient, ChatRequest},
    config::Config,
    error::Result,
    message::build_messages,
    scanner::Scanner,
    splitter::{ChunkMap, chunk_all},
    stopwatch::Stopwatch,
    token::TokenEstimator,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// A request that has been assembled but not sent yet.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    /// Files selected from the input paths, in message order
    pub files: Vec<PathBuf>,

    /// Chunks per selected file
    pub chunks: ChunkMap,

    /// Request body
    pub request: ChatRequest,

    /// Token count of the serialized request
    pub token_count: usize,
}

impl PreparedRequest {
    /// Returns the number of chunk messages in the request.
    #[must_use]
    pub fn total_chunks(&self) -> usize {
        self.chunks.total_chunks()
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Files included in the request
    pub files: Vec<PathBuf>,

    /// Number of chunk messages sent
    pub total_chunks: usize,

    /// Token count of the serialized request
    pub token_count: usize,

    /// Answer text, absent in dry run mode
    pub answer: Option<String>,

    /// Time between sending the request and receiving the answer
    pub elapsed: Option<Duration>,
}

impl RunReport {
    /// Elapsed time in seconds, `0.0` when nothing was sent.
    #[must_use]
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.map_or(0.0, |d| d.as_secs_f64())
    }
}

/// Selects, chunks, packages and sends files to the endpoint.
pub struct Pipeline {
    config: Config,
    scanner: Scanner,
    tokenizer: Arc<dyn TokenEstimator>,
    client: ChatClient,
}

impl Pipeline {
    /// Creates a new pipeline with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration validation fails
    /// - The tokenizer cannot be loaded
    /// - The HTTP client cannot be built
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let scanner = Scanner::new(&config)?;
        let tokenizer = config.tokenizer.create()?;
        let client = ChatClient::new(config.endpoint.clone(), config.request_timeout)?;

        Ok(Self {
            config,
            scanner,
            tokenizer,
            client,
        })
    }

    /// Returns the configuration this pipeline was built with.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Selects and chunks files, then builds and measures the request.
    ///
    /// # Errors
    ///
    /// Returns an error if a selected file cannot be read or the request
    /// cannot be serialized.
    #[instrument(skip_all, fields(inputs = paths.len()))]
    pub fn prepare<P: AsRef<Path>>(
        &self,
        instruction: &str,
        prompt: &str,
        paths: &[P],
    ) -> Result<PreparedRequest> {
        let files = self.scanner.select(paths);
        if files.is_empty() {
            warn!("No text files selected; sending the prompt without file context");
        } else {
            info!("Selected {} file(s)", files.len());
        }
        for file in &files {
            debug!("  - {}", file.display());
        }

        let chunks = chunk_all(&files, self.config.max_chunk_size)?;
        info!(
            "Chunked {} file(s) into {} chunk(s)",
            chunks.len(),
            chunks.total_chunks()
        );

        let messages = build_messages(instruction, prompt, &chunks);
        let request = ChatRequest::new(self.config.model.clone(), messages)
            .with_temperature(self.config.temperature);
        let token_count = self.tokenizer.estimate(&request.to_json()?);

        Ok(PreparedRequest {
            files,
            chunks,
            request,
            token_count,
        })
    }

    /// Sends a prepared request and waits for the answer.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status or a
    /// response without an answer.
    pub fn send(&self, prepared: PreparedRequest) -> Result<RunReport> {
        info!(
            "Sending {} message(s) to {}",
            prepared.request.messages.len(),
            self.client.endpoint()
        );

        let watch = Stopwatch::start();
        let answer = self.client.complete(&prepared.request)?;
        let elapsed = watch.elapsed();

        info!("Answer received in {:.2}s", elapsed.as_secs_f64());

        Ok(RunReport {
            total_chunks: prepared.total_chunks(),
            files: prepared.files,
            token_count: prepared.token_count,
            answer: Some(answer),
            elapsed: Some(elapsed),
        })
    }

    /// Prepares and, unless in dry run mode, sends the request.
    ///
    /// # Errors
    ///
    /// Returns an error if any stage fails.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use llm_read::{Config, Pipeline};
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let config = Config::builder().model("llama3.2").build()?;
    /// let report = Pipeline::new(config)?.run("Be terse.", "What does main do?", &["./src"])?;
    /// println!("{}", report.answer.unwrap_or_default());
    /// # Ok(())
    /// # }
    /// ```
    pub fn run<P: AsRef<Path>>(
        &self,
        instruction: &str,
        prompt: &str,
        paths: &[P],
    ) -> Result<RunReport> {
        let prepared = self.prepare(instruction, prompt, paths)?;

        if self.config.dry_run {
            warn!("Dry run mode enabled - request not sent");
            return Ok(RunReport {
                total_chunks: prepared.total_chunks(),
                files: prepared.files,
                token_count: prepared.token_count,
                answer: None,
                elapsed: None,
            });
        }

        self.send(prepared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{GUARDRAIL, Message};
    use crate::token::TokenizerKind;
    use assert_fs::prelude::*;
    use mockito::Matcher;
    use serde_json::json;

    fn config_for(endpoint: &str) -> Config {
        Config::builder()
            .endpoint(endpoint)
            .model("test-model")
            .tokenizer(TokenizerKind::Simple)
            .build()
            .unwrap()
    }

    #[test]
    fn test_prepare_builds_ordered_messages() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("b.txt").write_str("bbbbbbbb").unwrap();
        temp.child("a.txt").write_str("aa").unwrap();
        temp.child("node_modules/x.js").write_str("x").unwrap();

        let config = Config::builder()
            .endpoint("http://localhost:1/v1/chat/completions")
            .max_chunk_size(5)
            .tokenizer(TokenizerKind::Simple)
            .build()
            .unwrap();
        let pipeline = Pipeline::new(config).unwrap();
        let prepared = pipeline.prepare(" sys ", " ask ", &[temp.path()]).unwrap();

        let a = temp.path().join("a.txt");
        let b = temp.path().join("b.txt");
        assert_eq!(prepared.files, vec![a.clone(), b.clone()]);
        assert_eq!(prepared.total_chunks(), 3);

        let messages = &prepared.request.messages;
        assert_eq!(messages.len(), 6);
        assert_eq!(messages[0], Message::system("sys"));
        assert_eq!(messages[1], Message::system(GUARDRAIL));
        assert_eq!(
            messages[2].content,
            format!("File: {}\n```\naa\n```", a.display())
        );
        assert_eq!(
            messages[3].content,
            format!("File: {} [chunk 1/2]\n```\nbbbbb\n```", b.display())
        );
        assert_eq!(
            messages[4].content,
            format!("File: {} [chunk 2/2]\n```\nbbb\n```", b.display())
        );
        assert_eq!(messages[5], Message::user("User prompt: ask"));

        let json = prepared.request.to_json().unwrap();
        assert_eq!(prepared.token_count, json.chars().count().div_ceil(4));
    }

    #[test]
    fn test_kept_duplicates_are_sent_once() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("a.txt").write_str("hello").unwrap();
        let file = temp.path().join("a.txt");

        let config = Config::builder()
            .endpoint("http://localhost:1/v1/chat/completions")
            .tokenizer(TokenizerKind::Simple)
            .dedupe_paths(false)
            .build()
            .unwrap();
        let pipeline = Pipeline::new(config).unwrap();
        let prepared = pipeline
            .prepare("i", "p", &[temp.path().to_path_buf(), file.clone()])
            .unwrap();

        assert_eq!(prepared.files, vec![file.clone(), file.clone()]);
        assert_eq!(prepared.chunks.len(), 1);
        assert_eq!(prepared.total_chunks(), 1);

        let messages = &prepared.request.messages;
        assert_eq!(messages.len(), 4);
        assert_eq!(
            messages[2].content,
            format!("File: {}\n```\nhello\n```", file.display())
        );
    }

    #[test]
    fn test_run_sends_request() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("keep.py").write_str("print(1)").unwrap();

        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_body(Matcher::PartialJson(json!({
                "model": "test-model",
                "temperature": 0.0
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"content":"It prints 1."}}]}"#)
            .create();

        let config = config_for(&format!("{}/v1/chat/completions", server.url()));
        let report = Pipeline::new(config)
            .unwrap()
            .run("Explain.", "What happens?", &[temp.path()])
            .unwrap();

        mock.assert();
        assert_eq!(report.answer.as_deref(), Some("It prints 1."));
        assert_eq!(report.files, vec![temp.path().join("keep.py")]);
        assert_eq!(report.total_chunks, 1);
        assert!(report.elapsed.is_some());
        assert!(report.token_count > 0);
    }

    #[test]
    fn test_run_propagates_http_error() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(404)
            .with_body("model 'test-model' not found")
            .create();

        let config = config_for(&format!("{}/v1/chat/completions", server.url()));
        let err = Pipeline::new(config)
            .unwrap()
            .run("i", "p", &[] as &[&Path])
            .unwrap_err();

        assert!(err.is_http());
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn test_dry_run_sends_nothing() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("a.txt").write_str("a").unwrap();

        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create();

        let config = Config::builder()
            .endpoint(format!("{}/v1/chat/completions", server.url()))
            .tokenizer(TokenizerKind::Simple)
            .dry_run(true)
            .build()
            .unwrap();
        let report = Pipeline::new(config)
            .unwrap()
            .run("i", "p", &[temp.path()])
            .unwrap();

        mock.assert();
        assert!(report.answer.is_none());
        assert_eq!(report.elapsed_secs(), 0.0);
        assert_eq!(report.files.len(), 1);
    }
}
