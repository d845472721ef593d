use crate::error::{Error, Result};
use crate::filter::{FileFilter, FileFilterConfig};
use crate::splitter::MAX_CHUNK_SIZE;
use crate::token::TokenizerKind;
use std::time::Duration;

/// Endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "https://ollama.themajorones.dev/v1/chat/completions";

const DEFAULT_MODEL: &str = "llama3.2";
const DEFAULT_TEMPERATURE: f64 = 0.0;

/// Configuration for a single run.
///
/// Use [`Config::builder()`] to construct a new configuration.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Config {
    /// Chat-completion endpoint URL
    pub endpoint: String,

    /// Model identifier sent with the request
    pub model: String,

    /// Sampling temperature
    pub temperature: f64,

    /// Maximum characters per chunk
    pub max_chunk_size: usize,

    /// Ignore lists and exclusion globs
    pub file_filter_config: FileFilterConfig,

    /// Honor `.gitignore` files while walking directories
    pub respect_gitignore: bool,

    /// Drop duplicate paths from the selection
    pub dedupe_paths: bool,

    /// Tokenizer used for the request token count
    pub tokenizer: TokenizerKind,

    /// HTTP timeout, none by default
    pub request_timeout: Option<Duration>,

    /// Build the request without sending it
    pub dry_run: bool,
}

impl Config {
    /// Creates a new configuration builder.
    ///
    /// # Examples
    ///
    /// ```
    /// use llm_read::Config;
    ///
    /// let config = Config::builder()
    ///     .model("llama3.2")
    ///     .max_chunk_size(8 * 1024)
    ///     .build()
    ///     .expect("valid configuration");
    /// assert_eq!(config.max_chunk_size, 8192);
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The model name is empty
    /// - The endpoint is not an http(s) URL
    /// - The chunk size is zero
    /// - The temperature is negative or not finite
    /// - An exclusion glob is invalid
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(Error::config("model must not be empty"));
        }

        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(Error::config(format!(
                "endpoint must be an http:// or https:// URL, got '{}'",
                self.endpoint
            )));
        }

        if self.max_chunk_size == 0 {
            return Err(Error::config("max_chunk_size must be greater than 0"));
        }

        if !self.temperature.is_finite() || self.temperature < 0.0 {
            return Err(Error::config(format!(
                "temperature must be a non-negative number, got {}",
                self.temperature
            )));
        }

        FileFilter::build_globset(self.file_filter_config.exclude_globs())?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_chunk_size: MAX_CHUNK_SIZE,
            file_filter_config: FileFilterConfig::default(),
            respect_gitignore: false,
            dedupe_paths: true,
            tokenizer: TokenizerKind::default(),
            request_timeout: None,
            dry_run: false,
        }
    }
}

/// Builder for creating a [`Config`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    endpoint: Option<String>,
    model: Option<String>,
    temperature: Option<f64>,
    max_chunk_size: Option<usize>,
    file_filter_config: Option<FileFilterConfig>,
    respect_gitignore: bool,
    dedupe_paths: Option<bool>,
    tokenizer: Option<TokenizerKind>,
    request_timeout: Option<Duration>,
    dry_run: bool,
}

impl ConfigBuilder {
    /// Sets the endpoint URL.
    #[must_use]
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = Some(url.into());
        self
    }

    /// Sets the model identifier.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub const fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the maximum characters per chunk.
    #[must_use]
    pub const fn max_chunk_size(mut self, chars: usize) -> Self {
        self.max_chunk_size = Some(chars);
        self
    }

    /// Sets the ignore lists and exclusion globs.
    #[must_use]
    pub fn file_filter_config(mut self, config: FileFilterConfig) -> Self {
        self.file_filter_config = Some(config);
        self
    }

    /// Enables or disables `.gitignore` handling.
    #[must_use]
    pub const fn respect_gitignore(mut self, enabled: bool) -> Self {
        self.respect_gitignore = enabled;
        self
    }

    /// Enables or disables duplicate path removal.
    #[must_use]
    pub const fn dedupe_paths(mut self, enabled: bool) -> Self {
        self.dedupe_paths = Some(enabled);
        self
    }

    /// Sets the tokenizer implementation.
    #[must_use]
    pub const fn tokenizer(mut self, kind: TokenizerKind) -> Self {
        self.tokenizer = Some(kind);
        self
    }

    /// Sets an HTTP timeout.
    #[must_use]
    pub const fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Enables dry run mode (nothing is sent).
    #[must_use]
    pub const fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn build(self) -> Result<Config> {
        let config = Config {
            endpoint: self
                .endpoint
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: self.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_chunk_size: self.max_chunk_size.unwrap_or(MAX_CHUNK_SIZE),
            file_filter_config: self.file_filter_config.unwrap_or_default(),
            respect_gitignore: self.respect_gitignore,
            dedupe_paths: self.dedupe_paths.unwrap_or(true),
            tokenizer: self.tokenizer.unwrap_or_default(),
            request_timeout: self.request_timeout,
            dry_run: self.dry_run,
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::builder().build().unwrap();

        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.max_chunk_size, 20 * 1024);
        assert_eq!(config.temperature, 0.0);
        assert!(config.dedupe_paths);
        assert!(config.request_timeout.is_none());
    }

    #[test]
    fn test_empty_model() {
        let err = Config::builder().model("  ").build().unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_invalid_endpoint() {
        let result = Config::builder().endpoint("ollama.local:11434").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_chunk_size() {
        let result = Config::builder().max_chunk_size(0).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_temperature() {
        assert!(Config::builder().temperature(-0.5).build().is_err());
        assert!(Config::builder().temperature(f64::NAN).build().is_err());
        assert!(Config::builder().temperature(0.7).build().is_ok());
    }

    #[test]
    fn test_invalid_exclude_glob() {
        let result = Config::builder()
            .file_filter_config(FileFilterConfig::new().exclude(vec!["a[".to_string()]))
            .build();
        assert!(result.is_err());
    }
}
