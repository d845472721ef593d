use crate::error::{Error, Result};
use std::sync::Arc;
use tiktoken_rs::CoreBPE;

const SIMPLE_CHARS_PER_TOKEN: usize = 4;

/// Type of tokenizer used to count request tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenizerKind {
    /// `cl100k_base` byte-pair encoding
    #[default]
    Cl100k,
    /// Character-based estimate (~4 chars per token)
    Simple,
}

impl TokenizerKind {
    /// Creates a new tokenizer instance of this kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the BPE ranks cannot be loaded.
    pub fn create(self) -> Result<Arc<dyn TokenEstimator>> {
        let estimator: Arc<dyn TokenEstimator> = match self {
            Self::Cl100k => Arc::new(Cl100kTokenizer::new()?),
            Self::Simple => Arc::new(SimpleTokenizer),
        };
        Ok(estimator)
    }
}

/// Trait for counting tokens in text.
pub trait TokenEstimator: Send + Sync {
    /// Returns the number of tokens in the given text.
    fn estimate(&self, text: &str) -> usize;
}

/// Exact token counts with the `cl100k_base` encoding.
///
/// The endpoint may serve a model with a different vocabulary, so the count
/// is an approximation of what the server will see.
pub(crate) struct Cl100kTokenizer {
    bpe: CoreBPE,
}

impl Cl100kTokenizer {
    pub(crate) fn new() -> Result<Self> {
        let bpe = tiktoken_rs::cl100k_base().map_err(|e| Error::Tokenizer {
            message: e.to_string(),
        })?;
        Ok(Self { bpe })
    }
}

impl TokenEstimator for Cl100kTokenizer {
    fn estimate(&self, text: &str) -> usize {
        self.bpe.encode_with_special_tokens(text).len()
    }
}

/// Simple character-based tokenizer.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SimpleTokenizer;

impl TokenEstimator for SimpleTokenizer {
    fn estimate(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }

        text.chars()
            .count()
            .div_ceil(SIMPLE_CHARS_PER_TOKEN)
            .max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_tokenizer_empty() {
        assert_eq!(SimpleTokenizer.estimate(""), 0);
    }

    #[test]
    fn test_simple_tokenizer_basic() {
        assert_eq!(SimpleTokenizer.estimate("test"), 1);
        assert_eq!(SimpleTokenizer.estimate("hello world"), 3);
        assert_eq!(SimpleTokenizer.estimate(&"a".repeat(1000)), 250);
    }

    #[test]
    fn test_cl100k_tokenizer() {
        let tokenizer = Cl100kTokenizer::new().unwrap();
        assert_eq!(tokenizer.estimate(""), 0);
        assert_eq!(tokenizer.estimate("hello world"), 2);
    }

    #[test]
    fn test_kind_creates_estimator() {
        let simple = TokenizerKind::Simple.create().unwrap();
        assert_eq!(simple.estimate("abcdefgh"), 2);

        let bpe = TokenizerKind::default().create().unwrap();
        assert!(bpe.estimate("fn main() { println!(\"hi\"); }") > 0);
    }
}
