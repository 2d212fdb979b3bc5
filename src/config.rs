//! Tokenizer configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BotokError, Result};
use crate::syllable::TSEK;

/// Inputs at least this many bytes long are tokenized in parallel batches
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 64 * 1024;

/// Options controlling tokenization and post-processing
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    /// Split affixed particles off their host word
    pub split_affixes: bool,
    /// Merge པ་/པོ་/བ་/བོ་ into the preceding word
    pub merge_dagdra: bool,
    /// Detach trailing whitespace of word tokens as punctuation tokens
    pub spaces_as_punct: bool,
    /// NFC-normalise the input before tokenizing
    pub normalize_nfc: bool,
    /// Characters the chunker treats as spaces
    pub ignore_chars: Vec<char>,
    /// Input size, in bytes, from which tokenization runs in parallel
    pub parallel_threshold: usize,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        TokenizerConfig {
            split_affixes: true,
            merge_dagdra: true,
            spaces_as_punct: false,
            normalize_nfc: false,
            ignore_chars: Vec::new(),
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl TokenizerConfig {
    /// Parse a configuration from JSON; missing fields take their default
    pub fn from_json(json: &str) -> Result<Self> {
        let config: TokenizerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON configuration file
    pub fn from_path(path: &Path) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Reject settings the tokenizer cannot honour
    pub fn validate(&self) -> Result<()> {
        if self.ignore_chars.contains(&TSEK) {
            return Err(BotokError::InvalidConfig {
                reason: "the tsek cannot be ignored".to_string(),
            });
        }
        Ok(())
    }

    /// Split affixed particles off their host words
    pub fn with_split_affixes(mut self, split_affixes: bool) -> Self {
        self.split_affixes = split_affixes;
        self
    }

    /// Merge a dagdra particle into the word before it
    pub fn with_merge_dagdra(mut self, merge_dagdra: bool) -> Self {
        self.merge_dagdra = merge_dagdra;
        self
    }

    /// Detach trailing whitespace of words into their own tokens
    pub fn with_spaces_as_punct(mut self, spaces_as_punct: bool) -> Self {
        self.spaces_as_punct = spaces_as_punct;
        self
    }

    /// NFC-normalise the input before tokenizing
    pub fn with_normalize_nfc(mut self, normalize_nfc: bool) -> Self {
        self.normalize_nfc = normalize_nfc;
        self
    }

    /// Characters read as transparent when chunking
    pub fn with_ignore_chars(mut self, ignore_chars: Vec<char>) -> Self {
        self.ignore_chars = ignore_chars;
        self
    }

    /// Input size in bytes from which `tokenize` runs in parallel batches
    pub fn with_parallel_threshold(mut self, parallel_threshold: usize) -> Self {
        self.parallel_threshold = parallel_threshold;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = TokenizerConfig::default();
        assert!(config.split_affixes);
        assert!(config.merge_dagdra);
        assert!(!config.spaces_as_punct);
        assert!(!config.normalize_nfc);
        assert_eq!(config.parallel_threshold, DEFAULT_PARALLEL_THRESHOLD);
    }

    #[test]
    fn test_from_json_partial() {
        let config = TokenizerConfig::from_json(r#"{"spaces_as_punct": true}"#).unwrap();
        assert!(config.spaces_as_punct);
        assert!(config.split_affixes);
    }

    #[test]
    fn test_tsek_cannot_be_ignored() {
        let err = TokenizerConfig::from_json(r#"{"ignore_chars": ["་"]}"#).unwrap_err();
        assert!(matches!(err, BotokError::InvalidConfig { .. }));
        assert!(TokenizerConfig::default()
            .with_ignore_chars(vec!['#'])
            .validate()
            .is_ok());
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"merge_dagdra": false, "parallel_threshold": 10}}"#).unwrap();
        let config = TokenizerConfig::from_path(file.path()).unwrap();
        assert!(!config.merge_dagdra);
        assert_eq!(config.parallel_threshold, 10);
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(
            TokenizerConfig::from_json("{"),
            Err(BotokError::Json(_))
        ));
    }
}
