//! Error types.
//!
//! Input variability (unknown characters, malformed syllables, words missing
//! from the dictionary) is never an error: it is absorbed by the tokenizer and
//! surfaces as typed "unknown" results. Only setup-time misuse and I/O land
//! here.

use std::path::PathBuf;
use thiserror::Error;

/// Result type defaulting to [`BotokError`]
pub type Result<T, E = BotokError> = std::result::Result<T, E>;

/// Errors raised while building or persisting tokenizer resources
#[derive(Error, Debug)]
pub enum BotokError {
    /// A trie operation was given an empty key
    #[error("trie key is empty")]
    EmptyKey,

    /// A trie key does not end with a tsek or a coda marker
    #[error("trie key '{key}' is not terminated by a tsek or coda marker")]
    UnterminatedKey {
        /// The offending key
        key: String,
    },

    /// No dialect pack at the given location
    #[error("dialect pack not found at {}", path.display())]
    DialectPackNotFound {
        /// Where the pack was expected
        path: PathBuf,
    },

    /// Rejected tokenizer configuration
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Why the configuration was rejected
        reason: String,
    },

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error, for configs and trie snapshots
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
