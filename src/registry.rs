//! Registry of loaded tokenizers.
//!
//! Loading a dialect pack is expensive, so a [`TokenizerRegistry`] keeps every
//! trie it builds and every tokenizer it hands out. Tokenizers asking for the
//! same pack share one trie, whatever their configuration. The registry lives
//! as long as its owner keeps it; nothing is cached process-wide.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::debug;

use crate::config::TokenizerConfig;
use crate::dialect_pack::load_dialect_pack;
use crate::error::Result;
use crate::tokenizer::Tokenizer;
use crate::trie::Trie;

/// Where a trie comes from, and whether it holds affixed forms
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrieKey {
    /// Dialect pack directory
    pub source: PathBuf,
    /// Whether affixed forms were generated
    pub inflect: bool,
}

impl TrieKey {
    /// Key for the pack at `source`, with or without affixed forms
    pub fn new(source: impl Into<PathBuf>, inflect: bool) -> Self {
        TrieKey {
            source: source.into(),
            inflect,
        }
    }
}

/// Tries and tokenizers loaded so far
#[derive(Default)]
pub struct TokenizerRegistry {
    tries: HashMap<TrieKey, Arc<Trie>>,
    tokenizers: HashMap<(TrieKey, TokenizerConfig), Arc<Tokenizer>>,
}

impl TokenizerRegistry {
    /// An empty registry
    pub fn new() -> Self {
        TokenizerRegistry::default()
    }

    /// Register a trie built elsewhere under `key`
    pub fn insert_trie(&mut self, key: TrieKey, trie: Trie) -> Arc<Trie> {
        let trie = Arc::new(trie);
        self.tries.insert(key, Arc::clone(&trie));
        trie
    }

    /// The trie registered under `key`, loading its dialect pack if needed
    pub fn trie(&mut self, key: &TrieKey) -> Result<Arc<Trie>> {
        if let Some(trie) = self.tries.get(key) {
            return Ok(Arc::clone(trie));
        }
        let trie = load_dialect_pack(&key.source, key.inflect)?;
        Ok(self.insert_trie(key.clone(), trie))
    }

    /// The tokenizer for a trie and a configuration, created on first request
    pub fn tokenizer(&mut self, key: &TrieKey, config: &TokenizerConfig) -> Result<Arc<Tokenizer>> {
        let cache_key = (key.clone(), config.clone());
        if let Some(tokenizer) = self.tokenizers.get(&cache_key) {
            return Ok(Arc::clone(tokenizer));
        }

        let trie = self.trie(key)?;
        let tokenizer = Arc::new(Tokenizer::with_config(trie, config.clone())?);
        debug!(
            "new tokenizer for {} ({} registered)",
            key.source.display(),
            self.tokenizers.len() + 1
        );
        self.tokenizers.insert(cache_key, Arc::clone(&tokenizer));
        Ok(tokenizer)
    }

    /// Tokenizer for the pack at `path` with the default configuration
    pub fn for_pack(&mut self, path: &Path, inflect: bool) -> Result<Arc<Tokenizer>> {
        self.tokenizer(&TrieKey::new(path, inflect), &TokenizerConfig::default())
    }

    /// Number of tokenizers handed out
    pub fn len(&self) -> usize {
        self.tokenizers.len()
    }

    /// Whether no tokenizer has been handed out yet
    pub fn is_empty(&self) -> bool {
        self.tokenizers.is_empty()
    }

    /// Drop everything loaded so far
    pub fn clear(&mut self) {
        self.tries.clear();
        self.tokenizers.clear();
    }
}
