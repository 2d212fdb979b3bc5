//! The main tokenizer implementing longest-match algorithm.
//!
//! This module takes chunked text and walks its syllables through the Trie,
//! one character at a time, to find the longest matching words.
//!
//! The scan is a small state machine. While [`ScanState::ExtendingRun`], each
//! syllable of the current run is walked from the node the previous syllable
//! reached, and every node ending a word is remembered as the best match so
//! far. When the walk dies (no such child, a leaf, a non-syllable chunk, or
//! the end of the input) the run is resolved:
//!
//! - [`ScanState::CommitLongestMatch`]: the best match becomes a token, and
//!   scanning resumes on the syllable right after it;
//! - [`ScanState::EmitOutOfVocabulary`]: without any match, the first
//!   syllable of the run becomes an unknown token, and scanning resumes on the
//!   second one.

use std::sync::Arc;

use log::{debug, trace};
use unicode_normalization::UnicodeNormalization;

use crate::chunker::{Chunk, Chunker};
use crate::config::TokenizerConfig;
use crate::error::Result;
use crate::modifiers::apply_all_modifiers;
use crate::token::{ChunkTag, Sense, Token, NON_WORD, NO_POS};
use crate::trie::{NodeId, Trie};

/// Where the scan of a syllable run stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Walking the next syllable of the run
    ExtendingRun,
    /// The walk died after a match: emit the longest match
    CommitLongestMatch,
    /// The walk died without any match: emit the first syllable alone
    EmitOutOfVocabulary,
}

/// Scan state of one syllable run
struct Run {
    /// Chunk index of the first syllable
    start: usize,
    /// Chunk index of the next syllable to walk
    walker: usize,
    /// Node reached by the syllables walked so far
    node: Option<NodeId>,
    /// Last chunk index and node of the longest match
    best: Option<(usize, NodeId)>,
    /// Whether the first syllable could be walked in full
    first_walked: bool,
}

impl Run {
    fn new(start: usize) -> Self {
        Run {
            start,
            walker: start,
            node: None,
            best: None,
            first_walked: false,
        }
    }
}

/// Walk a whole syllable, closing character included
fn walk_syllable(trie: &Trie, chunk: &Chunk, from: Option<NodeId>) -> Option<NodeId> {
    let syl = chunk.syl.as_ref()?;
    let mut node = from;
    for c in syl.chars().chain(std::iter::once(chunk.terminator())) {
        node = Some(trie.walk(c, node)?);
    }
    node
}

fn chunk_token(chunk: &Chunk, text: &str) -> Token {
    let mut token = Token::with_text(
        text[chunk.span()].to_string(),
        chunk.start,
        chunk.len,
        chunk.chunk_type,
    );
    if let (Some(syl), Some((syl_start, syl_len))) = (&chunk.syl, chunk.syl_span) {
        token.syls = vec![syl.clone()];
        token.syl_spans = vec![(syl_start - chunk.start, syl_len)];
    }
    token
}

/// A token spanning the syllable chunks `first..=last`
fn word_token(chunks: &[Chunk], first: usize, last: usize, text: &str) -> Token {
    let start = chunks[first].start;
    let end = chunks[last].start + chunks[last].len;
    let mut token = Token::with_text(text[start..end].to_string(), start, end - start, ChunkTag::Text);
    for chunk in &chunks[first..=last] {
        if let (Some(syl), Some((syl_start, syl_len))) = (&chunk.syl, chunk.syl_span) {
            token.syls.push(syl.clone());
            token.syl_spans.push((syl_start - start, syl_len));
        }
    }
    token
}

fn non_syllable_token(chunk: &Chunk, text: &str) -> Token {
    let mut token = chunk_token(chunk, text);
    token.senses = vec![Sense::with_pos(chunk.chunk_type.as_str())];
    token.pos = Some(chunk.chunk_type.as_str().to_string());
    token
}

fn matched_token(
    trie: &Trie,
    chunks: &[Chunk],
    first: usize,
    last: usize,
    node: NodeId,
    text: &str,
) -> Token {
    let mut token = word_token(chunks, first, last, text);
    token.senses = trie.node(node).senses().to_vec();
    token.is_skrt = token.senses.iter().any(|s| s.skrt);
    if token.senses.iter().all(|s| s.affixed) {
        token.affixation = token.senses.iter().find_map(|s| s.affixation.clone());
    }
    token.pos = token.senses.first().and_then(|s| s.pos.clone());
    token
}

/// Scan pre-chunked text against the trie, without post-processing
pub fn scan(trie: &Trie, chunks: &[Chunk], text: &str) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::with_capacity(chunks.len());
    let mut pos = 0;

    while pos < chunks.len() {
        if !chunks[pos].is_syllable() {
            tokens.push(non_syllable_token(&chunks[pos], text));
            pos += 1;
            continue;
        }

        let mut run = Run::new(pos);
        let mut state = ScanState::ExtendingRun;
        loop {
            match state {
                ScanState::ExtendingRun => state = extend(trie, chunks, &mut run),
                ScanState::CommitLongestMatch => match run.best {
                    Some((last, node)) => {
                        if last + 1 < run.walker {
                            debug!(
                                "backtracking from chunk {} to the match ending at chunk {}",
                                run.walker, last
                            );
                        }
                        tokens.push(matched_token(trie, chunks, run.start, last, node, text));
                        pos = last + 1;
                        break;
                    }
                    None => state = ScanState::EmitOutOfVocabulary,
                },
                ScanState::EmitOutOfVocabulary => {
                    let mut token = chunk_token(&chunks[run.start], text);
                    let tag = if run.first_walked { NO_POS } else { NON_WORD };
                    trace!("out-of-vocabulary syllable at chunk {} ({})", run.start, tag);
                    token.pos = Some(tag.to_string());
                    tokens.push(token);
                    pos = run.start + 1;
                    break;
                }
            }
        }
    }

    tokens
}

/// One transition out of [`ScanState::ExtendingRun`]
fn extend(trie: &Trie, chunks: &[Chunk], run: &mut Run) -> ScanState {
    let resolved = if run.best.is_some() {
        ScanState::CommitLongestMatch
    } else {
        ScanState::EmitOutOfVocabulary
    };

    let Some(chunk) = chunks.get(run.walker).filter(|c| c.is_syllable()) else {
        return resolved;
    };
    let Some(node) = walk_syllable(trie, chunk, run.node) else {
        return resolved;
    };

    if run.walker == run.start {
        run.first_walked = true;
    }
    if trie.is_match(node) {
        run.best = Some((run.walker, node));
    }
    run.node = Some(node);
    run.walker += 1;

    if trie.can_walk(node) {
        ScanState::ExtendingRun
    } else if run.best.is_some() {
        ScanState::CommitLongestMatch
    } else {
        ScanState::EmitOutOfVocabulary
    }
}

/// Detach the trailing whitespace of word tokens as punctuation tokens
fn split_trailing_spaces(tokens: Vec<Token>) -> Vec<Token> {
    let mut result = Vec::with_capacity(tokens.len());

    for mut token in tokens {
        let trimmed = token.text.trim_end().len();
        if token.chunk_type != ChunkTag::Text || trimmed == token.text.len() || trimmed == 0 {
            result.push(token);
            continue;
        }

        let space_text = token.text.split_off(trimmed);
        let mut space = Token::with_text(
            space_text,
            token.start + trimmed,
            token.len - trimmed,
            ChunkTag::Punct,
        );
        space.senses = vec![Sense::with_pos(ChunkTag::Punct.as_str())];
        space.pos = Some(ChunkTag::Punct.as_str().to_string());
        token.len = trimmed;

        result.push(token);
        result.push(space);
    }

    result
}

/// Batches of chunks that can be scanned independently: each batch but the
/// last ends right after a punctuation chunk
#[cfg(feature = "parallel")]
fn batches(chunks: &[Chunk], min_len: usize) -> Vec<&[Chunk]> {
    let mut out = Vec::new();
    let mut start = 0;
    for (i, chunk) in chunks.iter().enumerate() {
        if chunk.chunk_type == ChunkTag::Punct && i + 1 - start >= min_len {
            out.push(&chunks[start..=i]);
            start = i + 1;
        }
    }
    if start < chunks.len() {
        out.push(&chunks[start..]);
    }
    out
}

#[cfg(feature = "parallel")]
const MIN_BATCH_CHUNKS: usize = 256;

/// The main tokenizer
pub struct Tokenizer {
    /// The dictionary trie (shared reference)
    trie: Arc<Trie>,
    config: TokenizerConfig,
}

impl Tokenizer {
    /// Create a new tokenizer with the given trie
    pub fn new(trie: Trie) -> Self {
        Tokenizer::with_arc(Arc::new(trie))
    }

    /// Create a new tokenizer with a shared trie reference
    pub fn with_arc(trie: Arc<Trie>) -> Self {
        Tokenizer {
            trie,
            config: TokenizerConfig::default(),
        }
    }

    /// Create a tokenizer with a shared trie and a validated configuration
    pub fn with_config(trie: Arc<Trie>, config: TokenizerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Tokenizer { trie, config })
    }

    /// Get a reference to the trie
    pub fn trie(&self) -> &Trie {
        &self.trie
    }

    /// Get the Arc reference to the trie (for sharing)
    pub fn trie_arc(&self) -> Arc<Trie> {
        Arc::clone(&self.trie)
    }

    /// The configuration in use
    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    fn prepare(&self, text: &str) -> String {
        if self.config.normalize_nfc {
            text.nfc().collect()
        } else {
            text.to_string()
        }
    }

    fn chunks(&self, text: &str) -> Vec<Chunk> {
        Chunker::with_ignored(text, &self.config.ignore_chars).make_chunks()
    }

    fn post_process(&self, mut tokens: Vec<Token>) -> Vec<Token> {
        apply_all_modifiers(&mut tokens, &self.config);
        if self.config.spaces_as_punct {
            tokens = split_trailing_spaces(tokens);
        }
        tokens
    }

    /// Tokenize a string with full post-processing.
    ///
    /// Token offsets refer to the input, or to its NFC form when the
    /// configuration asks for normalisation.
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        #[cfg(feature = "parallel")]
        if text.len() >= self.config.parallel_threshold {
            return self.tokenize_parallel(text);
        }

        let text = self.prepare(text);
        let chunks = self.chunks(&text);
        let tokens = scan(&self.trie, &chunks, &text);
        self.post_process(tokens)
    }

    /// Tokenize without post-processing (raw tokenization)
    pub fn tokenize_raw(&self, text: &str) -> Vec<Token> {
        let text = self.prepare(text);
        let chunks = self.chunks(&text);
        scan(&self.trie, &chunks, &text)
    }

    /// Tokenize pre-chunked text
    pub fn tokenize_chunks(&self, chunks: &[Chunk], text: &str) -> Vec<Token> {
        scan(&self.trie, chunks, text)
    }

    /// Tokenize a large string, scanning batches split after punctuation on
    /// the rayon thread pool. The result is the same as [`Tokenizer::tokenize`].
    #[cfg(feature = "parallel")]
    pub fn tokenize_parallel(&self, text: &str) -> Vec<Token> {
        use rayon::prelude::*;

        let text = self.prepare(text);
        let chunks = self.chunks(&text);
        let batches = batches(&chunks, MIN_BATCH_CHUNKS);
        debug!("scanning {} chunks in {} batches", chunks.len(), batches.len());

        let scanned: Vec<Vec<Token>> = batches
            .into_par_iter()
            .map(|batch| scan(&self.trie, batch, &text))
            .collect();

        self.post_process(scanned.into_iter().flatten().collect())
    }
}

/// A simple tokenizer that doesn't use a dictionary (just syllabifies)
pub struct SimpleTokenizer;

impl SimpleTokenizer {
    /// Tokenize text into syllables (no dictionary lookup)
    pub fn tokenize(text: &str) -> Vec<Token> {
        let chunks = Chunker::new(text).make_chunks();
        chunks
            .iter()
            .map(|chunk| {
                if chunk.is_syllable() {
                    chunk_token(chunk, text)
                } else {
                    non_syllable_token(chunk, text)
                }
            })
            .collect()
    }
}
