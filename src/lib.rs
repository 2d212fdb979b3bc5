//! # botok
//!
//! A fast Tibetan tokenizer.
//!
//! Tibetan marks syllable boundaries, not word boundaries. This crate chunks
//! text into syllables, punctuation and foreign runs, then walks the syllables
//! through a dictionary trie to find the longest words, falling back to
//! unknown single syllables where the dictionary has nothing.
//!
//! ## Dictionary tokenization
//!
//! ```rust
//! use botok::{Tokenizer, TrieBuilder};
//!
//! // One entry per line: form, POS, lemma, freq, gloss
//! let mut builder = TrieBuilder::with_inflection();
//! builder.load_dictionary("བཀྲ་ཤིས\tNOUN\t\t1000\nབདེ་ལེགས\tNOUN\t\t500");
//! let tokenizer = Tokenizer::new(builder.build());
//!
//! let tokens = tokenizer.tokenize("བཀྲ་ཤིས་བདེ་ལེགས།");
//! let tagged: Vec<_> = tokens
//!     .iter()
//!     .map(|t| (t.text.as_str(), t.pos.as_deref()))
//!     .collect();
//! assert_eq!(
//!     tagged,
//!     vec![
//!         ("བཀྲ་ཤིས་", Some("NOUN")),
//!         ("བདེ་ལེགས", Some("NOUN")),
//!         ("།", Some("PUNCT")),
//!     ]
//! );
//! ```
//!
//! ## Syllables only
//!
//! [`SimpleTokenizer`] skips the dictionary and yields one token per chunk:
//!
//! ```rust
//! let tokens = botok::SimpleTokenizer::tokenize("བཀྲ་ཤིས་བདེ་ལེགས།");
//! assert_eq!(tokens.len(), 5);
//! ```

pub mod char_categories;
pub mod chunker;
pub mod config;
pub mod dialect_pack;
pub mod error;
pub mod modifiers;
pub mod registry;
pub mod syllable;
pub mod token;
pub mod tokenizer;
pub mod trie;

pub use char_categories::{get_char_category, BoString, CharCategory};
pub use chunker::{Chunk, Chunker};
pub use config::TokenizerConfig;
pub use error::{BotokError, Result};
pub use registry::{TokenizerRegistry, TrieKey};
pub use syllable::{AffixRecord, SylComponents, SyllableDecomposition};
pub use token::{ChunkTag, Sense, Token, NON_WORD, NO_POS};
pub use tokenizer::{SimpleTokenizer, Tokenizer};
pub use trie::{NodeId, Trie, TrieBuilder, TrieNode};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
