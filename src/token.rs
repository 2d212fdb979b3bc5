//! Token representation for Tibetan text.
//!
//! A Token represents a segmented unit of text, which can be a word, punctuation,
//! or other text unit.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::syllable::{AffixRecord, TSEK};

/// Part-of-speech given to a syllable that cannot even be walked in the trie
pub const NON_WORD: &str = "NON_WORD";

/// Part-of-speech given to a walkable syllable that ends no dictionary entry
pub const NO_POS: &str = "NO_POS";

/// The tag of a chunk, and of the token built from it.
///
/// The `Non*` tags are the "no" side of the chunking passes; only `Script`,
/// `NonScript` and the concrete tags survive a full pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ChunkTag {
    /// Tibetan-script run not yet sub-typed
    Script,
    /// Run of non-Tibetan characters not yet sub-typed
    NonScript,
    /// Punctuation
    Punct,
    /// Not punctuation
    NonPunct,
    /// Whitespace
    Space,
    /// Not whitespace
    NonSpace,
    /// Tibetan syllable
    #[default]
    Text,
    /// Symbol
    Sym,
    /// Not a symbol
    NonSym,
    /// Number
    Num,
    /// Not a number
    NonNum,
    /// CJK text
    Cjk,
    /// Latin text
    Latin,
    /// Other/unknown
    Other,
}

impl ChunkTag {
    /// Convert to a string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkTag::Script => "BO",
            ChunkTag::NonScript => "NON_BO",
            ChunkTag::Punct => "PUNCT",
            ChunkTag::NonPunct => "NON_PUNCT",
            ChunkTag::Space => "SPACE",
            ChunkTag::NonSpace => "NON_SPACE",
            ChunkTag::Text => "TEXT",
            ChunkTag::Sym => "SYM",
            ChunkTag::NonSym => "NON_SYM",
            ChunkTag::Num => "NUM",
            ChunkTag::NonNum => "NON_NUM",
            ChunkTag::Cjk => "CJK",
            ChunkTag::Latin => "LATIN",
            ChunkTag::Other => "OTHER",
        }
    }
}

impl std::fmt::Display for ChunkTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A word sense from the dictionary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sense {
    /// Part-of-speech for this sense
    pub pos: Option<String>,
    /// Lemma for this sense
    pub lemma: Option<String>,
    /// Frequency for this sense
    pub freq: Option<u32>,
    /// Gloss
    pub meaning: Option<String>,
    /// Whether this sense belongs to an affixed surface form
    pub affixed: bool,
    /// The particle that was affixed, for affixed senses
    pub affixation: Option<AffixRecord>,
    /// Whether the word is of Sanskrit (or other foreign) origin
    pub skrt: bool,
}

impl Sense {
    /// A sense carrying only a part-of-speech tag
    pub fn with_pos(pos: &str) -> Self {
        Sense {
            pos: Some(pos.to_string()),
            ..Default::default()
        }
    }
}

/// A single token from the tokenization process
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The raw text of the token
    pub text: String,

    /// Starting byte offset in the original string
    pub start: usize,

    /// Length in bytes
    pub len: usize,

    /// The type of this token
    pub chunk_type: ChunkTag,

    /// Syllables that make up this token, without tsek or spaces
    pub syls: Vec<String>,

    /// Byte span `(start, len)` of each syllable, relative to `start`
    pub syl_spans: Vec<(usize, usize)>,

    /// Senses from the dictionary; empty for out-of-vocabulary words
    pub senses: Vec<Sense>,

    /// Part-of-speech tag of the chosen sense
    pub pos: Option<String>,

    /// Lemma (base form) of the word
    pub lemma: Option<String>,

    /// Frequency from dictionary
    pub freq: Option<u32>,

    /// Whether this token is an affixed particle split off its host
    pub is_affix: bool,

    /// Whether this token hosted an affixed particle
    pub is_affix_host: bool,

    /// Whether this is a Sanskrit word
    pub is_skrt: bool,

    /// The particle affixed to this token, if it is an affixed form
    pub affixation: Option<AffixRecord>,

    /// Whether this token has had a dagdra merged into it
    pub has_merged_dagdra: bool,

    /// Caller-defined annotations
    pub annotations: BTreeMap<String, String>,
}

impl Token {
    /// Create a new empty token
    pub fn new() -> Self {
        Token::default()
    }

    /// Create a token with text and position
    pub fn with_text(text: String, start: usize, len: usize, chunk_type: ChunkTag) -> Self {
        Token {
            text,
            start,
            len,
            chunk_type,
            ..Default::default()
        }
    }

    /// Byte range of the token in the tokenized string
    pub fn span(&self) -> std::ops::Range<usize> {
        self.start..self.start + self.len
    }

    /// Get the cleaned text (syllables joined by tsek)
    pub fn text_cleaned(&self) -> String {
        if self.syls.is_empty() {
            return String::new();
        }

        let mut cleaned = self.syls.join(&TSEK.to_string());

        // An affix host is glued to its particle, so it takes no tsek
        if !self.is_affix_host || self.is_affix {
            cleaned.push(TSEK);
        }

        cleaned
    }

    /// Check if this is a word token (TEXT type with syllables)
    pub fn is_word(&self) -> bool {
        self.chunk_type == ChunkTag::Text && !self.syls.is_empty()
    }

    /// Check if this is an out-of-vocabulary word
    pub fn is_oov(&self) -> bool {
        self.is_word() && self.senses.is_empty()
    }

    /// Check if this is punctuation
    pub fn is_punct(&self) -> bool {
        self.chunk_type == ChunkTag::Punct
    }

    /// Human-readable `(tag, text)` projection
    pub fn projection(&self) -> (&'static str, &str) {
        (self.chunk_type.as_str(), &self.text)
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)?;
        if let Some(ref pos) = self.pos {
            write!(f, "/{}", pos)?;
        }
        Ok(())
    }
}
