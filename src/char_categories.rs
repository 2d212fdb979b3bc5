//! Character classification for Tibetan Unicode characters.
//!
//! Every character of the input is mapped to a [`CharCategory`] once, up front.
//! The chunker only ever looks at these categories, never at the characters
//! themselves, so anything a caller wants segmentation to ignore can be forced
//! to [`CharCategory::Transparent`] through the ignore-set of [`BoString`].

use serde::{Deserialize, Serialize};

/// Character categories used in Tibetan text processing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CharCategory {
    /// Tibetan consonant
    Cons,
    /// Sub-joined consonant (used in consonant clusters)
    SubCons,
    /// Tibetan vowel sign
    Vow,
    /// Tsek (syllable separator ་)
    Tsek,
    /// Sanskrit consonant
    SkrtCons,
    /// Sanskrit sub-joined consonant
    SkrtSubCons,
    /// Sanskrit vowel sign
    SkrtVow,
    /// Sanskrit long vowel (visarga ཿ)
    SkrtLongVow,
    /// Normal punctuation (shad, etc.)
    NormalPunct,
    /// Special punctuation (head marks, brackets)
    SpecialPunct,
    /// Tibetan numeral
    Numeral,
    /// In-syllable mark
    InSylMark,
    /// Symbol
    Symbol,
    /// Latin character
    Latin,
    /// CJK character
    Cjk,
    /// Transparent characters (spaces, ignored characters)
    Transparent,
    /// Other/unknown character
    #[default]
    Other,
}

impl CharCategory {
    /// Check if this category represents a character that can be part of a syllable
    pub fn is_syllable_part(&self) -> bool {
        matches!(
            self,
            CharCategory::Cons
                | CharCategory::SubCons
                | CharCategory::Vow
                | CharCategory::SkrtCons
                | CharCategory::SkrtSubCons
                | CharCategory::SkrtVow
                | CharCategory::SkrtLongVow
                | CharCategory::InSylMark
        )
    }

    /// Check if this is a Tibetan-script character (not Latin, CJK or Other)
    pub fn is_tibetan(&self) -> bool {
        !matches!(
            self,
            CharCategory::Latin | CharCategory::Cjk | CharCategory::Other
        )
    }

    /// Check if this is shad-like punctuation
    pub fn is_punct(&self) -> bool {
        matches!(self, CharCategory::NormalPunct | CharCategory::SpecialPunct)
    }

    /// Upper-case name, as used in classification tables
    pub fn as_str(&self) -> &'static str {
        match self {
            CharCategory::Cons => "CONS",
            CharCategory::SubCons => "SUB_CONS",
            CharCategory::Vow => "VOW",
            CharCategory::Tsek => "TSEK",
            CharCategory::SkrtCons => "SKRT_CONS",
            CharCategory::SkrtSubCons => "SKRT_SUB_CONS",
            CharCategory::SkrtVow => "SKRT_VOW",
            CharCategory::SkrtLongVow => "SKRT_LONG_VOW",
            CharCategory::NormalPunct => "NORMAL_PUNCT",
            CharCategory::SpecialPunct => "SPECIAL_PUNCT",
            CharCategory::Numeral => "NUMERAL",
            CharCategory::InSylMark => "IN_SYL_MARK",
            CharCategory::Symbol => "SYMBOL",
            CharCategory::Latin => "LATIN",
            CharCategory::Cjk => "CJK",
            CharCategory::Transparent => "TRANSPARENT",
            CharCategory::Other => "OTHER",
        }
    }
}

use CharCategory::*;

/// Tibetan block (U+0F00..U+0FFF), sorted and non-overlapping.
/// Unassigned code points are absent and fall through to `Other`.
static BO_RANGES: &[(u32, u32, CharCategory)] = &[
    (0x0F00, 0x0F00, SkrtCons),
    (0x0F01, 0x0F03, Symbol),
    (0x0F04, 0x0F07, SpecialPunct),
    (0x0F08, 0x0F08, NormalPunct),
    (0x0F09, 0x0F0A, SpecialPunct),
    (0x0F0B, 0x0F0C, Tsek),
    (0x0F0D, 0x0F12, NormalPunct),
    (0x0F13, 0x0F13, Symbol),
    (0x0F14, 0x0F14, NormalPunct),
    (0x0F15, 0x0F17, Symbol),
    (0x0F18, 0x0F19, InSylMark),
    (0x0F1A, 0x0F1F, Symbol),
    (0x0F20, 0x0F33, Numeral),
    (0x0F34, 0x0F34, Symbol),
    (0x0F35, 0x0F35, InSylMark),
    (0x0F36, 0x0F36, Symbol),
    (0x0F37, 0x0F37, InSylMark),
    (0x0F38, 0x0F38, Symbol),
    (0x0F39, 0x0F39, InSylMark),
    (0x0F3A, 0x0F3D, SpecialPunct),
    (0x0F3E, 0x0F3F, InSylMark),
    (0x0F40, 0x0F42, Cons),
    (0x0F43, 0x0F43, SkrtCons),
    (0x0F44, 0x0F47, Cons),
    (0x0F49, 0x0F49, Cons),
    (0x0F4A, 0x0F4E, SkrtCons),
    (0x0F4F, 0x0F51, Cons),
    (0x0F52, 0x0F52, SkrtCons),
    (0x0F53, 0x0F56, Cons),
    (0x0F57, 0x0F57, SkrtCons),
    (0x0F58, 0x0F5B, Cons),
    (0x0F5C, 0x0F5C, SkrtCons),
    (0x0F5D, 0x0F64, Cons),
    (0x0F65, 0x0F65, SkrtCons),
    (0x0F66, 0x0F68, Cons),
    (0x0F69, 0x0F69, SkrtCons),
    (0x0F6A, 0x0F6A, Cons),
    (0x0F6B, 0x0F6C, SkrtCons),
    (0x0F71, 0x0F71, SkrtVow),
    (0x0F72, 0x0F72, Vow),
    (0x0F73, 0x0F73, SkrtVow),
    (0x0F74, 0x0F74, Vow),
    (0x0F75, 0x0F79, SkrtVow),
    (0x0F7A, 0x0F7A, Vow),
    (0x0F7B, 0x0F7B, SkrtVow),
    (0x0F7C, 0x0F7C, Vow),
    (0x0F7D, 0x0F7E, SkrtVow),
    (0x0F7F, 0x0F7F, SkrtLongVow),
    (0x0F80, 0x0F84, SkrtVow),
    (0x0F85, 0x0F85, Symbol),
    (0x0F86, 0x0F87, InSylMark),
    (0x0F88, 0x0F8C, SkrtCons),
    (0x0F8D, 0x0F8F, SkrtSubCons),
    (0x0F90, 0x0F92, SubCons),
    (0x0F93, 0x0F93, SkrtSubCons),
    (0x0F94, 0x0F97, SubCons),
    (0x0F99, 0x0F99, SubCons),
    (0x0F9A, 0x0F9E, SkrtSubCons),
    (0x0F9F, 0x0FA1, SubCons),
    (0x0FA2, 0x0FA2, SkrtSubCons),
    (0x0FA3, 0x0FA6, SubCons),
    (0x0FA7, 0x0FA7, SkrtSubCons),
    (0x0FA8, 0x0FAB, SubCons),
    (0x0FAC, 0x0FAC, SkrtSubCons),
    (0x0FAD, 0x0FB4, SubCons),
    (0x0FB5, 0x0FB5, SkrtSubCons),
    (0x0FB6, 0x0FB8, SubCons),
    (0x0FB9, 0x0FBC, SkrtSubCons),
    (0x0FBE, 0x0FC5, Symbol),
    (0x0FC6, 0x0FC6, InSylMark),
    (0x0FC7, 0x0FCC, Symbol),
    (0x0FCE, 0x0FCF, Symbol),
    (0x0FD0, 0x0FD1, SpecialPunct),
    (0x0FD2, 0x0FD2, NormalPunct),
    (0x0FD3, 0x0FD4, SpecialPunct),
    (0x0FD5, 0x0FD8, Symbol),
    (0x0FD9, 0x0FDA, SpecialPunct),
];

/// Whitespace of any script, plus the zero-width spaces and the BOM
fn is_transparent(c: char) -> bool {
    matches!(
        c,
        ' ' | '\t'
            | '\n'
            | '\r'
            | '\u{00A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200B}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

fn tibetan_category(c: char) -> CharCategory {
    let cp = c as u32;
    BO_RANGES
        .binary_search_by(|&(lo, hi, _)| {
            if hi < cp {
                std::cmp::Ordering::Less
            } else if lo > cp {
                std::cmp::Ordering::Greater
            } else {
                std::cmp::Ordering::Equal
            }
        })
        .map(|i| BO_RANGES[i].2)
        .unwrap_or(CharCategory::Other)
}

/// Get the category of a character
pub fn get_char_category(c: char) -> CharCategory {
    if is_transparent(c) {
        return CharCategory::Transparent;
    }
    match c {
        '\u{0F00}'..='\u{0FFF}' => tibetan_category(c),
        // Latin blocks up to the combining diacritics, then Latin Extended
        // Additional through the currency symbols
        '\u{0020}'..='\u{036F}' | '\u{1E00}'..='\u{20CF}' => CharCategory::Latin,
        '\u{2E80}'..='\u{2EFF}'
        | '\u{3000}'..='\u{303F}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{4E00}'..='\u{9FFF}'
        | '\u{FF00}'..='\u{FFEF}' => CharCategory::Cjk,
        _ => CharCategory::Other,
    }
}

/// A string with the category of each of its characters.
///
/// Indices into `categories` are character indices; `offsets` maps them to
/// byte offsets in `string` (with one extra entry for the end of the string).
#[derive(Debug, Clone)]
pub struct BoString {
    /// The original string
    pub string: String,
    /// Category for each character (by index)
    pub categories: Vec<CharCategory>,
    /// Byte offset of each character, plus the total byte length
    pub offsets: Vec<usize>,
}

impl BoString {
    /// Classify a string
    pub fn new(s: &str) -> Self {
        Self::with_ignored(s, &[])
    }

    /// Classify a string, forcing every character of `ignore_chars` to
    /// [`CharCategory::Transparent`] regardless of its natural category
    pub fn with_ignored(s: &str, ignore_chars: &[char]) -> Self {
        let mut categories = Vec::with_capacity(s.len() / 3 + 1);
        let mut offsets = Vec::with_capacity(s.len() / 3 + 2);
        for (pos, c) in s.char_indices() {
            offsets.push(pos);
            categories.push(if ignore_chars.contains(&c) {
                CharCategory::Transparent
            } else {
                get_char_category(c)
            });
        }
        offsets.push(s.len());

        BoString {
            string: s.to_string(),
            categories,
            offsets,
        }
    }

    /// Get the length (number of characters)
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Get the category at a specific index
    pub fn get_category(&self, idx: usize) -> Option<CharCategory> {
        self.categories.get(idx).copied()
    }

    /// Get a slice of categories
    pub fn get_categories(&self, start: usize, len: usize) -> &[CharCategory] {
        let end = (start + len).min(self.categories.len());
        &self.categories[start.min(end)..end]
    }

    /// Byte range of the character range `[start, start + len)`
    pub fn byte_range(&self, start: usize, len: usize) -> std::ops::Range<usize> {
        let end = (start + len).min(self.len());
        self.offsets[start.min(end)]..self.offsets[end]
    }

    /// Substring for the character range `[start, start + len)`
    pub fn slice(&self, start: usize, len: usize) -> &str {
        &self.string[self.byte_range(start, len)]
    }

    /// Character at a character index
    pub fn char_at(&self, idx: usize) -> Option<char> {
        let start = *self.offsets.get(idx)?;
        self.string[start..].chars().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tibetan_consonants() {
        assert_eq!(get_char_category('ཀ'), CharCategory::Cons);
        assert_eq!(get_char_category('ག'), CharCategory::Cons);
        assert_eq!(get_char_category('བ'), CharCategory::Cons);
        assert_eq!(get_char_category('འ'), CharCategory::Cons);
    }

    #[test]
    fn test_sanskrit_letters() {
        assert_eq!(get_char_category('ཊ'), CharCategory::SkrtCons);
        assert_eq!(get_char_category('ྜ'), CharCategory::SkrtSubCons);
        assert_eq!(get_char_category('ཱ'), CharCategory::SkrtVow);
        assert_eq!(get_char_category('ཿ'), CharCategory::SkrtLongVow);
    }

    #[test]
    fn test_tibetan_vowels() {
        assert_eq!(get_char_category('ི'), CharCategory::Vow);
        assert_eq!(get_char_category('ུ'), CharCategory::Vow);
        assert_eq!(get_char_category('ེ'), CharCategory::Vow);
        assert_eq!(get_char_category('ོ'), CharCategory::Vow);
    }

    #[test]
    fn test_tsek() {
        assert_eq!(get_char_category('་'), CharCategory::Tsek);
        assert_eq!(get_char_category('༌'), CharCategory::Tsek);
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(get_char_category('།'), CharCategory::NormalPunct);
        assert_eq!(get_char_category('༄'), CharCategory::SpecialPunct);
        assert_eq!(get_char_category('༼'), CharCategory::SpecialPunct);
    }

    #[test]
    fn test_unassigned_is_other() {
        assert_eq!(get_char_category('\u{0F48}'), CharCategory::Other);
        assert_eq!(get_char_category('\u{1F600}'), CharCategory::Other);
    }

    #[test]
    fn test_space() {
        assert_eq!(get_char_category(' '), CharCategory::Transparent);
        assert_eq!(get_char_category('\t'), CharCategory::Transparent);
        assert_eq!(get_char_category('\u{3000}'), CharCategory::Transparent);
    }

    #[test]
    fn test_latin() {
        assert_eq!(get_char_category('a'), CharCategory::Latin);
        assert_eq!(get_char_category('Z'), CharCategory::Latin);
    }

    #[test]
    fn test_range_table_is_sorted() {
        for pair in BO_RANGES.windows(2) {
            assert!(pair[0].0 <= pair[0].1);
            assert!(pair[0].1 < pair[1].0, "{:X} overlaps", pair[1].0);
        }
    }

    #[test]
    fn test_bo_string() {
        let bs = BoString::new("བཀྲ་");
        assert_eq!(bs.len(), 4);
        assert_eq!(bs.get_category(0), Some(CharCategory::Cons)); // བ
        assert_eq!(bs.get_category(1), Some(CharCategory::Cons)); // ཀ
        assert_eq!(bs.get_category(2), Some(CharCategory::SubCons)); // ྲ
        assert_eq!(bs.get_category(3), Some(CharCategory::Tsek)); // ་
        assert_eq!(bs.slice(0, 3), "བཀྲ");
        assert_eq!(bs.char_at(3), Some('་'));
    }

    #[test]
    fn test_ignored_chars_become_transparent() {
        let bs = BoString::with_ignored("བཀྲ<ཤིས", &['<']);
        assert_eq!(bs.get_category(3), Some(CharCategory::Transparent));
        let bs = BoString::new("བཀྲ<ཤིས");
        assert_eq!(bs.get_category(3), Some(CharCategory::Latin));
    }
}
