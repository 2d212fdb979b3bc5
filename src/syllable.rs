//! Tibetan syllable analysis and affix system.
//!
//! [`SylComponents`] decomposes a syllable into its root (prefix, superscript,
//! root letter and subscripts) and its rime (vowel and final consonants), and
//! generates every affixed form a syllable can take when a case or discourse
//! particle is glued onto it without a tsek.
//!
//! The root and rime tables are generated from the letter combinations
//! Tibetan orthography allows, plus a few curated lists for exceptions,
//! syllables with two valid readings, invariant loan syllables and the
//! archaic second suffix ད (da drag).

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Tsek character
pub const TSEK: char = '་';

/// Visarga, closing a syllable in place of a tsek
pub const CODA_MARKER: char = 'ཿ';

/// The a-chung, elided when a particle is affixed
pub const A_CHUNG: char = 'འ';

/// Particles that attach to a syllable without a tsek, with their type, in
/// the order affixed forms are generated
pub static AFFIXES: &[(&str, &str)] = &[
    ("ར", "la"),
    ("ས", "gis"),
    ("འི", "gi"),
    ("འམ", "am"),
    ("འང", "ang"),
    ("འོ", "o"),
    ("འིའོ", "gi+o"),
    ("འིའམ", "gi+am"),
    ("འིའང", "gi+ang"),
    ("འོའམ", "o+am"),
    ("འོའང", "o+ang"),
];

/// Dagdra particles (pa/po/ba/bo)
pub static DAGDRA: &[&str] = &["པ་", "པོ་", "བ་", "བོ་"];

const ROOT_LETTERS: &str = "ཀཁགངཅཆཇཉཏཐདནཔཕབམཙཚཛཝཞཟའཡརལཤསཧཨ";

const GLIDES: [char; 4] = ['ྱ', 'ྲ', 'ླ', 'ྭ'];

const VOWELS: [&str; 4] = ["ི", "ུ", "ེ", "ོ"];

const SUFFIXES: &str = "གངདནབམའརལས";

const DOUBLE_SUFFIXES: &[&str] = &["གས", "ངས", "བས", "མས", "ནད", "རད", "ལད"];

/// Superscript letters and the root letters each one can sit on
const SUPERSCRIPTS: &[(char, &str)] = &[
    ('ར', "ཀགངཇཉཏདནབམཙཛ"),
    ('ལ', "ཀགངཅཇཏདཔབཧ"),
    ('ས', "ཀགངཉཏདནཔབམཙ"),
];

/// Subscript glides and the root letters each one can hang from
const SUBSCRIPTS: &[(char, &str)] = &[
    ('ྱ', "ཀཁགཔཕབམཧ"),
    ('ྲ', "ཀཁགཏཐདནཔཕབམསཧ"),
    ('ླ', "ཀགབཟརས"),
    ('ྭ', "ཀཁགཅཉཏདཙཚཞཟརལཤསཧ"),
];

const SUPER_AND_SUB: &[&str] = &[
    "རྐྱ", "རྒྱ", "རྨྱ", "སྐྱ", "སྒྱ", "སྤྱ", "སྦྱ", "སྨྱ", "སྐྲ", "སྒྲ", "སྤྲ", "སྦྲ", "སྨྲ",
];

/// Prefix letters and the roots each one can precede
const PREFIXES: &[(char, &[&str])] = &[
    ('ག', &["ཅ", "ཉ", "ཏ", "ད", "ན", "ཙ", "ཞ", "ཟ", "ཡ", "ཤ", "ས"]),
    (
        'ད',
        &[
            "ཀ", "ག", "ང", "པ", "བ", "མ", "ཀྱ", "གྱ", "པྱ", "བྱ", "མྱ", "ཀྲ", "གྲ", "པྲ", "བྲ",
        ],
    ),
    (
        'བ',
        &[
            "ཀ", "ག", "ཅ", "ཏ", "ད", "ཙ", "ཞ", "ཟ", "ཤ", "ས", "ཀྱ", "གྱ", "ཀྲ", "གྲ", "ཀླ", "ཟླ",
            "རླ", "སླ", "རྐ", "རྒ", "རྔ", "རྗ", "རྙ", "རྟ", "རྡ", "རྣ", "རྩ", "རྫ", "ལྟ", "ལྡ",
            "སྐ", "སྒ", "སྔ", "སྙ", "སྟ", "སྡ", "སྣ", "སྩ", "རྐྱ", "རྒྱ", "སྐྱ", "སྒྱ", "སྐྲ",
            "སྒྲ",
        ],
    ),
    (
        'མ',
        &[
            "ཁ", "ག", "ང", "ཆ", "ཇ", "ཉ", "ཐ", "ད", "ན", "ཚ", "ཛ", "ཁྱ", "གྱ", "ཁྲ", "གྲ",
        ],
    ),
    (
        'འ',
        &[
            "ཁ", "ག", "ཆ", "ཇ", "ཐ", "ད", "ཕ", "བ", "ཚ", "ཛ", "ཁྱ", "གྱ", "ཕྱ", "བྱ", "ཁྲ", "གྲ",
            "དྲ", "ཕྲ", "བྲ",
        ],
    ),
];

/// Invariant loan syllables
const COMPLETE_ROOTS: &[&str] = &[
    "ཨོཾ", "ཧཱུྃ", "ཧཱུཾ", "ཧཱུ", "ཨཱཿ", "ཨཱ", "ཨཿ", "ཀྵ", "ཧྲཱིཿ", "ཧྲཱི",
];

/// The only rimes a complete root can take
const COMPLETE_RIMES: &[&str] = &["", "འི", "ར", "ས", "འོ", "འམ", "འང"];

/// Syllables whose decomposition is fixed by hand
const EXCEPTIONS: &[(&str, &str, &str)] = &[
    ("ཕྱྭ", "ཕྱྭ", ""),
    ("གྲྭ", "གྲྭ", ""),
    ("རྩྭ", "རྩྭ", ""),
];

/// Syllables with two valid readings
const AMBIGUOUS: &[(&str, &[(&str, &str)])] = &[
    ("དགས", &[("ད", "གས"), ("དག", "ས")]),
    ("བགས", &[("བ", "གས"), ("བག", "ས")]),
    ("མངས", &[("མ", "ངས"), ("མང", "ས")]),
    ("འགས", &[("འ", "གས"), ("འག", "ས")]),
    ("འབས", &[("འ", "བས"), ("འབ", "ས")]),
    ("དམས", &[("ད", "མས"), ("དམ", "ས")]),
    ("མགས", &[("མ", "གས"), ("མག", "ས")]),
];

/// Syllables written with the archaic second suffix ད
const DADRAG: &[&str] = &["ཀུནད", "གྱུརད", "སྟོནད", "བྱུརད", "ཐལད", "ཡིནད", "ཕྱིནད"];

const MAX_ROOT_LEN: usize = 6;
const MAX_RIME_LEN: usize = 5;

/// What follows the mingzhi in a syllable that can host a particle
static AFFIXABLE_TAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[ྱྲླྭ]?[ིེོུ]?འ?$").expect("Invalid regex"));

static SHARED: Lazy<SylComponents> = Lazy::new(SylComponents::new);

/// The particle glued onto an affixed form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffixRecord {
    /// Surface form of the particle
    pub suffix: String,
    /// Length of the particle in characters
    pub len: usize,
    /// Type of affix (e.g., "la", "gis", "gi", etc.)
    pub affix_type: String,
    /// Whether འ was removed before adding the affix
    pub aa: bool,
}

/// How a root was formed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootKind {
    /// Root letter, with optional superscript and subscripts
    Plain,
    /// A plain root preceded by a prefix letter
    Prefixed,
    /// Invariant loan syllable
    Complete,
}

/// Result of splitting a syllable into root and rime
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyllableDecomposition {
    /// Exactly one reading
    Unique {
        /// Root part
        root: String,
        /// Rime part, possibly empty
        rime: String,
    },
    /// Several `(root, rime)` readings
    Ambiguous(Vec<(String, String)>),
    /// Not a well-formed syllable
    Invalid,
}

impl SyllableDecomposition {
    /// Whether the syllable is well-formed, whatever its reading
    pub fn is_valid(&self) -> bool {
        !matches!(self, SyllableDecomposition::Invalid)
    }

    /// The root of an unambiguous syllable
    pub fn root(&self) -> Option<&str> {
        match self {
            SyllableDecomposition::Unique { root, .. } => Some(root),
            _ => None,
        }
    }
}

fn subjoined(c: char) -> Option<char> {
    let cp = c as u32;
    if (0x0F40..=0x0F6C).contains(&cp) {
        char::from_u32(cp + 0x50)
    } else {
        None
    }
}

fn char_slice(chars: &[char]) -> String {
    chars.iter().collect()
}

/// Root and rime tables of Tibetan syllables
pub struct SylComponents {
    roots: HashMap<String, RootKind>,
    rimes: HashSet<String>,
    mingzhi: HashSet<String>,
}

impl Default for SylComponents {
    fn default() -> Self {
        Self::new()
    }
}

impl SylComponents {
    /// Build the tables
    pub fn new() -> Self {
        let roots = Self::build_roots();
        let mingzhi = roots
            .iter()
            .filter(|(root, kind)| {
                **kind != RootKind::Complete && !root.chars().any(|c| GLIDES.contains(&c))
            })
            .map(|(root, _)| root.clone())
            .collect();

        SylComponents {
            roots,
            rimes: Self::build_rimes(),
            mingzhi,
        }
    }

    /// Process-wide tables, built on first use
    pub fn shared() -> &'static SylComponents {
        &SHARED
    }

    fn build_roots() -> HashMap<String, RootKind> {
        let mut plain: HashSet<String> = ROOT_LETTERS.chars().map(String::from).collect();
        for (sup, bases) in SUPERSCRIPTS {
            for base in bases.chars() {
                if let Some(sub) = subjoined(base) {
                    plain.insert([*sup, sub].iter().collect());
                }
            }
        }
        for (glide, bases) in SUBSCRIPTS {
            for base in bases.chars() {
                plain.insert([base, *glide].iter().collect());
            }
        }
        plain.extend(SUPER_AND_SUB.iter().map(|s| s.to_string()));

        let mut roots: HashMap<String, RootKind> = plain
            .into_iter()
            .map(|root| (root, RootKind::Plain))
            .collect();
        for (prefix, bodies) in PREFIXES {
            for body in *bodies {
                roots.insert(format!("{}{}", prefix, body), RootKind::Prefixed);
            }
        }

        let complete = COMPLETE_ROOTS.iter().map(|s| s.to_string()).chain(
            ROOT_LETTERS
                .chars()
                .flat_map(|c| [format!("{}ཾ", c), format!("{}ོཾ", c)]),
        );
        for root in complete {
            roots.entry(root).or_insert(RootKind::Complete);
        }

        roots
    }

    fn build_rimes() -> HashSet<String> {
        let mut codas: Vec<String> = vec![String::new()];
        codas.extend(SUFFIXES.chars().map(String::from));
        codas.extend(DOUBLE_SUFFIXES.iter().map(|s| s.to_string()));
        codas.extend(AFFIXES.iter().map(|(affix, _)| affix.to_string()));

        let mut rimes = HashSet::new();
        for vowel in std::iter::once("").chain(VOWELS) {
            for coda in &codas {
                // a bare a-chung never follows a vowel sign
                if !vowel.is_empty() && coda.as_str() == "འ" {
                    continue;
                }
                rimes.insert(format!("{}{}", vowel, coda));
            }
        }
        rimes
    }

    /// How `root` was formed, if it is a known root
    pub fn root_kind(&self, root: &str) -> Option<RootKind> {
        self.roots.get(root).copied()
    }

    fn is_rejected(kind: RootKind, root: &[char], rime: &str) -> bool {
        match kind {
            RootKind::Plain => rime == "འ",
            // "དག" reads as ད + ག, not as a prefixed ག with no rime
            RootKind::Prefixed => rime.is_empty() && root.len() == 2,
            RootKind::Complete => true,
        }
    }

    /// Split a syllable (without tsek) into root and rime
    pub fn decompose(&self, syl: &str) -> SyllableDecomposition {
        if let Some((_, root, rime)) = EXCEPTIONS.iter().find(|(s, ..)| *s == syl) {
            return SyllableDecomposition::Unique {
                root: root.to_string(),
                rime: rime.to_string(),
            };
        }
        if let Some((_, readings)) = AMBIGUOUS.iter().find(|(s, _)| *s == syl) {
            return SyllableDecomposition::Ambiguous(
                readings
                    .iter()
                    .map(|(root, rime)| (root.to_string(), rime.to_string()))
                    .collect(),
            );
        }

        let chars: Vec<char> = syl.chars().collect();
        let max_root = chars.len().min(MAX_ROOT_LEN);

        for i in (1..=max_root).rev() {
            let root = char_slice(&chars[..i]);
            if self.root_kind(&root) == Some(RootKind::Complete) {
                let rime = char_slice(&chars[i..]);
                if COMPLETE_RIMES.contains(&rime.as_str()) {
                    return SyllableDecomposition::Unique { root, rime };
                }
            }
        }

        let mut readings = Vec::new();
        for i in 1..=max_root {
            if chars.len() - i > MAX_RIME_LEN {
                continue;
            }
            let root = char_slice(&chars[..i]);
            let rime = char_slice(&chars[i..]);
            if let Some(kind) = self.root_kind(&root) {
                if self.rimes.contains(&rime) && !Self::is_rejected(kind, &chars[..i], &rime) {
                    readings.push((root, rime));
                }
            }
        }

        match readings.len() {
            0 => SyllableDecomposition::Invalid,
            1 => {
                let (root, rime) = readings.remove(0);
                SyllableDecomposition::Unique { root, rime }
            }
            _ => SyllableDecomposition::Ambiguous(readings),
        }
    }

    /// Whether the syllable ends on its vowel: no final consonant
    pub fn is_open(&self, syl: &str) -> bool {
        match self.decompose(syl) {
            SyllableDecomposition::Unique { rime, .. } => {
                rime.is_empty() || VOWELS.contains(&rime.as_str())
            }
            _ => false,
        }
    }

    /// The key deciding which particle form agrees with a syllable: the
    /// longest start of its root without subscript glides
    pub fn get_mingzhi(&self, syl: &str) -> Option<String> {
        let decomposition = self.decompose(syl);
        let root: Vec<char> = decomposition.root()?.chars().collect();
        (1..=root.len())
            .rev()
            .map(|i| char_slice(&root[..i]))
            .find(|prefix| self.mingzhi.contains(prefix))
    }

    /// Check if a syllable is affixable (can take particle affixes)
    pub fn is_affixable(&self, syl: &str) -> bool {
        if AFFIXES
            .iter()
            .any(|(affix, _)| syl.len() > affix.len() && syl.ends_with(affix))
        {
            return false;
        }
        if DADRAG.contains(&syl) {
            return true;
        }

        match self.get_mingzhi(syl) {
            Some(mingzhi) => AFFIXABLE_TAIL.is_match(&syl[mingzhi.len()..]),
            None => false,
        }
    }

    /// Get all affixed forms of a syllable, with the particle each one carries.
    ///
    /// Empty if the syllable is not affixable.
    pub fn enumerate_affixed(&self, syl: &str) -> Vec<(String, AffixRecord)> {
        if !self.is_affixable(syl) {
            return Vec::new();
        }

        let (base, aa) = match syl.strip_suffix(A_CHUNG) {
            Some(stripped) if !stripped.is_empty() => (stripped, true),
            _ => (syl, false),
        };

        AFFIXES
            .iter()
            .map(|(affix, affix_type)| {
                (
                    format!("{}{}", base, affix),
                    AffixRecord {
                        suffix: affix.to_string(),
                        len: affix.chars().count(),
                        affix_type: affix_type.to_string(),
                        aa,
                    },
                )
            })
            .collect()
    }
}

/// Check if a word is a dagdra particle (pa/po/ba/bo)
pub fn is_dagdra(text: &str) -> bool {
    let cleaned = if text.ends_with(TSEK) {
        text.to_string()
    } else {
        format!("{}{}", text, TSEK)
    };
    DAGDRA.contains(&cleaned.as_str())
}
