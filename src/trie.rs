//! Trie data structure for dictionary-based tokenization.
//!
//! The Trie stores words character by character, each syllable closed by its
//! tsek (or coda marker), so the tokenizer can walk a syllable one character
//! at a time and keep the longest match seen so far.
//!
//! Nodes live in a single arena and are addressed by [`NodeId`]; the root is
//! always node `0`. Nodes are never removed: deactivating a word only hides
//! it, leaving longer words that share its prefix intact.

use std::io::{Read, Write};
use std::path::Path;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::char_categories::{get_char_category, CharCategory};
use crate::chunker::syllables_of;
use crate::error::{BotokError, Result};
use crate::syllable::{SylComponents, CODA_MARKER, TSEK};
use crate::token::Sense;

/// Index of a node in the trie arena
pub type NodeId = usize;

const ROOT: NodeId = 0;

/// A node in the Trie
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrieNode {
    /// Children nodes, sorted by character
    children: Vec<(char, NodeId)>,
    /// Whether this node marks the end of a valid word
    is_leaf: bool,
    /// Senses of the word ending here
    senses: Vec<Sense>,
}

impl TrieNode {
    /// Check if this node has any children
    pub fn can_walk(&self) -> bool {
        !self.children.is_empty()
    }

    /// Check if this node is a valid word ending
    pub fn is_match(&self) -> bool {
        self.is_leaf
    }

    /// Senses of the word ending at this node
    pub fn senses(&self) -> &[Sense] {
        &self.senses
    }

    fn child(&self, c: char) -> Option<NodeId> {
        self.children
            .binary_search_by(|(k, _)| k.cmp(&c))
            .ok()
            .map(|i| self.children[i].1)
    }
}

/// A Trie for storing and looking up Tibetan words
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trie {
    nodes: Vec<TrieNode>,
    /// Number of words in the trie
    word_count: usize,
}

impl Default for Trie {
    fn default() -> Self {
        Trie {
            nodes: vec![TrieNode::default()],
            word_count: 0,
        }
    }
}

fn check_key(key: &str) -> Result<()> {
    match key.chars().last() {
        None => Err(BotokError::EmptyKey),
        Some(c) if c == TSEK || c == CODA_MARKER => Ok(()),
        Some(_) => Err(BotokError::UnterminatedKey {
            key: key.to_string(),
        }),
    }
}

/// Trie key of a word given as syllables with their closing character
pub fn key_of<S: AsRef<str>>(syls: &[(S, char)]) -> String {
    let mut key = String::new();
    for (syl, terminator) in syls {
        key.push_str(syl.as_ref());
        key.push(*terminator);
    }
    key
}

impl Trie {
    /// Create a new empty Trie
    pub fn new() -> Self {
        Trie::default()
    }

    /// Get the number of words in the trie
    pub fn len(&self) -> usize {
        self.word_count
    }

    /// Check if the trie is empty
    pub fn is_empty(&self) -> bool {
        self.word_count == 0
    }

    /// Number of nodes, root included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get a node by id
    pub fn node(&self, id: NodeId) -> &TrieNode {
        &self.nodes[id]
    }

    /// Insert a word, appending `sense` to the senses already attached to it.
    ///
    /// `key` is the word's syllables, each closed by a tsek or coda marker.
    pub fn insert(&mut self, key: &str, sense: Option<Sense>) -> Result<NodeId> {
        check_key(key)?;

        let mut current = ROOT;
        for c in key.chars() {
            current = match self.nodes[current].child(c) {
                Some(next) => next,
                None => {
                    let next = self.nodes.len();
                    self.nodes.push(TrieNode::default());
                    let children = &mut self.nodes[current].children;
                    let pos = children.partition_point(|(k, _)| *k < c);
                    children.insert(pos, (c, next));
                    next
                }
            };
        }

        let node = &mut self.nodes[current];
        if !node.is_leaf {
            node.is_leaf = true;
            self.word_count += 1;
        }
        if let Some(sense) = sense {
            node.senses.push(sense);
        }

        Ok(current)
    }

    /// Walk the trie by one character, from `current` or from the root
    pub fn walk(&self, c: char, current: Option<NodeId>) -> Option<NodeId> {
        self.nodes[current.unwrap_or(ROOT)].child(c)
    }

    /// Whether a word ends at `node`
    pub fn is_match(&self, node: NodeId) -> bool {
        self.nodes[node].is_match()
    }

    /// Whether `node` has any children
    pub fn can_walk(&self, node: NodeId) -> bool {
        self.nodes[node].can_walk()
    }

    fn find(&self, key: &str) -> Result<Option<NodeId>> {
        if key.is_empty() {
            return Err(BotokError::EmptyKey);
        }
        let mut current = ROOT;
        for c in key.chars() {
            match self.nodes[current].child(c) {
                Some(next) => current = next,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    /// Senses of `key` if it is an active word, `None` otherwise
    pub fn lookup(&self, key: &str) -> Result<Option<&[Sense]>> {
        Ok(self
            .find(key)?
            .map(|id| &self.nodes[id])
            .filter(|node| node.is_leaf)
            .map(|node| node.senses.as_slice()))
    }

    /// Check if a word exists in the trie
    pub fn contains(&self, key: &str) -> bool {
        matches!(self.lookup(key), Ok(Some(_)))
    }

    /// Hide a word: clear its leaf flag and its senses, keeping its subtree.
    ///
    /// Returns whether a word was deactivated.
    pub fn deactivate(&mut self, key: &str) -> Result<bool> {
        let Some(id) = self.find(key)? else {
            return Ok(false);
        };
        let node = &mut self.nodes[id];
        node.senses.clear();
        if node.is_leaf {
            node.is_leaf = false;
            self.word_count -= 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Write a JSON snapshot of the trie
    pub fn to_json_writer<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    /// Read a trie from a JSON snapshot
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Trie> {
        let trie: Trie = serde_json::from_reader(reader)?;
        debug!(
            "loaded trie snapshot: {} words, {} nodes",
            trie.word_count,
            trie.nodes.len()
        );
        Ok(trie)
    }
}

/// One parsed dictionary line
#[derive(Debug, Clone, PartialEq)]
struct Entry {
    form: String,
    remove: bool,
    sense: Sense,
}

fn non_empty(field: Option<&&str>) -> Option<String> {
    field
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn is_skrt(form: &str) -> bool {
    form.chars().any(|c| {
        matches!(
            get_char_category(c),
            CharCategory::SkrtCons
                | CharCategory::SkrtSubCons
                | CharCategory::SkrtVow
                | CharCategory::SkrtLongVow
        )
    })
}

fn parse_line(line: &str, separator: char) -> Option<Entry> {
    let parts: Vec<&str> = line.split(separator).collect();
    if parts.len() > 5 {
        return None;
    }

    let raw_form = parts[0].trim();
    let (form, remove) = match raw_form.strip_prefix('-') {
        Some(form) => (form.trim(), true),
        None => (raw_form, false),
    };
    if form.is_empty() {
        return None;
    }

    let freq = match non_empty(parts.get(3)) {
        Some(freq) => Some(freq.parse::<u32>().ok()?),
        None => None,
    };

    Some(Entry {
        form: form.to_string(),
        remove,
        sense: Sense {
            pos: non_empty(parts.get(1)),
            lemma: non_empty(parts.get(2)),
            freq,
            meaning: non_empty(parts.get(4)),
            skrt: is_skrt(form),
            ..Default::default()
        },
    })
}

/// Builder loading a Trie from dictionary resources.
///
/// Each resource line reads `form[,POS[,lemma[,freq[,gloss]]]]`, the
/// separator being a tab if the first entry of the resource holds one and a
/// comma otherwise. Lines starting with `#` are comments. A form starting with
/// `-` removes the word instead of adding it; removals are applied by
/// [`TrieBuilder::build`], after every resource has been added, so they do
/// not depend on the order resources are loaded in.
pub struct TrieBuilder {
    trie: Trie,
    inflect: bool,
    removals: Vec<String>,
}

impl TrieBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        TrieBuilder {
            trie: Trie::new(),
            inflect: false,
            removals: Vec::new(),
        }
    }

    /// A builder that also inserts every affixed form of each word
    pub fn with_inflection() -> Self {
        TrieBuilder {
            trie: Trie::new(),
            inflect: true,
            removals: Vec::new(),
        }
    }

    /// Start from an existing trie
    pub fn from_trie(trie: Trie, inflect: bool) -> Self {
        TrieBuilder {
            trie,
            inflect,
            removals: Vec::new(),
        }
    }

    /// Keys of a form: its own key, then its affixed forms with the affixed
    /// senses, when inflecting
    fn keys_for(&self, form: &str, sense: &Sense) -> Vec<(String, Sense)> {
        let syls = syllables_of(form);
        let Some(((last, _), _)) = syls.split_last() else {
            return Vec::new();
        };

        let mut keys = vec![(key_of(&syls), sense.clone())];
        if self.inflect {
            let stem = key_of(&syls[..syls.len() - 1]);
            for (affixed, record) in SylComponents::shared().enumerate_affixed(last) {
                let affixed_sense = Sense {
                    affixed: true,
                    affixation: Some(record),
                    ..sense.clone()
                };
                keys.push((format!("{}{}{}", stem, affixed, TSEK), affixed_sense));
            }
        }
        keys
    }

    /// Add one word with its sense (and its affixed forms when inflecting)
    pub fn add_word(&mut self, form: &str, sense: Sense) -> Result<usize> {
        let keys = self.keys_for(form, &sense);
        for (key, sense) in &keys {
            self.trie.insert(key, Some(sense.clone()))?;
        }
        Ok(keys.len())
    }

    /// Remove one word (and its affixed forms when inflecting) right away
    pub fn remove_word(&mut self, form: &str) -> Result<usize> {
        let mut removed = 0;
        for (key, _) in self.keys_for(form, &Sense::default()) {
            if self.trie.deactivate(&key)? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Load words from a dictionary resource, returning how many lines were
    /// accepted. Malformed lines are skipped; removal lines wait for
    /// [`TrieBuilder::build`].
    pub fn load_dictionary(&mut self, content: &str) -> usize {
        let mut lines = content
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim_end_matches('\r')))
            .filter(|(_, line)| !line.trim().is_empty() && !line.trim_start().starts_with('#'))
            .peekable();

        let separator = match lines.peek() {
            Some((_, line)) if line.contains('\t') => '\t',
            _ => ',',
        };

        let mut applied = 0;
        for (line_no, line) in lines {
            let Some(entry) = parse_line(line, separator) else {
                warn!("skipping malformed dictionary line {}: {:?}", line_no, line);
                continue;
            };

            if entry.remove {
                self.removals.push(entry.form);
                applied += 1;
                continue;
            }

            match self.add_word(&entry.form, entry.sense) {
                Ok(0) => {
                    warn!("skipping dictionary line {} with no syllables: {:?}", line_no, line)
                }
                Ok(_) => applied += 1,
                Err(err) => warn!("skipping dictionary line {}: {}", line_no, err),
            }
        }

        debug!("applied {} dictionary lines", applied);
        applied
    }

    /// Load a dictionary resource from a file
    pub fn load_path(&mut self, path: &Path) -> Result<usize> {
        let content = std::fs::read_to_string(path)?;
        let applied = self.load_dictionary(&content);
        info!("loaded {} entries from {}", applied, path.display());
        Ok(applied)
    }

    /// Removal lines loaded so far, not yet applied
    pub fn pending_removals(&self) -> &[String] {
        &self.removals
    }

    /// Apply the pending removals, then return the Trie
    pub fn build(mut self) -> Trie {
        for form in std::mem::take(&mut self.removals) {
            match self.remove_word(&form) {
                Ok(0) => debug!("removal of {:?} matched no word", form),
                Ok(_) => {}
                Err(err) => warn!("cannot remove {:?}: {}", form, err),
            }
        }
        self.trie
    }
}

impl Default for TrieBuilder {
    fn default() -> Self {
        Self::new()
    }
}
