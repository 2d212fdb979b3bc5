//! Chunking and syllabification for Tibetan text.
//!
//! This module segments text into chunks (syllables, punctuation, etc.) that can
//! then be processed by the tokenizer.
//!
//! Every pass is built from the same run-length primitive, [`chunk_by`], and the
//! passes are chained with [`pipe`]: a pass only re-chunks the runs carrying one
//! tag and leaves the others untouched. Each pass takes the previous run list by
//! value and returns a new one.

use log::trace;

use crate::char_categories::{BoString, CharCategory};
use crate::syllable::{SylComponents, TSEK};
use crate::token::ChunkTag;

/// A tagged run of characters, in character indices of a [`BoString`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    /// Tag of the run
    pub tag: ChunkTag,
    /// First character index
    pub start: usize,
    /// Number of characters
    pub len: usize,
}

impl Run {
    /// Create a new run
    pub fn new(tag: ChunkTag, start: usize, len: usize) -> Self {
        Run { tag, start, len }
    }

    /// One past the last character index
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// A chunk of text with its type and position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// The syllable text (cleaned, without tsek or spaces) - None for non-syllable chunks
    pub syl: Option<String>,
    /// Coda marker closing the syllable instead of a tsek (visarga ཿ)
    pub coda: Option<char>,
    /// The type of this chunk
    pub chunk_type: ChunkTag,
    /// Starting byte offset in the original string
    pub start: usize,
    /// Length in bytes
    pub len: usize,
    /// Byte span `(start, len)` of the syllable letters, for syllable chunks
    pub syl_span: Option<(usize, usize)>,
}

impl Chunk {
    /// Create a new chunk
    pub fn new(syl: Option<String>, chunk_type: ChunkTag, start: usize, len: usize) -> Self {
        Chunk {
            syl,
            coda: None,
            chunk_type,
            start,
            len,
            syl_span: None,
        }
    }

    /// Whether this chunk is a syllable the tokenizer walks
    pub fn is_syllable(&self) -> bool {
        self.syl.is_some()
    }

    /// The character that closes the syllable in the trie: the coda marker if
    /// there is one, a tsek otherwise
    pub fn terminator(&self) -> char {
        self.coda.unwrap_or(TSEK)
    }

    /// Byte range of the chunk
    pub fn span(&self) -> std::ops::Range<usize> {
        self.start..self.start + self.len
    }
}

/// Split `[start, end)` into maximal runs over which `condition` keeps the
/// same truth value.
pub fn chunk_by<F>(start: usize, end: usize, condition: F) -> Vec<(bool, usize, usize)>
where
    F: Fn(usize) -> bool,
{
    let mut runs = Vec::new();
    if start >= end {
        return runs;
    }

    let mut state = condition(start);
    let mut run_start = start;
    for i in start + 1..end {
        let current = condition(i);
        if current != state {
            runs.push((state, run_start, i - run_start));
            state = current;
            run_start = i;
        }
    }
    runs.push((state, run_start, end - run_start));

    runs
}

/// Re-chunk every run tagged `to` with `rechunk`, keeping all other runs as they are
pub fn pipe<F>(runs: Vec<Run>, to: ChunkTag, mut rechunk: F) -> Vec<Run>
where
    F: FnMut(&Run) -> Vec<Run>,
{
    let mut out = Vec::with_capacity(runs.len());
    for run in runs {
        if run.tag == to {
            out.extend(rechunk(&run));
        } else {
            out.push(run);
        }
    }
    out
}

/// Chunker for Tibetan text
pub struct Chunker {
    /// The analyzed string
    bs: BoString,
}

impl Chunker {
    /// Create a new chunker for the given string
    pub fn new(text: &str) -> Self {
        Chunker {
            bs: BoString::new(text),
        }
    }

    /// Create a chunker that treats `ignore_chars` as transparent
    pub fn with_ignored(text: &str, ignore_chars: &[char]) -> Self {
        Chunker {
            bs: BoString::with_ignored(text, ignore_chars),
        }
    }

    /// Get the original string
    pub fn string(&self) -> &str {
        &self.bs.string
    }

    /// Get the classified string
    pub fn bo_string(&self) -> &BoString {
        &self.bs
    }

    fn cat(&self, idx: usize) -> CharCategory {
        self.bs.categories[idx]
    }

    /// Run-length chunking of `[start, end)` tagging runs `yes` where
    /// `condition` holds and `no` elsewhere
    pub fn chunk_using<F>(
        &self,
        condition: F,
        start: usize,
        end: usize,
        yes: ChunkTag,
        no: ChunkTag,
    ) -> Vec<Run>
    where
        F: Fn(usize) -> bool,
    {
        chunk_by(start, end, condition)
            .into_iter()
            .map(|(state, s, l)| Run::new(if state { yes } else { no }, s, l))
            .collect()
    }

    /// Tibetan script vs. everything else
    pub fn chunk_bo_chars(&self) -> Vec<Run> {
        self.chunk_using(
            |i| self.cat(i).is_tibetan(),
            0,
            self.bs.len(),
            ChunkTag::Script,
            ChunkTag::NonScript,
        )
    }

    /// A character is punctuation if it is a shad-like mark, or if it is a
    /// tsek or a space directly following anything that is not a syllable
    /// letter. The second rule keeps a tsek or a space glued to the
    /// punctuation, number or symbol it follows.
    fn is_punct(&self, idx: usize) -> bool {
        let cat = self.cat(idx);
        if cat.is_punct() {
            return true;
        }
        matches!(cat, CharCategory::Tsek | CharCategory::Transparent)
            && idx > 0
            && !self.cat(idx - 1).is_syllable_part()
    }

    fn chunk_punct(&self, runs: Vec<Run>) -> Vec<Run> {
        pipe(runs, ChunkTag::Script, |run| {
            self.chunk_using(
                |i| self.is_punct(i),
                run.start,
                run.end(),
                ChunkTag::Punct,
                ChunkTag::Script,
            )
        })
    }

    fn chunk_symbols(&self, runs: Vec<Run>) -> Vec<Run> {
        pipe(runs, ChunkTag::Script, |run| {
            self.chunk_using(
                |i| self.cat(i) == CharCategory::Symbol,
                run.start,
                run.end(),
                ChunkTag::Sym,
                ChunkTag::Script,
            )
        })
    }

    fn chunk_numbers(&self, runs: Vec<Run>) -> Vec<Run> {
        pipe(runs, ChunkTag::Script, |run| {
            self.chunk_using(
                |i| self.cat(i) == CharCategory::Numeral,
                run.start,
                run.end(),
                ChunkTag::Num,
                ChunkTag::Script,
            )
        })
    }

    fn is_skippable(&self, run: &Run) -> bool {
        matches!(run.tag, ChunkTag::Punct | ChunkTag::Script)
            && self
                .bs
                .get_categories(run.start, run.len)
                .iter()
                .all(|c| matches!(c, CharCategory::Tsek | CharCategory::Transparent))
    }

    fn all_transparent(&self, run: &Run) -> bool {
        self.bs
            .get_categories(run.start, run.len)
            .iter()
            .all(|c| *c == CharCategory::Transparent)
    }

    /// One pass folding tsek/space-only runs into a neighbour (the previous
    /// run if any, the next one otherwise) and coalescing adjacent runs of
    /// the same script. Returns `None` when nothing changed.
    fn merge_skippable_once(&self, runs: &[Run]) -> Option<Vec<Run>> {
        let mut out: Vec<Run> = Vec::with_capacity(runs.len());
        let mut changed = false;
        let mut carry: Option<usize> = None;

        for (i, run) in runs.iter().enumerate() {
            let mut run = *run;
            if let Some(carry_start) = carry.take() {
                run.len += run.start - carry_start;
                run.start = carry_start;
            }

            if self.is_skippable(&run) {
                if let Some(prev) = out.last_mut() {
                    prev.len += run.len;
                    changed = true;
                    continue;
                }
                if i + 1 < runs.len() {
                    carry = Some(run.start);
                    changed = true;
                    continue;
                }
                // nothing to attach to
                run.tag = if self.all_transparent(&run) {
                    ChunkTag::Space
                } else {
                    ChunkTag::Punct
                };
            }

            match out.last_mut() {
                Some(prev)
                    if prev.tag == run.tag
                        && matches!(run.tag, ChunkTag::Script | ChunkTag::NonScript) =>
                {
                    prev.len += run.len;
                    changed = true;
                }
                _ => out.push(run),
            }
        }

        changed.then_some(out)
    }

    /// Fold skippable punctuation until no fold applies any more; a fold can
    /// bring two script runs together, which then coalesce.
    fn merge_skippable_punct(&self, mut runs: Vec<Run>) -> Vec<Run> {
        while let Some(merged) = self.merge_skippable_once(&runs) {
            runs = merged;
        }
        runs
    }

    fn is_syl_end(&self, idx: usize) -> bool {
        matches!(
            self.cat(idx),
            CharCategory::Tsek | CharCategory::Transparent | CharCategory::SkrtLongVow
        )
    }

    /// Split a script run into syllables, each syllable keeping the tsek,
    /// spaces or visarga that close it.
    fn syllabify_run(&self, run: &Run) -> Vec<Run> {
        let pieces = chunk_by(run.start, run.end(), |i| self.is_syl_end(i));

        let mut out: Vec<Run> = Vec::with_capacity(pieces.len());
        let mut leading: Option<usize> = None;
        for (is_end, start, len) in pieces {
            if is_end {
                match out.last_mut() {
                    Some(prev) => prev.len += len,
                    None => leading = Some(start),
                }
            } else {
                let start_with_leading = leading.take().unwrap_or(start);
                out.push(Run::new(
                    ChunkTag::Text,
                    start_with_leading,
                    start + len - start_with_leading,
                ));
            }
        }

        if out.is_empty() {
            // no syllable letters at all
            let tag = if self.all_transparent(run) {
                ChunkTag::Space
            } else {
                ChunkTag::Punct
            };
            out.push(Run::new(tag, run.start, run.len));
        }

        out
    }

    fn syllabify(&self, runs: Vec<Run>) -> Vec<Run> {
        pipe(runs, ChunkTag::Script, |run| self.syllabify_run(run))
    }

    /// Syllable letters of a run, as a string, skipping spaces and the closing marks
    fn body_text(&self, run: &Run) -> String {
        let (body_start, body_end) = self.body_bounds(run);
        (body_start..body_end)
            .filter(|&i| self.cat(i).is_syllable_part())
            .filter_map(|i| self.bs.char_at(i))
            .collect()
    }

    /// Character range of the syllable letters of a text run: from the first
    /// letter to the last letter before the closing tsek/space/visarga.
    fn body_bounds(&self, run: &Run) -> (usize, usize) {
        let mut start = run.start;
        while start < run.end() && !self.cat(start).is_syllable_part() {
            start += 1;
        }
        let mut end = run.end();
        while end > start && self.is_syl_end(end - 1) {
            end -= 1;
        }
        (start, end)
    }

    /// Whether a text run is closed by spaces only (no tsek, no visarga)
    fn closed_by_space_only(&self, run: &Run) -> bool {
        let (_, body_end) = self.body_bounds(run);
        body_end < run.end()
            && self
                .bs
                .get_categories(body_end, run.end() - body_end)
                .iter()
                .all(|c| *c == CharCategory::Transparent)
    }

    /// Rejoin syllables that were typed with a stray interior space: a
    /// syllable closed only by spaces, whose letters form an open syllable,
    /// followed by a fragment made of consonants only, such that both
    /// together are a well-formed syllable ("ཁྱོ ད" -> "ཁྱོད").
    fn adjust_syls(&self, runs: Vec<Run>) -> Vec<Run> {
        let components = SylComponents::shared();
        let mut out: Vec<Run> = Vec::with_capacity(runs.len());

        for run in runs {
            if run.tag == ChunkTag::Text {
                if let Some(prev) = out.last_mut() {
                    if prev.tag == ChunkTag::Text
                        && prev.end() == run.start
                        && self.closed_by_space_only(prev)
                    {
                        let left = self.body_text(prev);
                        let right = self.body_text(&run);
                        let consonants_only = {
                            let (s, e) = self.body_bounds(&run);
                            (s..e).all(|i| {
                                matches!(
                                    self.cat(i),
                                    CharCategory::Cons | CharCategory::Transparent
                                )
                            })
                        };
                        if consonants_only
                            && components.is_open(&left)
                            && components.decompose(&format!("{}{}", left, right)).is_valid()
                        {
                            trace!("joining '{}' and '{}' across a space", left, right);
                            prev.len += run.len;
                            continue;
                        }
                    }
                }
            }
            out.push(run);
        }

        out
    }

    /// Transparent characters inside a non-script run take the kind of the
    /// character before them (or after them, at the start of the run)
    fn effective_foreign_category(&self, run: &Run, idx: usize) -> CharCategory {
        let mut i = idx;
        while i > run.start && self.cat(i) == CharCategory::Transparent {
            i -= 1;
        }
        if self.cat(i) == CharCategory::Transparent {
            i = idx;
            while i + 1 < run.end() && self.cat(i) == CharCategory::Transparent {
                i += 1;
            }
        }
        self.cat(i)
    }

    fn chunk_foreign(&self, runs: Vec<Run>) -> Vec<Run> {
        let runs = pipe(runs, ChunkTag::NonScript, |run| {
            self.chunk_using(
                |i| self.effective_foreign_category(run, i) == CharCategory::Cjk,
                run.start,
                run.end(),
                ChunkTag::Cjk,
                ChunkTag::NonScript,
            )
        });
        pipe(runs, ChunkTag::NonScript, |run| {
            self.chunk_using(
                |i| self.effective_foreign_category(run, i) == CharCategory::Latin,
                run.start,
                run.end(),
                ChunkTag::Latin,
                ChunkTag::Other,
            )
        })
    }

    /// Run the full pipeline, returning tagged character runs
    pub fn make_runs(&self) -> Vec<Run> {
        if self.bs.is_empty() {
            return Vec::new();
        }

        let runs = self.chunk_bo_chars();
        let runs = self.chunk_punct(runs);
        let runs = self.chunk_symbols(runs);
        let runs = self.chunk_numbers(runs);
        let runs = self.merge_skippable_punct(runs);
        let runs = self.syllabify(runs);
        let runs = self.adjust_syls(runs);
        let runs = self.chunk_foreign(runs);

        trace!("{} runs for {} chars", runs.len(), self.bs.len());
        runs
    }

    /// Chunk the text into syllables, punctuation, etc.
    pub fn make_chunks(&self) -> Vec<Chunk> {
        self.make_runs()
            .iter()
            .filter(|run| run.len > 0)
            .map(|run| self.to_chunk(run))
            .collect()
    }

    fn to_chunk(&self, run: &Run) -> Chunk {
        let bytes = self.bs.byte_range(run.start, run.len);
        let mut chunk = Chunk::new(None, run.tag, bytes.start, bytes.len());

        if run.tag == ChunkTag::Text {
            let (body_start, body_end) = self.body_bounds(run);
            chunk.syl = Some(self.body_text(run));
            let body_bytes = self.bs.byte_range(body_start, body_end - body_start);
            chunk.syl_span = Some((body_bytes.start, body_bytes.len()));
            chunk.coda = (body_end..run.end())
                .find(|&i| self.cat(i) == CharCategory::SkrtLongVow)
                .and_then(|i| self.bs.char_at(i));
        }

        chunk
    }

    /// Human-readable `(tag, substring)` projection of a chunk list
    pub fn get_readable<'a>(&'a self, chunks: &[Chunk]) -> Vec<(&'static str, &'a str)> {
        chunks
            .iter()
            .map(|c| (c.chunk_type.as_str(), &self.bs.string[c.span()]))
            .collect()
    }
}

/// Syllables of a dictionary form, each with the character closing it in the
/// trie (tsek or coda marker). Punctuation and non-Tibetan text are dropped.
pub fn syllables_of(form: &str) -> Vec<(String, char)> {
    Chunker::new(form)
        .make_chunks()
        .into_iter()
        .filter_map(|chunk| {
            let terminator = chunk.terminator();
            chunk.syl.map(|syl| (syl, terminator))
        })
        .collect()
}
