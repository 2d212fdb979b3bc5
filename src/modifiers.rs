//! Token post-processing and modification.
//!
//! This module provides functions to modify tokens after initial tokenization,
//! including splitting affixed particles, merging dagdra, and generating lemmas.
//! Every step keeps the tokens an exact partition of the tokenized text.

use crate::char_categories::get_char_category;
use crate::config::TokenizerConfig;
use crate::syllable::{is_dagdra, AffixRecord, A_CHUNG, TSEK};
use crate::token::{ChunkTag, Sense, Token};

/// Part-of-speech given to particles split off their host
pub const PARTICLE_POS: &str = "PART";

/// The affix a token should be split on: every sense is an affixed form
fn affix_to_split(token: &Token) -> Option<&AffixRecord> {
    if token.is_affix || token.senses.is_empty() || !token.senses.iter().all(|s| s.affixed) {
        return None;
    }
    token.affixation.as_ref()
}

/// Byte offset, within `text`, of the `n`-th syllable letter
fn letter_offset(text: &str, n: usize) -> Option<usize> {
    text.char_indices()
        .filter(|(_, c)| get_char_category(*c).is_syllable_part())
        .nth(n)
        .map(|(i, _)| i)
}

/// Split tokens that end with an affixed particle.
///
/// "བཀྲ་ཤིས་ཀྱི" style compounds are left alone; only a particle glued onto
/// the last syllable ("ཀ་བའི" -> "ཀ་བ" + "འི") is split off.
pub fn split_affixed(tokens: &mut Vec<Token>) {
    let mut i = 0;
    while i < tokens.len() {
        if let Some(affix) = affix_to_split(&tokens[i]).cloned() {
            if let Some((host, particle)) = split_token_at_affix(&tokens[i], &affix) {
                tokens[i] = host;
                tokens.insert(i + 1, particle);
                i += 1; // Skip the newly inserted particle
            }
        }
        i += 1;
    }
}

/// Split a token at the affix boundary
fn split_token_at_affix(token: &Token, affix: &AffixRecord) -> Option<(Token, Token)> {
    let last_syl = token.syls.last()?;
    let &(span_start, span_len) = token.syl_spans.last()?;
    let host_letters = last_syl.chars().count().checked_sub(affix.len)?;
    if host_letters == 0 {
        return None;
    }

    let span_text = &token.text[span_start..span_start + span_len];
    let split = span_start + letter_offset(span_text, host_letters)?;
    let (host_last, particle_syl) = last_syl.split_at(last_syl.char_indices().nth(host_letters)?.0);

    let mut host_syls = token.syls.clone();
    let last = host_syls.len() - 1;
    host_syls[last] = host_last.to_string();
    let mut host_spans = token.syl_spans.clone();
    host_spans[last] = (span_start, split - span_start);

    let mut lemma_syls = host_syls.clone();
    if affix.aa {
        lemma_syls[last].push(A_CHUNG);
    }
    let default_lemma = format!("{}{}", lemma_syls.join(&TSEK.to_string()), TSEK);

    let mut host = Token::with_text(token.text[..split].to_string(), token.start, split, ChunkTag::Text);
    host.syls = host_syls;
    host.syl_spans = host_spans;
    host.senses = token
        .senses
        .iter()
        .map(|s| Sense {
            affixed: false,
            affixation: None,
            ..s.clone()
        })
        .collect();
    host.lemma = host
        .senses
        .iter()
        .find_map(|s| s.lemma.clone())
        .or(Some(default_lemma));
    host.is_skrt = token.is_skrt;
    host.is_affix_host = true;
    host.affixation = Some(affix.clone());
    host.annotations = token.annotations.clone();

    let mut particle = Token::with_text(
        token.text[split..].to_string(),
        token.start + split,
        token.len - split,
        ChunkTag::Text,
    );
    particle.syls = vec![particle_syl.to_string()];
    particle.syl_spans = vec![(0, span_start + span_len - split)];
    particle.senses = vec![Sense::with_pos(PARTICLE_POS)];
    particle.pos = Some(PARTICLE_POS.to_string());
    particle.is_affix = true;
    particle
        .annotations
        .insert("affix_type".to_string(), affix.affix_type.clone());

    Some((host, particle))
}

/// Merge dagdra particles (པ་/པོ་/བ་/བོ་) with the preceding word.
///
/// In Tibetan, these particles are often written separately but should be
/// considered part of the preceding word for many NLP tasks.
pub fn merge_dagdra(tokens: &mut Vec<Token>) {
    let mut i = 0;
    while i + 1 < tokens.len() {
        let mergeable = tokens[i].is_word()
            && !tokens[i].is_affix
            && tokens[i + 1].is_word()
            && is_dagdra(&tokens[i + 1].text_cleaned());

        if mergeable {
            let second = tokens.remove(i + 1);
            merge_into(&mut tokens[i], second);
            // the merged token may take another dagdra
        } else {
            i += 1;
        }
    }
}

fn merge_into(first: &mut Token, second: Token) {
    let offset = first.len;
    first.text.push_str(&second.text);
    first.len += second.len;
    first.syls.extend(second.syls);
    first
        .syl_spans
        .extend(second.syl_spans.into_iter().map(|(s, l)| (s + offset, l)));
    first.has_merged_dagdra = true;
    first.lemma = Some(first.text_cleaned());
}

/// Generate default lemmas for tokens that don't have one.
///
/// The default lemma is the cleaned text (syllables joined with tsek).
pub fn generate_default_lemmas(tokens: &mut [Token]) {
    for token in tokens.iter_mut() {
        if token.lemma.is_none() && !token.syls.is_empty() {
            token.lemma = Some(token.text_cleaned());
        }
    }
}

/// Order senses by decreasing frequency and copy the first one onto the token
pub fn choose_default_senses(tokens: &mut [Token]) {
    for token in tokens.iter_mut() {
        token
            .senses
            .sort_by(|a, b| b.freq.unwrap_or(0).cmp(&a.freq.unwrap_or(0)));

        if let Some(best) = token.senses.first() {
            if best.pos.is_some() {
                token.pos = best.pos.clone();
            }
            if best.lemma.is_some() && !token.has_merged_dagdra {
                token.lemma = best.lemma.clone();
            }
            token.freq = best.freq;
        }
    }
}

/// Apply the post-processing steps enabled in `config`, in order:
/// 1. Split affixed particles
/// 2. Merge dagdra particles
/// 3. Generate default lemmas
/// 4. Choose default senses
pub fn apply_all_modifiers(tokens: &mut Vec<Token>, config: &TokenizerConfig) {
    if config.split_affixes {
        split_affixed(tokens);
    }
    if config.merge_dagdra {
        merge_dagdra(tokens);
    }
    generate_default_lemmas(tokens);
    choose_default_senses(tokens);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, start: usize, syls: &[&str]) -> Token {
        let mut token = Token::with_text(text.to_string(), start, text.len(), ChunkTag::Text);
        let mut offset = 0;
        for syl in syls {
            let at = offset + text[offset..].find(syl).unwrap();
            token.syl_spans.push((at, syl.len()));
            token.syls.push(syl.to_string());
            offset = at + syl.len();
        }
        token
    }

    fn affixed_word(text: &str, syls: &[&str], suffix: &str, aa: bool) -> Token {
        let mut token = word(text, 0, syls);
        let record = AffixRecord {
            suffix: suffix.to_string(),
            len: suffix.chars().count(),
            affix_type: "gi".to_string(),
            aa,
        };
        token.senses = vec![Sense {
            pos: Some("NOUN".to_string()),
            affixed: true,
            affixation: Some(record.clone()),
            ..Default::default()
        }];
        token.affixation = Some(record);
        token
    }

    #[test]
    fn test_split_affixed() {
        let mut tokens = vec![affixed_word("ཀ་བའི་", &["ཀ", "བའི"], "འི", false)];
        split_affixed(&mut tokens);

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].text, "ཀ་བ");
        assert_eq!(tokens[0].syls, vec!["ཀ", "བ"]);
        assert!(tokens[0].is_affix_host);
        assert!(!tokens[0].senses[0].affixed);
        assert_eq!(tokens[0].lemma.as_deref(), Some("ཀ་བ་"));

        assert_eq!(tokens[1].text, "འི་");
        assert_eq!(tokens[1].start, tokens[0].len);
        assert!(tokens[1].is_affix);
        assert_eq!(tokens[1].pos.as_deref(), Some(PARTICLE_POS));
        assert_eq!(tokens[1].annotations["affix_type"], "gi");
    }

    #[test]
    fn test_split_restores_a_chung_in_lemma() {
        let mut tokens = vec![affixed_word("དགའི་", &["དགའི"], "འི", true)];
        split_affixed(&mut tokens);
        assert_eq!(tokens[0].text, "དག");
        assert_eq!(tokens[0].lemma.as_deref(), Some("དགའ་"));
        assert_eq!(tokens[1].syls, vec!["འི"]);
    }

    #[test]
    fn test_split_keeps_interior_space() {
        let mut tokens = vec![affixed_word("ཀ་བ འི་", &["ཀ", "བ འི"], "འི", false)];
        tokens[0].syls[1] = "བའི".to_string();
        split_affixed(&mut tokens);
        assert_eq!(tokens[0].text, "ཀ་བ ");
        assert_eq!(tokens[1].text, "འི་");
        assert_eq!(tokens[0].len + tokens[1].len, "ཀ་བ འི་".len());
    }

    #[test]
    fn test_no_split_when_a_sense_is_unaffixed() {
        let mut tokens = vec![affixed_word("ཀ་བའི་", &["ཀ", "བའི"], "འི", false)];
        tokens[0].senses.push(Sense::with_pos("NOUN"));
        split_affixed(&mut tokens);
        assert_eq!(tokens.len(), 1);
    }

    #[test]
    fn test_merge_dagdra() {
        let mut tokens = vec![word("བཀྲ་ཤིས་", 0, &["བཀྲ", "ཤིས"]), word("པ་", 24, &["པ"])];

        merge_dagdra(&mut tokens);

        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].has_merged_dagdra);
        assert_eq!(tokens[0].syls.len(), 3);
        assert_eq!(tokens[0].text, "བཀྲ་ཤིས་པ་");
        assert_eq!(tokens[0].syl_spans[2], (24, 3));
        assert_eq!(tokens[0].lemma.as_deref(), Some("བཀྲ་ཤིས་པ་"));
    }

    #[test]
    fn test_generate_default_lemmas() {
        let mut tokens = vec![word("བཀྲ་ཤིས་", 0, &["བཀྲ", "ཤིས"])];

        generate_default_lemmas(&mut tokens);

        assert_eq!(tokens[0].lemma.as_deref(), Some("བཀྲ་ཤིས་"));
    }

    #[test]
    fn test_choose_default_senses() {
        let mut token = word("ཀ་", 0, &["ཀ"]);
        token.senses = vec![
            Sense {
                pos: Some("VERB".to_string()),
                freq: Some(3),
                ..Default::default()
            },
            Sense {
                pos: Some("NOUN".to_string()),
                lemma: Some("ཀ་".to_string()),
                freq: Some(10),
                ..Default::default()
            },
        ];
        let mut tokens = vec![token];
        choose_default_senses(&mut tokens);
        assert_eq!(tokens[0].pos.as_deref(), Some("NOUN"));
        assert_eq!(tokens[0].freq, Some(10));
        assert_eq!(tokens[0].senses[1].pos.as_deref(), Some("VERB"));
    }
}
