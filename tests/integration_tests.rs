//! Integration tests for botok
//!
//! These exercise the public API end to end: chunking, the dictionary trie,
//! longest-match tokenization and post-processing.

use std::sync::Arc;

use botok::{
    get_char_category, BoString, CharCategory, ChunkTag, Chunker, SimpleTokenizer, Token,
    Tokenizer, TokenizerConfig, Trie, TrieBuilder, NON_WORD, NO_POS,
};

fn trie_from(dictionary: &str) -> Trie {
    let mut builder = TrieBuilder::new();
    builder.load_dictionary(dictionary);
    builder.build()
}

fn texts(tokens: &[Token]) -> Vec<&str> {
    tokens.iter().map(|t| t.text.as_str()).collect()
}

fn readable(text: &str) -> Vec<(&'static str, String)> {
    let chunker = Chunker::new(text);
    let chunks = chunker.make_chunks();
    chunker
        .get_readable(&chunks)
        .into_iter()
        .map(|(tag, s)| (tag, s.to_string()))
        .collect()
}

// =============================================================================
// Character categories
// =============================================================================

#[test]
fn test_char_categories() {
    assert_eq!(get_char_category('ཀ'), CharCategory::Cons);
    assert_eq!(get_char_category('ྐ'), CharCategory::SubCons);
    assert_eq!(get_char_category('ི'), CharCategory::Vow);
    assert_eq!(get_char_category('་'), CharCategory::Tsek);
    assert_eq!(get_char_category('།'), CharCategory::NormalPunct);
    assert_eq!(get_char_category('༡'), CharCategory::Numeral);
    assert_eq!(get_char_category(' '), CharCategory::Transparent);
    assert_eq!(get_char_category('a'), CharCategory::Latin);
    assert_eq!(get_char_category('你'), CharCategory::Cjk);
}

#[test]
fn test_bo_string_categories() {
    let bs = BoString::new("ཀ་ཁ།");
    assert_eq!(bs.len(), 4);
    assert_eq!(
        bs.get_categories(0, 4),
        &[
            CharCategory::Cons,
            CharCategory::Tsek,
            CharCategory::Cons,
            CharCategory::NormalPunct
        ]
    );
}

#[test]
fn test_ignored_chars_are_transparent() {
    let bs = BoString::with_ignored("ཀ#ཁ", &['#']);
    assert_eq!(bs.get_category(1), Some(CharCategory::Transparent));
}

// =============================================================================
// Chunking
// =============================================================================

#[test]
fn test_chunks_mixed_content() {
    let chunks = readable("༆ བཀྲ་ཤིས་བདེ་ལེགས།། །། test 这是");

    let tags: Vec<&str> = chunks.iter().map(|(tag, _)| *tag).collect();
    assert!(tags.contains(&"PUNCT"));
    assert!(tags.contains(&"TEXT"));
    assert!(tags.contains(&"LATIN"));
    assert!(tags.contains(&"CJK"));

    let joined: String = chunks.iter().map(|(_, s)| s.as_str()).collect();
    assert_eq!(joined, "༆ བཀྲ་ཤིས་བདེ་ལེགས།། །། test 这是");
}

#[test]
fn test_chunks_syllable_extraction() {
    let chunks = Chunker::new("བཀྲ་ཤིས་བདེ་ལེགས").make_chunks();
    let syls: Vec<&str> = chunks.iter().filter_map(|c| c.syl.as_deref()).collect();
    assert_eq!(syls, vec!["བཀྲ", "ཤིས", "བདེ", "ལེགས"]);
}

#[test]
fn test_skippable_space_folds_into_previous_syllable() {
    assert_eq!(
        readable("བཀྲ་ ཤིས"),
        vec![("TEXT", "བཀྲ་ ".to_string()), ("TEXT", "ཤིས".to_string())]
    );
}

#[test]
fn test_no_shad_syllable() {
    let chunks = readable("ཀ འདི་ ཤི དེ་ག རེད་དོ།");
    assert_eq!(chunks.iter().filter(|(tag, _)| *tag == "TEXT").count(), 7);
    assert_eq!(chunks.last().unwrap().0, "PUNCT");
}

#[test]
fn test_shad_in_syllable() {
    assert_eq!(
        readable(" tr བདེ་་ལེ གས། བཀྲ་"),
        vec![
            ("LATIN", " tr ".to_string()),
            ("TEXT", "བདེ་་".to_string()),
            ("TEXT", "ལེ གས".to_string()),
            ("PUNCT", "། ".to_string()),
            ("TEXT", "བཀྲ་".to_string()),
        ]
    );
}

#[test]
fn test_many_tseks_and_spaces() {
    let input = " ཤི་བཀྲ་ཤིས་  བདེ་་ལ             ེ       གས་ བཀྲ་ཤིས་བདེ་ལེགས";
    let chunker = Chunker::new(input);
    let chunks = chunker.make_chunks();

    let syls: Vec<&str> = chunks.iter().filter_map(|c| c.syl.as_deref()).collect();
    assert_eq!(&syls[..4], &["ཤི", "བཀྲ", "ཤིས", "བདེ"]);
    assert_eq!(&syls[syls.len() - 4..], &["བཀྲ", "ཤིས", "བདེ", "ལེགས"]);
    let end = chunks.last().map(|c| c.start + c.len).unwrap();
    assert_eq!(end, input.len());
}

// =============================================================================
// Trie
// =============================================================================

#[test]
fn test_trie_add_and_lookup() {
    let mut trie = Trie::new();
    trie.insert("གྲུབ་མཐའ་", None).unwrap();

    assert!(trie.contains("གྲུབ་མཐའ་"));
    assert!(!trie.contains("གྲུབ་")); // Partial word should not match
    assert!(!trie.contains("གྲུབ་མཐའི་")); // Different form should not match
}

#[test]
fn test_trie_deactivate() {
    let mut trie = Trie::new();
    trie.insert("ཀ་ར་", None).unwrap();
    assert!(trie.contains("ཀ་ར་"));

    assert!(trie.deactivate("ཀ་ར་").unwrap());
    assert!(!trie.contains("ཀ་ར་"));
    assert!(!trie.deactivate("ཀ་ར་").unwrap());
    assert!(trie.is_empty());
}

#[test]
fn test_trie_builder_tsv() {
    let trie = trie_from(
        "# Comment line
བཀྲ་ཤིས\tNOUN\t\t1000
བདེ་ལེགས\tNOUN\t\t500
གྲུབ་མཐའ\tNOUN\t\t532",
    );

    assert_eq!(trie.len(), 3);
    assert!(trie.contains("བཀྲ་ཤིས་"));
    assert!(trie.contains("བདེ་ལེགས་"));
    assert!(trie.contains("གྲུབ་མཐའ་"));
}

#[test]
fn test_trie_with_data() {
    let trie = trie_from("ལྟར\tVERB\tལྟ\t123\tas");

    let senses = trie.lookup("ལྟར་").unwrap().unwrap();
    assert_eq!(senses.len(), 1);
    assert_eq!(senses[0].pos.as_deref(), Some("VERB"));
    assert_eq!(senses[0].lemma.as_deref(), Some("ལྟ"));
    assert_eq!(senses[0].freq, Some(123));
    assert_eq!(senses[0].meaning.as_deref(), Some("as"));
}

#[test]
fn test_trie_builder_with_inflection() {
    let mut builder = TrieBuilder::with_inflection();
    builder.load_dictionary("ཀ་བ\tNOUN");
    let trie = builder.build();

    assert!(trie.len() > 1, "Inflection should generate multiple entries");
    assert!(trie.contains("ཀ་བ་"));
    assert!(trie.contains("ཀ་བར་"), "Should have la affix form");
    assert!(trie.contains("ཀ་བའི་"), "Should have gi affix form");
}

#[test]
fn test_trie_builder_without_inflection() {
    let trie = trie_from("ཀ་བ\tNOUN");
    assert_eq!(trie.len(), 1, "Without inflection should have only base form");
}

// =============================================================================
// Tokenizer
// =============================================================================

/// Trie holding a word and a longer, unrelated compound sharing its prefix
fn backtrack_trie() -> Trie {
    trie_from("བཀྲ་ཤིས\tNOUN\nབཀྲ་ཤིས་བདེ་ལེགས།")
}

#[test]
fn test_backtracking_match() {
    let tokenizer = Tokenizer::new(backtrack_trie());
    let tokens = tokenizer.tokenize("བཀྲ་ཤིས་བདེ་བཀྲ་");

    assert_eq!(texts(&tokens), vec!["བཀྲ་ཤིས་", "བདེ་", "བཀྲ་"]);
    assert_eq!(tokens[0].pos.as_deref(), Some("NOUN"));
    assert_eq!(tokens[1].pos.as_deref(), Some(NON_WORD));
    assert_eq!(tokens[2].pos.as_deref(), Some(NO_POS));
    assert!(tokens[1].is_oov());
    assert!(tokens[2].is_oov());
}

#[test]
fn test_end_of_string_non_maximal_match() {
    let tokenizer = Tokenizer::new(backtrack_trie());
    let tokens = tokenizer.tokenize("བཀྲ་ཤིས་བདེ་");

    assert_eq!(texts(&tokens), vec!["བཀྲ་ཤིས་", "བདེ་"]);
    assert_eq!(tokens[0].pos.as_deref(), Some("NOUN"));
}

#[test]
fn test_longest_match_preference() {
    let tokenizer = Tokenizer::new(trie_from(
        "བཀྲ\tNOUN\t\t100
བཀྲ་ཤིས\tNOUN\t\t200
བཀྲ་ཤིས་བདེ\tNOUN\t\t300
བཀྲ་ཤིས་བདེ་ལེགས\tNOUN\t\t400",
    ));
    let tokens = tokenizer.tokenize("བཀྲ་ཤིས་བདེ་ལེགས།");

    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0].syls.len(), 4);
    assert_eq!(tokens[0].freq, Some(400));
}

#[test]
fn test_tokenizer_unknown_words() {
    let tokenizer = Tokenizer::new(trie_from("བཀྲ་ཤིས\tNOUN\t\t1000"));
    let tokens = tokenizer.tokenize("བཀྲ་ཤིས་ཀཀ་");

    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0].pos.as_deref(), Some("NOUN"));
    assert_eq!(tokens[1].pos.as_deref(), Some(NON_WORD));
}

#[test]
fn test_repeated_words() {
    let tokenizer = Tokenizer::new(trie_from(
        "ལ་པོ\tNOUN\t\t100
ལ་མོ\tNOUN\t\t100
གྲོགས་པོ\tNOUN\t\t100
བདག་པོ\tNOUN\t\t100
དང\tPART\t\t100",
    ));

    for word in ["ལ་པོ་", "ལ་མོ་", "གྲོགས་པོ་", "བདག་པོ་"] {
        let tokens = tokenizer.tokenize(&word.repeat(3));
        assert_eq!(texts(&tokens), vec![word; 3], "repeated {}", word);
    }
}

#[test]
fn test_non_syllable_tokens_carry_their_tag() {
    let tokenizer = Tokenizer::new(trie_from("བཀྲ་ཤིས\tNOUN"));
    let tokens = tokenizer.tokenize("བཀྲ་ཤིས། abc ༡༢");

    assert_eq!(texts(&tokens), vec!["བཀྲ་ཤིས", "། ", "abc ", "༡༢"]);
    assert_eq!(tokens[1].pos.as_deref(), Some("PUNCT"));
    assert_eq!(tokens[2].pos.as_deref(), Some("LATIN"));
    assert_eq!(tokens[3].pos.as_deref(), Some("NUM"));
}

#[test]
fn test_affixed_particle_is_split() {
    let mut builder = TrieBuilder::with_inflection();
    builder.load_dictionary("ཀ་བ\tNOUN");
    let tokenizer = Tokenizer::new(builder.build());

    let tokens = tokenizer.tokenize("ཀ་བའི་");
    assert_eq!(texts(&tokens), vec!["ཀ་བ", "འི་"]);
    assert_eq!(tokens[0].pos.as_deref(), Some("NOUN"));
    assert_eq!(tokens[0].lemma.as_deref(), Some("ཀ་བ་"));
    assert!(tokens[0].is_affix_host);
    assert!(tokens[1].is_affix);
    assert_eq!(tokens[1].pos.as_deref(), Some("PART"));
    assert_eq!(
        tokens[1].annotations.get("affix_type").map(String::as_str),
        Some("gi")
    );

    let config = TokenizerConfig::default().with_split_affixes(false);
    let unsplit = Tokenizer::with_config(tokenizer.trie_arc(), config).unwrap();
    assert_eq!(texts(&unsplit.tokenize("ཀ་བའི་")), vec!["ཀ་བའི་"]);
}

#[test]
fn test_dagdra_is_merged() {
    let tokenizer = Tokenizer::new(trie_from("རྒྱལ\tNOUN"));

    let tokens = tokenizer.tokenize("རྒྱལ་པོ་");
    assert_eq!(texts(&tokens), vec!["རྒྱལ་པོ་"]);
    assert!(tokens[0].has_merged_dagdra);
    assert_eq!(tokens[0].pos.as_deref(), Some("NOUN"));
    assert_eq!(tokens[0].lemma.as_deref(), Some("རྒྱལ་པོ་"));

    let raw = tokenizer.tokenize_raw("རྒྱལ་པོ་");
    assert_eq!(texts(&raw), vec!["རྒྱལ་", "པོ་"]);
}

#[test]
fn test_spaces_as_punct() {
    let config = TokenizerConfig::default().with_spaces_as_punct(true);
    let tokenizer = Tokenizer::with_config(
        Arc::new(trie_from("བཀྲ་ཤིས\tNOUN\nབདེ་ལེགས\tNOUN")),
        config,
    )
    .unwrap();

    let tokens = tokenizer.tokenize("བཀྲ་ཤིས་ བདེ་ལེགས།");
    assert_eq!(texts(&tokens), vec!["བཀྲ་ཤིས་", " ", "བདེ་ལེགས", "།"]);
    assert!(tokens[1].is_punct());
}

#[test]
fn test_tokenizer_config_from_json() {
    let config = TokenizerConfig::from_json(r#"{"merge_dagdra": false}"#).unwrap();
    let tokenizer = Tokenizer::with_config(Arc::new(trie_from("རྒྱལ\tNOUN")), config).unwrap();
    assert_eq!(texts(&tokenizer.tokenize("རྒྱལ་པོ་")), vec!["རྒྱལ་", "པོ་"]);
}

// =============================================================================
// Simple tokenizer and positions
// =============================================================================

#[test]
fn test_simple_tokenization() {
    let tokens = SimpleTokenizer::tokenize("བཀྲ་ཤིས་བདེ་ལེགས།");

    assert_eq!(tokens.len(), 5);
    assert_eq!(tokens[0].syls, vec!["བཀྲ"]);
    assert_eq!(tokens[1].syls, vec!["ཤིས"]);
    assert_eq!(tokens[2].syls, vec!["བདེ"]);
    assert_eq!(tokens[3].syls, vec!["ལེགས"]);
    assert_eq!(tokens[4].chunk_type, ChunkTag::Punct);
}

#[test]
fn test_unusual_syllables_do_not_panic() {
    assert!(!SimpleTokenizer::tokenize("བ་ཀུ་").is_empty());
    assert!(!SimpleTokenizer::tokenize("བྲ་གྲྀ་").is_empty());
}

#[test]
fn test_token_positions() {
    let text = "༄༅། །བཀྲ་ཤིས་ བདེ་ལེགས། abc 你好";
    let tokenizer = Tokenizer::new(trie_from("བཀྲ་ཤིས\tNOUN"));

    let mut expected_start = 0;
    for token in tokenizer.tokenize(text) {
        assert_eq!(token.start, expected_start);
        assert_eq!(&text[token.span()], token.text);
        for &(start, len) in &token.syl_spans {
            assert!(start + len <= token.len);
        }
        expected_start += token.len;
    }
    assert_eq!(expected_start, text.len());
}

#[test]
fn test_token_byte_positions() {
    let text = "བཀྲ་";
    let tokens = SimpleTokenizer::tokenize(text);

    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].start, 0);
    assert_eq!(tokens[0].len, text.len());
}

// =============================================================================
// Edge cases
// =============================================================================

#[test]
fn test_empty_string() {
    assert!(SimpleTokenizer::tokenize("").is_empty());
    assert!(Tokenizer::new(Trie::new()).tokenize("").is_empty());
}

#[test]
fn test_only_punctuation() {
    let tokens = SimpleTokenizer::tokenize("།།།");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].chunk_type, ChunkTag::Punct);
}

#[test]
fn test_only_spaces() {
    let tokens = SimpleTokenizer::tokenize("   ");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].chunk_type, ChunkTag::Space);
}

#[test]
fn test_mixed_scripts() {
    let tokens = SimpleTokenizer::tokenize("བཀྲ་ཤིས། Hello 你好");

    assert!(tokens.iter().any(|t| t.chunk_type == ChunkTag::Text));
    assert!(tokens.iter().any(|t| t.chunk_type == ChunkTag::Latin));
    assert!(tokens.iter().any(|t| t.chunk_type == ChunkTag::Cjk));
}

#[test]
fn test_tibetan_numbers() {
    let tokens = SimpleTokenizer::tokenize("༡༢༣༤༥");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].chunk_type, ChunkTag::Num);
}
