//! Command-line interface for botok
//!
//! Usage:
//!   botok [OPTIONS] [TEXT]
//!   echo "བཀྲ་ཤིས་བདེ་ལེགས།" | botok -d dictionary.tsv

use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use botok::{Chunker, SimpleTokenizer, Token, Tokenizer, TokenizerConfig, TrieBuilder};
use clap::Parser;

/// A fast Tibetan tokenizer
#[derive(Debug, Parser)]
#[command(name = "botok", version, about)]
struct Cli {
    /// Text to tokenize (default: stdin)
    text: Option<String>,

    /// Dictionary resource (form, POS, lemma, freq, gloss per line); repeatable
    #[arg(short, long, value_name = "FILE")]
    dict: Vec<PathBuf>,

    /// Dialect pack: a name under the dialect pack directory, or a path
    /// (bare `--pack` loads the general pack)
    #[arg(
        short,
        long,
        value_name = "NAME|DIR",
        num_args = 0..=1,
        default_missing_value = botok::dialect_pack::DEFAULT_DIALECT_PACK
    )]
    pack: Option<String>,

    /// Also match affixed forms of dictionary words
    #[arg(short, long)]
    inflect: bool,

    /// Use simple syllable tokenization (no dictionary)
    #[arg(short, long)]
    simple: bool,

    /// Output as JSON
    #[arg(short, long)]
    json: bool,

    /// Print the chunks instead of tokens
    #[arg(long)]
    chunks: bool,

    /// Tokenizer configuration file (JSON)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn init_logging(&self) {
        let log_level = match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
            .init();
    }

    fn input(&self) -> Result<String> {
        let text = match &self.text {
            Some(text) => text.clone(),
            None => {
                let mut buf = String::new();
                io::stdin()
                    .read_to_string(&mut buf)
                    .context("reading stdin")?;
                buf
            }
        };
        if text.is_empty() {
            bail!("no input text provided");
        }
        Ok(text)
    }

    fn tokenizer(&self) -> Result<Option<Tokenizer>> {
        if self.simple || (self.dict.is_empty() && self.pack.is_none()) {
            return Ok(None);
        }

        let config = match &self.config {
            Some(path) => TokenizerConfig::from_path(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => TokenizerConfig::default(),
        };

        let trie = match &self.pack {
            Some(pack) => {
                let path = botok::dialect_pack::resolve_dialect_pack(pack, None)?;
                botok::dialect_pack::load_dialect_pack(&path, self.inflect)
                    .with_context(|| format!("loading dialect pack {}", path.display()))?
            }
            None => botok::Trie::new(),
        };
        let mut builder = TrieBuilder::from_trie(trie, self.inflect);
        for path in &self.dict {
            builder
                .load_path(path)
                .with_context(|| format!("loading dictionary {}", path.display()))?;
        }

        Ok(Some(Tokenizer::with_config(Arc::new(builder.build()), config)?))
    }

    fn run(&self) -> Result<()> {
        let text = self.input()?;

        if self.chunks {
            let chunker = Chunker::new(&text);
            let chunks = chunker.make_chunks();
            for (tag, chunk) in chunker.get_readable(&chunks) {
                println!("{}\t{:?}", tag, chunk);
            }
            return Ok(());
        }

        let tokens = match self.tokenizer()? {
            Some(tokenizer) => tokenizer.tokenize(&text),
            None => SimpleTokenizer::tokenize(&text),
        };
        log::info!("{} tokens", tokens.len());

        if self.json {
            println!("{}", serde_json::to_string_pretty(&tokens)?);
        } else {
            for token in &tokens {
                print_token(token);
            }
        }
        Ok(())
    }
}

fn print_token(token: &Token) {
    let pos = token.pos.as_deref().unwrap_or(token.chunk_type.as_str());
    println!("{}\t{}\t{}", token.text, pos, token.syls.join("་"));
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.init_logging();
    cli.run()
}
