//! Dialect pack discovery and loading.
//!
//! A dialect pack is a directory holding a `dictionary/` tree of `.tsv`
//! resources. Packs are looked up under a base directory, by default
//! `~/Documents/botok/dialect_packs/`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::info;

use crate::error::{BotokError, Result};
use crate::trie::{Trie, TrieBuilder};

/// Pack loaded when none is named
pub const DEFAULT_DIALECT_PACK: &str = "general";

/// `<documents>/botok/dialect_packs`, or `./botok/dialect_packs` on systems
/// without a documents directory
pub fn default_base_path() -> PathBuf {
    let documents = dirs::document_dir().unwrap_or_else(|| PathBuf::from("."));
    documents.join("botok").join("dialect_packs")
}

/// Directory of the pack called `name` under `base` (or the default base)
pub fn dialect_pack_path(name: &str, base: Option<&Path>) -> PathBuf {
    match base {
        Some(base) => base.join(name),
        None => default_base_path().join(name),
    }
}

/// Whether the pack called `name` is installed under `base`
pub fn dialect_pack_exists(name: &str, base: Option<&Path>) -> bool {
    is_dialect_pack(&dialect_pack_path(name, base))
}

/// Find a pack given either its directory or its name under `base`
pub fn resolve_dialect_pack(pack: &str, base: Option<&Path>) -> Result<PathBuf> {
    let as_dir = Path::new(pack);
    if is_dialect_pack(as_dir) {
        return Ok(as_dir.to_path_buf());
    }
    if dialect_pack_exists(pack, base) {
        return Ok(dialect_pack_path(pack, base));
    }
    Err(BotokError::DialectPackNotFound {
        path: dialect_pack_path(pack, base),
    })
}

fn is_dialect_pack(path: &Path) -> bool {
    path.is_dir() && path.join("dictionary").is_dir()
}

/// List all TSV files in a dialect pack's dictionary, in a stable order
pub fn list_dictionary_files(dialect_pack_path: &Path) -> io::Result<Vec<PathBuf>> {
    let dict_path = dialect_pack_path.join("dictionary");
    if !dict_path.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    collect_tsv_files(&dict_path, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_tsv_files(dir: &Path, files: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_tsv_files(&path, files)?;
        } else if path.extension().is_some_and(|ext| ext == "tsv") {
            files.push(path);
        }
    }
    Ok(())
}

/// Build a trie from every dictionary resource of the pack at `path`.
///
/// Removal lines apply to the whole pack, whichever file they sit in.
pub fn load_dialect_pack(path: &Path, inflect: bool) -> Result<Trie> {
    if !is_dialect_pack(path) {
        return Err(BotokError::DialectPackNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut builder = if inflect {
        TrieBuilder::with_inflection()
    } else {
        TrieBuilder::new()
    };

    let files = list_dictionary_files(path)?;
    let mut entries = 0;
    for file in &files {
        entries += builder.load_path(file)?;
    }

    let trie = builder.build();
    info!(
        "loaded dialect pack {}: {} files, {} entries, {} words",
        path.display(),
        files.len(),
        entries,
        trie.len()
    );
    Ok(trie)
}
