//! WordNet as a lexical knowledge base.
//!
//! This crate reads the canonical `index.*` files to answer "is this a lemma,
//! and under which part of speech", and pairs them with the `*.exc` exception
//! lists through [`lexfreq_morphy::Morphy`]. [`WordNetLexicon`] wraps both as a
//! [`lexfreq_types::Lexicon`]. The `data.*` synset files are not needed for
//! lemma lookup and are never opened.
//!
//! Callers choose between memory-mapped files or owned buffers at load time
//! via [`LoadMode`]. Either way the parsed index owns its strings, so the
//! source buffers are released once loading finishes.
//!
//! # Example
//! ```no_run
//! use lexfreq_types::{Category, Lexicon};
//! use lexfreq_wordnet::{LoadMode, WordNetLexicon};
//!
//! # fn main() -> anyhow::Result<()> {
//! let lexicon = WordNetLexicon::load_with_mode("/path/to/wordnet", LoadMode::Mmap)?;
//! assert_eq!(lexicon.base_form("running").as_deref(), Some("run"));
//! assert!(lexicon.categories_of("run").contains(&Category::Noun));
//! println!("{:?}", lexicon.inflected_forms("run"));
//! # Ok(()) }
//! ```
//!
//! For a runnable demo, see `cargo run -p lexfreq-wordnet --example expand -- <dict> <word>...`.

mod lexicon;

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use lexfreq_morphy::normalize;
use lexfreq_types::Category;
use memmap2::Mmap;

pub use lexicon::WordNetLexicon;

/// Strategy for loading dictionary files.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoadMode {
    /// Memory-map each WordNet file.
    Mmap,
    /// Read each file into an owned buffer (portable fallback).
    Owned,
}

enum Buffer {
    Mmap(Mmap),
    Owned(Vec<u8>),
}

impl Buffer {
    fn as_slice(&self) -> &[u8] {
        match self {
            Buffer::Mmap(m) => m.as_ref(),
            Buffer::Owned(v) => v.as_slice(),
        }
    }
}

const INDEX_FILES: [(Category, &str); 4] = [
    (Category::Noun, "index.noun"),
    (Category::Verb, "index.verb"),
    (Category::Adjective, "index.adj"),
    (Category::Adverb, "index.adv"),
];

/// Sense statistics for one `index.*` line.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IndexEntry {
    pub lemma: String,
    pub category: Category,
    pub synset_cnt: u32,
    pub sense_cnt: u32,
    pub tagsense_cnt: u32,
}

/// Lemma index across the four WordNet parts of speech.
#[derive(Debug, Default)]
pub struct WordNetIndex {
    entries: HashMap<(Category, String), IndexEntry>,
}

impl WordNetIndex {
    /// Load `index.noun`, `index.verb`, `index.adj` and `index.adv` from a
    /// WordNet dict directory, memory-mapping them.
    pub fn load(dict_dir: impl AsRef<Path>) -> Result<Self> {
        Self::load_with_mode(dict_dir, LoadMode::Mmap)
    }

    pub fn load_with_mode(dict_dir: impl AsRef<Path>, mode: LoadMode) -> Result<Self> {
        let dir = dict_dir.as_ref();
        for (_, name) in &INDEX_FILES {
            let path = dir.join(name);
            if !path.exists() {
                anyhow::bail!("missing required WordNet file: {}", path.display());
            }
        }

        let mut entries = HashMap::new();
        for (category, name) in INDEX_FILES {
            let path = dir.join(name);
            let buffer = load_file(&path, mode)?;
            parse_index(buffer.as_slice(), name, category, &mut entries)?;
        }
        Ok(Self { entries })
    }

    /// Check whether a lemma exists for the given category.
    pub fn lemma_exists(&self, category: Category, lemma: &str) -> bool {
        self.entries.contains_key(&(category, normalize(lemma)))
    }

    pub fn index_entry(&self, category: Category, lemma: &str) -> Option<&IndexEntry> {
        self.entries.get(&(category, normalize(lemma)))
    }

    /// Number of `(category, lemma)` entries.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}

fn load_file(path: &Path, mode: LoadMode) -> Result<Buffer> {
    match mode {
        LoadMode::Mmap => {
            let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
            // SAFETY: the map is read-only and dropped before load returns.
            unsafe { Mmap::map(&file) }
                .map(Buffer::Mmap)
                .with_context(|| format!("mmap {}", path.display()))
        }
        LoadMode::Owned => {
            let mut file = File::open(path).with_context(|| format!("open {}", path.display()))?;
            let mut buf = Vec::new();
            file.read_to_end(&mut buf)
                .with_context(|| format!("read {}", path.display()))?;
            Ok(Buffer::Owned(buf))
        }
    }
}

/// Parse `lemma pos synset_cnt p_cnt [ptr_symbol...] sense_cnt tagsense_cnt synset_offset...`.
fn parse_index(
    bytes: &[u8],
    file: &str,
    category: Category,
    entries: &mut HashMap<(Category, String), IndexEntry>,
) -> Result<()> {
    for (lineno, raw_line) in bytes.split(|b| *b == b'\n').enumerate() {
        let line = strip_cr(raw_line);
        // License header lines start with whitespace.
        if line.is_empty() || matches!(line.first(), Some(b' ' | b'\t')) {
            continue;
        }
        let line_str = std::str::from_utf8(line)
            .with_context(|| format!("{}:{} not utf8", file, lineno + 1))?;
        let tokens: Vec<&str> = line_str.split_ascii_whitespace().collect();
        if tokens.len() < 6 {
            anyhow::bail!("{}:{} malformed index line (too few tokens)", file, lineno + 1);
        }

        let synset_cnt: u32 = tokens[2]
            .parse()
            .with_context(|| format!("{}:{} synset_cnt", file, lineno + 1))?;
        let p_cnt: usize = tokens[3]
            .parse()
            .with_context(|| format!("{}:{} p_cnt", file, lineno + 1))?;

        let idx = p_cnt
            .checked_add(4)
            .filter(|idx| tokens.len().saturating_sub(2) >= *idx)
            .with_context(|| {
                format!("{}:{} missing sense counts after p_cnt {}", file, lineno + 1, p_cnt)
            })?;
        let sense_cnt: u32 = tokens[idx]
            .parse()
            .with_context(|| format!("{}:{} sense_cnt", file, lineno + 1))?;
        let tagsense_cnt: u32 = tokens[idx + 1]
            .parse()
            .with_context(|| format!("{}:{} tagsense_cnt", file, lineno + 1))?;
        let offsets = tokens.len() - idx - 2;
        if offsets != synset_cnt as usize {
            anyhow::bail!(
                "{}:{} synset_cnt mismatch (expected {}, got {})",
                file,
                lineno + 1,
                synset_cnt,
                offsets
            );
        }

        let lemma = normalize(tokens[0]);
        entries.insert(
            (category, lemma.clone()),
            IndexEntry {
                lemma,
                category,
                synset_cnt,
                sense_cnt,
                tagsense_cnt,
            },
        );
    }

    Ok(())
}

fn strip_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}
