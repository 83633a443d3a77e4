use std::collections::HashSet;
use std::path::Path;

use anyhow::Result;
use lexfreq_morphy::{Morphy, WORDNET_CATEGORIES};
use lexfreq_types::{Category, Lexicon};
use tracing::info;

use crate::{LoadMode, WordNetIndex};

/// WordNet-backed [`Lexicon`].
///
/// Base forms come from the first morphy candidate, trying verb, noun,
/// adjective and adverb in that order, so "running" resolves to the verb
/// "run" rather than the gerund noun. Categories are every part of speech
/// for which morphy finds a lemma.
pub struct WordNetLexicon {
    index: WordNetIndex,
    morphy: Morphy,
}

impl WordNetLexicon {
    pub fn new(index: WordNetIndex, morphy: Morphy) -> Self {
        Self { index, morphy }
    }

    pub fn load(dict_dir: impl AsRef<Path>) -> Result<Self> {
        Self::load_with_mode(dict_dir, LoadMode::Mmap)
    }

    /// Load `index.*` (required) and `*.exc` (optional) from `dict_dir`.
    pub fn load_with_mode(dict_dir: impl AsRef<Path>, mode: LoadMode) -> Result<Self> {
        let dir = dict_dir.as_ref();
        let index = WordNetIndex::load_with_mode(dir, mode)?;
        let morphy = Morphy::load(dir)?;
        info!(
            "wordnet lexicon: {} index entries, {} exceptions from {}",
            index.entry_count(),
            morphy.exception_count(),
            dir.display()
        );
        Ok(Self::new(index, morphy))
    }

    pub fn index(&self) -> &WordNetIndex {
        &self.index
    }

    fn exists(&self) -> impl Fn(Category, &str) -> bool + '_ {
        |category, lemma| self.index.lemma_exists(category, lemma)
    }
}

impl Lexicon for WordNetLexicon {
    fn base_form(&self, word: &str) -> Option<String> {
        WORDNET_CATEGORIES.into_iter().find_map(|category| {
            self.morphy
                .lemmas_for(category, word, self.exists())
                .into_iter()
                .next()
                .map(|candidate| candidate.lemma.into_owned())
        })
    }

    fn inflected_forms(&self, base: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        WORDNET_CATEGORIES
            .into_iter()
            .flat_map(|category| self.morphy.inflections_for(category, base, self.exists()))
            .map(|inflected| inflected.form)
            .filter(|form| seen.insert(form.clone()))
            .collect()
    }

    fn categories_of(&self, word: &str) -> Vec<Category> {
        WORDNET_CATEGORIES
            .into_iter()
            .filter(|category| {
                !self
                    .morphy
                    .lemmas_for(*category, word, self.exists())
                    .is_empty()
            })
            .collect()
    }
}
