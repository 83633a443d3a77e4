use thiserror::Error;

use crate::{Category, Observed, Series, Term, YearRange};

/// Lexical knowledge base: lemmas, inflections and part-of-speech membership.
///
/// Every lookup is total. A miss is an empty answer, never an error, so one
/// unknown word cannot fail a batch.
pub trait Lexicon: Send + Sync {
    /// Canonical dictionary form of `word`, if the lexicon knows one.
    fn base_form(&self, word: &str) -> Option<String>;

    /// Inflected spellings of `base`. May or may not include `base` itself.
    fn inflected_forms(&self, base: &str) -> Vec<String>;

    /// Categories the lexicon recognises for `word`, possibly none.
    fn categories_of(&self, word: &str) -> Vec<Category>;
}

/// Corpus frequency service.
pub trait FrequencySource: Send + Sync {
    /// Series for one query term. `Unavailable` when the corpus has no data.
    fn series(&self, term: &Term, range: YearRange) -> Result<Observed<Series>, FrequencyError>;

    /// Every category-tagged variant the service reports for `spelling`.
    ///
    /// Terms are returned as the service names them, so untagged or
    /// unrecognised entries may be present.
    fn tagged_series(
        &self,
        spelling: &str,
        range: YearRange,
    ) -> Result<Vec<(Term, Series)>, FrequencyError>;
}

#[derive(Debug, Error)]
pub enum FrequencyError {
    #[error("frequency service request for {term} failed: {reason}")]
    Transport { term: String, reason: String },
    #[error("frequency service returned status {status} for {term}")]
    Status { term: String, status: u16 },
    #[error("could not decode frequency response for {term}: {reason}")]
    Decode { term: String, reason: String },
}
