//! In-memory [`Lexicon`] and [`FrequencySource`] for tests and demos.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use lexfreq_types::{
    Category, FrequencyError, FrequencySource, Lexicon, Observed, Series, Term, YearRange,
};

/// Lexicon backed by explicit tables.
///
/// ```
/// use lexfreq_core::fixture::StaticLexicon;
/// use lexfreq_types::{Category, Lexicon};
///
/// let lexicon = StaticLexicon::new()
///     .family("run", &["runs", "ran"])
///     .categories("run", &[Category::Verb, Category::Noun]);
/// assert_eq!(lexicon.base_form("ran").as_deref(), Some("run"));
/// assert_eq!(lexicon.categories_of("run").len(), 2);
/// ```
#[derive(Clone, Debug, Default)]
pub struct StaticLexicon {
    bases: HashMap<String, String>,
    inflections: HashMap<String, Vec<String>>,
    categories: HashMap<String, Vec<Category>>,
}

impl StaticLexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `base` and its inflections; each resolves back to `base`.
    pub fn family(mut self, base: &str, forms: &[&str]) -> Self {
        self.bases.insert(base.to_string(), base.to_string());
        let known = self.inflections.entry(base.to_string()).or_default();
        for form in forms {
            self.bases.insert(form.to_string(), base.to_string());
            if !known.iter().any(|k| k == form) {
                known.push(form.to_string());
            }
        }
        self
    }

    pub fn categories(mut self, spelling: &str, categories: &[Category]) -> Self {
        self.categories
            .insert(spelling.to_string(), categories.to_vec());
        self
    }
}

impl Lexicon for StaticLexicon {
    fn base_form(&self, word: &str) -> Option<String> {
        self.bases.get(word).cloned()
    }

    fn inflected_forms(&self, base: &str) -> Vec<String> {
        self.inflections.get(base).cloned().unwrap_or_default()
    }

    fn categories_of(&self, word: &str) -> Vec<Category> {
        self.categories.get(word).cloned().unwrap_or_default()
    }
}

/// Frequency source backed by a term table, with injectable failures and a
/// call counter.
#[derive(Debug, Default)]
pub struct StaticFrequency {
    data: BTreeMap<Term, Series>,
    failing: BTreeSet<String>,
    calls: AtomicUsize,
}

impl StaticFrequency {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `term` (`run_VERB`, `run`) with yearly values from `first_year`.
    pub fn with(
        mut self,
        term: &str,
        first_year: i32,
        values: impl IntoIterator<Item = f64>,
    ) -> Self {
        self.data
            .insert(Term::parse(term), Series::from_values(first_year, values));
        self
    }

    /// Every lookup for `spelling` fails with a transport error.
    pub fn failing(mut self, spelling: &str) -> Self {
        self.failing.insert(spelling.to_string());
        self
    }

    /// Lookups served so far, failed ones included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    fn check(&self, spelling: &str, term: &str) -> Result<(), FrequencyError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if self.failing.contains(spelling) {
            return Err(FrequencyError::Transport {
                term: term.to_string(),
                reason: "connection refused".to_string(),
            });
        }
        Ok(())
    }
}

impl FrequencySource for StaticFrequency {
    fn series(&self, term: &Term, range: YearRange) -> Result<Observed<Series>, FrequencyError> {
        self.check(&term.spelling, &term.to_string())?;
        let series = self
            .data
            .get(term)
            .map(|series| series.clone().restrict(range))
            .filter(|series| !series.is_empty());
        Ok(series.into())
    }

    fn tagged_series(
        &self,
        spelling: &str,
        range: YearRange,
    ) -> Result<Vec<(Term, Series)>, FrequencyError> {
        self.check(spelling, &format!("{spelling}_*"))?;
        Ok(self
            .data
            .iter()
            .filter(|(term, _)| term.spelling == spelling)
            .map(|(term, series)| (term.clone(), series.clone().restrict(range)))
            .filter(|(_, series)| !series.is_empty())
            .collect())
    }
}
