//! Per-spelling frequency retrieval under the two categorisation strategies.
//!
//! Both strategies end in the same shape, [`Contributions`] per base: for
//! each category, the series each spelling contributed. Service errors and
//! missing data never abort a batch; they are counted in the
//! [`RetrievalReport`] and the spelling simply does not contribute.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use lexfreq_types::{
    Category, FrequencyError, FrequencySource, Lexicon, Observed, Series, Term, YearRange,
};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::assoc::{Nested, deep_flatten_with, group_by_reduce, merge_with_fill};
use crate::expand::Families;
use crate::overrides::OverrideTable;

pub const DEFAULT_PARALLELISM: usize = 4;

/// How a spelling's series is assigned to grammatical categories.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Trust the tags the frequency service reports for each spelling.
    #[default]
    Observed,
    /// Ask the lexicon which categories a spelling has, then query each
    /// `spelling_TAG` directly.
    Canonical,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Observed => "observed",
            Strategy::Canonical => "canonical",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Eq, PartialEq)]
#[error("unknown strategy {0:?} (expected \"observed\" or \"canonical\")")]
pub struct UnknownStrategy(pub String);

impl FromStr for Strategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "observed" => Ok(Strategy::Observed),
            "canonical" => Ok(Strategy::Canonical),
            _ => Err(UnknownStrategy(s.to_string())),
        }
    }
}

/// Category -> spelling -> series, for one base form.
pub type Contributions = BTreeMap<Category, BTreeMap<String, Series>>;

/// Counters for one retrieval pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RetrievalReport {
    /// Distinct service lookups issued.
    pub requested: usize,
    /// Lookups that succeeded with no data.
    pub absent: usize,
    /// Lookups that failed and were treated as no data.
    pub failed: usize,
    pub failed_terms: Vec<String>,
}

impl RetrievalReport {
    fn record_failure(&mut self, term: &str, err: &FrequencyError) {
        warn!(term, error = %err, "frequency lookup failed, treating as no data");
        self.failed += 1;
        self.failed_terms.push(term.to_string());
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Retrieval {
    /// Only bases with at least one retained series appear.
    pub contributions: BTreeMap<String, Contributions>,
    pub report: RetrievalReport,
}

/// Runs independent lookups, on a dedicated pool when parallelism > 1.
///
/// Output order always matches input order.
#[derive(Debug, Default)]
pub struct FanOut {
    pool: Option<ThreadPool>,
}

impl FanOut {
    pub fn new(parallelism: usize) -> Self {
        if parallelism <= 1 {
            return Self::sequential();
        }
        match ThreadPoolBuilder::new()
            .num_threads(parallelism)
            .thread_name(|i| format!("lexfreq-fetch-{i}"))
            .build()
        {
            Ok(pool) => Self { pool: Some(pool) },
            Err(err) => {
                warn!(error = %err, "could not build fetch pool, fetching sequentially");
                Self::sequential()
            }
        }
    }

    pub fn sequential() -> Self {
        Self { pool: None }
    }

    pub fn parallelism(&self) -> usize {
        self.pool.as_ref().map_or(1, ThreadPool::current_num_threads)
    }

    pub fn map<T, R, F>(&self, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        match &self.pool {
            Some(pool) => pool.install(|| items.par_iter().map(&f).collect()),
            None => items.iter().map(f).collect(),
        }
    }
}

/// Strategy A: one tagged-variants lookup per spelling.
pub fn retrieve_observed(
    families: &Families,
    frequency: &dyn FrequencySource,
    range: YearRange,
    fan_out: &FanOut,
) -> Retrieval {
    let jobs: Vec<(&str, &str)> = families
        .iter()
        .flat_map(|(base, forms)| forms.iter().map(move |form| (base.as_str(), form.as_str())))
        .collect();
    let results = fan_out.map(&jobs, |&(_, spelling)| frequency.tagged_series(spelling, range));

    let mut report = RetrievalReport {
        requested: jobs.len(),
        ..RetrievalReport::default()
    };
    // base -> spelling -> reported term -> series
    let mut tree: BTreeMap<String, BTreeMap<String, Nested<String, Series>>> = BTreeMap::new();
    for (&(base, spelling), result) in jobs.iter().zip(results) {
        let variants = match result {
            Ok(variants) => variants,
            Err(err) => {
                report.record_failure(spelling, &err);
                continue;
            }
        };
        if variants.is_empty() {
            debug!(spelling, "no tagged variants reported");
            report.absent += 1;
            continue;
        }
        let leaves = variants
            .into_iter()
            .map(|(term, series)| (term.to_string(), Nested::Leaf(series)))
            .collect();
        tree.entry(base.to_string())
            .or_default()
            .insert(spelling.to_string(), Nested::Branch(leaves));
    }

    let nested = Nested::Branch(
        tree.into_iter()
            .map(|(base, spellings)| (base, Nested::Branch(spellings)))
            .collect(),
    );
    let flat = deep_flatten_with(nested, |path| {
        let mut parts = path.into_iter();
        let base = parts.next().unwrap_or_default();
        let spelling = parts.next().unwrap_or_default();
        let term = Term::parse(&parts.next().unwrap_or_default());
        (base, spelling, term)
    })
    .into_map();

    let retained = flat
        .into_iter()
        .filter_map(|((base, spelling, term), series)| match term.category() {
            Some(Observed::Present(category)) => {
                let series = series.restrict(range);
                (!series.is_empty()).then_some(((base, category, spelling), series))
            }
            Some(Observed::Unavailable) => {
                trace!(term = %term, "unrecognised tag, skipping");
                None
            }
            None => None,
        })
        .collect();

    Retrieval {
        contributions: into_contributions(retained),
        report,
    }
}

/// Strategy B: one `spelling_TAG` lookup per category the lexicon knows.
///
/// Spellings owned by an override family take the family's category instead
/// of asking the lexicon. A term shared by several bases is fetched once.
pub fn retrieve_canonical(
    families: &Families,
    lexicon: &dyn Lexicon,
    overrides: &OverrideTable,
    frequency: &dyn FrequencySource,
    range: YearRange,
    fan_out: &FanOut,
) -> Retrieval {
    let mut wanted: BTreeMap<(String, Category, String), ()> = BTreeMap::new();
    for (base, forms) in families {
        for spelling in forms {
            let mut categories = overrides.categories_of(spelling);
            if categories.is_empty() {
                categories = lexicon.categories_of(spelling);
            }
            if categories.is_empty() {
                debug!(spelling = %spelling, "no known category, excluded");
            }
            for category in categories {
                wanted.insert((base.clone(), category, spelling.clone()), ());
            }
        }
    }

    let terms: Vec<Term> = wanted
        .keys()
        .map(|(_, category, spelling)| Term::tagged(spelling.as_str(), *category))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let results = fan_out.map(&terms, |term| frequency.series(term, range));

    let mut report = RetrievalReport {
        requested: terms.len(),
        ..RetrievalReport::default()
    };
    let mut found = BTreeMap::new();
    for (term, result) in terms.into_iter().zip(results) {
        match result {
            Ok(Observed::Present(series)) => {
                let series = series.restrict(range);
                if series.is_empty() {
                    report.absent += 1;
                } else {
                    found.insert(term, series);
                }
            }
            Ok(Observed::Unavailable) => {
                debug!(term = %term, "no data");
                report.absent += 1;
            }
            Err(err) => report.record_failure(&term.to_string(), &err),
        }
    }

    let merged = merge_with_fill(wanted, &found, |(_, category, spelling)| {
        Term::tagged(spelling.as_str(), *category)
    });
    let retained = merged
        .into_iter()
        .filter_map(|(key, ((), series))| series.present().map(|series| (key, series)))
        .collect();

    Retrieval {
        contributions: into_contributions(retained),
        report,
    }
}

fn into_contributions(
    retained: BTreeMap<(String, Category, String), Series>,
) -> BTreeMap<String, Contributions> {
    group_by_reduce(
        retained,
        |(base, _, _), _| base.clone(),
        |members| {
            group_by_reduce(
                members,
                |(_, category, _), _| *category,
                |series| {
                    series
                        .into_iter()
                        .map(|((_, _, spelling), series)| (spelling, series))
                        .collect()
                },
            )
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{StaticFrequency, StaticLexicon};

    fn range() -> YearRange {
        YearRange::new(2000, 2002).unwrap()
    }

    fn families(entries: &[(&str, &[&str])]) -> Families {
        entries
            .iter()
            .map(|(base, forms)| {
                (
                    base.to_string(),
                    forms.iter().map(|f| f.to_string()).collect(),
                )
            })
            .collect()
    }

    fn values(series: &Series) -> Vec<f64> {
        series.values().collect()
    }

    #[test]
    fn strategy_parses_case_insensitively() {
        assert_eq!("Canonical".parse::<Strategy>(), Ok(Strategy::Canonical));
        assert_eq!(" observed ".parse::<Strategy>(), Ok(Strategy::Observed));
        assert!("both".parse::<Strategy>().is_err());
        assert_eq!(Strategy::default().to_string(), "observed");
    }

    #[test]
    fn fan_out_preserves_order() {
        let items: Vec<u32> = (0..64).collect();
        let doubled = FanOut::new(4).map(&items, |n| n * 2);
        assert_eq!(doubled, (0..64).map(|n| n * 2).collect::<Vec<_>>());
        assert_eq!(FanOut::new(0).parallelism(), 1);
    }

    #[test]
    fn observed_keeps_only_known_tags() {
        let frequency = StaticFrequency::new()
            .with("run_VERB", 2000, [10.0, 12.0, 14.0])
            .with("run_NOUN", 2000, [5.0, 5.0, 5.0])
            .with("run", 2000, [15.0, 17.0, 19.0])
            .with("run_FOO", 2000, [1.0, 1.0, 1.0])
            .with("runs_VERB", 2000, [3.0, 4.0, 5.0]);
        let retrieval = retrieve_observed(
            &families(&[("run", &["run", "runs", "ran"])]),
            &frequency,
            range(),
            &FanOut::sequential(),
        );

        let run = &retrieval.contributions["run"];
        assert_eq!(run.len(), 2);
        let verbs: Vec<&str> = run[&Category::Verb].keys().map(String::as_str).collect();
        assert_eq!(verbs, ["run", "runs"]);
        assert_eq!(values(&run[&Category::Noun]["run"]), [5.0, 5.0, 5.0]);
        assert_eq!(retrieval.report.requested, 3);
        assert_eq!(retrieval.report.absent, 1);
    }

    #[test]
    fn observed_degrades_failures_to_missing() {
        let frequency = StaticFrequency::new()
            .with("run_VERB", 2000, [1.0, 1.0, 1.0])
            .failing("runs");
        let retrieval = retrieve_observed(
            &families(&[("run", &["run", "runs"])]),
            &frequency,
            range(),
            &FanOut::new(2),
        );
        assert_eq!(retrieval.report.failed, 1);
        assert_eq!(retrieval.report.failed_terms, ["runs"]);
        assert_eq!(retrieval.contributions["run"][&Category::Verb].len(), 1);
    }

    #[test]
    fn canonical_queries_lexicon_categories() {
        let lexicon = StaticLexicon::new()
            .categories("run", &[Category::Verb, Category::Noun])
            .categories("ran", &[Category::Verb]);
        let frequency = StaticFrequency::new()
            .with("run_VERB", 2000, [10.0, 12.0, 14.0])
            .with("ran_VERB", 2000, [2.0, 2.0, 2.0])
            .with("ran_NOUN", 2000, [9.0, 9.0, 9.0]);
        let retrieval = retrieve_canonical(
            &families(&[("run", &["run", "ran", "xyzzy"])]),
            &lexicon,
            &OverrideTable::pronouns(),
            &frequency,
            range(),
            &FanOut::sequential(),
        );

        let run = &retrieval.contributions["run"];
        assert_eq!(run.keys().copied().collect::<Vec<_>>(), [Category::Verb]);
        assert_eq!(run[&Category::Verb].len(), 2);
        assert_eq!(retrieval.report.requested, 3);
        assert_eq!(retrieval.report.absent, 1);
    }

    #[test]
    fn canonical_uses_override_category_for_pronouns() {
        // A lexicon that knows "us" only as a noun.
        let lexicon = StaticLexicon::new().categories("us", &[Category::Noun]);
        let frequency = StaticFrequency::new()
            .with("we_PRON", 2000, [4.0, 4.0, 4.0])
            .with("us_PRON", 2000, [2.0, 2.0, 2.0])
            .with("us_NOUN", 2000, [7.0, 7.0, 7.0]);
        let retrieval = retrieve_canonical(
            &families(&[("we", &["we", "us", "ourselves"])]),
            &lexicon,
            &OverrideTable::pronouns(),
            &frequency,
            range(),
            &FanOut::sequential(),
        );

        let we = &retrieval.contributions["we"];
        assert_eq!(we.keys().copied().collect::<Vec<_>>(), [Category::Pronoun]);
        assert_eq!(we[&Category::Pronoun].len(), 2);
    }

    #[test]
    fn canonical_shares_terms_between_bases() {
        let lexicon = StaticLexicon::new()
            .categories("saw", &[Category::Verb])
            .categories("see", &[Category::Verb]);
        let frequency = StaticFrequency::new()
            .with("saw_VERB", 2000, [3.0, 3.0, 3.0])
            .with("see_VERB", 2000, [8.0, 8.0, 8.0]);
        let retrieval = retrieve_canonical(
            &families(&[("see", &["see", "saw"]), ("saw", &["saw"])]),
            &lexicon,
            &OverrideTable::empty(),
            &frequency,
            range(),
            &FanOut::sequential(),
        );

        assert_eq!(frequency.calls(), 2);
        assert!(retrieval.contributions["see"][&Category::Verb].contains_key("saw"));
        assert!(retrieval.contributions["saw"][&Category::Verb].contains_key("saw"));
    }
}
