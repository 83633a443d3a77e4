use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use lexfreq_types::{
    Category, FrequencySource, LexemeKey, Lexicon, Series, YearRange, YearRangeError,
};
use serde::ser::{SerializeSeq, SerializeStruct};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;
use tracing::info;

use crate::aggregate::aggregate;
use crate::expand::{Expansion, ExpansionReport, Families, expand};
use crate::overrides::OverrideTable;
use crate::retrieve::{
    DEFAULT_PARALLELISM, FanOut, RetrievalReport, Strategy, retrieve_canonical, retrieve_observed,
};

/// Shape of each value in the result table.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Full year-indexed series.
    #[default]
    Series,
    /// One scalar: the series summed over the range.
    Total,
}

impl OutputMode {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputMode::Series => "series",
            OutputMode::Total => "total",
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Eq, PartialEq)]
#[error("unknown output mode {0:?} (expected \"series\" or \"total\")")]
pub struct UnknownMode(pub String);

impl FromStr for OutputMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "series" => Ok(OutputMode::Series),
            "total" => Ok(OutputMode::Total),
            _ => Err(UnknownMode(s.to_string())),
        }
    }
}

/// Request rejected before any service was called.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum QueryError {
    #[error("word list is empty")]
    EmptyWordList,
    #[error("year range start {start} is after end {end}")]
    InvalidYearRange { start: i32, end: i32 },
}

impl From<YearRangeError> for QueryError {
    fn from(err: YearRangeError) -> Self {
        QueryError::InvalidYearRange {
            start: err.start,
            end: err.end,
        }
    }
}

/// A validated batch request.
///
/// ```
/// use lexfreq_core::{LexemeQuery, OutputMode, QueryError, Strategy};
///
/// let query = LexemeQuery::new(["run", "he"], 2000, 2002)?
///     .mode(OutputMode::Total)
///     .strategy(Strategy::Canonical);
/// assert_eq!(query.words().len(), 2);
/// assert!(LexemeQuery::new(Vec::<String>::new(), 2000, 2002).is_err());
/// # Ok::<(), QueryError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct LexemeQuery {
    words: Vec<String>,
    range: YearRange,
    mode: OutputMode,
    strategy: Strategy,
}

impl LexemeQuery {
    /// Blank words are dropped; a list with nothing else is rejected.
    pub fn new<I, S>(words: I, start: i32, end: i32) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: Vec<String> = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_string())
            .filter(|w| !w.is_empty())
            .collect();
        if words.is_empty() {
            return Err(QueryError::EmptyWordList);
        }
        let range = YearRange::new(start, end)?;
        Ok(Self {
            words,
            range,
            mode: OutputMode::default(),
            strategy: Strategy::default(),
        })
    }

    pub fn mode(mut self, mode: OutputMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn range(&self) -> YearRange {
        self.range
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LexemeValue {
    Series(Series),
    Total(f64),
}

impl LexemeValue {
    pub fn as_series(&self) -> Option<&Series> {
        match self {
            LexemeValue::Series(series) => Some(series),
            LexemeValue::Total(_) => None,
        }
    }

    /// The scalar total, computed on the fly for series values.
    pub fn total(&self) -> f64 {
        match self {
            LexemeValue::Series(series) => series.total(),
            LexemeValue::Total(total) => *total,
        }
    }
}

/// Final `(base, category) -> value` mapping, addressable by either half.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LexemeTable {
    entries: BTreeMap<LexemeKey, LexemeValue>,
}

impl LexemeTable {
    pub fn from_series(series: BTreeMap<LexemeKey, Series>, mode: OutputMode) -> Self {
        let entries = series
            .into_iter()
            .map(|(key, series)| {
                let value = match mode {
                    OutputMode::Series => LexemeValue::Series(series),
                    OutputMode::Total => LexemeValue::Total(series.total()),
                };
                (key, value)
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, base: &str, category: Category) -> Option<&LexemeValue> {
        self.entries.get(&LexemeKey::new(base, category))
    }

    pub fn for_base<'a>(
        &'a self,
        base: &'a str,
    ) -> impl Iterator<Item = (Category, &'a LexemeValue)> + 'a {
        self.entries
            .iter()
            .filter(move |(key, _)| key.base == base)
            .map(|(key, value)| (key.category, value))
    }

    pub fn for_category(
        &self,
        category: Category,
    ) -> impl Iterator<Item = (&str, &LexemeValue)> + '_ {
        self.entries
            .iter()
            .filter(move |(key, _)| key.category == category)
            .map(|(key, value)| (key.base.as_str(), value))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LexemeKey, &LexemeValue)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Serialised as an array of rows, `{base, category, years, values}` for
/// series and `{base, category, total}` for totals.
impl Serialize for LexemeTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            seq.serialize_element(&Row { key, value })?;
        }
        seq.end()
    }
}

struct Row<'a> {
    key: &'a LexemeKey,
    value: &'a LexemeValue,
}

impl Serialize for Row<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut row = serializer.serialize_struct("Row", 4)?;
        row.serialize_field("base", &self.key.base)?;
        row.serialize_field("category", &self.key.category)?;
        match self.value {
            LexemeValue::Series(series) => {
                let years: Vec<i32> = series.years().collect();
                let values: Vec<f64> = series.values().collect();
                row.serialize_field("years", &years)?;
                row.serialize_field("values", &values)?;
            }
            LexemeValue::Total(total) => row.serialize_field("total", total)?,
        }
        row.end()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct QueryOutcome {
    pub table: LexemeTable,
    /// Base form -> spellings queried for it.
    pub families: Families,
    pub expansion: ExpansionReport,
    pub retrieval: RetrievalReport,
}

/// Runs queries against a lexicon and a frequency source.
pub struct Collapser {
    lexicon: Arc<dyn Lexicon>,
    frequency: Arc<dyn FrequencySource>,
    overrides: OverrideTable,
    fan_out: FanOut,
}

impl Collapser {
    /// Pronoun overrides and the default fetch parallelism.
    pub fn new(lexicon: Arc<dyn Lexicon>, frequency: Arc<dyn FrequencySource>) -> Self {
        Self {
            lexicon,
            frequency,
            overrides: OverrideTable::pronouns(),
            fan_out: FanOut::new(DEFAULT_PARALLELISM),
        }
    }

    pub fn with_overrides(mut self, overrides: OverrideTable) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.fan_out = FanOut::new(parallelism);
        self
    }

    /// Expansion alone, without touching the frequency source.
    pub fn expand<S: AsRef<str>>(&self, words: &[S]) -> Expansion {
        expand(words, self.lexicon.as_ref(), &self.overrides)
    }

    pub fn run(&self, query: &LexemeQuery) -> Result<QueryOutcome, QueryError> {
        let Expansion { families, report } = self.expand(query.words());
        info!(
            words = query.words().len(),
            bases = families.len(),
            strategy = %query.strategy,
            "collapsing query"
        );

        let retrieval = match query.strategy {
            Strategy::Observed => retrieve_observed(
                &families,
                self.frequency.as_ref(),
                query.range(),
                &self.fan_out,
            ),
            Strategy::Canonical => retrieve_canonical(
                &families,
                self.lexicon.as_ref(),
                &self.overrides,
                self.frequency.as_ref(),
                query.range(),
                &self.fan_out,
            ),
        };
        let table = LexemeTable::from_series(aggregate(retrieval.contributions), query.mode);
        info!(
            entries = table.len(),
            requested = retrieval.report.requested,
            absent = retrieval.report.absent,
            failed = retrieval.report.failed,
            "query complete"
        );

        Ok(QueryOutcome {
            table,
            families,
            expansion: report,
            retrieval: retrieval.report,
        })
    }

    /// Validate and run in one step.
    pub fn collapse<S: AsRef<str>>(
        &self,
        words: &[S],
        start: i32,
        end: i32,
        mode: OutputMode,
        strategy: Strategy,
    ) -> Result<QueryOutcome, QueryError> {
        let query = LexemeQuery::new(words, start, end)?
            .mode(mode)
            .strategy(strategy);
        self.run(&query)
    }
}

impl fmt::Debug for Collapser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collapser")
            .field("overrides", &self.overrides.entries().len())
            .field("parallelism", &self.fan_out.parallelism())
            .finish_non_exhaustive()
    }
}
