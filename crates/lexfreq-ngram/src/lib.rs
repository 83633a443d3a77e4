//! Google Books Ngram Viewer as a [`FrequencySource`].
//!
//! The viewer's JSON endpoint answers
//! `?content=run_VERB&year_start=2000&year_end=2002&corpus=en-2019&smoothing=0`
//! with an array of `{ngram, type, timeseries}` records, one value per year
//! starting at `year_start`. An empty array means the corpus has nothing for
//! the term. The `spelling_*` wildcard returns every tagged variant of a
//! spelling, which is what [`FrequencySource::tagged_series`] needs.
//!
//! The client is blocking; async callers should run it off the executor.

mod config;

use std::time::Duration;

use lexfreq_types::{FrequencyError, FrequencySource, Observed, Series, Term, YearRange};
use reqwest::blocking::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

pub use config::{DEFAULT_CORPUS, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS, NgramConfig};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid ngram client configuration: {0}")]
    Config(String),
    #[error("could not build http client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Record type the viewer uses for the wildcard's own aggregate row.
const COLLECTION_TYPE: &str = "NGRAM_COLLECTION";

#[derive(Debug, Deserialize)]
struct NgramRecord {
    ngram: String,
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    timeseries: Vec<f64>,
}

/// Decode a viewer response body into `(term, series)` pairs.
///
/// Point `i` of each timeseries is year `range.start() + i`; points past
/// `range.end()` are dropped. Wildcard aggregate rows are skipped.
pub fn parse_response(body: &str, range: YearRange) -> serde_json::Result<Vec<(Term, Series)>> {
    let records: Vec<NgramRecord> = serde_json::from_str(body)?;
    Ok(records
        .into_iter()
        .filter(|record| record.kind != COLLECTION_TYPE)
        .map(|record| {
            let series = Series::from_values(range.start(), record.timeseries).restrict(range);
            (Term::parse(&record.ngram), series)
        })
        .collect())
}

/// The series the viewer returned for exactly `term`.
///
/// Rows for any other ngram are ignored rather than credited to `term`.
fn select_series(term: &Term, records: Vec<(Term, Series)>) -> Option<Series> {
    let mut returned = Vec::new();
    for (candidate, series) in records {
        if &candidate == term {
            return Some(series).filter(|series| !series.is_empty());
        }
        returned.push(candidate.to_string());
    }
    if !returned.is_empty() {
        debug!(%term, ?returned, "no row for the requested ngram");
    }
    None
}

/// Blocking client for the Ngram Viewer JSON endpoint.
#[derive(Clone, Debug)]
pub struct NgramClient {
    http: Client,
    config: NgramConfig,
}

impl NgramClient {
    pub fn new(config: NgramConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("lexfreq/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, config })
    }

    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(NgramConfig::from_env()?)
    }

    pub fn config(&self) -> &NgramConfig {
        &self.config
    }

    fn fetch(
        &self,
        content: &str,
        range: YearRange,
    ) -> Result<Vec<(Term, Series)>, FrequencyError> {
        let response = self
            .http
            .get(&self.config.endpoint)
            .query(&self.config.query_params(content, range))
            .send()
            .map_err(|err| FrequencyError::Transport {
                term: content.to_string(),
                reason: err.to_string(),
            })?;

        let status = response.status();
        debug!(content, status = status.as_u16(), "ngram response");
        if !status.is_success() {
            return Err(FrequencyError::Status {
                term: content.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.text().map_err(|err| FrequencyError::Transport {
            term: content.to_string(),
            reason: err.to_string(),
        })?;
        parse_response(&body, range).map_err(|err| FrequencyError::Decode {
            term: content.to_string(),
            reason: err.to_string(),
        })
    }
}

impl FrequencySource for NgramClient {
    fn series(&self, term: &Term, range: YearRange) -> Result<Observed<Series>, FrequencyError> {
        let records = self.fetch(&term.to_string(), range)?;
        Ok(select_series(term, records).into())
    }

    fn tagged_series(
        &self,
        spelling: &str,
        range: YearRange,
    ) -> Result<Vec<(Term, Series)>, FrequencyError> {
        let records = self.fetch(&format!("{spelling}_*"), range)?;
        Ok(records
            .into_iter()
            .filter(|(_, series)| !series.is_empty())
            .collect())
    }
}
