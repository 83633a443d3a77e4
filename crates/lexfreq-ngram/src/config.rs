use std::env;

use lexfreq_types::YearRange;

use crate::ClientError;

pub const DEFAULT_ENDPOINT: &str = "https://books.google.com/ngrams/json";
pub const DEFAULT_CORPUS: &str = "en-2019";
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NgramConfig {
    pub endpoint: String,
    /// Corpus name, e.g. `en-2019` or `en-GB-2019`.
    pub corpus: String,
    /// Moving-average window; 0 keeps raw yearly values.
    pub smoothing: u32,
    /// Per-request timeout. A lookup that times out counts as failed.
    pub timeout_secs: u64,
}

impl Default for NgramConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            corpus: DEFAULT_CORPUS.to_string(),
            smoothing: 0,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl NgramConfig {
    /// Defaults overridden by `NGRAM_ENDPOINT`, `NGRAM_CORPUS`,
    /// `NGRAM_SMOOTHING` and `NGRAM_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`NgramConfig::from_env`] with variables read through `var`.
    /// A number that does not parse is an error, not a silent default.
    pub fn from_lookup<F>(var: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            endpoint: var("NGRAM_ENDPOINT").unwrap_or(defaults.endpoint),
            corpus: var("NGRAM_CORPUS").unwrap_or(defaults.corpus),
            smoothing: parse_number(&var, "NGRAM_SMOOTHING")?.unwrap_or(defaults.smoothing),
            timeout_secs: parse_number(&var, "NGRAM_TIMEOUT_SECS")?
                .unwrap_or(defaults.timeout_secs),
        })
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(ClientError::Config(format!(
                "endpoint must be an http(s) url, got {:?}",
                self.endpoint
            )));
        }
        if self.corpus.trim().is_empty() {
            return Err(ClientError::Config("corpus cannot be empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(ClientError::Config("timeout must be > 0".to_string()));
        }
        Ok(())
    }

    pub(crate) fn query_params(
        &self,
        content: &str,
        range: YearRange,
    ) -> [(&'static str, String); 6] {
        [
            ("content", content.to_string()),
            ("year_start", range.start().to_string()),
            ("year_end", range.end().to_string()),
            ("corpus", self.corpus.clone()),
            ("smoothing", self.smoothing.to_string()),
            ("case_insensitive", "false".to_string()),
        ]
    }
}

fn parse_number<T, F>(var: &F, name: &str) -> Result<Option<T>, ClientError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    var(name)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|_| {
                ClientError::Config(format!(
                    "{name} must be a non-negative integer, got {raw:?}"
                ))
            })
        })
        .transpose()
}
