use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use lexfreq_core::DEFAULT_PARALLELISM;
use lexfreq_ngram::NgramConfig;
use lexfreq_wordnet::LoadMode;
use thiserror::Error;

use crate::handlers::DEFAULT_MAX_WORDS;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_WORDNET_PATH: &str = "open_english_wordnet_2024/oewn2024";
const DEFAULT_WORDNET_IMAGE_PATH: &str = "/app/wordnet";

#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
    #[error("{0} expects a value")]
    MissingValue(&'static str),
    #[error("unknown argument {0:?}")]
    UnknownArgument(String),
}

/// Runtime settings for the `lexfreq` binary.
///
/// Command-line flags win over environment variables, which win over the
/// built-in defaults.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub wordnet_path: PathBuf,
    pub wordnet_mode: LoadMode,
    pub ngram: NgramConfig,
    pub parallelism: usize,
    pub max_words: usize,
}

#[derive(Default)]
struct Flags {
    wordnet_dir: Option<PathBuf>,
    wordnet_mode: Option<String>,
    corpus: Option<String>,
}

impl Flags {
    fn parse<I>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut flags = Flags::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            let (name, inline) = match arg.split_once('=') {
                Some((name, value)) => (name.to_string(), Some(value.to_string())),
                None => (arg.clone(), None),
            };
            let slot = match name.as_str() {
                "--wordnet-dir" => "--wordnet-dir",
                "--wordnet-mode" => "--wordnet-mode",
                "--corpus" => "--corpus",
                _ => return Err(ConfigError::UnknownArgument(arg)),
            };
            let value = inline
                .or_else(|| args.next())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::MissingValue(slot))?;
            match slot {
                "--wordnet-dir" => flags.wordnet_dir = Some(PathBuf::from(value)),
                "--wordnet-mode" => flags.wordnet_mode = Some(value),
                _ => flags.corpus = Some(value),
            }
        }
        Ok(flags)
    }
}

impl ServerConfig {
    /// Read the process arguments and environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_sources(env::args().skip(1), |name| env::var(name).ok())
    }

    pub fn from_sources<I, F>(args: I, var: F) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
        F: Fn(&str) -> Option<String>,
    {
        let flags = Flags::parse(args)?;

        let host = var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_var(&var, "PORT", "a port number")?.unwrap_or(DEFAULT_PORT);
        let wordnet_path = flags
            .wordnet_dir
            .or_else(|| var("WORDNET_DIR").map(PathBuf::from))
            .unwrap_or_else(default_wordnet_path);
        let wordnet_mode = match flags.wordnet_mode.or_else(|| var("WORDNET_LOAD_MODE")) {
            Some(raw) => parse_load_mode(&raw)?,
            None => LoadMode::Mmap,
        };
        let defaults = NgramConfig::default();
        let ngram = NgramConfig {
            endpoint: var("NGRAM_ENDPOINT").unwrap_or(defaults.endpoint),
            corpus: flags
                .corpus
                .or_else(|| var("NGRAM_CORPUS"))
                .unwrap_or(defaults.corpus),
            smoothing: parse_var(&var, "NGRAM_SMOOTHING", "a non-negative integer")?
                .unwrap_or(defaults.smoothing),
            timeout_secs: parse_var(&var, "NGRAM_TIMEOUT_SECS", "a number of seconds")?
                .unwrap_or(defaults.timeout_secs),
        };
        let parallelism =
            positive_var(&var, "RETRIEVAL_PARALLELISM")?.unwrap_or(DEFAULT_PARALLELISM);
        let max_words = positive_var(&var, "MAX_WORDS")?.unwrap_or(DEFAULT_MAX_WORDS);

        Ok(ServerConfig {
            host,
            port,
            wordnet_path,
            wordnet_mode,
            ngram,
            parallelism,
            max_words,
        })
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse().map_err(|_| ConfigError::Invalid {
            name: "HOST",
            expected: "an ip address",
            value: self.host.clone(),
        })
    }
}

fn parse_var<T, F>(
    var: &F,
    name: &'static str,
    expected: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    var(name)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|_| ConfigError::Invalid {
                name,
                expected,
                value: raw,
            })
        })
        .transpose()
}

fn positive_var<F>(var: &F, name: &'static str) -> Result<Option<usize>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match parse_var::<usize, F>(var, name, "a positive integer")? {
        Some(0) => Err(ConfigError::Invalid {
            name,
            expected: "a positive integer",
            value: "0".to_string(),
        }),
        other => Ok(other),
    }
}

fn parse_load_mode(raw: &str) -> Result<LoadMode, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "mmap" => Ok(LoadMode::Mmap),
        "owned" => Ok(LoadMode::Owned),
        _ => Err(ConfigError::Invalid {
            name: "wordnet load mode",
            expected: "mmap or owned",
            value: raw.to_string(),
        }),
    }
}

fn default_wordnet_path() -> PathBuf {
    let local = Path::new(DEFAULT_WORDNET_PATH);
    if local.exists() {
        local.to_path_buf()
    } else {
        PathBuf::from(DEFAULT_WORDNET_IMAGE_PATH)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(args: &[&str], vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_sources(args.iter().map(|a| a.to_string()), |name| {
            vars.get(name).cloned()
        })
    }

    #[test]
    fn defaults_apply_without_input() {
        let config = load(&[], &[]).unwrap();
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.wordnet_mode, LoadMode::Mmap);
        assert_eq!(config.parallelism, DEFAULT_PARALLELISM);
        assert_eq!(config.max_words, DEFAULT_MAX_WORDS);
        assert_eq!(config.ngram, NgramConfig::default());
        assert_eq!(config.listen_addr().unwrap().port(), DEFAULT_PORT);
    }

    #[test]
    fn flags_win_over_environment() {
        let config = load(
            &[
                "--wordnet-dir",
                "/srv/wn",
                "--wordnet-mode=owned",
                "--corpus=en-GB-2019",
            ],
            &[
                ("WORDNET_DIR", "/opt/wn"),
                ("WORDNET_LOAD_MODE", "mmap"),
                ("NGRAM_CORPUS", "en-2019"),
                ("PORT", "9000"),
                ("MAX_WORDS", "8"),
            ],
        )
        .unwrap();
        assert_eq!(config.wordnet_path, PathBuf::from("/srv/wn"));
        assert_eq!(config.wordnet_mode, LoadMode::Owned);
        assert_eq!(config.ngram.corpus, "en-GB-2019");
        assert_eq!(config.port, 9000);
        assert_eq!(config.max_words, 8);
    }

    #[test]
    fn bad_values_are_reported() {
        assert!(matches!(
            load(&[], &[("PORT", "eighty")]),
            Err(ConfigError::Invalid { name: "PORT", .. })
        ));
        assert!(matches!(
            load(&[], &[("RETRIEVAL_PARALLELISM", "0")]),
            Err(ConfigError::Invalid { name: "RETRIEVAL_PARALLELISM", .. })
        ));
        assert!(load(&["--wordnet-mode=lazy"], &[]).is_err());
        assert_eq!(
            load(&["--corpus"], &[]).unwrap_err(),
            ConfigError::MissingValue("--corpus")
        );
        assert_eq!(
            load(&["--verbose"], &[]).unwrap_err(),
            ConfigError::UnknownArgument("--verbose".to_string())
        );
    }

    #[test]
    fn bad_ngram_numbers_are_reported() {
        assert!(matches!(
            load(&[], &[("NGRAM_TIMEOUT_SECS", "soon")]),
            Err(ConfigError::Invalid { name: "NGRAM_TIMEOUT_SECS", .. })
        ));
        assert!(matches!(
            load(&[], &[("NGRAM_SMOOTHING", "-3")]),
            Err(ConfigError::Invalid { name: "NGRAM_SMOOTHING", .. })
        ));
        let config = load(
            &[],
            &[("NGRAM_TIMEOUT_SECS", "5"), ("NGRAM_SMOOTHING", "2")],
        )
        .unwrap();
        assert_eq!(config.ngram.timeout_secs, 5);
        assert_eq!(config.ngram.smoothing, 2);
    }

    #[test]
    fn host_must_be_an_address() {
        let config = load(&[], &[("HOST", "localhost")]).unwrap();
        assert!(config.listen_addr().is_err());
    }
}
