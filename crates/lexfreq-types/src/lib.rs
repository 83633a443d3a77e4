//! Shared vocabulary for collapsing word-form frequencies into lexemes.
//!
//! The corpus reports counts per spelling (`run`, `runs`, `ran`), optionally
//! tagged with a part of speech (`run_VERB`). Downstream code wants one
//! signal per lexeme, so the types here name each piece of that pipeline:
//! [`Category`] for the part-of-speech tag, [`Term`] for a corpus query
//! string, [`Series`] for a year-indexed signal, [`LexemeKey`] for the
//! aggregation unit and [`Observed`] for values that may be missing on purpose.
//!
//! The two service boundaries live in [`Lexicon`] and [`FrequencySource`].
//!
//! ```rust
//! use lexfreq_types::{Category, Observed, Term};
//!
//! let term = Term::parse("run_VERB");
//! assert_eq!(term.spelling, "run");
//! assert_eq!(term.category(), Some(Observed::Present(Category::Verb)));
//! assert_eq!(Term::parse("New_York").category(), None);
//! ```

mod ports;
mod series;

use std::fmt;

use serde::Serialize;

pub use ports::{FrequencyError, FrequencySource, Lexicon};
pub use series::{Series, YearRange, YearRangeError};

/// Part-of-speech label, following the universal tag set the Ngram corpus uses.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
pub enum Category {
    #[serde(rename = "noun")]
    Noun,
    #[serde(rename = "verb")]
    Verb,
    #[serde(rename = "adj")]
    Adjective,
    #[serde(rename = "adv")]
    Adverb,
    #[serde(rename = "pron")]
    Pronoun,
    #[serde(rename = "det")]
    Determiner,
    #[serde(rename = "adp")]
    Adposition,
    #[serde(rename = "num")]
    Numeral,
    #[serde(rename = "conj")]
    Conjunction,
    #[serde(rename = "prt")]
    Particle,
    #[serde(rename = "x")]
    Other,
    #[serde(rename = "punct")]
    Punctuation,
}

impl Category {
    pub const ALL: [Category; 12] = [
        Category::Noun,
        Category::Verb,
        Category::Adjective,
        Category::Adverb,
        Category::Pronoun,
        Category::Determiner,
        Category::Adposition,
        Category::Numeral,
        Category::Conjunction,
        Category::Particle,
        Category::Other,
        Category::Punctuation,
    ];

    /// Parse the corpus suffix (`NOUN`, `VERB`, `ADJ`, ...).
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.tag() == tag)
    }

    /// Suffix used to build a tagged corpus query such as `run_VERB`.
    pub fn tag(self) -> &'static str {
        match self {
            Category::Noun => "NOUN",
            Category::Verb => "VERB",
            Category::Adjective => "ADJ",
            Category::Adverb => "ADV",
            Category::Pronoun => "PRON",
            Category::Determiner => "DET",
            Category::Adposition => "ADP",
            Category::Numeral => "NUM",
            Category::Conjunction => "CONJ",
            Category::Particle => "PRT",
            Category::Other => "X",
            Category::Punctuation => ".",
        }
    }

    /// Stable lowercase label used in output.
    pub fn label(self) -> &'static str {
        match self {
            Category::Noun => "noun",
            Category::Verb => "verb",
            Category::Adjective => "adj",
            Category::Adverb => "adv",
            Category::Pronoun => "pron",
            Category::Determiner => "det",
            Category::Adposition => "adp",
            Category::Numeral => "num",
            Category::Conjunction => "conj",
            Category::Particle => "prt",
            Category::Other => "x",
            Category::Punctuation => "punct",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A value that is either present or explicitly unavailable.
///
/// Unlike a zero, `Unavailable` never takes part in arithmetic: a sum over
/// only unavailable inputs is itself unavailable.
#[derive(Clone, Debug, PartialEq)]
pub enum Observed<T> {
    Present(T),
    Unavailable,
}

impl<T> Observed<T> {
    pub fn present(self) -> Option<T> {
        match self {
            Observed::Present(v) => Some(v),
            Observed::Unavailable => None,
        }
    }
}

impl<T> From<Option<T>> for Observed<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Observed::Unavailable, Observed::Present)
    }
}

/// `(base form, category)`: the unit of aggregation.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
pub struct LexemeKey {
    pub base: String,
    pub category: Category,
}

impl LexemeKey {
    pub fn new(base: impl Into<String>, category: Category) -> Self {
        Self {
            base: base.into(),
            category,
        }
    }
}

impl fmt::Display for LexemeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.base, self.category)
    }
}

/// A corpus query string, split into spelling and optional `_TAG` suffix.
///
/// Suffixes count as tags only when they look like one (ASCII uppercase or
/// `.`); `New_York` and wildcard collections like `run_*` are untagged.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Term {
    pub spelling: String,
    pub tag: Option<String>,
}

impl Term {
    pub fn untagged(spelling: impl Into<String>) -> Self {
        Self {
            spelling: spelling.into(),
            tag: None,
        }
    }

    pub fn tagged(spelling: impl Into<String>, category: Category) -> Self {
        Self {
            spelling: spelling.into(),
            tag: Some(category.tag().to_string()),
        }
    }

    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.rsplit_once('_') {
            Some((spelling, tag)) if !spelling.is_empty() && looks_like_tag(tag) => Self {
                spelling: spelling.to_string(),
                tag: Some(tag.to_string()),
            },
            _ => Self::untagged(raw),
        }
    }

    /// `None` when the term carries no tag at all, `Some(Unavailable)` when it
    /// carries a tag outside the known set.
    pub fn category(&self) -> Option<Observed<Category>> {
        self.tag
            .as_deref()
            .map(|tag| Observed::from(Category::from_tag(tag)))
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tag {
            Some(tag) => write!(f, "{}_{}", self.spelling, tag),
            None => f.write_str(&self.spelling),
        }
    }
}

fn looks_like_tag(tag: &str) -> bool {
    tag == "." || (!tag.is_empty() && tag.bytes().all(|b| b.is_ascii_uppercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_tags_round_trip() {
        for category in Category::ALL {
            assert_eq!(Category::from_tag(category.tag()), Some(category));
        }
        assert_eq!(Category::from_tag("verb"), None);
    }

    #[test]
    fn parses_terms() {
        let term = Term::parse("running_VERB");
        assert_eq!(term.spelling, "running");
        assert_eq!(term.category(), Some(Observed::Present(Category::Verb)));

        let unknown = Term::parse("run_FOO");
        assert_eq!(unknown.category(), Some(Observed::Unavailable));

        assert_eq!(Term::parse("run_*").category(), None);
        assert_eq!(Term::parse("run").category(), None);
        assert_eq!(Term::parse("_NOUN").spelling, "_NOUN");
        assert_eq!(Term::tagged("he", Category::Pronoun).to_string(), "he_PRON");
    }

    #[test]
    fn observed_from_option() {
        assert_eq!(Observed::from(Some(3)), Observed::Present(3));
        assert_eq!(Observed::<u8>::from(None), Observed::Unavailable);
    }

    #[test]
    fn lexeme_key_serializes_with_label() {
        let key = LexemeKey::new("run", Category::Verb);
        let json = serde_json::to_value(&key).unwrap();
        assert_eq!(json["base"], "run");
        assert_eq!(json["category"], "verb");
    }
}
