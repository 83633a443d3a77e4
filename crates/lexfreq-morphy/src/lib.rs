//! WordNet-style morphological processing in both directions.
//!
//! [`Morphy::lemmas_for`] follows the classic morphy algorithm: check the
//! exception lists, apply suffix rules, and verify candidates via a
//! caller-provided lemma existence predicate.
//!
//! [`Morphy::inflections_for`] runs the other way. It collects irregular forms
//! by inverting the exception lists, generates regular English inflections
//! (plural, third person, past, gerund, comparative, superlative), and keeps
//! only generated forms that morphy maps back to the lemma. A lemma with an
//! irregular form of some kind gets no regular form of that kind, so `run`
//! yields `ran` but not `runned`.
//!
//! The crate is decoupled from any particular loader; it only depends on
//! [`Category`] and the callback you supply.
//!
//! # Example
//! ```
//! use lexfreq_morphy::Morphy;
//! use lexfreq_types::Category;
//!
//! let morph = Morphy::from_exceptions([(Category::Verb, "ran", "run")]);
//! let exists = |c: Category, lemma: &str| c == Category::Verb && lemma == "run";
//!
//! let lemmas = morph.lemmas_for(Category::Verb, "running", exists);
//! assert_eq!(lemmas[0].lemma, "run");
//!
//! let forms: Vec<_> = morph
//!     .inflections_for(Category::Verb, "run", exists)
//!     .into_iter()
//!     .map(|f| f.form)
//!     .collect();
//! assert_eq!(forms, ["ran", "runs", "running"]);
//! ```

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use lexfreq_types::Category;

/// Categories WordNet carries lemmas and exception lists for.
pub const WORDNET_CATEGORIES: [Category; 4] = [
    Category::Verb,
    Category::Noun,
    Category::Adjective,
    Category::Adverb,
];

/// Where a candidate originated.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CandidateSource {
    Surface,
    Exception,
    Rule {
        suffix: &'static str,
        replacement: &'static str,
    },
}

/// A lemma candidate paired with its category and provenance.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LemmaCandidate<'a> {
    pub category: Category,
    pub lemma: Cow<'a, str>,
    pub source: CandidateSource,
}

/// Which inflectional slot a generated form fills.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Inflection {
    Plural,
    ThirdPerson,
    Past,
    Gerund,
    Comparative,
    Superlative,
}

/// An inflected spelling of a lemma.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InflectedForm {
    pub category: Category,
    pub form: String,
    /// `None` for irregular forms taken from the exception lists.
    pub inflection: Option<Inflection>,
}

/// Morphy parameterised by caller-provided existence checks.
#[derive(Debug, Default)]
pub struct Morphy {
    exceptions: HashMap<Category, HashMap<String, Vec<String>>>,
    irregular: HashMap<Category, HashMap<String, Vec<String>>>,
}

impl Morphy {
    /// Load morphy exception lists (`*.exc`) from a WordNet dict directory.
    ///
    /// Files are optional; missing ones are treated as empty.
    pub fn load(dict_dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dict_dir.as_ref();
        let mut morph = Self::default();
        for (category, name) in [
            (Category::Noun, "noun.exc"),
            (Category::Verb, "verb.exc"),
            (Category::Adjective, "adj.exc"),
            (Category::Adverb, "adv.exc"),
        ] {
            for (surface, lemma) in load_exc(dir.join(name))? {
                morph.add_exception(category, &surface, &lemma);
            }
        }
        Ok(morph)
    }

    /// Build from `(category, surface, lemma)` triples.
    pub fn from_exceptions<'s>(
        entries: impl IntoIterator<Item = (Category, &'s str, &'s str)>,
    ) -> Self {
        let mut morph = Self::default();
        for (category, surface, lemma) in entries {
            morph.add_exception(category, surface, lemma);
        }
        morph
    }

    fn add_exception(&mut self, category: Category, surface: &str, lemma: &str) {
        let surface = normalize(surface);
        let lemma = normalize(lemma);
        push_once(
            self.exceptions
                .entry(category)
                .or_default()
                .entry(surface.clone())
                .or_default(),
            lemma.clone(),
        );
        if surface != lemma {
            push_once(
                self.irregular
                    .entry(category)
                    .or_default()
                    .entry(lemma)
                    .or_default(),
                surface,
            );
        }
    }

    /// Number of exception entries across all categories.
    pub fn exception_count(&self) -> usize {
        self.exceptions.values().map(HashMap::len).sum()
    }

    /// Generate lemmas for a surface form, returning enriched provenance.
    ///
    /// The callback `lemma_exists` typically delegates to
    /// `WordNetIndex::lemma_exists` so this crate stays ignorant of any
    /// concrete database layout.
    pub fn lemmas_for<'a, F>(
        &'a self,
        category: Category,
        surface: &str,
        lemma_exists: F,
    ) -> Vec<LemmaCandidate<'a>>
    where
        F: Fn(Category, &str) -> bool,
    {
        let mut seen: HashSet<Cow<'a, str>> = HashSet::new();
        let mut out: Vec<LemmaCandidate<'a>> = Vec::new();
        let norm_surface = normalize(surface);

        if lemma_exists(category, &norm_surface) {
            push_unique(
                &mut out,
                &mut seen,
                LemmaCandidate {
                    category,
                    lemma: Cow::Owned(norm_surface.clone()),
                    source: CandidateSource::Surface,
                },
            );
        }

        // Exceptions may list several lemmas per surface form.
        if let Some(exc_map) = self.exceptions.get(&category)
            && let Some(entries) = exc_map.get(&norm_surface)
        {
            for lemma in entries {
                if lemma_exists(category, lemma) {
                    push_unique(
                        &mut out,
                        &mut seen,
                        LemmaCandidate {
                            category,
                            lemma: Cow::Borrowed(lemma.as_str()),
                            source: CandidateSource::Exception,
                        },
                    );
                }
            }
        }

        for (suffix, replacement) in rules_for(category) {
            for candidate in apply_rule(&norm_surface, suffix, replacement) {
                if !lemma_exists(category, &candidate) {
                    continue;
                }
                push_unique(
                    &mut out,
                    &mut seen,
                    LemmaCandidate {
                        category,
                        lemma: Cow::Owned(candidate),
                        source: CandidateSource::Rule {
                            suffix,
                            replacement,
                        },
                    },
                );
            }
        }

        out
    }

    /// Inflected spellings of `lemma` under `category`, irregular forms first.
    ///
    /// Returns nothing when `lemma` is not a lemma of `category`. The lemma
    /// itself is never part of the output.
    pub fn inflections_for<F>(
        &self,
        category: Category,
        lemma: &str,
        lemma_exists: F,
    ) -> Vec<InflectedForm>
    where
        F: Fn(Category, &str) -> bool,
    {
        let base = normalize(lemma);
        if !lemma_exists(category, &base) {
            return Vec::new();
        }

        let mut seen: HashSet<String> = HashSet::from([base.clone()]);
        let mut out = Vec::new();

        let irregular = self
            .irregular
            .get(&category)
            .and_then(|m| m.get(&base))
            .map(Vec::as_slice)
            .unwrap_or_default();
        for form in irregular {
            if seen.insert(form.clone()) {
                out.push(InflectedForm {
                    category,
                    form: form.clone(),
                    inflection: None,
                });
            }
        }

        for (inflection, form) in regular_forms(category, &base, !irregular.is_empty()) {
            if seen.contains(&form) {
                continue;
            }
            let maps_back = self
                .lemmas_for(category, &form, &lemma_exists)
                .iter()
                .any(|c| c.lemma == base);
            if maps_back {
                seen.insert(form.clone());
                out.push(InflectedForm {
                    category,
                    form,
                    inflection: Some(inflection),
                });
            }
        }

        out
    }
}

fn load_exc(path: PathBuf) -> Result<Vec<(String, String)>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let file =
        File::open(&path).with_context(|| format!("open exception file {}", path.display()))?;
    let reader = BufReader::new(file);
    let mut pairs = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line =
            line.with_context(|| format!("read line {} in {}", lineno + 1, path.display()))?;
        let mut parts = line.split_whitespace();
        let Some(surface) = parts.next() else {
            continue;
        };
        for lemma in parts {
            pairs.push((surface.to_string(), lemma.to_string()));
        }
    }
    Ok(pairs)
}

/// Lowercase, trim, and join multiword entries with `_` as WordNet does.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase().replace(' ', "_")
}

fn push_once(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

fn push_unique<'a>(
    out: &mut Vec<LemmaCandidate<'a>>,
    seen: &mut HashSet<Cow<'a, str>>,
    candidate: LemmaCandidate<'a>,
) {
    if seen.insert(candidate.lemma.clone()) {
        out.push(candidate);
    }
}

/// Stem candidates for one detachment rule. A stem ending in a doubled
/// consonant is tried both as is ("pass") and undoubled ("runn" -> "run").
fn apply_rule(surface: &str, suffix: &str, replacement: &str) -> Vec<String> {
    let Some(stem) = surface.strip_suffix(suffix) else {
        return Vec::new();
    };
    if !replacement.is_empty() {
        return vec![format!("{stem}{replacement}")];
    }

    let mut candidates = vec![stem.to_string()];
    let mut chars = stem.chars();
    if let (Some(last), Some(prev)) = (chars.next_back(), chars.next_back())
        && last == prev
    {
        candidates.push(stem[..stem.len() - last.len_utf8()].to_string());
    }
    candidates
}

fn rules_for(category: Category) -> &'static [(&'static str, &'static str)] {
    match category {
        Category::Noun => &[
            ("s", ""),
            ("ses", "s"),
            ("xes", "x"),
            ("zes", "z"),
            ("ches", "ch"),
            ("shes", "sh"),
            ("men", "man"),
            ("ies", "y"),
        ],
        Category::Verb => &[
            ("s", ""),
            ("ies", "y"),
            ("es", "e"),
            ("es", ""),
            ("ed", "e"),
            ("ed", ""),
            ("ing", "e"),
            ("ing", ""),
        ],
        Category::Adjective | Category::Adverb => {
            &[("er", ""), ("er", "e"), ("est", ""), ("est", "e")]
        }
        _ => &[],
    }
}

fn regular_forms(category: Category, base: &str, has_irregular: bool) -> Vec<(Inflection, String)> {
    if base.contains('_') || base.len() < 2 {
        return Vec::new();
    }
    match category {
        Category::Noun if !has_irregular => vec![(Inflection::Plural, sibilant_s(base))],
        Category::Noun => Vec::new(),
        Category::Verb => {
            let mut forms = vec![(Inflection::ThirdPerson, sibilant_s(base))];
            if !has_irregular {
                forms.push((Inflection::Past, past(base)));
            }
            forms.push((Inflection::Gerund, gerund(base)));
            forms
        }
        Category::Adjective if !has_irregular && vowel_groups(base) <= 2 => vec![
            (Inflection::Comparative, graded(base, "er")),
            (Inflection::Superlative, graded(base, "est")),
        ],
        _ => Vec::new(),
    }
}

fn is_vowel(c: u8) -> bool {
    matches!(c, b'a' | b'e' | b'i' | b'o' | b'u')
}

fn vowel_groups(word: &str) -> usize {
    let bytes = word.as_bytes();
    bytes
        .iter()
        .enumerate()
        .filter(|(i, b)| is_vowel(**b) && (*i == 0 || !is_vowel(bytes[i - 1])))
        .count()
}

/// Single-syllable consonant-vowel-consonant ending, as in "run" or "stop".
fn doubles_final(word: &str) -> bool {
    let b = word.as_bytes();
    let n = b.len();
    n >= 3
        && !is_vowel(b[n - 3])
        && is_vowel(b[n - 2])
        && !is_vowel(b[n - 1])
        && !matches!(b[n - 1], b'w' | b'x' | b'y')
        && vowel_groups(word) == 1
}

fn consonant_y(word: &str) -> bool {
    let b = word.as_bytes();
    b.len() >= 2 && b[b.len() - 1] == b'y' && !is_vowel(b[b.len() - 2])
}

fn sibilant_s(base: &str) -> String {
    if ["s", "x", "z", "ch", "sh"].iter().any(|s| base.ends_with(s)) {
        format!("{base}es")
    } else if consonant_y(base) {
        format!("{}ies", &base[..base.len() - 1])
    } else {
        format!("{base}s")
    }
}

fn past(base: &str) -> String {
    if base.ends_with('e') {
        format!("{base}d")
    } else if consonant_y(base) {
        format!("{}ied", &base[..base.len() - 1])
    } else if doubles_final(base) {
        let last = &base[base.len() - 1..];
        format!("{base}{last}ed")
    } else {
        format!("{base}ed")
    }
}

fn gerund(base: &str) -> String {
    if let Some(stem) = base.strip_suffix("ie") {
        format!("{stem}ying")
    } else if base.ends_with('e') && !["ee", "ye", "oe"].iter().any(|s| base.ends_with(s)) {
        format!("{}ing", &base[..base.len() - 1])
    } else if doubles_final(base) {
        let last = &base[base.len() - 1..];
        format!("{base}{last}ing")
    } else {
        format!("{base}ing")
    }
}

fn graded(base: &str, suffix: &str) -> String {
    if base.ends_with('e') {
        format!("{base}{}", &suffix[1..])
    } else if consonant_y(base) {
        format!("{}i{suffix}", &base[..base.len() - 1])
    } else if doubles_final(base) {
        let last = &base[base.len() - 1..];
        format!("{base}{last}{suffix}")
    } else {
        format!("{base}{suffix}")
    }
}
