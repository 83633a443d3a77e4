//! Closed-class exceptions consulted before the generic inflection path.
//!
//! Personal pronouns inflect for case, not by suffix, so no lexicon derives
//! "him" from "he". The table lists each such family by hand.

use lexfreq_types::Category;

/// One closed-class family: a base spelling, every spelling it owns, and the
/// category those spellings are counted under.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClosedClassOverride {
    pub base: String,
    /// All spellings of the family, base included.
    pub forms: Vec<String>,
    pub category: Category,
}

impl ClosedClassOverride {
    pub fn new(base: &str, forms: &[&str], category: Category) -> Self {
        let mut all = vec![base.to_string()];
        for form in forms {
            if !all.iter().any(|f| f.as_str() == *form) {
                all.push((*form).to_string());
            }
        }
        Self {
            base: base.to_string(),
            forms: all,
            category,
        }
    }

    fn owns(&self, spelling: &str) -> bool {
        self.forms.iter().any(|f| f.eq_ignore_ascii_case(spelling))
    }
}

/// Ordered set of [`ClosedClassOverride`]s.
///
/// Matching is ASCII case-insensitive so `i` and `I` both hit the first
/// person family; output always uses the spellings stored in the table.
#[derive(Clone, Debug, Default)]
pub struct OverrideTable {
    entries: Vec<ClosedClassOverride>,
}

impl OverrideTable {
    pub fn new(entries: Vec<ClosedClassOverride>) -> Self {
        Self { entries }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Nominative, accusative and reflexive forms of the six personal pronouns.
    pub fn pronouns() -> Self {
        let p = Category::Pronoun;
        Self::new(vec![
            ClosedClassOverride::new("I", &["me", "myself"], p),
            ClosedClassOverride::new("he", &["him", "himself"], p),
            ClosedClassOverride::new("she", &["her", "herself"], p),
            ClosedClassOverride::new("we", &["us", "ourselves"], p),
            ClosedClassOverride::new("they", &["them", "themselves"], p),
            ClosedClassOverride::new("it", &["itself"], p),
        ])
    }

    pub fn entries(&self) -> &[ClosedClassOverride] {
        &self.entries
    }

    /// The family whose base is `word`.
    pub fn family(&self, word: &str) -> Option<&ClosedClassOverride> {
        self.entries
            .iter()
            .find(|e| e.base.eq_ignore_ascii_case(word))
    }

    /// True when `word` belongs to some family without being its base.
    /// Such spellings are never queried as lexemes of their own.
    pub fn is_dependent_form(&self, word: &str) -> bool {
        self.entries
            .iter()
            .any(|e| !e.base.eq_ignore_ascii_case(word) && e.owns(word))
    }

    /// Categories the table assigns to `spelling`.
    pub fn categories_of(&self, spelling: &str) -> Vec<Category> {
        let mut out = Vec::new();
        for entry in self.entries.iter().filter(|e| e.owns(spelling)) {
            if !out.contains(&entry.category) {
                out.push(entry.category);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pronoun_families() {
        let table = OverrideTable::pronouns();
        let he = table.family("he").unwrap();
        assert_eq!(he.forms, ["he", "him", "himself"]);
        assert_eq!(table.family("i").unwrap().base, "I");
        assert!(table.family("him").is_none());
    }

    #[test]
    fn dependent_forms_exclude_bases() {
        let table = OverrideTable::pronouns();
        for form in [
            "me", "myself", "him", "himself", "her", "herself", "us", "ourselves", "them",
            "themselves", "itself",
        ] {
            assert!(table.is_dependent_form(form), "{form}");
        }
        for base in ["I", "he", "she", "we", "they", "it"] {
            assert!(!table.is_dependent_form(base), "{base}");
        }
    }

    #[test]
    fn categories_come_from_owning_family() {
        let table = OverrideTable::pronouns();
        assert_eq!(table.categories_of("himself"), [Category::Pronoun]);
        assert!(table.categories_of("run").is_empty());
        assert!(OverrideTable::empty().categories_of("he").is_empty());
    }
}
