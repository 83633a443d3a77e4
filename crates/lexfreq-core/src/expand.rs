use std::collections::{BTreeMap, BTreeSet};

use lexfreq_types::Lexicon;
use serde::Serialize;
use tracing::debug;

use crate::overrides::OverrideTable;

/// Base form -> every spelling to query for it, base included.
pub type Families = BTreeMap<String, BTreeSet<String>>;

/// What expansion did besides the happy path. Informational only.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ExpansionReport {
    /// Words the lexicon had no base form for; each stands for itself.
    pub unresolved: Vec<String>,
    /// Bases removed because they are non-base forms of a closed-class family.
    pub dropped: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Expansion {
    pub families: Families,
    pub report: ExpansionReport,
}

/// Map each query word to its base form and inflection set.
///
/// Closed-class families in `overrides` win over the lexicon, both for the
/// raw word and for the base the lexicon resolves it to. Words the lexicon
/// does not know are lowercased and kept as their own base.
pub fn expand<S: AsRef<str>>(
    words: &[S],
    lexicon: &dyn Lexicon,
    overrides: &OverrideTable,
) -> Expansion {
    let mut families = Families::new();
    let mut report = ExpansionReport::default();

    for word in words {
        let word = word.as_ref().trim();
        if word.is_empty() {
            continue;
        }
        if let Some(family) = overrides.family(word) {
            families.insert(family.base.clone(), family.forms.iter().cloned().collect());
            continue;
        }

        let lowered = word.to_lowercase();
        let base = match lexicon.base_form(&lowered) {
            Some(base) => base,
            None => {
                debug!(word, "no base form, word stands for itself");
                report.unresolved.push(lowered.clone());
                lowered
            }
        };
        if let Some(family) = overrides.family(&base) {
            families.insert(family.base.clone(), family.forms.iter().cloned().collect());
            continue;
        }
        if families.contains_key(&base) {
            continue;
        }

        let mut forms = BTreeSet::from([base.clone()]);
        forms.extend(lexicon.inflected_forms(&base));
        families.insert(base, forms);
    }

    families.retain(|base, _| {
        let dependent = overrides.is_dependent_form(base);
        if dependent {
            debug!(base = %base, "dropping dependent closed-class form");
            report.dropped.push(base.clone());
        }
        !dependent
    });

    Expansion { families, report }
}
