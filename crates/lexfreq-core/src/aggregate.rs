use std::collections::BTreeMap;

use lexfreq_types::{LexemeKey, Series};

use crate::assoc::group_flatten_with;
use crate::retrieve::Contributions;

/// Sum each base's per-category contributions into one series per
/// [`LexemeKey`].
///
/// Years align on the union of the contributing series. A category with no
/// contributing series yields no entry, so an absent spelling is never read
/// as zero.
pub fn aggregate(contributions: BTreeMap<String, Contributions>) -> BTreeMap<LexemeKey, Series> {
    let per_base: BTreeMap<String, BTreeMap<LexemeKey, Series>> = contributions
        .into_iter()
        .map(|(base, by_category)| {
            let entries = by_category
                .into_iter()
                .filter_map(|(category, by_spelling)| {
                    Series::sum(by_spelling.values())
                        .map(|sum| (LexemeKey::new(base.as_str(), category), sum))
                })
                .collect();
            (base, entries)
        })
        .collect();

    group_flatten_with(per_base, |mut earlier, later| {
        earlier.accumulate(&later);
        earlier
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexfreq_types::Category;

    type Row<'a> = (&'a str, Category, &'a str, i32, &'a [f64]);

    fn contributions(entries: &[Row<'_>]) -> BTreeMap<String, Contributions> {
        let mut out: BTreeMap<String, Contributions> = BTreeMap::new();
        for (base, category, spelling, first_year, values) in entries {
            out.entry(base.to_string())
                .or_default()
                .entry(*category)
                .or_default()
                .insert(
                    spelling.to_string(),
                    Series::from_values(*first_year, values.iter().copied()),
                );
        }
        out
    }

    #[test]
    fn sums_spellings_per_category() {
        let table = aggregate(contributions(&[
            ("run", Category::Verb, "run", 2000, &[10.0, 12.0, 14.0]),
            ("run", Category::Verb, "runs", 2000, &[3.0, 4.0, 5.0]),
            ("run", Category::Verb, "running", 2000, &[1.0, 1.0, 1.0]),
            ("run", Category::Verb, "ran", 2000, &[2.0, 2.0, 2.0]),
            ("run", Category::Noun, "run", 2000, &[5.0, 5.0, 5.0]),
        ]));
        assert_eq!(table.len(), 2);
        let verb: Vec<f64> = table[&LexemeKey::new("run", Category::Verb)].values().collect();
        assert_eq!(verb, [16.0, 19.0, 22.0]);
        let noun: Vec<f64> = table[&LexemeKey::new("run", Category::Noun)].values().collect();
        assert_eq!(noun, [5.0, 5.0, 5.0]);
    }

    #[test]
    fn aligns_on_year_union() {
        let table = aggregate(contributions(&[
            ("walk", Category::Verb, "walk", 2000, &[1.0, 1.0]),
            ("walk", Category::Verb, "walked", 2001, &[2.0, 2.0]),
        ]));
        let series = &table[&LexemeKey::new("walk", Category::Verb)];
        assert_eq!(
            series.points().collect::<Vec<_>>(),
            [(2000, 1.0), (2001, 3.0), (2002, 2.0)]
        );
    }

    #[test]
    fn zero_series_still_counts() {
        let table = aggregate(contributions(&[("he", Category::Pronoun, "him", 2000, &[0.0])]));
        assert_eq!(table[&LexemeKey::new("he", Category::Pronoun)].total(), 0.0);
    }

    #[test]
    fn no_contributions_no_entries() {
        let mut input = BTreeMap::new();
        input.insert("run".to_string(), Contributions::new());
        assert!(aggregate(input).is_empty());
    }
}
