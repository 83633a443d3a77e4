//! Hits the real Ngram Viewer. Skipped unless `NGRAM_LIVE` is set.

use lexfreq_ngram::NgramClient;
use lexfreq_types::{Category, FrequencySource, Term, YearRange};

fn live_client() -> Option<NgramClient> {
    if std::env::var_os("NGRAM_LIVE").is_none() {
        eprintln!("NGRAM_LIVE not set; skipping live ngram test");
        return None;
    }
    Some(NgramClient::from_env().expect("ngram client"))
}

#[test]
fn fetches_tagged_variants_of_run() {
    let Some(client) = live_client() else { return };
    let range = YearRange::new(2000, 2005).unwrap();

    let variants = client.tagged_series("run", range).expect("tagged series");
    let categories: Vec<_> = variants
        .iter()
        .filter_map(|(term, _)| term.category().and_then(|c| c.present()))
        .collect();
    assert!(categories.contains(&Category::Verb), "{variants:?}");
    assert!(categories.contains(&Category::Noun), "{variants:?}");

    let verb = client
        .series(&Term::tagged("run", Category::Verb), range)
        .expect("series")
        .present()
        .expect("run_VERB has data");
    assert_eq!(verb.years().next(), Some(2000));
    assert!(verb.total() > 0.0);
}
