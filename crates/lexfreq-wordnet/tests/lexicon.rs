use std::path::PathBuf;

use lexfreq_types::{Category, Lexicon};
use lexfreq_wordnet::{LoadMode, WordNetIndex, WordNetLexicon};

fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("wn")
}

fn lexicon() -> WordNetLexicon {
    WordNetLexicon::load(fixture_dir()).expect("load fixtures")
}

#[test]
fn parses_index_with_sense_counts() {
    let index = WordNetIndex::load_with_mode(fixture_dir(), LoadMode::Owned).expect("load index");
    assert_eq!(index.entry_count(), 13);
    let entry = index
        .index_entry(Category::Verb, "run")
        .expect("run verb entry present");
    assert_eq!(entry.synset_cnt, 3);
    assert_eq!(entry.sense_cnt, 3);
    assert_eq!(entry.tagsense_cnt, 2);
    assert!(index.lemma_exists(Category::Noun, "Running"));
    assert!(!index.lemma_exists(Category::Adjective, "run"));
}

#[test]
fn missing_index_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = WordNetIndex::load(dir.path()).unwrap_err();
    assert!(err.to_string().contains("missing required WordNet file"));
}

#[test]
fn resolves_base_forms() {
    let lex = lexicon();
    assert_eq!(lex.base_form("running").as_deref(), Some("run"));
    assert_eq!(lex.base_form("ran").as_deref(), Some("run"));
    assert_eq!(lex.base_form("Dogs").as_deref(), Some("dog"));
    assert_eq!(lex.base_form("children").as_deref(), Some("child"));
    assert_eq!(lex.base_form("better").as_deref(), Some("good"));
    assert_eq!(lex.base_form("he"), None);
}

#[test]
fn expands_inflection_families() {
    let lex = lexicon();
    assert_eq!(lex.inflected_forms("run"), ["ran", "runs", "running"]);
    assert_eq!(lex.inflected_forms("walk"), ["walks", "walked", "walking"]);
    assert_eq!(lex.inflected_forms("good"), ["goods", "better", "best"]);
    assert!(lex.inflected_forms("he").is_empty());
}

#[test]
fn reports_every_category_a_spelling_belongs_to() {
    let lex = lexicon();
    assert_eq!(lex.categories_of("run"), [Category::Verb, Category::Noun]);
    assert_eq!(lex.categories_of("runs"), [Category::Verb, Category::Noun]);
    assert_eq!(lex.categories_of("ran"), [Category::Verb]);
    assert_eq!(
        lex.categories_of("better"),
        [Category::Adjective, Category::Adverb]
    );
    assert!(lex.categories_of("himself").is_empty());
}
