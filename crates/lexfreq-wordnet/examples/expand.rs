use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use lexfreq_types::Lexicon;
use lexfreq_wordnet::{LoadMode, WordNetLexicon};

fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let dict_dir = args.next().map(PathBuf::from).context(
        "usage: cargo run -p lexfreq-wordnet --example expand -- <dict-dir> <word>...",
    )?;
    let words: Vec<String> = args.collect();
    if words.is_empty() {
        bail!("usage: cargo run -p lexfreq-wordnet --example expand -- <dict-dir> <word>...");
    }

    let lex = WordNetLexicon::load_with_mode(&dict_dir, LoadMode::Mmap)
        .with_context(|| format!("loading WordNet from {}", dict_dir.display()))?;

    println!("Dictionary: {}", dict_dir.display());
    for word in words {
        let base = lex.base_form(&word).unwrap_or_else(|| word.clone());
        println!("\n{word} -> {base}");
        for form in std::iter::once(base.clone()).chain(lex.inflected_forms(&base)) {
            let categories: Vec<String> = lex
                .categories_of(&form)
                .into_iter()
                .map(|c| c.to_string())
                .collect();
            println!("  {:<12} [{}]", form, categories.join(", "));
        }
    }

    Ok(())
}
