//! Lexeme-collapse engine: turn per-spelling corpus frequencies into one
//! series per `(base form, category)`.
//!
//! A query runs in three stages. [`expand()`] maps each word to its base
//! form and inflection set, with closed-class families from an
//! [`OverrideTable`] taking precedence. Retrieval fetches a series for every
//! spelling under one of two [`Strategy`]s. [`aggregate()`] then sums those
//! series per base and category. [`Collapser`] wires the stages to a
//! [`Lexicon`](lexfreq_types::Lexicon) and a
//! [`FrequencySource`](lexfreq_types::FrequencySource).
//!
//! ```
//! use std::sync::Arc;
//!
//! use lexfreq_core::fixture::{StaticFrequency, StaticLexicon};
//! use lexfreq_core::{Collapser, LexemeQuery};
//! use lexfreq_types::Category;
//!
//! let lexicon = StaticLexicon::new().family("run", &["runs", "ran"]);
//! let frequency = StaticFrequency::new()
//!     .with("run_VERB", 2000, [10.0, 12.0])
//!     .with("ran_VERB", 2000, [2.0, 2.0]);
//! let collapser = Collapser::new(Arc::new(lexicon), Arc::new(frequency));
//!
//! let outcome = collapser.run(&LexemeQuery::new(["ran"], 2000, 2001)?)?;
//! let verb = outcome.table.get("run", Category::Verb).unwrap();
//! assert_eq!(verb.total(), 26.0);
//! # Ok::<(), lexfreq_core::QueryError>(())
//! ```

pub mod assoc;
mod aggregate;
mod expand;
pub mod fixture;
mod overrides;
mod query;
mod retrieve;

pub use aggregate::aggregate;
pub use expand::{Expansion, ExpansionReport, Families, expand};
pub use overrides::{ClosedClassOverride, OverrideTable};
pub use query::{
    Collapser, LexemeQuery, LexemeTable, LexemeValue, OutputMode, QueryError, QueryOutcome,
    UnknownMode,
};
pub use retrieve::{
    Contributions, DEFAULT_PARALLELISM, FanOut, Retrieval, RetrievalReport, Strategy,
    UnknownStrategy, retrieve_canonical, retrieve_observed,
};
