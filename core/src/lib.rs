//! Field-aware probabilistic document scoring.
//!
//! A [`DocumentCollection`] and its per-field [`FieldIndex`] are scored against
//! a query by one of the ranking models in [`models`]. Scoring never sorts;
//! callers order the returned [`ScoreMap`] themselves.

pub mod collection;
pub mod config;
pub mod error;
pub mod index;
pub mod models;
pub mod persist;
pub mod scorer;
pub mod tokenizer;

pub use collection::{DocId, Document, DocumentCollection, Term};
pub use config::{BoxedScorer, ModelConfig, ModelKind, ModelRegistry};
pub use error::{Result, ScoreError};
pub use index::FieldIndex;
pub use scorer::{query_term_frequencies, FieldSelection, ScoreCollection, ScoreMap, Scorer, WeightedField};
