//! Ranking models. Single field: term count, BM25, language model.
//! Multi field: BM25F and the mixture of language models.

pub mod bm25;
pub mod bm25f;
pub mod language_model;
pub mod mixture;
pub mod term_count;

pub use bm25::{Bm25Params, Bm25Scorer};
pub use bm25f::{Bm25fParams, Bm25fScorer};
pub use language_model::{LanguageModelParams, LanguageModelScorer};
pub use mixture::{MixtureLanguageModelScorer, MixtureParams};
pub use term_count::{TermCountParams, TermCountScorer};
