//! Ranking model selection and parameters.
//!
//! Model configs are plain serde data, e.g. `{"model": "bm25", "k1": 1.5}`;
//! any parameter left out keeps its default.

use crate::collection::DocumentCollection;
use crate::error::{Result, ScoreError};
use crate::index::FieldIndex;
use crate::models::{
    Bm25Params, Bm25Scorer, Bm25fParams, Bm25fScorer, LanguageModelParams, LanguageModelScorer,
    MixtureLanguageModelScorer, MixtureParams, TermCountParams, TermCountScorer,
};
use crate::scorer::Scorer;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

pub type BoxedScorer<'a> = Box<dyn Scorer + Send + Sync + 'a>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    TermCount,
    Bm25,
    Lm,
    Bm25f,
    Mlm,
}

impl ModelKind {
    pub const ALL: [ModelKind; 5] = [Self::TermCount, Self::Bm25, Self::Lm, Self::Bm25f, Self::Mlm];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TermCount => "term_count",
            Self::Bm25 => "bm25",
            Self::Lm => "lm",
            Self::Bm25f => "bm25f",
            Self::Mlm => "mlm",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for ModelKind {
    type Err = ScoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "term_count" | "count" | "tf" => Ok(Self::TermCount),
            "bm25" => Ok(Self::Bm25),
            "lm" | "language_model" => Ok(Self::Lm),
            "bm25f" => Ok(Self::Bm25f),
            "mlm" | "mixture" => Ok(Self::Mlm),
            _ => Err(ScoreError::UnknownModel(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum ModelConfig {
    TermCount(TermCountParams),
    Bm25(Bm25Params),
    Lm(LanguageModelParams),
    Bm25f(Bm25fParams),
    Mlm(MixtureParams),
}

impl ModelConfig {
    pub fn default_for(kind: ModelKind) -> Self {
        match kind {
            ModelKind::TermCount => Self::TermCount(TermCountParams::default()),
            ModelKind::Bm25 => Self::Bm25(Bm25Params::default()),
            ModelKind::Lm => Self::Lm(LanguageModelParams::default()),
            ModelKind::Bm25f => Self::Bm25f(Bm25fParams::default()),
            ModelKind::Mlm => Self::Mlm(MixtureParams::default()),
        }
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            Self::TermCount(_) => ModelKind::TermCount,
            Self::Bm25(_) => ModelKind::Bm25,
            Self::Lm(_) => ModelKind::Lm,
            Self::Bm25f(_) => ModelKind::Bm25f,
            Self::Mlm(_) => ModelKind::Mlm,
        }
    }

    /// Builds the configured scorer bound to `collection` and `index`.
    pub fn build<'a>(&self, collection: &'a DocumentCollection, index: &'a FieldIndex) -> Result<BoxedScorer<'a>> {
        let scorer: BoxedScorer<'a> = match self.clone() {
            Self::TermCount(p) => Box::new(TermCountScorer::new(collection, index, p)?),
            Self::Bm25(p) => Box::new(Bm25Scorer::new(collection, index, p)?),
            Self::Lm(p) => Box::new(LanguageModelScorer::new(collection, index, p)?),
            Self::Bm25f(p) => Box::new(Bm25fScorer::new(collection, index, p)?),
            Self::Mlm(p) => Box::new(MixtureLanguageModelScorer::new(collection, index, p)?),
        };
        Ok(scorer)
    }
}

/// One config per model kind; kinds never configured use their defaults.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    configs: HashMap<ModelKind, ModelConfig>,
}

impl ModelRegistry {
    pub fn new() -> Self { Self::default() }

    /// Parses a JSON array of model configs. Later entries override earlier ones.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let configs: Vec<ModelConfig> = serde_json::from_str(json)?;
        let mut registry = Self::new();
        for config in configs {
            registry.set(config);
        }
        Ok(registry)
    }

    pub fn set(&mut self, config: ModelConfig) {
        self.configs.insert(config.kind(), config);
    }

    pub fn get(&self, kind: ModelKind) -> ModelConfig {
        self.configs.get(&kind).cloned().unwrap_or_else(|| ModelConfig::default_for(kind))
    }
}
