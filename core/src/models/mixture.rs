use crate::collection::DocumentCollection;
use crate::error::{Result, ScoreError};
use crate::index::FieldIndex;
use crate::scorer::{FieldSelection, ScoreMap, Scorer, WeightedField};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixtureParams {
    pub fields: Vec<String>,
    pub field_weights: Vec<f64>,
    pub smoothing_param: f64,
}

impl Default for MixtureParams {
    fn default() -> Self {
        Self {
            fields: vec!["title".into(), "body".into()],
            field_weights: vec![0.2, 0.8],
            smoothing_param: 0.1,
        }
    }
}

/// Mixture of field language models: weighted per-field term probabilities,
/// smoothed with the collection probabilities mixed under the same field weights.
pub struct MixtureLanguageModelScorer<'a> {
    collection: &'a DocumentCollection,
    fields: Vec<WeightedField>,
    lambda: f64,
}

impl<'a> MixtureLanguageModelScorer<'a> {
    pub fn new(collection: &'a DocumentCollection, _index: &'a FieldIndex, params: MixtureParams) -> Result<Self> {
        let FieldSelection::Weighted(fields) = FieldSelection::weighted(&params.fields, &params.field_weights)? else {
            return Err(ScoreError::NoScoringField);
        };
        // Documents lacking the term get ln(lambda * P(t|C)), so lambda must be positive.
        let lambda = params.smoothing_param;
        if !(lambda > 0.0 && lambda <= 1.0) {
            return Err(ScoreError::InvalidParameter { name: "smoothing_param", value: lambda });
        }
        Ok(Self { collection, fields, lambda })
    }

    fn collection_probability(&self, term: &str) -> f64 {
        self.fields
            .iter()
            .map(|f| {
                let total = self.collection.total_field_length(&f.name);
                if total == 0 {
                    return 0.0;
                }
                f.weight * self.collection.collection_term_frequency(&f.name, term) as f64 / total as f64
            })
            .sum()
    }
}

impl Scorer for MixtureLanguageModelScorer<'_> {
    fn name(&self) -> &'static str { "mlm" }

    fn score_term(&self, term: &str, _query_freq: u32, scores: &mut ScoreMap) -> Result<()> {
        let p_collection = self.collection_probability(term);
        if p_collection == 0.0 {
            tracing::debug!(term, "term absent from all scored fields");
            return Ok(());
        }

        for (doc_id, doc) in self.collection.iter() {
            let mut p_doc = 0.0;
            for field in &self.fields {
                let tf = doc.term_frequency(&field.name, term);
                if tf > 0 {
                    p_doc += field.weight * tf as f64 / doc.field_length(&field.name) as f64;
                }
            }
            let p = (1.0 - self.lambda) * p_doc + self.lambda * p_collection;
            *scores.entry(doc_id.clone()).or_insert(0.0) += p.ln();
        }
        Ok(())
    }
}
