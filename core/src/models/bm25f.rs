use crate::collection::DocumentCollection;
use crate::error::{Result, ScoreError};
use crate::index::FieldIndex;
use crate::scorer::{
    check_non_negative, check_per_field, check_posting, check_unit_interval, idf, FieldSelection, ScoreMap, Scorer, WeightedField,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bm25fParams {
    pub fields: Vec<String>,
    pub field_weights: Vec<f64>,
    /// Per-field length normalization, one entry per field.
    pub bi: Vec<f64>,
    pub k1: f64,
    /// Field whose document frequency supplies the idf.
    pub idf_field: String,
}

impl Default for Bm25fParams {
    fn default() -> Self {
        Self {
            fields: vec!["title".into(), "body".into()],
            field_weights: vec![0.2, 0.8],
            bi: vec![0.75, 0.75],
            k1: 1.2,
            idf_field: "body".into(),
        }
    }
}

/// BM25F: per-field length-normalized counts are combined into one pseudo
/// frequency before a single saturation step.
pub struct Bm25fScorer<'a> {
    collection: &'a DocumentCollection,
    index: &'a FieldIndex,
    fields: Vec<WeightedField>,
    bi: Vec<f64>,
    k1: f64,
    idf_field: String,
}

impl<'a> Bm25fScorer<'a> {
    pub fn new(collection: &'a DocumentCollection, index: &'a FieldIndex, params: Bm25fParams) -> Result<Self> {
        let FieldSelection::Weighted(fields) = FieldSelection::weighted(&params.fields, &params.field_weights)? else {
            return Err(ScoreError::NoScoringField);
        };
        check_per_field("bi", fields.len(), params.bi.len())?;
        for &b in &params.bi {
            check_unit_interval("bi", b)?;
        }
        check_non_negative("k1", params.k1)?;
        if !fields.iter().any(|f| f.name == params.idf_field) {
            return Err(ScoreError::IdfFieldNotScored { field: params.idf_field });
        }
        Ok(Self { collection, index, fields, bi: params.bi, k1: params.k1, idf_field: params.idf_field })
    }
}

impl Scorer for Bm25fScorer<'_> {
    fn name(&self) -> &'static str { "bm25f" }

    fn score_term(&self, term: &str, _query_freq: u32, scores: &mut ScoreMap) -> Result<()> {
        if self.collection.collection_term_frequency(&self.idf_field, term) == 0 {
            tracing::debug!(term, field = %self.idf_field, "term absent from idf field, idf undefined");
            return Ok(());
        }
        let term_idf = idf(self.collection, self.index, &self.idf_field, term)?;
        let avg_lengths = self
            .fields
            .iter()
            .map(|f| self.collection.avg_field_length(&f.name))
            .collect::<Result<Vec<f64>>>()?;

        for (doc_id, doc) in self.collection.iter() {
            if doc.term_frequency(&self.idf_field, term) > 0 {
                check_posting(self.index, &self.idf_field, term, doc_id)?;
            }
            let mut pseudo_tf = 0.0;
            for ((field, &b), &avg_len) in self.fields.iter().zip(&self.bi).zip(&avg_lengths) {
                let tf = doc.term_frequency(&field.name, term);
                if tf == 0 {
                    continue;
                }
                let norm = 1.0 - b + b * doc.field_length(&field.name) as f64 / avg_len;
                pseudo_tf += field.weight * tf as f64 / norm;
            }
            // Zero pseudo frequency contributes nothing.
            if pseudo_tf == 0.0 {
                continue;
            }
            *scores.entry(doc_id.clone()).or_insert(0.0) += pseudo_tf / (self.k1 + pseudo_tf) * term_idf;
        }
        Ok(())
    }
}
