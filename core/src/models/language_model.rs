use crate::collection::DocumentCollection;
use crate::error::Result;
use crate::index::FieldIndex;
use crate::scorer::{check_unit_interval, require_field, ScoreMap, Scorer};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageModelParams {
    pub field: String,
    /// Jelinek-Mercer weight of the collection model.
    pub smoothing_param: f64,
}

impl Default for LanguageModelParams {
    fn default() -> Self {
        Self { field: "body".into(), smoothing_param: 0.1 }
    }
}

/// Unigram query likelihood with Jelinek-Mercer smoothing. Scores are sums of
/// log probabilities.
pub struct LanguageModelScorer<'a> {
    collection: &'a DocumentCollection,
    field: String,
    lambda: f64,
}

impl<'a> LanguageModelScorer<'a> {
    pub fn new(collection: &'a DocumentCollection, _index: &'a FieldIndex, params: LanguageModelParams) -> Result<Self> {
        let field = require_field(&params.field)?;
        check_unit_interval("smoothing_param", params.smoothing_param)?;
        Ok(Self { collection, field, lambda: params.smoothing_param })
    }
}

impl Scorer for LanguageModelScorer<'_> {
    fn name(&self) -> &'static str { "lm" }

    fn score_term(&self, term: &str, query_freq: u32, scores: &mut ScoreMap) -> Result<()> {
        let occurrences = self.collection.collection_term_frequency(&self.field, term);
        if occurrences == 0 {
            return Ok(());
        }
        let p_collection = occurrences as f64 / self.collection.total_field_length(&self.field) as f64;

        for (doc_id, doc) in self.collection.iter() {
            let tf = doc.term_frequency(&self.field, term);
            if tf == 0 {
                continue;
            }
            let p_doc = tf as f64 / doc.field_length(&self.field) as f64;
            let p = (1.0 - self.lambda) * p_doc + self.lambda * p_collection;
            *scores.entry(doc_id.clone()).or_insert(0.0) += query_freq as f64 * p.ln();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::Document;
    use crate::scorer::ScoreCollection;

    fn corpus() -> (DocumentCollection, FieldIndex) {
        let mut c = DocumentCollection::new();
        c.insert("d1", Document::new().with_field("body", ["a", "b", "a"]));
        c.insert("d2", Document::new().with_field("body", ["b", "b"]));
        let idx = FieldIndex::from_collection(&c);
        (c, idx)
    }

    #[test]
    fn smoothed_log_likelihood() {
        let (c, idx) = corpus();
        let scorer = LanguageModelScorer::new(&c, &idx, LanguageModelParams::default()).unwrap();
        let scores = scorer.score_collection(&["a", "a"]).unwrap();
        // P(a|d1) = 2/3, P(a|C) = 2/5
        let expected = 2.0 * (0.9 * (2.0 / 3.0) + 0.1 * 0.4f64).ln();
        assert!((scores["d1"] - expected).abs() < 1e-12);
        assert!(!scores.contains_key("d2"));
    }

    #[test]
    fn full_smoothing_ignores_the_document() {
        let (c, idx) = corpus();
        let params = LanguageModelParams { smoothing_param: 1.0, ..Default::default() };
        let scorer = LanguageModelScorer::new(&c, &idx, params).unwrap();
        let scores = scorer.score_collection(&["b"]).unwrap();
        let expected = (3.0f64 / 5.0).ln();
        assert!((scores["d1"] - expected).abs() < 1e-12);
        assert!((scores["d2"] - expected).abs() < 1e-12);
    }

    #[test]
    fn scores_are_log_domain() {
        let (c, idx) = corpus();
        let scorer = LanguageModelScorer::new(&c, &idx, LanguageModelParams::default()).unwrap();
        let scores = scorer.score_collection(&["a", "b"]).unwrap();
        assert!(scores.values().all(|s| *s < 0.0));
    }

    #[test]
    fn rejects_smoothing_outside_unit_interval() {
        let (c, idx) = corpus();
        let params = LanguageModelParams { smoothing_param: -0.1, ..Default::default() };
        assert!(LanguageModelScorer::new(&c, &idx, params).is_err());
    }
}
