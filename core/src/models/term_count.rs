use crate::collection::DocumentCollection;
use crate::error::Result;
use crate::index::FieldIndex;
use crate::scorer::{require_field, ScoreMap, Scorer};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TermCountParams {
    pub field: String,
}

impl Default for TermCountParams {
    fn default() -> Self { Self { field: "body".into() } }
}

/// Raw term count times query frequency, summed over query terms.
pub struct TermCountScorer<'a> {
    collection: &'a DocumentCollection,
    field: String,
}

impl<'a> TermCountScorer<'a> {
    pub fn new(collection: &'a DocumentCollection, _index: &'a FieldIndex, params: TermCountParams) -> Result<Self> {
        Ok(Self { collection, field: require_field(&params.field)? })
    }
}

impl Scorer for TermCountScorer<'_> {
    fn name(&self) -> &'static str { "term_count" }

    fn score_term(&self, term: &str, query_freq: u32, scores: &mut ScoreMap) -> Result<()> {
        for (doc_id, doc) in self.collection.iter() {
            let tf = doc.term_frequency(&self.field, term);
            if tf > 0 {
                *scores.entry(doc_id.clone()).or_insert(0.0) += (tf * query_freq as usize) as f64;
            }
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
    fn count_times_query_frequency() {
        let (c, idx) = corpus();
        let scorer = TermCountScorer::new(&c, &idx, TermCountParams::default()).unwrap();
        let scores = scorer.score_collection(&["a", "a"]).unwrap();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores["d1"], 4.0);
        assert!(!scores.contains_key("d2"));
    }

    #[test]
    fn distinct_terms_add_up() {
        let (c, idx) = corpus();
        let scorer = TermCountScorer::new(&c, &idx, TermCountParams::default()).unwrap();
        let both = scorer.score_collection(&["a", "b"]).unwrap();
        assert_eq!(both["d1"], 3.0);
        assert_eq!(both["d2"], 2.0);
    }

    #[test]
    fn missing_field_is_a_config_error() {
        let (c, idx) = corpus();
        let params = TermCountParams { field: String::new() };
        assert!(TermCountScorer::new(&c, &idx, params).is_err());
    }
}
