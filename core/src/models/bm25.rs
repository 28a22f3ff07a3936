use crate::collection::DocumentCollection;
use crate::error::Result;
use crate::index::FieldIndex;
use crate::scorer::{check_non_negative, check_posting, check_unit_interval, idf, require_field, ScoreMap, Scorer};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bm25Params {
    pub field: String,
    /// Length normalization weight.
    pub b: f64,
    /// Term frequency saturation.
    pub k1: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { field: "body".into(), b: 0.75, k1: 1.2 }
    }
}

/// Okapi BM25 over a single field with `idf = ln(N / df)`.
pub struct Bm25Scorer<'a> {
    collection: &'a DocumentCollection,
    index: &'a FieldIndex,
    field: String,
    b: f64,
    k1: f64,
}

impl<'a> Bm25Scorer<'a> {
    pub fn new(collection: &'a DocumentCollection, index: &'a FieldIndex, params: Bm25Params) -> Result<Self> {
        let field = require_field(&params.field)?;
        check_unit_interval("b", params.b)?;
        check_non_negative("k1", params.k1)?;
        Ok(Self { collection, index, field, b: params.b, k1: params.k1 })
    }
}

impl Scorer for Bm25Scorer<'_> {
    fn name(&self) -> &'static str { "bm25" }

    fn score_term(&self, term: &str, _query_freq: u32, scores: &mut ScoreMap) -> Result<()> {
        let mut stats: Option<(f64, f64)> = None;
        for (doc_id, doc) in self.collection.iter() {
            let tf = doc.term_frequency(&self.field, term) as f64;
            if tf == 0.0 {
                continue;
            }
            check_posting(self.index, &self.field, term, doc_id)?;
            // idf and average length are only needed once a document matches.
            let (term_idf, avg_len) = match stats {
                Some(s) => s,
                None => {
                    let s = (
                        idf(self.collection, self.index, &self.field, term)?,
                        self.collection.avg_field_length(&self.field)?,
                    );
                    stats = Some(s);
                    s
                }
            };
            let len = doc.field_length(&self.field) as f64;
            let denominator = tf + self.k1 * (1.0 - self.b + self.b * len / avg_len);
            *scores.entry(doc_id.clone()).or_insert(0.0) += tf * (1.0 + self.k1) / denominator * term_idf;
        }
        Ok(())
    }
}
