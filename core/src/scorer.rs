//! Term-at-a-time query scoring shared by every ranking model.
//!
//! A model implements [`Scorer::score_term`]; the query loop lives once in
//! [`ScoreCollection::score_collection`], which every scorer gets through a
//! blanket impl.

use crate::collection::{DocId, DocumentCollection};
use crate::error::{Result, ScoreError};
use crate::index::FieldIndex;
use std::collections::HashMap;

/// Retrieval scores by document id. Documents missing from the map score 0.
pub type ScoreMap = HashMap<DocId, f64>;

#[derive(Debug, Clone, PartialEq)]
pub struct WeightedField {
    pub name: String,
    pub weight: f64,
}

/// Fields a scorer reads: exactly one field, or a weighted list of fields.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldSelection {
    Single(String),
    Weighted(Vec<WeightedField>),
}

impl FieldSelection {
    pub fn single(field: &str) -> Result<Self> {
        require_field(field).map(Self::Single)
    }

    /// Pairs `fields` with `weights`; both must be non-empty and of equal length.
    pub fn weighted(fields: &[String], weights: &[f64]) -> Result<Self> {
        if fields.is_empty() || fields.iter().any(String::is_empty) {
            return Err(ScoreError::NoScoringField);
        }
        check_per_field("field_weights", fields.len(), weights.len())?;
        for &w in weights {
            if !w.is_finite() || w < 0.0 {
                return Err(ScoreError::InvalidParameter { name: "field_weight", value: w });
            }
        }
        Ok(Self::Weighted(
            fields
                .iter()
                .zip(weights)
                .map(|(name, &weight)| WeightedField { name: name.clone(), weight })
                .collect(),
        ))
    }

    pub fn field_names(&self) -> Vec<&str> {
        match self {
            Self::Single(f) => vec![f.as_str()],
            Self::Weighted(fs) => fs.iter().map(|f| f.name.as_str()).collect(),
        }
    }
}

pub(crate) fn require_field(field: &str) -> Result<String> {
    if field.is_empty() {
        return Err(ScoreError::NoScoringField);
    }
    Ok(field.to_string())
}

pub(crate) fn check_per_field(what: &'static str, fields: usize, values: usize) -> Result<()> {
    if fields != values {
        return Err(ScoreError::FieldWeightMismatch { what, fields, values });
    }
    Ok(())
}

pub(crate) fn check_unit_interval(name: &'static str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ScoreError::InvalidParameter { name, value });
    }
    Ok(())
}

pub(crate) fn check_non_negative(name: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(ScoreError::InvalidParameter { name, value });
    }
    Ok(())
}

/// `ln(N / df)` for a term known to occur somewhere in `field`.
pub(crate) fn idf(collection: &DocumentCollection, index: &FieldIndex, field: &str, term: &str) -> Result<f64> {
    let df = index.doc_frequency(field, term);
    let inconsistent = |reason: String| ScoreError::IndexInconsistency {
        field: field.to_string(),
        term: term.to_string(),
        reason,
    };
    if df == 0 {
        return Err(inconsistent("term occurs in the collection but has no postings".into()));
    }
    if df > collection.len() {
        return Err(inconsistent(format!(
            "document frequency {df} exceeds collection size {}",
            collection.len()
        )));
    }
    Ok((collection.len() as f64 / df as f64).ln())
}

/// Fails unless `doc_id`, which contains `term` in `field`, is listed in its postings.
pub(crate) fn check_posting(index: &FieldIndex, field: &str, term: &str, doc_id: &str) -> Result<()> {
    if index.postings(field, term).is_some_and(|p| p.contains(doc_id)) {
        return Ok(());
    }
    Err(ScoreError::IndexInconsistency {
        field: field.to_string(),
        term: term.to_string(),
        reason: format!("document {doc_id} contains the term but is missing from its postings"),
    })
}

/// A ranking model. Implementations add the contribution of one query term to
/// every document it touches.
pub trait Scorer {
    fn name(&self) -> &'static str;

    /// Adds the contribution of `term`, occurring `query_freq` times in the
    /// query, into `scores`.
    fn score_term(&self, term: &str, query_freq: u32, scores: &mut ScoreMap) -> Result<()>;
}

/// Distinct query terms with their counts, in order of first occurrence.
pub fn query_term_frequencies<T: AsRef<str>>(query_terms: &[T]) -> Vec<(&str, u32)> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut freqs: Vec<(&str, u32)> = Vec::new();
    for term in query_terms {
        let term = term.as_ref();
        match positions.get(term) {
            Some(&i) => freqs[i].1 += 1,
            None => {
                positions.insert(term, freqs.len());
                freqs.push((term, 1));
            }
        }
    }
    freqs
}

/// Whole-query scoring, implemented once for every [`Scorer`].
pub trait ScoreCollection {
    /// Scores the collection against `query_terms`. Each call starts from an
    /// empty accumulator; an empty query yields an empty map.
    fn score_collection<T: AsRef<str>>(&self, query_terms: &[T]) -> Result<ScoreMap>;
}

impl<S: Scorer + ?Sized> ScoreCollection for S {
    fn score_collection<T: AsRef<str>>(&self, query_terms: &[T]) -> Result<ScoreMap> {
        let mut scores = ScoreMap::new();
        let freqs = query_term_frequencies(query_terms);
        for &(term, query_freq) in &freqs {
            self.score_term(term, query_freq, &mut scores)?;
        }
        tracing::debug!(model = self.name(), terms = freqs.len(), docs = scores.len(), "scored query");
        Ok(scores)
    }
}
