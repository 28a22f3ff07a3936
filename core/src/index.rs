use crate::collection::{DocId, DocumentCollection, Term};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

pub type Postings = BTreeSet<DocId>;

/// Per-field inverted index: field -> term -> ids of the documents containing it.
/// Scorers only read posting cardinalities (document frequency).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldIndex {
    pub fields: HashMap<String, HashMap<Term, Postings>>,
}

impl FieldIndex {
    pub fn new() -> Self { Self::default() }

    pub fn insert(&mut self, field: &str, term: &str, doc_id: &str) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .entry(term.to_string())
            .or_default()
            .insert(doc_id.to_string());
    }

    /// Builds the index of every (field, term) pair occurring in `collection`.
    pub fn from_collection(collection: &DocumentCollection) -> Self {
        let mut index = Self::new();
        for (doc_id, doc) in collection.iter() {
            for (field, terms) in doc.fields.iter() {
                let postings = index.fields.entry(field.clone()).or_default();
                for term in terms {
                    postings.entry(term.clone()).or_default().insert(doc_id.clone());
                }
            }
        }
        index
    }

    pub fn postings(&self, field: &str, term: &str) -> Option<&Postings> {
        self.fields.get(field).and_then(|terms| terms.get(term))
    }

    /// Number of documents containing `term` in `field`.
    pub fn doc_frequency(&self, field: &str, term: &str) -> usize {
        self.postings(field, term).map_or(0, BTreeSet::len)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn num_terms(&self, field: &str) -> usize {
        self.fields.get(field).map_or(0, HashMap::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::Document;

    #[test]
    fn builds_postings_per_field() {
        let mut c = DocumentCollection::new();
        c.insert("d1", Document::new().with_field("title", ["a"]).with_field("body", ["a", "b", "a"]));
        c.insert("d2", Document::new().with_field("body", ["b", "b"]));
        let idx = FieldIndex::from_collection(&c);

        assert_eq!(idx.doc_frequency("body", "a"), 1);
        assert_eq!(idx.doc_frequency("body", "b"), 2);
        assert_eq!(idx.doc_frequency("title", "a"), 1);
        assert_eq!(idx.doc_frequency("title", "b"), 0);
        assert_eq!(idx.doc_frequency("anchor", "a"), 0);
        assert_eq!(idx.num_terms("body"), 2);
        let b: Vec<&str> = idx.postings("body", "b").unwrap().iter().map(String::as_str).collect();
        assert_eq!(b, vec!["d1", "d2"]);
    }

    #[test]
    fn insert_is_idempotent_per_doc() {
        let mut idx = FieldIndex::new();
        idx.insert("body", "a", "d1");
        idx.insert("body", "a", "d1");
        idx.insert("body", "a", "d2");
        assert_eq!(idx.doc_frequency("body", "a"), 2);
    }
}
