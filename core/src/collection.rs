use crate::error::{Result, ScoreError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub type DocId = String;
pub type Term = String;

/// A document split into named fields, each holding its normalized terms in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub fields: HashMap<String, Vec<Term>>,
}

impl Document {
    pub fn new() -> Self { Self::default() }

    pub fn with_field<I, T>(mut self, field: &str, terms: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Term>,
    {
        self.fields.insert(field.to_string(), terms.into_iter().map(Into::into).collect());
        self
    }

    pub fn field(&self, field: &str) -> Option<&[Term]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    /// Number of terms in `field`, 0 when the document lacks it.
    pub fn field_length(&self, field: &str) -> usize {
        self.fields.get(field).map_or(0, Vec::len)
    }

    /// Raw occurrence count of `term` in `field`.
    pub fn term_frequency(&self, field: &str, term: &str) -> usize {
        self.fields
            .get(field)
            .map_or(0, |terms| terms.iter().filter(|t| t.as_str() == term).count())
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

/// All documents of a corpus keyed by id. Ordered by id so every pass over the
/// collection visits documents in the same order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentCollection {
    docs: BTreeMap<DocId, Document>,
}

impl DocumentCollection {
    pub fn new() -> Self { Self::default() }

    /// Inserts a document, returning the previous one stored under the same id.
    pub fn insert(&mut self, doc_id: impl Into<DocId>, doc: Document) -> Option<Document> {
        self.docs.insert(doc_id.into(), doc)
    }

    pub fn len(&self) -> usize { self.docs.len() }

    pub fn is_empty(&self) -> bool { self.docs.is_empty() }

    pub fn get(&self, doc_id: &str) -> Option<&Document> { self.docs.get(doc_id) }

    pub fn iter(&self) -> impl Iterator<Item = (&DocId, &Document)> { self.docs.iter() }

    pub fn ids(&self) -> impl Iterator<Item = &DocId> { self.docs.keys() }

    /// Total number of terms in `field` over all documents; documents lacking it add 0.
    pub fn total_field_length(&self, field: &str) -> usize {
        self.docs.values().map(|doc| doc.field_length(field)).sum()
    }

    /// Average number of terms in `field` per document of the collection.
    pub fn avg_field_length(&self, field: &str) -> Result<f64> {
        if self.docs.is_empty() {
            return Err(ScoreError::EmptyCollection { field: field.to_string() });
        }
        Ok(self.total_field_length(field) as f64 / self.docs.len() as f64)
    }

    /// The term sequences of `field` for the documents that have it.
    pub fn get_field_documents(&self, field: &str) -> BTreeMap<&str, &[Term]> {
        self.docs
            .iter()
            .filter_map(|(id, doc)| doc.field(field).map(|terms| (id.as_str(), terms)))
            .collect()
    }

    /// Occurrences of `term` in `field` summed over every document.
    pub fn collection_term_frequency(&self, field: &str, term: &str) -> usize {
        self.docs.values().map(|doc| doc.term_frequency(field, term)).sum()
    }
}

impl FromIterator<(DocId, Document)> for DocumentCollection {
    fn from_iter<I: IntoIterator<Item = (DocId, Document)>>(iter: I) -> Self {
        Self { docs: iter.into_iter().collect() }
    }
}
