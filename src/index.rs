use crate::document::Document;
use crate::tokenizer::Normalizer;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// Inverted index: term -> documents containing it
#[derive(Debug, Clone, Default)]
pub struct InvertedIndex {
    index: HashMap<String, BTreeSet<usize>>,
    doc_ids: Vec<String>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the next document of the collection
    pub fn add_document(&mut self, doc_id: &str, terms: &[String]) {
        let position = self.doc_ids.len();
        self.doc_ids.push(doc_id.to_string());
        for term in terms {
            self.index.entry(term.clone()).or_default().insert(position);
        }
    }

    fn ids(&self, positions: impl IntoIterator<Item = usize>) -> Vec<String> {
        positions
            .into_iter()
            .map(|p| self.doc_ids[p].clone())
            .collect()
    }

    /// Positions of documents containing `term`, in collection order
    pub fn positions(&self, term: &str) -> Vec<usize> {
        self.index
            .get(term)
            .map(|docs| docs.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Ids of documents containing `term`
    pub fn documents_with(&self, term: &str) -> Vec<String> {
        self.ids(self.positions(term))
    }

    /// Number of documents containing a term
    pub fn doc_frequency(&self, term: &str) -> usize {
        self.index.get(term).map_or(0, |docs| docs.len())
    }

    /// Total number of indexed documents
    pub fn total_documents(&self) -> usize {
        self.doc_ids.len()
    }

    /// Documents matching ALL terms (AND)
    pub fn intersection(&self, terms: &[String]) -> Vec<String> {
        if terms.is_empty() {
            return Vec::new();
        }

        let mut result: Option<BTreeSet<usize>> = None;
        for term in terms {
            let Some(docs) = self.index.get(term) else {
                return Vec::new();
            };
            result = Some(match result {
                None => docs.clone(),
                Some(r) => r.intersection(docs).copied().collect(),
            });
        }

        self.ids(result.unwrap_or_default())
    }

    /// Documents matching ANY term (OR)
    pub fn union(&self, terms: &[String]) -> Vec<String> {
        let mut result = BTreeSet::new();
        for term in terms {
            if let Some(docs) = self.index.get(term) {
                result.extend(docs.iter().copied());
            }
        }
        self.ids(result)
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            total_documents: self.doc_ids.len(),
            total_terms: self.index.len(),
            avg_docs_per_term: if self.index.is_empty() {
                0.0
            } else {
                self.index.values().map(|v| v.len()).sum::<usize>() as f64 / self.index.len() as f64
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexStats {
    pub total_documents: usize,
    pub total_terms: usize,
    pub avg_docs_per_term: f64,
}

/// Term -> presence flags, one per document position.
///
/// Every row has exactly `num_docs` entries.
#[derive(Debug, Clone, Default)]
pub struct TermDocumentMatrix {
    rows: HashMap<String, Vec<u8>>,
    num_docs: usize,
}

impl TermDocumentMatrix {
    pub fn build(doc_terms: &[Vec<String>]) -> Self {
        let num_docs = doc_terms.len();
        let mut rows: HashMap<String, Vec<u8>> = HashMap::new();
        for (position, terms) in doc_terms.iter().enumerate() {
            for term in terms {
                rows.entry(term.clone()).or_insert_with(|| vec![0; num_docs])[position] = 1;
            }
        }
        Self { rows, num_docs }
    }

    pub fn row(&self, term: &str) -> Option<&[u8]> {
        self.rows.get(term).map(Vec::as_slice)
    }

    /// Whether the document at `position` contains `term`
    pub fn contains(&self, term: &str, position: usize) -> bool {
        self.row(term)
            .and_then(|row| row.get(position))
            .map_or(false, |flag| *flag == 1)
    }

    pub fn num_docs(&self) -> usize {
        self.num_docs
    }

    pub fn num_terms(&self) -> usize {
        self.rows.len()
    }
}

/// All index structures for one snapshot of the collection.
///
/// Every structure is derived from the same normalized term sequences.
#[derive(Debug, Clone)]
pub struct CorpusIndex {
    pub doc_terms: Vec<Vec<String>>,
    pub inverted: InvertedIndex,
    pub matrix: TermDocumentMatrix,
    /// Distinct terms of the collection, sorted
    pub vocabulary: Vec<String>,
}

impl CorpusIndex {
    /// Normalize every document once and build the structures
    pub fn build(documents: &[Document], normalizer: &Normalizer) -> Self {
        let doc_terms: Vec<Vec<String>> = documents
            .iter()
            .map(|doc| normalizer.normalize(&doc.content))
            .collect();
        Self::from_terms(documents, doc_terms)
    }

    pub fn from_terms(documents: &[Document], doc_terms: Vec<Vec<String>>) -> Self {
        let mut inverted = InvertedIndex::new();
        for (doc, terms) in documents.iter().zip(&doc_terms) {
            inverted.add_document(&doc.id, terms);
        }

        let matrix = TermDocumentMatrix::build(&doc_terms);

        let vocabulary: Vec<String> = doc_terms
            .iter()
            .flatten()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        tracing::debug!(
            documents = documents.len(),
            terms = vocabulary.len(),
            "built corpus index"
        );

        Self {
            doc_terms,
            inverted,
            matrix,
            vocabulary,
        }
    }
}
