//! Retrieval models.
//!
//! Every model implements [`Scorer`] and is a pure function of the query and
//! a snapshot of the collection.

use crate::document::Document;
use crate::error::{ensure_query, Result};
use crate::format::{format, Highlighter, RankedResult};
use crate::index::CorpusIndex;
use crate::probability::query_likelihood;
use crate::query::BooleanQuery;
use crate::ranking::{
    binary_cosine, binary_vector, cosine_similarity, inverse_document_frequency, term_frequency,
    tfidf, TermWeights,
};
use crate::spelling::SpellingCorrector;
use crate::tokenizer::{count_terms, raw_terms, Normalizer, NormalizerConfig};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Result cap of the binary-independence model
pub const BINARY_TOP_K: usize = 5;

/// Common capability of all retrieval models
pub trait Scorer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Rank `corpus` against `query`. An empty corpus yields an empty list.
    fn score(&self, query: &str, corpus: &[Document]) -> Result<Vec<RankedResult>>;
}

/// How query and document text become terms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryPreprocessing {
    /// Lowercase whitespace split
    #[default]
    Raw,
    /// The full normalization pipeline, with optional spelling correction
    Normalized,
}

/// Counts query keywords found as substrings of the content
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordScorer;

impl Scorer for KeywordScorer {
    fn name(&self) -> &'static str {
        "keyword"
    }

    fn score(&self, query: &str, corpus: &[Document]) -> Result<Vec<RankedResult>> {
        ensure_query(query)?;
        let keywords = raw_terms(query);

        let results = corpus
            .iter()
            .filter_map(|doc| {
                let content = doc.content.to_lowercase();
                let hits = keywords.iter().filter(|k| content.contains(k.as_str())).count();
                (hits > 0).then(|| RankedResult::new(doc.clone(), hits as f64))
            })
            .collect();

        Ok(format(results, None))
    }
}

/// Cosine similarity between TF-IDF vectors
pub struct TfIdfScorer {
    normalizer: Normalizer,
    preprocessing: QueryPreprocessing,
    corrector: Option<Arc<dyn SpellingCorrector>>,
    highlighter: Option<Highlighter>,
    limit: Option<usize>,
}

impl TfIdfScorer {
    pub fn new(preprocessing: QueryPreprocessing) -> Self {
        Self {
            normalizer: Normalizer::default(),
            preprocessing,
            corrector: None,
            highlighter: Some(Highlighter::default()),
            limit: None,
        }
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Correct query words before normalization (normalized mode only)
    pub fn with_corrector(mut self, corrector: Arc<dyn SpellingCorrector>) -> Self {
        self.corrector = Some(corrector);
        self
    }

    pub fn with_highlighter(mut self, highlighter: Option<Highlighter>) -> Self {
        self.highlighter = highlighter;
        self
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    fn document_terms(&self, doc: &Document) -> Vec<String> {
        match self.preprocessing {
            QueryPreprocessing::Raw => raw_terms(&doc.content),
            QueryPreprocessing::Normalized => self.normalizer.normalize(&doc.content),
        }
    }

    /// Scoring terms plus the surface words used for highlighting
    fn query_terms(&self, query: &str) -> (Vec<String>, Vec<String>) {
        match self.preprocessing {
            QueryPreprocessing::Raw => {
                let terms = raw_terms(query);
                (terms.clone(), terms)
            }
            QueryPreprocessing::Normalized => {
                let words = match &self.corrector {
                    Some(corrector) => self.normalizer.words_corrected(query, corrector.as_ref()),
                    None => self.normalizer.words(query),
                };
                (self.normalizer.stem_all(&words), words)
            }
        }
    }
}

impl Scorer for TfIdfScorer {
    fn name(&self) -> &'static str {
        "tfidf"
    }

    fn score(&self, query: &str, corpus: &[Document]) -> Result<Vec<RankedResult>> {
        ensure_query(query)?;
        if corpus.is_empty() {
            return Ok(Vec::new());
        }

        let doc_terms: Vec<Vec<String>> = corpus.iter().map(|d| self.document_terms(d)).collect();
        let idf = inverse_document_frequency(&doc_terms);
        let doc_vectors: Vec<TermWeights> = doc_terms
            .iter()
            .map(|terms| tfidf(&term_frequency(terms), &idf))
            .collect();

        let (query_terms, highlight_terms) = self.query_terms(query);
        let query_vector = tfidf(&term_frequency(&query_terms), &idf);
        tracing::debug!(terms = ?query_terms, "tf-idf query");

        let results = corpus
            .iter()
            .zip(&doc_vectors)
            .filter_map(|(doc, vector)| {
                let score = cosine_similarity(vector, &query_vector);
                (score > 0.0).then(|| {
                    let mut result = RankedResult::new(doc.clone(), score);
                    result.highlighted = self
                        .highlighter
                        .as_ref()
                        .map(|hl| hl.highlight(&doc.content, &highlight_terms));
                    result
                })
            })
            .collect();

        Ok(format(results, self.limit))
    }
}

/// Cosine similarity between binary incidence vectors
pub struct BinaryIndependenceScorer {
    normalizer: Normalizer,
    limit: Option<usize>,
}

impl BinaryIndependenceScorer {
    pub fn new() -> Self {
        Self {
            normalizer: Normalizer::default(),
            limit: Some(BINARY_TOP_K),
        }
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }
}

impl Default for BinaryIndependenceScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl Scorer for BinaryIndependenceScorer {
    fn name(&self) -> &'static str {
        "binary"
    }

    fn score(&self, query: &str, corpus: &[Document]) -> Result<Vec<RankedResult>> {
        ensure_query(query)?;
        let index = CorpusIndex::build(corpus, &self.normalizer);
        let query_vector = binary_vector(&self.normalizer.unique_terms(query), &index.vocabulary);

        let results = corpus
            .iter()
            .zip(&index.doc_terms)
            .filter_map(|(doc, terms)| {
                let distinct: HashSet<String> = terms.iter().cloned().collect();
                let doc_vector = binary_vector(&distinct, &index.vocabulary);
                let score = binary_cosine(&query_vector, &doc_vector);
                (score > 0.0).then(|| RankedResult::new(doc.clone(), score))
            })
            .collect();

        Ok(format(results, self.limit))
    }
}

/// Flat AND/OR/NOT matching over the term-document matrix
pub struct ExtendedBooleanScorer {
    normalizer: Normalizer,
}

impl ExtendedBooleanScorer {
    pub fn new() -> Self {
        Self {
            normalizer: Normalizer::new(NormalizerConfig::keep_stop_words()),
        }
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Parse the query and bring its operands into index term space.
    ///
    /// An operand that normalizes to nothing keeps its lowercase form, which
    /// never occurs in the matrix.
    pub fn parse(&self, query: &str) -> BooleanQuery {
        let parsed = BooleanQuery::parse(query);
        let normalize = |operands: &[String]| -> Vec<String> {
            operands
                .iter()
                .flat_map(|op| {
                    let terms = self.normalizer.normalize(op);
                    if terms.is_empty() {
                        vec![op.clone()]
                    } else {
                        terms
                    }
                })
                .collect()
        };
        BooleanQuery {
            positive: normalize(&parsed.positive),
            negative: normalize(&parsed.negative),
            operation: parsed.operation,
        }
    }
}

impl Default for ExtendedBooleanScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl Scorer for ExtendedBooleanScorer {
    fn name(&self) -> &'static str {
        "boolean"
    }

    fn score(&self, query: &str, corpus: &[Document]) -> Result<Vec<RankedResult>> {
        ensure_query(query)?;
        let parsed = self.parse(query);
        let index = CorpusIndex::build(corpus, &self.normalizer);
        tracing::debug!(
            positive = ?parsed.positive,
            negative = ?parsed.negative,
            operation = ?parsed.operation,
            "boolean query"
        );

        Ok(corpus
            .iter()
            .enumerate()
            .filter(|(position, _)| parsed.matches(|term| index.matrix.contains(term, *position)))
            .map(|(_, doc)| RankedResult::new(doc.clone(), 1.0))
            .collect())
    }
}

/// Query likelihood over corpus-wide term counts
pub struct ProbabilisticScorer {
    normalizer: Normalizer,
    preprocessing: QueryPreprocessing,
}

impl ProbabilisticScorer {
    pub fn new(preprocessing: QueryPreprocessing) -> Self {
        Self {
            normalizer: Normalizer::default(),
            preprocessing,
        }
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    fn terms(&self, text: &str) -> Vec<String> {
        match self.preprocessing {
            QueryPreprocessing::Raw => raw_terms(text),
            QueryPreprocessing::Normalized => self.normalizer.normalize(text),
        }
    }
}

impl Scorer for ProbabilisticScorer {
    fn name(&self) -> &'static str {
        "probabilistic"
    }

    fn score(&self, query: &str, corpus: &[Document]) -> Result<Vec<RankedResult>> {
        ensure_query(query)?;
        let doc_counts: Vec<HashMap<String, usize>> = corpus
            .iter()
            .map(|doc| count_terms(self.terms(&doc.content)))
            .collect();
        let corpus_total: usize = doc_counts.iter().flat_map(|c| c.values()).sum();
        let query_terms = self.terms(query);

        let results = corpus
            .iter()
            .zip(&doc_counts)
            .filter_map(|(doc, counts)| {
                let score = query_likelihood(&query_terms, counts, corpus_total);
                (score > 0.0).then(|| RankedResult::new(doc.clone(), score))
            })
            .collect();

        Ok(format(results, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::spelling::VocabularyCorrector;

    fn ids(results: &[RankedResult]) -> Vec<&str> {
        results.iter().map(|r| r.document.id.as_str()).collect()
    }

    fn fruit() -> Vec<Document> {
        vec![
            Document::new("1", "doc1", "Fresh apple and ripe mango."),
            Document::new("2", "doc2", "Apple and mango juice."),
            Document::new("3", "doc3", "A mango."),
        ]
    }

    fn languages() -> Vec<Document> {
        vec![
            Document::new("1", "python", "Python is a popular programming language."),
            Document::new("2", "ml", "Machine learning is a subset of AI."),
            Document::new("3", "dl", "Deep learning uses neural networks."),
            Document::new(
                "4",
                "rust",
                "Rust is a systems programming language with no garbage collector.",
            ),
        ]
    }

    #[test]
    fn test_every_model_rejects_empty_query() {
        let scorers: Vec<Box<dyn Scorer>> = vec![
            Box::new(KeywordScorer),
            Box::new(TfIdfScorer::new(QueryPreprocessing::Raw)),
            Box::new(BinaryIndependenceScorer::new()),
            Box::new(ExtendedBooleanScorer::new()),
            Box::new(ProbabilisticScorer::new(QueryPreprocessing::Normalized)),
        ];
        for scorer in &scorers {
            assert!(
                matches!(scorer.score("   ", &fruit()), Err(Error::InvalidQuery(_))),
                "{} accepted a blank query",
                scorer.name()
            );
        }
    }

    #[test]
    fn test_every_model_handles_empty_corpus() -> Result<()> {
        let scorers: Vec<Box<dyn Scorer>> = vec![
            Box::new(KeywordScorer),
            Box::new(TfIdfScorer::new(QueryPreprocessing::Normalized)),
            Box::new(BinaryIndependenceScorer::new()),
            Box::new(ExtendedBooleanScorer::new()),
            Box::new(ProbabilisticScorer::new(QueryPreprocessing::Raw)),
        ];
        for scorer in &scorers {
            assert!(scorer.score("apple", &[])?.is_empty(), "{}", scorer.name());
        }
        Ok(())
    }

    #[test]
    fn test_keyword_counts_substring_hits() -> Result<()> {
        let results = KeywordScorer.score("MANGO juice kiwi", &fruit())?;
        assert_eq!(ids(&results), vec!["2", "1", "3"]);
        assert_eq!(results[0].score, 2.0);
        assert_eq!(results[1].score, 1.0);

        // substring containment, not whole words
        let results = KeywordScorer.score("ang", &fruit())?;
        assert_eq!(results.len(), 3);

        assert!(KeywordScorer.score("kiwi", &fruit())?.is_empty());
        Ok(())
    }

    #[test]
    fn test_tfidf_ranks_and_highlights() -> Result<()> {
        let scorer = TfIdfScorer::new(QueryPreprocessing::Normalized);
        let results = scorer.score("programming languages", &languages())?;

        assert_eq!(results.len(), 2);
        assert!(ids(&results).contains(&"1"));
        assert!(ids(&results).contains(&"4"));
        assert!(results.iter().all(|r| r.score > 0.0));
        assert!(results[0].score >= results[1].score);

        let python = results.iter().find(|r| r.document.id == "1").unwrap();
        let highlighted = python.highlighted.as_deref().unwrap();
        assert!(highlighted.contains(r#"<span class="highlight">programming</span>"#));
        Ok(())
    }

    #[test]
    fn test_tfidf_is_deterministic() -> Result<()> {
        let scorer = TfIdfScorer::new(QueryPreprocessing::Normalized);
        let first = scorer.score("learning networks language", &languages())?;
        for _ in 0..5 {
            assert_eq!(scorer.score("learning networks language", &languages())?, first);
        }
        Ok(())
    }

    #[test]
    fn test_tfidf_raw_mode_is_exact() -> Result<()> {
        let scorer = TfIdfScorer::new(QueryPreprocessing::Raw).with_highlighter(None);
        // raw mode keeps punctuation, so "networks." never equals "networks"
        assert!(scorer.score("networks", &languages())?.is_empty());

        let results = scorer.score("Deep", &languages())?;
        assert_eq!(ids(&results), vec!["3"]);
        assert!(results[0].highlighted.is_none());
        Ok(())
    }

    #[test]
    fn test_tfidf_spelling_correction() -> Result<()> {
        let docs = languages();
        let dict = VocabularyCorrector::from_text(docs.iter().map(|d| d.content.as_str()));
        let scorer =
            TfIdfScorer::new(QueryPreprocessing::Normalized).with_corrector(Arc::new(dict));

        let results = scorer.score("nueral netwroks", &docs)?;
        assert_eq!(ids(&results), vec!["3"]);
        Ok(())
    }

    #[test]
    fn test_binary_model_caps_results() -> Result<()> {
        let corpus: Vec<Document> = (0..8)
            .map(|i| Document::new(i.to_string(), "", format!("shared token number{}", i)))
            .collect();
        let results = BinaryIndependenceScorer::new().score("shared", &corpus)?;
        assert_eq!(results.len(), BINARY_TOP_K);
        // equal scores keep collection order
        assert_eq!(ids(&results), vec!["0", "1", "2", "3", "4"]);
        Ok(())
    }

    #[test]
    fn test_binary_model_scores() -> Result<()> {
        let results = BinaryIndependenceScorer::new().score("mango juice", &fruit())?;
        assert_eq!(results[0].document.id, "2");
        // doc2 has {appl, mango, juic}; query {mango, juic}
        assert!((results[0].score - 2.0 / (2f64.sqrt() * 3f64.sqrt())).abs() < 1e-12);
        assert_eq!(results.len(), 3);

        assert!(BinaryIndependenceScorer::new().score("kiwi", &fruit())?.is_empty());
        Ok(())
    }

    #[test]
    fn test_extended_boolean_and_not() -> Result<()> {
        let results = ExtendedBooleanScorer::new().score("apple and mango not juice", &fruit())?;
        assert_eq!(ids(&results), vec!["1"]);
        assert_eq!(results[0].score, 1.0);
        Ok(())
    }

    #[test]
    fn test_extended_boolean_dangling_not() -> Result<()> {
        let results = ExtendedBooleanScorer::new().score("apple not", &fruit())?;
        assert_eq!(ids(&results), vec!["1", "2"]);
        Ok(())
    }

    #[test]
    fn test_extended_boolean_or_keeps_corpus_order() -> Result<()> {
        let results = ExtendedBooleanScorer::new().score("juice or fresh", &fruit())?;
        assert_eq!(ids(&results), vec!["1", "2"]);

        let results = ExtendedBooleanScorer::new().score("mango or kiwi not apples", &fruit())?;
        assert_eq!(ids(&results), vec!["3"]);
        Ok(())
    }

    #[test]
    fn test_extended_boolean_unmatched_operand() -> Result<()> {
        let scorer = ExtendedBooleanScorer::new();
        assert!(scorer.score("???", &fruit())?.is_empty());
        assert!(scorer.score("apple and ???", &fruit())?.is_empty());
        assert_eq!(ids(&scorer.score("mango or ???", &fruit())?), vec!["1", "2", "3"]);
        assert_eq!(ids(&scorer.score("mango not ???", &fruit())?), vec!["1", "2", "3"]);

        let config = NormalizerConfig {
            min_token_len: 3,
            ..NormalizerConfig::keep_stop_words()
        };
        let short = ExtendedBooleanScorer::new().with_normalizer(Normalizer::new(config));
        assert_eq!(short.parse("a and mango").positive, vec!["a", "mango"]);
        assert!(short.score("a and mango", &fruit())?.is_empty());
        Ok(())
    }

    #[test]
    fn test_probabilistic_ranking() -> Result<()> {
        let scorer = ProbabilisticScorer::new(QueryPreprocessing::Normalized);
        let results = scorer.score("What is Python?", &languages())?;
        assert_eq!(ids(&results), vec!["1"]);

        let results = scorer.score("learning", &languages())?;
        assert_eq!(ids(&results), vec!["2", "3"]);
        assert_eq!(results[0].score, results[1].score);
        Ok(())
    }
}
