use crate::document::{Document, DocumentSink, DocumentStore};
use crate::error::{ensure_query, Result};
use crate::format::{Highlighter, RankedResult};
use crate::graph::GraphIndex;
use crate::index::{CorpusIndex, IndexStats};
use crate::query::BooleanOperation;
use crate::scorer::{
    BinaryIndependenceScorer, ExtendedBooleanScorer, KeywordScorer, ProbabilisticScorer,
    QueryPreprocessing, Scorer, TfIdfScorer,
};
use crate::spelling::{SpellingCorrector, VocabularyCorrector};
use crate::tokenizer::{Normalizer, NormalizerConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Retrieval model selected by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalModel {
    Keyword,
    #[default]
    TfIdf,
    #[serde(alias = "bim")]
    Binary,
    Boolean,
    Probabilistic,
}

impl RetrievalModel {
    pub const ALL: [RetrievalModel; 5] = [
        RetrievalModel::Keyword,
        RetrievalModel::TfIdf,
        RetrievalModel::Binary,
        RetrievalModel::Boolean,
        RetrievalModel::Probabilistic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RetrievalModel::Keyword => "keyword",
            RetrievalModel::TfIdf => "tfidf",
            RetrievalModel::Binary => "binary",
            RetrievalModel::Boolean => "boolean",
            RetrievalModel::Probabilistic => "probabilistic",
        }
    }
}

impl fmt::Display for RetrievalModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RetrievalModel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "keyword" => Ok(RetrievalModel::Keyword),
            "tfidf" | "tf-idf" => Ok(RetrievalModel::TfIdf),
            "binary" | "bim" => Ok(RetrievalModel::Binary),
            "boolean" => Ok(RetrievalModel::Boolean),
            "probabilistic" => Ok(RetrievalModel::Probabilistic),
            other => Err(format!("unknown retrieval model '{}'", other)),
        }
    }
}

/// Search options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    pub preprocessing: QueryPreprocessing,
    /// Correct query words before normalization
    pub correct_spelling: bool,
    pub limit: Option<usize>,
    /// Attach highlighted content (TF-IDF only)
    pub highlight: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            preprocessing: QueryPreprocessing::Raw,
            correct_spelling: false,
            limit: None,
            highlight: true,
        }
    }
}

/// Retrieval engine over a document store
pub struct SearchEngine<S> {
    store: S,
    normalizer_config: NormalizerConfig,
    corrector: Option<Arc<dyn SpellingCorrector>>,
    graph: GraphIndex,
}

impl<S: DocumentStore> SearchEngine<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, NormalizerConfig::default())
    }

    pub fn with_config(store: S, normalizer_config: NormalizerConfig) -> Self {
        Self {
            store,
            normalizer_config,
            corrector: None,
            graph: GraphIndex::new(Normalizer::new(normalizer_config)),
        }
    }

    /// Use `corrector` instead of a dictionary built from the collection
    pub fn with_corrector(mut self, corrector: Arc<dyn SpellingCorrector>) -> Self {
        self.corrector = Some(corrector);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn graph(&self) -> &GraphIndex {
        &self.graph
    }

    fn normalizer(&self) -> Normalizer {
        Normalizer::new(self.normalizer_config)
    }

    fn corrector_for(&self, corpus: &[Document]) -> Arc<dyn SpellingCorrector> {
        match &self.corrector {
            Some(corrector) => Arc::clone(corrector),
            None => Arc::new(VocabularyCorrector::from_text(
                corpus.iter().map(|d| d.content.as_str()),
            )),
        }
    }

    /// Build the scorer for `model`
    pub fn scorer(
        &self,
        model: RetrievalModel,
        options: &SearchOptions,
        corpus: &[Document],
    ) -> Box<dyn Scorer> {
        match model {
            RetrievalModel::Keyword => Box::new(KeywordScorer),
            RetrievalModel::TfIdf => {
                let mut scorer = TfIdfScorer::new(options.preprocessing)
                    .with_normalizer(self.normalizer())
                    .with_highlighter(options.highlight.then(Highlighter::default));
                if options.correct_spelling {
                    scorer = scorer.with_corrector(self.corrector_for(corpus));
                }
                Box::new(scorer)
            }
            RetrievalModel::Binary => {
                Box::new(BinaryIndependenceScorer::new().with_normalizer(self.normalizer()))
            }
            RetrievalModel::Boolean => {
                let config = NormalizerConfig {
                    remove_stop_words: false,
                    ..self.normalizer_config
                };
                Box::new(ExtendedBooleanScorer::new().with_normalizer(Normalizer::new(config)))
            }
            RetrievalModel::Probabilistic => Box::new(
                ProbabilisticScorer::new(options.preprocessing).with_normalizer(self.normalizer()),
            ),
        }
    }

    /// Rank the current collection with the chosen model
    pub fn search(
        &self,
        model: RetrievalModel,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<RankedResult>> {
        ensure_query(query)?;
        let corpus = self.store.list()?;
        let scorer = self.scorer(model, options, &corpus);

        let mut results = scorer.score(query, &corpus)?;
        if let Some(limit) = options.limit {
            results.truncate(limit);
        }

        tracing::debug!(
            model = scorer.name(),
            documents = corpus.len(),
            results = results.len(),
            "search"
        );
        Ok(results)
    }

    /// Unranked documents adjacent to any query term in the document graph
    pub fn connected_documents(&self, query: &str) -> Result<Vec<Document>> {
        self.graph.connected_documents(&self.store, query)
    }

    /// Inverted-index lookup of normalized query terms
    pub fn lookup(&self, query: &str, mode: BooleanOperation) -> Result<Vec<Document>> {
        ensure_query(query)?;
        let corpus = self.store.list()?;
        let normalizer = self.normalizer();
        let index = CorpusIndex::build(&corpus, &normalizer);
        let terms = normalizer.normalize(query);

        let ids = match mode {
            BooleanOperation::And => index.inverted.intersection(&terms),
            BooleanOperation::Or => index.inverted.union(&terms),
        };

        let by_id: HashMap<&str, &Document> = corpus.iter().map(|d| (d.id.as_str(), d)).collect();
        Ok(ids
            .iter()
            .filter_map(|id| by_id.get(id.as_str()).map(|d| (*d).clone()))
            .collect())
    }

    pub fn get_document(&self, id: &str) -> Result<Document> {
        self.store.get(id)
    }

    /// Index statistics of the current collection
    pub fn stats(&self) -> Result<IndexStats> {
        let corpus = self.store.list()?;
        Ok(CorpusIndex::build(&corpus, &self.normalizer()).inverted.stats())
    }
}

impl<S: DocumentStore + DocumentSink> SearchEngine<S> {
    /// Insert or replace a document and invalidate the graph
    pub fn upsert_document(&self, doc: Document) -> Result<()> {
        let result = self.store.upsert(doc);
        self.graph.invalidate();
        result
    }

    /// Delete a document and invalidate the graph
    pub fn delete_document(&self, id: &str) -> Result<bool> {
        let result = self.store.delete(id);
        self.graph.invalidate();
        result
    }

    pub fn batch_insert(&self, docs: Vec<Document>) -> Result<()> {
        let count = docs.len();
        let result = docs.into_iter().try_for_each(|doc| self.store.upsert(doc));
        self.graph.invalidate();
        tracing::info!(documents = count, "batch insert");
        result
    }
}
