// Re-export main components
pub mod api;
pub mod document;
pub mod engine;
pub mod error;
pub mod format;
pub mod graph;
pub mod index;
pub mod probability;
pub mod query;
pub mod ranking;
pub mod scorer;
pub mod spelling;
pub mod storage;
pub mod tokenizer;

// Re-export commonly used types
pub use document::{Document, DocumentSink, DocumentStore, MemoryStore};
pub use engine::{RetrievalModel, SearchEngine, SearchOptions};
pub use error::{Error, Result};
pub use format::{Highlighter, RankedResult};
pub use graph::{DocumentGraph, GraphIndex};
pub use index::{CorpusIndex, InvertedIndex, TermDocumentMatrix};
pub use query::{BooleanOperation, BooleanQuery};
pub use scorer::{QueryPreprocessing, Scorer};
pub use spelling::{NoCorrection, SpellingCorrector, VocabularyCorrector};
pub use storage::SledStore;
pub use tokenizer::{Normalizer, NormalizerConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_workflow() -> Result<()> {
        let engine = SearchEngine::new(SledStore::temporary()?);

        engine.upsert_document(Document::new(
            "1",
            "Rust Programming Language",
            "Rust is a blazingly fast and memory-efficient language",
        ))?;
        engine.upsert_document(Document::new(
            "2",
            "Gardening",
            "Tomatoes need sun, water and patience",
        ))?;
        engine.upsert_document(Document::new("3", "Cooking", "Slow roasted vegetables"))?;

        let options = SearchOptions {
            preprocessing: QueryPreprocessing::Normalized,
            ..Default::default()
        };
        let results = engine.search(RetrievalModel::TfIdf, "fast languages", &options)?;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document.id, "1");
        assert!(results[0].highlighted.is_some());

        let connected = engine.connected_documents("tomatoes")?;
        assert_eq!(connected.len(), 1);

        Ok(())
    }
}
