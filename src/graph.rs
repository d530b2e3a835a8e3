use crate::document::{Document, DocumentStore};
use crate::error::{ensure_query, Result};
use crate::tokenizer::Normalizer;
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Term -> documents adjacency over one collection snapshot
#[derive(Debug, Clone, Default)]
pub struct DocumentGraph {
    documents: Vec<Document>,
    edges: HashMap<String, Vec<usize>>,
}

impl DocumentGraph {
    pub fn build(documents: Vec<Document>, normalizer: &Normalizer) -> Self {
        let mut graph = Self {
            documents: Vec::new(),
            edges: HashMap::new(),
        };
        for (position, doc) in documents.iter().enumerate() {
            for term in normalizer.normalize(&doc.content) {
                graph.add_edge(term, position);
            }
        }
        graph.documents = documents;
        graph
    }

    /// Link `term` to the document at `position`
    pub fn add_edge(&mut self, term: String, position: usize) {
        let adjacent = self.edges.entry(term).or_default();
        if adjacent.last() != Some(&position) {
            adjacent.push(position);
        }
    }

    /// Documents adjacent to any of `terms`, each once, in collection order
    pub fn connected_documents(&self, terms: &[String]) -> Vec<Document> {
        let positions: BTreeSet<usize> = terms
            .iter()
            .filter_map(|term| self.edges.get(term))
            .flatten()
            .copied()
            .collect();
        positions
            .into_iter()
            .filter_map(|p| self.documents.get(p).cloned())
            .collect()
    }

    pub fn num_documents(&self) -> usize {
        self.documents.len()
    }

    pub fn num_terms(&self) -> usize {
        self.edges.len()
    }
}

#[derive(Debug, Default)]
struct GraphState {
    built: bool,
    rebuilds: u64,
    graph: Arc<DocumentGraph>,
}

/// Lazily built [`DocumentGraph`] with an explicit invalidation flag.
///
/// Rebuilds run under the state lock, so readers only ever clone a finished
/// graph, and an invalidation issued during a rebuild lands after it.
#[derive(Debug)]
pub struct GraphIndex {
    normalizer: Normalizer,
    state: Mutex<GraphState>,
}

impl GraphIndex {
    pub fn new(normalizer: Normalizer) -> Self {
        Self {
            normalizer,
            state: Mutex::new(GraphState::default()),
        }
    }

    /// Force a rebuild on the next query. Call after any document mutation.
    pub fn invalidate(&self) {
        let mut state = self.state.lock();
        if state.built {
            tracing::info!("document graph invalidated");
        }
        state.built = false;
    }

    pub fn is_built(&self) -> bool {
        self.state.lock().built
    }

    /// Number of completed rebuilds
    pub fn rebuilds(&self) -> u64 {
        self.state.lock().rebuilds
    }

    /// Current graph, rebuilt from `store` first if invalidated.
    ///
    /// A store failure leaves the graph unbuilt and is returned as is.
    pub fn snapshot<S>(&self, store: &S) -> Result<Arc<DocumentGraph>>
    where
        S: DocumentStore + ?Sized,
    {
        let mut state = self.state.lock();
        if !state.built {
            let documents = store.list()?;
            let graph = DocumentGraph::build(documents, &self.normalizer);
            tracing::info!(
                documents = graph.num_documents(),
                terms = graph.num_terms(),
                "rebuilt document graph"
            );
            state.graph = Arc::new(graph);
            state.built = true;
            state.rebuilds += 1;
        }
        Ok(Arc::clone(&state.graph))
    }

    /// Documents touching any normalized query term
    pub fn connected_documents<S>(&self, store: &S, query: &str) -> Result<Vec<Document>>
    where
        S: DocumentStore + ?Sized,
    {
        ensure_query(query)?;
        let terms = self.normalizer.normalize(query);
        let graph = self.snapshot(store)?;
        Ok(graph.connected_documents(&terms))
    }
}

impl Default for GraphIndex {
    fn default() -> Self {
        Self::new(Normalizer::default())
    }
}
