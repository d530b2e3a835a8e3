use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use irkit::api::create_router;
use irkit::document::{load_json, load_text_dir};
use irkit::{
    BooleanOperation, Document, MemoryStore, QueryPreprocessing, RetrievalModel, SearchEngine,
    SearchOptions, SledStore,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

// CLI Arguments
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Small-collection information retrieval engine",
    long_about = None
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank documents with one of the retrieval models
    Search {
        #[arg(short, long)]
        query: String,

        /// keyword, tfidf, binary, boolean or probabilistic
        #[arg(short, long, default_value = "tfidf")]
        model: RetrievalModel,

        /// Directory of .txt files or a JSON array of documents
        #[arg(short, long, default_value = "documents")]
        docs: PathBuf,

        /// Run the query through the full normalization pipeline
        #[arg(long)]
        preprocess: bool,

        /// Correct query spelling against the collection vocabulary
        #[arg(long)]
        correct_spelling: bool,

        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// List documents connected to any query term in the document graph
    Proximal {
        #[arg(short, long)]
        query: String,

        #[arg(short, long, default_value = "documents")]
        docs: PathBuf,
    },
    /// Inverted-index lookup without ranking
    Lookup {
        #[arg(short, long)]
        query: String,

        #[arg(short, long, default_value = "documents")]
        docs: PathBuf,

        /// Require every term instead of any term
        #[arg(long)]
        all: bool,
    },
    /// Serve the HTTP API over a sled database
    Serve {
        #[arg(short, long, default_value = "127.0.0.1:3000")]
        addr: String,

        #[arg(long, default_value = "irkit.db")]
        db: PathBuf,

        /// Documents to load into the database before serving
        #[arg(short, long)]
        docs: Option<PathBuf>,
    },
}

// Document loading
fn load_documents(path: &Path) -> Result<Vec<Document>> {
    if path.is_dir() {
        load_text_dir(path).with_context(|| format!("Failed to read directory {}", path.display()))
    } else {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        load_json(&text).with_context(|| format!("Failed to parse {}", path.display()))
    }
}

fn memory_engine(path: &Path) -> Result<SearchEngine<MemoryStore>> {
    let start = Instant::now();
    let docs = load_documents(path)?;
    println!("Loaded {} documents in {:?}", docs.len(), start.elapsed());
    Ok(SearchEngine::new(MemoryStore::with_documents(docs)))
}

fn print_documents(docs: &[Document]) {
    for doc in docs {
        println!("{}\t{}", doc.id, doc.title);
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("irkit=info")),
        )
        .init();

    let args = Args::parse();

    match args.command {
        Command::Search {
            query,
            model,
            docs,
            preprocess,
            correct_spelling,
            limit,
        } => {
            let engine = memory_engine(&docs)?;
            let options = SearchOptions {
                preprocessing: if preprocess {
                    QueryPreprocessing::Normalized
                } else {
                    QueryPreprocessing::Raw
                },
                correct_spelling,
                limit,
                highlight: false,
            };

            let start = Instant::now();
            let results = engine.search(model, &query, &options)?;
            println!(
                "{} search found {} documents in {:?}\n",
                model,
                results.len(),
                start.elapsed()
            );
            for result in results {
                println!("{:.4}\t{}\t{}", result.score, result.document.id, result.document.title);
            }
        }
        Command::Proximal { query, docs } => {
            let engine = memory_engine(&docs)?;
            let found = engine.connected_documents(&query)?;
            println!("Found {} connected documents\n", found.len());
            print_documents(&found);
        }
        Command::Lookup { query, docs, all } => {
            let engine = memory_engine(&docs)?;
            let mode = if all {
                BooleanOperation::And
            } else {
                BooleanOperation::Or
            };
            let found = engine.lookup(&query, mode)?;
            println!("Found {} documents\n", found.len());
            print_documents(&found);
        }
        Command::Serve { addr, db, docs } => {
            let store = SledStore::open(&db)
                .with_context(|| format!("Failed to open database {}", db.display()))?;
            let engine = SearchEngine::new(store);
            if let Some(path) = docs {
                let loaded = load_documents(&path)?;
                let count = loaded.len();
                engine.batch_insert(loaded)?;
                engine.store().flush()?;
                tracing::info!(documents = count, "loaded documents");
            }
            tracing::info!(
                documents = engine.store().count()?,
                "starting irkit {}",
                irkit::VERSION
            );

            let app = create_router(Arc::new(engine));
            let runtime = tokio::runtime::Runtime::new().context("Failed to start runtime")?;
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind(&addr)
                    .await
                    .with_context(|| format!("Failed to bind {}", addr))?;
                tracing::info!("listening on {}", addr);
                axum::serve(listener, app).await.context("Server error")
            })?;
        }
    }

    Ok(())
}
