use crate::document::{Document, DocumentSink, DocumentStore};
use crate::engine::{RetrievalModel, SearchEngine, SearchOptions};
use crate::error::Error;
use crate::format::RankedResult;
use crate::query::BooleanOperation;
use crate::scorer::QueryPreprocessing;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// ========== Request/Response Types ==========

#[derive(Debug, Deserialize)]
pub struct InsertDocumentRequest {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDocumentRequest {
    #[serde(default)]
    pub title: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct BatchInsertRequest {
    pub documents: Vec<InsertDocumentRequest>,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub model: Option<RetrievalModel>,
    #[serde(default)]
    pub preprocess: Option<bool>,
    #[serde(default)]
    pub correct_spelling: Option<bool>,
    #[serde(default)]
    pub highlight: Option<bool>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl SearchRequest {
    fn options(&self) -> SearchOptions {
        let defaults = SearchOptions::default();
        SearchOptions {
            preprocessing: match self.preprocess {
                Some(true) => QueryPreprocessing::Normalized,
                Some(false) => QueryPreprocessing::Raw,
                None => defaults.preprocessing,
            },
            correct_spelling: self.correct_spelling.unwrap_or(defaults.correct_spelling),
            limit: self.limit.or(defaults.limit),
            highlight: self.highlight.unwrap_or(defaults.highlight),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ProximalRequest {
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct LookupRequest {
    pub query: String,
    #[serde(default)]
    pub mode: Option<BooleanOperation>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub model: RetrievalModel,
    pub total: usize,
    pub results: Vec<RankedResult>,
}

#[derive(Debug, Serialize)]
pub struct DocumentListResponse {
    pub query: String,
    pub total: usize,
    pub documents: Vec<Document>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }
}

impl ApiResponse<()> {
    fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
        }
    }
}

// ========== Error Handling ==========

struct AppError(Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        let message = self.0.to_string();
        if status.is_server_error() {
            tracing::error!("API error: {}", message);
        }

        (status, Json(ApiResponse::error(message))).into_response()
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

type Engine<S> = State<Arc<SearchEngine<S>>>;

// ========== Handlers ==========

async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::success("OK"))
}

async fn insert_document<S>(
    State(engine): Engine<S>,
    Json(req): Json<InsertDocumentRequest>,
) -> Result<impl IntoResponse, AppError>
where
    S: DocumentStore + DocumentSink,
{
    engine.upsert_document(Document::new(req.id, req.title, req.content))?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Document inserted successfully")),
    ))
}

async fn batch_insert<S>(
    State(engine): Engine<S>,
    Json(req): Json<BatchInsertRequest>,
) -> Result<impl IntoResponse, AppError>
where
    S: DocumentStore + DocumentSink,
{
    let docs = req
        .documents
        .into_iter()
        .map(|d| Document::new(d.id, d.title, d.content))
        .collect();
    engine.batch_insert(docs)?;
    Ok(Json(ApiResponse::success("Documents inserted successfully")))
}

async fn get_document<S>(
    State(engine): Engine<S>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError>
where
    S: DocumentStore,
{
    Ok(Json(ApiResponse::success(engine.get_document(&id)?)))
}

async fn update_document<S>(
    State(engine): Engine<S>,
    Path(id): Path<String>,
    Json(req): Json<UpdateDocumentRequest>,
) -> Result<impl IntoResponse, AppError>
where
    S: DocumentStore + DocumentSink,
{
    engine.upsert_document(Document::new(id, req.title, req.content))?;
    Ok(Json(ApiResponse::success("Document updated successfully")))
}

async fn delete_document<S>(
    State(engine): Engine<S>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError>
where
    S: DocumentStore + DocumentSink,
{
    if engine.delete_document(&id)? {
        Ok(Json(ApiResponse::success("Document deleted successfully")))
    } else {
        Err(AppError(Error::NotFound(id)))
    }
}

async fn search_documents<S>(
    State(engine): Engine<S>,
    Query(req): Query<SearchRequest>,
) -> Result<impl IntoResponse, AppError>
where
    S: DocumentStore,
{
    let model = req.model.unwrap_or_default();
    let results = engine.search(model, &req.query, &req.options())?;

    Ok(Json(ApiResponse::success(SearchResponse {
        total: results.len(),
        query: req.query,
        model,
        results,
    })))
}

async fn search_proximal<S>(
    State(engine): Engine<S>,
    Query(req): Query<ProximalRequest>,
) -> Result<impl IntoResponse, AppError>
where
    S: DocumentStore,
{
    let documents = engine.connected_documents(&req.query)?;
    Ok(Json(ApiResponse::success(DocumentListResponse {
        total: documents.len(),
        query: req.query,
        documents,
    })))
}

async fn lookup<S>(
    State(engine): Engine<S>,
    Query(req): Query<LookupRequest>,
) -> Result<impl IntoResponse, AppError>
where
    S: DocumentStore,
{
    let documents = engine.lookup(&req.query, req.mode.unwrap_or(BooleanOperation::Or))?;
    Ok(Json(ApiResponse::success(DocumentListResponse {
        total: documents.len(),
        query: req.query,
        documents,
    })))
}

async fn get_stats<S>(State(engine): Engine<S>) -> Result<impl IntoResponse, AppError>
where
    S: DocumentStore,
{
    Ok(Json(ApiResponse::success(engine.stats()?)))
}

// ========== Router ==========

pub fn create_router<S>(engine: Arc<SearchEngine<S>>) -> Router
where
    S: DocumentStore + DocumentSink + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .route("/documents", post(insert_document::<S>))
        .route("/documents/batch", post(batch_insert::<S>))
        .route(
            "/documents/:id",
            get(get_document::<S>)
                .put(update_document::<S>)
                .delete(delete_document::<S>),
        )
        .route("/search", get(search_documents::<S>))
        .route("/search/proximal", get(search_proximal::<S>))
        .route("/lookup", get(lookup::<S>))
        .route("/stats", get(get_stats::<S>))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(engine)
}
