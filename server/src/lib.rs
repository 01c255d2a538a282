use anyhow::Result;
use axum::{extract::{Path, Query, State}, http::HeaderMap, routing::{get, post}, Json, Router};
use docsearch_core::{CachingSource, CorpusIndex, DirectorySource, IndexStats, Query as SearchQuery, QueryEngine, SearchResult, TextSource};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod errors;

pub use errors::ApiError;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub docs_dir: PathBuf,
    pub extension: String,
    pub cache_capacity: usize,
    pub admin_token: Option<String>,
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
}

#[derive(Deserialize)]
pub struct AutocompleteParams {
    pub q: String,
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchResult>,
}

#[derive(Serialize)]
pub struct AutocompleteResponse {
    pub query: String,
    pub suggestions: Vec<String>,
}

#[derive(Serialize)]
pub struct DocResponse {
    pub file_name: String,
    pub text: String,
}

/// A built index together with the text source it was built from.
pub struct Snapshot {
    pub corpus: CorpusIndex,
    pub source: CachingSource<DirectorySource>,
}

impl Snapshot {
    pub fn load(config: &AppConfig) -> Result<Self> {
        let source = CachingSource::new(
            DirectorySource::new(&config.docs_dir, &config.extension),
            config.cache_capacity,
        );
        let corpus = CorpusIndex::from_source(&source)?;
        Ok(Self { corpus, source })
    }

    fn engine(&self) -> QueryEngine<'_, CachingSource<DirectorySource>> {
        QueryEngine::new(&self.corpus, &self.source)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    snapshot: Arc<RwLock<Arc<Snapshot>>>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self> {
        let snapshot = Snapshot::load(&config)?;
        Ok(Self { config: Arc::new(config), snapshot: Arc::new(RwLock::new(Arc::new(snapshot))) })
    }

    /// Current snapshot; the lock is released before the caller uses it.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.read().clone()
    }

    fn replace(&self, snapshot: Snapshot) {
        *self.snapshot.write() = Arc::new(snapshot);
    }
}

pub fn build_app(config: AppConfig) -> Result<Router> {
    let app_state = AppState::new(config)?;

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/alternative_search", get(alternative_search_handler))
        .route("/autocomplete", get(autocomplete_handler))
        .route("/list_docs", get(list_docs_handler))
        .route("/docs/:name", get(doc_handler))
        .route("/stats", get(stats_handler))
        .route("/index/rebuild", post(rebuild_handler))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);
    Ok(app)
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Result<Json<SearchResponse>, ApiError> {
    let start = std::time::Instant::now();
    let query = SearchQuery::parse(&params.q)?;
    let snapshot = state.snapshot();
    let results = run_blocking(move || snapshot.engine().search(&query)).await?;
    Ok(Json(SearchResponse { query: params.q, took_s: start.elapsed().as_secs_f64(), total_hits: results.len(), results }))
}

pub async fn alternative_search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Result<Json<SearchResponse>, ApiError> {
    let start = std::time::Instant::now();
    let query = SearchQuery::parse(&params.q)?;
    let snapshot = state.snapshot();
    let results = run_blocking(move || snapshot.engine().alternative_search(&query)).await?;
    Ok(Json(SearchResponse { query: params.q, took_s: start.elapsed().as_secs_f64(), total_hits: results.len(), results }))
}

/// Snippet extraction reads document files, so searches run on the blocking pool.
async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| ApiError::Internal(e.to_string()))
}

pub async fn autocomplete_handler(State(state): State<AppState>, Query(params): Query<AutocompleteParams>) -> Json<AutocompleteResponse> {
    let snapshot = state.snapshot();
    let mut suggestions = snapshot.engine().autocomplete(&params.q);
    if let Some(limit) = params.limit {
        suggestions.truncate(limit);
    }
    Json(AutocompleteResponse { query: params.q, suggestions })
}

pub async fn list_docs_handler(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.snapshot().corpus.documents().to_vec())
}

pub async fn doc_handler(State(state): State<AppState>, Path(name): Path<String>) -> Result<Json<DocResponse>, ApiError> {
    let snapshot = state.snapshot();
    if !snapshot.corpus.contains_document(&name) {
        return Err(ApiError::NotFound(format!("document not indexed: {name}")));
    }
    let text = snapshot.source.extract_text(&name)?;
    Ok(Json(DocResponse { file_name: name, text }))
}

pub async fn stats_handler(State(state): State<AppState>) -> Json<IndexStats> {
    Json(state.snapshot().corpus.stats())
}

/// Rebuild from the documents directory and swap the new snapshot in.
async fn rebuild_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<IndexStats>, ApiError> {
    authorize(&state, &headers)?;
    let config = state.config.clone();
    let snapshot = run_blocking(move || Snapshot::load(&config)).await??;
    let stats = snapshot.corpus.stats();
    state.replace(snapshot);
    tracing::info!(documents = stats.documents, "index rebuilt");
    Ok(Json(stats))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let required = match &state.config.admin_token {
        Some(t) => t,
        None => return Err(ApiError::Unauthorized("ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err(ApiError::Unauthorized("invalid admin token".into()))
    }
}
