use anyhow::Result;
use axum::{extract::{Query, State}, http::StatusCode, routing::{get, post}, Json, Router};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer, AllowOrigin};
use tower_http::trace::TraceLayer;
use wikisearch_core::persist::IndexPaths;
use wikisearch_core::tokenizer::{tokenize, tokenize_unstemmed, tokenize_words};
use wikisearch_core::{default_result_limit, BlockFetcher, DocId, MirrorFetcher, RankedList, SearchConfig, SearchContext, SearchError, SearchHit};

#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub index_dir: PathBuf,
    /// Directory laid out like the index root that missing posting blocks are copied from.
    pub block_mirror: Option<PathBuf>,
    pub query_timeout: Option<Duration>,
}

impl ServerOptions {
    pub fn new<P: Into<PathBuf>>(index_dir: P) -> Self {
        Self { index_dir: index_dir.into(), block_mirror: None, query_timeout: None }
    }
}

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
}

#[derive(Deserialize)]
pub struct SignalParams {
    #[serde(default)]
    pub normalized: bool,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Clone)]
pub struct AppState {
    pub ctx: Arc<SearchContext>,
}

type ApiError = (StatusCode, String);

pub fn build_app(options: &ServerOptions) -> Result<Router> {
    // Load the index snapshot at startup
    let paths = IndexPaths::new(&options.index_dir);
    let fetcher = options.block_mirror.as_ref().map(|dir| Arc::new(MirrorFetcher::new(dir)) as Arc<dyn BlockFetcher>);
    let ctx = SearchContext::load(&paths, fetcher)?.with_query_timeout(options.query_timeout);
    let app_state = AppState { ctx: Arc::new(ctx) };

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
        .route("/search_config", get(search_config_handler))
        .route("/search_body", get(search_body_handler))
        .route("/search_title", get(search_title_handler))
        .route("/search_anchor", get(search_anchor_handler))
        .route("/get_pagerank", post(page_rank_handler))
        .route("/get_pageview", post(page_views_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());
    Ok(app)
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Result<Json<SearchResponse>, ApiError> {
    let tokens = tokenize(&params.query);
    let limit = default_result_limit(&tokens);
    run_search(state, params.query, move |ctx| ctx.search(&tokens, limit)).await
}

pub async fn search_config_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
    Query(config): Query<SearchConfig>,
) -> Result<Json<SearchResponse>, ApiError> {
    tracing::debug!(?config, "search with config");
    let tokens = tokenize(&params.query);
    run_search(state, params.query, move |ctx| ctx.search_with_config(&tokens, &config)).await
}

pub async fn search_body_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Result<Json<SearchResponse>, ApiError> {
    let tokens = tokenize_unstemmed(&params.query);
    run_search(state, params.query, move |ctx| ctx.search_body(&tokens)).await
}

pub async fn search_title_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Result<Json<SearchResponse>, ApiError> {
    let tokens = tokenize_words(&params.query);
    run_search(state, params.query, move |ctx| ctx.search_title(&tokens)).await
}

pub async fn search_anchor_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Result<Json<SearchResponse>, ApiError> {
    let tokens = tokenize_words(&params.query);
    run_search(state, params.query, move |ctx| ctx.search_anchor(&tokens)).await
}

pub async fn page_rank_handler(State(state): State<AppState>, Query(params): Query<SignalParams>, Json(ids): Json<Vec<DocId>>) -> Json<Vec<f64>> {
    Json(state.ctx.page_rank(&ids, params.normalized))
}

pub async fn page_views_handler(State(state): State<AppState>, Query(params): Query<SignalParams>, Json(ids): Json<Vec<DocId>>) -> Json<Vec<f64>> {
    Json(state.ctx.page_views(&ids, params.normalized))
}

/// Run a ranking closure on the blocking pool (posting reads hit the disk) and attach titles.
async fn run_search<F>(state: AppState, query: String, rank: F) -> Result<Json<SearchResponse>, ApiError>
where
    F: FnOnce(&SearchContext) -> wikisearch_core::Result<RankedList> + Send + 'static,
{
    let start = std::time::Instant::now();
    // Edge case: nothing to search for
    if query.trim().is_empty() {
        return Ok(Json(SearchResponse { query, took_s: 0.0, total_hits: 0, results: vec![] }));
    }
    let ctx = Arc::clone(&state.ctx);
    let hits = tokio::task::spawn_blocking(move || rank(&ctx).map(|ranked| ctx.with_titles(&ranked)))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("search task failed: {e}")))?
        .map_err(|e| {
            tracing::error!(%query, error = %e, "search failed");
            error_status(e)
        })?;
    let elapsed = start.elapsed();
    tracing::info!(%query, hits = hits.len(), took_ms = elapsed.as_millis() as u64, "search");
    Ok(Json(SearchResponse { query, took_s: elapsed.as_secs_f64(), total_hits: hits.len(), results: hits }))
}

fn error_status(e: SearchError) -> ApiError {
    match e {
        SearchError::Timeout { .. } => (StatusCode::GATEWAY_TIMEOUT, e.to_string()),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}
