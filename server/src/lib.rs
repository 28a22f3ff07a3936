use anyhow::Result;
use axum::{extract::{Path, Query, State}, http::{HeaderMap, StatusCode}, routing::{get, post}, Json, Router};
use fieldrank_core::persist::{load_corpus, Corpus, IndexPaths};
use fieldrank_core::tokenizer::tokenize;
use fieldrank_core::{ModelKind, ModelRegistry, ScoreCollection, ScoreError};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer, AllowOrigin};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
    #[serde(default = "default_model")]
    pub model: String,
}
fn default_k() -> usize { 10 }
fn default_model() -> String { ModelKind::Bm25.to_string() }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub model: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub doc_id: String,
    pub score: f64,
    /// Terms of the title field, when the document has one.
    pub title: Option<Vec<String>>,
}

pub struct ServerConfig {
    pub index_dir: PathBuf,
    pub models: ModelRegistry,
    pub admin_token: Option<String>,
}

impl ServerConfig {
    /// Admin token comes from `ADMIN_TOKEN`.
    pub fn from_env(index_dir: impl Into<PathBuf>, models: ModelRegistry) -> Self {
        Self { index_dir: index_dir.into(), models, admin_token: std::env::var("ADMIN_TOKEN").ok() }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub index_paths_root: PathBuf,
    pub corpus: Arc<RwLock<Corpus>>,
    pub models: Arc<ModelRegistry>,
    pub admin_token: Option<String>,
}

type ApiError = (StatusCode, String);

pub fn build_app(config: ServerConfig) -> Result<Router> {
    // Load the corpus at startup
    let corpus = load_corpus(&IndexPaths::new(&config.index_dir))?;
    let app_state = AppState {
        index_paths_root: config.index_dir,
        corpus: Arc::new(RwLock::new(corpus)),
        models: Arc::new(config.models),
        admin_token: config.admin_token,
    };

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
        .route("/doc/:doc_id", get(doc_handler))
        .route("/index/reload", post(reload_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());
    Ok(app)
}

fn score_error(err: ScoreError) -> ApiError {
    match err {
        ScoreError::UnknownModel(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        _ => {
            tracing::error!(error = %err, "scoring failed");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Result<Json<SearchResponse>, ApiError> {
    let start = std::time::Instant::now();
    let kind: ModelKind = params.model.parse().map_err(score_error)?;
    let terms = tokenize(&params.q);

    let corpus = state.corpus.read();
    let scorer = state.models.get(kind).build(&corpus.collection, &corpus.index).map_err(score_error)?;
    let scores = scorer.score_collection(&terms).map_err(score_error)?;

    let mut scored: Vec<(String, f64)> = scores.into_iter().collect();
    let k = params.k.clamp(1, 100);
    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    let total_hits = scored.len();

    let results = scored
        .into_iter()
        .take(k)
        .map(|(doc_id, score)| {
            let title = corpus.collection.get(&doc_id).and_then(|d| d.field("title")).map(<[String]>::to_vec);
            SearchHit { doc_id, score, title }
        })
        .collect();

    let elapsed = start.elapsed();
    Ok(Json(SearchResponse { query: params.q, model: kind.to_string(), took_s: elapsed.as_secs_f64(), total_hits, results }))
}

pub async fn doc_handler(State(state): State<AppState>, Path(doc_id): Path<String>) -> Result<Json<serde_json::Value>, ApiError> {
    let corpus = state.corpus.read();
    match corpus.collection.get(&doc_id) {
        Some(doc) => Ok(Json(serde_json::json!({ "doc_id": doc_id, "fields": doc.fields }))),
        None => Err((StatusCode::NOT_FOUND, format!("document {doc_id} not found"))),
    }
}

// --- Admin endpoints ---
async fn reload_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<serde_json::Value>, ApiError> {
    authorize(&state, &headers)?;
    let corpus = load_corpus(&IndexPaths::new(&state.index_paths_root))
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("reload failed: {e:#}")))?;
    let num_docs = corpus.collection.len();
    *state.corpus.write() = corpus;
    tracing::info!(num_docs, "corpus reloaded");
    Ok(Json(serde_json::json!({ "num_docs": num_docs })))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}
