use anyhow::Result;
use axum::{extract::{Path, Query, State}, http::{HeaderMap, StatusCode}, routing::{get, post}, Json, Router};
use parking_lot::RwLock;
use quarry_core::persist::{ensure_recomputable, load_index, save_idf, save_meta, save_tfidf, IndexPaths, MetaFile};
use quarry_core::stats::compute_statistics;
use quarry_core::{InvertedIndex, QueryEngine, Stopwords};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Results per page, matching the viewer's page size.
pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
    #[serde(default)]
    pub offset: usize,
}
fn default_k() -> usize { DEFAULT_PAGE_SIZE }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub doc_id: String,
    pub url: Option<String>,
    pub score: f64,
    pub weight: u32,
}

#[derive(Clone)]
pub struct AppState {
    pub index_paths_root: PathBuf,
    /// Queries take the read lock; recompute is the single writer.
    pub index: Arc<RwLock<InvertedIndex>>,
    pub stopwords: Arc<Stopwords>,
    pub admin_token: Option<String>,
}

pub fn build_app(index_dir: PathBuf, stopwords: Stopwords) -> Result<Router> {
    build_app_with_token(index_dir, stopwords, std::env::var("ADMIN_TOKEN").ok())
}

pub fn build_app_with_token(index_dir: PathBuf, stopwords: Stopwords, admin_token: Option<String>) -> Result<Router> {
    let index = load_index(&IndexPaths::new(&index_dir));
    tracing::info!(num_docs = index.num_docs(), num_terms = index.idf.len(), "index loaded");
    let app_state = AppState {
        index_paths_root: index_dir,
        index: Arc::new(RwLock::new(index)),
        stopwords: Arc::new(stopwords),
        admin_token,
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
        .route("/doc/*doc_id", get(doc_handler))
        .route("/index/recompute", post(recompute_handler))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);
    Ok(app)
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Json<SearchResponse> {
    let start = std::time::Instant::now();
    let index = state.index.read();
    let engine = QueryEngine::new(&index, &state.stopwords);

    let (total_hits, results, error) = match engine.rank(&params.q) {
        Ok(ranked) => {
            let k = params.k.clamp(1, MAX_PAGE_SIZE);
            let total = ranked.len();
            let page = ranked
                .into_iter()
                .skip(params.offset)
                .take(k)
                .map(|r| SearchHit {
                    url: index.display_url(&r.doc_id).map(str::to_string),
                    doc_id: r.doc_id,
                    score: r.score,
                    weight: r.weight,
                })
                .collect();
            (total, page, None)
        }
        Err(e) => {
            tracing::info!(query = %params.q, error = %e, "query rejected");
            (0, Vec::new(), Some(e.to_string()))
        }
    };
    drop(index);

    let elapsed = start.elapsed();
    Json(SearchResponse { query: params.q, took_s: elapsed.as_secs_f64(), total_hits, results, error })
}

pub async fn doc_handler(State(state): State<AppState>, Path(doc_id): Path<String>) -> (StatusCode, Json<serde_json::Value>) {
    let index = state.index.read();
    match index.display_url(&doc_id) {
        Some(url) => (StatusCode::OK, Json(serde_json::json!({ "doc_id": doc_id, "url": url }))),
        None => (StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": "not found" }))),
    }
}

/// Recompute idf/tf-idf from the loaded postings and persist them. Statistics
/// are computed and written on the blocking pool under the read lock; the
/// write lock is held only to swap them in.
async fn recompute_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    authorize(&state, &headers)?;
    {
        let index = state.index.read();
        ensure_recomputable(&index).map_err(|e| (StatusCode::CONFLICT, e.to_string()))?;
    }

    let shared = state.index.clone();
    let paths = IndexPaths::new(&state.index_paths_root);
    let task = tokio::task::spawn_blocking(move || -> Result<(usize, usize)> {
        let stats = {
            let index = shared.read();
            compute_statistics(&index.postings, index.num_docs(), &index.doc_counts)
        };
        save_idf(&paths, &stats.idf)?;
        save_tfidf(&paths, &stats.tfidf)?;

        let meta = {
            let mut index = shared.write();
            index.idf = stats.idf;
            index.tfidf = stats.tfidf;
            MetaFile::for_index(&index)
        };
        save_meta(&paths, &meta)?;
        tracing::info!(num_docs = meta.num_docs, num_terms = meta.num_terms, "statistics recomputed");
        Ok((meta.num_docs as usize, meta.num_terms as usize))
    });

    let (num_docs, num_terms) = task
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}")))?;
    Ok(Json(serde_json::json!({ "num_docs": num_docs, "num_terms": num_terms })))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), (StatusCode, String)> {
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
