use anyhow::{Context, Result};
use axum::{extract::{Path, Query, State}, http::StatusCode, routing::get, Json, Router};
use fts_core::persist::{load_doc_id_map, load_meta, IndexPaths, MetaFile};
use fts_core::{search, Config, DocId, FtsError, Handle, IndexAccessor, MappedIndex, SearchResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer, AllowOrigin};
use tower_http::trace::TraceLayer;

/// Upper bound on `k`; matches the row limit of the text front end.
pub const MAX_RESULTS: usize = fts_core::search::DISPLAY_LIMIT;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_k() -> usize { 10 }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub handle: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<DocId>,
    pub score: f64,
    pub title: String,
}

#[derive(Clone)]
pub struct AppState {
    pub index: Arc<MappedIndex>,
    pub config: Arc<Config>,
    pub doc_ids: Arc<BTreeMap<Handle, DocId>>,
    pub meta: Option<Arc<MetaFile>>,
}

impl AppState {
    fn hit(&self, r: SearchResult) -> SearchHit {
        let doc_id = Handle::try_from(r.id).ok().and_then(|h| self.doc_ids.get(&h).copied());
        SearchHit { handle: r.id, doc_id, score: r.score, title: r.title }
    }
}

pub fn build_app(index_dir: String, config: Config) -> Result<Router> {
    // Map the binary index once; handlers share it read-only
    let paths = IndexPaths::new(&index_dir);
    let index = MappedIndex::open(paths.binary())
        .with_context(|| format!("opening {}", paths.binary().display()))?;
    let doc_ids = match load_doc_id_map(&paths) {
        Ok(map) => map,
        Err(e) => {
            tracing::warn!(error = %e, "no document id side table; reporting handles only");
            BTreeMap::new()
        }
    };
    let meta = match load_meta(&paths) {
        Ok(meta) => {
            tracing::info!(num_docs = meta.num_docs, num_terms = meta.num_terms, created_at = %meta.created_at, "loaded index metadata");
            Some(Arc::new(meta))
        }
        Err(e) => {
            tracing::warn!(error = %e, "no index metadata");
            None
        }
    };
    let app_state = AppState { index: Arc::new(index), config: Arc::new(config), doc_ids: Arc::new(doc_ids), meta };

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
        .route("/doc/:handle", get(doc_handler))
        .route("/stats", get(stats_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());
    Ok(app)
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let start = std::time::Instant::now();
    let results = search(&state.config, &state.index.accessor(), &params.q).map_err(error_status)?;
    let total_hits = results.len();
    let k = params.k.clamp(1, MAX_RESULTS);
    let results = results.into_iter().take(k).map(|r| state.hit(r)).collect();
    let elapsed = start.elapsed();
    Ok(Json(SearchResponse { query: params.q, took_s: elapsed.as_secs_f64(), total_hits, results }))
}

pub async fn doc_handler(
    State(state): State<AppState>,
    Path(handle): Path<u64>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let title = state.index.accessor().load_document(handle).map_err(|e| match e {
        FtsError::Decode { .. } | FtsError::DocumentNotFound(_) => (StatusCode::NOT_FOUND, "not found".to_string()),
        other => error_status(other),
    })?;
    let mut obj = serde_json::json!({ "handle": handle, "title": title });
    if let Some(id) = Handle::try_from(handle).ok().and_then(|h| state.doc_ids.get(&h)) {
        obj["doc_id"] = serde_json::json!(id);
    }
    Ok(Json(obj))
}

/// Document count read from the mapped file, plus the build metadata when the
/// indexer left one behind.
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let total_docs = state.index.accessor().total_docs().map_err(error_status)?;
    let mut obj = serde_json::json!({ "total_docs": total_docs, "bytes": state.index.len() });
    if let Some(meta) = &state.meta {
        obj["meta"] = serde_json::json!(meta.as_ref());
    }
    Ok(Json(obj))
}

fn error_status(e: FtsError) -> (StatusCode, String) {
    match e {
        FtsError::Configuration(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
        other => {
            tracing::error!(error = %other, "search failed");
            (StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
        }
    }
}
