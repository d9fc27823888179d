use axum::{extract::{Query, State}, routing::get, Json, Router};
use engine::tokenizer::unique_tokens;
use engine::{Positions, SearchResult, ThreadSafeIndex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    #[serde(default = "default_partial")]
    pub partial: bool,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_partial() -> bool { true }
fn default_k() -> usize { 10 }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchResult>,
}

#[derive(Deserialize)]
pub struct WordsParams {
    pub q: Option<String>,
}

#[derive(Serialize)]
pub struct WordsResponse {
    pub words: Vec<WordEntry>,
}

#[derive(Serialize)]
pub struct WordEntry {
    pub word: String,
    /// Location -> positions of the word there.
    pub locations: BTreeMap<String, Positions>,
}

#[derive(Clone)]
pub struct AppState {
    pub index: Arc<ThreadSafeIndex>,
}

pub fn build_app(index: Arc<ThreadSafeIndex>) -> Router {
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

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/words", get(words_handler))
        .route("/counts", get(counts_handler))
        .with_state(AppState { index })
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Json<SearchResponse> {
    let start = Instant::now();
    let stems = unique_tokens(&params.q);
    let query = stems.iter().map(String::as_str).collect::<Vec<_>>().join(" ");
    // Edge case: nothing left after stemming
    if stems.is_empty() {
        return Json(SearchResponse { query, took_s: start.elapsed().as_secs_f64(), total_hits: 0, results: vec![] });
    }

    let mut results = state.index.search(&stems, params.partial);
    let total_hits = results.len();
    results.truncate(params.k.clamp(1, 100));
    tracing::debug!(%query, total_hits, partial = params.partial, "search served");

    Json(SearchResponse { query, took_s: start.elapsed().as_secs_f64(), total_hits, results })
}

/// Every word in the index with the locations and positions it appears at.
/// With `q`, only the stems of `q` that are present.
pub async fn words_handler(State(state): State<AppState>, Query(params): Query<WordsParams>) -> Json<WordsResponse> {
    let words: Vec<String> = match params.q.as_deref() {
        Some(q) => unique_tokens(q).into_iter().filter(|w| state.index.has_word(w)).collect(),
        None => state.index.view_words(),
    };
    let words = words
        .into_iter()
        .map(|word| {
            let locations = state
                .index
                .view_locations(&word)
                .into_iter()
                .map(|location| {
                    let positions = state.index.view_positions(&word, &location);
                    (location, positions)
                })
                .collect();
            WordEntry { word, locations }
        })
        .collect();
    Json(WordsResponse { words })
}

pub async fn counts_handler(State(state): State<AppState>) -> Json<BTreeMap<String, usize>> {
    Json(state.index.view_counts())
}
