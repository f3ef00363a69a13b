//! Axum router — maps all URL paths to handlers.

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::CorsLayer,
    trace::TraceLayer,
    compression::CompressionLayer,
};
use std::sync::Arc;
use crate::state::{AppState, SharedState};
use crate::handlers::{
    index,
    query::{query_page, query_submit, api_query},
    graph::{graph_page, graph_load, graph_download, api_graph_figure, api_graph_stats},
    settings::{settings_page, settings_save, cache_clear},
    artifacts::api_artifacts,
};

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let shared: SharedState = Arc::new(state);

    Router::new()
        // Pages
        .route("/",               get(index))
        .route("/query",          get(query_page).post(query_submit))
        .route("/graph",          get(graph_page))
        .route("/graph/load",     post(graph_load))
        .route("/graph/download", get(graph_download))
        .route("/settings",       get(settings_page).post(settings_save))
        .route("/cache/clear",    post(cache_clear))

        // API endpoints
        .route("/api/artifacts",    get(api_artifacts))
        .route("/api/graph/figure", get(api_graph_figure))
        .route("/api/graph/stats",  get(api_graph_stats))
        .route("/api/query",        post(api_query))

        // Middleware
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
