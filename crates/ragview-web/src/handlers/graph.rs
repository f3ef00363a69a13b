//! Visualization pane — latest GraphML export as a 3-D plot.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use minijinja::context;
use std::sync::Arc;
use tracing::{info, warn};

use ragview_common::{ApiError, RagviewError, Result};
use ragview_kg::{Figure, GraphStats, RenderedGraph};

use crate::state::SharedState;
use crate::templates::{render, script_json, Banner};

pub const DOWNLOAD_FILE_NAME: &str = "knowledge_graph.graphml";
pub const NOT_FOUND_MESSAGE: &str =
    "No GraphML file found. Make sure you've run the indexing process with snapshots.graphml: yes in settings.yaml";
pub const RENDER_FAILED_MESSAGE: &str = "Failed to visualize the graph.";
pub const NOT_LOADED_MESSAGE: &str =
    "Click 'Load/Refresh Graph' to load and visualize the knowledge graph.";

async fn graph_view(state: &SharedState, mut banners: Vec<Banner>) -> Html<String> {
    let settings = state.settings().await;
    let mut rendered = None;

    match state.loaded_graph().await {
        None => banners.push(Banner::info(NOT_LOADED_MESSAGE)),
        Some(path) => match state.rendered_graph(&path).await {
            Ok(Some(graph)) => rendered = Some(graph),
            Ok(None) => banners.push(Banner::error(RENDER_FAILED_MESSAGE)),
            Err(e) => {
                warn!("Graph render failed: {}", e);
                banners.push(Banner::error(format!("{RENDER_FAILED_MESSAGE} {e}")));
            }
        },
    }

    let figure_json = match rendered.as_ref().map(|g| script_json(&g.figure)).transpose() {
        Ok(json) => json,
        Err(e) => {
            banners.push(Banner::error(format!("{RENDER_FAILED_MESSAGE} {e}")));
            None
        }
    };

    render(
        &state.templates,
        "graph.html",
        context! {
            active => "graph",
            settings => settings,
            banners => banners,
            figure_json => figure_json,
            stats => rendered.as_ref().map(|g| g.stats),
            graph_path => rendered.as_ref().map(|g| g.path.display().to_string()),
        },
    )
}

pub async fn graph_page(State(state): State<SharedState>) -> Html<String> {
    graph_view(&state, Vec::new()).await
}

/// POST /graph/load - locate the newest export and show it
pub async fn graph_load(State(state): State<SharedState>) -> Html<String> {
    let root = state.settings().await.root_dir;
    let banner = match state.refresh_graph(&root).await {
        Ok(Some(path)) => {
            info!("Loaded graph from {}", path.display());
            let banner = Banner::success(format!("Loaded graph from: {}", path.display()));
            state.set_loaded_graph(Some(path)).await;
            banner
        }
        Ok(None) => Banner::error(NOT_FOUND_MESSAGE),
        Err(e) => Banner::error(format!("{NOT_FOUND_MESSAGE} ({e})")),
    };
    graph_view(&state, vec![banner]).await
}

fn not_loaded() -> RagviewError {
    RagviewError::NotFound("no graph loaded".to_string())
}

/// GET /graph/download - the loaded GraphML file, byte for byte
pub async fn graph_download(State(state): State<SharedState>) -> std::result::Result<Response, ApiError> {
    let path = state.loaded_graph().await.ok_or_else(not_loaded)?;
    let bytes = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => {
            RagviewError::NotFound(format!("{} no longer exists", path.display()))
        }
        _ => RagviewError::Io(e),
    })?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/graphml+xml".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{DOWNLOAD_FILE_NAME}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

async fn loaded_render(state: &SharedState) -> Result<Arc<RenderedGraph>> {
    let path = state.loaded_graph().await.ok_or_else(not_loaded)?;
    state
        .rendered_graph(&path)
        .await?
        .ok_or_else(|| RagviewError::NotFound(format!("{} no longer exists", path.display())))
}

/// GET /api/graph/figure - Plotly figure of the loaded graph
pub async fn api_graph_figure(
    State(state): State<SharedState>,
) -> std::result::Result<Json<Figure>, ApiError> {
    Ok(Json(loaded_render(&state).await?.figure.clone()))
}

/// GET /api/graph/stats - node, edge and component counts of the loaded graph
pub async fn api_graph_stats(
    State(state): State<SharedState>,
) -> std::result::Result<Json<GraphStats>, ApiError> {
    Ok(Json(loaded_render(&state).await?.stats))
}
