//! Query pane — free-text question forwarded to the GraphRAG engine.

use axum::{extract::State, response::Html, Form, Json};
use minijinja::context;
use serde::{Deserialize, Serialize};
use tracing::info;

use ragview_common::ApiError;
use ragview_config::ExplorerConfig;
use ragview_query::{QueryRequest, QueryResponse, SearchMethod};

use crate::state::SharedState;
use crate::templates::{render, Banner};

pub const EMPTY_QUERY_WARNING: &str = "Please enter a query to search.";

#[derive(Debug, Deserialize)]
pub struct QueryForm {
    #[serde(default)]
    pub query_text: String,
    #[serde(default)]
    pub method: SearchMethod,
}

#[derive(Debug, Serialize)]
pub struct ApiQueryResponse {
    pub method: SearchMethod,
    pub response: String,
    pub is_error: bool,
    pub cached: bool,
}

fn build_request(settings: &ExplorerConfig, query_text: &str, method: SearchMethod) -> QueryRequest {
    QueryRequest {
        query_text: query_text.to_string(),
        method,
        root_dir: settings.root_dir.clone(),
        community_level: settings.community_level,
        response_type: settings.response_type.clone(),
    }
}

async fn run_query(state: &SharedState, query_text: &str, method: SearchMethod) -> (QueryResponse, bool) {
    let settings = state.settings().await;
    let req = build_request(&settings, query_text, method);
    let (resp, cached) = state.executor.execute(&req).await;
    info!(%method, cached, error = resp.is_error(), "Query finished");
    (resp, cached)
}

pub async fn query_page(State(state): State<SharedState>) -> Html<String> {
    let settings = state.settings().await;
    render(
        &state.templates,
        "query.html",
        context! {
            active => "query",
            settings => settings,
            banners => Vec::<Banner>::new(),
            query_text => "",
            method => SearchMethod::default(),
            response => None::<String>,
            response_error => false,
            cached => false,
        },
    )
}

/// POST /query - run the engine unless the question is blank
pub async fn query_submit(
    State(state): State<SharedState>,
    Form(form): Form<QueryForm>,
) -> Html<String> {
    let mut banners = Vec::new();
    let mut response = None;
    let mut response_error = false;
    let mut cached = false;

    if form.query_text.trim().is_empty() {
        banners.push(Banner::warning(EMPTY_QUERY_WARNING));
    } else {
        let (resp, hit) = run_query(&state, &form.query_text, form.method).await;
        response_error = resp.is_error();
        cached = hit;
        response = Some(resp.text());
    }

    let settings = state.settings().await;
    render(
        &state.templates,
        "query.html",
        context! {
            active => "query",
            settings => settings,
            banners => banners,
            query_text => form.query_text,
            method => form.method,
            response => response,
            response_error => response_error,
            cached => cached,
        },
    )
}

/// POST /api/query - JSON variant of the query pane
pub async fn api_query(
    State(state): State<SharedState>,
    Json(body): Json<QueryForm>,
) -> Result<Json<ApiQueryResponse>, ApiError> {
    if body.query_text.trim().is_empty() {
        return Err(ApiError::bad_request(EMPTY_QUERY_WARNING));
    }
    let (resp, cached) = run_query(&state, &body.query_text, body.method).await;
    Ok(Json(ApiQueryResponse {
        method: body.method,
        is_error: resp.is_error(),
        response: resp.text(),
        cached,
    }))
}
