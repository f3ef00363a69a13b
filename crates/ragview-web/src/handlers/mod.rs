//! HTTP handlers for all web routes.

pub mod query;
pub mod graph;
pub mod settings;
pub mod artifacts;

use axum::response::Redirect;

/// `/` lands on the query pane.
pub async fn index() -> Redirect {
    Redirect::to("/query")
}
