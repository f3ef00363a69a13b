//! Artifact listing API.

use axum::{extract::State, Json};
use ragview_common::{ApiError, RagviewError};
use ragview_kg::{find_graphml_files, ArtifactScan};

use crate::state::SharedState;

/// GET /api/artifacts - GraphML exports under the configured root, newest first
pub async fn api_artifacts(
    State(state): State<SharedState>,
) -> Result<Json<ArtifactScan>, ApiError> {
    let root = state.settings().await.root_dir;
    let scan = tokio::task::spawn_blocking(move || find_graphml_files(&root))
        .await
        .map_err(|e| RagviewError::Other(e.into()))?;
    Ok(Json(scan))
}
