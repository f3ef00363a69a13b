//! Shared application state for the web server.
//!
//! One explorer session per process: the settings, the loaded graph path and
//! the memoized lookups all belong to it.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use minijinja::Environment;
use tokio::sync::RwLock;
use tracing::{debug, info};

use ragview_common::{RagviewError, Result};
use ragview_config::{Config, ExplorerConfig};
use ragview_kg::{find_latest_graphml, render_graph_file, RenderedGraph};
use ragview_query::{QueryEngine, QueryExecutor, SessionCache};

use crate::templates::build_environment;

/// Shared state injected into every Axum handler.
pub struct AppState {
    settings: RwLock<ExplorerConfig>,
    /// Path picked by the last successful Load/Refresh.
    loaded_graph: RwLock<Option<PathBuf>>,
    pub executor: QueryExecutor,
    /// Latest GraphML per root directory.
    graph_locations: SessionCache<PathBuf, PathBuf>,
    /// Parsed and laid-out figure per GraphML path.
    rendered_graphs: SessionCache<PathBuf, Arc<RenderedGraph>>,
    pub templates: Environment<'static>,
}

impl AppState {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        config
            .explorer
            .validate()
            .map_err(|e| anyhow::anyhow!("invalid explorer settings: {e}"))?;
        Ok(Self {
            settings: RwLock::new(config.explorer.clone()),
            loaded_graph: RwLock::new(None),
            executor: QueryExecutor::new(QueryEngine::from_config(&config.query)),
            graph_locations: SessionCache::new("graph_locations"),
            rendered_graphs: SessionCache::new("rendered_graphs"),
            templates: build_environment()?,
        })
    }

    pub async fn settings(&self) -> ExplorerConfig {
        self.settings.read().await.clone()
    }

    /// Replace the explorer settings. Returns true and clears every session
    /// cache when anything actually changed.
    pub async fn update_settings(&self, new: ExplorerConfig) -> bool {
        let mut current = self.settings.write().await;
        if *current == new {
            return false;
        }
        info!(
            root = %new.root_dir.display(),
            level = new.community_level,
            "Explorer settings changed"
        );
        *current = new;
        drop(current);
        self.clear_caches();
        true
    }

    pub fn clear_caches(&self) {
        self.executor.clear();
        self.graph_locations.clear();
        self.rendered_graphs.clear();
    }

    pub async fn loaded_graph(&self) -> Option<PathBuf> {
        self.loaded_graph.read().await.clone()
    }

    pub async fn set_loaded_graph(&self, path: Option<PathBuf>) {
        *self.loaded_graph.write().await = path;
    }

    /// Most recent GraphML under `root`, memoized once found.
    ///
    /// A miss is not cached, so an index run finishing mid-session is picked
    /// up by the next refresh.
    pub async fn locate_graph(&self, root: &Path) -> Result<Option<PathBuf>> {
        let key = root.to_path_buf();
        if let Some(hit) = self.graph_locations.get(&key) {
            if hit.is_file() {
                debug!("Graph location for {} served from cache", root.display());
                return Ok(Some(hit));
            }
        }

        let lookup_root = key.clone();
        let found = tokio::task::spawn_blocking(move || find_latest_graphml(&lookup_root))
            .await
            .map_err(|e| RagviewError::Other(e.into()))?;

        if let Some(path) = &found {
            self.graph_locations.insert(key, path.clone());
        }
        Ok(found)
    }

    /// Explicit Load/Refresh: rescan `root` and drop the figure memoized for
    /// whatever it finds, since the file may have been rewritten in place.
    pub async fn refresh_graph(&self, root: &Path) -> Result<Option<PathBuf>> {
        self.graph_locations.remove(&root.to_path_buf());
        let found = self.locate_graph(root).await?;
        if let Some(path) = &found {
            self.rendered_graphs.remove(path);
        }
        Ok(found)
    }

    /// Figure and stats for `path`, built once per session.
    ///
    /// `Ok(None)` when the file no longer exists.
    pub async fn rendered_graph(&self, path: &Path) -> Result<Option<Arc<RenderedGraph>>> {
        let key = path.to_path_buf();
        if let Some(hit) = self.rendered_graphs.get(&key) {
            if hit.path.is_file() {
                debug!("Figure for {} served from cache", path.display());
                return Ok(Some(hit));
            }
        }

        let render_path = key.clone();
        let rendered = tokio::task::spawn_blocking(move || render_graph_file(Some(&render_path)))
            .await
            .map_err(|e| RagviewError::Other(e.into()))??;

        Ok(rendered.map(|graph| {
            let graph = Arc::new(graph);
            self.rendered_graphs.insert(key, Arc::clone(&graph));
            graph
        }))
    }
}

pub type SharedState = Arc<AppState>;
