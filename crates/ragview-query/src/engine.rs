//! GraphRAG query engine invocation.
//!
//! The engine is an external process:
//!   <program> <args..> --root <dir> --method <global|local>
//!     --community_level <n> --response_type <text> <query>
//! Its stdout is the answer; a non-zero exit turns stderr into an error reply.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;
use std::str::FromStr;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

use ragview_common::{RagviewError, Result};
use ragview_config::QueryEngineConfig;

/// Shown instead of a blank answer when the engine prints nothing.
pub const NO_RESULTS_MESSAGE: &str = "The query completed but returned no results.";
pub const ERROR_MARKER: &str = "Error: ";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMethod {
    /// Holistic questions about the whole corpus.
    #[default]
    Global,
    /// Questions about specific entities.
    Local,
}

impl SearchMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            SearchMethod::Global => "global",
            SearchMethod::Local => "local",
        }
    }
}

impl fmt::Display for SearchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "global" => Ok(SearchMethod::Global),
            "local" => Ok(SearchMethod::Local),
            other => Err(format!("unknown search method '{other}', expected global or local")),
        }
    }
}

/// Everything that determines an engine answer. Also the memoization key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query_text: String,
    pub method: SearchMethod,
    pub root_dir: PathBuf,
    pub community_level: u8,
    pub response_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum QueryResponse {
    /// Engine stdout, verbatim.
    Answer(String),
    /// Engine succeeded but printed only whitespace.
    NoResults,
    /// Engine failed; holds stderr or the launch error.
    Failed(String),
}

impl QueryResponse {
    pub fn is_error(&self) -> bool {
        matches!(self, QueryResponse::Failed(_))
    }

    /// Text shown to the user.
    pub fn text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for QueryResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryResponse::Answer(out) => f.write_str(out),
            QueryResponse::NoResults => f.write_str(NO_RESULTS_MESSAGE),
            QueryResponse::Failed(err) => write!(f, "{ERROR_MARKER}{err}"),
        }
    }
}

/// Launches the external query engine.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl QueryEngine {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self { program: program.into(), args, timeout: None }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn from_config(config: &QueryEngineConfig) -> Self {
        Self::new(config.program.clone(), config.args.clone())
            .with_timeout(config.timeout_secs.map(Duration::from_secs))
    }

    /// Arguments passed after the program name, in order.
    pub fn arguments(&self, req: &QueryRequest) -> Vec<String> {
        let mut args = self.args.clone();
        args.extend([
            "--root".to_string(),
            req.root_dir.to_string_lossy().into_owned(),
            "--method".to_string(),
            req.method.to_string(),
            "--community_level".to_string(),
            req.community_level.to_string(),
            "--response_type".to_string(),
            req.response_type.clone(),
            req.query_text.clone(),
        ]);
        args
    }

    /// Run one query to completion. Never fails: problems come back as
    /// [`QueryResponse::Failed`].
    #[instrument(skip(self, req), fields(method = %req.method))]
    pub async fn run(&self, req: &QueryRequest) -> QueryResponse {
        info!("Running {} search", req.method);
        match self.capture(req).await {
            Ok(stdout) if stdout.trim().is_empty() => {
                debug!("Query engine returned an empty answer");
                QueryResponse::NoResults
            }
            Ok(stdout) => {
                debug!(bytes = stdout.len(), "Query engine answered");
                QueryResponse::Answer(stdout)
            }
            Err(RagviewError::Engine(detail)) => QueryResponse::Failed(detail),
            Err(e) => QueryResponse::Failed(e.to_string()),
        }
    }

    /// Engine stdout on a zero exit status.
    async fn capture(&self, req: &QueryRequest) -> Result<String> {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.arguments(req))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, cmd.output()).await.map_err(|_| {
                warn!("Query engine exceeded {}s, killed", limit.as_secs());
                RagviewError::Engine(format!("query timed out after {}s", limit.as_secs()))
            })?,
            None => cmd.output().await,
        };

        let output = output.map_err(|e| {
            warn!("Cannot launch query engine '{}': {}", self.program, e);
            RagviewError::Engine(format!("failed to run '{}': {}", self.program, e))
        })?;

        if !output.status.success() {
            warn!(status = %output.status, "Query engine failed");
            return Err(RagviewError::Engine(
                String::from_utf8_lossy(&output.stderr).into_owned(),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
