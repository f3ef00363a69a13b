//! ragview-query — Runs the external GraphRAG query engine.
//!
//! 1. Builds the engine command line from explorer settings
//! 2. Captures stdout / stderr and maps exit status to a reply
//! 3. Memoizes successful replies for the running session

pub mod engine;
pub mod cache;

pub use cache::{QueryExecutor, SessionCache};
pub use engine::{QueryEngine, QueryRequest, QueryResponse, SearchMethod, NO_RESULTS_MESSAGE};
