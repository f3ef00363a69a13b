//! ragview-web — browser front end for a GraphRAG index.
//! Provides:
//!   - Query pane (global / local search through the engine CLI)
//!   - 3-D knowledge graph viewer for the latest GraphML export
//!   - Settings pane shared by both

pub mod router;
pub mod handlers;
pub mod state;
pub mod templates;
