//! ragview-kg — GraphML artifact discovery and 3-D knowledge graph rendering.

pub mod artifacts;
pub mod graph;
pub mod graphml;
pub mod layout;
pub mod figure;

pub use artifacts::{find_graphml_files, find_latest_graphml, ArtifactRecord, ArtifactScan, ScanStatus};
pub use figure::{build_figure, render_graph_file, Figure, RenderedGraph};
pub use graph::{GraphStats, KnowledgeGraph};
pub use graphml::{load_graphml, parse_graphml};
pub use layout::SpringLayout;
