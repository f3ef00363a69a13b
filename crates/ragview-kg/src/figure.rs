//! Plotly figure construction for the 3-D graph view.
//!
//! The figure serializes to the JSON shape `Plotly.newPlot` accepts, so the
//! browser only has to hand it over.

use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use crate::graph::{GraphStats, KnowledgeGraph};
use crate::graphml::load_graphml;
use crate::layout::SpringLayout;
use ragview_common::Result;

pub const COMMUNITY_ATTR: &str = "community";
pub const NODE_BASE_SIZE: f64 = 5.0;
pub const NODE_DEGREE_SIZE: f64 = 3.0;
pub const FIGURE_HEIGHT: u32 = 700;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColorLegend {
    Community,
    NodeDegree,
}

impl ColorLegend {
    pub fn title(self) -> &'static str {
        match self {
            ColorLegend::Community => "Community",
            ColorLegend::NodeDegree => "Node Degree",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

#[derive(Debug, Clone, Serialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub mode: &'static str,
    pub x: Vec<Option<f64>>,
    pub y: Vec<Option<f64>>,
    pub z: Vec<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<Line>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Vec<String>>,
    pub hoverinfo: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Line {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<&'static str>,
    pub width: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Marker {
    pub size: Vec<f64>,
    pub color: Vec<f64>,
    pub colorscale: &'static str,
    pub colorbar: ColorBar,
    pub line: Line,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColorBar {
    pub title: Title,
    pub thickness: u32,
    pub x: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Title {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    pub title: Title,
    pub showlegend: bool,
    pub scene: Scene,
    pub margin: Margin,
    pub height: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Scene {
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub zaxis: Axis,
}

#[derive(Debug, Clone, Serialize)]
pub struct Axis {
    pub showbackground: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Margin {
    pub l: u32,
    pub r: u32,
    pub b: u32,
    pub t: u32,
}

/// Raw color values per node and the legend they represent.
///
/// Community values are indexed in first-seen order; nodes without the
/// attribute fall back to index 0.
pub fn node_color_values(graph: &KnowledgeGraph) -> (Vec<f64>, ColorLegend) {
    if graph.has_node_attribute(COMMUNITY_ATTR) {
        let mut index: HashMap<&str, usize> = HashMap::new();
        for node in graph.nodes() {
            if let Some(c) = node.attr(COMMUNITY_ATTR) {
                let next = index.len();
                index.entry(c).or_insert(next);
            }
        }
        let values = graph
            .nodes()
            .iter()
            .map(|n| n.attr(COMMUNITY_ATTR).and_then(|c| index.get(c)).copied().unwrap_or(0) as f64)
            .collect();
        (values, ColorLegend::Community)
    } else {
        let values = graph.degrees().iter().map(|&d| d as f64).collect();
        (values, ColorLegend::NodeDegree)
    }
}

/// Min-max scale into [0, 1]. A constant (or empty) series is returned as is.
pub fn normalize(values: &mut [f64]) {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if values.is_empty() || max == min {
        return;
    }
    let range = max - min;
    for v in values.iter_mut() {
        *v = (*v - min) / range;
    }
}

pub fn node_tooltip(graph: &KnowledgeGraph, idx: usize) -> String {
    let node = &graph.nodes()[idx];
    format!(
        "Node: {}<br>Type: {}<br>Description: {}",
        node.id,
        node.attr("type").unwrap_or("N/A"),
        node.attr("description").unwrap_or("N/A"),
    )
}

/// Build the edge and node traces plus scene layout for a graph.
pub fn build_figure(graph: &KnowledgeGraph, layout: &SpringLayout) -> Figure {
    let pos = layout.compute(graph);

    let mut ex = Vec::with_capacity(graph.edge_count() * 3);
    let mut ey = Vec::with_capacity(graph.edge_count() * 3);
    let mut ez = Vec::with_capacity(graph.edge_count() * 3);
    for &(u, v) in graph.edges() {
        // trailing None breaks the line between segments
        ex.extend([Some(pos[u][0]), Some(pos[v][0]), None]);
        ey.extend([Some(pos[u][1]), Some(pos[v][1]), None]);
        ez.extend([Some(pos[u][2]), Some(pos[v][2]), None]);
    }

    let edge_trace = Trace {
        kind: "scatter3d",
        mode: "lines",
        x: ex,
        y: ey,
        z: ez,
        line: Some(Line { color: Some("lightgray"), width: 0.5 }),
        marker: None,
        text: None,
        hoverinfo: "none",
    };

    let (mut colors, legend) = node_color_values(graph);
    normalize(&mut colors);

    let sizes = graph
        .degrees()
        .iter()
        .map(|&d| NODE_BASE_SIZE + NODE_DEGREE_SIZE * d as f64)
        .collect();

    let node_trace = Trace {
        kind: "scatter3d",
        mode: "markers",
        x: pos.iter().map(|p| Some(p[0])).collect(),
        y: pos.iter().map(|p| Some(p[1])).collect(),
        z: pos.iter().map(|p| Some(p[2])).collect(),
        line: None,
        marker: Some(Marker {
            size: sizes,
            color: colors,
            colorscale: "Viridis",
            colorbar: ColorBar {
                title: Title { text: legend.title().to_string() },
                thickness: 10,
                x: 1.1,
            },
            line: Line { color: None, width: 1.0 },
        }),
        text: Some((0..graph.node_count()).map(|i| node_tooltip(graph, i)).collect()),
        hoverinfo: "text",
    };

    let hidden = || Axis { showbackground: false };
    Figure {
        data: vec![edge_trace, node_trace],
        layout: Layout {
            title: Title { text: "Knowledge Graph Visualization".to_string() },
            showlegend: false,
            scene: Scene { xaxis: hidden(), yaxis: hidden(), zaxis: hidden() },
            margin: Margin { l: 0, r: 0, b: 0, t: 40 },
            height: FIGURE_HEIGHT,
        },
    }
}

/// A rendered GraphML file together with its summary statistics.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedGraph {
    pub path: PathBuf,
    pub figure: Figure,
    pub stats: GraphStats,
}

/// Load and render a GraphML file.
///
/// `Ok(None)` means there is nothing to show: no path was given or the file
/// no longer exists. Parse failures are returned as errors.
#[instrument]
pub fn render_graph_file(path: Option<&Path>) -> Result<Option<RenderedGraph>> {
    let Some(path) = path else { return Ok(None) };
    if !path.is_file() {
        info!("GraphML file {} is gone, nothing to render", path.display());
        return Ok(None);
    }

    let graph = load_graphml(path)?;
    let figure = build_figure(&graph, &SpringLayout::default());
    let stats = graph.stats();
    info!(nodes = stats.nodes, edges = stats.edges, "Rendered {}", path.display());

    Ok(Some(RenderedGraph { path: path.to_path_buf(), figure, stats }))
}
