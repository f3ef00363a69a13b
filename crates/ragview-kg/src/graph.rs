//! In-memory knowledge graph loaded from a GraphML export.
//!
//! Edges are undirected and unattributed; parallel edges collapse into one.
//! A self-loop contributes 2 to its node's degree.
//!
//! GraphRAG writes simple undirected graphs, so this matches what it exports.
//! A directed or multi-edge file is read as its underlying simple graph:
//! `A->B` plus `B->A`, or two `A-B` edges, count as a single edge.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    pub attributes: BTreeMap<String, String>,
}

impl Node {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Node-count, edge-count and connectivity summary shown beside the plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
    pub connected_components: usize,
}

#[derive(Debug, Clone, Default)]
pub struct KnowledgeGraph {
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
    edges: Vec<(usize, usize)>,
    edge_set: HashSet<(usize, usize)>,
    degrees: Vec<usize>,
}

impl KnowledgeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, or return the index of an existing one with the same id.
    pub fn add_node(&mut self, id: &str) -> usize {
        if let Some(&idx) = self.index.get(id) {
            return idx;
        }
        let idx = self.nodes.len();
        self.nodes.push(Node { id: id.to_string(), attributes: BTreeMap::new() });
        self.index.insert(id.to_string(), idx);
        self.degrees.push(0);
        idx
    }

    pub fn set_attribute(&mut self, node: usize, name: &str, value: String) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.attributes.insert(name.to_string(), value);
        }
    }

    /// Add an undirected edge, creating missing endpoints. Returns false for duplicates.
    pub fn add_edge(&mut self, source: &str, target: &str) -> bool {
        let u = self.add_node(source);
        let v = self.add_node(target);
        let key = if u <= v { (u, v) } else { (v, u) };
        if !self.edge_set.insert(key) {
            return false;
        }
        self.edges.push((u, v));
        self.degrees[u] += 1;
        self.degrees[v] += 1;
        true
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    /// Edges as pairs of node indices, in insertion order.
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    pub fn degree(&self, node: usize) -> usize {
        self.degrees.get(node).copied().unwrap_or(0)
    }

    pub fn degrees(&self) -> &[usize] {
        &self.degrees
    }

    /// True if at least one node carries the attribute.
    pub fn has_node_attribute(&self, name: &str) -> bool {
        self.nodes.iter().any(|n| n.attributes.contains_key(name))
    }

    pub fn connected_components(&self) -> usize {
        let mut parent: Vec<usize> = (0..self.nodes.len()).collect();

        fn find(parent: &mut [usize], mut x: usize) -> usize {
            while parent[x] != x {
                parent[x] = parent[parent[x]];
                x = parent[x];
            }
            x
        }

        let mut components = self.nodes.len();
        for &(u, v) in &self.edges {
            let (ru, rv) = (find(&mut parent, u), find(&mut parent, v));
            if ru != rv {
                parent[ru] = rv;
                components -= 1;
            }
        }
        components
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            nodes: self.node_count(),
            edges: self.edge_count(),
            connected_components: self.connected_components(),
        }
    }
}
