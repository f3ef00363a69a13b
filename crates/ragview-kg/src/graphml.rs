//! Streaming GraphML reader.
//!
//! Handles the subset GraphRAG emits: `<key>` declarations (with optional
//! `<default>`), `<node>`/`<edge>` elements and their `<data>` children.
//! Edge data is skipped. Nested graphs and hyperedges are ignored.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use ragview_common::{RagviewError, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, instrument};

use crate::graph::KnowledgeGraph;

#[derive(Debug, Clone)]
struct KeyDecl {
    name: String,
    domain: String,
    default: Option<String>,
}

impl KeyDecl {
    fn applies_to_nodes(&self) -> bool {
        self.domain == "node" || self.domain == "all"
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Scope {
    Root,
    Node(usize),
    Edge,
    Key,
}

fn xml_err(e: impl std::fmt::Display) -> RagviewError {
    RagviewError::GraphMl(e.to_string())
}

fn attribute(e: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr.map_err(xml_err)?;
        if attr.key.as_ref() == name {
            return Ok(Some(attr.unescape_value().map_err(xml_err)?.into_owned()));
        }
    }
    Ok(None)
}

fn required(e: &BytesStart<'_>, name: &str) -> Result<String> {
    attribute(e, name.as_bytes())?.ok_or_else(|| {
        RagviewError::GraphMl(format!(
            "<{}> missing required attribute '{}'",
            String::from_utf8_lossy(e.local_name().as_ref()),
            name
        ))
    })
}

/// Parse a GraphML document into a [`KnowledgeGraph`].
pub fn parse_graphml(xml: &str) -> Result<KnowledgeGraph> {
    // untrimmed: <data> text is kept byte for byte
    let mut reader = Reader::from_str(xml);

    let mut graph = KnowledgeGraph::new();
    let mut keys: HashMap<String, KeyDecl> = HashMap::new();
    let mut scope = Scope::Root;
    let mut current_key: Option<String> = None;
    let mut in_default = false;
    // (key id, accumulated text) while inside <data>
    let mut data: Option<(String, String)> = None;
    let mut depth_in_graph = 0usize;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                return Err(RagviewError::GraphMl(format!(
                    "at byte {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
        };

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                match e.local_name().as_ref() {
                    b"graph" if !is_empty => {
                        depth_in_graph += 1;
                    }
                    b"key" => {
                        let id = required(e, "id")?;
                        let name = attribute(e, b"attr.name")?.unwrap_or_else(|| id.clone());
                        let domain = attribute(e, b"for")?.unwrap_or_else(|| "all".to_string());
                        keys.insert(id.clone(), KeyDecl { name, domain, default: None });
                        if !is_empty {
                            scope = Scope::Key;
                            current_key = Some(id);
                        }
                    }
                    b"default" if scope == Scope::Key && !is_empty => {
                        in_default = true;
                    }
                    b"node" if depth_in_graph == 1 => {
                        let id = required(e, "id")?;
                        let idx = graph.add_node(&id);
                        if !is_empty {
                            scope = Scope::Node(idx);
                        }
                    }
                    b"edge" if depth_in_graph == 1 => {
                        let source = required(e, "source")?;
                        let target = required(e, "target")?;
                        graph.add_edge(&source, &target);
                        if !is_empty {
                            scope = Scope::Edge;
                        }
                    }
                    b"data" => {
                        let key = required(e, "key")?;
                        if is_empty {
                            if let Scope::Node(idx) = scope {
                                let name = keys.get(&key).map_or(key.as_str(), |k| k.name.as_str());
                                graph.set_attribute(idx, name, String::new());
                            }
                        } else {
                            data = Some((key, String::new()));
                        }
                    }
                    _ => {}
                }
            }
            Event::Text(t) => {
                let text = t.unescape().map_err(xml_err)?;
                if let Some((_, buf)) = data.as_mut() {
                    buf.push_str(&text);
                } else if in_default {
                    if let Some(decl) = current_key.as_ref().and_then(|id| keys.get_mut(id)) {
                        decl.default.get_or_insert_with(String::new).push_str(&text);
                    }
                }
            }
            Event::CData(c) => {
                let text = String::from_utf8_lossy(&c.into_inner()).into_owned();
                if let Some((_, buf)) = data.as_mut() {
                    buf.push_str(&text);
                }
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"graph" => {
                    depth_in_graph = depth_in_graph.saturating_sub(1);
                }
                b"data" => {
                    if let (Some((key, value)), Scope::Node(idx)) = (data.take(), scope) {
                        let name = keys.get(&key).map_or(key.clone(), |k| k.name.clone());
                        graph.set_attribute(idx, &name, value);
                    }
                }
                b"default" => in_default = false,
                b"key" => {
                    current_key = None;
                    scope = Scope::Root;
                }
                b"node" | b"edge" => scope = Scope::Root,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    apply_node_defaults(&mut graph, &keys);
    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "Parsed GraphML document"
    );
    Ok(graph)
}

fn apply_node_defaults(graph: &mut KnowledgeGraph, keys: &HashMap<String, KeyDecl>) {
    let defaults: Vec<(String, String)> = keys
        .values()
        .filter(|k| k.applies_to_nodes())
        .filter_map(|k| k.default.clone().map(|d| (k.name.clone(), d)))
        .collect();
    if defaults.is_empty() {
        return;
    }
    for idx in 0..graph.node_count() {
        for (name, value) in &defaults {
            if graph.nodes()[idx].attr(name).is_none() {
                graph.set_attribute(idx, name, value.clone());
            }
        }
    }
}

/// Read and parse a GraphML file in one pass.
#[instrument]
pub fn load_graphml(path: &Path) -> Result<KnowledgeGraph> {
    let xml = std::fs::read_to_string(path)?;
    parse_graphml(&xml)
}
