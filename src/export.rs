// src/export.rs

//! Diagnostic graph export.
//!
//! Renders a graph to graphviz text, escapes the rendering into a single
//! opaque text field, and hands it to a [`GraphSink`]. No scheduling logic
//! lives here; labels are produced by the caller and never read back.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::info;

use crate::graph::command::{CommandGraph, EdgeKind};
use crate::graph::task::TaskGraph;

/// Where finished renderings go. Production uses [`TracingSink`]; tests
/// can record the handoff instead.
pub trait GraphSink {
    /// Receive one named rendering. `data` arrives with newlines and
    /// quotes escaped, safe to embed as a single text field.
    fn emit(&mut self, name: &str, data: &str);
}

/// Forwards renderings into the tracing pipeline.
pub struct TracingSink;

impl GraphSink for TracingSink {
    fn emit(&mut self, name: &str, data: &str) {
        info!(target: "shardplan::graphs", name = %name, data = %data, "graph rendering");
    }
}

/// Render a directed graph to graphviz text with caller-supplied vertex
/// label and edge attribute producers.
pub fn render_dot<N, E>(
    name: &str,
    graph: &DiGraph<N, E>,
    mut vertex_label: impl FnMut(NodeIndex, &N) -> String,
    mut edge_attrs: impl FnMut(&E) -> Option<String>,
) -> String {
    let mut dot = format!("digraph \"{name}\" {{\n");
    for v in graph.node_indices() {
        dot.push_str(&format!(
            "  {} [label=\"{}\"];\n",
            v.index(),
            vertex_label(v, &graph[v])
        ));
    }
    for e in graph.edge_references() {
        let (s, t) = (e.source().index(), e.target().index());
        match edge_attrs(e.weight()) {
            Some(attrs) => dot.push_str(&format!("  {s} -> {t} [{attrs}];\n")),
            None => dot.push_str(&format!("  {s} -> {t};\n")),
        }
    }
    dot.push_str("}\n");
    dot
}

/// Escape a rendering so a sink can treat it as one opaque text field.
pub fn escape_for_sink(s: &str) -> String {
    s.replace('\n', "\\n").replace('"', "\\\"")
}

pub fn task_graph_dot(tdag: &TaskGraph) -> String {
    render_dot(
        tdag.name(),
        tdag.graph(),
        |_, node| {
            let mark = if node.processed { " (processed)" } else { "" };
            format!("Task {}{mark}", node.id)
        },
        |_| None,
    )
}

pub fn command_graph_dot(cdag: &CommandGraph) -> String {
    render_dot(
        cdag.name(),
        cdag.graph(),
        |_, v| v.label.clone(),
        |kind| match kind {
            EdgeKind::Order => None,
            EdgeKind::Sync => Some("style=dashed".to_string()),
        },
    )
}

pub fn export_task_graph(tdag: &TaskGraph, sink: &mut dyn GraphSink) {
    sink.emit(tdag.name(), &escape_for_sink(&task_graph_dot(tdag)));
}

pub fn export_command_graph(cdag: &CommandGraph, sink: &mut dyn GraphSink) {
    sink.emit(cdag.name(), &escape_for_sink(&command_graph_dot(cdag)));
}
