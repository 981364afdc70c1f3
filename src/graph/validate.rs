//! Structural report over a graph, built on a petgraph projection.

use std::collections::HashMap;

use petgraph::{
    graph::{DiGraph, NodeIndex},
    visit::Dfs,
};
use serde::Serialize;

use crate::graph::{BranchKey, ConnectionTarget, Graph, NodeId, NodeKind};

/// Authoring issues that do not break an invariant but usually need attention.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// nodes no path from start reaches
    pub unreachable: Vec<NodeId>,
    /// nodes without outgoing connections that are not end markers
    pub dead_ends: Vec<NodeId>,
    /// decision branches not attached to a node yet
    pub pending: Vec<BranchKey>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.unreachable.is_empty() && self.dead_ends.is_empty() && self.pending.is_empty()
    }
}

impl Graph {
    /// Projects bound connections into a petgraph digraph.
    fn digraph(&self) -> (DiGraph<&str, ()>, HashMap<&str, NodeIndex>) {
        let mut graph = DiGraph::new();
        let mut index = HashMap::new();
        for node in self.nodes() {
            index.insert(node.id.as_str(), graph.add_node(node.id.as_str()));
        }
        for c in self.connections() {
            if let ConnectionTarget::Bound(to) = &c.to {
                if let (Some(a), Some(b)) = (index.get(c.from.as_str()), index.get(to.as_str())) {
                    graph.add_edge(*a, *b, ());
                }
            }
        }
        (graph, index)
    }

    pub fn validate(&self) -> ValidationReport {
        let (graph, index) = self.digraph();
        let mut reached = vec![false; graph.node_count()];
        if let Some(start) = self.start_node().and_then(|n| index.get(n.id.as_str())) {
            let mut dfs = Dfs::new(&graph, *start);
            while let Some(idx) = dfs.next(&graph) {
                reached[idx.index()] = true;
            }
        }

        let mut report = ValidationReport::default();
        for node in self.nodes() {
            let Some(idx) = index.get(node.id.as_str()) else {
                continue;
            };
            if !reached[idx.index()] {
                report.unreachable.push(node.id.clone());
            }
            // pending branches count as outgoing
            if node.kind != NodeKind::End && self.outgoing(&node.id).next().is_none() {
                report.dead_ends.push(node.id.clone());
            }
        }
        report.pending = self.pending_branches().cloned().collect();
        report
    }

    /// Output a human-readable representation of the graph
    pub fn schema(&self) -> String {
        let mut lines = Vec::new();

        lines.push("=== Workflow Graph ===".to_string());
        lines.push(format!("Nodes: {}, Connections: {}", self.nodes().len(), self.connections().len()));
        lines.push(String::new());

        lines.push("--- Nodes ---".to_string());
        for node in self.nodes() {
            lines.push(format!("[{}] {} (kind: {}, at: {},{})", node.id, node.label, node.kind.as_ref(), node.position.x(), node.position.y()));
        }
        lines.push(String::new());

        lines.push("--- Connections ---".to_string());
        for c in self.connections() {
            let label = c.label.as_deref().unwrap_or("");
            lines.push(format!("{} --[{}]--> {}", c.from, label, c.to));
        }

        lines.join("\n")
    }
}
