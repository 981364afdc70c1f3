use std::collections::BTreeSet;

use crate::graph::{Graph, NodeId};

/// The set of selected node ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<NodeId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(
        &self,
        id: &str,
    ) -> bool {
        self.ids.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn ids(&self) -> impl Iterator<Item = &NodeId> {
        self.ids.iter()
    }

    pub fn to_vec(&self) -> Vec<NodeId> {
        self.ids.iter().cloned().collect()
    }

    /// Replaces the selection. Returns whether it changed.
    pub fn replace(
        &mut self,
        ids: impl IntoIterator<Item = NodeId>,
    ) -> bool {
        let next: BTreeSet<NodeId> = ids.into_iter().collect();
        if next == self.ids {
            return false;
        }
        self.ids = next;
        true
    }

    pub fn insert(
        &mut self,
        id: impl Into<NodeId>,
    ) -> bool {
        self.ids.insert(id.into())
    }

    /// Flips membership of `id`. Returns whether it is selected afterwards.
    pub fn toggle(
        &mut self,
        id: &str,
    ) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.to_string());
            true
        }
    }

    pub fn clear(&mut self) -> bool {
        if self.ids.is_empty() {
            return false;
        }
        self.ids.clear();
        true
    }

    /// Drops ids that no longer exist in `graph`. Returns whether anything was dropped.
    pub fn retain_existing(
        &mut self,
        graph: &Graph,
    ) -> bool {
        let before = self.ids.len();
        self.ids.retain(|id| graph.contains(id));
        self.ids.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Node, NodeKind, Position, START_NODE_ID};

    #[test]
    fn test_replace_and_toggle() {
        let mut selection = Selection::new();
        assert!(selection.replace(vec!["a".to_string(), "b".to_string()]));
        assert!(!selection.replace(vec!["b".to_string(), "a".to_string()]));
        assert!(!selection.toggle("a"));
        assert!(selection.toggle("c"));
        assert_eq!(selection.to_vec(), vec!["b".to_string(), "c".to_string()]);
        assert!(selection.clear());
        assert!(!selection.clear());
    }

    #[test]
    fn test_retain_existing() {
        let mut graph = Graph::new();
        graph.add_node(Node::new("a", NodeKind::Task, "A", Position::new(0, 0))).unwrap();
        let mut selection = Selection::new();
        selection.replace(vec!["a".to_string(), "gone".to_string(), START_NODE_ID.to_string()]);
        assert!(selection.retain_existing(&graph));
        assert_eq!(selection.len(), 2);
        assert!(!selection.retain_existing(&graph));
    }
}
