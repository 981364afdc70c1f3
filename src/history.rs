//! Linear undo over full-graph snapshots.
//!
//! The list always holds at least one entry, the committed state at the cursor.
//! Recording after an undo drops everything past the cursor. Restoring a snapshot
//! never records, so undo cannot feed itself.

use std::collections::VecDeque;

use serde::Serialize;
use tracing::debug;

use crate::graph::Graph;

#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<Graph>,
    cursor: usize,
    capacity: usize,
}

/// Short summary published with `HistoryChanged`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistoryStatus {
    pub len: usize,
    pub cursor: usize,
    pub can_undo: bool,
}

impl History {
    /// A history whose only entry is `initial`. `capacity` is clamped to at least 1.
    pub fn new(
        capacity: usize,
        initial: Graph,
    ) -> Self {
        Self {
            entries: VecDeque::from([initial]),
            cursor: 0,
            capacity: capacity.max(1),
        }
    }

    /// The committed snapshot at the cursor.
    pub fn current(&self) -> &Graph {
        &self.entries[self.cursor]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn status(&self) -> HistoryStatus {
        HistoryStatus {
            len: self.len(),
            cursor: self.cursor,
            can_undo: self.can_undo(),
        }
    }

    /// Appends `snapshot` after the cursor. A snapshot equal to the current one is
    /// ignored. Returns whether an entry was added.
    pub fn record(
        &mut self,
        snapshot: Graph,
    ) -> bool {
        if self.current() == &snapshot {
            return false;
        }
        self.entries.truncate(self.cursor + 1);
        self.entries.push_back(snapshot);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.cursor = self.entries.len() - 1;
        debug!("history::record(len: {}, cursor: {})", self.entries.len(), self.cursor);
        true
    }

    /// Steps back one entry and returns the snapshot to restore.
    pub fn undo(&mut self) -> Option<&Graph> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        debug!("history::undo(cursor: {})", self.cursor);
        Some(&self.entries[self.cursor])
    }

    /// Forgets everything and starts over from `snapshot`.
    pub fn reset(
        &mut self,
        snapshot: Graph,
    ) {
        self.entries.clear();
        self.entries.push_back(snapshot);
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Node, NodeKind, Position};

    fn with_node(
        graph: &Graph,
        i: i32,
    ) -> Graph {
        let mut next = graph.clone();
        next.add_node(Node::new(format!("n{}", i), NodeKind::Task, "step", Position::new(i, i))).unwrap();
        next
    }

    #[test]
    fn test_record_skips_identical_snapshot() {
        let mut history = History::new(100, Graph::new());
        assert!(!history.record(Graph::new()));
        assert_eq!(history.len(), 1);
        assert!(!history.can_undo());
    }

    #[test]
    fn test_undo_restores_prior_snapshot() {
        let initial = Graph::new();
        let mut history = History::new(100, initial.clone());
        let next = with_node(&initial, 1);
        assert!(history.record(next.clone()));
        assert_eq!(history.current(), &next);
        assert_eq!(history.undo(), Some(&initial));
        assert_eq!(history.undo(), None);
    }

    #[test]
    fn test_record_after_undo_truncates_tail() {
        let g0 = Graph::new();
        let g1 = with_node(&g0, 1);
        let g2 = with_node(&g1, 2);
        let mut history = History::new(100, g0.clone());
        history.record(g1.clone());
        history.record(g2);
        history.undo();
        history.undo();
        assert_eq!(history.len(), 3);

        let other = with_node(&g0, 9);
        history.record(other.clone());
        assert_eq!(history.len(), 2);
        assert_eq!(history.cursor(), 1);
        assert_eq!(history.current(), &other);
        assert_eq!(history.undo(), Some(&g0));
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut graph = Graph::new();
        let mut history = History::new(100, graph.clone());
        for i in 0..101 {
            graph = with_node(&graph, i);
            history.record(graph.clone());
        }
        assert_eq!(history.len(), 100);
        assert_eq!(history.cursor(), 99);
        let mut undos = 0;
        while history.undo().is_some() {
            undos += 1;
        }
        assert_eq!(undos, 99);
        // the oldest retained entry already holds the first two added nodes
        assert_eq!(history.current().nodes().len(), 3);
    }

    #[test]
    fn test_reset() {
        let g0 = Graph::new();
        let mut history = History::new(0, g0.clone());
        assert_eq!(history.capacity(), 1);
        history.record(with_node(&g0, 1));
        assert_eq!(history.len(), 1);
        history.reset(g0.clone());
        assert_eq!(history.current(), &g0);
        assert_eq!(history.status(), HistoryStatus {
            len: 1,
            cursor: 0,
            can_undo: false,
        });
    }
}
