//! Palette collaborator: which node kinds can be created, with what defaults.

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::graph::{NodeConfig, NodeKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteEntry {
    pub kind: NodeKind,
    /// label given to a freshly placed node
    pub label: String,
    #[serde(default)]
    pub description: String,
    /// configuration a freshly placed node starts with
    #[serde(default)]
    pub config: NodeConfig,
}

pub trait Palette: Send + Sync {
    fn entries(&self) -> Vec<PaletteEntry>;

    fn entry(
        &self,
        kind: NodeKind,
    ) -> Option<PaletteEntry> {
        self.entries().into_iter().find(|e| e.kind == kind)
    }
}

/// Every kind except `start`, which each graph already owns.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPalette;

impl Palette for DefaultPalette {
    fn entries(&self) -> Vec<PaletteEntry> {
        NodeKind::iter()
            .filter(|k| *k != NodeKind::Start)
            .map(|kind| {
                let (label, description) = match kind {
                    NodeKind::End => ("End", "Marks the end of the process"),
                    NodeKind::Decision => ("Decision", "Splits the flow into branches"),
                    NodeKind::Input => ("Input", "Information entering the process"),
                    NodeKind::Document => ("Document", "A document produced or consumed"),
                    NodeKind::Action => ("Action", "An automated action"),
                    NodeKind::Task | NodeKind::Start => ("Task", "A manual step"),
                };
                let config = NodeConfig {
                    decision: (kind == NodeKind::Decision).then(Default::default),
                    ..Default::default()
                };
                PaletteEntry {
                    kind,
                    label: label.to_string(),
                    description: description.to_string(),
                    config,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_palette() {
        let palette = DefaultPalette;
        assert_eq!(palette.entries().len(), 6);
        assert!(palette.entry(NodeKind::Start).is_none());
        let decision = palette.entry(NodeKind::Decision).unwrap();
        assert!(decision.config.decision.is_some());
        assert_eq!(palette.entry(NodeKind::Task).unwrap().label, "Task");
    }
}
