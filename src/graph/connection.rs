//! Directed connections between nodes.
//!
//! A connection always starts at a concrete node. Its far end is either a bound
//! node or a pending placeholder for a decision branch that has not been
//! attached yet.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::graph::NodeId;

/// Key of an unresolved decision branch: the decision node and the criterion it belongs to.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BranchKey {
    pub node: NodeId,
    pub criteria_id: String,
}

impl BranchKey {
    pub fn new(
        node: impl Into<NodeId>,
        criteria_id: impl Into<String>,
    ) -> Self {
        Self {
            node: node.into(),
            criteria_id: criteria_id.into(),
        }
    }
}

impl fmt::Display for BranchKey {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}#{}", self.node, self.criteria_id)
    }
}

/// Far end of a connection.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(tag = "type", content = "target", rename_all = "snake_case")]
pub enum ConnectionTarget {
    Bound(NodeId),
    Pending(BranchKey),
}

impl ConnectionTarget {
    pub fn bound(id: impl Into<NodeId>) -> Self {
        ConnectionTarget::Bound(id.into())
    }

    pub fn node_id(&self) -> Option<&NodeId> {
        match self {
            ConnectionTarget::Bound(id) => Some(id),
            ConnectionTarget::Pending(_) => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ConnectionTarget::Pending(_))
    }

    pub fn is_node(
        &self,
        id: &str,
    ) -> bool {
        matches!(self, ConnectionTarget::Bound(n) if n == id)
    }
}

impl fmt::Display for ConnectionTarget {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            ConnectionTarget::Bound(id) => write!(f, "{}", id),
            ConnectionTarget::Pending(key) => write!(f, "pending({})", key),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    /// source node id
    pub from: NodeId,
    /// bound node or pending placeholder
    pub to: ConnectionTarget,
    /// optional label, the criterion label for decision branches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// criterion of the source decision node this connection belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criteria_id: Option<String>,
}

impl Connection {
    pub fn new(
        from: impl Into<NodeId>,
        to: ConnectionTarget,
    ) -> Self {
        Self {
            from: from.into(),
            to,
            label: None,
            criteria_id: None,
        }
    }

    /// A pending branch placeholder for criterion `criteria_id` of decision node `from`.
    pub fn pending_branch(
        from: &str,
        criteria_id: &str,
        label: &str,
    ) -> Self {
        Self {
            from: from.to_string(),
            to: ConnectionTarget::Pending(BranchKey::new(from, criteria_id)),
            label: (!label.is_empty()).then(|| label.to_string()),
            criteria_id: Some(criteria_id.to_string()),
        }
    }

    pub fn with_label(
        mut self,
        label: Option<String>,
    ) -> Self {
        self.label = label;
        self
    }

    pub fn with_criteria(
        mut self,
        criteria_id: Option<String>,
    ) -> Self {
        self.criteria_id = criteria_id;
        self
    }

    pub fn touches(
        &self,
        id: &str,
    ) -> bool {
        self.from == id || self.to.is_node(id)
    }

    pub fn is_pair(
        &self,
        from: &str,
        to: &ConnectionTarget,
    ) -> bool {
        self.from == from && &self.to == to
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_target_serializes_as_tagged_enum() {
        let c = Connection::pending_branch("d1", "yes", "Yes");
        let value = serde_json::to_value(&c).unwrap();
        assert_eq!(
            value,
            json!({
                "from": "d1",
                "to": {"type": "pending", "target": {"node": "d1", "criteria_id": "yes"}},
                "label": "Yes",
                "criteria_id": "yes"
            })
        );
        let bound = Connection::new("a", ConnectionTarget::bound("b"));
        let value = serde_json::to_value(&bound).unwrap();
        assert_eq!(value, json!({"from": "a", "to": {"type": "bound", "target": "b"}}));
    }

    #[test]
    fn test_touches() {
        let c = Connection::new("a", ConnectionTarget::bound("b"));
        assert!(c.touches("a"));
        assert!(c.touches("b"));
        assert!(!c.touches("c"));
        let p = Connection::pending_branch("d1", "no", "");
        assert!(!p.to.is_node("d1"));
        assert!(p.label.is_none());
    }
}
