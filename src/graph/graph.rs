//! Canonical node and connection storage.
//!
//! `Graph` owns every node and connection of one workflow and enforces the
//! structural invariants on each operation:
//!
//! - exactly one `start` node, which can never be removed
//! - every connection starts at an existing node and never ends at `start`
//! - no two connections share a (from, to) pair
//! - a decision node with N criteria has exactly N outgoing connections, one per criterion id
//!
//! Operations validate before they mutate, so a rejected operation leaves the
//! graph untouched. Compound edits go through [`Graph::transaction`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    CanvasError, Result,
    graph::{
        AdvisoryTag, BranchKey, Connection, ConnectionTarget, Criterion, DecisionConfig, DecisionType, ListField, Node, NodeId, NodePatch, Position,
    },
};

/// Where a freshly created graph puts its start node.
pub const DEFAULT_START_POSITION: Position = Position::new(370, 70);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(try_from = "GraphParts")]
pub struct Graph {
    nodes: Vec<Node>,
    connections: Vec<Connection>,
}

#[derive(Deserialize)]
struct GraphParts {
    #[serde(default)]
    nodes: Vec<Node>,
    #[serde(default)]
    connections: Vec<Connection>,
}

impl TryFrom<GraphParts> for Graph {
    type Error = CanvasError;

    fn try_from(parts: GraphParts) -> Result<Self> {
        Self::from_parts(parts.nodes, parts.connections)
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    /// A graph holding only the start node.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::start(DEFAULT_START_POSITION)],
            connections: Vec::new(),
        }
    }

    /// Builds a graph from persisted parts.
    ///
    /// A missing start node is added and decision branches are reconciled with
    /// their criteria lists; anything else that breaks an invariant is rejected.
    pub fn from_parts(
        nodes: Vec<Node>,
        connections: Vec<Connection>,
    ) -> Result<Self> {
        let mut graph = Self {
            nodes,
            connections,
        };
        if !graph.nodes.iter().any(|n| n.is_start()) {
            graph.nodes.insert(0, Node::start(DEFAULT_START_POSITION));
        }

        let decisions: Vec<(NodeId, DecisionConfig)> =
            graph.nodes.iter().filter(|n| n.is_decision()).map(|n| (n.id.clone(), n.config.decision.clone().unwrap_or_default())).collect();
        // stray criteria ids (no matching criterion) are dropped before reconciling
        graph.connections.retain(|c| match &c.criteria_id {
            Some(cid) => decisions.iter().any(|(id, d)| id == &c.from && d.criterion(cid).is_some()),
            None => true,
        });
        for (id, decision) in decisions {
            graph.reconcile_branches(&id, decision)?;
        }

        graph.check_invariants()?;
        Ok(graph)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn into_parts(self) -> (Vec<Node>, Vec<Connection>) {
        (self.nodes, self.connections)
    }

    pub fn node(
        &self,
        id: &str,
    ) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn contains(
        &self,
        id: &str,
    ) -> bool {
        self.node(id).is_some()
    }

    pub fn start_node(&self) -> Option<&Node> {
        self.nodes.iter().find(|n| n.is_start())
    }

    pub fn require(
        &self,
        id: &str,
    ) -> Result<&Node> {
        self.node(id).ok_or_else(|| CanvasError::NodeNotFound(id.to_string()))
    }

    fn require_mut(
        &mut self,
        id: &str,
    ) -> Result<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id).ok_or_else(|| CanvasError::NodeNotFound(id.to_string()))
    }

    pub fn connection(
        &self,
        from: &str,
        to: &ConnectionTarget,
    ) -> Option<&Connection> {
        self.connections.iter().find(|c| c.is_pair(from, to))
    }

    pub fn outgoing<'a>(
        &'a self,
        id: &'a str,
    ) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections.iter().filter(move |c| c.from == id)
    }

    pub fn incoming<'a>(
        &'a self,
        id: &'a str,
    ) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections.iter().filter(move |c| c.to.is_node(id))
    }

    /// Outgoing branches of a decision node ordered by their criterion's position
    /// in the criteria list, paired with that index.
    pub fn branches(
        &self,
        id: &str,
    ) -> Vec<(usize, &Connection)> {
        let Some(decision) = self.node(id).and_then(|n| n.config.decision.as_ref()) else {
            return Vec::new();
        };
        let mut branches: Vec<(usize, &Connection)> =
            self.connections.iter().filter(|c| c.from == id).filter_map(|c| c.criteria_id.as_deref().and_then(|cid| decision.index_of(cid)).map(|i| (i, c))).collect();
        branches.sort_by_key(|(i, _)| *i);
        branches
    }

    /// All unresolved placeholders in the graph.
    pub fn pending_branches(&self) -> impl Iterator<Item = &BranchKey> {
        self.connections.iter().filter_map(|c| match &c.to {
            ConnectionTarget::Pending(key) => Some(key),
            ConnectionTarget::Bound(_) => None,
        })
    }

    /// Applies `f` to a copy of the graph and keeps the result only if `f` succeeds.
    pub fn transaction<T>(
        &mut self,
        f: impl FnOnce(&mut Graph) -> Result<T>,
    ) -> Result<T> {
        let mut draft = self.clone();
        let out = f(&mut draft)?;
        *self = draft;
        Ok(out)
    }

    /// Replaces the whole graph, used when restoring a snapshot.
    pub fn replace(
        &mut self,
        other: Graph,
    ) {
        *self = other;
    }

    pub fn add_node(
        &mut self,
        node: Node,
    ) -> Result<()> {
        trace!("graph::add_node({})", node.id);
        if node.id.is_empty() {
            return Err(CanvasError::Node("node id must not be empty".into()));
        }
        if self.contains(&node.id) {
            return Err(CanvasError::Node(format!("node {} already exists", node.id)));
        }
        if node.is_start() {
            return Err(CanvasError::Node("a graph has exactly one start node".into()));
        }
        if !node.is_decision() && node.config.decision.is_some() {
            return Err(CanvasError::Decision(format!("node {} is not a decision node", node.id)));
        }
        let decision = node.config.decision.clone();
        let id = node.id.clone();
        self.nodes.push(node);
        if let Some(decision) = decision {
            if let Err(e) = self.reconcile_branches(&id, decision) {
                self.nodes.pop();
                return Err(e);
            }
        }
        Ok(())
    }

    pub fn update_node(
        &mut self,
        id: &str,
        patch: &NodePatch,
    ) -> Result<()> {
        trace!("graph::update_node({})", id);
        let node = self.require(id)?;
        if patch.decision.is_some() && !node.is_decision() {
            return Err(CanvasError::Decision(format!("node {} is not a decision node", id)));
        }
        if let Some(decision) = &patch.decision {
            validate_criteria(&decision.criteria)?;
        }
        let node = self.require_mut(id)?;
        patch.apply_fields(node);
        if let Some(decision) = patch.decision.clone() {
            self.reconcile_branches(id, decision)?;
        }
        Ok(())
    }

    pub fn move_node(
        &mut self,
        id: &str,
        position: Position,
    ) -> Result<()> {
        self.require_mut(id)?.position = position;
        Ok(())
    }

    /// Removes a node and its connections. Decision branches that were bound to
    /// the removed node fall back to pending placeholders.
    pub fn remove_node(
        &mut self,
        id: &str,
    ) -> Result<Node> {
        trace!("graph::remove_node({})", id);
        let node = self.require(id)?;
        if node.is_start() {
            return Err(CanvasError::StartNodeProtected);
        }
        let index = self.nodes.iter().position(|n| n.id == id).ok_or_else(|| CanvasError::NodeNotFound(id.to_string()))?;
        let node = self.nodes.remove(index);

        self.connections.retain(|c| c.from != id);
        let mut released = Vec::new();
        self.connections.retain(|c| {
            if !c.to.is_node(id) {
                return true;
            }
            if let Some(cid) = &c.criteria_id {
                released.push(Connection::pending_branch(&c.from, cid, c.label.as_deref().unwrap_or_default()));
            }
            false
        });
        self.connections.extend(released);
        Ok(node)
    }

    /// Removes several nodes as one operation; fails without changes if any id
    /// is unknown or protected.
    pub fn remove_nodes(
        &mut self,
        ids: &[NodeId],
    ) -> Result<Vec<Node>> {
        for id in ids {
            if self.require(id)?.is_start() {
                return Err(CanvasError::StartNodeProtected);
            }
        }
        self.transaction(|g| ids.iter().map(|id| g.remove_node(id)).collect())
    }

    /// Adds an explicit link. A link leaving a decision node without a criterion
    /// synthesizes a new criterion for it.
    pub fn add_connection(
        &mut self,
        from: &str,
        to: ConnectionTarget,
        label: Option<String>,
        criteria_id: Option<String>,
    ) -> Result<()> {
        trace!("graph::add_connection({} -> {})", from, to);
        let source = self.require(from)?;
        let target = match &to {
            ConnectionTarget::Bound(id) => id.clone(),
            ConnectionTarget::Pending(key) => {
                return Err(CanvasError::Connection(format!("placeholder {} is created from decision criteria, not linked", key)));
            }
        };
        self.validate_link(from, &target)?;

        if source.is_decision() {
            if criteria_id.is_some() {
                return Err(CanvasError::Decision(format!("every criterion of {} already owns a branch", from)));
            }
            let decision = source.config.decision.clone().unwrap_or_default();
            let cid = next_criterion_id(&decision);
            let label = label.unwrap_or_else(|| format!("Option {}", decision.criteria.len() + 1));
            let node = self.require_mut(from)?;
            let decision = node.config.decision.get_or_insert_with(DecisionConfig::default);
            decision.criteria.push(Criterion::new(cid.clone(), label.clone()));
            decision.decision_type = DecisionType::Custom;
            self.connections.push(Connection::new(from, to).with_label(Some(label)).with_criteria(Some(cid)));
            return Ok(());
        }
        if criteria_id.is_some() {
            return Err(CanvasError::Decision(format!("node {} is not a decision node", from)));
        }
        self.connections.push(Connection::new(from, to).with_label(label));
        Ok(())
    }

    /// Removes a connection. Removing a decision branch also removes its criterion.
    pub fn remove_connection(
        &mut self,
        from: &str,
        to: &ConnectionTarget,
    ) -> Result<Connection> {
        trace!("graph::remove_connection({} -> {})", from, to);
        let index = self
            .connections
            .iter()
            .position(|c| c.is_pair(from, to))
            .ok_or_else(|| CanvasError::Connection(format!("connection {} -> {} not found", from, to)))?;
        let connection = self.connections.remove(index);
        if let Some(cid) = &connection.criteria_id {
            if let Ok(node) = self.require_mut(from) {
                if let Some(decision) = node.config.decision.as_mut() {
                    decision.criteria.retain(|c| &c.id != cid);
                    decision.decision_type = DecisionType::Custom;
                }
            }
        }
        Ok(connection)
    }

    /// Checks that a bound link `from -> to` may be created.
    pub fn validate_link(
        &self,
        from: &str,
        to: &str,
    ) -> Result<()> {
        self.require(from)?;
        let target = self.require(to)?;
        if from == to {
            return Err(CanvasError::SelfConnection(from.to_string()));
        }
        if target.is_start() {
            return Err(CanvasError::ConnectToStart);
        }
        if self.connection(from, &ConnectionTarget::bound(to)).is_some() {
            return Err(CanvasError::DuplicateConnection {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        Ok(())
    }

    /// Switches a decision node to a preset (or custom) criteria family.
    pub fn set_decision_type(
        &mut self,
        id: &str,
        decision_type: DecisionType,
    ) -> Result<()> {
        let current = self.decision_config(id)?;
        let criteria = decision_type.preset().unwrap_or(current.criteria);
        self.reconcile_branches(
            id,
            DecisionConfig {
                decision_type,
                criteria,
            },
        )
    }

    /// Appends a criterion and its pending branch. Returns the new criterion id.
    pub fn add_criterion(
        &mut self,
        id: &str,
        label: &str,
    ) -> Result<String> {
        let mut decision = self.decision_config(id)?;
        let cid = next_criterion_id(&decision);
        decision.criteria.push(Criterion::new(cid.clone(), label));
        decision.decision_type = DecisionType::Custom;
        self.reconcile_branches(id, decision)?;
        Ok(cid)
    }

    /// Removes a criterion together with its branch.
    pub fn remove_criterion(
        &mut self,
        id: &str,
        criteria_id: &str,
    ) -> Result<()> {
        let mut decision = self.decision_config(id)?;
        if decision.criterion(criteria_id).is_none() {
            return Err(CanvasError::Decision(format!("criterion {} not found on {}", criteria_id, id)));
        }
        decision.criteria.retain(|c| c.id != criteria_id);
        decision.decision_type = DecisionType::Custom;
        self.reconcile_branches(id, decision)
    }

    pub fn rename_criterion(
        &mut self,
        id: &str,
        criteria_id: &str,
        label: &str,
    ) -> Result<()> {
        let mut decision = self.decision_config(id)?;
        let criterion = decision
            .criteria
            .iter_mut()
            .find(|c| c.id == criteria_id)
            .ok_or_else(|| CanvasError::Decision(format!("criterion {} not found on {}", criteria_id, id)))?;
        criterion.label = label.to_string();
        self.reconcile_branches(id, decision)
    }

    /// Attaches a pending placeholder to a concrete node.
    pub fn bind_pending(
        &mut self,
        key: &BranchKey,
        node_id: &str,
    ) -> Result<()> {
        trace!("graph::bind_pending({} -> {})", key, node_id);
        let pending = ConnectionTarget::Pending(key.clone());
        let index = self
            .connections
            .iter()
            .position(|c| c.is_pair(&key.node, &pending))
            .ok_or_else(|| CanvasError::Connection(format!("placeholder {} not found", key)))?;
        self.validate_link(&key.node, node_id)?;
        self.connections[index].to = ConnectionTarget::bound(node_id);
        Ok(())
    }

    /// Splits the bound connection `from -> to` into `from -> node -> to`. The `from`
    /// side keeps the original label and criterion.
    pub fn insert_between(
        &mut self,
        from: &str,
        to: &ConnectionTarget,
        node_id: &str,
    ) -> Result<()> {
        trace!("graph::insert_between({} -> {}, {})", from, to, node_id);
        let to_id = match to {
            ConnectionTarget::Bound(id) => id.clone(),
            ConnectionTarget::Pending(key) => return Err(CanvasError::PendingTarget(key.to_string())),
        };
        let index = self
            .connections
            .iter()
            .position(|c| c.is_pair(from, to))
            .ok_or_else(|| CanvasError::Connection(format!("connection {} -> {} not found", from, to)))?;
        self.validate_link(from, node_id)?;
        self.validate_link(node_id, &to_id)?;
        if self.require(node_id)?.is_decision() {
            return Err(CanvasError::Decision(format!("decision node {} cannot be inserted into a connection", node_id)));
        }

        let original = self.connections.remove(index);
        self.connections.push(Connection::new(from, ConnectionTarget::bound(node_id)).with_label(original.label).with_criteria(original.criteria_id));
        self.connections.push(Connection::new(node_id, ConnectionTarget::bound(to_id)));
        Ok(())
    }

    /// Adds an entry to one of a node's freeform lists. Returns the stored value if
    /// it was new.
    pub fn add_list_entry(
        &mut self,
        id: &str,
        field: ListField,
        value: &str,
    ) -> Result<Option<String>> {
        Ok(self.require_mut(id)?.config.push_unique(field, value))
    }

    pub fn remove_list_entry(
        &mut self,
        id: &str,
        field: ListField,
        value: &str,
    ) -> Result<bool> {
        Ok(self.require_mut(id)?.config.remove_entry(field, value))
    }

    /// Attaches or detaches an advisory tag. Returns whether anything changed.
    pub fn set_tag(
        &mut self,
        id: &str,
        tag: AdvisoryTag,
        attached: bool,
    ) -> Result<bool> {
        let node = self.require_mut(id)?;
        Ok(if attached { node.tags.insert(tag) } else { node.tags.remove(&tag) })
    }

    /// Verifies every structural invariant.
    pub fn check_invariants(&self) -> Result<()> {
        let starts: Vec<&Node> = self.nodes.iter().filter(|n| n.is_start()).collect();
        if starts.len() != 1 {
            return Err(CanvasError::Graph(format!("expected exactly one start node, found {}", starts.len())));
        }

        let mut ids = HashSet::new();
        for node in &self.nodes {
            if !ids.insert(node.id.as_str()) {
                return Err(CanvasError::Graph(format!("duplicate node id {}", node.id)));
            }
        }

        let mut pairs = HashSet::new();
        for c in &self.connections {
            if !ids.contains(c.from.as_str()) {
                return Err(CanvasError::Graph(format!("connection source {} does not exist", c.from)));
            }
            match &c.to {
                ConnectionTarget::Bound(to) => {
                    let target = self.node(to).ok_or_else(|| CanvasError::Graph(format!("connection target {} does not exist", to)))?;
                    if target.is_start() {
                        return Err(CanvasError::ConnectToStart);
                    }
                    if to == &c.from {
                        return Err(CanvasError::SelfConnection(to.clone()));
                    }
                }
                ConnectionTarget::Pending(key) => {
                    if key.node != c.from || c.criteria_id.as_deref() != Some(key.criteria_id.as_str()) {
                        return Err(CanvasError::Graph(format!("placeholder {} does not match its connection", key)));
                    }
                }
            }
            if !pairs.insert((c.from.as_str(), &c.to)) {
                return Err(CanvasError::DuplicateConnection {
                    from: c.from.clone(),
                    to: c.to.to_string(),
                });
            }
        }

        for node in &self.nodes {
            let outgoing: Vec<&Connection> = self.outgoing(&node.id).collect();
            if node.is_decision() {
                let criteria = node.criteria();
                let mut expected: Vec<&str> = criteria.iter().map(|c| c.id.as_str()).collect();
                let mut actual: Vec<&str> = outgoing.iter().filter_map(|c| c.criteria_id.as_deref()).collect();
                expected.sort_unstable();
                actual.sort_unstable();
                if outgoing.len() != criteria.len() || expected != actual {
                    return Err(CanvasError::Graph(format!(
                        "decision {} has {} criteria but {} branches",
                        node.id,
                        criteria.len(),
                        outgoing.len()
                    )));
                }
            } else if outgoing.iter().any(|c| c.criteria_id.is_some()) {
                return Err(CanvasError::Graph(format!("node {} is not a decision but owns a criterion branch", node.id)));
            }
        }
        Ok(())
    }

    fn decision_config(
        &self,
        id: &str,
    ) -> Result<DecisionConfig> {
        let node = self.require(id)?;
        if !node.is_decision() {
            return Err(CanvasError::Decision(format!("node {} is not a decision node", id)));
        }
        Ok(node.config.decision.clone().unwrap_or_default())
    }

    /// Makes the decision node's branches match `decision` exactly: branches of
    /// surviving criteria are kept (their label follows the criterion), branches of
    /// dropped criteria are removed, and new criteria get a pending branch.
    fn reconcile_branches(
        &mut self,
        id: &str,
        decision: DecisionConfig,
    ) -> Result<()> {
        validate_criteria(&decision.criteria)?;

        self.connections.retain(|c| {
            if c.from != id {
                return true;
            }
            matches!(&c.criteria_id, Some(cid) if decision.criterion(cid).is_some())
        });
        for criterion in &decision.criteria {
            let label = (!criterion.label.is_empty()).then(|| criterion.label.clone());
            match self.connections.iter_mut().find(|c| c.from == id && c.criteria_id.as_deref() == Some(criterion.id.as_str())) {
                Some(existing) => existing.label = label,
                None => self.connections.push(Connection::pending_branch(id, &criterion.id, &criterion.label)),
            }
        }

        let node = self.require_mut(id)?;
        node.config.decision = Some(decision);
        Ok(())
    }
}

fn validate_criteria(criteria: &[Criterion]) -> Result<()> {
    let mut seen = HashSet::new();
    for c in criteria {
        if c.id.trim().is_empty() {
            return Err(CanvasError::Decision("criterion id must not be empty".into()));
        }
        if !seen.insert(c.id.as_str()) {
            return Err(CanvasError::Decision(format!("duplicate criterion id {}", c.id)));
        }
    }
    Ok(())
}

fn next_criterion_id(decision: &DecisionConfig) -> String {
    (1..).map(|i| format!("option-{}", i)).find(|cid| decision.criterion(cid).is_none()).unwrap_or_default()
}
