use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::graph::Position;

/// node id
pub type NodeId = String;

/// Id of the single start node every graph carries.
pub const START_NODE_ID: &str = "start";

/// Kind of a placed diagram element.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, strum::AsRefStr, strum::EnumString, strum::EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NodeKind {
    Start,
    End,
    #[default]
    Task,
    Decision,
    Input,
    Document,
    Action,
}

impl NodeKind {
    /// Whether the node counts as a process step (everything but start and end markers).
    pub fn is_step(&self) -> bool {
        !matches!(self, NodeKind::Start | NodeKind::End)
    }
}

/// Advisory marker attached to a node. A node carries each kind at most once.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, strum::AsRefStr, strum::EnumString, strum::EnumIter)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum AdvisoryTag {
    TimeSink,
    QualityRisk,
    Bottleneck,
    ComplianceRisk,
    Automatable,
}

/// Freeform list fields on a node that share organization-wide suggestions.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, strum::AsRefStr, strum::EnumString, strum::EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ListField {
    Triggers,
    Inputs,
    Outputs,
    Dependencies,
}

/// Preset families of decision criteria.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DecisionType {
    YesNo,
    ApproveReject,
    #[default]
    Custom,
}

impl DecisionType {
    /// Criteria a preset expands to. `Custom` has no preset.
    pub fn preset(&self) -> Option<Vec<Criterion>> {
        match self {
            DecisionType::YesNo => Some(vec![Criterion::new("yes", "Yes"), Criterion::new("no", "No")]),
            DecisionType::ApproveReject => Some(vec![Criterion::new("approve", "Approve"), Criterion::new("reject", "Reject")]),
            DecisionType::Custom => None,
        }
    }
}

/// One outcome of a decision node. Each criterion owns exactly one outgoing connection.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Criterion {
    pub id: String,
    #[serde(default)]
    pub label: String,
}

impl Criterion {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct DecisionConfig {
    #[serde(default)]
    pub decision_type: DecisionType,
    #[serde(default)]
    pub criteria: Vec<Criterion>,
}

impl DecisionConfig {
    pub fn criterion(
        &self,
        id: &str,
    ) -> Option<&Criterion> {
        self.criteria.iter().find(|c| c.id == id)
    }

    pub fn index_of(
        &self,
        id: &str,
    ) -> Option<usize> {
        self.criteria.iter().position(|c| c.id == id)
    }
}

/// Kind-specific configuration. Fields that do not apply to a kind stay empty.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    /// expected duration in minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    /// trigger selector for start/input nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
    /// action selector for action nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// legacy single responsible team, counted as a dependency
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<DecisionConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub triggers: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
}

impl NodeConfig {
    pub fn list(
        &self,
        field: ListField,
    ) -> &Vec<String> {
        match field {
            ListField::Triggers => &self.triggers,
            ListField::Inputs => &self.inputs,
            ListField::Outputs => &self.outputs,
            ListField::Dependencies => &self.dependencies,
        }
    }

    pub fn list_mut(
        &mut self,
        field: ListField,
    ) -> &mut Vec<String> {
        match field {
            ListField::Triggers => &mut self.triggers,
            ListField::Inputs => &mut self.inputs,
            ListField::Outputs => &mut self.outputs,
            ListField::Dependencies => &mut self.dependencies,
        }
    }

    /// Adds a trimmed entry unless an entry equal ignoring case is present.
    /// Returns the stored value when something was added.
    pub fn push_unique(
        &mut self,
        field: ListField,
        value: &str,
    ) -> Option<String> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        let list = self.list_mut(field);
        if list.iter().any(|v| v.trim().eq_ignore_ascii_case(value)) {
            return None;
        }
        list.push(value.to_string());
        Some(value.to_string())
    }

    pub fn remove_entry(
        &mut self,
        field: ListField,
        value: &str,
    ) -> bool {
        let value = value.trim();
        let list = self.list_mut(field);
        let before = list.len();
        list.retain(|v| !v.trim().eq_ignore_ascii_case(value));
        list.len() != before
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// node id
    pub id: NodeId,
    /// node kind
    pub kind: NodeKind,
    /// display label
    #[serde(default)]
    pub label: String,
    /// top-left corner in model space
    pub position: Position,
    /// kind-specific configuration
    #[serde(default)]
    pub config: NodeConfig,
    /// advisory tags
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<AdvisoryTag>,
}

impl Node {
    pub fn new(
        id: impl Into<NodeId>,
        kind: NodeKind,
        label: impl Into<String>,
        position: Position,
    ) -> Self {
        let config = NodeConfig {
            decision: (kind == NodeKind::Decision).then(DecisionConfig::default),
            ..Default::default()
        };
        Self {
            id: id.into(),
            kind,
            label: label.into(),
            position,
            config,
            tags: BTreeSet::new(),
        }
    }

    pub fn start(position: Position) -> Self {
        Self::new(START_NODE_ID, NodeKind::Start, "Start", position)
    }

    pub fn is_start(&self) -> bool {
        self.kind == NodeKind::Start
    }

    pub fn is_decision(&self) -> bool {
        self.kind == NodeKind::Decision
    }

    pub fn criteria(&self) -> &[Criterion] {
        self.config.decision.as_ref().map(|d| d.criteria.as_slice()).unwrap_or(&[])
    }
}

/// Partial update applied by `Graph::update_node`. `None` leaves a field unchanged;
/// `Some(None)` on an optional field clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<Option<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<Option<String>>,
    /// full replacement of the decision config; branches are reconciled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<DecisionConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triggers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeSet<AdvisoryTag>>,
}

impl NodePatch {
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Default::default()
        }
    }

    pub fn position(position: Position) -> Self {
        Self {
            position: Some(position),
            ..Default::default()
        }
    }

    /// Applies every field except `decision`, which the graph reconciles separately.
    pub(crate) fn apply_fields(
        &self,
        node: &mut Node,
    ) {
        if let Some(label) = &self.label {
            node.label = label.clone();
        }
        if let Some(position) = self.position {
            node.position = position;
        }
        let config = &mut node.config;
        if let Some(v) = &self.description {
            config.description = v.clone();
        }
        if let Some(v) = &self.assignee {
            config.assignee = v.clone();
        }
        if let Some(v) = self.duration {
            config.duration = v;
        }
        if let Some(v) = &self.trigger {
            config.trigger = v.clone();
        }
        if let Some(v) = &self.action {
            config.action = v.clone();
        }
        if let Some(v) = &self.team {
            config.team = v.clone();
        }
        if let Some(v) = &self.triggers {
            config.triggers = v.clone();
        }
        if let Some(v) = &self.inputs {
            config.inputs = v.clone();
        }
        if let Some(v) = &self.outputs {
            config.outputs = v.clone();
        }
        if let Some(v) = &self.dependencies {
            config.dependencies = v.clone();
        }
        if let Some(tags) = &self.tags {
            node.tags = tags.clone();
        }
    }
}
