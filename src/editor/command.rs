use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    Editor, Result,
    graph::{AdvisoryTag, BranchKey, ConnectionTarget, DecisionType, ListField, Node, NodeId, NodePatch, Position},
};

/// Serializable form of every structural editor command, for hosts that drive the
/// editor over a message channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, strum::AsRefStr)]
#[serde(tag = "type", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EditorCommand {
    AddNode {
        node: Node,
    },
    UpdateNode {
        id: NodeId,
        patch: NodePatch,
    },
    MoveNode {
        id: NodeId,
        position: Position,
    },
    RemoveNodes {
        ids: Vec<NodeId>,
    },
    AddConnection {
        from: NodeId,
        to: NodeId,
        #[serde(default)]
        label: Option<String>,
    },
    RemoveConnection {
        from: NodeId,
        to: ConnectionTarget,
    },
    SetDecisionType {
        id: NodeId,
        decision_type: DecisionType,
    },
    AddCriterion {
        id: NodeId,
        label: String,
    },
    RemoveCriterion {
        id: NodeId,
        criteria_id: String,
    },
    RenameCriterion {
        id: NodeId,
        criteria_id: String,
        label: String,
    },
    BindPending {
        key: BranchKey,
        node: NodeId,
    },
    InsertBetween {
        from: NodeId,
        to: NodeId,
        node: NodeId,
    },
    AddListEntry {
        id: NodeId,
        field: ListField,
        value: String,
    },
    RemoveListEntry {
        id: NodeId,
        field: ListField,
        value: String,
    },
    SetTag {
        id: NodeId,
        tag: AdvisoryTag,
        attached: bool,
    },
    Select {
        ids: Vec<NodeId>,
    },
    ClearSelection,
    SetName {
        name: String,
    },
    Undo,
}

impl Editor {
    pub fn execute(
        &mut self,
        command: EditorCommand,
    ) -> Result<()> {
        trace!("editor::execute({})", command.as_ref());
        match command {
            EditorCommand::AddNode {
                node,
            } => self.insert_node(node).map(|_| ()),
            EditorCommand::UpdateNode {
                id,
                patch,
            } => self.update_node(&id, &patch),
            EditorCommand::MoveNode {
                id,
                position,
            } => self.move_node(&id, position),
            EditorCommand::RemoveNodes {
                ids,
            } => self.remove_nodes(&ids),
            EditorCommand::AddConnection {
                from,
                to,
                label,
            } => self.add_connection(&from, &to, label),
            EditorCommand::RemoveConnection {
                from,
                to,
            } => self.remove_connection(&from, &to),
            EditorCommand::SetDecisionType {
                id,
                decision_type,
            } => self.set_decision_type(&id, decision_type),
            EditorCommand::AddCriterion {
                id,
                label,
            } => self.add_criterion(&id, &label).map(|_| ()),
            EditorCommand::RemoveCriterion {
                id,
                criteria_id,
            } => self.remove_criterion(&id, &criteria_id),
            EditorCommand::RenameCriterion {
                id,
                criteria_id,
                label,
            } => self.rename_criterion(&id, &criteria_id, &label),
            EditorCommand::BindPending {
                key,
                node,
            } => self.bind_pending(&key, &node),
            EditorCommand::InsertBetween {
                from,
                to,
                node,
            } => self.insert_between(&from, &to, &node),
            EditorCommand::AddListEntry {
                id,
                field,
                value,
            } => self.add_list_entry(&id, field, &value, false).map(|_| ()),
            EditorCommand::RemoveListEntry {
                id,
                field,
                value,
            } => self.remove_list_entry(&id, field, &value).map(|_| ()),
            EditorCommand::SetTag {
                id,
                tag,
                attached,
            } => self.set_tag(&id, tag, attached).map(|_| ()),
            EditorCommand::Select {
                ids,
            } => {
                self.select(ids);
                Ok(())
            }
            EditorCommand::ClearSelection => {
                self.clear_selection();
                Ok(())
            }
            EditorCommand::SetName {
                name,
            } => {
                self.set_name(name);
                Ok(())
            }
            EditorCommand::Undo => self.undo(),
        }
    }
}
