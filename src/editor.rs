//! The editor - the main entry point for Flowcanvas.
//!
//! An `Editor` owns one workflow graph and everything needed to edit it:
//! - the interaction state machine driven by pointer and key input
//! - the undo history of committed snapshots
//! - the complexity projection pushed to the host
//! - the storage, palette and organization metadata collaborators
//!
//! All mutation goes through the editor. A rejected operation publishes an
//! [`EditorEvent::Notice`] and leaves the graph untouched. A successful one is
//! recorded as exactly one history entry.

mod command;
mod gesture;
mod persist;

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::{
    CanvasError, EditorConfig, Result,
    events::{self, EditorEvent, EventBus},
    geometry::{Footprint, Point, SnapDetector, SnapTarget, Vector},
    graph::{
        AdvisoryTag, BranchKey, ConnectionTarget, DecisionType, Graph, ListField, Node, NodeId, NodeKind, NodePatch, Position, ValidationReport,
    },
    history::{History, HistoryStatus},
    interaction::{InteractionState, Selection, Viewport},
    metadata::{OrganizationMetadata, Promotion},
    model::{TemplateModel, WorkflowKey},
    palette::Palette,
    projection::{ComplexityNormalizer, ComplexityProjection},
    store::WorkflowStore,
    utils,
};

pub use command::EditorCommand;
pub use persist::{LoadOutcome, SaveOutcome};

/// A destructive action waiting for the user to confirm it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Confirmation {
    /// delete the selected nodes and their connections
    DeleteNodes {
        ids: Vec<NodeId>,
    },
    /// drop in-memory changes and return to the last saved or loaded state
    DiscardChanges,
    /// reset to a lone start node; the caller deletes the persisted copy
    ClearAndDelete {
        key: Option<WorkflowKey>,
    },
}

/// What [`Editor::confirm`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum Confirmed {
    Deleted(Vec<NodeId>),
    Discarded,
    /// the key whose persisted copy should now be removed with [`Editor::delete_task`]
    Cleared(Option<WorkflowKey>),
}

/// External collaborators an editor talks to.
#[derive(Clone)]
pub(crate) struct Collaborators {
    pub store: Arc<dyn WorkflowStore>,
    pub palette: Arc<dyn Palette>,
    pub metadata: Arc<dyn OrganizationMetadata>,
    pub normalizer: Arc<dyn ComplexityNormalizer>,
}

pub struct Editor {
    config: EditorConfig,
    footprint: Footprint,
    detector: SnapDetector,

    /// live graph; equal to `history.current()` except while a drag is in progress
    graph: Graph,
    history: History,
    /// last saved or loaded state, used for dirty tracking and discard
    baseline: Graph,
    name: String,
    key: Option<WorkflowKey>,

    selection: Selection,
    viewport: Viewport,
    state: InteractionState,
    confirmation: Option<Confirmation>,
    /// snap offered to a palette item hovering over the canvas
    hover: Option<SnapTarget>,
    /// last pointer position in screen space
    last_pointer: Option<Point>,

    complexity: ComplexityProjection,
    events: EventBus,
    collaborators: Collaborators,
}

impl Editor {
    pub(crate) fn new(
        config: EditorConfig,
        graph: Graph,
        collaborators: Collaborators,
    ) -> Self {
        let footprint = Footprint::from(&config);
        let complexity = ComplexityProjection::compute(&graph, collaborators.normalizer.as_ref());
        Self {
            detector: SnapDetector::new(config.snap, footprint),
            footprint,
            history: History::new(config.history_capacity, graph.clone()),
            baseline: graph.clone(),
            graph,
            name: String::new(),
            key: None,
            selection: Selection::new(),
            viewport: Viewport::default(),
            state: InteractionState::Idle,
            confirmation: None,
            hover: None,
            last_pointer: None,
            complexity,
            events: EventBus::new(),
            collaborators,
            config,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn footprint(&self) -> Footprint {
        self.footprint
    }

    /// The live graph, including positions of a drag in progress.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// The last committed graph. Saves always use this one.
    pub fn committed(&self) -> &Graph {
        self.history.current()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(
        &mut self,
        name: impl Into<String>,
    ) {
        self.name = name.into();
    }

    pub fn key(&self) -> Option<&WorkflowKey> {
        self.key.as_ref()
    }

    pub fn set_key(
        &mut self,
        key: WorkflowKey,
    ) {
        self.key = Some(key);
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn complexity(&self) -> &ComplexityProjection {
        &self.complexity
    }

    pub fn history_status(&self) -> HistoryStatus {
        self.history.status()
    }

    pub fn pending_confirmation(&self) -> Option<&Confirmation> {
        self.confirmation.as_ref()
    }

    /// Whether the committed graph differs from the last saved or loaded one.
    pub fn is_dirty(&self) -> bool {
        self.history.current() != &self.baseline
    }

    pub fn validate(&self) -> ValidationReport {
        self.history.current().validate()
    }

    pub fn schema(&self) -> String {
        self.history.current().schema()
    }

    pub fn on_event(
        &mut self,
        f: impl Fn(&EditorEvent) + Send + Sync + 'static,
    ) {
        self.events.on_event(f);
    }

    pub fn subscribe(&mut self) -> flume::Receiver<EditorEvent> {
        self.events.subscribe()
    }

    pub fn set_viewport_size(
        &mut self,
        width: f64,
        height: f64,
    ) {
        self.viewport.set_size(width, height);
    }

    pub fn set_view_offset(
        &mut self,
        offset: Vector,
    ) {
        self.viewport.set_offset(offset);
        self.publish_view();
    }

    // ----- structural commands -----

    /// Creates a node with a generated id.
    pub fn add_node(
        &mut self,
        kind: NodeKind,
        label: &str,
        position: Position,
    ) -> Result<NodeId> {
        self.insert_node(Node::new(utils::longid(), kind, label, position))
    }

    pub fn insert_node(
        &mut self,
        node: Node,
    ) -> Result<NodeId> {
        trace!("editor::insert_node({})", node.id);
        let id = node.id.clone();
        self.apply(|g| g.add_node(node))?;
        Ok(id)
    }

    pub fn update_node(
        &mut self,
        id: &str,
        patch: &NodePatch,
    ) -> Result<()> {
        self.apply(|g| g.update_node(id, patch))
    }

    pub fn move_node(
        &mut self,
        id: &str,
        position: Position,
    ) -> Result<()> {
        self.apply(|g| g.move_node(id, position))
    }

    pub fn remove_node(
        &mut self,
        id: &str,
    ) -> Result<()> {
        self.apply(|g| g.remove_node(id).map(|_| ()))
    }

    pub fn remove_nodes(
        &mut self,
        ids: &[NodeId],
    ) -> Result<()> {
        self.apply(|g| g.remove_nodes(ids).map(|_| ()))
    }

    /// Links two bound nodes. From a decision node this adds a criterion.
    pub fn add_connection(
        &mut self,
        from: &str,
        to: &str,
        label: Option<String>,
    ) -> Result<()> {
        self.apply(|g| g.add_connection(from, ConnectionTarget::bound(to), label, None))
    }

    pub fn remove_connection(
        &mut self,
        from: &str,
        to: &ConnectionTarget,
    ) -> Result<()> {
        self.apply(|g| g.remove_connection(from, to).map(|_| ()))
    }

    pub fn set_decision_type(
        &mut self,
        id: &str,
        decision_type: DecisionType,
    ) -> Result<()> {
        self.apply(|g| g.set_decision_type(id, decision_type))
    }

    /// Returns the id of the new criterion.
    pub fn add_criterion(
        &mut self,
        id: &str,
        label: &str,
    ) -> Result<String> {
        self.apply(|g| g.add_criterion(id, label))
    }

    pub fn remove_criterion(
        &mut self,
        id: &str,
        criteria_id: &str,
    ) -> Result<()> {
        self.apply(|g| g.remove_criterion(id, criteria_id))
    }

    pub fn rename_criterion(
        &mut self,
        id: &str,
        criteria_id: &str,
        label: &str,
    ) -> Result<()> {
        self.apply(|g| g.rename_criterion(id, criteria_id, label))
    }

    pub fn bind_pending(
        &mut self,
        key: &BranchKey,
        node_id: &str,
    ) -> Result<()> {
        self.apply(|g| g.bind_pending(key, node_id))
    }

    pub fn insert_between(
        &mut self,
        from: &str,
        to: &str,
        node_id: &str,
    ) -> Result<()> {
        self.apply(|g| g.insert_between(from, &ConnectionTarget::bound(to), node_id))
    }

    /// Adds a list entry to a node. With `promote` set and the entry new, returns the
    /// request to share it with the organization (see [`Editor::promote_task`]).
    pub fn add_list_entry(
        &mut self,
        id: &str,
        field: ListField,
        value: &str,
        promote: bool,
    ) -> Result<Option<Promotion>> {
        let added = self.apply(|g| g.add_list_entry(id, field, value))?;
        let organization_id = self.key.as_ref().map(|k| k.organization_id.clone());
        Ok(match (added, organization_id) {
            (Some(value), Some(organization_id)) if promote => Some(Promotion {
                organization_id,
                field,
                value,
            }),
            _ => None,
        })
    }

    pub fn remove_list_entry(
        &mut self,
        id: &str,
        field: ListField,
        value: &str,
    ) -> Result<bool> {
        self.apply(|g| g.remove_list_entry(id, field, value))
    }

    pub fn set_tag(
        &mut self,
        id: &str,
        tag: AdvisoryTag,
        attached: bool,
    ) -> Result<bool> {
        self.apply(|g| g.set_tag(id, tag, attached))
    }

    /// Replaces the selection with the given ids that exist.
    pub fn select(
        &mut self,
        ids: impl IntoIterator<Item = NodeId>,
    ) {
        let ids: Vec<NodeId> = ids.into_iter().filter(|id| self.graph.contains(id)).collect();
        if self.selection.replace(ids) {
            self.publish_selection();
        }
    }

    pub fn clear_selection(&mut self) {
        if self.selection.clear() {
            self.publish_selection();
        }
    }

    /// Steps back to the previous committed snapshot. Undo itself is never recorded.
    pub fn undo(&mut self) -> Result<()> {
        trace!("editor::undo()");
        self.ensure_not_dragging()?;
        let Some(snapshot) = self.history.undo().cloned() else {
            return self.reject(CanvasError::History("nothing to undo".into()));
        };
        self.restore(snapshot);
        self.publish_history();
        Ok(())
    }

    // ----- templates -----

    /// A template of the committed graph under the current organization.
    pub fn as_template(
        &mut self,
        name: &str,
        description: &str,
    ) -> Result<TemplateModel> {
        let key = self.require_key()?;
        Ok(TemplateModel::new(&key.organization_id, name, description, self.history.current()))
    }

    /// Replaces the canvas with a template's graph as one undoable step.
    pub fn apply_template(
        &mut self,
        template: &TemplateModel,
    ) -> Result<()> {
        trace!("editor::apply_template({})", template.id);
        let graph = match Graph::try_from(template) {
            Ok(graph) => graph,
            Err(e) => return self.reject(e),
        };
        self.apply(|g| {
            g.replace(graph);
            Ok(())
        })
    }

    // ----- confirmations -----

    /// Asks to delete the selection. Refused when it holds the start node.
    pub fn request_delete_selection(&mut self) -> Result<()> {
        if self.selection.is_empty() {
            return self.reject(CanvasError::Interaction("nothing is selected".into()));
        }
        if self.selection.ids().any(|id| self.graph.node(id).is_some_and(|n| n.is_start())) {
            return self.reject(CanvasError::StartNodeProtected);
        }
        self.request(Confirmation::DeleteNodes {
            ids: self.selection.to_vec(),
        });
        Ok(())
    }

    pub fn request_discard_changes(&mut self) {
        self.request(Confirmation::DiscardChanges);
    }

    pub fn request_clear_and_delete(&mut self) {
        self.request(Confirmation::ClearAndDelete {
            key: self.key.clone(),
        });
    }

    /// Applies the pending confirmation.
    pub fn confirm(&mut self) -> Result<Confirmed> {
        let Some(confirmation) = self.confirmation.take() else {
            return self.reject(CanvasError::Interaction("nothing to confirm".into()));
        };
        debug!("editor::confirm({:?})", confirmation);
        match confirmation {
            Confirmation::DeleteNodes {
                ids,
            } => {
                self.remove_nodes(&ids)?;
                Ok(Confirmed::Deleted(ids))
            }
            Confirmation::DiscardChanges => {
                self.discard_changes();
                Ok(Confirmed::Discarded)
            }
            Confirmation::ClearAndDelete {
                ..
            } => Ok(Confirmed::Cleared(self.clear_and_delete())),
        }
    }

    /// Drops the pending confirmation. Returns whether there was one.
    pub fn cancel_confirmation(&mut self) -> bool {
        self.confirmation.take().is_some()
    }

    /// Restores the last saved or loaded state and starts history over from it.
    pub fn discard_changes(&mut self) {
        trace!("editor::discard_changes()");
        self.abandon_gesture();
        let baseline = self.baseline.clone();
        self.history.reset(baseline.clone());
        self.restore(baseline);
        self.publish_history();
    }

    /// Resets to a lone start node and starts history over. Returns the key whose
    /// persisted copy the caller should delete.
    pub fn clear_and_delete(&mut self) -> Option<WorkflowKey> {
        trace!("editor::clear_and_delete()");
        self.abandon_gesture();
        let fresh = Graph::new();
        self.baseline = fresh.clone();
        self.history.reset(fresh.clone());
        self.restore(fresh);
        self.clear_selection();
        self.publish_history();
        self.key.clone()
    }

    // ----- internals -----

    fn request(
        &mut self,
        confirmation: Confirmation,
    ) {
        self.confirmation = Some(confirmation.clone());
        self.events.publish(EditorEvent::ConfirmationRequested {
            confirmation,
        });
    }

    fn notify(
        &mut self,
        error: &CanvasError,
    ) {
        warn!("editor: rejected: {}", error);
        self.events.publish(EditorEvent::notice(error.to_string()));
    }

    fn reject<T>(
        &mut self,
        error: CanvasError,
    ) -> Result<T> {
        self.notify(&error);
        Err(error)
    }

    fn require_key(&mut self) -> Result<WorkflowKey> {
        match &self.key {
            Some(key) => Ok(key.clone()),
            None => self.reject(CanvasError::Store("workflow has no storage key".into())),
        }
    }

    fn ensure_not_dragging(&mut self) -> Result<()> {
        if self.state.is_dragging() {
            return self.reject(CanvasError::Interaction("finish the drag before editing".into()));
        }
        Ok(())
    }

    /// Runs a structural edit on a draft and commits it as one step.
    fn apply<T>(
        &mut self,
        f: impl FnOnce(&mut Graph) -> Result<T>,
    ) -> Result<T> {
        self.ensure_not_dragging()?;
        match self.graph.transaction(f) {
            Ok(out) => {
                self.commit();
                Ok(out)
            }
            Err(e) => self.reject(e),
        }
    }

    /// Records the live graph as committed and publishes what changed.
    fn commit(&mut self) {
        debug_assert!(self.graph.check_invariants().is_ok(), "graph invariants broken: {:?}", self.graph.check_invariants());
        let changes = events::diff(self.history.current(), &self.graph);
        if self.history.record(self.graph.clone()) {
            self.events.publish_all(changes);
            self.publish_history();
        }
        self.after_change();
    }

    /// Makes `snapshot` the live graph without recording it.
    fn restore(
        &mut self,
        snapshot: Graph,
    ) {
        let changes = events::diff(&self.graph, &snapshot);
        self.graph.replace(snapshot);
        debug_assert!(self.graph.check_invariants().is_ok());
        self.events.publish_all(changes);
        self.after_change();
    }

    /// Puts an in-progress gesture back to idle, undoing live drag moves.
    fn abandon_gesture(&mut self) {
        if self.state.is_dragging() {
            self.graph.replace(self.history.current().clone());
        }
        self.hover = None;
        self.transition(InteractionState::Idle);
    }

    fn after_change(&mut self) {
        if self.selection.retain_existing(&self.graph) {
            self.publish_selection();
        }
        let projection = ComplexityProjection::compute(&self.graph, self.collaborators.normalizer.as_ref());
        if projection != self.complexity {
            self.complexity = projection;
            self.events.publish(EditorEvent::ComplexityChanged {
                projection,
            });
        }
    }

    fn transition(
        &mut self,
        next: InteractionState,
    ) {
        if self.state.as_ref() != next.as_ref() {
            debug!("editor::transition({} -> {})", self.state.as_ref(), next.as_ref());
        }
        self.state = next;
    }

    fn publish_selection(&mut self) {
        let ids = self.selection.to_vec();
        self.events.publish(EditorEvent::SelectionChanged {
            ids,
        });
    }

    fn publish_history(&mut self) {
        let status = self.history.status();
        self.events.publish(EditorEvent::HistoryChanged {
            status,
        });
    }

    fn publish_view(&mut self) {
        let offset = self.viewport.offset();
        self.events.publish(EditorEvent::ViewChanged {
            offset_x: offset.x,
            offset_y: offset.y,
        });
    }
}
