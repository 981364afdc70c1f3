//! Event types for editor state changes.
//!
//! Events are published after every committed change so hosts and collaborators
//! can follow the editor without polling it. Handlers registered with
//! [`EventBus::on_event`] run synchronously in publish order; receivers from
//! [`EventBus::subscribe`] get a copy of every event.

mod diff;

use std::sync::Arc;

use serde::Serialize;

pub(crate) use diff::diff;

use crate::{
    editor::Confirmation,
    graph::{Connection, Node, NodeId, Position},
    history::HistoryStatus,
    model::{WorkflowKey, WorkflowModel},
    projection::ComplexityProjection,
};

macro_rules! dispatch_event {
    ($handles:expr, $(&$item:ident), +) => {
        for handle in $handles.iter() {
            (handle)($(&$item),+);
        }
    };
}

pub type EditorEventHandle = Arc<dyn Fn(&EditorEvent) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EditorEvent {
    NodeAdded {
        node: Node,
    },
    NodeMoved {
        id: NodeId,
        position: Position,
    },
    NodeUpdated {
        node: Node,
    },
    NodeRemoved {
        id: NodeId,
    },
    ConnectionAdded {
        connection: Connection,
    },
    ConnectionRemoved {
        connection: Connection,
    },
    SelectionChanged {
        ids: Vec<NodeId>,
    },
    /// the pan offset changed; model coordinates did not
    ViewChanged {
        offset_x: f64,
        offset_y: f64,
    },
    HistoryChanged {
        status: HistoryStatus,
    },
    ComplexityChanged {
        projection: ComplexityProjection,
    },
    ConfirmationRequested {
        confirmation: Confirmation,
    },
    /// user-facing message for a rejected operation or a failed persistence call
    Notice {
        message: String,
    },
    Saved {
        key: WorkflowKey,
        model: WorkflowModel,
    },
    Closed {
        model: WorkflowModel,
    },
}

impl EditorEvent {
    pub fn notice(message: impl Into<String>) -> Self {
        EditorEvent::Notice {
            message: message.into(),
        }
    }

    pub fn is_notice(&self) -> bool {
        matches!(self, EditorEvent::Notice { .. })
    }
}

/// Fan-out of editor events to closures and channel subscribers.
#[derive(Clone, Default)]
pub struct EventBus {
    handles: Vec<EditorEventHandle>,
    subscribers: Vec<flume::Sender<EditorEvent>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("EventBus").field("handles", &self.handles.len()).field("subscribers", &self.subscribers.len()).finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_event(
        &mut self,
        f: impl Fn(&EditorEvent) + Send + Sync + 'static,
    ) {
        self.handles.push(Arc::new(f));
    }

    /// A receiver of every event published from now on.
    pub fn subscribe(&mut self) -> flume::Receiver<EditorEvent> {
        let (tx, rx) = flume::unbounded();
        self.subscribers.push(tx);
        rx
    }

    pub fn publish(
        &mut self,
        event: EditorEvent,
    ) {
        dispatch_event!(self.handles, &event);
        // receivers that were dropped are forgotten
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn publish_all(
        &mut self,
        events: impl IntoIterator<Item = EditorEvent>,
    ) {
        for event in events {
            self.publish(event);
        }
    }
}
