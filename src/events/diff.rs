use crate::{
    events::EditorEvent,
    graph::{Graph, Node},
};

/// Events describing how `after` differs from `before`: removals first, then
/// additions and updates in `after` order. A node whose only change is its
/// position yields `NodeMoved`.
pub(crate) fn diff(
    before: &Graph,
    after: &Graph,
) -> Vec<EditorEvent> {
    let mut events = Vec::new();

    for c in before.connections() {
        if !after.connections().contains(c) {
            events.push(EditorEvent::ConnectionRemoved {
                connection: c.clone(),
            });
        }
    }
    for node in before.nodes() {
        if !after.contains(&node.id) {
            events.push(EditorEvent::NodeRemoved {
                id: node.id.clone(),
            });
        }
    }

    for node in after.nodes() {
        match before.node(&node.id) {
            None => events.push(EditorEvent::NodeAdded {
                node: node.clone(),
            }),
            Some(old) if old == node => {}
            Some(old) if only_moved(old, node) => events.push(EditorEvent::NodeMoved {
                id: node.id.clone(),
                position: node.position,
            }),
            Some(_) => events.push(EditorEvent::NodeUpdated {
                node: node.clone(),
            }),
        }
    }
    for c in after.connections() {
        if !before.connections().contains(c) {
            events.push(EditorEvent::ConnectionAdded {
                connection: c.clone(),
            });
        }
    }
    events
}

fn only_moved(
    old: &Node,
    new: &Node,
) -> bool {
    old.position != new.position && old.kind == new.kind && old.label == new.label && old.config == new.config && old.tags == new.tags
}
