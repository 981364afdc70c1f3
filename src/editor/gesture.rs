//! Pointer and keyboard handling.
//!
//! Pointer coordinates arriving here are in screen space. Drag deltas,
//! rubber-band ends and marquee corners are converted to model space through
//! the viewport before they touch anything.

use std::time::Duration;

use strum::IntoEnumIterator;
use tracing::debug;

use crate::{
    CanvasError, Editor, Result,
    geometry::{Point, Side, SnapCandidate, SnapTarget, rect_from_corners, rects_touch},
    graph::{ConnectionTarget, Graph, Node, NodeId, NodeKind, Position},
    interaction::{DragSession, HitTarget, InteractionState, Key, PointerInput},
    utils,
};

impl Editor {
    /// Resolves a screen point to a port, then a node body (topmost first), then the canvas.
    ///
    /// Port discs only count on the outer half: a point strictly inside any
    /// body is never a port.
    pub fn hit_test(
        &self,
        screen: Point,
    ) -> HitTarget {
        let p = self.viewport.to_model(screen);
        let radius = self.config.port_hit_radius;
        let inside_body = self.graph.nodes().iter().any(|node| {
            let r = self.footprint.rect(node.position);
            p.x > r.min.x && p.x < r.max.x && p.y > r.min.y && p.y < r.max.y
        });
        for node in self.graph.nodes().iter().rev().filter(|_| !inside_body) {
            for side in Side::iter() {
                if (self.footprint.side_midpoint(node.position, side) - p).length() <= radius {
                    return HitTarget::Port {
                        node: node.id.clone(),
                        side,
                    };
                }
            }
        }
        for node in self.graph.nodes().iter().rev() {
            let r = self.footprint.rect(node.position);
            if p.x >= r.min.x && p.x <= r.max.x && p.y >= r.min.y && p.y <= r.max.y {
                return HitTarget::Node(node.id.clone());
            }
        }
        HitTarget::Canvas
    }

    pub fn pointer_down(
        &mut self,
        input: PointerInput,
    ) {
        if !self.state.is_idle() {
            debug!("editor::pointer_down ignored while {}", self.state.as_ref());
            return;
        }
        self.last_pointer = Some(input.position);
        if input.is_pan() {
            self.transition(InteractionState::PanningView {
                pointer_origin: input.position,
                offset_origin: self.viewport.offset(),
            });
            return;
        }

        let model = self.viewport.to_model(input.position);
        match self.hit_test(input.position) {
            HitTarget::Port {
                node, ..
            } => self.transition(InteractionState::ConnectingFrom {
                source: node,
                pointer: model,
            }),
            HitTarget::Node(id) => self.press_node(id, model, input.modifiers.additive),
            HitTarget::Canvas => self.transition(InteractionState::MarqueeSelecting {
                origin: model,
                current: model,
            }),
        }
    }

    pub fn pointer_move(
        &mut self,
        screen: Point,
    ) {
        self.last_pointer = Some(screen);
        let model = self.viewport.to_model(screen);
        match &mut self.state {
            InteractionState::ConnectingFrom {
                pointer, ..
            } => *pointer = model,
            InteractionState::MarqueeSelecting {
                current, ..
            } => *current = model,
            _ => {}
        }
        if self.state.is_dragging() {
            self.drag_to(model);
        }
        if let InteractionState::PanningView {
            pointer_origin,
            offset_origin,
        } = self.state
        {
            self.viewport.set_offset(offset_origin + (screen - pointer_origin));
            self.publish_view();
        }
    }

    pub fn pointer_up(
        &mut self,
        screen: Point,
    ) {
        self.pointer_move(screen);
        let state = std::mem::take(&mut self.state);
        debug!("editor::pointer_up({} -> idle)", state.as_ref());
        match state {
            InteractionState::Idle | InteractionState::PanningView {
                ..
            } => {}
            InteractionState::DraggingNode(session) => self.finish_drag(session),
            InteractionState::ConnectingFrom {
                source, ..
            } => self.finish_connect(&source, screen),
            InteractionState::MarqueeSelecting {
                origin,
                current,
            } => self.finish_marquee(origin, current),
        }
    }

    pub fn key_down(
        &mut self,
        key: Key,
    ) {
        match key {
            Key::Escape => self.escape(),
            Key::Delete | Key::Backspace => {
                if self.state.is_idle() && !self.selection.is_empty() {
                    if let Err(e) = self.request_delete_selection() {
                        debug!("editor::key_down({}): {}", key.as_ref(), e);
                    }
                }
            }
        }
    }

    /// The host lost pointer capture: the gesture is abandoned without changes.
    pub fn pointer_capture_lost(&mut self) {
        debug!("editor::pointer_capture_lost({})", self.state.as_ref());
        self.abandon_gesture();
    }

    /// How often the host should call [`Editor::auto_scroll_tick`] while dragging.
    pub fn auto_scroll_interval(&self) -> Duration {
        self.config.auto_scroll.interval()
    }

    /// Nudges the view while a drag holds the pointer near the viewport edge. The
    /// dragged nodes follow so they stay under the pointer. Returns whether the
    /// view moved.
    pub fn auto_scroll_tick(&mut self) -> bool {
        if !self.state.is_dragging() {
            return false;
        }
        let Some(screen) = self.last_pointer else {
            return false;
        };
        let Some(nudge) = self.viewport.auto_scroll_nudge(screen, &self.config.auto_scroll) else {
            return false;
        };
        self.viewport.pan_by(nudge);
        self.publish_view();
        self.drag_to(self.viewport.to_model(screen));
        true
    }

    /// Creates a node of `kind` centered on a screen point, applying any snap the
    /// drop qualifies for. One history entry.
    pub fn place_from_palette(
        &mut self,
        kind: NodeKind,
        screen: Point,
    ) -> Result<NodeId> {
        let Some(entry) = self.collaborators.palette.entry(kind) else {
            return self.reject(CanvasError::Node(format!("{} is not in the palette", kind.as_ref())));
        };
        let center = self.viewport.to_model(screen);
        let footprint = self.footprint;
        let mut node = Node::new(utils::longid(), kind, entry.label, footprint.position_for_center(center));
        node.config = entry.config;
        if node.is_decision() {
            node.config.decision.get_or_insert_with(Default::default);
        } else {
            node.config.decision = None;
        }

        let snap = self.detector.detect(
            &self.graph,
            &SnapCandidate {
                id: None,
                kind,
                center,
            },
        );
        self.hover = None;
        let id = node.id.clone();
        self.apply(|g| {
            g.add_node(node)?;
            if let Some(target) = &snap {
                g.move_node(&id, footprint.position_for_center(target.point()))?;
                attach(g, &id, target)?;
            }
            Ok(())
        })?;
        Ok(id)
    }

    /// Snap a palette item of `kind` would get if dropped at `screen`.
    pub fn palette_hover(
        &mut self,
        kind: NodeKind,
        screen: Point,
    ) -> Option<SnapTarget> {
        let center = self.viewport.to_model(screen);
        self.hover = self.detector.detect(
            &self.graph,
            &SnapCandidate {
                id: None,
                kind,
                center,
            },
        );
        self.hover.clone()
    }

    pub fn palette_hover_end(&mut self) {
        self.hover = None;
    }

    /// The snap target on offer: the dragged node's, else a hovering palette item's.
    pub fn snap_preview(&self) -> Option<&SnapTarget> {
        match &self.state {
            InteractionState::DraggingNode(session) => session.snap.as_ref(),
            _ => self.hover.as_ref(),
        }
    }

    fn press_node(
        &mut self,
        id: NodeId,
        pointer: Point,
        additive: bool,
    ) {
        if additive {
            self.selection.toggle(&id);
            self.publish_selection();
            if !self.selection.contains(&id) {
                return;
            }
        } else if !self.selection.contains(&id) {
            self.selection.replace([id.clone()]);
            self.publish_selection();
        }
        let origins: Vec<(NodeId, Position)> = self.selection.ids().filter_map(|n| self.graph.node(n).map(|node| (n.clone(), node.position))).collect();
        self.transition(InteractionState::DraggingNode(DragSession {
            primary: id,
            origins,
            pointer_origin: pointer,
            snap: None,
        }));
    }

    /// Moves the drag set rigidly to follow the pointer and refreshes the snap offer.
    fn drag_to(
        &mut self,
        pointer: Point,
    ) {
        let InteractionState::DraggingNode(session) = &self.state else {
            return;
        };
        let delta = pointer - session.pointer_origin;
        let moves: Vec<(NodeId, Position)> = session.origins.iter().map(|(id, origin)| (id.clone(), origin.translate(delta))).collect();
        let primary = session.primary.clone();
        for (id, position) in moves {
            if let Err(e) = self.graph.move_node(&id, position) {
                debug!("editor::drag_to({}): {}", id, e);
            }
        }

        let snap = self.graph.node(&primary).and_then(|node| {
            self.detector.detect(
                &self.graph,
                &SnapCandidate {
                    id: Some(node.id.as_str()),
                    kind: node.kind,
                    center: self.footprint.center(node.position),
                },
            )
        });
        if let InteractionState::DraggingNode(session) = &mut self.state {
            session.snap = snap;
        }
    }

    fn finish_drag(
        &mut self,
        session: DragSession,
    ) {
        if let Some(target) = &session.snap {
            let position = self.footprint.position_for_center(target.point());
            let primary = session.primary.as_str();
            let attached = self.graph.transaction(|g| {
                g.move_node(primary, position)?;
                attach(g, primary, target)
            });
            // the freehand position is still committed
            if let Err(e) = attached {
                self.notify(&e);
            }
        }
        self.commit();
    }

    fn finish_connect(
        &mut self,
        source: &str,
        screen: Point,
    ) {
        match self.hit_test(screen) {
            HitTarget::Port {
                node, ..
            } => {
                if self.apply(|g| g.add_connection(source, ConnectionTarget::bound(node), None, None)).is_err() {
                    debug!("editor::finish_connect({}): rejected", source);
                }
            }
            _ => debug!("editor::finish_connect({}): cancelled", source),
        }
    }

    fn finish_marquee(
        &mut self,
        origin: Point,
        current: Point,
    ) {
        let area = rect_from_corners(origin, current);
        let ids: Vec<NodeId> = self.graph.nodes().iter().filter(|n| rects_touch(&area, &self.footprint.rect(n.position))).map(|n| n.id.clone()).collect();
        if self.selection.replace(ids) {
            self.publish_selection();
        }
    }

    /// Cancels the connection, else the marquee, else the drag, else clears the selection.
    fn escape(&mut self) {
        if self.state.is_idle() {
            self.clear_selection();
        } else {
            self.abandon_gesture();
        }
    }
}

/// Applies a snap to `node_id`, which already sits at the snap position.
fn attach(
    graph: &mut Graph,
    node_id: &str,
    target: &SnapTarget,
) -> Result<()> {
    match target {
        SnapTarget::Line {
            from,
            to,
            ..
        } => graph.insert_between(from, &ConnectionTarget::bound(to.clone()), node_id),
        SnapTarget::Endpoint {
            key, ..
        } => graph.bind_pending(key, node_id),
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        EditorBuilder,
        editor::Editor,
        geometry::{Point, Side, SnapTarget},
        graph::{ConnectionTarget, NodeKind, Position, START_NODE_ID},
        interaction::{HitTarget, InteractionState, Key, Modifiers, PointerButton, PointerInput},
    };

    fn editor() -> Editor {
        EditorBuilder::new().build().unwrap()
    }

    /// Screen point at the center of a node placed at `position` (view offset zero).
    fn center_of(position: Position) -> Point {
        Point::new(position.x() as f64 + 30.0, position.y() as f64 + 30.0)
    }

    #[test]
    fn test_hit_test_order() {
        let mut editor = editor();
        let a = editor.add_node(NodeKind::Task, "A", Position::new(100, 100)).unwrap();
        assert_eq!(editor.hit_test(Point::new(130.0, 130.0)), HitTarget::Node(a.clone()));
        assert_eq!(editor.hit_test(Point::new(160.0, 132.0)), HitTarget::Port {
            node: a.clone(),
            side: Side::Right,
        });
        assert_eq!(editor.hit_test(Point::new(166.0, 130.0)), HitTarget::Port {
            node: a.clone(),
            side: Side::Right,
        });
        // inside the body near an edge is still the body
        assert_eq!(editor.hit_test(Point::new(155.0, 130.0)), HitTarget::Node(a.clone()));
        assert_eq!(editor.hit_test(Point::new(10.0, 10.0)), HitTarget::Canvas);

        // b overlaps a and was added later, so it is on top
        let b = editor.add_node(NodeKind::Task, "B", Position::new(120, 120)).unwrap();
        assert_eq!(editor.hit_test(Point::new(135.0, 135.0)), HitTarget::Node(b));
    }

    #[test]
    fn test_press_near_edge_drags() {
        let mut editor = editor();
        editor.add_node(NodeKind::Task, "A", Position::new(100, 100)).unwrap();
        editor.pointer_down(PointerInput::primary(Point::new(155.0, 130.0)));
        assert!(editor.state().is_dragging());
    }

    #[test]
    fn test_drag_commits_once() {
        let mut editor = editor();
        let a = editor.add_node(NodeKind::Task, "A", Position::new(100, 100)).unwrap();
        let len = editor.history_status().len;

        editor.pointer_down(PointerInput::primary(center_of(Position::new(100, 100))));
        assert!(editor.state().is_dragging());
        for step in 1..=10 {
            editor.pointer_move(Point::new(130.0 + step as f64 * 10.3, 130.0));
        }
        assert_eq!(editor.committed().node(&a).unwrap().position, Position::new(100, 100));
        editor.pointer_up(Point::new(233.0, 130.0));

        assert!(editor.state().is_idle());
        assert_eq!(editor.graph().node(&a).unwrap().position, Position::new(203, 100));
        assert_eq!(editor.history_status().len, len + 1);
        assert_eq!(editor.selection().to_vec(), vec![a]);
    }

    #[test]
    fn test_escape_abandons_drag() {
        let mut editor = editor();
        let a = editor.add_node(NodeKind::Task, "A", Position::new(100, 100)).unwrap();
        editor.pointer_down(PointerInput::primary(center_of(Position::new(100, 100))));
        editor.pointer_move(Point::new(400.0, 400.0));
        editor.key_down(Key::Escape);
        assert!(editor.state().is_idle());
        assert_eq!(editor.graph().node(&a).unwrap().position, Position::new(100, 100));
        assert_eq!(editor.selection().len(), 1);

        editor.key_down(Key::Escape);
        assert!(editor.selection().is_empty());
    }

    #[test]
    fn test_capture_loss_abandons_drag() {
        let mut editor = editor();
        let a = editor.add_node(NodeKind::Task, "A", Position::new(100, 100)).unwrap();
        let len = editor.history_status().len;
        editor.pointer_down(PointerInput::primary(center_of(Position::new(100, 100))));
        editor.pointer_move(Point::new(300.0, 300.0));
        editor.pointer_capture_lost();
        assert!(editor.state().is_idle());
        assert_eq!(editor.graph().node(&a).unwrap().position, Position::new(100, 100));
        assert_eq!(editor.history_status().len, len);
    }

    #[test]
    fn test_commands_rejected_while_dragging() {
        let mut editor = editor();
        editor.add_node(NodeKind::Task, "A", Position::new(100, 100)).unwrap();
        editor.pointer_down(PointerInput::primary(center_of(Position::new(100, 100))));
        assert!(editor.add_node(NodeKind::Task, "B", Position::new(0, 0)).is_err());
        assert!(editor.undo().is_err());
    }

    #[test]
    fn test_connect_by_ports() {
        let mut editor = editor();
        let start = editor.graph().start_node().unwrap().position;
        let b = editor.add_node(NodeKind::Task, "B", Position::new(370, 300)).unwrap();
        let len = editor.history_status().len;

        // start bottom port -> b top port
        editor.pointer_down(PointerInput::primary(Point::new(start.x() as f64 + 30.0, start.y() as f64 + 60.0)));
        assert!(matches!(editor.state(), InteractionState::ConnectingFrom { source, .. } if source == START_NODE_ID));
        editor.pointer_move(Point::new(400.0, 250.0));
        editor.pointer_up(Point::new(400.0, 300.0));
        assert!(editor.graph().connection(START_NODE_ID, &ConnectionTarget::bound(b.as_str())).is_some());
        assert_eq!(editor.history_status().len, len + 1);

        // releasing on empty canvas cancels
        editor.pointer_down(PointerInput::primary(Point::new(400.0, 360.0)));
        editor.pointer_up(Point::new(900.0, 900.0));
        assert_eq!(editor.graph().connections().len(), 1);
    }

    #[test]
    fn test_connect_to_start_is_rejected() {
        let mut editor = editor();
        let rx = editor.subscribe();
        let b = editor.add_node(NodeKind::Task, "B", Position::new(370, 300)).unwrap();
        editor.pointer_down(PointerInput::primary(Point::new(400.0, 300.0)));
        assert!(matches!(editor.state(), InteractionState::ConnectingFrom { source, .. } if *source == b));
        editor.pointer_up(Point::new(400.0, 130.0));
        assert!(editor.graph().connections().is_empty());
        assert!(rx.try_iter().any(|e| e.is_notice()));
    }

    #[test]
    fn test_escape_cancels_connection_first() {
        let mut editor = editor();
        editor.select(vec![START_NODE_ID.to_string()]);
        editor.pointer_down(PointerInput::primary(Point::new(400.0, 130.0)));
        assert!(matches!(editor.state(), InteractionState::ConnectingFrom { .. }));
        editor.key_down(Key::Escape);
        assert!(editor.state().is_idle());
        assert_eq!(editor.selection().len(), 1);
    }

    #[test]
    fn test_marquee_replaces_selection() {
        let mut editor = editor();
        let a = editor.add_node(NodeKind::Task, "A", Position::new(0, 400)).unwrap();
        let b = editor.add_node(NodeKind::Task, "B", Position::new(100, 400)).unwrap();
        editor.add_node(NodeKind::Task, "C", Position::new(500, 400)).unwrap();
        editor.select(vec![START_NODE_ID.to_string()]);

        editor.pointer_down(PointerInput::primary(Point::new(-20.0, 380.0)));
        editor.pointer_move(Point::new(50.0, 420.0));
        assert!(matches!(editor.state(), InteractionState::MarqueeSelecting { .. }));
        // touching b's left edge counts
        editor.pointer_up(Point::new(100.0, 420.0));
        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(editor.selection().to_vec(), expected);
    }

    #[test]
    fn test_pan_moves_view_not_model() {
        let mut editor = editor();
        let before = editor.graph().clone();
        editor.pointer_down(PointerInput::primary(Point::new(400.0, 100.0)).with_button(PointerButton::Secondary));
        editor.pointer_move(Point::new(450.0, 80.0));
        editor.pointer_up(Point::new(460.0, 70.0));
        assert_eq!(editor.viewport().offset().x, 60.0);
        assert_eq!(editor.viewport().offset().y, -30.0);
        assert_eq!(editor.graph(), &before);

        // with the view panned, a press lands on model coordinates
        assert_eq!(editor.hit_test(Point::new(460.0, 70.0)), HitTarget::Node(START_NODE_ID.to_string()));

        let held = Modifiers {
            pan: true,
            ..Default::default()
        };
        editor.pointer_down(PointerInput::primary(Point::new(0.0, 0.0)).with_modifiers(held));
        assert!(matches!(editor.state(), InteractionState::PanningView { .. }));
    }

    #[test]
    fn test_additive_press_toggles() {
        let mut editor = editor();
        let a = editor.add_node(NodeKind::Task, "A", Position::new(0, 400)).unwrap();
        let b = editor.add_node(NodeKind::Task, "B", Position::new(200, 400)).unwrap();
        let additive = Modifiers {
            additive: true,
            ..Default::default()
        };
        editor.pointer_down(PointerInput::primary(center_of(Position::new(0, 400))));
        editor.pointer_up(center_of(Position::new(0, 400)));
        editor.pointer_down(PointerInput::primary(center_of(Position::new(200, 400))).with_modifiers(additive));
        editor.pointer_up(center_of(Position::new(200, 400)));
        assert_eq!(editor.selection().len(), 2);

        editor.pointer_down(PointerInput::primary(center_of(Position::new(0, 400))).with_modifiers(additive));
        assert!(editor.state().is_idle());
        assert_eq!(editor.selection().to_vec(), vec![b]);
        assert!(!editor.selection().contains(&a));
    }

    #[test]
    fn test_delete_key_requests_confirmation() {
        let mut editor = editor();
        let a = editor.add_node(NodeKind::Task, "A", Position::new(0, 400)).unwrap();
        editor.select(vec![a.clone()]);
        editor.key_down(Key::Delete);
        assert!(editor.pending_confirmation().is_some());
        assert!(editor.graph().contains(&a));
        editor.confirm().unwrap();
        assert!(!editor.graph().contains(&a));
    }

    #[test]
    fn test_auto_scroll_follows_pointer() {
        let mut editor = editor();
        editor.set_viewport_size(800.0, 600.0);
        let a = editor.add_node(NodeKind::Task, "A", Position::new(100, 100)).unwrap();
        assert!(!editor.auto_scroll_tick());

        editor.pointer_down(PointerInput::primary(center_of(Position::new(100, 100))));
        editor.pointer_move(Point::new(10.0, 130.0));
        assert_eq!(editor.graph().node(&a).unwrap().position, Position::new(-20, 100));
        assert!(editor.auto_scroll_tick());
        assert_eq!(editor.viewport().offset().x, 12.0);
        // the pointer did not move on screen, so the node moved in model space
        assert_eq!(editor.graph().node(&a).unwrap().position, Position::new(-32, 100));

        editor.pointer_move(Point::new(400.0, 300.0));
        assert!(!editor.auto_scroll_tick());
        editor.pointer_up(Point::new(400.0, 300.0));
        assert_eq!(editor.viewport().offset().x, 12.0);
    }

    #[test]
    fn test_palette_hover_previews_snap() {
        let mut editor = editor();
        let d = editor.add_node(NodeKind::Decision, "D", Position::new(0, 0)).unwrap();
        editor.add_criterion(&d, "Only").unwrap();
        // the single branch ends at (30, 230)
        let preview = editor.palette_hover(NodeKind::Task, Point::new(40.0, 240.0));
        assert!(matches!(preview, Some(SnapTarget::Endpoint { .. })));
        assert!(editor.snap_preview().is_some());
        editor.palette_hover_end();
        assert!(editor.snap_preview().is_none());
        assert!(editor.palette_hover(NodeKind::Task, Point::new(600.0, 600.0)).is_none());
    }

    #[test]
    fn test_place_from_palette_binds_endpoint() {
        let mut editor = editor();
        let d = editor.add_node(NodeKind::Decision, "D", Position::new(0, 0)).unwrap();
        let cid = editor.add_criterion(&d, "Only").unwrap();
        let id = editor.place_from_palette(NodeKind::End, Point::new(40.0, 240.0)).unwrap();
        assert_eq!(editor.graph().node(&id).unwrap().position, Position::new(0, 200));
        let branch = editor.graph().branches(&d)[0].1.clone();
        assert_eq!(branch.to, ConnectionTarget::bound(id));
        assert_eq!(branch.criteria_id, Some(cid));
        assert!(editor.place_from_palette(NodeKind::Start, Point::new(0.0, 0.0)).is_err());
    }
}
