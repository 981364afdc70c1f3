use crate::{
    geometry::{Point, SnapTarget, Vector},
    graph::{NodeId, Position},
};

/// A node drag in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    /// the pressed node; snap detection runs against it alone
    pub primary: NodeId,
    /// every node of the drag set with its position at press time
    pub origins: Vec<(NodeId, Position)>,
    /// pointer position at press time, in model space
    pub pointer_origin: Point,
    /// snap target offered at the last pointer move
    pub snap: Option<SnapTarget>,
}

impl DragSession {
    pub fn origin_of(
        &self,
        id: &str,
    ) -> Option<Position> {
        self.origins.iter().find(|(n, _)| n == id).map(|(_, p)| *p)
    }
}

/// Gesture state of the editor. Points are in model space unless noted.
#[derive(Debug, Clone, Default, PartialEq, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum InteractionState {
    #[default]
    Idle,
    DraggingNode(DragSession),
    ConnectingFrom {
        source: NodeId,
        /// rubber-band end
        pointer: Point,
    },
    MarqueeSelecting {
        origin: Point,
        current: Point,
    },
    PanningView {
        /// pointer position at press time, in screen space
        pointer_origin: Point,
        offset_origin: Vector,
    },
}

impl InteractionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, InteractionState::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, InteractionState::DraggingNode(_))
    }
}
