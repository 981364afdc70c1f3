//! Geometry engine: port placement, decision fan-out and snap detection.
//!
//! All math runs in `f64` model space. Results only reach the graph through
//! [`Position`], which rounds.

mod fanout;
mod port;
mod snap;

use euclid::default::{Box2D, Point2D, Vector2D};

use crate::{EditorConfig, graph::Position};

pub use fanout::{BranchEndpoint, branch_angle, branch_endpoint, branch_endpoints, fan_spec, pending_endpoints};
pub use port::{PortPlacement, Side, place_ports};
pub use snap::{Segment, SnapCandidate, SnapDetector, SnapTarget, bound_segments, project_onto_segment};

pub type Point = Point2D<f64>;
pub type Vector = Vector2D<f64>;
pub type Rect = Box2D<f64>;

/// The rectangle every node occupies, anchored at its top-left position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footprint {
    pub width: f64,
    pub height: f64,
}

impl Default for Footprint {
    fn default() -> Self {
        Self {
            width: 60.0,
            height: 60.0,
        }
    }
}

impl From<&EditorConfig> for Footprint {
    fn from(config: &EditorConfig) -> Self {
        Self {
            width: config.node_width,
            height: config.node_height,
        }
    }
}

impl Footprint {
    pub fn half(&self) -> Vector {
        Vector::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn center(
        &self,
        position: Position,
    ) -> Point {
        position.to_point() + self.half()
    }

    pub fn rect(
        &self,
        position: Position,
    ) -> Rect {
        let min = position.to_point();
        Rect::new(min, min + Vector::new(self.width, self.height))
    }

    /// Position that puts the node's center on `center`, rounded to whole pixels.
    pub fn position_for_center(
        &self,
        center: Point,
    ) -> Position {
        Position::from_point(center - self.half())
    }

    /// Midpoint of one side of the node.
    pub fn side_midpoint(
        &self,
        position: Position,
        side: Side,
    ) -> Point {
        let c = self.center(position);
        let half = self.half();
        match side {
            Side::Right => Point::new(c.x + half.x, c.y),
            Side::Bottom => Point::new(c.x, c.y + half.y),
            Side::Left => Point::new(c.x - half.x, c.y),
            Side::Top => Point::new(c.x, c.y - half.y),
        }
    }
}

/// Rectangle spanned by two corner points in any order.
pub fn rect_from_corners(
    a: Point,
    b: Point,
) -> Rect {
    Rect::from_points([a, b])
}

/// Inclusive overlap test; rectangles that only touch count as intersecting.
pub fn rects_touch(
    a: &Rect,
    b: &Rect,
) -> bool {
    a.min.x <= b.max.x && b.min.x <= a.max.x && a.min.y <= b.max.y && b.min.y <= a.max.y
}
