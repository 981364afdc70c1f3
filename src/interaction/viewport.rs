use euclid::default::Size2D;

use crate::{
    config::AutoScrollConfig,
    geometry::{Point, Vector},
};

/// Render transform of the canvas: `screen = model + offset`.
///
/// Panning only ever changes the offset; model coordinates are untouched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    offset: Vector,
    size: Size2D<f64>,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset: Vector::zero(),
            size: Size2D::zero(),
        }
    }
}

impl Viewport {
    pub fn offset(&self) -> Vector {
        self.offset
    }

    pub fn size(&self) -> Size2D<f64> {
        self.size
    }

    pub fn set_offset(
        &mut self,
        offset: Vector,
    ) {
        self.offset = offset;
    }

    pub fn pan_by(
        &mut self,
        delta: Vector,
    ) {
        self.offset += delta;
    }

    /// Visible area in screen pixels. An empty size disables auto-scroll.
    pub fn set_size(
        &mut self,
        width: f64,
        height: f64,
    ) {
        self.size = Size2D::new(width.max(0.0), height.max(0.0));
    }

    pub fn to_model(
        &self,
        screen: Point,
    ) -> Point {
        screen - self.offset
    }

    pub fn to_screen(
        &self,
        model: Point,
    ) -> Point {
        model + self.offset
    }

    /// Offset change for one auto-scroll tick with the pointer at `screen`, or `None`
    /// when the pointer is in the interior.
    pub fn auto_scroll_nudge(
        &self,
        screen: Point,
        config: &AutoScrollConfig,
    ) -> Option<Vector> {
        if self.size.is_empty() {
            return None;
        }
        let axis = |at: f64, extent: f64| {
            if at < config.edge_margin {
                config.step
            } else if at > extent - config.edge_margin {
                -config.step
            } else {
                0.0
            }
        };
        let nudge = Vector::new(axis(screen.x, self.size.width), axis(screen.y, self.size.height));
        (nudge != Vector::zero()).then_some(nudge)
    }
}
