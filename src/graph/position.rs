//! Integer model-space positions.
//!
//! Node positions are always whole pixels. The only way to build a `Position`
//! from floating point input is through a rounding constructor, so drift from
//! repeated drags or snaps cannot reach the model.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Vector};

/// Top-left corner of a node in model-space pixels.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(from = "RawPosition")]
pub struct Position {
    x: i32,
    y: i32,
}

/// Wire shape accepted when deserializing; older documents may carry fractions.
#[derive(Deserialize)]
struct RawPosition {
    x: f64,
    y: f64,
}

impl From<RawPosition> for Position {
    fn from(raw: RawPosition) -> Self {
        Position::round(raw.x, raw.y)
    }
}

impl Position {
    pub const fn new(
        x: i32,
        y: i32,
    ) -> Self {
        Self {
            x,
            y,
        }
    }

    /// Rounds both components half away from zero.
    pub fn round(
        x: f64,
        y: f64,
    ) -> Self {
        Self {
            x: round_component(x),
            y: round_component(y),
        }
    }

    pub fn from_point(point: Point) -> Self {
        Self::round(point.x, point.y)
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn to_point(self) -> Point {
        Point::new(self.x as f64, self.y as f64)
    }

    pub fn offset(
        self,
        dx: i32,
        dy: i32,
    ) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    /// Translates by a floating point delta. The delta is rounded once, so every
    /// position moved by the same delta moves by the same integer amount.
    pub fn translate(
        self,
        delta: Vector,
    ) -> Self {
        self.offset(round_component(delta.x), round_component(delta.y))
    }
}

fn round_component(v: f64) -> i32 {
    if v.is_finite() { v.round() as i32 } else { 0 }
}
