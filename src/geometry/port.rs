use serde::{Deserialize, Serialize};

use crate::{
    geometry::{Footprint, Point},
    graph::Position,
};

/// Side of a node a port sits on.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, strum::AsRefStr, strum::EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Side {
    Right,
    Bottom,
    Left,
    Top,
}

impl Side {
    /// Quantizes a direction to one of four bands: right [-45, 45), bottom [45, 135),
    /// left [135, 180) + [-180, -135), top [-135, -45). Angles are in degrees with
    /// y pointing down. Half-open bands make `from_angle(a + 180)` always the
    /// opposite of `from_angle(a)`.
    pub fn from_angle(degrees: f64) -> Self {
        let a = normalize_degrees(degrees);
        if (-45.0..45.0).contains(&a) {
            Side::Right
        } else if (45.0..135.0).contains(&a) {
            Side::Bottom
        } else if (-135.0..-45.0).contains(&a) {
            Side::Top
        } else {
            Side::Left
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            Side::Right => Side::Left,
            Side::Bottom => Side::Top,
            Side::Left => Side::Right,
            Side::Top => Side::Bottom,
        }
    }
}

/// Maps any angle into [-180, 180).
fn normalize_degrees(degrees: f64) -> f64 {
    (degrees + 180.0).rem_euclid(360.0) - 180.0
}

/// Ports used to draw a bound connection between two nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortPlacement {
    pub output_side: Side,
    pub output: Point,
    pub input_side: Side,
    pub input: Point,
}

/// Places the output port on `from` facing `to`, and the input port on `to` on the
/// mirrored side.
pub fn place_ports(
    from: Position,
    to: Position,
    footprint: &Footprint,
) -> PortPlacement {
    let a = footprint.center(from);
    let b = footprint.center(to);
    let angle = (b.y - a.y).atan2(b.x - a.x).to_degrees();
    let output_side = Side::from_angle(angle);
    // same as quantizing angle + 180, without float rounding at band edges
    let input_side = output_side.opposite();
    PortPlacement {
        output_side,
        output: footprint.side_midpoint(from, output_side),
        input_side,
        input: footprint.side_midpoint(to, input_side),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_boundaries() {
        assert_eq!(Side::from_angle(0.0), Side::Right);
        assert_eq!(Side::from_angle(44.9), Side::Right);
        assert_eq!(Side::from_angle(45.0), Side::Bottom);
        assert_eq!(Side::from_angle(90.0), Side::Bottom);
        assert_eq!(Side::from_angle(135.0), Side::Left);
        assert_eq!(Side::from_angle(180.0), Side::Left);
        assert_eq!(Side::from_angle(-180.0), Side::Left);
        assert_eq!(Side::from_angle(-135.0), Side::Top);
        assert_eq!(Side::from_angle(-90.0), Side::Top);
        assert_eq!(Side::from_angle(-45.0), Side::Right);
        assert_eq!(Side::from_angle(405.0), Side::Bottom);
    }

    #[test]
    fn test_mirrored_sides_at_boundaries() {
        for a in [-180.0, -135.0, -90.0, -45.0, 0.0, 45.0, 90.0, 135.0, 179.9] {
            assert_eq!(Side::from_angle(a + 180.0), Side::from_angle(a).opposite(), "angle {}", a);
        }
    }

    #[test]
    fn test_place_ports_below() {
        let fp = Footprint::default();
        let ports = place_ports(Position::new(0, 0), Position::new(0, 200), &fp);
        assert_eq!(ports.output_side, Side::Bottom);
        assert_eq!(ports.input_side, Side::Top);
        assert_eq!(ports.output, Point::new(30.0, 60.0));
        assert_eq!(ports.input, Point::new(30.0, 200.0));
    }

    #[test]
    fn test_place_ports_left() {
        let fp = Footprint::default();
        let ports = place_ports(Position::new(300, 0), Position::new(0, 10), &fp);
        assert_eq!(ports.output_side, Side::Left);
        assert_eq!(ports.input_side, Side::Right);
    }
}
