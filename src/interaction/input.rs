use serde::{Deserialize, Serialize};

use crate::{
    geometry::{Point, Side},
    graph::NodeId,
};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PointerButton {
    #[default]
    Primary,
    Secondary,
}

/// Modifier keys held while pressing.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// the pan modifier (e.g. space or alt) held with the primary button
    #[serde(default)]
    pub pan: bool,
    /// shift-style additive selection
    #[serde(default)]
    pub additive: bool,
}

/// A pointer press in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    pub position: Point,
    pub button: PointerButton,
    pub modifiers: Modifiers,
}

impl PointerInput {
    pub fn primary(position: Point) -> Self {
        Self {
            position,
            button: PointerButton::Primary,
            modifiers: Modifiers::default(),
        }
    }

    pub fn with_modifiers(
        mut self,
        modifiers: Modifiers,
    ) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_button(
        mut self,
        button: PointerButton,
    ) -> Self {
        self.button = button;
        self
    }

    /// Secondary button, or the pan modifier with the primary button.
    pub fn is_pan(&self) -> bool {
        self.button == PointerButton::Secondary || self.modifiers.pan
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Key {
    Escape,
    Delete,
    Backspace,
}

/// What lies under a screen point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HitTarget {
    Port {
        node: NodeId,
        side: Side,
    },
    Node(NodeId),
    Canvas,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pan_detection() {
        let p = Point::new(1.0, 2.0);
        assert!(!PointerInput::primary(p).is_pan());
        assert!(PointerInput::primary(p).with_button(PointerButton::Secondary).is_pan());
        let held = Modifiers {
            pan: true,
            ..Default::default()
        };
        assert!(PointerInput::primary(p).with_modifiers(held).is_pan());
    }
}
