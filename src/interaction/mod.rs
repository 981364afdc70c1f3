//! Pointer input, gesture states, selection and view transform.
//!
//! These are plain data types. The state machine that drives them lives on
//! [`crate::Editor`].

mod input;
mod selection;
mod state;
mod viewport;

pub use input::{HitTarget, Key, Modifiers, PointerButton, PointerInput};
pub use selection::Selection;
pub use state::{DragSession, InteractionState};
pub use viewport::Viewport;
