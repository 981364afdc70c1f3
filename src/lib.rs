//! # Flowcanvas
//!
//! Flowcanvas is a headless editor engine for workflow diagrams. It owns the
//! graph of a workflow (steps, decisions and the connections between them) and
//! every operation a visual editor performs on it. Rendering is left to the host.
//!
//! ## Core Features
//!
//! - **Validated graph model**: a protected start node, no self or duplicate links,
//!   and decision branches paired 1:1 with their criteria
//! - **Geometry engine**: port placement, branch fan-out, line and endpoint snapping
//! - **Gesture state machine**: drag, multi-select drag, connect, marquee, pan and
//!   auto-scroll, driven by plain pointer and key input
//! - **History**: one snapshot per completed gesture, capped undo
//! - **Event bus**: typed events through `flume` channels or handler closures
//! - **Pluggable storage**: in-memory (testing) and JSON files on disk
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use flowcanvas::{EditorBuilder, WorkflowKey, geometry::Point, graph::NodeKind};
//!
//! let mut editor = EditorBuilder::new().key(WorkflowKey::new("org", "onboarding")).build()?;
//! let events = editor.subscribe();
//!
//! // drop a task from the palette, then save
//! editor.place_from_palette(NodeKind::Task, Point::new(400.0, 300.0))?;
//! editor.save().await?;
//! ```

mod builder;
mod config;
mod editor;
mod error;
mod events;
pub mod geometry;
pub mod graph;
mod history;
pub mod interaction;
mod metadata;
mod model;
mod palette;
mod projection;
pub mod store;
mod utils;

pub use builder::EditorBuilder;
pub use config::{AutoScrollConfig, Config, EditorConfig, FileConfig, SnapConfig, StoreConfig, StoreType};
pub use editor::{Confirmation, Confirmed, Editor, EditorCommand, LoadOutcome, SaveOutcome};
pub use error::CanvasError;
pub use events::{EditorEvent, EditorEventHandle, EventBus};
pub use history::{History, HistoryStatus};
pub use metadata::{MemMetadata, OrganizationMetadata, Promotion, suggest};
pub use model::*;
pub use palette::{DefaultPalette, Palette, PaletteEntry};
pub use projection::{ComplexityCounts, ComplexityMetric, ComplexityNormalizer, ComplexityProjection, ComplexityScores, SaturatingNormalizer};
pub use store::{FileStore, MemStore, WorkflowStore};

/// Result type alias for Flowcanvas operations.
pub type Result<T> = std::result::Result<T, CanvasError>;
