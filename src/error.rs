//! Error types for Flowcanvas.
//!
//! All errors in Flowcanvas are represented by the `CanvasError` enum.
//! Rejected structural edits carry a specific variant so the host can show
//! a precise notice; infrastructure failures fall into categorical variants.

use std::io::ErrorKind;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for all Flowcanvas operations.
#[derive(Deserialize, Serialize, Error, Debug, Clone, PartialEq)]
pub enum CanvasError {
    /// The start node can never be removed or used as a connection target.
    #[error("the start node cannot be removed")]
    StartNodeProtected,

    /// A connection from a node to itself.
    #[error("a node cannot be connected to itself: {0}")]
    SelfConnection(String),

    /// A connection with the same (from, to) pair already exists.
    #[error("connection {from} -> {to} already exists")]
    DuplicateConnection {
        from: String,
        to: String,
    },

    /// No connection may end at the start node.
    #[error("the start node cannot be a connection target")]
    ConnectToStart,

    /// The referenced node does not exist.
    #[error("node {0} not found")]
    NodeNotFound(String),

    /// The operation needs a bound endpoint but the connection is still pending.
    #[error("connection target {0} is an unresolved placeholder")]
    PendingTarget(String),

    /// Graph-level structural errors.
    #[error("{0}")]
    Graph(String),

    /// Node definition errors.
    #[error("{0}")]
    Node(String),

    /// Connection definition errors.
    #[error("{0}")]
    Connection(String),

    /// Decision criteria errors.
    #[error("{0}")]
    Decision(String),

    /// History navigation errors.
    #[error("{0}")]
    History(String),

    /// Gesture or confirmation errors.
    #[error("{0}")]
    Interaction(String),

    /// Storage operation errors.
    #[error("{0}")]
    Store(String),

    /// Configuration parsing or validation errors.
    #[error("{0}")]
    Config(String),

    /// Data conversion errors (JSON, TOML).
    #[error("{0}")]
    Convert(String),

    /// I/O operation errors.
    #[error("{0}")]
    IoError(String),
}

impl From<CanvasError> for String {
    fn from(val: CanvasError) -> Self {
        val.to_string()
    }
}

impl From<std::io::Error> for CanvasError {
    fn from(error: std::io::Error) -> Self {
        CanvasError::IoError(error.to_string())
    }
}

impl From<CanvasError> for std::io::Error {
    fn from(val: CanvasError) -> Self {
        #[allow(clippy::io_other_error)]
        std::io::Error::new(ErrorKind::Other, val.to_string())
    }
}

impl From<serde_json::Error> for CanvasError {
    fn from(error: serde_json::Error) -> Self {
        CanvasError::Convert(error.to_string())
    }
}

impl From<toml::de::Error> for CanvasError {
    fn from(error: toml::de::Error) -> Self {
        CanvasError::Config(error.to_string())
    }
}
