//! In-memory workflow graph: nodes, connections and their invariants.

mod connection;
mod graph;
mod node;
mod position;
mod validate;

pub use connection::{BranchKey, Connection, ConnectionTarget};
pub use graph::{DEFAULT_START_POSITION, Graph};
pub use node::{AdvisoryTag, Criterion, DecisionConfig, DecisionType, ListField, Node, NodeConfig, NodeId, NodeKind, NodePatch, START_NODE_ID};
pub use position::Position;
pub use validate::ValidationReport;
