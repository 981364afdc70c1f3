//! Persisted documents exchanged with storage and the host.

mod template;
mod workflow;

pub use template::TemplateModel;
pub use workflow::{WorkflowKey, WorkflowModel};
