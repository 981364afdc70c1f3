use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    CanvasError, Result,
    graph::{Connection, Graph, Node},
    projection::ComplexityProjection,
};

/// Storage key of a workflow: one process of one organization.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkflowKey {
    pub organization_id: String,
    pub process_id: String,
}

impl WorkflowKey {
    pub fn new(
        organization_id: impl Into<String>,
        process_id: impl Into<String>,
    ) -> Self {
        Self {
            organization_id: organization_id.into(),
            process_id: process_id.into(),
        }
    }
}

impl fmt::Display for WorkflowKey {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}/{}", self.organization_id, self.process_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowModel {
    pub organization_id: String,
    pub process_id: String,
    pub name: String,
    pub nodes: Vec<Node>,
    pub connections: Vec<Connection>,
    /// projection of the graph at save time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<ComplexityProjection>,
    #[serde(default)]
    pub update_time: i64,
}

impl WorkflowModel {
    pub fn from_json(s: &str) -> Result<Self> {
        let workflow = serde_json::from_str::<WorkflowModel>(s);
        match workflow {
            Ok(v) => Ok(v),
            Err(e) => Err(CanvasError::Convert(format!("{}", e))),
        }
    }

    /// A document holding `graph` under `key`.
    pub fn from_graph(
        key: &WorkflowKey,
        name: &str,
        graph: &Graph,
    ) -> Self {
        Self {
            organization_id: key.organization_id.clone(),
            process_id: key.process_id.clone(),
            name: name.to_string(),
            nodes: graph.nodes().to_vec(),
            connections: graph.connections().to_vec(),
            complexity: None,
            update_time: 0,
        }
    }

    pub fn key(&self) -> WorkflowKey {
        WorkflowKey::new(&self.organization_id, &self.process_id)
    }

    pub fn with_complexity(
        mut self,
        complexity: ComplexityProjection,
    ) -> Self {
        self.complexity = Some(complexity);
        self
    }
}

impl TryFrom<&WorkflowModel> for Graph {
    type Error = CanvasError;

    fn try_from(model: &WorkflowModel) -> Result<Self> {
        Graph::from_parts(model.nodes.clone(), model.connections.clone())
    }
}
