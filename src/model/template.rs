use serde::{Deserialize, Serialize};

use crate::{
    CanvasError, Result,
    graph::{Connection, Graph, Node},
};

/// A reusable graph saved under an organization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateModel {
    pub id: String,
    pub organization_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub nodes: Vec<Node>,
    pub connections: Vec<Connection>,
    #[serde(default)]
    pub create_time: i64,
}

impl TemplateModel {
    pub fn new(
        organization_id: &str,
        name: &str,
        description: &str,
        graph: &Graph,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            organization_id: organization_id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            nodes: graph.nodes().to_vec(),
            connections: graph.connections().to_vec(),
            create_time: crate::utils::time::time_millis(),
        }
    }
}

impl TryFrom<&TemplateModel> for Graph {
    type Error = CanvasError;

    fn try_from(model: &TemplateModel) -> Result<Self> {
        Graph::from_parts(model.nodes.clone(), model.connections.clone())
    }
}
