//! Stored records. Documents are kept as JSON text next to their bookkeeping fields.

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    model::{TemplateModel, WorkflowKey, WorkflowModel},
    utils,
};

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Workflow {
    pub organization_id: String,
    pub process_id: String,
    pub name: String,
    pub data: String,
    pub create_time: i64,
    pub update_time: i64,
}

impl Workflow {
    /// A record for `model`, keeping `create_time` of the record it replaces.
    pub fn from_model(
        model: &WorkflowModel,
        previous: Option<&Workflow>,
    ) -> Result<Self> {
        let now = utils::time::time_millis();
        let mut model = model.clone();
        model.update_time = now;
        Ok(Self {
            organization_id: model.organization_id.clone(),
            process_id: model.process_id.clone(),
            name: model.name.clone(),
            data: serde_json::to_string(&model)?,
            create_time: previous.map(|p| p.create_time).unwrap_or(now),
            update_time: now,
        })
    }

    pub fn key(&self) -> WorkflowKey {
        WorkflowKey::new(&self.organization_id, &self.process_id)
    }

    pub fn model(&self) -> Result<WorkflowModel> {
        WorkflowModel::from_json(&self.data)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Template {
    pub id: String,
    pub organization_id: String,
    pub name: String,
    pub data: String,
    pub create_time: i64,
    pub update_time: i64,
}

impl Template {
    pub fn from_model(
        model: &TemplateModel,
        previous: Option<&Template>,
    ) -> Result<Self> {
        let now = utils::time::time_millis();
        Ok(Self {
            id: model.id.clone(),
            organization_id: model.organization_id.clone(),
            name: model.name.clone(),
            data: serde_json::to_string(model)?,
            create_time: previous.map(|p| p.create_time).unwrap_or(now),
            update_time: now,
        })
    }

    pub fn model(&self) -> Result<TemplateModel> {
        Ok(serde_json::from_str(&self.data)?)
    }
}
