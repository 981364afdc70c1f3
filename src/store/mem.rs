use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::trace;

use crate::{
    Result,
    model::{TemplateModel, WorkflowKey, WorkflowModel},
    store::{WorkflowStore, data},
};

#[derive(Debug, Default)]
pub struct MemStore {
    workflows: RwLock<HashMap<WorkflowKey, data::Workflow>>,
    templates: RwLock<HashMap<String, data::Template>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkflowStore for MemStore {
    async fn save(
        &self,
        workflow: &WorkflowModel,
    ) -> Result<()> {
        trace!("mem::save({})", workflow.key());
        let mut workflows = self.workflows.write().await;
        let key = workflow.key();
        let record = data::Workflow::from_model(workflow, workflows.get(&key))?;
        workflows.insert(key, record);
        Ok(())
    }

    async fn load(
        &self,
        key: &WorkflowKey,
    ) -> Result<Option<WorkflowModel>> {
        trace!("mem::load({})", key);
        let workflows = self.workflows.read().await;
        workflows.get(key).map(|r| r.model()).transpose()
    }

    async fn delete(
        &self,
        key: &WorkflowKey,
    ) -> Result<bool> {
        trace!("mem::delete({})", key);
        Ok(self.workflows.write().await.remove(key).is_some())
    }

    async fn list_templates(
        &self,
        organization_id: &str,
    ) -> Result<Vec<TemplateModel>> {
        let templates = self.templates.read().await;
        let mut list: Vec<&data::Template> = templates.values().filter(|t| t.organization_id == organization_id).collect();
        list.sort_by(|a, b| a.create_time.cmp(&b.create_time).then_with(|| a.name.cmp(&b.name)));
        list.into_iter().map(|t| t.model()).collect()
    }

    async fn save_template(
        &self,
        template: &TemplateModel,
    ) -> Result<()> {
        trace!("mem::save_template({})", template.id);
        let mut templates = self.templates.write().await;
        let record = data::Template::from_model(template, templates.get(&template.id))?;
        templates.insert(template.id.clone(), record);
        Ok(())
    }
}
