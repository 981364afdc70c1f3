use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tracing::{trace, warn};

use crate::{
    CanvasError, Result,
    model::{TemplateModel, WorkflowKey, WorkflowModel},
    store::{WorkflowStore, data, map_store_err},
};

const TEMPLATE_DIR: &str = "templates";

/// Stores records as JSON files: `root/<organization>/<process>.json` and
/// `root/<organization>/templates/<id>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn workflow_path(
        &self,
        key: &WorkflowKey,
    ) -> Result<PathBuf> {
        Ok(self.root.join(segment(&key.organization_id)?).join(format!("{}.json", segment(&key.process_id)?)))
    }

    fn template_dir(
        &self,
        organization_id: &str,
    ) -> Result<PathBuf> {
        Ok(self.root.join(segment(organization_id)?).join(TEMPLATE_DIR))
    }
}

/// Keys become path segments, so they must not escape their directory.
fn segment(id: &str) -> Result<&str> {
    if id.is_empty() || id == "." || id == ".." || id.contains(['/', '\\']) {
        return Err(CanvasError::Store(format!("invalid storage id {:?}", id)));
    }
    Ok(id)
}

async fn read_record<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Ok(Some(serde_json::from_str(&text)?)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(map_store_err(e)),
    }
}

async fn write_record<T: serde::Serialize>(
    path: &Path,
    record: &T,
) -> Result<()> {
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await.map_err(map_store_err)?;
    }
    let text = serde_json::to_string_pretty(record)?;
    // write then rename so a reader never sees a half-written file
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, text).await.map_err(map_store_err)?;
    tokio::fs::rename(&tmp, path).await.map_err(map_store_err)
}

#[async_trait]
impl WorkflowStore for FileStore {
    async fn save(
        &self,
        workflow: &WorkflowModel,
    ) -> Result<()> {
        trace!("file::save({})", workflow.key());
        let path = self.workflow_path(&workflow.key())?;
        let previous: Option<data::Workflow> = read_record(&path).await.unwrap_or_else(|e| {
            warn!("file::save: replacing unreadable record {:?}: {}", path, e);
            None
        });
        let record = data::Workflow::from_model(workflow, previous.as_ref())?;
        write_record(&path, &record).await
    }

    async fn load(
        &self,
        key: &WorkflowKey,
    ) -> Result<Option<WorkflowModel>> {
        trace!("file::load({})", key);
        let record: Option<data::Workflow> = read_record(&self.workflow_path(key)?).await?;
        record.map(|r| r.model()).transpose()
    }

    async fn delete(
        &self,
        key: &WorkflowKey,
    ) -> Result<bool> {
        trace!("file::delete({})", key);
        match tokio::fs::remove_file(self.workflow_path(key)?).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(map_store_err(e)),
        }
    }

    async fn list_templates(
        &self,
        organization_id: &str,
    ) -> Result<Vec<TemplateModel>> {
        let dir = self.template_dir(organization_id)?;
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(map_store_err(e)),
        };
        let mut records = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(map_store_err)? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(record) = read_record::<data::Template>(&path).await? {
                records.push(record);
            }
        }
        records.sort_by(|a, b| a.create_time.cmp(&b.create_time).then_with(|| a.name.cmp(&b.name)));
        records.iter().map(|t| t.model()).collect()
    }

    async fn save_template(
        &self,
        template: &TemplateModel,
    ) -> Result<()> {
        trace!("file::save_template({})", template.id);
        let path = self.template_dir(&template.organization_id)?.join(format!("{}.json", segment(&template.id)?));
        let previous: Option<data::Template> = read_record(&path).await?;
        let record = data::Template::from_model(template, previous.as_ref())?;
        write_record(&path, &record).await
    }
}
