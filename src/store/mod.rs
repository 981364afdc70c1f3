//! Storage collaborator for workflow and template documents.
//!
//! Provides an abstraction over different storage backends:
//! - `MemStore`: in-memory storage for tests and embedding
//! - `FileStore`: JSON documents on the local filesystem
//!
//! `save` is an idempotent overwrite and `load` of an absent key yields `None`.

pub mod data;
mod file;
mod mem;

use std::{error::Error, sync::Arc};

use async_trait::async_trait;

use crate::{
    CanvasError, Result, StoreConfig, StoreType,
    model::{TemplateModel, WorkflowKey, WorkflowModel},
};

pub use file::FileStore;
pub use mem::MemStore;

/// Maps backend errors to CanvasError.
fn map_store_err(err: impl Error) -> CanvasError {
    CanvasError::Store(err.to_string())
}

#[async_trait]
pub trait WorkflowStore: Send + Sync {
    /// Writes `workflow` under its key, replacing anything stored there.
    async fn save(
        &self,
        workflow: &WorkflowModel,
    ) -> Result<()>;

    async fn load(
        &self,
        key: &WorkflowKey,
    ) -> Result<Option<WorkflowModel>>;

    /// Removes the stored copy. Returns whether one existed.
    async fn delete(
        &self,
        key: &WorkflowKey,
    ) -> Result<bool>;

    async fn list_templates(
        &self,
        organization_id: &str,
    ) -> Result<Vec<TemplateModel>>;

    async fn save_template(
        &self,
        template: &TemplateModel,
    ) -> Result<()>;
}

/// Opens the backend selected by `config`.
pub fn open(config: &StoreConfig) -> Result<Arc<dyn WorkflowStore>> {
    match config.store_type {
        StoreType::Mem => Ok(Arc::new(MemStore::new())),
        StoreType::File => {
            let file = config.file.as_ref().ok_or_else(|| CanvasError::Config("[store.file] is required when store_type is file".into()))?;
            Ok(Arc::new(FileStore::new(&file.root)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FileConfig;

    #[test]
    fn test_open_requires_file_root() {
        let config = StoreConfig {
            store_type: StoreType::File,
            file: None,
        };
        assert!(open(&config).is_err());

        let config = StoreConfig {
            store_type: StoreType::File,
            file: Some(FileConfig {
                root: "/tmp/flowcanvas".into(),
            }),
        };
        assert!(open(&config).is_ok());
        assert!(open(&StoreConfig::default()).is_ok());
    }
}
