//! Host contract: saving, loading and closing documents without blocking input.
//!
//! `*_task` methods return `'static` futures that own everything they need, so the
//! editor stays usable while a call is in flight. Apply the result with the
//! matching `*_completed` method, or use the `async` shorthands when nothing else
//! needs the editor meanwhile.

use futures::{FutureExt, future::BoxFuture};
use tracing::{debug, trace, warn};

use crate::{
    Editor, Result,
    events::EditorEvent,
    graph::{Graph, ListField},
    metadata::Promotion,
    model::{TemplateModel, WorkflowKey, WorkflowModel},
    utils,
};

/// Result of a finished save.
#[derive(Debug)]
pub struct SaveOutcome {
    pub key: WorkflowKey,
    pub model: WorkflowModel,
    pub result: Result<()>,
    snapshot: Graph,
}

/// Result of a finished load.
#[derive(Debug)]
pub struct LoadOutcome {
    pub key: WorkflowKey,
    pub result: Result<Option<WorkflowModel>>,
}

impl Editor {
    /// The committed graph as a document, with its complexity projection.
    pub fn document(&self) -> WorkflowModel {
        let key = self.key.clone().unwrap_or_default();
        let mut model = WorkflowModel::from_graph(&key, &self.name, self.history.current()).with_complexity(self.complexity);
        model.update_time = utils::time::time_millis();
        model
    }

    pub fn save_task(&mut self) -> Result<BoxFuture<'static, SaveOutcome>> {
        let key = self.require_key()?;
        trace!("editor::save_task({})", key);
        let model = self.document();
        let snapshot = self.history.current().clone();
        let store = self.collaborators.store.clone();
        Ok(async move {
            let result = store.save(&model).await;
            SaveOutcome {
                key,
                model,
                result,
                snapshot,
            }
        }
        .boxed())
    }

    /// Marks the saved snapshot as the new baseline, unless another document was
    /// opened meanwhile.
    pub fn save_completed(
        &mut self,
        outcome: SaveOutcome,
    ) -> Result<()> {
        let SaveOutcome {
            key,
            model,
            result,
            snapshot,
        } = outcome;
        if let Err(e) = result {
            warn!("editor::save_completed({}): {}", key, e);
            return self.reject(e);
        }
        if self.key.as_ref() == Some(&key) {
            self.baseline = snapshot;
        }
        debug!("editor::save_completed({})", key);
        self.events.publish(EditorEvent::Saved {
            key,
            model,
        });
        Ok(())
    }

    pub async fn save(&mut self) -> Result<()> {
        let task = self.save_task()?;
        let outcome = task.await;
        self.save_completed(outcome)
    }

    pub fn load_task(
        &self,
        key: WorkflowKey,
    ) -> BoxFuture<'static, LoadOutcome> {
        trace!("editor::load_task({})", key);
        let store = self.collaborators.store.clone();
        async move {
            let result = store.load(&key).await;
            LoadOutcome {
                key,
                result,
            }
        }
        .boxed()
    }

    /// Opens the loaded document. Returns `false` when nothing is stored under the
    /// key. On any failure the current document is left as it was.
    pub fn load_completed(
        &mut self,
        outcome: LoadOutcome,
    ) -> Result<bool> {
        let LoadOutcome {
            key,
            result,
        } = outcome;
        let model = match result {
            Ok(Some(model)) => model,
            Ok(None) => {
                debug!("editor::load_completed({}): not found", key);
                self.events.publish(EditorEvent::notice(format!("no workflow is stored for {}", key)));
                return Ok(false);
            }
            Err(e) => {
                warn!("editor::load_completed({}): {}", key, e);
                return self.reject(e);
            }
        };
        let graph = match Graph::try_from(&model) {
            Ok(graph) => graph,
            Err(e) => return self.reject(e),
        };
        self.open_document(key, model.name, graph);
        Ok(true)
    }

    pub async fn load(
        &mut self,
        key: WorkflowKey,
    ) -> Result<bool> {
        let outcome = self.load_task(key).await;
        self.load_completed(outcome)
    }

    /// Removes the persisted copy under `key`, typically the one handed back by
    /// [`Editor::clear_and_delete`].
    pub fn delete_task(
        &self,
        key: WorkflowKey,
    ) -> BoxFuture<'static, Result<bool>> {
        trace!("editor::delete_task({})", key);
        let store = self.collaborators.store.clone();
        async move { store.delete(&key).await }.boxed()
    }

    /// Ends the session and hands the committed document to the host.
    pub fn close(&mut self) -> WorkflowModel {
        trace!("editor::close()");
        self.abandon_gesture();
        self.confirmation = None;
        let model = self.document();
        self.events.publish(EditorEvent::Closed {
            model: model.clone(),
        });
        model
    }

    pub fn list_templates_task(&mut self) -> Result<BoxFuture<'static, Result<Vec<TemplateModel>>>> {
        let key = self.require_key()?;
        let store = self.collaborators.store.clone();
        Ok(async move { store.list_templates(&key.organization_id).await }.boxed())
    }

    pub fn save_template_task(
        &self,
        template: TemplateModel,
    ) -> BoxFuture<'static, Result<()>> {
        trace!("editor::save_template_task({})", template.id);
        let store = self.collaborators.store.clone();
        async move { store.save_template(&template).await }.boxed()
    }

    /// The organization's suggestion list for `field`.
    pub fn suggestions_task(
        &mut self,
        field: ListField,
    ) -> Result<BoxFuture<'static, Result<Vec<String>>>> {
        let key = self.require_key()?;
        let metadata = self.collaborators.metadata.clone();
        Ok(async move { metadata.suggestions(&key.organization_id, field).await }.boxed())
    }

    /// Shares a list entry with the organization, as returned by [`Editor::add_list_entry`].
    pub fn promote_task(
        &self,
        promotion: Promotion,
    ) -> BoxFuture<'static, Result<bool>> {
        trace!("editor::promote_task({}, {})", promotion.organization_id, promotion.value);
        let metadata = self.collaborators.metadata.clone();
        async move { metadata.promote(&promotion.organization_id, promotion.field, &promotion.value).await }.boxed()
    }

    fn open_document(
        &mut self,
        key: WorkflowKey,
        name: String,
        graph: Graph,
    ) {
        debug!("editor::open_document({})", key);
        self.abandon_gesture();
        self.confirmation = None;
        self.key = Some(key);
        self.name = name;
        self.baseline = graph.clone();
        self.history.reset(graph.clone());
        self.restore(graph);
        self.clear_selection();
        self.publish_history();
    }
}
