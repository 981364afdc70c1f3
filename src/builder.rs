use std::sync::Arc;

use crate::{
    Config, Editor, Result,
    editor::Collaborators,
    graph::{Connection, Graph, Node},
    metadata::{MemMetadata, OrganizationMetadata},
    model::WorkflowKey,
    palette::{DefaultPalette, Palette},
    projection::{ComplexityNormalizer, SaturatingNormalizer},
    store::{self, WorkflowStore},
};

pub struct EditorBuilder {
    config: Config,
    store: Option<Arc<dyn WorkflowStore>>,
    palette: Arc<dyn Palette>,
    metadata: Arc<dyn OrganizationMetadata>,
    normalizer: Arc<dyn ComplexityNormalizer>,
    key: Option<WorkflowKey>,
    initial: Option<(String, Vec<Node>, Vec<Connection>)>,
}

impl Default for EditorBuilder {
    fn default() -> Self {
        Self {
            config: Config::default(),
            store: None,
            palette: Arc::new(DefaultPalette),
            metadata: Arc::new(MemMetadata::new()),
            normalizer: Arc::new(SaturatingNormalizer::default()),
            key: None,
            initial: None,
        }
    }
}

impl EditorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(
        mut self,
        config: Config,
    ) -> Self {
        self.config = config;
        self
    }

    /// Storage backend. Without one, the backend named by `[store]` is opened.
    pub fn store(
        mut self,
        store: Arc<dyn WorkflowStore>,
    ) -> Self {
        self.store = Some(store);
        self
    }

    pub fn palette(
        mut self,
        palette: Arc<dyn Palette>,
    ) -> Self {
        self.palette = palette;
        self
    }

    pub fn metadata(
        mut self,
        metadata: Arc<dyn OrganizationMetadata>,
    ) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn normalizer(
        mut self,
        normalizer: Arc<dyn ComplexityNormalizer>,
    ) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn key(
        mut self,
        key: WorkflowKey,
    ) -> Self {
        self.key = Some(key);
        self
    }

    /// Opens the editor on an existing graph. A graph without a start node gets one.
    pub fn initial(
        mut self,
        name: impl Into<String>,
        nodes: Vec<Node>,
        connections: Vec<Connection>,
    ) -> Self {
        self.initial = Some((name.into(), nodes, connections));
        self
    }

    pub fn build(&self) -> Result<Editor> {
        let store = match &self.store {
            Some(store) => store.clone(),
            None => store::open(&self.config.store)?,
        };
        let (name, graph) = match &self.initial {
            Some((name, nodes, connections)) => (name.clone(), Graph::from_parts(nodes.clone(), connections.clone())?),
            None => (String::new(), Graph::new()),
        };
        let collaborators = Collaborators {
            store,
            palette: self.palette.clone(),
            metadata: self.metadata.clone(),
            normalizer: self.normalizer.clone(),
        };
        let mut editor = Editor::new(self.config.editor.clone(), graph, collaborators);
        editor.set_name(name);
        if let Some(key) = &self.key {
            editor.set_key(key.clone());
        }

        Ok(editor)
    }
}
