//! Editor Session
//!
//! Holds the working copy of one project's graph while it is being edited.
//! Edits only touch the working copy and mark the session dirty; nothing is
//! persisted until [`EditorSession::save`] or a scheduled auto-save writes a
//! snapshot through the [`AppStore`].

use std::collections::HashSet;
use std::sync::Arc;

use rand::Rng;
use serde_json::json;
use tokio::task::JoinHandle;

use crate::config::Messages;
use crate::editor::messages::{EditorMessage, EditorOutcome, ExportFormat, ExportedFile};
use crate::error::{AppError, StorageError};
use crate::export::render_svg;
use crate::models::time::to_iso_millis;
use crate::models::{MindMapEdge, MindMapNode, NodeData, NodeDataPatch, NodeType, Position, Project};
use crate::state::{AppStore, AutoSaver};
use crate::utils::generate_prefixed_id;

/// Offset applied to a duplicated node
pub const DUPLICATE_OFFSET: f64 = 50.0;

/// New nodes land at a random spot inside this square
pub const NEW_NODE_AREA: f64 = 400.0;

pub struct EditorSession {
    store: Arc<AppStore>,
    project: Project,
    nodes: Vec<MindMapNode>,
    edges: Vec<MindMapEdge>,
    selected: HashSet<String>,
    dirty: bool,
}

impl EditorSession {
    /// Load a project and open it for editing
    pub fn open(store: Arc<AppStore>, project_id: &str) -> Result<Self, AppError> {
        let project = store.load_project(project_id)?;
        tracing::info!(
            "Opened project {} ({} nodes, {} edges)",
            project.id,
            project.nodes.len(),
            project.edges.len()
        );

        Ok(Self {
            nodes: project.nodes.clone(),
            edges: project.edges.clone(),
            store,
            project,
            selected: HashSet::new(),
            dirty: false,
        })
    }

    pub fn project_id(&self) -> &str {
        &self.project.id
    }

    pub fn nodes(&self) -> &[MindMapNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[MindMapEdge] {
        &self.edges
    }

    pub fn selected(&self) -> &HashSet<String> {
        &self.selected
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn messages(&self) -> &'static Messages {
        self.store.storage().messages()
    }

    fn node_mut(&mut self, node_id: &str) -> Result<&mut MindMapNode, AppError> {
        self.nodes
            .iter_mut()
            .find(|node| node.id == node_id)
            .ok_or_else(|| AppError::node_not_found(node_id))
    }

    fn contains_node(&self, node_id: &str) -> bool {
        self.nodes.iter().any(|node| node.id == node_id)
    }

    pub fn apply(&mut self, message: EditorMessage) -> Result<EditorOutcome, AppError> {
        match message {
            EditorMessage::UpdateNode { node_id, patch } => {
                self.update_node(&node_id, &patch)?;
                Ok(EditorOutcome::Updated)
            }
            EditorMessage::DeleteNode { node_id } => {
                self.delete_node(&node_id)?;
                Ok(EditorOutcome::Updated)
            }
            EditorMessage::DuplicateNode { node_id } => {
                let node_id = self.duplicate_node(&node_id)?;
                Ok(EditorOutcome::Created { node_id })
            }
            EditorMessage::ImportGraph { nodes, edges } => {
                self.nodes = nodes;
                self.edges = edges;
                self.selected.clear();
                self.dirty = true;
                Ok(EditorOutcome::Updated)
            }
            EditorMessage::Export { format } => self.export(format).map(EditorOutcome::Exported),
        }
    }

    pub fn update_node(&mut self, node_id: &str, patch: &NodeDataPatch) -> Result<(), AppError> {
        self.node_mut(node_id)?.data.apply(patch);
        self.dirty = true;
        Ok(())
    }

    /// Remove a node together with every edge touching it
    pub fn delete_node(&mut self, node_id: &str) -> Result<(), AppError> {
        if !self.contains_node(node_id) {
            return Err(AppError::node_not_found(node_id));
        }

        self.nodes.retain(|node| node.id != node_id);
        self.edges.retain(|edge| !edge.touches(node_id));
        self.selected.remove(node_id);
        self.dirty = true;
        Ok(())
    }

    /// Copy a node beside the original; edges are not copied
    pub fn duplicate_node(&mut self, node_id: &str) -> Result<String, AppError> {
        let suffix = self.messages().copy_suffix;
        let original = self
            .nodes
            .iter()
            .find(|node| node.id == node_id)
            .ok_or_else(|| AppError::node_not_found(node_id))?;

        let mut copy = original.clone();
        copy.id = generate_prefixed_id("node");
        copy.position = original.position.offset(DUPLICATE_OFFSET, DUPLICATE_OFFSET);
        copy.data.label = format!("{}{}", original.data.label, suffix);

        let id = copy.id.clone();
        self.nodes.push(copy);
        self.dirty = true;
        Ok(id)
    }

    /// Add a node of `node_type` at a random position
    pub fn add_node(&mut self, node_type: NodeType) -> String {
        let messages = self.messages();
        let label = match node_type {
            NodeType::Root => messages.new_root_label,
            NodeType::Branch => messages.new_branch_label,
            NodeType::Leaf => messages.new_leaf_label,
        };

        let mut rng = rand::thread_rng();
        let position = Position::new(
            rng.gen_range(0.0..NEW_NODE_AREA),
            rng.gen_range(0.0..NEW_NODE_AREA),
        );

        let node = MindMapNode::new(
            generate_prefixed_id("node"),
            position,
            NodeData::styled(label, node_type),
        );
        let id = node.id.clone();
        self.nodes.push(node);
        self.dirty = true;
        id
    }

    /// Connect two nodes with a default-styled edge
    pub fn connect(&mut self, source: &str, target: &str) -> Result<String, AppError> {
        for endpoint in [source, target] {
            if !self.contains_node(endpoint) {
                return Err(AppError::node_not_found(endpoint));
            }
        }
        if self.edges.iter().any(|edge| edge.connects(source, target)) {
            return Err(AppError::validation(format!(
                "{} is already connected to {}",
                source, target
            )));
        }

        let edge = MindMapEdge::new(generate_prefixed_id("edge"), source, target);
        let id = edge.id.clone();
        self.edges.push(edge);
        self.dirty = true;
        Ok(id)
    }

    pub fn move_node(&mut self, node_id: &str, position: Position) -> Result<(), AppError> {
        self.node_mut(node_id)?.position = position;
        self.dirty = true;
        Ok(())
    }

    /// Replace the selection with `ids` (nodes or edges)
    ///
    /// The first selected node becomes the application's selected node.
    pub fn select<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        let first_node = ids.iter().find(|id| self.contains_node(id)).cloned();

        self.selected = ids.into_iter().collect();
        self.store.set_selected_node(first_node);
    }

    /// Delete every selected node and edge; returns how many were removed
    pub fn delete_selected(&mut self) -> usize {
        let nodes_before = self.nodes.len();
        let edges_before = self.edges.len();
        let selected = std::mem::take(&mut self.selected);

        self.nodes.retain(|node| !selected.contains(&node.id));
        let removed_nodes: HashSet<&str> = selected.iter().map(String::as_str).collect();
        self.edges.retain(|edge| {
            !selected.contains(&edge.id)
                && !removed_nodes.contains(edge.source.as_str())
                && !removed_nodes.contains(edge.target.as_str())
        });

        let removed = (nodes_before - self.nodes.len()) + (edges_before - self.edges.len());
        if removed > 0 {
            self.dirty = true;
            self.store.set_selected_node(None);
        }
        removed
    }

    /// The working graph as a project stamped with the current time
    pub fn snapshot(&self) -> Project {
        Project {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
            updated_at: self.store.storage().now(),
            ..self.project.clone()
        }
    }

    /// Persist the working graph; `None` when the write failed
    pub fn save(&mut self) -> Option<Project> {
        let saved = self.store.save_current_project(&self.snapshot())?;
        self.project = saved.clone();
        self.dirty = false;
        Some(saved)
    }

    /// Queue a delayed save of the current working graph
    pub fn schedule_auto_save(&self, saver: &AutoSaver) -> JoinHandle<Option<Project>> {
        saver.schedule(self.snapshot())
    }

    pub fn export(&self, format: ExportFormat) -> Result<ExportedFile, AppError> {
        let content = match format {
            ExportFormat::Json => {
                let envelope = json!({
                    "project": self.project,
                    "nodes": self.nodes,
                    "edges": self.edges,
                    "exportedAt": to_iso_millis(&self.store.storage().now()),
                });
                serde_json::to_string_pretty(&envelope).map_err(StorageError::from)?
            }
            ExportFormat::Svg => render_svg(&self.snapshot()),
        };

        Ok(ExportedFile {
            file_name: format!("{}.{}", self.project.title, format.extension()),
            media_type: format.media_type(),
            content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MindMapConfig;
    use crate::db::MemoryStore;
    use crate::export::import_json;

    fn session() -> EditorSession {
        let store = Arc::new(AppStore::from_config(
            Arc::new(MemoryStore::new()),
            MindMapConfig::default(),
        ));
        let project = store.create_project(Some("Test")).unwrap();
        EditorSession::open(store, &project.id).unwrap()
    }

    fn root_id(session: &EditorSession) -> String {
        session.nodes()[0].id.clone()
    }

    #[test]
    fn test_open_missing_project_fails() {
        let store = Arc::new(AppStore::from_config(
            Arc::new(MemoryStore::new()),
            MindMapConfig::default(),
        ));
        let result = EditorSession::open(store, "nope");
        assert!(matches!(result, Err(AppError::ProjectNotFound { .. })));
    }

    #[test]
    fn test_add_node_uses_type_defaults() {
        let mut session = session();
        let id = session.add_node(NodeType::Branch);

        let node = session.nodes().iter().find(|n| n.id == id).unwrap();
        assert!(id.starts_with("node-"));
        assert_eq!(node.data.label, "新分支节点");
        assert_eq!(node.data.color.as_deref(), Some("#10b981"));
        assert_eq!(node.data.font_size, Some(16.0));
        assert!((0.0..400.0).contains(&node.position.x));
        assert!((0.0..400.0).contains(&node.position.y));
        assert!(session.is_dirty());
    }

    #[test]
    fn test_connect_rejects_unknown_and_duplicate() {
        let mut session = session();
        let root = root_id(&session);
        let leaf = session.add_node(NodeType::Leaf);

        let edge_id = session.connect(&root, &leaf).unwrap();
        assert!(edge_id.starts_with("edge-"));
        assert_eq!(session.edges()[0].stroke(), ("#94a3b8", 2.0));

        assert!(matches!(
            session.connect(&root, &leaf),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            session.connect(&root, "ghost"),
            Err(AppError::NodeNotFound { .. })
        ));
        assert_eq!(session.edges().len(), 1);
    }

    #[test]
    fn test_delete_node_removes_touching_edges() {
        let mut session = session();
        let root = root_id(&session);
        let a = session.add_node(NodeType::Branch);
        let b = session.add_node(NodeType::Leaf);
        session.connect(&root, &a).unwrap();
        session.connect(&a, &b).unwrap();
        session.connect(&root, &b).unwrap();

        session
            .apply(EditorMessage::DeleteNode { node_id: a.clone() })
            .unwrap();

        assert_eq!(session.nodes().len(), 2);
        assert_eq!(session.edges().len(), 1);
        assert!(session.edges()[0].connects(&root, &b));
    }

    #[test]
    fn test_duplicate_offsets_and_suffixes() {
        let mut session = session();
        let root = root_id(&session);

        let outcome = session
            .apply(EditorMessage::DuplicateNode { node_id: root.clone() })
            .unwrap();
        let EditorOutcome::Created { node_id } = outcome else {
            panic!("Expected Created, got {:?}", outcome);
        };

        let copy = session.nodes().iter().find(|n| n.id == node_id).unwrap();
        assert_ne!(node_id, root);
        assert_eq!(copy.position, Position::new(450.0, 150.0));
        assert_eq!(copy.data.label, "中心主题 (副本)");
    }

    #[test]
    fn test_update_unknown_node_errors() {
        let mut session = session();
        let result = session.apply(EditorMessage::UpdateNode {
            node_id: "ghost".to_string(),
            patch: NodeDataPatch::label("x"),
        });
        assert!(matches!(result, Err(AppError::NodeNotFound { .. })));
        assert!(!session.is_dirty());
    }

    #[test]
    fn test_delete_selected_nodes_and_edges() {
        let mut session = session();
        let root = root_id(&session);
        let a = session.add_node(NodeType::Branch);
        let b = session.add_node(NodeType::Branch);
        let e1 = session.connect(&root, &a).unwrap();
        session.connect(&root, &b).unwrap();

        session.select([a.clone(), e1]);
        assert_eq!(session.store.state().selected_node_id, Some(a.clone()));

        // node a plus its edge
        assert_eq!(session.delete_selected(), 2);
        assert_eq!(session.nodes().len(), 2);
        assert_eq!(session.edges().len(), 1);
        assert!(session.selected().is_empty());
        assert!(session.store.state().selected_node_id.is_none());
    }

    #[test]
    fn test_save_persists_and_clears_dirty() {
        let mut session = session();
        let root = root_id(&session);
        session.update_node(&root, &NodeDataPatch::label("Renamed")).unwrap();

        let saved = session.save().unwrap();

        assert!(!session.is_dirty());
        let stored = session.store.storage().get(session.project_id()).unwrap();
        assert_eq!(stored, saved);
        assert_eq!(stored.nodes[0].data.label, "Renamed");
    }

    #[test]
    fn test_json_export_reimports_as_new_project() {
        let mut session = session();
        session.add_node(NodeType::Leaf);

        let outcome = session
            .apply(EditorMessage::Export { format: ExportFormat::Json })
            .unwrap();
        let EditorOutcome::Exported(file) = outcome else {
            panic!("Expected Exported, got {:?}", outcome);
        };
        assert_eq!(file.file_name, "Test.json");
        assert_eq!(file.media_type, "application/json");

        let imported = import_json(&file.content, chrono::Utc::now()).unwrap();
        assert_ne!(imported.id, session.project_id());
        assert_eq!(imported.nodes.len(), 2);
    }

    #[test]
    fn test_svg_export() {
        let session = session();
        let file = session.export(ExportFormat::Svg).unwrap();

        assert_eq!(file.file_name, "Test.svg");
        assert!(file.content.contains("中心主题"));
    }

    #[test]
    fn test_import_graph_replaces_working_copy() {
        let mut session = session();
        session.select([root_id(&session)]);

        session
            .apply(EditorMessage::ImportGraph {
                nodes: Vec::new(),
                edges: Vec::new(),
            })
            .unwrap();

        assert!(session.nodes().is_empty());
        assert!(session.selected().is_empty());
        assert!(session.is_dirty());
    }

    #[tokio::test]
    async fn test_scheduled_auto_save_writes_snapshot() {
        let mut session = session();
        session.add_node(NodeType::Leaf);
        let saver = AutoSaver::new(Arc::clone(&session.store))
            .with_delay(std::time::Duration::from_millis(5));

        let saved = session.schedule_auto_save(&saver).await.unwrap().unwrap();

        assert_eq!(saved.nodes.len(), 2);
        let stored = session.store.storage().get(session.project_id()).unwrap();
        assert_eq!(stored.nodes.len(), 2);
    }
}
