//! Project Storage
//!
//! Translates [`Project`] values to and from the key-value store. Each
//! project lives under `key_prefix + id` as one JSON document; a save is a
//! single `set_item`, so a project is never partially persisted.
//!
//! Read failures are deliberately lossy: an entry that fails to parse is
//! logged and reported as absent, and listing skips it. Write failures are
//! returned to the caller.

use std::sync::Arc;

use crate::config::{Messages, DEFAULT_KEY_PREFIX};
use crate::db::KeyValueStore;
use crate::error::StorageError;
use crate::models::node::{LEVEL0_FONT_SIZE, LEVEL0_TEXT_COLOR};
use crate::models::{MindMapNode, NodeData, NodeType, Position, Project, SystemTimeProvider, TimeProvider};
use crate::utils::generate_id;

/// Where the default root node of a new project sits
pub const ROOT_NODE_POSITION: Position = Position { x: 400.0, y: 100.0 };

pub struct ProjectStorage {
    store: Arc<dyn KeyValueStore + Send + Sync>,
    key_prefix: String,
    clock: Arc<dyn TimeProvider>,
    messages: &'static Messages,
}

impl ProjectStorage {
    pub fn new(store: Arc<dyn KeyValueStore + Send + Sync>, messages: &'static Messages) -> Self {
        Self {
            store,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            clock: Arc::new(SystemTimeProvider),
            messages,
        }
    }

    pub fn with_key_prefix(mut self, key_prefix: impl Into<String>) -> Self {
        self.key_prefix = key_prefix.into();
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn TimeProvider>) -> Self {
        self.clock = clock;
        self
    }

    pub fn messages(&self) -> &'static Messages {
        self.messages
    }

    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }

    pub fn key_for(&self, id: &str) -> String {
        format!("{}{}", self.key_prefix, id)
    }

    /// Write the whole project under its key, overwriting whatever was there
    pub fn save(&self, project: &Project) -> Result<(), StorageError> {
        let serialized = serde_json::to_string(project)?;
        self.store
            .set_item(&self.key_for(&project.id), &serialized)
            .inspect_err(|e| tracing::error!("Failed to save project {}: {}", project.id, e))
    }

    /// Refresh `updated_at` and save; returns the stamped project
    pub fn update(&self, project: &Project) -> Result<Project, StorageError> {
        let mut stamped = project.clone();
        stamped.updated_at = self.clock.now();
        self.save(&stamped)?;
        Ok(stamped)
    }

    /// Absent and unreadable entries both come back as `None`
    pub fn get(&self, id: &str) -> Option<Project> {
        let key = self.key_for(id);
        let raw = match self.store.get_item(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Failed to read project {}: {}", id, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(project) => Some(project),
            Err(e) => {
                tracing::warn!("Stored project {} is not readable: {}", id, e);
                None
            }
        }
    }

    /// Every stored project, most recently updated first
    ///
    /// Scans all keys; entries that fail to read or parse are skipped. Only a
    /// failure to list the keys is an error.
    pub fn get_all(&self) -> Result<Vec<Project>, StorageError> {
        let mut projects = Vec::new();

        for key in self.store.keys()? {
            if !key.starts_with(&self.key_prefix) {
                continue;
            }
            let raw = match self.store.get_item(&key) {
                Ok(Some(raw)) => raw,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry {}: {}", key, e);
                    continue;
                }
            };
            match serde_json::from_str::<Project>(&raw) {
                Ok(project) => projects.push(project),
                Err(e) => tracing::warn!("Skipping unreadable entry {}: {}", key, e),
            }
        }

        projects.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(projects)
    }

    pub fn delete(&self, id: &str) -> Result<(), StorageError> {
        self.store
            .remove_item(&self.key_for(id))
            .inspect_err(|e| tracing::error!("Failed to delete project {}: {}", id, e))
    }

    /// Fresh project with a single root node and no edges
    ///
    /// A missing or blank title falls back to the locale's default title.
    pub fn create_new(&self, title: Option<&str>) -> Project {
        let now = self.clock.now();
        let title = match title.map(str::trim) {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => self.messages.default_project_title.to_string(),
        };

        let root = MindMapNode::new(
            generate_id(),
            ROOT_NODE_POSITION,
            NodeData {
                label: self.messages.root_label.to_string(),
                node_type: NodeType::Root,
                color: Some(LEVEL0_TEXT_COLOR.to_string()),
                font_size: Some(LEVEL0_FONT_SIZE),
            },
        );

        Project {
            id: generate_id(),
            title,
            description: Some(String::new()),
            nodes: vec![root],
            edges: Vec::new(),
            created_at: now,
            updated_at: now,
            thumbnail: None,
        }
    }

    /// Deep copy under a new id
    ///
    /// Every node gets a fresh id, keeping position and data. The edge list
    /// of the copy is empty regardless of the source.
    pub fn duplicate(&self, original: &Project) -> Project {
        let now = self.clock.now();
        let nodes = original
            .nodes
            .iter()
            .map(|node| MindMapNode {
                id: generate_id(),
                ..node.clone()
            })
            .collect();

        Project {
            id: generate_id(),
            title: format!("{}{}", original.title, self.messages.copy_suffix),
            description: original.description.clone(),
            nodes,
            edges: Vec::new(),
            created_at: now,
            updated_at: now,
            thumbnail: original.thumbnail.clone(),
        }
    }
}
