//! Project
//!
//! A named mind map document: ordered nodes and edges plus metadata. The
//! whole project is the unit of persistence; there is no partial write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::edge::MindMapEdge;
use super::node::MindMapNode;
use super::time::iso_millis;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub nodes: Vec<MindMapNode>,
    #[serde(default)]
    pub edges: Vec<MindMapEdge>,
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "iso_millis")]
    pub updated_at: DateTime<Utc>,
    /// Cached preview; derived, regenerated on demand
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

impl Project {
    pub fn node(&self, id: &str) -> Option<&MindMapNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Edges whose source or target is not a node of this project
    pub fn dangling_edges(&self) -> impl Iterator<Item = &MindMapEdge> {
        self.edges
            .iter()
            .filter(move |edge| self.node(&edge.source).is_none() || self.node(&edge.target).is_none())
    }
}
