//! Mind Map Node
//!
//! A node is a positioned, styled vertex. Its `node_type` is a style tag only:
//! a project may hold any number of root-tagged nodes, or none.
//!
//! # Wire shape
//!
//! ```json
//! {
//!   "id": "lx2k9f0a8c1e",
//!   "type": "mindMapNode",
//!   "position": { "x": 400.0, "y": 100.0 },
//!   "data": { "label": "中心主题", "nodeType": "root", "color": "#FFFFFF", "fontSize": 18.0 }
//! }
//! ```

use serde::{Deserialize, Serialize};

/// Renderer component name every mind map node is registered under
pub const MIND_MAP_NODE_KIND: &str = "mindMapNode";

/// Style/semantic tag of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Root,
    Branch,
    Leaf,
}

/// Presentation defaults for a node type
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeStyle {
    pub background: &'static str,
    pub color: &'static str,
    pub font_size: f64,
    pub bold: bool,
}

static NODE_STYLES: [(NodeType, NodeStyle); 3] = [
    (
        NodeType::Root,
        NodeStyle {
            background: "#dbeafe",
            color: "#3b82f6",
            font_size: 18.0,
            bold: true,
        },
    ),
    (
        NodeType::Branch,
        NodeStyle {
            background: "#dcfce7",
            color: "#10b981",
            font_size: 16.0,
            bold: false,
        },
    ),
    (
        NodeType::Leaf,
        NodeStyle {
            background: "#fef3c7",
            color: "#f59e0b",
            font_size: 14.0,
            bold: false,
        },
    ),
];

/// Level-0 palette used for the root node of a fresh project
pub const LEVEL0_TEXT_COLOR: &str = "#FFFFFF";
pub const LEVEL0_FONT_SIZE: f64 = 18.0;

impl NodeType {
    /// Style defaults for this node type
    pub fn style(self) -> &'static NodeStyle {
        NODE_STYLES
            .iter()
            .find(|(node_type, _)| *node_type == self)
            .map(|(_, style)| style)
            .unwrap_or(&NODE_STYLES[0].1)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Root => "root",
            NodeType::Branch => "branch",
            NodeType::Leaf => "leaf",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    pub label: String,
    pub node_type: NodeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
}

impl NodeData {
    /// Data carrying the type's default colour and size explicitly
    pub fn styled(label: impl Into<String>, node_type: NodeType) -> Self {
        let style = node_type.style();
        Self {
            label: label.into(),
            node_type,
            color: Some(style.color.to_string()),
            font_size: Some(style.font_size),
        }
    }

    pub fn apply(&mut self, patch: &NodeDataPatch) {
        if let Some(label) = &patch.label {
            self.label = label.clone();
        }
        if let Some(node_type) = patch.node_type {
            self.node_type = node_type;
        }
        if let Some(color) = &patch.color {
            self.color = Some(color.clone());
        }
        if let Some(font_size) = patch.font_size {
            self.font_size = Some(font_size);
        }
    }
}

/// Partial update for a node's data; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDataPatch {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub node_type: Option<NodeType>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub font_size: Option<f64>,
}

impl NodeDataPatch {
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Default::default()
        }
    }
}

/// Style after layering a node's own overrides on its type defaults
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyle {
    pub background: String,
    pub color: String,
    pub font_size: f64,
    pub bold: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MindMapNode {
    pub id: String,
    #[serde(rename = "type", default = "default_node_kind")]
    pub kind: String,
    #[serde(default)]
    pub position: Position,
    pub data: NodeData,
}

fn default_node_kind() -> String {
    MIND_MAP_NODE_KIND.to_string()
}

impl MindMapNode {
    pub fn new(id: impl Into<String>, position: Position, data: NodeData) -> Self {
        Self {
            id: id.into(),
            kind: default_node_kind(),
            position,
            data,
        }
    }

    pub fn node_type(&self) -> NodeType {
        self.data.node_type
    }

    pub fn resolved_style(&self) -> ResolvedStyle {
        let defaults = self.data.node_type.style();
        ResolvedStyle {
            background: defaults.background.to_string(),
            color: self
                .data
                .color
                .clone()
                .unwrap_or_else(|| defaults.color.to_string()),
            font_size: self.data.font_size.unwrap_or(defaults.font_size),
            bold: defaults.bold,
        }
    }
}
