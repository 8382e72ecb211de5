//! Mind Map Edge
//!
//! A directed, styled connection between two node ids. Endpoints are not
//! checked against the project's nodes when stored, so readers must tolerate
//! edges that point at nothing.

use serde::{Deserialize, Serialize};

pub const DEFAULT_EDGE_STROKE: &str = "#94a3b8";
pub const DEFAULT_EDGE_STROKE_WIDTH: f64 = 2.0;

/// Line shape used by the renderer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeShape {
    #[default]
    Smoothstep,
    Straight,
    Step,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStyle {
    pub stroke: String,
    pub stroke_width: f64,
}

impl Default for EdgeStyle {
    fn default() -> Self {
        Self {
            stroke: DEFAULT_EDGE_STROKE.to_string(),
            stroke_width: DEFAULT_EDGE_STROKE_WIDTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MindMapEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    #[serde(rename = "type", default)]
    pub shape: EdgeShape,
    #[serde(default)]
    pub animated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<EdgeStyle>,
}

impl MindMapEdge {
    /// Edge with the editor's default look
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            source_handle: None,
            target_handle: None,
            shape: EdgeShape::Smoothstep,
            animated: false,
            style: Some(EdgeStyle::default()),
        }
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }

    pub fn connects(&self, source: &str, target: &str) -> bool {
        self.source == source && self.target == target
    }

    pub fn stroke(&self) -> (&str, f64) {
        match &self.style {
            Some(style) => (style.stroke.as_str(), style.stroke_width),
            None => (DEFAULT_EDGE_STROKE, DEFAULT_EDGE_STROKE_WIDTH),
        }
    }
}
