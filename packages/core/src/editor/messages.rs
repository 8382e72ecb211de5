//! Editor message protocol
//!
//! Node widgets and toolbars talk to the editor through a closed set of
//! messages. On the wire they are tagged by `type`:
//!
//! ```json
//! { "type": "updateNode", "nodeId": "node-1", "patch": { "label": "Renamed" } }
//! { "type": "export", "format": "svg" }
//! ```

use serde::{Deserialize, Serialize};

use crate::models::{MindMapEdge, MindMapNode, NodeDataPatch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Svg,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Svg => "svg",
        }
    }

    pub fn media_type(self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Svg => "image/svg+xml",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EditorMessage {
    UpdateNode { node_id: String, patch: NodeDataPatch },
    DeleteNode { node_id: String },
    DuplicateNode { node_id: String },
    /// Replace the whole working graph
    ImportGraph {
        nodes: Vec<MindMapNode>,
        edges: Vec<MindMapEdge>,
    },
    Export { format: ExportFormat },
}

/// File produced by an export message
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedFile {
    pub file_name: String,
    pub media_type: &'static str,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditorOutcome {
    /// The working graph changed
    Updated,
    /// A node was added
    Created { node_id: String },
    Exported(ExportedFile),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_messages_parse_from_tagged_json() {
        let message: EditorMessage = serde_json::from_value(json!({
            "type": "updateNode",
            "nodeId": "node-1",
            "patch": {"label": "Renamed"}
        }))
        .unwrap();
        assert_eq!(
            message,
            EditorMessage::UpdateNode {
                node_id: "node-1".to_string(),
                patch: NodeDataPatch::label("Renamed"),
            }
        );

        let message: EditorMessage =
            serde_json::from_value(json!({"type": "export", "format": "svg"})).unwrap();
        assert_eq!(message, EditorMessage::Export { format: ExportFormat::Svg });
    }

    #[test]
    fn test_unknown_message_is_rejected() {
        let result = serde_json::from_value::<EditorMessage>(json!({"type": "explode"}));
        assert!(result.is_err());
    }
}
