//! JSON export and import
//!
//! Export is the pretty-printed project document. Import accepts either that
//! document or the editor's download envelope
//! (`{ "project": {...}, "nodes": [...], "edges": [...], "exportedAt": ... }`)
//! and always issues a fresh id: the import becomes a new project rather
//! than overwriting the one it was exported from.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::AppError;
use crate::models::time::to_iso_millis;
use crate::models::Project;
use crate::utils::generate_id;

pub fn export_json(project: &Project) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(project)
}

/// Parse an exported project
///
/// `createdAt` is kept from the source (or set to `now` if missing),
/// `updatedAt` is set to `now`, and the cached thumbnail is dropped.
pub fn import_json(text: &str, now: DateTime<Utc>) -> Result<Project, AppError> {
    let parsed: Value = serde_json::from_str(text).map_err(|e| {
        tracing::warn!("Rejected import: {}", e);
        AppError::import(format!("not valid JSON: {}", e))
    })?;

    let mut document = unwrap_envelope(parsed)?;
    let fields = document
        .as_object_mut()
        .ok_or_else(|| AppError::import("expected a project object"))?;

    let now_text = Value::String(to_iso_millis(&now));
    fields.insert("id".to_string(), Value::String(generate_id()));
    fields.insert("updatedAt".to_string(), now_text.clone());
    fields.entry("createdAt").or_insert(now_text);
    fields.remove("thumbnail");

    serde_json::from_value(document).map_err(|e| {
        tracing::warn!("Rejected import: {}", e);
        AppError::import(format!("not a mind map project: {}", e))
    })
}

/// Editor downloads nest the project and carry the live graph beside it
fn unwrap_envelope(parsed: Value) -> Result<Value, AppError> {
    let Value::Object(mut outer) = parsed else {
        return Err(AppError::import("expected a project object"));
    };

    let Some(Value::Object(mut project)) = outer.remove("project") else {
        return Ok(Value::Object(outer));
    };

    for key in ["nodes", "edges"] {
        if let Some(graph) = outer.remove(key) {
            project.insert(key.to_string(), graph);
        }
    }
    Ok(Value::Object(project))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    fn source() -> Value {
        json!({
            "id": "old-id",
            "title": "Imported",
            "nodes": [
                {"id": "n1", "type": "mindMapNode", "position": {"x": 0, "y": 0},
                 "data": {"label": "Root", "nodeType": "root", "color": "#fff", "fontSize": 18}}
            ],
            "edges": [],
            "createdAt": "2023-06-01T12:00:00.000Z",
            "updatedAt": "2023-06-02T12:00:00.000Z",
            "thumbnail": "data:stale"
        })
    }

    #[test]
    fn test_import_issues_new_id_and_resets_updated_at() {
        let project = import_json(&source().to_string(), now()).unwrap();

        assert_ne!(project.id, "old-id");
        assert_eq!(project.title, "Imported");
        assert_eq!(to_iso_millis(&project.created_at), "2023-06-01T12:00:00.000Z");
        assert_eq!(project.updated_at, now());
        assert!(project.thumbnail.is_none());
    }

    #[test]
    fn test_import_editor_envelope_prefers_live_graph() {
        let envelope = json!({
            "project": source(),
            "nodes": [],
            "edges": [{"id": "e1", "source": "a", "target": "b"}],
            "exportedAt": "2025-01-01T00:00:00.000Z"
        });

        let project = import_json(&envelope.to_string(), now()).unwrap();
        assert!(project.nodes.is_empty());
        assert_eq!(project.edges.len(), 1);
    }

    #[test]
    fn test_import_rejects_garbage() {
        assert!(matches!(import_json("not json", now()), Err(AppError::Import(_))));
        assert!(matches!(import_json("[1,2]", now()), Err(AppError::Import(_))));
        assert!(matches!(
            import_json(r#"{"nodes": []}"#, now()),
            Err(AppError::Import(_))
        ));
    }

    #[test]
    fn test_export_is_pretty_and_reimportable() {
        let original = import_json(&source().to_string(), now()).unwrap();
        let exported = export_json(&original).unwrap();

        assert!(exported.contains("\n  \"title\": \"Imported\""));
        let again = import_json(&exported, now()).unwrap();
        assert_eq!(again.nodes, original.nodes);
        assert_eq!(again.created_at, original.created_at);
    }
}
