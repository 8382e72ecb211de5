//! Markdown Library
//!
//! Two pieces of markdown state live next to the projects:
//!
//! - the editor draft, plain text under [`MARKDOWN_DRAFT_KEY`]
//! - named snapshots, one JSON array under [`MARKDOWN_FILES_KEY`]
//!
//! Every change to the snapshot list rewrites the whole array.

use std::sync::Arc;

use crate::config::{DEFAULT_QUOTA_BYTES, MARKDOWN_DRAFT_KEY, MARKDOWN_FILES_KEY};
use crate::db::KeyValueStore;
use crate::error::{MarkdownFileError, StorageError};
use crate::models::{MarkdownFile, MarkdownFileUpdate, StorageInfo, SystemTimeProvider, TimeProvider};

pub struct MarkdownLibrary {
    store: Arc<dyn KeyValueStore + Send + Sync>,
    clock: Arc<dyn TimeProvider>,
}

impl MarkdownLibrary {
    pub fn new(store: Arc<dyn KeyValueStore + Send + Sync>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemTimeProvider),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn TimeProvider>) -> Self {
        self.clock = clock;
        self
    }

    fn now_millis(&self) -> i64 {
        self.clock.now().timestamp_millis()
    }

    pub fn load_draft(&self) -> Option<String> {
        match self.store.get_item(MARKDOWN_DRAFT_KEY) {
            Ok(draft) => draft,
            Err(e) => {
                tracing::warn!("Failed to read markdown draft: {}", e);
                None
            }
        }
    }

    pub fn save_draft(&self, content: &str) -> Result<(), StorageError> {
        self.store.set_item(MARKDOWN_DRAFT_KEY, content)
    }

    pub fn clear_draft(&self) -> Result<(), StorageError> {
        self.store.remove_item(MARKDOWN_DRAFT_KEY)
    }

    /// All saved files; an unreadable list reads as empty
    pub fn files(&self) -> Vec<MarkdownFile> {
        let raw = match self.store.get_item(MARKDOWN_FILES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read saved markdown files: {}", e);
                return Vec::new();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!("Saved markdown file list is not readable: {}", e);
            Vec::new()
        })
    }

    fn write_files(&self, files: &[MarkdownFile]) -> Result<(), StorageError> {
        let serialized = serde_json::to_string(files)?;
        self.store.set_item(MARKDOWN_FILES_KEY, &serialized)
    }

    pub fn create_file(&self, name: &str, content: &str) -> Result<MarkdownFile, MarkdownFileError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(MarkdownFileError::EmptyName);
        }

        let mut files = self.files();
        if files.iter().any(|file| file.name == name) {
            return Err(MarkdownFileError::DuplicateName {
                name: name.to_string(),
            });
        }

        let now = self.now_millis();
        let file = MarkdownFile {
            id: unique_file_id(now, &files),
            name: name.to_string(),
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        };

        files.push(file.clone());
        self.write_files(&files)?;
        Ok(file)
    }

    pub fn update_file(
        &self,
        id: &str,
        update: MarkdownFileUpdate,
    ) -> Result<MarkdownFile, MarkdownFileError> {
        let mut files = self.files();
        let index = files
            .iter()
            .position(|file| file.id == id)
            .ok_or_else(|| MarkdownFileError::NotFound { id: id.to_string() })?;

        if let Some(name) = &update.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(MarkdownFileError::EmptyName);
            }
            if files.iter().any(|file| file.id != id && file.name == name) {
                return Err(MarkdownFileError::DuplicateName {
                    name: name.to_string(),
                });
            }
            files[index].name = name.to_string();
        }
        if let Some(content) = update.content {
            files[index].content = content;
        }
        files[index].updated_at = self.now_millis();

        let updated = files[index].clone();
        self.write_files(&files)?;
        Ok(updated)
    }

    pub fn delete_file(&self, id: &str) -> Result<(), MarkdownFileError> {
        let mut files = self.files();
        let before = files.len();
        files.retain(|file| file.id != id);

        if files.len() == before {
            return Err(MarkdownFileError::NotFound { id: id.to_string() });
        }

        self.write_files(&files)?;
        Ok(())
    }

    pub fn file_by_id(&self, id: &str) -> Option<MarkdownFile> {
        self.files().into_iter().find(|file| file.id == id)
    }

    /// Case-insensitive match on name or content
    pub fn search(&self, query: &str) -> Vec<MarkdownFile> {
        let query = query.to_lowercase();
        self.files()
            .into_iter()
            .filter(|file| {
                file.name.to_lowercase().contains(&query)
                    || file.content.to_lowercase().contains(&query)
            })
            .collect()
    }

    pub fn export_files(&self) -> Result<String, StorageError> {
        Ok(serde_json::to_string_pretty(&self.files())?)
    }

    /// Merge an exported file list into the library
    ///
    /// Entries whose id already exists replace the stored file. New entries
    /// whose name collides get a ` (n)` suffix. Returns the number of
    /// entries merged. Nothing is written unless every entry is complete.
    pub fn import_files(&self, json: &str) -> Result<usize, MarkdownFileError> {
        let imported: Vec<MarkdownFile> = serde_json::from_str(json)
            .map_err(|e| MarkdownFileError::InvalidImport(e.to_string()))?;

        if let Some(incomplete) = imported
            .iter()
            .find(|file| file.id.is_empty() || file.name.is_empty() || file.content.is_empty())
        {
            return Err(MarkdownFileError::InvalidImport(format!(
                "incomplete file entry '{}'",
                incomplete.id
            )));
        }

        let mut merged = self.files();
        for file in &imported {
            if let Some(existing) = merged.iter_mut().find(|existing| existing.id == file.id) {
                *existing = file.clone();
                continue;
            }

            let mut name = file.name.clone();
            let mut counter = 1;
            while merged.iter().any(|existing| existing.name == name) {
                name = format!("{} ({})", file.name, counter);
                counter += 1;
            }
            merged.push(MarkdownFile {
                name,
                ..file.clone()
            });
        }

        self.write_files(&merged)?;
        Ok(imported.len())
    }

    pub fn clear_all(&self) -> Result<(), StorageError> {
        self.store.remove_item(MARKDOWN_FILES_KEY)
    }

    pub fn storage_info(&self) -> StorageInfo {
        let used = serde_json::to_string(&self.files())
            .map(|s| s.len())
            .unwrap_or(0);
        let total = DEFAULT_QUOTA_BYTES;

        StorageInfo {
            used,
            total,
            percentage: ((used as f64 / total as f64) * 100.0).round() as u32,
        }
    }
}

/// Millisecond timestamp id, bumped past any id already taken
fn unique_file_id(now: i64, files: &[MarkdownFile]) -> String {
    let mut candidate = now;
    while files.iter().any(|file| file.id == candidate.to_string()) {
        candidate += 1;
    }
    candidate.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::MockTimeProvider;

    fn library() -> MarkdownLibrary {
        MarkdownLibrary::new(Arc::new(MemoryStore::new())).with_clock(Arc::new(MockTimeProvider::new()))
    }

    #[test]
    fn test_draft_round_trip() {
        let library = library();
        assert!(library.load_draft().is_none());

        library.save_draft("# Plan\n- a").unwrap();
        assert_eq!(library.load_draft().as_deref(), Some("# Plan\n- a"));

        library.clear_draft().unwrap();
        assert!(library.load_draft().is_none());
    }

    #[test]
    fn test_create_rejects_duplicate_and_empty_names() {
        let library = library();
        library.create_file(" notes ", "body").unwrap();

        assert!(matches!(
            library.create_file("notes", "other"),
            Err(MarkdownFileError::DuplicateName { .. })
        ));
        assert!(matches!(
            library.create_file("  ", "x"),
            Err(MarkdownFileError::EmptyName)
        ));
        assert_eq!(library.files().len(), 1);
        assert_eq!(library.files()[0].name, "notes");
    }

    #[test]
    fn test_same_millisecond_files_get_distinct_ids() {
        let library = library();
        let a = library.create_file("a", "1").unwrap();
        let b = library.create_file("b", "2").unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_update_rename_collision() {
        let library = library();
        let a = library.create_file("a", "1").unwrap();
        library.create_file("b", "2").unwrap();

        let result = library.update_file(
            &a.id,
            MarkdownFileUpdate {
                name: Some("b".to_string()),
                content: None,
            },
        );
        assert!(matches!(result, Err(MarkdownFileError::DuplicateName { .. })));

        let updated = library
            .update_file(
                &a.id,
                MarkdownFileUpdate {
                    name: None,
                    content: Some("changed".to_string()),
                },
            )
            .unwrap();
        assert_eq!(updated.content, "changed");
        assert_eq!(library.file_by_id(&a.id).unwrap().content, "changed");
    }

    #[test]
    fn test_delete_missing_file_is_not_found() {
        let library = library();
        let file = library.create_file("a", "1").unwrap();

        library.delete_file(&file.id).unwrap();
        assert!(matches!(
            library.delete_file(&file.id),
            Err(MarkdownFileError::NotFound { .. })
        ));
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let library = library();
        library.create_file("Travel", "Pack BAGS").unwrap();
        library.create_file("Work", "meetings").unwrap();

        assert_eq!(library.search("bags").len(), 1);
        assert_eq!(library.search("TRAVEL").len(), 1);
        assert_eq!(library.search("zzz").len(), 0);
    }

    #[test]
    fn test_import_renames_collisions_and_replaces_same_id() {
        let library = library();
        let existing = library.create_file("notes", "old").unwrap();

        let imported = serde_json::json!([
            {"id": existing.id, "name": "notes", "content": "new", "createdAt": 1, "updatedAt": 2},
            {"id": "x1", "name": "notes", "content": "other", "createdAt": 1, "updatedAt": 2},
            {"id": "x2", "name": "notes", "content": "third", "createdAt": 1, "updatedAt": 2}
        ]);
        let count = library.import_files(&imported.to_string()).unwrap();

        assert_eq!(count, 3);
        let names: Vec<String> = library.files().into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["notes", "notes (1)", "notes (2)"]);
        assert_eq!(library.file_by_id(&existing.id).unwrap().content, "new");
    }

    #[test]
    fn test_import_rejects_incomplete_entries_without_writing() {
        let library = library();
        let imported = r#"[{"id":"a","name":"","content":"x","createdAt":1,"updatedAt":1}]"#;

        assert!(matches!(
            library.import_files(imported),
            Err(MarkdownFileError::InvalidImport(_))
        ));
        assert!(matches!(
            library.import_files("{}"),
            Err(MarkdownFileError::InvalidImport(_))
        ));
        assert!(library.files().is_empty());
    }

    #[test]
    fn test_export_then_clear() {
        let library = library();
        library.create_file("a", "1").unwrap();

        let exported = library.export_files().unwrap();
        assert!(exported.contains("\"name\": \"a\""));

        library.clear_all().unwrap();
        assert!(library.files().is_empty());
        assert_eq!(library.storage_info().used, 2);
    }
}
