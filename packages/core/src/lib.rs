//! MindMap Core
//!
//! Persistence, application state and export for the mind map editor.
//!
//! # Architecture
//!
//! - **Key-value persistence**: each project is one JSON document under
//!   `mindmap_<id>` in a flat string store ([`db::KeyValueStore`])
//! - **Whole-document writes**: a save replaces the project; there are no
//!   partial updates and no transactions
//! - **Single state container**: [`state::AppStore`] applies named actions
//!   through a pure reducer and broadcasts each one to subscribers
//! - **Fixed user-facing errors**: storage causes are logged, state only
//!   ever sees the locale's fixed message for the failed action
//!
//! # Modules
//!
//! - [`models`] - Projects, nodes, edges and markdown files
//! - [`db`] - Key-value backends, project storage and the markdown library
//! - [`state`] - Application state, actions and auto-save
//! - [`editor`] - Working copy of an open project and its message protocol
//! - [`export`] - JSON export/import, SVG rendering and thumbnails
//! - [`outline`] - Markdown outline to mind map conversion
//! - [`config`] - Settings and locale strings

pub mod config;
pub mod db;
pub mod editor;
pub mod error;
pub mod export;
pub mod models;
pub mod outline;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use config::{Locale, Messages, MindMapConfig};
pub use db::{FileStore, KeyValueStore, MarkdownLibrary, MemoryStore, ProjectStorage};
pub use editor::{EditorMessage, EditorOutcome, EditorSession, ExportFormat};
pub use error::{AppError, ConfigError, MarkdownFileError, StorageError};
pub use models::*;
pub use state::{AppAction, AppState, AppStore, AutoSaver};
