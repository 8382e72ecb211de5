//! Storage Layer
//!
//! - [`KeyValueStore`] - the flat string store everything persists into,
//!   with in-memory and directory-backed implementations
//! - [`ProjectStorage`] - project CRUD over the key-value store
//! - [`MarkdownLibrary`] - markdown draft and saved snapshots
//!
//! Last write wins everywhere; no locking or merging is layered on top.

mod kv_store;
mod markdown_store;
mod project_store;

pub use kv_store::{FileStore, KeyValueStore, MemoryStore};
pub use markdown_store::MarkdownLibrary;
pub use project_store::{ProjectStorage, ROOT_NODE_POSITION};
