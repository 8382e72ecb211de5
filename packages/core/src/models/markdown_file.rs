//! Saved markdown snapshot
//!
//! Timestamps are epoch milliseconds, matching what the browser editor wrote.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkdownFile {
    pub id: String,
    pub name: String,
    pub content: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Partial update; `id` and `created_at` are never changed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkdownFileUpdate {
    pub name: Option<String>,
    pub content: Option<String>,
}

/// Space taken by the saved files against the assumed store limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageInfo {
    pub used: usize,
    pub total: usize,
    pub percentage: u32,
}
