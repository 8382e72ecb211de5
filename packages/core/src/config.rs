//! Mind map configuration
//!
//! `MindMapConfig` is loaded once at startup from a JSON file. Every field
//! carries a serde default so older config files keep deserializing when new
//! fields appear. User-facing strings come from a per-locale message table.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::ConfigError;

/// Key prefix for persisted projects
pub const DEFAULT_KEY_PREFIX: &str = "mindmap_";

/// Key holding the markdown editor draft
pub const MARKDOWN_DRAFT_KEY: &str = "markmap-markdown-content";

/// Key holding the saved markdown snapshots
pub const MARKDOWN_FILES_KEY: &str = "markmap-saved-files";

/// Assumed browser local storage limit
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MindMapConfig {
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Delay between an edit and its fire-and-forget save
    #[serde(default = "default_auto_save_delay_ms")]
    pub auto_save_delay_ms: u64,

    #[serde(default)]
    pub locale: Locale,

    /// Byte budget for the backing store, `None` for unlimited
    #[serde(default = "default_quota_bytes")]
    pub quota_bytes: Option<usize>,
}

impl Default for MindMapConfig {
    fn default() -> Self {
        Self {
            key_prefix: default_key_prefix(),
            auto_save_delay_ms: default_auto_save_delay_ms(),
            locale: Locale::default(),
            quota_bytes: default_quota_bytes(),
        }
    }
}

impl MindMapConfig {
    pub fn messages(&self) -> &'static Messages {
        self.locale.messages()
    }
}

fn default_key_prefix() -> String {
    DEFAULT_KEY_PREFIX.to_string()
}

fn default_auto_save_delay_ms() -> u64 {
    100
}

fn default_quota_bytes() -> Option<usize> {
    Some(DEFAULT_QUOTA_BYTES)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Zh,
    En,
}

/// Fixed user-facing strings
///
/// The `*_failed` entries are the only error text that ever reaches
/// application state; the underlying cause is logged instead.
#[derive(Debug)]
pub struct Messages {
    pub default_project_title: &'static str,
    pub root_label: &'static str,
    pub copy_suffix: &'static str,
    pub new_root_label: &'static str,
    pub new_branch_label: &'static str,
    pub new_leaf_label: &'static str,
    pub nodes_unit: &'static str,
    pub edges_unit: &'static str,
    pub load_projects_failed: &'static str,
    pub load_project_failed: &'static str,
    pub create_project_failed: &'static str,
    pub save_project_failed: &'static str,
    pub delete_project_failed: &'static str,
}

static ZH_MESSAGES: Messages = Messages {
    default_project_title: "新建思维导图",
    root_label: "中心主题",
    copy_suffix: " (副本)",
    new_root_label: "新根节点",
    new_branch_label: "新分支节点",
    new_leaf_label: "新叶子节点",
    nodes_unit: "节点",
    edges_unit: "连接",
    load_projects_failed: "加载项目失败",
    load_project_failed: "加载项目失败",
    create_project_failed: "创建项目失败",
    save_project_failed: "保存项目失败",
    delete_project_failed: "删除项目失败",
};

static EN_MESSAGES: Messages = Messages {
    default_project_title: "New Mind Map",
    root_label: "Central Topic",
    copy_suffix: " (Copy)",
    new_root_label: "New Root Node",
    new_branch_label: "New Branch Node",
    new_leaf_label: "New Leaf Node",
    nodes_unit: "nodes",
    edges_unit: "edges",
    load_projects_failed: "Failed to load projects",
    load_project_failed: "Failed to load project",
    create_project_failed: "Failed to create project",
    save_project_failed: "Failed to save project",
    delete_project_failed: "Failed to delete project",
};

impl Locale {
    pub fn messages(self) -> &'static Messages {
        match self {
            Locale::Zh => &ZH_MESSAGES,
            Locale::En => &EN_MESSAGES,
        }
    }
}

/// Load configuration, falling back to defaults when the file is absent
pub async fn load_config(path: &Path) -> Result<MindMapConfig, ConfigError> {
    if !path.exists() {
        return Ok(MindMapConfig::default());
    }

    let contents = fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&contents)?)
}

/// Save configuration
///
/// Writes to a sibling temp file and renames it over the target.
pub async fn save_config(path: &Path, config: &MindMapConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    let serialized = serde_json::to_string_pretty(config)?;
    let temp_file = path.with_extension("json.tmp");

    fs::write(&temp_file, serialized).await?;
    fs::rename(&temp_file, path).await?;

    Ok(())
}
