//! Key-Value Store
//!
//! The persistence backend is a flat string-to-string store with the same
//! surface as browser local storage: get, set, remove and key listing. There
//! are no transactions; a single `set_item` is the unit of atomicity.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::config::MindMapConfig;
use crate::error::StorageError;

pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrites unconditionally; fails without side effects when rejected
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing an absent key is not an error
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

/// In-memory store with an optional byte quota
///
/// Entry size is counted as key length plus value length in bytes.
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            quota_bytes: None,
        }
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Store honouring the configured quota
    pub fn for_config(config: &MindMapConfig) -> Self {
        match config.quota_bytes {
            Some(quota) => Self::with_quota(quota),
            None => Self::new(),
        }
    }

    /// Seed raw entries, bypassing serialization and quota
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let map = entries
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();

        Self {
            entries: Arc::new(Mutex::new(map)),
            quota_bytes: None,
        }
    }

    pub fn used_bytes(&self) -> Result<usize, StorageError> {
        let entries = self.lock()?;
        Ok(entries.iter().map(|(k, v)| k.len() + v.len()).sum())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.entries
            .lock()
            .map_err(|_| StorageError::backend("Failed to acquire lock"))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.lock()?;
        Ok(entries.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.lock()?;

        if let Some(quota) = self.quota_bytes {
            let used: usize = entries.iter().map(|(k, v)| k.len() + v.len()).sum();
            let replaced = entries.get(key).map(|old| key.len() + old.len()).unwrap_or(0);
            let available = quota.saturating_sub(used - replaced);
            let needed = key.len() + value.len();
            if needed > available {
                return Err(StorageError::quota_exceeded(key, needed, available));
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.lock()?;
        entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let entries = self.lock()?;
        Ok(entries.keys().cloned().collect())
    }
}

/// Directory-backed store, one file per key
///
/// File names are the percent-encoded key, so any key round-trips through
/// `keys()`. The optional quota counts key length plus file size in bytes,
/// the same measure `MemoryStore` uses.
pub struct FileStore {
    root: PathBuf,
    quota_bytes: Option<usize>,
}

const FILE_SUFFIX: &str = ".kv";

impl FileStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            quota_bytes: None,
        })
    }

    /// Store under `root` honouring the configured quota
    pub fn open_for_config(root: impl Into<PathBuf>, config: &MindMapConfig) -> Result<Self, StorageError> {
        let store = Self::open(root)?;
        Ok(match config.quota_bytes {
            Some(quota) => store.with_quota(quota),
            None => store,
        })
    }

    pub fn with_quota(mut self, quota_bytes: usize) -> Self {
        self.quota_bytes = Some(quota_bytes);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn used_bytes(&self) -> Result<usize, StorageError> {
        let mut used = 0;
        for key in self.keys()? {
            used += self.entry_bytes(&key)?;
        }
        Ok(used)
    }

    /// Key length plus stored value size; zero when the key is absent
    fn entry_bytes(&self, key: &str) -> Result<usize, StorageError> {
        match fs::metadata(self.path_for(key)) {
            Ok(meta) => Ok(key.len() + meta.len() as usize),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}{}", encode_key(key), FILE_SUFFIX))
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota_bytes {
            let used = self.used_bytes()?;
            let replaced = self.entry_bytes(key)?;
            let available = quota.saturating_sub(used.saturating_sub(replaced));
            let needed = key.len() + value.len();
            if needed > available {
                return Err(StorageError::quota_exceeded(key, needed, available));
            }
        }

        let target = self.path_for(key);
        let temp = target.with_extension("kv.tmp");
        fs::write(&temp, value)?;
        fs::rename(&temp, &target)?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if let Some(encoded) = name.strip_suffix(FILE_SUFFIX) {
                if let Some(key) = decode_key(encoded) {
                    keys.push(key);
                }
            }
        }
        Ok(keys)
    }
}

fn encode_key(key: &str) -> String {
    urlencoding::encode(key).into_owned()
}

fn decode_key(encoded: &str) -> Option<String> {
    urlencoding::decode(encoded).ok().map(|key| key.into_owned())
}
