//! Resource Manager - validity-checked handles to parsed descriptions
//!
//! Descriptions are parsed once into `serde_json::Value` and stored in a
//! generation-checked slot map. A released handle never resolves again, even
//! if its slot is reused.

use serde_json::Value;
use slotmap::{new_key_type, SlotMap};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

new_key_type! {
    /// Handle to a parsed description
    pub struct ResourceHandle;
}

/// Resource Manager errors
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The file could not be read
    #[error("Failed to read '{path}': {source}")]
    Io {
        /// Resolved path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON
    #[error("Failed to parse '{path}': {source}")]
    Parse {
        /// Resolved path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// The handle was released or never issued
    #[error("Invalid resource handle: {0:?}")]
    InvalidHandle(ResourceHandle),
}

struct DescriptionEntry {
    key: String,
    value: Value,
}

/// Loads and caches declarative descriptions
pub struct ResourceManager {
    root: PathBuf,
    descriptions: SlotMap<ResourceHandle, DescriptionEntry>,
    by_key: HashMap<String, ResourceHandle>,
}

impl ResourceManager {
    /// Create a manager that resolves relative paths against `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            descriptions: SlotMap::with_key(),
            by_key: HashMap::new(),
        }
    }

    /// Asset root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load and parse a description file, relative to the asset root.
    ///
    /// Loading the same path twice returns the cached handle.
    pub fn load_description(&mut self, path: &str) -> Result<ResourceHandle, ResourceError> {
        if let Some(&handle) = self.by_key.get(path) {
            if self.descriptions.contains_key(handle) {
                return Ok(handle);
            }
        }

        let full_path = self.root.join(path);
        let text = std::fs::read_to_string(&full_path).map_err(|source| ResourceError::Io {
            path: full_path.clone(),
            source,
        })?;
        let value = serde_json::from_str(&text).map_err(|source| ResourceError::Parse {
            path: full_path.clone(),
            source,
        })?;

        log::debug!("Loaded description '{}'", full_path.display());
        Ok(self.insert_description(path, value))
    }

    /// Register an already-parsed description under `key`, replacing any
    /// previous description with the same key.
    pub fn insert_description(&mut self, key: impl Into<String>, value: Value) -> ResourceHandle {
        let key = key.into();
        if let Some(old) = self.by_key.remove(&key) {
            self.descriptions.remove(old);
        }
        let handle = self.descriptions.insert(DescriptionEntry { key: key.clone(), value });
        self.by_key.insert(key, handle);
        handle
    }

    /// Look up a previously loaded description by its key
    pub fn find(&self, key: &str) -> Option<ResourceHandle> {
        self.by_key
            .get(key)
            .copied()
            .filter(|handle| self.descriptions.contains_key(*handle))
    }

    /// Whether the handle still refers to a description
    pub fn is_valid(&self, handle: ResourceHandle) -> bool {
        self.descriptions.contains_key(handle)
    }

    /// Resolve a handle
    pub fn get(&self, handle: ResourceHandle) -> Result<&Value, ResourceError> {
        self.descriptions
            .get(handle)
            .map(|entry| &entry.value)
            .ok_or(ResourceError::InvalidHandle(handle))
    }

    /// Drop a description; the handle is invalid afterwards
    pub fn release(&mut self, handle: ResourceHandle) -> bool {
        match self.descriptions.remove(handle) {
            Some(entry) => {
                self.by_key.remove(&entry.key);
                true
            }
            None => false,
        }
    }

    /// Number of live descriptions
    pub fn len(&self) -> usize {
        self.descriptions.len()
    }

    /// Whether no descriptions are loaded
    pub fn is_empty(&self) -> bool {
        self.descriptions.is_empty()
    }
}
