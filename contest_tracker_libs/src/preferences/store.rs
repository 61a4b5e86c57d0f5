use serde_json::{Map, Value};
use std::{
    collections::HashMap,
    fs::{self, File},
    io::{BufWriter, ErrorKind},
    path::{Path, PathBuf},
    sync::RwLock,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("failed to access preference file")]
    IoError(#[from] std::io::Error),
    #[error("failed to serialize preferences")]
    SerializeError(#[from] serde_json::Error),
}

/// Named JSON entries that outlive the process.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&self, key: &str, value: Value) -> Result<(), PreferenceError>;
}

/// Keeps every entry in one JSON object on disk.
///
/// The file is read on each access and replaced through a temporary file on
/// each write, so a crash never leaves a half-written object behind.
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_owned(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Map<String, Value>, PreferenceError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(PreferenceError::from(e)),
        };

        match serde_json::from_str::<Value>(&content)? {
            Value::Object(entries) => Ok(entries),
            other => {
                tracing::warn!(
                    "preference file {} does not hold an object ({}), ignoring it",
                    self.path.display(),
                    other
                );
                Ok(Map::new())
            }
        }
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get(&self, key: &str) -> Option<Value> {
        match self.read_entries() {
            Ok(mut entries) => entries.remove(key),
            Err(e) => {
                tracing::warn!(
                    "failed to read preference file {}: {:?}",
                    self.path.display(),
                    e
                );
                None
            }
        }
    }

    fn set(&self, key: &str, value: Value) -> Result<(), PreferenceError> {
        let mut entries = self.read_entries().unwrap_or_else(|e| {
            tracing::warn!(
                "overwriting unreadable preference file {}: {:?}",
                self.path.display(),
                e
            );
            Map::new()
        });
        entries.insert(key.to_string(), value);

        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let tmp_path = self.path.with_extension("tmp");
        {
            let writer = BufWriter::new(File::create(&tmp_path)?);
            serde_json::to_writer_pretty(writer, &entries)?;
        }
        fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryPreferenceStore {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Option<Value> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) -> Result<(), PreferenceError> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value);
        Ok(())
    }
}
