use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

/// Name of the per-workspace data directory
pub const DATA_DIR: &str = ".nook";

pub const TODOS: &str = "todos";
pub const BOOKMARKS: &str = "bookmarks";
pub const BOOKMARK_FOLDERS: &str = "bookmarkFolders";
pub const SCRATCH_FILES: &str = "scratchFiles";

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Error type for snapshot persistence
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
    #[error("could not parse {namespace}: {source}")]
    ParseError {
        namespace: String,
        source: serde_json::Error,
    },
    #[error("could not serialize {namespace}: {source}")]
    SerializeError {
        namespace: String,
        source: serde_json::Error,
    },
    #[error("{namespace} was written by a newer version (format {found}, expected at most {SNAPSHOT_VERSION})")]
    UnsupportedVersion { namespace: String, found: u32 },
}

/// Keyed storage for whole-collection snapshots.
///
/// Each namespace holds one serialized collection; saves replace it whole.
pub trait KvStore {
    /// Raw snapshot text, `None` if nothing was ever saved
    fn load_raw(&self, namespace: &str) -> Result<Option<String>, StoreError>;

    fn save_raw(&mut self, namespace: &str, content: &str) -> Result<(), StoreError>;
}

/// Versioned envelope around a collection
#[derive(Debug, Serialize, Deserialize)]
pub struct Snapshot<T> {
    pub version: u32,
    pub items: Vec<T>,
}

/// Load a collection. A namespace that was never saved yields an empty list.
pub fn load_items<T: DeserializeOwned>(store: &dyn KvStore, namespace: &str) -> Result<Vec<T>, StoreError> {
    let Some(raw) = store.load_raw(namespace)? else {
        return Ok(Vec::new());
    };
    let snapshot: Snapshot<T> = serde_json::from_str(&raw).map_err(|e| StoreError::ParseError {
        namespace: namespace.to_string(),
        source: e,
    })?;
    if snapshot.version > SNAPSHOT_VERSION {
        return Err(StoreError::UnsupportedVersion {
            namespace: namespace.to_string(),
            found: snapshot.version,
        });
    }
    Ok(snapshot.items)
}

/// Replace a collection with `items`.
pub fn save_items<T: Serialize>(store: &mut dyn KvStore, namespace: &str, items: &[T]) -> Result<(), StoreError> {
    #[derive(Serialize)]
    struct Borrowed<'a, T> {
        version: u32,
        items: &'a [T],
    }
    let json = serde_json::to_string_pretty(&Borrowed {
        version: SNAPSHOT_VERSION,
        items,
    })
    .map_err(|e| StoreError::SerializeError {
        namespace: namespace.to_string(),
        source: e,
    })?;
    store.save_raw(namespace, &json).inspect_err(|e| {
        tracing::error!(namespace, error = %e, "snapshot save failed");
    })?;
    tracing::debug!(namespace, count = items.len(), "saved snapshot");
    Ok(())
}

// ---------------------------------------------------------------------------
// File store
// ---------------------------------------------------------------------------

/// One `<namespace>.json` file per collection under a scope directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, namespace: &str) -> PathBuf {
        self.dir.join(format!("{}.json", namespace))
    }
}

impl KvStore for FileStore {
    fn load_raw(&self, namespace: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(namespace);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::ReadError { path, source: e }),
        }
    }

    fn save_raw(&mut self, namespace: &str, content: &str) -> Result<(), StoreError> {
        let path = self.path_for(namespace);
        fs::create_dir_all(&self.dir).map_err(|e| StoreError::WriteError {
            path: self.dir.clone(),
            source: e,
        })?;
        atomic_write(&path, content.as_bytes()).map_err(|e| StoreError::WriteError { path, source: e })
    }
}

/// In-memory store for tests and dry runs
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn load_raw(&self, namespace: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(namespace).cloned())
    }

    fn save_raw(&mut self, namespace: &str, content: &str) -> Result<(), StoreError> {
        self.entries.insert(namespace.to_string(), content.to_string());
        Ok(())
    }
}

/// Write a file atomically: temp file in the same directory, then rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Scope directories
// ---------------------------------------------------------------------------

/// Walk up from `start` looking for a directory containing `.nook/`.
/// Returns the workspace root.
pub fn discover_workspace(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(DATA_DIR).is_dir() {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Data directory of the global scope
pub fn global_dir() -> PathBuf {
    let data_dir = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local").join("share"));
    data_dir.join("nook")
}

fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
}
