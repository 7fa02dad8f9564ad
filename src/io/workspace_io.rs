use std::fs;
use std::path::{Path, PathBuf};

use crate::io::config_io::{self, ConfigError};
use crate::io::store::{self, FileStore, KvStore, StoreError};
use crate::model::bookmark::BookmarkTree;
use crate::model::scratch::ScratchList;
use crate::model::todo::TodoList;
use crate::model::workspace::{Scope, Workspace};

/// Error type for opening and saving a workspace
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("workspace already initialized at {0}")]
    AlreadyInitialized(PathBuf),
    #[error("could not create {path}: {source}")]
    CreateError { path: PathBuf, source: std::io::Error },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Data directory for a scope
pub fn scope_dir(scope: &Scope) -> PathBuf {
    match scope {
        Scope::Workspace(root) => root.join(store::DATA_DIR),
        Scope::Global => store::global_dir(),
    }
}

/// Pick the scope for `start`: the nearest enclosing workspace, or the
/// global scope when there is none or `force_global` is set.
pub fn resolve_scope(start: &Path, force_global: bool) -> Scope {
    if force_global {
        return Scope::Global;
    }
    match store::discover_workspace(start) {
        Some(root) => Scope::Workspace(root),
        None => Scope::Global,
    }
}

/// Load every collection and the config of a scope.
pub fn load_workspace(scope: Scope, kv: &dyn KvStore) -> Result<Workspace, WorkspaceError> {
    let data_dir = scope_dir(&scope);
    let (config, _) = config_io::read_config(&data_dir)?;
    let todos = TodoList::new(store::load_items(kv, store::TODOS)?);
    let bookmarks = BookmarkTree::new(
        store::load_items(kv, store::BOOKMARKS)?,
        store::load_items(kv, store::BOOKMARK_FOLDERS)?,
    );
    let scratch = ScratchList::new(store::load_items(kv, store::SCRATCH_FILES)?);
    tracing::debug!(
        scope = %scope,
        todos = todos.len(),
        bookmarks = bookmarks.bookmarks.len(),
        folders = bookmarks.folders.len(),
        scratch = scratch.len(),
        "loaded workspace"
    );
    Ok(Workspace {
        scope,
        data_dir,
        config,
        todos,
        bookmarks,
        scratch,
    })
}

/// Resolve the scope for `start` and load it from disk.
pub fn open_workspace(start: &Path, force_global: bool) -> Result<(Workspace, FileStore), WorkspaceError> {
    let scope = resolve_scope(start, force_global);
    let file_store = FileStore::new(scope_dir(&scope));
    let ws = load_workspace(scope, &file_store)?;
    Ok((ws, file_store))
}

/// Create `<root>/.nook/` with a default config. Fails if it already exists.
pub fn init_workspace(root: &Path) -> Result<PathBuf, WorkspaceError> {
    let data_dir = root.join(store::DATA_DIR);
    if data_dir.is_dir() {
        return Err(WorkspaceError::AlreadyInitialized(root.to_path_buf()));
    }
    fs::create_dir_all(&data_dir).map_err(|e| WorkspaceError::CreateError {
        path: data_dir.clone(),
        source: e,
    })?;
    let config_path = data_dir.join(config_io::CONFIG_FILE);
    store::atomic_write(&config_path, config_io::DEFAULT_CONFIG.as_bytes()).map_err(|e| {
        WorkspaceError::CreateError {
            path: config_path,
            source: e,
        }
    })?;
    tracing::info!(root = %root.display(), "initialized workspace");
    Ok(data_dir)
}

pub fn save_todos(kv: &mut dyn KvStore, todos: &TodoList) -> Result<(), StoreError> {
    store::save_items(kv, store::TODOS, &todos.todos)
}

/// Bookmarks and folders are saved together; a move touches both.
pub fn save_bookmarks(kv: &mut dyn KvStore, tree: &BookmarkTree) -> Result<(), StoreError> {
    store::save_items(kv, store::BOOKMARKS, &tree.bookmarks)?;
    store::save_items(kv, store::BOOKMARK_FOLDERS, &tree.folders)
}

pub fn save_scratch(kv: &mut dyn KvStore, scratch: &ScratchList) -> Result<(), StoreError> {
    store::save_items(kv, store::SCRATCH_FILES, &scratch.files)
}
