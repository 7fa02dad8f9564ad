use std::path::PathBuf;

use super::bookmark::BookmarkTree;
use super::config::NookConfig;
use super::scratch::ScratchList;
use super::todo::TodoList;

/// Where a workspace's data lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// A workspace root containing a `.nook/` directory
    Workspace(PathBuf),
    /// The per-user fallback used when no workspace is open
    Global,
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Workspace(root) => write!(f, "workspace {}", root.display()),
            Scope::Global => write!(f, "global"),
        }
    }
}

/// A fully loaded workspace
#[derive(Debug)]
pub struct Workspace {
    pub scope: Scope,
    /// Directory holding the snapshots, config and scratch mirrors
    pub data_dir: PathBuf,
    /// Parsed nook.toml
    pub config: NookConfig,
    pub todos: TodoList,
    pub bookmarks: BookmarkTree,
    pub scratch: ScratchList,
}
