use indexmap::IndexMap;
use serde::Serialize;

use crate::model::bookmark::BookmarkTree;
use crate::model::todo::TodoList;

/// Completion counts for a todo list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TodoStats {
    pub total: usize,
    pub done: usize,
    pub open: usize,
    /// Completed share, rounded down; 0 for an empty list
    pub percent: usize,
}

/// Count todos at every level.
pub fn todo_stats(list: &TodoList) -> TodoStats {
    let total = list.len();
    let done = list.todos.iter().filter(|t| t.done).count();
    let percent = if total == 0 { 0 } else { done * 100 / total };
    TodoStats {
        total,
        done,
        open: total - done,
        percent,
    }
}

/// Bookmark counts per file, in the order files were first bookmarked
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkStats {
    pub total: usize,
    pub folders: usize,
    pub per_file: IndexMap<String, usize>,
}

pub fn bookmark_stats(tree: &BookmarkTree) -> BookmarkStats {
    let mut per_file: IndexMap<String, usize> = IndexMap::new();
    for b in &tree.bookmarks {
        *per_file.entry(b.file_uri.clone()).or_insert(0) += 1;
    }
    BookmarkStats {
        total: tree.bookmarks.len(),
        folders: tree.folders.len(),
        per_file,
    }
}
