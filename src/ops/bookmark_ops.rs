use chrono::Utc;

use crate::model::bookmark::{Bookmark, BookmarkColor, BookmarkFolder, BookmarkNode, BookmarkTree};
use crate::ops::order::{self, OrderError, Position};
use crate::ops::validate::{self, Ceiling, MAX_DEPTH, MAX_TEXT_LEN, ValidationError};

/// Error type for bookmark and folder operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookmarkError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Order(#[from] OrderError),
    #[error("bookmark not found: {0}")]
    NotFound(String),
    #[error("folder not found: {0}")]
    FolderNotFound(String),
    #[error("item not found: {0}")]
    ItemNotFound(String),
    #[error("Cannot move folder into itself or its subfolders")]
    FolderCycle,
    #[error("Moving this folder would exceed maximum depth (3 levels)")]
    FolderTooDeep,
}

/// Fields for a new bookmark
#[derive(Debug, Clone, Default)]
pub struct NewBookmark {
    pub file_uri: String,
    pub line: usize,
    /// Label; trimmed and cut to 50 characters
    pub text: String,
    pub color: Option<BookmarkColor>,
    pub parent_id: Option<String>,
}

/// Result of toggling the bookmark on a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toggled {
    Added(String),
    Removed(String),
}

// ---------------------------------------------------------------------------
// Bookmarks
// ---------------------------------------------------------------------------

/// Add a bookmark at the end of its folder (or the root). Returns its ID.
///
/// The store itself allows several bookmarks on one line; callers that want
/// one-per-line go through [`toggle_bookmark`].
pub fn add_bookmark(tree: &mut BookmarkTree, new: NewBookmark) -> Result<String, BookmarkError> {
    if let Some(parent) = new.parent_id.as_deref()
        && tree.folder(parent).is_none()
    {
        return Err(BookmarkError::FolderNotFound(parent.to_string()));
    }
    validate::validate_total_count(tree.bookmarks.len(), Ceiling::Bookmarks)?;

    let order = order::append_order(
        tree.siblings(new.parent_id.as_deref())
            .into_iter()
            .map(|(_, order)| order),
    );
    let now = Utc::now();
    let bookmark = Bookmark {
        id: crate::model::new_id(),
        file_uri: new.file_uri,
        line: new.line,
        text: validate::clamp_chars(&new.text, MAX_TEXT_LEN),
        created_at: now,
        updated_at: now,
        order,
        color: new.color,
        parent_id: new.parent_id,
    };
    let id = bookmark.id.clone();
    tree.bookmarks.push(bookmark);
    Ok(id)
}

/// Remove the bookmark on `(file_uri, line)` if there is one, otherwise add
/// one at the root. Keeps at most one bookmark per line.
pub fn toggle_bookmark(
    tree: &mut BookmarkTree,
    file_uri: &str,
    line: usize,
    text: &str,
    color: Option<BookmarkColor>,
) -> Result<Toggled, BookmarkError> {
    if let Some(existing) = tree.find_at(file_uri, line) {
        let id = existing.id.clone();
        delete_bookmark(tree, &id);
        return Ok(Toggled::Removed(id));
    }
    let id = add_bookmark(
        tree,
        NewBookmark {
            file_uri: file_uri.to_string(),
            line,
            text: text.to_string(),
            color,
            parent_id: None,
        },
    )?;
    Ok(Toggled::Added(id))
}

/// Relabel a bookmark. Returns false if it does not exist.
///
/// No length check is done here; callers validate user input first.
pub fn rename_bookmark(tree: &mut BookmarkTree, id: &str, text: &str) -> bool {
    match tree.bookmark_mut(id) {
        Some(b) => {
            b.text = text.trim().to_string();
            b.touch();
            true
        }
        None => false,
    }
}

/// Set (or clear, with `None`) a bookmark's color.
pub fn set_color(tree: &mut BookmarkTree, id: &str, color: Option<BookmarkColor>) -> bool {
    match tree.bookmark_mut(id) {
        Some(b) => {
            b.color = color;
            b.touch();
            true
        }
        None => false,
    }
}

/// Delete one bookmark and close the gap it leaves. Returns false if it was
/// already gone.
pub fn delete_bookmark(tree: &mut BookmarkTree, id: &str) -> bool {
    let Some(pos) = tree.bookmarks.iter().position(|b| b.id == id) else {
        return false;
    };
    let removed = tree.bookmarks.remove(pos);
    normalize_group(tree, removed.parent_id.as_deref());
    true
}

/// Move a bookmark to the end of `new_parent` (a folder, or the root).
pub fn move_bookmark(tree: &mut BookmarkTree, id: &str, new_parent: Option<&str>) -> Result<(), BookmarkError> {
    let old_parent = tree
        .bookmark(id)
        .ok_or_else(|| BookmarkError::NotFound(id.to_string()))?
        .parent_id
        .clone();
    if let Some(parent) = new_parent
        && tree.folder(parent).is_none()
    {
        return Err(BookmarkError::FolderNotFound(parent.to_string()));
    }
    relocate(tree, &BookmarkNode::Bookmark(id.to_string()), old_parent, new_parent);
    Ok(())
}

// ---------------------------------------------------------------------------
// Folders
// ---------------------------------------------------------------------------

/// Create a folder at the end of `parent_id` (or the root). Returns its ID.
pub fn add_folder(tree: &mut BookmarkTree, name: &str, parent_id: Option<&str>) -> Result<String, BookmarkError> {
    validate::validate_folder_name(name)?;
    if let Some(parent) = parent_id
        && tree.folder(parent).is_none()
    {
        return Err(BookmarkError::FolderNotFound(parent.to_string()));
    }
    validate::validate_nesting(&tree.folders, parent_id)?;

    let order = order::append_order(tree.siblings(parent_id).into_iter().map(|(_, order)| order));
    let now = Utc::now();
    let folder = BookmarkFolder {
        id: crate::model::new_id(),
        name: name.trim().to_string(),
        parent_id: parent_id.map(String::from),
        created_at: now,
        updated_at: now,
        order,
        is_expanded: true,
    };
    let id = folder.id.clone();
    tree.folders.push(folder);
    Ok(id)
}

/// Rename a folder. Returns false if it does not exist.
///
/// Callers run [`validate::validate_folder_name`] first, the same check
/// creation uses.
pub fn rename_folder(tree: &mut BookmarkTree, id: &str, name: &str) -> bool {
    match tree.folder_mut(id) {
        Some(f) => {
            f.name = name.trim().to_string();
            f.touch();
            true
        }
        None => false,
    }
}

/// Expand or collapse a folder in tree views.
pub fn set_folder_expanded(tree: &mut BookmarkTree, id: &str, expanded: bool) -> bool {
    match tree.folder_mut(id) {
        Some(f) => {
            f.is_expanded = expanded;
            true
        }
        None => false,
    }
}

/// Delete a folder with every folder and bookmark nested under it, then close
/// the gap in its former sibling group. Returns the number of removed nodes,
/// the folder itself included (0 if it was already gone).
pub fn delete_folder(tree: &mut BookmarkTree, id: &str) -> usize {
    let Some(folder) = tree.folder(id) else {
        return 0;
    };
    let parent = folder.parent_id.clone();
    let mut doomed = tree.descendant_folder_ids(id);
    doomed.push(id.to_string());

    let before = tree.bookmarks.len() + tree.folders.len();
    tree.bookmarks
        .retain(|b| b.parent_id.as_ref().is_none_or(|p| !doomed.contains(p)));
    tree.folders.retain(|f| !doomed.contains(&f.id));
    let removed = before - tree.bookmarks.len() - tree.folders.len();
    tracing::debug!(id, removed, "deleted bookmark folder");

    normalize_group(tree, parent.as_deref());
    removed
}

/// Move a folder (with its contents) to the end of `new_parent`.
pub fn move_folder(tree: &mut BookmarkTree, id: &str, new_parent: Option<&str>) -> Result<(), BookmarkError> {
    let old_parent = tree
        .folder(id)
        .ok_or_else(|| BookmarkError::FolderNotFound(id.to_string()))?
        .parent_id
        .clone();
    if let Some(parent) = new_parent
        && tree.folder(parent).is_none()
    {
        return Err(BookmarkError::FolderNotFound(parent.to_string()));
    }
    check_folder_move(tree, id, new_parent)?;
    relocate(tree, &BookmarkNode::Folder(id.to_string()), old_parent, new_parent);
    Ok(())
}

// ---------------------------------------------------------------------------
// Drag and drop
// ---------------------------------------------------------------------------

/// Drop `dragged` (a folder or bookmark) next to `target`, taking `target`'s
/// parent. Either ID may name a folder or a bookmark.
pub fn reorder(
    tree: &mut BookmarkTree,
    dragged: &str,
    target: &str,
    position: Position,
) -> Result<(), BookmarkError> {
    let dragged_node = tree
        .resolve(dragged)
        .ok_or_else(|| BookmarkError::ItemNotFound(dragged.to_string()))?;
    let target_node = tree
        .resolve(target)
        .ok_or_else(|| BookmarkError::ItemNotFound(target.to_string()))?;

    let old_parent = tree.parent_of(&dragged_node);
    let new_parent = tree.parent_of(&target_node);
    if dragged_node.is_folder() && old_parent != new_parent {
        check_folder_move(tree, dragged, new_parent.as_deref())?;
    }

    let siblings: Vec<BookmarkNode> = tree
        .siblings(new_parent.as_deref())
        .into_iter()
        .map(|(node, _)| node)
        .filter(|node| *node != dragged_node)
        .collect();
    let placed = order::insert_relative(siblings, dragged_node.clone(), &target_node, position)?;

    tree.set_parent(&dragged_node, new_parent.clone());
    if old_parent != new_parent {
        normalize_group(tree, old_parent.as_deref());
    }
    for (node, order) in placed {
        tree.set_order(&node, order);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Reject folder moves that would create a cycle or push any nested folder
/// past [`MAX_DEPTH`].
fn check_folder_move(tree: &BookmarkTree, id: &str, new_parent: Option<&str>) -> Result<(), BookmarkError> {
    let Some(parent) = new_parent else {
        return Ok(());
    };
    if parent == id || tree.is_descendant_folder(parent, id) {
        return Err(BookmarkError::FolderCycle);
    }
    if tree.folder_depth(parent) + tree.folder_height(id) > MAX_DEPTH {
        return Err(BookmarkError::FolderTooDeep);
    }
    Ok(())
}

/// Reparent `node` to the end of `new_parent`, then tidy both groups.
fn relocate(tree: &mut BookmarkTree, node: &BookmarkNode, old_parent: Option<String>, new_parent: Option<&str>) {
    let order = order::append_order(
        tree.siblings(new_parent)
            .into_iter()
            .filter(|(n, _)| n != node)
            .map(|(_, order)| order),
    );
    tree.set_parent(node, new_parent.map(String::from));
    tree.set_order(node, order);
    if old_parent.as_deref() != new_parent {
        normalize_group(tree, old_parent.as_deref());
    }
    normalize_group(tree, new_parent);
}

/// Renumber the combined folder+bookmark group under `parent` to `0..k-1`.
pub(crate) fn normalize_group(tree: &mut BookmarkTree, parent: Option<&str>) {
    let mut group = tree.siblings(parent);
    order::normalize(&mut group);
    for (node, order) in group {
        tree.set_order(&node, order);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
