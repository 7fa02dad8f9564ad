use crate::model::node::{self, TreeNode};

/// Longest todo or bookmark text, in code points
pub const MAX_TEXT_LEN: usize = 50;
/// Longest folder name, in code points
pub const MAX_FOLDER_NAME_LEN: usize = 20;
/// Live todo ceiling, all levels combined
pub const MAX_TODOS: usize = 100;
/// Live bookmark ceiling
pub const MAX_BOOKMARKS: usize = 200;
/// Deepest allowed nesting for todos and bookmark folders
pub const MAX_DEPTH: usize = 3;

/// A rejected input. The message is shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Text must be between 1 and 50 characters.")]
    TextLength,
    #[error("Bookmark label cannot exceed 50 characters.")]
    LabelLength,
    #[error("Total Todo count cannot exceed 100.")]
    TooManyTodos,
    #[error("Total Bookmark count cannot exceed 200.")]
    TooManyBookmarks,
    #[error("Folder name cannot be empty")]
    EmptyFolderName,
    #[error("Folder name must be less than 20 characters")]
    FolderNameTooLong,
    #[error("Nesting level cannot exceed 3.")]
    NestingTooDeep,
}

/// Which count ceiling to check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ceiling {
    Todos,
    Bookmarks,
}

impl Ceiling {
    pub fn limit(self) -> usize {
        match self {
            Ceiling::Todos => MAX_TODOS,
            Ceiling::Bookmarks => MAX_BOOKMARKS,
        }
    }

    fn error(self) -> ValidationError {
        match self {
            Ceiling::Todos => ValidationError::TooManyTodos,
            Ceiling::Bookmarks => ValidationError::TooManyBookmarks,
        }
    }
}

/// Trimmed text must be 1–50 code points long.
pub fn validate_text(s: &str) -> Result<(), ValidationError> {
    let len = s.trim().chars().count();
    if (1..=MAX_TEXT_LEN).contains(&len) {
        Ok(())
    } else {
        Err(ValidationError::TextLength)
    }
}

/// Bookmark labels may be empty; trimmed, at most 50 code points.
pub fn validate_label(s: &str) -> Result<(), ValidationError> {
    if s.trim().chars().count() > MAX_TEXT_LEN {
        Err(ValidationError::LabelLength)
    } else {
        Ok(())
    }
}

/// Trimmed folder name must be non-empty and at most 20 code points.
pub fn validate_folder_name(s: &str) -> Result<(), ValidationError> {
    let len = s.trim().chars().count();
    if len == 0 {
        Err(ValidationError::EmptyFolderName)
    } else if len > MAX_FOLDER_NAME_LEN {
        Err(ValidationError::FolderNameTooLong)
    } else {
        Ok(())
    }
}

/// Checked before insertion: a collection already at the ceiling rejects the
/// next item, so the realized maximum is exactly the ceiling.
pub fn validate_total_count(current_len: usize, ceiling: Ceiling) -> Result<(), ValidationError> {
    if current_len >= ceiling.limit() {
        Err(ceiling.error())
    } else {
        Ok(())
    }
}

/// A new child of `parent_id` must not land deeper than [`MAX_DEPTH`]: the
/// ancestor chain starting at the parent may hold at most two nodes.
pub fn validate_nesting<T: TreeNode>(nodes: &[T], parent_id: Option<&str>) -> Result<(), ValidationError> {
    let Some(parent) = parent_id else {
        return Ok(());
    };
    if node::chain_len(nodes, parent) > MAX_DEPTH - 1 {
        Err(ValidationError::NestingTooDeep)
    } else {
        Ok(())
    }
}

/// Cut `s` down to at most `max` code points after trimming.
pub fn clamp_chars(s: &str, max: usize) -> String {
    s.trim().chars().take(max).collect()
}
