use serde::{Deserialize, Serialize};

use crate::model::bookmark::BookmarkTree;
use crate::ops::bookmark_ops::{self, normalize_group};

/// One content change from an editor: the `[start, end]` range was replaced
/// by `text`. Lines and characters are 0-based.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextChange {
    pub start_line: usize,
    #[serde(default)]
    pub start_character: usize,
    pub end_line: usize,
    #[serde(default)]
    pub end_character: usize,
    #[serde(default)]
    pub text: String,
}

impl TextChange {
    /// Net number of lines added (positive) or removed (negative)
    pub fn lines_delta(&self) -> i64 {
        let inserted = self.text.split('\n').count() as i64 - 1;
        let replaced = self.end_line as i64 - self.start_line as i64;
        inserted - replaced
    }

    /// Nothing was replaced, text was only inserted
    pub fn is_insertion(&self) -> bool {
        self.start_line == self.end_line && self.start_character == self.end_character
    }

    /// An insertion at column 0 ending in a newline pushes the whole start
    /// line down instead of splitting it.
    fn pushes_line_down(&self) -> bool {
        self.is_insertion() && self.start_character == 0 && self.text.ends_with('\n')
    }
}

/// What happened to bookmarks while reconciling
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    pub moved: usize,
    pub removed: usize,
}

impl std::ops::AddAssign for ReconcileSummary {
    fn add_assign(&mut self, rhs: Self) {
        self.moved += rhs.moved;
        self.removed += rhs.removed;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Shift,
    MergeUp,
    Remove,
    Keep,
}

/// Decide what a single change does to a bookmark on `line`. The first
/// matching rule wins.
fn classify(change: &TextChange, delta: i64, line: usize) -> Action {
    if line > change.end_line {
        return if delta != 0 { Action::Shift } else { Action::Keep };
    }
    if line == change.start_line && change.start_character == 0 {
        if delta > 0 && change.pushes_line_down() {
            return Action::Shift;
        }
        if delta < 0 {
            return Action::MergeUp;
        }
    }
    if line >= change.start_line && delta < 0 {
        return Action::Remove;
    }
    Action::Keep
}

fn shifted(line: usize, delta: i64) -> usize {
    (line as i64 + delta).max(0) as usize
}

/// Apply one change to the bookmarks of `file_uri`.
///
/// Bookmarks are visited from the highest line down, each against the state
/// left by the ones before it.
pub fn apply_change(tree: &mut BookmarkTree, file_uri: &str, change: &TextChange) -> ReconcileSummary {
    let delta = change.lines_delta();
    let mut summary = ReconcileSummary::default();

    let mut affected: Vec<(String, usize)> = tree
        .bookmarks
        .iter()
        .filter(|b| b.file_uri == file_uri)
        .map(|b| (b.id.clone(), b.line))
        .collect();
    affected.sort_by(|a, b| b.1.cmp(&a.1));

    for (id, line) in affected {
        match classify(change, delta, line) {
            Action::Shift => {
                set_line(tree, &id, shifted(line, delta));
                summary.moved += 1;
            }
            Action::MergeUp => {
                let occupied = line == 0
                    || tree
                        .bookmarks
                        .iter()
                        .any(|b| b.id != id && b.file_uri == file_uri && b.line == line - 1);
                if occupied {
                    bookmark_ops::delete_bookmark(tree, &id);
                    summary.removed += 1;
                } else {
                    set_line(tree, &id, line - 1);
                    summary.moved += 1;
                }
            }
            Action::Remove => {
                bookmark_ops::delete_bookmark(tree, &id);
                summary.removed += 1;
            }
            Action::Keep => {}
        }
    }

    if summary != ReconcileSummary::default() {
        tracing::debug!(
            file_uri,
            delta,
            moved = summary.moved,
            removed = summary.removed,
            "reconciled bookmarks"
        );
    }
    summary
}

/// Apply every change of one document-change event, in order.
pub fn apply_changes(tree: &mut BookmarkTree, file_uri: &str, changes: &[TextChange]) -> ReconcileSummary {
    let mut summary = ReconcileSummary::default();
    for change in changes {
        summary += apply_change(tree, file_uri, change);
    }
    summary
}

fn set_line(tree: &mut BookmarkTree, id: &str, line: usize) {
    if let Some(b) = tree.bookmark_mut(id) {
        b.line = line;
        b.touch();
    }
}

// ---------------------------------------------------------------------------
// File lifecycle
// ---------------------------------------------------------------------------

/// Rewrite `old` as `new` in `uri` if it names `old` itself or something
/// inside it.
fn renamed_uri(uri: &str, old: &str, new: &str) -> Option<String> {
    if uri == old {
        return Some(new.to_string());
    }
    let rest = uri.strip_prefix(old)?;
    if rest.starts_with('/') {
        Some(format!("{}{}", new, rest))
    } else {
        None
    }
}

/// Point bookmarks at renamed files. A renamed directory carries along the
/// bookmarks of every file beneath it. Returns how many bookmarks changed.
pub fn apply_file_renames(tree: &mut BookmarkTree, renames: &[(String, String)]) -> usize {
    let mut changed = 0;
    for (old, new) in renames {
        for b in tree.bookmarks.iter_mut() {
            if let Some(uri) = renamed_uri(&b.file_uri, old, new) {
                b.file_uri = uri;
                b.touch();
                changed += 1;
            }
        }
    }
    changed
}

/// Drop bookmarks of deleted files (or files inside deleted directories).
/// Returns how many bookmarks were removed.
pub fn remove_bookmarks_for_files(tree: &mut BookmarkTree, uris: &[String]) -> usize {
    let gone = |file: &str| uris.iter().any(|u| renamed_uri(file, u, u).is_some());

    let mut parents: Vec<Option<String>> = Vec::new();
    let before = tree.bookmarks.len();
    tree.bookmarks.retain(|b| {
        if gone(&b.file_uri) {
            if !parents.contains(&b.parent_id) {
                parents.push(b.parent_id.clone());
            }
            false
        } else {
            true
        }
    });
    for parent in &parents {
        normalize_group(tree, parent.as_deref());
    }
    before - tree.bookmarks.len()
}
