use std::ops::Range;
use std::path::Path;

use serde::Serialize;

use crate::model::bookmark::{Bookmark, BookmarkColor, BookmarkFolder, BookmarkNode, BookmarkTree};
use crate::model::scratch::ScratchFile;
use crate::model::todo::{Todo, TodoList};
use crate::ops::search::{HitKind, SearchHit};
use crate::ops::stats::{BookmarkStats, TodoStats};
use crate::util::unicode::{fit_to_width, truncate_to_width};

/// Width given to bookmark labels in listings
const LABEL_CELLS: usize = 40;
/// Width of the scratch name column
const NAME_CELLS: usize = 24;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TodoJson {
    pub id: String,
    pub text: String,
    pub done: bool,
    pub order: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TodoJson>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BookmarkNodeJson {
    Folder {
        id: String,
        name: String,
        order: usize,
        expanded: bool,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        children: Vec<BookmarkNodeJson>,
    },
    Bookmark {
        id: String,
        #[serde(rename = "fileUri")]
        file_uri: String,
        line: usize,
        text: String,
        order: usize,
        color: BookmarkColor,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScratchJson {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub order: Option<usize>,
    pub chars: usize,
}

#[derive(Serialize)]
pub struct IdJson<'a> {
    pub id: &'a str,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// The todo forest under `parent`, nested, in sibling order
pub fn todos_to_json(list: &TodoList, parent: Option<&str>) -> Vec<TodoJson> {
    fn build(list: &TodoList, parent: Option<&str>, budget: usize) -> Vec<TodoJson> {
        list.children(parent)
            .into_iter()
            .map(|t| TodoJson {
                id: t.id.clone(),
                text: t.text.clone(),
                done: t.done,
                order: t.order,
                children: if budget == 0 {
                    Vec::new()
                } else {
                    build(list, Some(&t.id), budget - 1)
                },
            })
            .collect()
    }
    build(list, parent, list.len())
}

/// The bookmark tree under `parent`, nested, folders and bookmarks mixed
pub fn bookmarks_to_json(tree: &BookmarkTree, parent: Option<&str>) -> Vec<BookmarkNodeJson> {
    fn build(tree: &BookmarkTree, parent: Option<&str>, budget: usize) -> Vec<BookmarkNodeJson> {
        tree.siblings(parent)
            .into_iter()
            .filter_map(|(node, _)| match node {
                BookmarkNode::Folder(id) => tree.folder(&id).map(|f| BookmarkNodeJson::Folder {
                    id: f.id.clone(),
                    name: f.name.clone(),
                    order: f.order,
                    expanded: f.is_expanded,
                    children: if budget == 0 {
                        Vec::new()
                    } else {
                        build(tree, Some(&f.id), budget - 1)
                    },
                }),
                BookmarkNode::Bookmark(id) => tree.bookmark(&id).map(bookmark_to_json),
            })
            .collect()
    }
    build(tree, parent, tree.folders.len())
}

pub fn bookmark_to_json(b: &Bookmark) -> BookmarkNodeJson {
    BookmarkNodeJson::Bookmark {
        id: b.id.clone(),
        file_uri: b.file_uri.clone(),
        line: b.line,
        text: b.text.clone(),
        order: b.order,
        color: b.color(),
    }
}

pub fn scratch_to_json(f: &ScratchFile) -> ScratchJson {
    ScratchJson {
        id: f.id.clone(),
        name: f.name.clone(),
        language: f.language.clone(),
        order: f.order,
        chars: f.content.chars().count(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// First 8 characters of an ID, enough to type back in
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((i, _)) => &id[..i],
        None => id,
    }
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth.saturating_sub(1))
}

/// `[x] 1a2b3c4d Write docs`, indented two spaces per level
pub fn format_todo_line(todo: &Todo, depth: usize) -> String {
    let mark = if todo.done { 'x' } else { ' ' };
    format!("{}[{}] {} {}", indent(depth), mark, short_id(&todo.id), todo.text)
}

/// Todo tree lines. Without `show_done`, completed todos and everything
/// beneath them are left out.
pub fn format_todo_tree(list: &TodoList, show_done: bool) -> Vec<String> {
    let mut lines = Vec::new();
    let mut hidden_below: Option<usize> = None;
    for (depth, todo) in list.walk() {
        if let Some(d) = hidden_below {
            if depth > d {
                continue;
            }
            hidden_below = None;
        }
        if todo.done && !show_done {
            hidden_below = Some(depth);
            continue;
        }
        lines.push(format_todo_line(todo, depth));
    }
    lines
}

/// Path shown for a bookmark: relative to `root` when inside it
pub fn display_path(file_uri: &str, root: Option<&Path>) -> String {
    let path = file_uri.strip_prefix("file://").unwrap_or(file_uri);
    if let Some(root) = root
        && let Ok(rel) = Path::new(path).strip_prefix(root)
    {
        return rel.to_string_lossy().into_owned();
    }
    path.to_string()
}

pub fn format_folder_line(f: &BookmarkFolder, depth: usize) -> String {
    let arrow = if f.is_expanded { '▾' } else { '▸' };
    format!("{}{} {} {}/", indent(depth), arrow, short_id(&f.id), f.name)
}

/// `1a2b3c4d src/main.rs:12 entry point (red)`; lines are shown 1-based
pub fn format_bookmark_line(b: &Bookmark, depth: usize, root: Option<&Path>) -> String {
    let mut line = format!(
        "{}{} {}:{}",
        indent(depth),
        short_id(&b.id),
        display_path(&b.file_uri, root),
        b.line + 1
    );
    if !b.text.is_empty() {
        line.push(' ');
        line.push_str(&truncate_to_width(&b.text, LABEL_CELLS));
    }
    if b.color() != BookmarkColor::Default {
        line.push_str(&format!(" ({})", b.color()));
    }
    line
}

/// Bookmark tree lines. Contents of collapsed folders are skipped unless
/// `expand_all` is set.
pub fn format_bookmark_tree(tree: &BookmarkTree, root: Option<&Path>, expand_all: bool) -> Vec<String> {
    let mut lines = Vec::new();
    let mut hidden_below: Option<usize> = None;
    for (depth, node) in tree.walk() {
        if let Some(d) = hidden_below {
            if depth > d {
                continue;
            }
            hidden_below = None;
        }
        match &node {
            BookmarkNode::Folder(id) => {
                if let Some(f) = tree.folder(id) {
                    lines.push(format_folder_line(f, depth));
                    if !f.is_expanded && !expand_all {
                        hidden_below = Some(depth);
                    }
                }
            }
            BookmarkNode::Bookmark(id) => {
                if let Some(b) = tree.bookmark(id) {
                    lines.push(format_bookmark_line(b, depth, root));
                }
            }
        }
    }
    lines
}

pub fn format_scratch_line(f: &ScratchFile) -> String {
    format!(
        "{} {} {} {} chars",
        short_id(&f.id),
        fit_to_width(&f.name, NAME_CELLS),
        f.language.as_deref().unwrap_or("-"),
        f.content.chars().count()
    )
}

pub fn format_todo_stats(stats: &TodoStats) -> String {
    format!(
        "{} todos: {} done, {} open ({}%)",
        stats.total, stats.done, stats.open, stats.percent
    )
}

pub fn format_bookmark_stats(stats: &BookmarkStats, root: Option<&Path>) -> Vec<String> {
    let mut lines = vec![format!(
        "{} bookmarks in {} files, {} folders",
        stats.total,
        stats.per_file.len(),
        stats.folders
    )];
    for (uri, count) in &stats.per_file {
        lines.push(format!("  {:>4}  {}", count, display_path(uri, root)));
    }
    lines
}

pub fn format_search_hit(hit: &SearchHit) -> String {
    let kind = match hit.kind {
        HitKind::Todo => "todo",
        HitKind::Bookmark => "bm",
        HitKind::Folder => "folder",
        HitKind::Scratch => "scratch",
    };
    format!("[{}] {} {}", kind, short_id(&hit.id), highlight(&hit.snippet, &hit.spans))
}

/// Wrap each matched byte range of `text` in `*`
pub fn highlight(text: &str, spans: &[Range<usize>]) -> String {
    let mut out = String::with_capacity(text.len() + spans.len() * 2);
    let mut pos = 0;
    for span in spans {
        let (Some(before), Some(matched)) = (text.get(pos..span.start), text.get(span.clone())) else {
            continue;
        };
        out.push_str(before);
        out.push('*');
        out.push_str(matched);
        out.push('*');
        pos = span.end;
    }
    out.push_str(text.get(pos..).unwrap_or_default());
    out
}
