use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::node::{self, TreeNode};

/// Highlight color for a bookmark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookmarkColor {
    #[default]
    Default,
    Red,
    Green,
    Yellow,
    Purple,
}

impl BookmarkColor {
    pub const ALL: [BookmarkColor; 5] = [
        BookmarkColor::Default,
        BookmarkColor::Red,
        BookmarkColor::Green,
        BookmarkColor::Yellow,
        BookmarkColor::Purple,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BookmarkColor::Default => "default",
            BookmarkColor::Red => "red",
            BookmarkColor::Green => "green",
            BookmarkColor::Yellow => "yellow",
            BookmarkColor::Purple => "purple",
        }
    }
}

impl fmt::Display for BookmarkColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookmarkColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookmarkColor::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "invalid color: {} (expected default, red, green, yellow, purple)",
                    s
                )
            })
    }
}

/// A bookmarked line in a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: String,
    pub file_uri: String,
    /// 0-based line number
    pub line: usize,
    /// Label, 0–50 characters
    #[serde(default)]
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub order: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<BookmarkColor>,
    /// Containing folder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl Bookmark {
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// The effective color (unset means default)
    pub fn color(&self) -> BookmarkColor {
        self.color.unwrap_or_default()
    }
}

/// A folder grouping bookmarks and other folders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkFolder {
    pub id: String,
    /// Folder name, 1–20 characters
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub order: usize,
    #[serde(default = "default_expanded")]
    pub is_expanded: bool,
}

fn default_expanded() -> bool {
    true
}

impl BookmarkFolder {
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl TreeNode for BookmarkFolder {
    fn id(&self) -> &str {
        &self.id
    }

    fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }
}

/// A member of a bookmark sibling group.
///
/// Folders and bookmarks under the same parent share one ordering domain, so
/// sibling arrays mix both kinds. The tag keeps them apart without guessing
/// from field shapes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BookmarkNode {
    Folder(String),
    Bookmark(String),
}

impl BookmarkNode {
    pub fn id(&self) -> &str {
        match self {
            BookmarkNode::Folder(id) | BookmarkNode::Bookmark(id) => id,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, BookmarkNode::Folder(_))
    }
}

impl fmt::Display for BookmarkNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// All bookmarks and folders of a workspace
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookmarkTree {
    pub bookmarks: Vec<Bookmark>,
    pub folders: Vec<BookmarkFolder>,
}

impl BookmarkTree {
    pub fn new(bookmarks: Vec<Bookmark>, folders: Vec<BookmarkFolder>) -> Self {
        BookmarkTree { bookmarks, folders }
    }

    pub fn bookmark(&self, id: &str) -> Option<&Bookmark> {
        self.bookmarks.iter().find(|b| b.id == id)
    }

    pub fn bookmark_mut(&mut self, id: &str) -> Option<&mut Bookmark> {
        self.bookmarks.iter_mut().find(|b| b.id == id)
    }

    pub fn folder(&self, id: &str) -> Option<&BookmarkFolder> {
        self.folders.iter().find(|f| f.id == id)
    }

    pub fn folder_mut(&mut self, id: &str) -> Option<&mut BookmarkFolder> {
        self.folders.iter_mut().find(|f| f.id == id)
    }

    /// Resolve an ID to a node. Folders are checked first; the first match wins.
    pub fn resolve(&self, id: &str) -> Option<BookmarkNode> {
        if self.folder(id).is_some() {
            Some(BookmarkNode::Folder(id.to_string()))
        } else if self.bookmark(id).is_some() {
            Some(BookmarkNode::Bookmark(id.to_string()))
        } else {
            None
        }
    }

    /// Parent folder of a node (`None` at the root or if the node is gone)
    pub fn parent_of(&self, node: &BookmarkNode) -> Option<String> {
        match node {
            BookmarkNode::Folder(id) => self.folder(id).and_then(|f| f.parent_id.clone()),
            BookmarkNode::Bookmark(id) => self.bookmark(id).and_then(|b| b.parent_id.clone()),
        }
    }

    pub fn order_of(&self, node: &BookmarkNode) -> Option<usize> {
        match node {
            BookmarkNode::Folder(id) => self.folder(id).map(|f| f.order),
            BookmarkNode::Bookmark(id) => self.bookmark(id).map(|b| b.order),
        }
    }

    pub fn set_order(&mut self, node: &BookmarkNode, order: usize) {
        match node {
            BookmarkNode::Folder(id) => {
                if let Some(f) = self.folder_mut(id) {
                    f.order = order;
                }
            }
            BookmarkNode::Bookmark(id) => {
                if let Some(b) = self.bookmark_mut(id) {
                    b.order = order;
                }
            }
        }
    }

    pub fn set_parent(&mut self, node: &BookmarkNode, parent: Option<String>) {
        match node {
            BookmarkNode::Folder(id) => {
                if let Some(f) = self.folder_mut(id) {
                    f.parent_id = parent;
                    f.touch();
                }
            }
            BookmarkNode::Bookmark(id) => {
                if let Some(b) = self.bookmark_mut(id) {
                    b.parent_id = parent;
                    b.touch();
                }
            }
        }
    }

    /// The combined sibling group under `parent`: folders and bookmarks with
    /// their current orders, sorted ascending. Ties keep folders first.
    pub fn siblings(&self, parent: Option<&str>) -> Vec<(BookmarkNode, usize)> {
        let mut group: Vec<(BookmarkNode, usize)> = self
            .folders
            .iter()
            .filter(|f| f.parent_id.as_deref() == parent)
            .map(|f| (BookmarkNode::Folder(f.id.clone()), f.order))
            .chain(
                self.bookmarks
                    .iter()
                    .filter(|b| b.parent_id.as_deref() == parent)
                    .map(|b| (BookmarkNode::Bookmark(b.id.clone()), b.order)),
            )
            .collect();
        group.sort_by_key(|(_, order)| *order);
        group
    }

    /// The bookmark at `(file_uri, line)`, if any
    pub fn find_at(&self, file_uri: &str, line: usize) -> Option<&Bookmark> {
        self.bookmarks
            .iter()
            .find(|b| b.file_uri == file_uri && b.line == line)
    }

    /// Bookmarks in one file, sorted by line
    pub fn in_file(&self, file_uri: &str) -> Vec<&Bookmark> {
        let mut found: Vec<&Bookmark> = self
            .bookmarks
            .iter()
            .filter(|b| b.file_uri == file_uri)
            .collect();
        found.sort_by_key(|b| b.line);
        found
    }

    /// Folder depth: 1 at the root
    pub fn folder_depth(&self, id: &str) -> usize {
        node::depth_of(&self.folders, id)
    }

    /// Whether `candidate` is a folder nested somewhere under `ancestor`
    pub fn is_descendant_folder(&self, candidate: &str, ancestor: &str) -> bool {
        node::is_descendant(&self.folders, candidate, ancestor)
    }

    /// Longest chain of folders under and including `id`
    pub fn folder_height(&self, id: &str) -> usize {
        node::subtree_height(&self.folders, id)
    }

    /// IDs of every folder nested under `id`
    pub fn descendant_folder_ids(&self, id: &str) -> Vec<String> {
        node::descendant_ids(&self.folders, id)
    }

    /// Count everything inside a folder: immediate bookmarks plus, per
    /// subfolder, one for the subfolder and its own count.
    pub fn count_descendants(&self, folder_id: &str) -> usize {
        fn count(tree: &BookmarkTree, folder_id: &str, budget: usize) -> usize {
            if budget == 0 {
                return 0;
            }
            let bookmarks = tree
                .bookmarks
                .iter()
                .filter(|b| b.parent_id.as_deref() == Some(folder_id))
                .count();
            let folders: usize = tree
                .folders
                .iter()
                .filter(|f| f.parent_id.as_deref() == Some(folder_id))
                .map(|f| 1 + count(tree, &f.id, budget - 1))
                .sum();
            bookmarks + folders
        }
        count(self, folder_id, self.folders.len())
    }

    /// Walk the tree depth-first in display order, yielding `(depth, node)`
    /// with depth starting at 1.
    pub fn walk(&self) -> Vec<(usize, BookmarkNode)> {
        let mut out = Vec::new();
        self.walk_from(None, 1, &mut out);
        out
    }

    fn walk_from(&self, parent: Option<&str>, depth: usize, out: &mut Vec<(usize, BookmarkNode)>) {
        for (node, _) in self.siblings(parent) {
            let descend = node.is_folder() && depth <= self.folders.len();
            out.push((depth, node.clone()));
            if descend {
                self.walk_from(Some(node.id()), depth + 1, out);
            }
        }
    }
}

/// Build the identifier stored in `Bookmark::file_uri` for a path
pub fn file_uri(path: &Path) -> String {
    let display = path.to_string_lossy().replace('\\', "/");
    if display.starts_with('/') {
        format!("file://{}", display)
    } else {
        format!("file:///{}", display)
    }
}
