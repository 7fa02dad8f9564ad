use std::ops::Range;

use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::model::workspace::Workspace;

/// What kind of item matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HitKind {
    Todo,
    Bookmark,
    Folder,
    Scratch,
}

/// Which field of the item matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchField {
    Text,
    File,
    Name,
    Content,
}

/// A search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub kind: HitKind,
    pub id: String,
    pub field: MatchField,
    /// The matched field's text (the matching line for scratch content)
    pub snippet: String,
    /// Byte ranges of the matches within `snippet`
    pub spans: Vec<Range<usize>>,
}

/// Compile a user pattern. Matching ignores case.
pub fn build_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

/// Collect all non-overlapping match byte-ranges for a regex in the given text.
fn find_matches(re: &Regex, text: &str) -> Vec<Range<usize>> {
    re.find_iter(text).map(|m| m.start()..m.end()).collect()
}

fn check(re: &Regex, kind: HitKind, id: &str, field: MatchField, text: &str, hits: &mut Vec<SearchHit>) {
    let spans = find_matches(re, text);
    if !spans.is_empty() {
        hits.push(SearchHit {
            kind,
            id: id.to_string(),
            field,
            snippet: text.to_string(),
            spans,
        });
    }
}

/// Search todos, bookmarks, folders and scratch files of a workspace.
///
/// Hits come in display order: todos, then the bookmark tree, then scratch
/// files. Scratch content yields one hit per matching line.
pub fn search(ws: &Workspace, re: &Regex) -> Vec<SearchHit> {
    let mut hits = Vec::new();

    for (_, todo) in ws.todos.walk() {
        check(re, HitKind::Todo, &todo.id, MatchField::Text, &todo.text, &mut hits);
    }

    for (_, node) in ws.bookmarks.walk() {
        if node.is_folder() {
            if let Some(f) = ws.bookmarks.folder(node.id()) {
                check(re, HitKind::Folder, &f.id, MatchField::Name, &f.name, &mut hits);
            }
        } else if let Some(b) = ws.bookmarks.bookmark(node.id()) {
            check(re, HitKind::Bookmark, &b.id, MatchField::Text, &b.text, &mut hits);
            check(re, HitKind::Bookmark, &b.id, MatchField::File, &b.file_uri, &mut hits);
        }
    }

    for file in ws.scratch.sorted() {
        check(re, HitKind::Scratch, &file.id, MatchField::Name, &file.name, &mut hits);
        for line in file.content.lines() {
            check(re, HitKind::Scratch, &file.id, MatchField::Content, line, &mut hits);
        }
    }

    hits
}
