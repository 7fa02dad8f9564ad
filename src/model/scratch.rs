use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A scratch file: free-form content kept per workspace and mirrored to disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScratchFile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    /// Entries written before ordering existed have no order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<usize>,
}

impl ScratchFile {
    pub fn touch(&mut self) {
        self.last_modified = Utc::now();
    }
}

/// The flat, ordered list of scratch files
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScratchList {
    pub files: Vec<ScratchFile>,
}

impl ScratchList {
    pub fn new(files: Vec<ScratchFile>) -> Self {
        ScratchList { files }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ScratchFile> {
        self.files.iter().find(|f| f.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut ScratchFile> {
        self.files.iter_mut().find(|f| f.id == id)
    }

    pub fn by_name(&self, name: &str) -> Option<&ScratchFile> {
        self.files.iter().find(|f| f.name == name)
    }

    /// Look up by ID first, then by name
    pub fn lookup(&self, key: &str) -> Option<&ScratchFile> {
        self.get(key).or_else(|| self.by_name(key))
    }

    /// Files in display order. Ordered entries come first; entries without
    /// an order follow, oldest first.
    pub fn sorted(&self) -> Vec<&ScratchFile> {
        let mut files: Vec<&ScratchFile> = self.files.iter().collect();
        files.sort_by(|a, b| match (a.order, b.order) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.created_at.cmp(&b.created_at),
        });
        files
    }
}
