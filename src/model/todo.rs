use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::node::{self, TreeNode};

/// A single todo item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    /// Todo text, 1–50 characters
    pub text: String,
    #[serde(default)]
    pub done: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Position within the sibling group (dense, 0-based)
    #[serde(default)]
    pub order: usize,
    /// Parent todo, `None` for top-level todos
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl Todo {
    /// Create a new open todo with fresh timestamps
    pub fn new(text: String, parent_id: Option<String>, order: usize) -> Self {
        let now = Utc::now();
        Todo {
            id: super::new_id(),
            text,
            done: false,
            created_at: now,
            updated_at: now,
            order,
            parent_id,
        }
    }

    /// Bump `updated_at` to now
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl TreeNode for Todo {
    fn id(&self) -> &str {
        &self.id
    }

    fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }
}

/// All todos of a workspace, stored flat with parent back-references
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoList {
    pub todos: Vec<Todo>,
}

impl TodoList {
    pub fn new(todos: Vec<Todo>) -> Self {
        TodoList { todos }
    }

    pub fn len(&self) -> usize {
        self.todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Todo> {
        self.todos.iter_mut().find(|t| t.id == id)
    }

    /// Children of `parent` (or the top level for `None`), sorted by order
    pub fn children(&self, parent: Option<&str>) -> Vec<&Todo> {
        let mut kids: Vec<&Todo> = self
            .todos
            .iter()
            .filter(|t| t.parent_id.as_deref() == parent)
            .collect();
        kids.sort_by_key(|t| t.order);
        kids
    }

    /// Depth of a todo: 1 at the top level. 0 if the todo does not exist.
    pub fn depth(&self, id: &str) -> usize {
        node::depth_of(&self.todos, id)
    }

    /// IDs of every todo beneath `id`
    pub fn descendant_ids(&self, id: &str) -> Vec<String> {
        node::descendant_ids(&self.todos, id)
    }

    /// Walk the tree depth-first in display order, yielding `(depth, todo)`
    /// with depth starting at 1.
    pub fn walk(&self) -> Vec<(usize, &Todo)> {
        let mut out = Vec::new();
        self.walk_from(None, 1, &mut out);
        out
    }

    fn walk_from<'a>(&'a self, parent: Option<&str>, depth: usize, out: &mut Vec<(usize, &'a Todo)>) {
        for todo in self.children(parent) {
            out.push((depth, todo));
            if depth <= self.todos.len() {
                self.walk_from(Some(&todo.id), depth + 1, out);
            }
        }
    }
}
