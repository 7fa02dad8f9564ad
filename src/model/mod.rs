pub mod node;
pub mod todo;
pub mod bookmark;
pub mod scratch;
pub mod workspace;
pub mod config;

pub use node::*;
pub use todo::*;
pub use bookmark::*;
pub use scratch::*;
pub use workspace::*;
pub use config::*;

/// Generate a fresh item ID. Todos, bookmarks, folders and scratch files
/// all draw from the same ID space.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
