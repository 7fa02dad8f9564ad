pub mod validate;
pub mod order;
pub mod todo_ops;
pub mod bookmark_ops;
pub mod reconcile;
pub mod scratch_ops;
pub mod stats;
pub mod search;
