pub mod config_io;
pub mod lock;
pub mod scratch_io;
pub mod store;
pub mod watcher;
pub mod workspace_io;
