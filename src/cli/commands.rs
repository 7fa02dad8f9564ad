use clap::{Args, Parser, Subcommand};

use crate::model::bookmark::BookmarkColor;
use crate::ops::order::Position;

#[derive(Parser)]
#[command(name = "nook", about = concat!("nook v", env!("CARGO_PKG_VERSION"), " - todos, bookmarks and scratch files for your workspace"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different workspace directory
    #[arg(short = 'C', long = "workspace-dir", global = true)]
    pub workspace_dir: Option<String>,

    /// Use the global scope even inside a workspace
    #[arg(long, global = true)]
    pub global: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a workspace in the current directory
    Init,
    /// Manage todos
    Todo(TodoCmd),
    /// Manage bookmarks
    Bm(BmCmd),
    /// Manage bookmark folders
    Folder(FolderCmd),
    /// Manage scratch files
    Scratch(ScratchCmd),
    /// Search todos, bookmarks, folders and scratch files by regex
    Search(SearchArgs),
    /// Follow file renames and deletions in the workspace
    Watch,
    /// Read or change nook.toml settings
    Config(ConfigCmd),
}

/// Drag-and-drop style reorder: place DRAGGED before or after TARGET
#[derive(Args)]
pub struct ReorderArgs {
    /// ID of the item to move
    pub dragged: String,
    /// before or after
    pub position: Position,
    /// ID of the item to drop next to
    pub target: String,
}

// ---------------------------------------------------------------------------
// Todos
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct TodoCmd {
    #[command(subcommand)]
    pub action: TodoAction,
}

#[derive(Subcommand)]
pub enum TodoAction {
    /// Add a todo (at the end of its parent's children)
    Add(TodoAddArgs),
    /// List todos as a tree
    List(TodoListArgs),
    /// Toggle a todo's done state
    Done(IdArg),
    /// Change a todo's text
    Rename(TodoRenameArgs),
    /// Delete a todo and its subtasks
    Rm(IdArg),
    /// Move a todo under another parent (or to the top level)
    Mv(MoveArgs),
    /// Place a todo before or after another one
    Reorder(ReorderArgs),
    /// Delete all completed todos
    ClearDone,
    /// Show completion counts
    Stats,
}

#[derive(Args)]
pub struct TodoAddArgs {
    /// Todo text (1-50 characters)
    pub text: String,
    /// Parent todo ID
    #[arg(long)]
    pub parent: Option<String>,
}

#[derive(Args)]
pub struct TodoListArgs {
    /// Include completed todos even if show_done is off
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub struct TodoRenameArgs {
    pub id: String,
    pub text: String,
}

#[derive(Args)]
pub struct IdArg {
    pub id: String,
}

#[derive(Args)]
pub struct MoveArgs {
    pub id: String,
    /// New parent ID (omit to move to the top level)
    #[arg(long)]
    pub to: Option<String>,
}

// ---------------------------------------------------------------------------
// Bookmarks
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct BmCmd {
    #[command(subcommand)]
    pub action: BmAction,
}

#[derive(Subcommand)]
pub enum BmAction {
    /// Bookmark a line
    Add(BmAddArgs),
    /// Add a bookmark on a line, or remove the one already there
    Toggle(BmToggleArgs),
    /// List bookmarks as a tree
    List(BmListArgs),
    /// Change a bookmark's label
    Rename(BmRenameArgs),
    /// Delete a bookmark
    Rm(IdArg),
    /// Set a bookmark's color
    Color(BmColorArgs),
    /// Move a bookmark into a folder (or to the root)
    Mv(MoveArgs),
    /// Place a bookmark or folder before or after another item
    Reorder(ReorderArgs),
    /// Apply editor content changes to a file's bookmarks
    Edit(BmEditArgs),
    /// Follow a file or directory rename
    Renamed(BmRenamedArgs),
    /// Drop bookmarks of deleted files or directories
    Deleted(BmDeletedArgs),
    /// Show bookmark counts per file
    Stats,
}

#[derive(Args)]
pub struct BmAddArgs {
    /// File to bookmark
    pub file: String,
    /// Line number (1-based)
    pub line: usize,
    /// Label (cut to 50 characters)
    #[arg(long, default_value = "")]
    pub text: String,
    /// default, red, green, yellow or purple
    #[arg(long)]
    pub color: Option<BookmarkColor>,
    /// Folder ID to add into
    #[arg(long)]
    pub folder: Option<String>,
}

#[derive(Args)]
pub struct BmToggleArgs {
    pub file: String,
    /// Line number (1-based)
    pub line: usize,
    #[arg(long, default_value = "")]
    pub text: String,
    #[arg(long)]
    pub color: Option<BookmarkColor>,
}

#[derive(Args)]
pub struct BmListArgs {
    /// Only bookmarks in this file, sorted by line
    #[arg(long)]
    pub file: Option<String>,
    /// Show the contents of collapsed folders too
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub struct BmRenameArgs {
    pub id: String,
    pub text: String,
}

#[derive(Args)]
pub struct BmColorArgs {
    pub id: String,
    pub color: BookmarkColor,
}

#[derive(Args)]
pub struct BmEditArgs {
    /// The edited file
    pub file: String,
    /// A change as JSON (repeatable). Without any, a JSON array is read from stdin.
    #[arg(long = "change", value_name = "JSON")]
    pub changes: Vec<String>,
}

#[derive(Args)]
pub struct BmRenamedArgs {
    pub old: String,
    pub new: String,
}

#[derive(Args)]
pub struct BmDeletedArgs {
    #[arg(required = true)]
    pub files: Vec<String>,
}

// ---------------------------------------------------------------------------
// Folders
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct FolderCmd {
    #[command(subcommand)]
    pub action: FolderAction,
}

#[derive(Subcommand)]
pub enum FolderAction {
    /// Create a folder
    Add(FolderAddArgs),
    /// Rename a folder
    Rename(FolderRenameArgs),
    /// Delete a folder with everything in it
    Rm(IdArg),
    /// Move a folder under another folder (or to the root)
    Mv(MoveArgs),
    /// Expand a folder in listings
    Expand(IdArg),
    /// Collapse a folder in listings
    Collapse(IdArg),
}

#[derive(Args)]
pub struct FolderAddArgs {
    /// Folder name (1-20 characters)
    pub name: String,
    /// Parent folder ID
    #[arg(long)]
    pub parent: Option<String>,
}

#[derive(Args)]
pub struct FolderRenameArgs {
    pub id: String,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Scratch files
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ScratchCmd {
    #[command(subcommand)]
    pub action: ScratchAction,
}

#[derive(Subcommand)]
pub enum ScratchAction {
    /// Create a scratch file
    New(ScratchNewArgs),
    /// List scratch files
    List,
    /// Print a scratch file's content
    Show(ScratchNameArg),
    /// Rename a scratch file
    Rename(ScratchRenameArgs),
    /// Delete a scratch file
    Rm(ScratchNameArg),
    /// Replace a scratch file's content (from --content or stdin)
    Write(ScratchWriteArgs),
    /// Place a scratch file before or after another one
    Reorder(ReorderArgs),
    /// Pull edits made to the on-disk copies back in
    Sync,
}

#[derive(Args)]
pub struct ScratchNewArgs {
    pub name: String,
    #[arg(long, default_value = "")]
    pub content: String,
    /// Language tag (default from config)
    #[arg(long)]
    pub language: Option<String>,
}

#[derive(Args)]
pub struct ScratchNameArg {
    /// Name or ID
    pub name: String,
}

#[derive(Args)]
pub struct ScratchRenameArgs {
    /// Current name or ID
    pub name: String,
    pub new_name: String,
}

#[derive(Args)]
pub struct ScratchWriteArgs {
    /// Name or ID
    pub name: String,
    #[arg(long)]
    pub content: Option<String>,
}

// ---------------------------------------------------------------------------
// Search & config
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct SearchArgs {
    /// Regex pattern (case-insensitive)
    pub pattern: String,
}

#[derive(Args)]
pub struct ConfigCmd {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print a setting (section.key)
    Get(ConfigGetArgs),
    /// Change a setting (section.key value)
    Set(ConfigSetArgs),
}

#[derive(Args)]
pub struct ConfigGetArgs {
    pub key: String,
}

#[derive(Args)]
pub struct ConfigSetArgs {
    pub key: String,
    pub value: String,
}
