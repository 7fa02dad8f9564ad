mod bookmark;
mod init;
mod scratch;
mod todo;

pub use init::cmd_init;

use std::io::Read;
use std::path::{Path, PathBuf};

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::lock::ScopeLock;
use crate::io::store::FileStore;
use crate::io::watcher::{FileEvent, WorkspaceWatcher};
use crate::io::workspace_io;
use crate::model::bookmark::file_uri;
use crate::model::workspace::{Scope, Workspace};
use crate::ops::{reconcile, search};

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Where and how a command runs
pub struct Ctx {
    /// Directory scope discovery starts from
    pub start: PathBuf,
    pub global: bool,
    pub json: bool,
}

impl Ctx {
    pub fn from_cli(cli: &Cli) -> Result<Self, Box<dyn std::error::Error>> {
        let start = match &cli.workspace_dir {
            Some(dir) => std::fs::canonicalize(dir)
                .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?,
            None => std::env::current_dir()?,
        };
        Ok(Ctx {
            start,
            global: cli.global,
            json: cli.json,
        })
    }

    /// Turn a user-supplied path into a bookmark file identifier.
    /// Relative paths are taken from the start directory.
    pub fn file_uri(&self, path: &str) -> Result<String, std::io::Error> {
        let joined = self.start.join(path);
        Ok(file_uri(&std::path::absolute(joined)?))
    }
}

/// A loaded workspace held under the scope lock
pub struct Session {
    pub ws: Workspace,
    pub store: FileStore,
    _lock: ScopeLock,
}

/// Workspace root, for showing paths relative to it
pub fn workspace_root(ws: &Workspace) -> Option<&Path> {
    match &ws.scope {
        Scope::Workspace(root) => Some(root),
        Scope::Global => None,
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let ctx = Ctx::from_cli(&cli)?;
    tracing::debug!(start = %ctx.start.display(), global = ctx.global, "dispatching command");

    match cli.command {
        Commands::Init => cmd_init(&ctx),
        Commands::Todo(cmd) => todo::run(&ctx, cmd.action),
        Commands::Bm(cmd) => bookmark::run(&ctx, cmd.action),
        Commands::Folder(cmd) => bookmark::run_folder(&ctx, cmd.action),
        Commands::Scratch(cmd) => scratch::run(&ctx, cmd.action),
        Commands::Search(args) => cmd_search(&ctx, args),
        Commands::Watch => cmd_watch(&ctx),
        Commands::Config(cmd) => cmd_config(&ctx, cmd.action),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load the workspace for reading only.
fn load(ctx: &Ctx) -> Result<Workspace, Box<dyn std::error::Error>> {
    let (ws, _) = workspace_io::open_workspace(&ctx.start, ctx.global)?;
    Ok(ws)
}

/// Lock the scope, then load it. Hold the session until the save is done.
fn open_session(ctx: &Ctx) -> Result<Session, Box<dyn std::error::Error>> {
    let scope = workspace_io::resolve_scope(&ctx.start, ctx.global);
    let data_dir = workspace_io::scope_dir(&scope);
    std::fs::create_dir_all(&data_dir)
        .map_err(|e| format!("could not create {}: {}", data_dir.display(), e))?;
    let lock = ScopeLock::acquire_default(&data_dir)?;
    let store = FileStore::new(&data_dir);
    let ws = workspace_io::load_workspace(scope, &store)?;
    Ok(Session {
        ws,
        store,
        _lock: lock,
    })
}

/// Match `key` against IDs: an exact ID, or a prefix of exactly one ID.
/// Keys matching nothing come back unchanged so the operation can decide.
fn resolve_id<'a, I>(ids: I, key: &str) -> Result<String, String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut matches = Vec::new();
    for id in ids {
        if id == key {
            return Ok(id.to_string());
        }
        if id.starts_with(key) {
            matches.push(id);
        }
    }
    match matches.len() {
        0 => Ok(key.to_string()),
        1 => Ok(matches[0].to_string()),
        n => Err(format!("ambiguous ID '{}' matches {} items", key, n)),
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_id(ctx: &Ctx, id: &str) -> CmdResult {
    if ctx.json {
        print_json(&IdJson { id })
    } else {
        println!("{}", id);
        Ok(())
    }
}

fn read_stdin() -> Result<String, std::io::Error> {
    let mut buf = String::new();
    std::io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

// ---------------------------------------------------------------------------
// Search, watch, config
// ---------------------------------------------------------------------------

fn cmd_search(ctx: &Ctx, args: SearchArgs) -> CmdResult {
    let ws = load(ctx)?;
    let re = search::build_pattern(&args.pattern)?;
    let hits = search::search(&ws, &re);
    if ctx.json {
        return print_json(&hits);
    }
    for hit in &hits {
        println!("{}", format_search_hit(hit));
    }
    Ok(())
}

/// Apply one batch of file events to the bookmarks on disk.
fn apply_file_events(ctx: &Ctx, events: Vec<FileEvent>) -> CmdResult {
    let mut renames = Vec::new();
    let mut deleted = Vec::new();
    for event in events {
        match event {
            FileEvent::Renamed(pairs) => {
                renames.extend(pairs.iter().map(|(old, new)| (file_uri(old), file_uri(new))));
            }
            FileEvent::Deleted(paths) => deleted.extend(paths.iter().map(|p| file_uri(p))),
        }
    }

    let mut session = open_session(ctx)?;
    let moved = reconcile::apply_file_renames(&mut session.ws.bookmarks, &renames);
    let removed = reconcile::remove_bookmarks_for_files(&mut session.ws.bookmarks, &deleted);
    if moved + removed > 0 {
        workspace_io::save_bookmarks(&mut session.store, &session.ws.bookmarks)?;
        tracing::info!(moved, removed, "followed file changes");
    }
    Ok(())
}

fn cmd_watch(ctx: &Ctx) -> CmdResult {
    let root = match workspace_io::resolve_scope(&ctx.start, ctx.global) {
        Scope::Workspace(root) => root,
        Scope::Global => return Err("watch needs a workspace (run `nook init` first)".into()),
    };
    let watcher = WorkspaceWatcher::start(&root)?;
    eprintln!("watching {} (Ctrl-C to stop)", root.display());

    while let Some(events) = watcher.wait(std::time::Duration::from_secs(1)) {
        if events.is_empty() {
            continue;
        }
        // Keep watching through a failed batch
        if let Err(e) = apply_file_events(ctx, events) {
            tracing::error!(error = %e, "could not apply file events");
        }
    }
    Ok(())
}

fn cmd_config(ctx: &Ctx, action: ConfigAction) -> CmdResult {
    let scope = workspace_io::resolve_scope(&ctx.start, ctx.global);
    let data_dir = workspace_io::scope_dir(&scope);
    match action {
        ConfigAction::Get(args) => {
            let (config, _) = config_io::read_config(&data_dir)?;
            let value = config_io::get_value(&config, &args.key)?;
            if ctx.json {
                print_json(&serde_json::json!({ "key": args.key, "value": value }))?;
            } else {
                println!("{}", value);
            }
        }
        ConfigAction::Set(args) => {
            std::fs::create_dir_all(&data_dir)?;
            let _lock = ScopeLock::acquire_default(&data_dir)?;
            let (_, mut doc) = config_io::read_config(&data_dir)?;
            config_io::set_value(&mut doc, &args.key, &args.value)?;
            config_io::write_config(&data_dir, &doc)?;
            tracing::info!(key = %args.key, value = %args.value, "config updated");
        }
    }
    Ok(())
}
