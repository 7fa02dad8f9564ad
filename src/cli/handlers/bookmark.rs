use super::*;
use crate::model::bookmark::{BookmarkColor, BookmarkTree};
use crate::ops::bookmark_ops::{self, NewBookmark, Toggled};
use crate::ops::reconcile::{self, TextChange};
use crate::ops::stats::bookmark_stats;
use crate::ops::validate;

fn bookmark_id(tree: &BookmarkTree, key: &str) -> Result<String, String> {
    resolve_id(tree.bookmarks.iter().map(|b| b.id.as_str()), key)
}

fn folder_id(tree: &BookmarkTree, key: &str) -> Result<String, String> {
    resolve_id(tree.folders.iter().map(|f| f.id.as_str()), key)
}

/// Folder or bookmark, for drag and drop
fn node_id(tree: &BookmarkTree, key: &str) -> Result<String, String> {
    let ids = tree
        .folders
        .iter()
        .map(|f| f.id.as_str())
        .chain(tree.bookmarks.iter().map(|b| b.id.as_str()));
    resolve_id(ids, key)
}

/// CLI lines are 1-based; stored lines are 0-based
fn stored_line(line: usize) -> Result<usize, String> {
    line.checked_sub(1)
        .ok_or_else(|| "line numbers start at 1".to_string())
}

fn save(session: &mut Session) -> CmdResult {
    workspace_io::save_bookmarks(&mut session.store, &session.ws.bookmarks)?;
    Ok(())
}

/// `None` for the default color so snapshots stay minimal
fn effective_color(requested: Option<BookmarkColor>, ws: &Workspace) -> Option<BookmarkColor> {
    let color = requested.unwrap_or(ws.config.bookmarks.default_color);
    (color != BookmarkColor::Default).then_some(color)
}

pub(super) fn run(ctx: &Ctx, action: BmAction) -> CmdResult {
    match action {
        BmAction::Add(args) => cmd_add(ctx, args),
        BmAction::Toggle(args) => cmd_toggle(ctx, args),
        BmAction::List(args) => cmd_list(ctx, args),
        BmAction::Rename(args) => cmd_rename(ctx, args),
        BmAction::Rm(args) => cmd_rm(ctx, args),
        BmAction::Color(args) => cmd_color(ctx, args),
        BmAction::Mv(args) => cmd_mv(ctx, args),
        BmAction::Reorder(args) => cmd_reorder(ctx, args),
        BmAction::Edit(args) => cmd_edit(ctx, args),
        BmAction::Renamed(args) => cmd_renamed(ctx, args),
        BmAction::Deleted(args) => cmd_deleted(ctx, args),
        BmAction::Stats => cmd_stats(ctx),
    }
}

pub(super) fn run_folder(ctx: &Ctx, action: FolderAction) -> CmdResult {
    match action {
        FolderAction::Add(args) => cmd_folder_add(ctx, args),
        FolderAction::Rename(args) => cmd_folder_rename(ctx, args),
        FolderAction::Rm(args) => cmd_folder_rm(ctx, args),
        FolderAction::Mv(args) => cmd_folder_mv(ctx, args),
        FolderAction::Expand(args) => cmd_folder_expand(ctx, args, true),
        FolderAction::Collapse(args) => cmd_folder_expand(ctx, args, false),
    }
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(ctx: &Ctx, args: BmListArgs) -> CmdResult {
    let ws = load(ctx)?;
    let root = workspace_root(&ws);

    if let Some(file) = args.file {
        let uri = ctx.file_uri(&file)?;
        let found = ws.bookmarks.in_file(&uri);
        if ctx.json {
            let items: Vec<BookmarkNodeJson> = found.into_iter().map(bookmark_to_json).collect();
            return print_json(&items);
        }
        for b in found {
            println!("{}", format_bookmark_line(b, 1, root));
        }
        return Ok(());
    }

    if ctx.json {
        return print_json(&bookmarks_to_json(&ws.bookmarks, None));
    }
    for line in format_bookmark_tree(&ws.bookmarks, root, args.all) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_stats(ctx: &Ctx) -> CmdResult {
    let ws = load(ctx)?;
    let stats = bookmark_stats(&ws.bookmarks);
    if ctx.json {
        return print_json(&stats);
    }
    for line in format_bookmark_stats(&stats, workspace_root(&ws)) {
        println!("{}", line);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Bookmark writes
// ---------------------------------------------------------------------------

fn cmd_add(ctx: &Ctx, args: BmAddArgs) -> CmdResult {
    let line = stored_line(args.line)?;
    let file_uri = ctx.file_uri(&args.file)?;
    let mut session = open_session(ctx)?;
    // One bookmark per line; `bm toggle` is the way to remove it
    if let Some(existing) = session.ws.bookmarks.find_at(&file_uri, line) {
        return Err(format!("line already bookmarked: {}", existing.id).into());
    }
    let parent_id = args
        .folder
        .map(|f| folder_id(&session.ws.bookmarks, &f))
        .transpose()?;
    let color = effective_color(args.color, &session.ws);
    let id = bookmark_ops::add_bookmark(
        &mut session.ws.bookmarks,
        NewBookmark {
            file_uri,
            line,
            text: args.text,
            color,
            parent_id,
        },
    )?;
    save(&mut session)?;
    print_id(ctx, &id)
}

fn cmd_toggle(ctx: &Ctx, args: BmToggleArgs) -> CmdResult {
    let line = stored_line(args.line)?;
    let file_uri = ctx.file_uri(&args.file)?;
    let mut session = open_session(ctx)?;
    let color = effective_color(args.color, &session.ws);
    let toggled = bookmark_ops::toggle_bookmark(&mut session.ws.bookmarks, &file_uri, line, &args.text, color)?;
    save(&mut session)?;

    let (state, id) = match &toggled {
        Toggled::Added(id) => ("added", id),
        Toggled::Removed(id) => ("removed", id),
    };
    if ctx.json {
        print_json(&serde_json::json!({ "id": id, "state": state }))
    } else {
        println!("{} {}", state, id);
        Ok(())
    }
}

fn cmd_rename(ctx: &Ctx, args: BmRenameArgs) -> CmdResult {
    validate::validate_label(&args.text)?;
    let mut session = open_session(ctx)?;
    let id = bookmark_id(&session.ws.bookmarks, &args.id)?;
    if bookmark_ops::rename_bookmark(&mut session.ws.bookmarks, &id, &args.text) {
        save(&mut session)?;
    }
    Ok(())
}

fn cmd_rm(ctx: &Ctx, args: IdArg) -> CmdResult {
    let mut session = open_session(ctx)?;
    let id = bookmark_id(&session.ws.bookmarks, &args.id)?;
    if bookmark_ops::delete_bookmark(&mut session.ws.bookmarks, &id) {
        save(&mut session)?;
    }
    Ok(())
}

fn cmd_color(ctx: &Ctx, args: BmColorArgs) -> CmdResult {
    let mut session = open_session(ctx)?;
    let id = bookmark_id(&session.ws.bookmarks, &args.id)?;
    let color = (args.color != BookmarkColor::Default).then_some(args.color);
    if !bookmark_ops::set_color(&mut session.ws.bookmarks, &id, color) {
        return Err(format!("bookmark not found: {}", args.id).into());
    }
    save(&mut session)
}

fn cmd_mv(ctx: &Ctx, args: MoveArgs) -> CmdResult {
    let mut session = open_session(ctx)?;
    let id = bookmark_id(&session.ws.bookmarks, &args.id)?;
    let to = args
        .to
        .map(|f| folder_id(&session.ws.bookmarks, &f))
        .transpose()?;
    bookmark_ops::move_bookmark(&mut session.ws.bookmarks, &id, to.as_deref())?;
    save(&mut session)
}

fn cmd_reorder(ctx: &Ctx, args: ReorderArgs) -> CmdResult {
    let mut session = open_session(ctx)?;
    let dragged = node_id(&session.ws.bookmarks, &args.dragged)?;
    let target = node_id(&session.ws.bookmarks, &args.target)?;
    bookmark_ops::reorder(&mut session.ws.bookmarks, &dragged, &target, args.position)?;
    save(&mut session)
}

// ---------------------------------------------------------------------------
// Editor and file system feeds
// ---------------------------------------------------------------------------

/// Changes from `--change` flags, or a JSON array on stdin when none given
fn parse_changes(flags: &[String], stdin: impl FnOnce() -> std::io::Result<String>) -> Result<Vec<TextChange>, Box<dyn std::error::Error>> {
    if flags.is_empty() {
        let input = stdin()?;
        let changes: Vec<TextChange> =
            serde_json::from_str(&input).map_err(|e| format!("invalid change list: {}", e))?;
        return Ok(changes);
    }
    let mut changes = Vec::with_capacity(flags.len());
    for raw in flags {
        let change: TextChange = serde_json::from_str(raw)
            .map_err(|e| format!("invalid change '{}': {}", raw, e))?;
        changes.push(change);
    }
    Ok(changes)
}

fn cmd_edit(ctx: &Ctx, args: BmEditArgs) -> CmdResult {
    let changes = parse_changes(&args.changes, read_stdin)?;
    let file_uri = ctx.file_uri(&args.file)?;
    let mut session = open_session(ctx)?;
    let summary = reconcile::apply_changes(&mut session.ws.bookmarks, &file_uri, &changes);
    if summary.moved + summary.removed > 0 {
        save(&mut session)?;
    }
    if ctx.json {
        print_json(&summary)
    } else {
        println!("moved {}, removed {}", summary.moved, summary.removed);
        Ok(())
    }
}

fn cmd_renamed(ctx: &Ctx, args: BmRenamedArgs) -> CmdResult {
    let pair = (ctx.file_uri(&args.old)?, ctx.file_uri(&args.new)?);
    let mut session = open_session(ctx)?;
    let changed = reconcile::apply_file_renames(&mut session.ws.bookmarks, &[pair]);
    if changed > 0 {
        save(&mut session)?;
    }
    if ctx.json {
        print_json(&serde_json::json!({ "moved": changed }))
    } else {
        println!("updated {} bookmarks", changed);
        Ok(())
    }
}

fn cmd_deleted(ctx: &Ctx, args: BmDeletedArgs) -> CmdResult {
    let uris = args
        .files
        .iter()
        .map(|f| ctx.file_uri(f))
        .collect::<Result<Vec<_>, _>>()?;
    let mut session = open_session(ctx)?;
    let removed = reconcile::remove_bookmarks_for_files(&mut session.ws.bookmarks, &uris);
    if removed > 0 {
        save(&mut session)?;
    }
    if ctx.json {
        print_json(&serde_json::json!({ "removed": removed }))
    } else {
        println!("removed {} bookmarks", removed);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Folders
// ---------------------------------------------------------------------------

fn cmd_folder_add(ctx: &Ctx, args: FolderAddArgs) -> CmdResult {
    let mut session = open_session(ctx)?;
    let parent = args
        .parent
        .map(|p| folder_id(&session.ws.bookmarks, &p))
        .transpose()?;
    let id = bookmark_ops::add_folder(&mut session.ws.bookmarks, &args.name, parent.as_deref())?;
    save(&mut session)?;
    print_id(ctx, &id)
}

fn cmd_folder_rename(ctx: &Ctx, args: FolderRenameArgs) -> CmdResult {
    validate::validate_folder_name(&args.name)?;
    let mut session = open_session(ctx)?;
    let id = folder_id(&session.ws.bookmarks, &args.id)?;
    if bookmark_ops::rename_folder(&mut session.ws.bookmarks, &id, &args.name) {
        save(&mut session)?;
    }
    Ok(())
}

fn cmd_folder_rm(ctx: &Ctx, args: IdArg) -> CmdResult {
    let mut session = open_session(ctx)?;
    let id = folder_id(&session.ws.bookmarks, &args.id)?;
    let removed = bookmark_ops::delete_folder(&mut session.ws.bookmarks, &id);
    if removed > 0 {
        save(&mut session)?;
    }
    if ctx.json {
        print_json(&serde_json::json!({ "removed": removed }))
    } else {
        if removed > 0 {
            println!("removed {} items", removed);
        }
        Ok(())
    }
}

fn cmd_folder_mv(ctx: &Ctx, args: MoveArgs) -> CmdResult {
    let mut session = open_session(ctx)?;
    let id = folder_id(&session.ws.bookmarks, &args.id)?;
    let to = args
        .to
        .map(|p| folder_id(&session.ws.bookmarks, &p))
        .transpose()?;
    bookmark_ops::move_folder(&mut session.ws.bookmarks, &id, to.as_deref())?;
    save(&mut session)
}

fn cmd_folder_expand(ctx: &Ctx, args: IdArg, expanded: bool) -> CmdResult {
    let mut session = open_session(ctx)?;
    let id = folder_id(&session.ws.bookmarks, &args.id)?;
    if !bookmark_ops::set_folder_expanded(&mut session.ws.bookmarks, &id, expanded) {
        return Err(format!("folder not found: {}", args.id).into());
    }
    save(&mut session)
}
