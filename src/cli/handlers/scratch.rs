use super::*;
use crate::io::scratch_io;
use crate::model::scratch::ScratchList;
use crate::ops::scratch_ops;

/// Resolve a name, an ID or an ID prefix to an ID
fn scratch_id(list: &ScratchList, key: &str) -> Result<String, String> {
    if let Some(f) = list.lookup(key) {
        return Ok(f.id.clone());
    }
    resolve_id(list.files.iter().map(|f| f.id.as_str()), key)
}

fn save(session: &mut Session) -> CmdResult {
    workspace_io::save_scratch(&mut session.store, &session.ws.scratch)?;
    Ok(())
}

pub(super) fn run(ctx: &Ctx, action: ScratchAction) -> CmdResult {
    match action {
        ScratchAction::New(args) => cmd_new(ctx, args),
        ScratchAction::List => cmd_list(ctx),
        ScratchAction::Show(args) => cmd_show(ctx, args),
        ScratchAction::Rename(args) => cmd_rename(ctx, args),
        ScratchAction::Rm(args) => cmd_rm(ctx, args),
        ScratchAction::Write(args) => cmd_write(ctx, args),
        ScratchAction::Reorder(args) => cmd_reorder(ctx, args),
        ScratchAction::Sync => cmd_sync(ctx),
    }
}

fn cmd_list(ctx: &Ctx) -> CmdResult {
    let ws = load(ctx)?;
    let files = ws.scratch.sorted();
    if ctx.json {
        let items: Vec<ScratchJson> = files.into_iter().map(scratch_to_json).collect();
        return print_json(&items);
    }
    for f in files {
        println!("{}", format_scratch_line(f));
    }
    Ok(())
}

fn cmd_show(ctx: &Ctx, args: ScratchNameArg) -> CmdResult {
    let ws = load(ctx)?;
    let id = scratch_id(&ws.scratch, &args.name)?;
    let file = ws
        .scratch
        .get(&id)
        .ok_or_else(|| scratch_ops::ScratchError::NotFound(args.name.clone()))?;
    if ctx.json {
        return print_json(file);
    }
    print!("{}", file.content);
    if !file.content.is_empty() && !file.content.ends_with('\n') {
        println!();
    }
    Ok(())
}

fn cmd_new(ctx: &Ctx, args: ScratchNewArgs) -> CmdResult {
    let mut session = open_session(ctx)?;
    let language = args
        .language
        .unwrap_or_else(|| session.ws.config.scratch.default_language.clone());
    let id = scratch_ops::create_scratch(
        &mut session.ws.scratch,
        &args.name,
        &args.content,
        Some(language.as_str()),
    )?;
    save(&mut session)?;
    if let Some(file) = session.ws.scratch.get(&id) {
        scratch_io::write_mirror(&session.ws.data_dir, file)?;
    }
    print_id(ctx, &id)
}

fn cmd_rename(ctx: &Ctx, args: ScratchRenameArgs) -> CmdResult {
    let mut session = open_session(ctx)?;
    let id = scratch_id(&session.ws.scratch, &args.name)?;
    let old_name = scratch_ops::rename_scratch(&mut session.ws.scratch, &id, &args.new_name)?;
    save(&mut session)?;
    if let Some(file) = session.ws.scratch.get(&id) {
        scratch_io::rename_mirror(&session.ws.data_dir, &old_name, file)?;
    }
    Ok(())
}

fn cmd_rm(ctx: &Ctx, args: ScratchNameArg) -> CmdResult {
    let mut session = open_session(ctx)?;
    let id = scratch_id(&session.ws.scratch, &args.name)?;
    // Unknown names are a no-op
    let Some(removed) = scratch_ops::delete_scratch(&mut session.ws.scratch, &id) else {
        return Ok(());
    };
    save(&mut session)?;
    scratch_io::remove_mirror(&session.ws.data_dir, &removed.name)?;
    Ok(())
}

fn cmd_write(ctx: &Ctx, args: ScratchWriteArgs) -> CmdResult {
    let content = match args.content {
        Some(c) => c,
        None => read_stdin()?,
    };
    let mut session = open_session(ctx)?;
    let id = scratch_id(&session.ws.scratch, &args.name)?;
    if session.ws.scratch.get(&id).is_none() {
        return Err(scratch_ops::ScratchError::NotFound(args.name).into());
    }
    if scratch_ops::update_content(&mut session.ws.scratch, &id, &content) {
        save(&mut session)?;
        if let Some(file) = session.ws.scratch.get(&id) {
            scratch_io::write_mirror(&session.ws.data_dir, file)?;
        }
    }
    Ok(())
}

fn cmd_reorder(ctx: &Ctx, args: ReorderArgs) -> CmdResult {
    let mut session = open_session(ctx)?;
    let dragged = scratch_id(&session.ws.scratch, &args.dragged)?;
    let target = scratch_id(&session.ws.scratch, &args.target)?;
    scratch_ops::reorder_scratch(&mut session.ws.scratch, &dragged, &target, args.position)?;
    save(&mut session)
}

fn cmd_sync(ctx: &Ctx) -> CmdResult {
    let mut session = open_session(ctx)?;
    let changed = scratch_io::sync(&session.ws.data_dir, &mut session.ws.scratch)?;
    if !changed.is_empty() {
        save(&mut session)?;
        tracing::info!(count = changed.len(), "pulled scratch mirror edits");
    }
    if ctx.json {
        return print_json(&serde_json::json!({ "changed": changed }));
    }
    for name in &changed {
        println!("updated {}", name);
    }
    Ok(())
}
