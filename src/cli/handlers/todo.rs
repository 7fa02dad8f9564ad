use super::*;
use crate::ops::stats::todo_stats;
use crate::ops::todo_ops;
use crate::ops::validate;

fn todo_id(session: &Session, key: &str) -> Result<String, String> {
    resolve_id(session.ws.todos.todos.iter().map(|t| t.id.as_str()), key)
}

fn save(session: &mut Session) -> CmdResult {
    workspace_io::save_todos(&mut session.store, &session.ws.todos)?;
    Ok(())
}

pub(super) fn run(ctx: &Ctx, action: TodoAction) -> CmdResult {
    match action {
        TodoAction::Add(args) => cmd_add(ctx, args),
        TodoAction::List(args) => cmd_list(ctx, args),
        TodoAction::Done(args) => cmd_done(ctx, args),
        TodoAction::Rename(args) => cmd_rename(ctx, args),
        TodoAction::Rm(args) => cmd_rm(ctx, args),
        TodoAction::Mv(args) => cmd_mv(ctx, args),
        TodoAction::Reorder(args) => cmd_reorder(ctx, args),
        TodoAction::ClearDone => cmd_clear_done(ctx),
        TodoAction::Stats => cmd_stats(ctx),
    }
}

fn cmd_list(ctx: &Ctx, args: TodoListArgs) -> CmdResult {
    let ws = load(ctx)?;
    if ctx.json {
        return print_json(&todos_to_json(&ws.todos, None));
    }
    let show_done = args.all || ws.config.todos.show_done;
    for line in format_todo_tree(&ws.todos, show_done) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_stats(ctx: &Ctx) -> CmdResult {
    let ws = load(ctx)?;
    let stats = todo_stats(&ws.todos);
    if ctx.json {
        print_json(&stats)
    } else {
        println!("{}", format_todo_stats(&stats));
        Ok(())
    }
}

fn cmd_add(ctx: &Ctx, args: TodoAddArgs) -> CmdResult {
    let mut session = open_session(ctx)?;
    let parent = args.parent.map(|p| todo_id(&session, &p)).transpose()?;
    let id = todo_ops::add_todo(&mut session.ws.todos, &args.text, parent.as_deref())?;
    save(&mut session)?;
    print_id(ctx, &id)
}

fn cmd_done(ctx: &Ctx, args: IdArg) -> CmdResult {
    let mut session = open_session(ctx)?;
    let id = todo_id(&session, &args.id)?;
    // Unknown IDs are a no-op
    let Some(done) = todo_ops::toggle_todo(&mut session.ws.todos, &id) else {
        return Ok(());
    };
    save(&mut session)?;
    if ctx.json {
        print_json(&serde_json::json!({ "id": id, "done": done }))?;
    }
    Ok(())
}

fn cmd_rename(ctx: &Ctx, args: TodoRenameArgs) -> CmdResult {
    validate::validate_text(&args.text)?;
    let mut session = open_session(ctx)?;
    let id = todo_id(&session, &args.id)?;
    if todo_ops::rename_todo(&mut session.ws.todos, &id, &args.text) {
        save(&mut session)?;
    }
    Ok(())
}

fn cmd_rm(ctx: &Ctx, args: IdArg) -> CmdResult {
    let mut session = open_session(ctx)?;
    let id = todo_id(&session, &args.id)?;
    let removed = todo_ops::delete_todo(&mut session.ws.todos, &id);
    if removed > 0 {
        save(&mut session)?;
    }
    if ctx.json {
        print_json(&serde_json::json!({ "removed": removed }))?;
    }
    Ok(())
}

fn cmd_mv(ctx: &Ctx, args: MoveArgs) -> CmdResult {
    let mut session = open_session(ctx)?;
    let id = todo_id(&session, &args.id)?;
    let to = args.to.map(|p| todo_id(&session, &p)).transpose()?;
    todo_ops::move_todo(&mut session.ws.todos, &id, to.as_deref())?;
    save(&mut session)
}

fn cmd_reorder(ctx: &Ctx, args: ReorderArgs) -> CmdResult {
    let mut session = open_session(ctx)?;
    let dragged = todo_id(&session, &args.dragged)?;
    let target = todo_id(&session, &args.target)?;
    todo_ops::reorder_todo(&mut session.ws.todos, &dragged, &target, args.position)?;
    save(&mut session)
}

fn cmd_clear_done(ctx: &Ctx) -> CmdResult {
    let mut session = open_session(ctx)?;
    let removed = todo_ops::clear_done(&mut session.ws.todos);
    if removed > 0 {
        save(&mut session)?;
    }
    if ctx.json {
        print_json(&serde_json::json!({ "removed": removed }))
    } else {
        println!("removed {} todos", removed);
        Ok(())
    }
}
