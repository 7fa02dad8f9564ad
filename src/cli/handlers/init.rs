use std::fs;
use std::path::Path;

use super::{CmdResult, Ctx, print_json};
use crate::io::store::DATA_DIR;
use crate::io::workspace_io;

const GITIGNORE_ENTRY: &str = ".nook/.lock";

/// Keep the lock file out of version control if the workspace uses git.
/// Returns true if `.gitignore` was changed.
fn update_gitignore(root: &Path) -> std::io::Result<bool> {
    if !root.join(".git").exists() {
        return Ok(false);
    }
    let path = root.join(".gitignore");
    let existing = match fs::read_to_string(&path) {
        Ok(s) => s,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e),
    };
    if existing.lines().any(|l| l.trim() == GITIGNORE_ENTRY) {
        return Ok(false);
    }
    let mut updated = existing;
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push('\n');
    }
    updated.push_str(GITIGNORE_ENTRY);
    updated.push('\n');
    fs::write(&path, updated)?;
    Ok(true)
}

pub fn cmd_init(ctx: &Ctx) -> CmdResult {
    let data_dir = workspace_io::init_workspace(&ctx.start)?;
    match update_gitignore(&ctx.start) {
        Ok(true) => tracing::info!("added {} to .gitignore", GITIGNORE_ENTRY),
        Ok(false) => {}
        Err(e) => tracing::warn!(error = %e, "could not update .gitignore"),
    }
    if ctx.json {
        print_json(&serde_json::json!({ "dataDir": data_dir }))
    } else {
        println!("initialized {} in {}", DATA_DIR, ctx.start.display());
        Ok(())
    }
}
