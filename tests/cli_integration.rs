//! Integration tests for the `nook` CLI.
//!
//! Each test creates a temp workspace, runs `nook` as a subprocess,
//! and verifies stdout and/or the files under `.nook/`.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tempfile::TempDir;

fn nook_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_nook"))
}

/// A temp workspace plus a private global data dir
struct Env {
    root: TempDir,
    data_home: TempDir,
}

impl Env {
    fn new() -> Self {
        let env = Env {
            root: TempDir::new().unwrap(),
            data_home: TempDir::new().unwrap(),
        };
        run_nook_ok(&env, &["init"]);
        env
    }

    /// No `.nook/` anywhere: commands fall back to the global scope
    fn bare() -> Self {
        Env {
            root: TempDir::new().unwrap(),
            data_home: TempDir::new().unwrap(),
        }
    }

    fn path(&self) -> &Path {
        self.root.path()
    }
}

fn command(env: &Env, args: &[&str]) -> Command {
    let mut cmd = Command::new(nook_bin());
    cmd.arg("-C")
        .arg(env.path())
        .args(args)
        .current_dir(env.path())
        .env("XDG_DATA_HOME", env.data_home.path())
        .env_remove("NOOK_LOG");
    cmd
}

/// Run `nook`, returning (stdout, stderr, success).
fn run_nook(env: &Env, args: &[&str]) -> (String, String, bool) {
    let output = command(env, args).output().expect("failed to run nook");
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `nook` expecting success, return stdout.
fn run_nook_ok(env: &Env, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_nook(env, args);
    if !success {
        panic!("nook {:?} failed:\nstdout: {}\nstderr: {}", args, stdout, stderr);
    }
    stdout
}

/// Run `nook` with `input` on stdin, expecting success.
fn run_nook_stdin(env: &Env, args: &[&str], input: &str) -> String {
    use std::io::Write;
    let mut child = command(env, args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to run nook");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(
        output.status.success(),
        "nook {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn json(out: &str) -> serde_json::Value {
    serde_json::from_str(out).unwrap()
}

/// Add a todo and return its ID
fn add_todo(env: &Env, text: &str, parent: Option<&str>) -> String {
    let mut args = vec!["todo", "add", text];
    if let Some(p) = parent {
        args.extend(["--parent", p]);
    }
    run_nook_ok(env, &args).trim().to_string()
}

fn add_bookmark(env: &Env, file: &str, line: &str, text: &str) -> String {
    run_nook_ok(env, &["bm", "add", file, line, "--text", text])
        .trim()
        .to_string()
}

fn bookmark_lines(env: &Env) -> Vec<u64> {
    let out = run_nook_ok(env, &["bm", "list", "--json"]);
    let mut lines: Vec<u64> = json(&out)
        .as_array()
        .unwrap()
        .iter()
        .filter(|n| n["type"] == "bookmark")
        .map(|n| n["line"].as_u64().unwrap())
        .collect();
    lines.sort();
    lines
}

// ---------------------------------------------------------------------------
// Init & scope
// ---------------------------------------------------------------------------

#[test]
fn test_init_creates_data_dir() {
    let env = Env::new();
    assert!(env.path().join(".nook").is_dir());
    assert!(env.path().join(".nook/nook.toml").is_file());
}

#[test]
fn test_init_twice_fails() {
    let env = Env::new();
    let (_, stderr, success) = run_nook(&env, &["init"]);
    assert!(!success);
    assert!(stderr.starts_with("error:"));
}

#[test]
fn test_init_updates_gitignore_in_git_repo() {
    let env = Env::bare();
    fs::create_dir(env.path().join(".git")).unwrap();
    run_nook_ok(&env, &["init"]);
    let gitignore = fs::read_to_string(env.path().join(".gitignore")).unwrap();
    assert!(gitignore.contains(".nook/.lock"));
}

#[test]
fn test_subdirectory_finds_workspace() {
    let env = Env::new();
    let sub = env.path().join("src/deep");
    fs::create_dir_all(&sub).unwrap();
    let out = Command::new(nook_bin())
        .args(["todo", "add", "from below"])
        .current_dir(&sub)
        .env("XDG_DATA_HOME", env.data_home.path())
        .output()
        .unwrap();
    assert!(out.status.success());
    let list = run_nook_ok(&env, &["todo", "list"]);
    assert!(list.contains("from below"));
}

#[test]
fn test_global_scope_without_workspace() {
    let env = Env::bare();
    add_todo(&env, "global item", None);
    assert!(!env.path().join(".nook").exists());
    assert!(env.data_home.path().join("nook/todos.json").is_file());

    let out = run_nook_ok(&env, &["todo", "list"]);
    assert!(out.contains("global item"));
}

#[test]
fn test_global_flag_ignores_workspace() {
    let env = Env::new();
    add_todo(&env, "local", None);
    let out = run_nook_ok(&env, &["--global", "todo", "list"]);
    assert!(!out.contains("local"));
}

// ---------------------------------------------------------------------------
// Todos
// ---------------------------------------------------------------------------

#[test]
fn test_todo_add_and_list() {
    let env = Env::new();
    let id = add_todo(&env, "Write docs", None);
    add_todo(&env, "Outline", Some(&id));

    let out = run_nook_ok(&env, &["todo", "list"]);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("[ ] "));
    assert!(lines[0].ends_with("Write docs"));
    assert!(lines[1].starts_with("  [ ] "));
    assert!(lines[1].ends_with("Outline"));
}

#[test]
fn test_todo_short_id_prefix() {
    let env = Env::new();
    let id = add_todo(&env, "Ship it", None);
    run_nook_ok(&env, &["todo", "done", &id[..8]]);
    let out = run_nook_ok(&env, &["todo", "list"]);
    assert!(out.starts_with("[x] "));
}

#[test]
fn test_todo_text_too_long() {
    let env = Env::new();
    let long = "x".repeat(51);
    let (_, stderr, success) = run_nook(&env, &["todo", "add", &long]);
    assert!(!success);
    assert!(stderr.contains("Text must be between 1 and 50 characters."));
}

#[test]
fn test_todo_nesting_limit() {
    let env = Env::new();
    let a = add_todo(&env, "a", None);
    let b = add_todo(&env, "b", Some(&a));
    let c = add_todo(&env, "c", Some(&b));
    let (_, stderr, success) = run_nook(&env, &["todo", "add", "d", "--parent", &c]);
    assert!(!success);
    assert!(stderr.contains("Nesting level cannot exceed 3."));
}

#[test]
fn test_todo_done_and_stats() {
    let env = Env::new();
    let a = add_todo(&env, "one", None);
    add_todo(&env, "two", None);
    add_todo(&env, "three", None);
    run_nook_ok(&env, &["todo", "done", &a]);

    let out = run_nook_ok(&env, &["todo", "stats"]);
    assert_eq!(out.trim(), "3 todos: 1 done, 2 open (33%)");

    let stats = json(&run_nook_ok(&env, &["--json", "todo", "stats"]));
    assert_eq!(stats["done"], 1);
    assert_eq!(stats["percent"], 33);
}

#[test]
fn test_todo_clear_done_removes_subtree() {
    let env = Env::new();
    let a = add_todo(&env, "parent", None);
    add_todo(&env, "child", Some(&a));
    add_todo(&env, "keep", None);
    run_nook_ok(&env, &["todo", "done", &a]);

    let out = run_nook_ok(&env, &["todo", "clear-done"]);
    assert_eq!(out.trim(), "removed 2 todos");
    let list = run_nook_ok(&env, &["todo", "list"]);
    assert!(list.contains("keep"));
    assert!(!list.contains("child"));
}

#[test]
fn test_todo_reorder() {
    let env = Env::new();
    let a = add_todo(&env, "first", None);
    let b = add_todo(&env, "second", None);
    run_nook_ok(&env, &["todo", "reorder", &b, "before", &a]);
    let out = run_nook_ok(&env, &["todo", "list"]);
    let lines: Vec<&str> = out.lines().collect();
    assert!(lines[0].ends_with("second"));
    assert!(lines[1].ends_with("first"));
}

#[test]
fn test_todo_move_into_own_child_fails() {
    let env = Env::new();
    let a = add_todo(&env, "a", None);
    let b = add_todo(&env, "b", Some(&a));
    let (_, stderr, success) = run_nook(&env, &["todo", "mv", &a, "--to", &b]);
    assert!(!success);
    assert!(stderr.contains("Cannot move a todo into itself"));
}

#[test]
fn test_todo_list_json_is_nested() {
    let env = Env::new();
    let a = add_todo(&env, "a", None);
    add_todo(&env, "b", Some(&a));
    let out = run_nook_ok(&env, &["todo", "list", "--json"]);
    let parsed = json(&out);
    assert_eq!(parsed.as_array().unwrap().len(), 1);
    assert_eq!(parsed[0]["children"][0]["text"], "b");
}

#[test]
fn test_snapshot_on_disk_is_versioned() {
    let env = Env::new();
    add_todo(&env, "persisted", None);
    let raw = fs::read_to_string(env.path().join(".nook/todos.json")).unwrap();
    let parsed = json(&raw);
    assert_eq!(parsed["version"], 1);
    assert_eq!(parsed["items"][0]["text"], "persisted");
}

// ---------------------------------------------------------------------------
// Bookmarks
// ---------------------------------------------------------------------------

#[test]
fn test_bm_add_and_list() {
    let env = Env::new();
    add_bookmark(&env, "src/main.rs", "12", "entry point");
    let out = run_nook_ok(&env, &["bm", "list"]);
    assert!(out.contains("src/main.rs:12 entry point"));
}

#[test]
fn test_bm_add_same_line_twice_fails() {
    let env = Env::new();
    let id = add_bookmark(&env, "src/main.rs", "12", "entry point");
    let (_, stderr, success) = run_nook(&env, &["bm", "add", "src/main.rs", "12"]);
    assert!(!success);
    assert!(stderr.contains(&format!("line already bookmarked: {}", id)));
    assert_eq!(bookmark_lines(&env), vec![11]);

    // Another line of the same file is fine
    add_bookmark(&env, "src/main.rs", "13", "next");
    assert_eq!(bookmark_lines(&env), vec![11, 12]);
}

#[test]
fn test_bm_rename_can_clear_label() {
    let env = Env::new();
    let id = add_bookmark(&env, "a.rs", "1", "old label");
    run_nook_ok(&env, &["bm", "rename", &id, ""]);
    let out = run_nook_ok(&env, &["bm", "list", "--json"]);
    assert_eq!(json(&out)[0]["text"], "");

    let long = "x".repeat(51);
    let (_, stderr, success) = run_nook(&env, &["bm", "rename", &id, &long]);
    assert!(!success);
    assert!(stderr.contains("Bookmark label cannot exceed 50 characters."));
}

#[test]
fn test_bm_line_zero_rejected() {
    let env = Env::new();
    let (_, stderr, success) = run_nook(&env, &["bm", "add", "a.rs", "0"]);
    assert!(!success);
    assert!(stderr.contains("line numbers start at 1"));
}

#[test]
fn test_bm_toggle() {
    let env = Env::new();
    let out = run_nook_ok(&env, &["bm", "toggle", "a.rs", "3"]);
    assert!(out.starts_with("added "));
    let out = run_nook_ok(&env, &["bm", "toggle", "a.rs", "3"]);
    assert!(out.starts_with("removed "));
    assert!(bookmark_lines(&env).is_empty());
}

#[test]
fn test_bm_edit_shifts_lines() {
    let env = Env::new();
    // Stored 0-based as 1, 3, 5
    add_bookmark(&env, "a.rs", "2", "one");
    add_bookmark(&env, "a.rs", "4", "three");
    add_bookmark(&env, "a.rs", "6", "five");

    let change = r#"{"startLine":3,"startCharacter":0,"endLine":3,"endCharacter":0,"text":"x\ny\n"}"#;
    let out = run_nook_ok(&env, &["bm", "edit", "a.rs", "--change", change]);
    assert_eq!(out.trim(), "moved 2, removed 0");
    assert_eq!(bookmark_lines(&env), vec![1, 5, 7]);
}

#[test]
fn test_bm_edit_from_stdin_removes_deleted_lines() {
    let env = Env::new();
    add_bookmark(&env, "a.rs", "2", "keep");
    add_bookmark(&env, "a.rs", "5", "gone");
    add_bookmark(&env, "a.rs", "9", "shift");

    let changes = r#"[{"startLine":3,"startCharacter":4,"endLine":5,"endCharacter":2,"text":""}]"#;
    let out = run_nook_stdin(&env, &["--json", "bm", "edit", "a.rs"], changes);
    let summary = json(&out);
    assert_eq!(summary["moved"], 1);
    assert_eq!(summary["removed"], 1);
    assert_eq!(bookmark_lines(&env), vec![1, 6]);
}

#[test]
fn test_bm_edit_other_file_untouched() {
    let env = Env::new();
    add_bookmark(&env, "b.rs", "5", "other");
    let change = r#"{"startLine":0,"endLine":0,"text":"\n\n"}"#;
    run_nook_ok(&env, &["bm", "edit", "a.rs", "--change", change]);
    assert_eq!(bookmark_lines(&env), vec![4]);
}

#[test]
fn test_bm_renamed_and_deleted() {
    let env = Env::new();
    add_bookmark(&env, "src/old.rs", "1", "x");
    add_bookmark(&env, "src/dir/inner.rs", "1", "y");

    let out = run_nook_ok(&env, &["bm", "renamed", "src/old.rs", "src/new.rs"]);
    assert_eq!(out.trim(), "updated 1 bookmarks");
    let list = run_nook_ok(&env, &["bm", "list"]);
    assert!(list.contains("src/new.rs:1"));

    let out = run_nook_ok(&env, &["bm", "deleted", "src/dir"]);
    assert_eq!(out.trim(), "removed 1 bookmarks");
    assert_eq!(bookmark_lines(&env), vec![0]);
}

#[test]
fn test_bm_list_single_file() {
    let env = Env::new();
    add_bookmark(&env, "a.rs", "9", "late");
    add_bookmark(&env, "b.rs", "1", "other");
    add_bookmark(&env, "a.rs", "2", "early");
    let out = run_nook_ok(&env, &["bm", "list", "--file", "a.rs"]);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("a.rs:2 early"));
    assert!(lines[1].contains("a.rs:9 late"));
}

#[test]
fn test_bm_color() {
    let env = Env::new();
    let id = add_bookmark(&env, "a.rs", "1", "x");
    run_nook_ok(&env, &["bm", "color", &id, "red"]);
    let out = run_nook_ok(&env, &["bm", "list"]);
    assert!(out.contains("(red)"));
}

#[test]
fn test_bm_stats() {
    let env = Env::new();
    add_bookmark(&env, "a.rs", "1", "x");
    add_bookmark(&env, "a.rs", "2", "y");
    add_bookmark(&env, "b.rs", "1", "z");
    let out = run_nook_ok(&env, &["bm", "stats"]);
    assert!(out.starts_with("3 bookmarks in 2 files, 0 folders"));
}

// ---------------------------------------------------------------------------
// Folders
// ---------------------------------------------------------------------------

#[test]
fn test_folder_add_and_collapse() {
    let env = Env::new();
    let folder = run_nook_ok(&env, &["folder", "add", "Auth"]).trim().to_string();
    run_nook_ok(&env, &["bm", "add", "a.rs", "1", "--text", "inside", "--folder", &folder]);

    let out = run_nook_ok(&env, &["bm", "list"]);
    assert!(out.contains("▾"));
    assert!(out.contains("Auth/"));
    assert!(out.contains("inside"));

    run_nook_ok(&env, &["folder", "collapse", &folder]);
    let out = run_nook_ok(&env, &["bm", "list"]);
    assert!(out.contains("▸"));
    assert!(!out.contains("inside"));

    let out = run_nook_ok(&env, &["bm", "list", "--all"]);
    assert!(out.contains("inside"));
}

#[test]
fn test_folder_name_too_long() {
    let env = Env::new();
    let (_, stderr, success) = run_nook(&env, &["folder", "add", "a-very-long-folder-name"]);
    assert!(!success);
    assert!(stderr.contains("Folder name must be less than 20 characters"));
}

#[test]
fn test_folder_rm_removes_contents() {
    let env = Env::new();
    let folder = run_nook_ok(&env, &["folder", "add", "Tmp"]).trim().to_string();
    run_nook_ok(&env, &["bm", "add", "a.rs", "1", "--folder", &folder]);
    add_bookmark(&env, "b.rs", "1", "outside");

    let out = run_nook_ok(&env, &["folder", "rm", &folder]);
    assert_eq!(out.trim(), "removed 2 items");
    assert_eq!(bookmark_lines(&env), vec![0]);
}

// ---------------------------------------------------------------------------
// Scratch files
// ---------------------------------------------------------------------------

#[test]
fn test_scratch_new_show_and_mirror() {
    let env = Env::new();
    run_nook_ok(&env, &["scratch", "new", "notes.md", "--content", "hello"]);
    let out = run_nook_ok(&env, &["scratch", "show", "notes.md"]);
    assert_eq!(out, "hello\n");
    let mirror = fs::read_to_string(env.path().join(".nook/scratch/notes.md")).unwrap();
    assert_eq!(mirror, "hello");
}

#[test]
fn test_scratch_duplicate_name() {
    let env = Env::new();
    run_nook_ok(&env, &["scratch", "new", "a.txt"]);
    let (_, stderr, success) = run_nook(&env, &["scratch", "new", "a.txt"]);
    assert!(!success);
    assert!(stderr.contains("A scratch file named 'a.txt' already exists"));
}

#[test]
fn test_scratch_sync_pulls_mirror_edits() {
    let env = Env::new();
    run_nook_ok(&env, &["scratch", "new", "todo.txt", "--content", "old"]);
    fs::write(env.path().join(".nook/scratch/todo.txt"), "new text").unwrap();

    let out = run_nook_ok(&env, &["scratch", "sync"]);
    assert_eq!(out.trim(), "updated todo.txt");
    let out = run_nook_ok(&env, &["scratch", "show", "todo.txt"]);
    assert_eq!(out.trim(), "new text");
}

#[test]
fn test_scratch_rename_moves_mirror() {
    let env = Env::new();
    run_nook_ok(&env, &["scratch", "new", "a.txt", "--content", "x"]);
    run_nook_ok(&env, &["scratch", "rename", "a.txt", "b.txt"]);
    assert!(!env.path().join(".nook/scratch/a.txt").exists());
    assert!(env.path().join(".nook/scratch/b.txt").exists());
}

#[test]
fn test_scratch_write_from_stdin_and_rm() {
    let env = Env::new();
    run_nook_ok(&env, &["scratch", "new", "s.txt"]);
    run_nook_stdin(&env, &["scratch", "write", "s.txt"], "piped in");
    let out = run_nook_ok(&env, &["scratch", "show", "s.txt"]);
    assert_eq!(out.trim(), "piped in");

    run_nook_ok(&env, &["scratch", "rm", "s.txt"]);
    let out = run_nook_ok(&env, &["scratch", "list"]);
    assert!(out.trim().is_empty());
    assert!(!env.path().join(".nook/scratch/s.txt").exists());
}

#[test]
fn test_scratch_default_language_from_config() {
    let env = Env::new();
    run_nook_ok(&env, &["config", "set", "scratch.default_language", "markdown"]);
    run_nook_ok(&env, &["scratch", "new", "n"]);
    let out = run_nook_ok(&env, &["--json", "scratch", "list"]);
    assert_eq!(json(&out)[0]["language"], "markdown");
}

// ---------------------------------------------------------------------------
// Search & config
// ---------------------------------------------------------------------------

#[test]
fn test_search_across_collections() {
    let env = Env::new();
    add_todo(&env, "Fix the parser", None);
    add_bookmark(&env, "parser.rs", "1", "entry");
    run_nook_ok(&env, &["scratch", "new", "n.txt", "--content", "parser notes"]);

    let out = run_nook_ok(&env, &["search", "PARSER"]);
    assert!(out.contains("[todo]"));
    assert!(out.contains("[bm]"));
    assert!(out.contains("[scratch]"));
    assert!(out.contains("Fix the *parser*"));

    let hits = json(&run_nook_ok(&env, &["--json", "search", "parser"]));
    assert_eq!(hits[0]["kind"], "todo");
    assert_eq!(hits[0]["spans"][0]["start"], 8);
    assert_eq!(hits[0]["spans"][0]["end"], 14);
}

#[test]
fn test_search_invalid_pattern() {
    let env = Env::new();
    let (_, stderr, success) = run_nook(&env, &["search", "("]);
    assert!(!success);
    assert!(stderr.starts_with("error:"));
}

#[test]
fn test_config_get_and_set() {
    let env = Env::new();
    assert_eq!(run_nook_ok(&env, &["config", "get", "todos.show_done"]).trim(), "true");
    run_nook_ok(&env, &["config", "set", "todos.show_done", "false"]);
    assert_eq!(run_nook_ok(&env, &["config", "get", "todos.show_done"]).trim(), "false");

    let a = add_todo(&env, "finished", None);
    add_todo(&env, "pending", None);
    run_nook_ok(&env, &["todo", "done", &a]);
    let out = run_nook_ok(&env, &["todo", "list"]);
    assert!(!out.contains("finished"));
    let out = run_nook_ok(&env, &["todo", "list", "--all"]);
    assert!(out.contains("finished"));
}

#[test]
fn test_config_rejects_bad_values() {
    let env = Env::new();
    let (_, stderr, success) = run_nook(&env, &["config", "set", "todos.show_done", "maybe"]);
    assert!(!success);
    assert!(stderr.contains("invalid value for todos.show_done"));

    let (_, stderr, success) = run_nook(&env, &["config", "get", "nope"]);
    assert!(!success);
    assert!(stderr.contains("unknown config key"));
}

#[test]
fn test_json_add_returns_id() {
    let env = Env::new();
    let out = run_nook_ok(&env, &["--json", "todo", "add", "x"]);
    let id = json(&out)["id"].as_str().unwrap().to_string();
    assert_eq!(id.len(), 36);
}
