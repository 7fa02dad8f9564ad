use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::io::store::atomic_write;
use crate::model::scratch::{ScratchFile, ScratchList};
use crate::ops::scratch_ops;

pub const MIRROR_DIR: &str = "scratch";

/// Error type for scratch mirror I/O
#[derive(Debug, thiserror::Error)]
#[error("scratch mirror {path}: {source}")]
pub struct MirrorError {
    pub path: PathBuf,
    pub source: io::Error,
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> MirrorError + '_ {
    move |source| MirrorError {
        path: path.to_path_buf(),
        source,
    }
}

/// On-disk copy of a scratch file, editable with any editor
pub fn mirror_path(data_dir: &Path, name: &str) -> PathBuf {
    data_dir.join(MIRROR_DIR).join(name)
}

/// Write a scratch file's content to its mirror.
pub fn write_mirror(data_dir: &Path, file: &ScratchFile) -> Result<PathBuf, MirrorError> {
    let dir = data_dir.join(MIRROR_DIR);
    fs::create_dir_all(&dir).map_err(io_err(&dir))?;
    let path = mirror_path(data_dir, &file.name);
    atomic_write(&path, file.content.as_bytes()).map_err(io_err(&path))?;
    Ok(path)
}

/// Move a mirror after a rename. A missing old mirror is not an error.
pub fn rename_mirror(data_dir: &Path, old_name: &str, file: &ScratchFile) -> Result<(), MirrorError> {
    let old = mirror_path(data_dir, old_name);
    if old.exists() {
        let new = mirror_path(data_dir, &file.name);
        fs::rename(&old, &new).map_err(io_err(&old))?;
        Ok(())
    } else {
        write_mirror(data_dir, file).map(|_| ())
    }
}

/// Delete a mirror. A missing mirror is not an error.
pub fn remove_mirror(data_dir: &Path, name: &str) -> Result<(), MirrorError> {
    let path = mirror_path(data_dir, name);
    match fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(io_err(&path)(e)),
    }
}

/// Pull mirror edits back into the list. Files whose mirror is missing get
/// it recreated. Returns the names of files whose content changed.
pub fn sync(data_dir: &Path, list: &mut ScratchList) -> Result<Vec<String>, MirrorError> {
    let mut changed = Vec::new();
    let ids: Vec<String> = list.files.iter().map(|f| f.id.clone()).collect();
    for id in ids {
        let Some(file) = list.get(&id) else { continue };
        let path = mirror_path(data_dir, &file.name);
        match fs::read_to_string(&path) {
            Ok(content) => {
                let name = file.name.clone();
                if scratch_ops::update_content(list, &id, &content) {
                    tracing::debug!(name = %name, "scratch mirror changed");
                    changed.push(name);
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                write_mirror(data_dir, file)?;
            }
            Err(e) => return Err(io_err(&path)(e)),
        }
    }
    Ok(changed)
}
