//! Whole-file replacement.
//!
//! Content is written to `.{filename}.tmp` next to the target, synced, and
//! renamed over the target. `std::fs::rename` replaces an existing
//! destination on every supported platform, so reruns overwrite in place.

use crate::error::{Result, TbgenError};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Create `dir` and all of its parents.
pub fn ensure_dir<P: AsRef<Path>>(dir: P) -> Result<()> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(|e| {
        TbgenError::Output(format!(
            "failed to create directory '{}': {}",
            dir.display(),
            e
        ))
    })
}

/// Replace the file at `path` with `content`, creating parent directories.
pub fn replace_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        ensure_dir(parent)?;
    }

    let temp_path = temp_path_for(path)?;
    write_and_sync(&temp_path, content.as_bytes())?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        TbgenError::Output(format!("failed to replace '{}': {}", path.display(), e))
    })
}

fn temp_path_for(target: &Path) -> Result<PathBuf> {
    let parent = target.parent().unwrap_or(Path::new("."));
    let filename = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            TbgenError::Output(format!("invalid output path '{}'", target.display()))
        })?;

    Ok(parent.join(format!(".{}.tmp", filename)))
}

fn write_and_sync(path: &Path, content: &[u8]) -> Result<()> {
    let mut file = File::create(path).map_err(|e| {
        TbgenError::Output(format!(
            "failed to create temporary file '{}': {}",
            path.display(),
            e
        ))
    })?;

    if let Err(e) = file.write_all(content).and_then(|()| file.sync_all()) {
        let _ = fs::remove_file(path);
        return Err(TbgenError::Output(format!(
            "failed to write '{}': {}",
            path.display(),
            e
        )));
    }

    Ok(())
}
