//! Whole-file and append-line persistence primitives
//!
//! - [`write_file_atomic`]: temp file in the target directory, fsync, rename.
//!   Used for result reports, worker jobs and generated logic programs.
//! - [`append_line_durable`]: one `write` of a full line followed by
//!   `sync_data`. Used for the worker side log, where a line is considered
//!   committed once this call returns.

use anyhow::{Context, Result, bail};
use camino::Utf8Path;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

/// Atomically replace `path` with `content`.
///
/// Readers observe either the previous content or the new one, never a mix.
/// When the rename crosses filesystems the content is copied into a second
/// temp file next to the target and renamed from there.
pub fn write_file_atomic(path: &Utf8Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create parent directory: {parent}"))?;
    }

    let temp_dir = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let mut temp_file = NamedTempFile::new_in(temp_dir)
        .with_context(|| format!("Failed to create temporary file in: {temp_dir}"))?;

    temp_file
        .write_all(content.as_bytes())
        .context("Failed to write content to temporary file")?;
    temp_file
        .as_file()
        .sync_all()
        .context("Failed to fsync temporary file")?;

    let temp_path = temp_file.path().to_path_buf();
    match temp_file.persist(path.as_std_path()) {
        Ok(_) => Ok(()),
        Err(e) if is_cross_filesystem_error(&e.error) => {
            tracing::warn!(path = %path, "Rename crossed filesystems, copying instead");
            cross_filesystem_copy_from_path(&temp_path, path)
        }
        Err(e) => Err(anyhow::anyhow!(e.error))
            .with_context(|| format!("Failed to atomically write file: {path}")),
    }
}

/// Append `line` plus a newline to `path` and flush it to disk.
///
/// The line must not contain a newline itself: one call is one record.
pub fn append_line_durable(path: &Utf8Path, line: &str) -> Result<()> {
    if line.contains('\n') {
        bail!("Refusing to append a record containing a newline to {path}");
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path.as_std_path())
        .with_context(|| format!("Failed to open log for append: {path}"))?;

    let mut record = String::with_capacity(line.len() + 1);
    record.push_str(line);
    record.push('\n');
    file.write_all(record.as_bytes())
        .with_context(|| format!("Failed to append to {path}"))?;
    file.sync_data()
        .with_context(|| format!("Failed to sync {path}"))?;
    Ok(())
}

#[cfg(unix)]
fn is_cross_filesystem_error(err: &std::io::Error) -> bool {
    // EXDEV on Linux and macOS
    err.raw_os_error() == Some(18)
}

#[cfg(not(unix))]
fn is_cross_filesystem_error(_err: &std::io::Error) -> bool {
    false
}

fn cross_filesystem_copy_from_path(temp_path: &Path, target: &Utf8Path) -> Result<()> {
    let content = fs::read(temp_path).context("Failed to read temporary file for copy")?;

    let target_dir = target.parent().unwrap_or_else(|| Utf8Path::new("."));
    let mut target_temp = NamedTempFile::new_in(target_dir)
        .with_context(|| format!("Failed to create temp file in target directory: {target_dir}"))?;
    target_temp
        .write_all(&content)
        .context("Failed to write content during cross-filesystem copy")?;
    target_temp
        .as_file()
        .sync_all()
        .context("Failed to fsync during cross-filesystem copy")?;
    target_temp
        .persist(target.as_std_path())
        .map_err(|e| anyhow::anyhow!(e.error))
        .context("Failed to persist during cross-filesystem copy")?;

    let _ = fs::remove_file(temp_path);
    Ok(())
}
