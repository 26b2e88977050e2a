use crate::types::error::PackError;
use crate::utils::logger::{LogLevel, Logger};
use std::fs;
use std::path::{Path, PathBuf};

pub fn walk_files(root: &Path) -> Result<Vec<PathBuf>, PackError> {
    let mut stack: Vec<PathBuf> = vec![root.to_path_buf()];
    let mut files: Vec<PathBuf> = Vec::new();
    while let Some(dir) = stack.pop() {
        let rd = fs::read_dir(&dir)
            .map_err(|e| PackError::Io(format!("Failed to read directory {}: {}", dir.display(), e)))?;
        for entry in rd.flatten() {
            let p = entry.path();
            if p.is_dir() {
                stack.push(p);
            } else if p.is_file() {
                files.push(p);
            }
        }
    }
    files.sort();
    Ok(files)
}

pub fn path_relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    let rel = path.strip_prefix(base).ok()?;
    Some(rel.to_path_buf())
}

pub fn to_unix_string<P: AsRef<Path>>(p: P) -> String {
    let s = p.as_ref().to_string_lossy().into_owned();
    s.replace('\\', "/")
}

/// Removes `dir` and everything below it. A missing directory is not an error.
pub fn remove_dir_if_exists(dir: &Path) -> Result<bool, PackError> {
    if !dir.exists() {
        return Ok(false);
    }
    fs::remove_dir_all(dir)
        .map_err(|e| PackError::Io(format!("Failed to remove {}: {}", dir.display(), e)))?;
    Ok(true)
}

pub fn ensure_dir(dir: &Path) -> Result<(), PackError> {
    fs::create_dir_all(dir)
        .map_err(|e| PackError::Io(format!("Failed to create directory {}: {}", dir.display(), e)))
}

/// Delete-then-create, so nothing from a previous run survives.
pub fn recreate_dir(dir: &Path) -> Result<(), PackError> {
    remove_dir_if_exists(dir)?;
    ensure_dir(dir)
}

/// Creates `dir` if needed and drops an empty `marker` file into it.
pub fn write_marker(dir: &Path, marker: &str) -> Result<(), PackError> {
    ensure_dir(dir)?;
    let path = dir.join(marker);
    if !path.exists() {
        fs::write(&path, b"")
            .map_err(|e| PackError::Io(format!("Failed to write {}: {}", path.display(), e)))?;
    }
    Ok(())
}

/// Copies every file under `src` into `dest`, keeping relative paths.
/// `skip` receives each path relative to `src`; returning true leaves the file out.
/// Returns the number of files copied.
pub fn copy_tree<F>(src: &Path, dest: &Path, skip: F) -> Result<usize, PackError>
where
    F: Fn(&Path) -> bool,
{
    if !src.is_dir() {
        return Err(PackError::precondition(format!(
            "Source directory {} does not exist",
            src.display()
        )));
    }
    ensure_dir(dest)?;

    let logger = Logger::new();
    let mut copied = 0;
    for file in walk_files(src)? {
        let Some(rel) = path_relative_to(&file, src) else {
            continue;
        };
        if skip(&rel) {
            logger.log_message(LogLevel::Debug, &format!("Skipped {}", to_unix_string(&rel)));
            continue;
        }
        let target = dest.join(&rel);
        if let Some(parent) = target.parent() {
            ensure_dir(parent)?;
        }
        fs::copy(&file, &target).map_err(|e| {
            PackError::Io(format!(
                "Failed to copy {} to {}: {}",
                file.display(),
                target.display(),
                e
            ))
        })?;
        logger.log_message(LogLevel::Debug, &format!("Copied {}", to_unix_string(&rel)));
        copied += 1;
    }
    Ok(copied)
}

/// Copies `src` to `dest` keeping permission bits and access/modification times.
pub fn copy_preserving(src: &Path, dest: &Path) -> Result<(), PackError> {
    let io_err = |e: std::io::Error| {
        PackError::Io(format!(
            "Failed to copy {} to {}: {}",
            src.display(),
            dest.display(),
            e
        ))
    };
    fs::copy(src, dest).map_err(io_err)?;

    let meta = fs::metadata(src).map_err(io_err)?;
    let mut times = fs::FileTimes::new();
    if let Ok(modified) = meta.modified() {
        times = times.set_modified(modified);
    }
    if let Ok(accessed) = meta.accessed() {
        times = times.set_accessed(accessed);
    }
    open_for_times(dest)
        .and_then(|f| f.set_times(times))
        .map_err(io_err)
}

// futimens only needs ownership, so a read-only handle works even for 0o555 binaries.
#[cfg(unix)]
fn open_for_times(path: &Path) -> std::io::Result<fs::File> {
    fs::File::open(path)
}

#[cfg(not(unix))]
fn open_for_times(path: &Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new().write(true).open(path)
}

/// Replaces `dest` with a verbatim copy of `src`.
pub fn mirror_dir(src: &Path, dest: &Path) -> Result<(), PackError> {
    remove_dir_if_exists(dest)?;
    ensure_dir(dest)?;
    let mut options = fs_extra::dir::CopyOptions::new();
    options.content_only = true;
    fs_extra::dir::copy(src, dest, &options).map_err(|e| {
        PackError::Io(format!(
            "Failed to copy {} to {}: {}",
            src.display(),
            dest.display(),
            e
        ))
    })?;
    Ok(())
}
