use crate::addon::version;
use crate::builder::plugin::Workspace;
use crate::types::config::PackConfig;
use crate::types::error::PackError;
use crate::utils::{fs as ufs, spinner};
use glob::Pattern;
use std::fs;
use std::path::{Path, PathBuf};

/// Zips the staged plugin into `<result>/<base>_v<version>.zip`.
///
/// The staged tree is first copied to `<result>/package/addons/<plugin>` with the
/// exclusion patterns applied, and the zip is rooted at `<result>/package` so it
/// unpacks to `addons/<plugin>/...`.
pub fn archive(cfg: &PackConfig, ws: &Workspace) -> Result<PathBuf, PackError> {
    let plugin_version = version::get_version(&ws.plugin_cfg(cfg))?;
    let expected = ws.result_dir.join(cfg.archive_name(&plugin_version));

    let staged_dir = cfg.staged_plugin_dir(&ws.result_dir);
    if !staged_dir.is_dir() {
        return Err(PackError::precondition(format!(
            "Staged plugin not found at {}",
            staged_dir.display()
        ))
        .with_hint("run 'bkpack build-plugin' first"));
    }

    let patterns = cfg.exclude_patterns()?;
    let package_root = cfg.package_root(&ws.result_dir);
    let package_plugin = package_root.join("addons").join(&cfg.plugin_name);

    spinner::run_step(
        &format!("Preparing archive contents in {}", package_root.display()),
        |n: &usize| format!("{} file(s) ready for packaging", n),
        || {
            ufs::write_marker(&ws.result_dir, &cfg.marker_file)?;
            ufs::remove_dir_if_exists(&package_root)?;
            ufs::copy_tree(&staged_dir, &package_plugin, |rel| is_excluded(rel, &patterns))
        },
    )?;

    let base = strip_zip_suffix(&expected);
    let produced = spinner::run_step(
        &format!(
            "Packaging artifact {}",
            expected
                .file_name()
                .and_then(|f| f.to_str())
                .unwrap_or("archive")
        ),
        |p: &PathBuf| format!("Archive created at {}", p.display()),
        || make_zip_archive(&base, &package_root),
    )?;

    verify_archive_path(&produced, &expected)?;
    Ok(produced)
}

/// Patterns are matched against the file name.
pub fn is_excluded(rel: &Path, patterns: &[Pattern]) -> bool {
    let Some(name) = rel.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    patterns.iter().any(|p| p.matches(name))
}

fn strip_zip_suffix(path: &Path) -> PathBuf {
    match path.extension() {
        Some(ext) if ext == "zip" => path.with_extension(""),
        _ => path.to_path_buf(),
    }
}

/// Writes `<base>.zip` holding everything under `root`, entry names relative to `root`.
/// Returns the path actually written.
pub fn make_zip_archive(base: &Path, root: &Path) -> Result<PathBuf, PackError> {
    let mut out_name = base.as_os_str().to_os_string();
    out_name.push(".zip");
    let out_zip = PathBuf::from(out_name);

    if let Some(parent) = out_zip.parent().filter(|p| !p.as_os_str().is_empty()) {
        ufs::ensure_dir(parent)?;
    }
    let file = fs::File::create(&out_zip)
        .map_err(|e| PackError::Io(format!("Failed to create {}: {}", out_zip.display(), e)))?;
    let mut zip = zip::ZipWriter::new(file);
    let options =
        zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for (path, is_dir) in walk_entries(root)? {
        let Some(rel) = ufs::path_relative_to(&path, root) else {
            continue;
        };
        let name = ufs::to_unix_string(&rel);
        if is_dir {
            zip.add_directory(format!("{}/", name), options)
                .map_err(|e| PackError::Io(format!("Failed to add {}/ to zip: {}", name, e)))?;
            continue;
        }

        zip.start_file(name.as_str(), options.unix_permissions(file_mode(&path)))
            .map_err(|e| PackError::Io(format!("Failed to add {} to zip: {}", name, e)))?;
        let mut src = fs::File::open(&path)
            .map_err(|e| PackError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        std::io::copy(&mut src, &mut zip)
            .map_err(|e| PackError::Io(format!("Failed to write {} to zip: {}", name, e)))?;
    }

    zip.finish()
        .map_err(|e| PackError::Io(format!("Failed to finalize zip: {}", e)))?;
    Ok(out_zip)
}

/// Directories and files below `root` in stable order; parents come before children.
fn walk_entries(root: &Path) -> Result<Vec<(PathBuf, bool)>, PackError> {
    let mut entries = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let rd = fs::read_dir(&dir)
            .map_err(|e| PackError::Io(format!("Failed to read directory {}: {}", dir.display(), e)))?;
        for entry in rd.flatten() {
            let p = entry.path();
            if p.is_dir() {
                entries.push((p.clone(), true));
                stack.push(p);
            } else if p.is_file() {
                entries.push((p, false));
            }
        }
    }
    entries.sort();
    Ok(entries)
}

#[cfg(unix)]
fn file_mode(path: &Path) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o777)
        .unwrap_or(0o644)
}

#[cfg(not(unix))]
fn file_mode(_path: &Path) -> u32 {
    0o644
}

/// The archive must land exactly where its name predicts.
pub fn verify_archive_path(produced: &Path, expected: &Path) -> Result<(), PackError> {
    let real = fs::canonicalize(produced).map_err(|e| {
        PackError::Consistency(format!("archive {} is missing: {}", produced.display(), e))
    })?;
    let predicted = match (expected.parent(), expected.file_name()) {
        (Some(parent), Some(name)) => fs::canonicalize(parent)
            .map(|p| p.join(name))
            .unwrap_or_else(|_| expected.to_path_buf()),
        _ => expected.to_path_buf(),
    };
    if real != predicted {
        return Err(PackError::Consistency(format!(
            "archive written to {} but expected {}",
            real.display(),
            predicted.display()
        )));
    }
    Ok(())
}
