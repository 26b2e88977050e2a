use crate::types::config::PackConfig;
use crate::types::error::PackError;
use std::fs;
use std::path::{Path, PathBuf};

/// Picks the `v*` directory under `<client_dir>/<client_binaries_subpath>` that
/// sorts greatest as a plain string. String order, not semver: `v1.2.0` beats `v1.10.0`.
pub fn find_latest(cfg: &PackConfig, client_dir: &Path) -> Result<PathBuf, PackError> {
    latest_version_dir(&client_dir.join(&cfg.client_binaries_subpath))
}

/// Greatest `v*` child directory of `root` by descending string sort.
pub fn latest_version_dir(root: &Path) -> Result<PathBuf, PackError> {
    let rd = fs::read_dir(root).map_err(|_| {
        PackError::precondition(format!(
            "Client binaries directory {} does not exist",
            root.display()
        ))
    })?;

    let mut tags: Vec<String> = rd
        .flatten()
        .filter(|e| e.path().is_dir())
        .filter_map(|e| e.file_name().to_str().map(str::to_string))
        .filter(|name| name.starts_with('v'))
        .collect();
    tags.sort_by(|a, b| b.cmp(a));

    match tags.first() {
        Some(latest) => Ok(root.join(latest)),
        None => Err(PackError::precondition(format!(
            "No v* client binaries directory found in {}",
            root.display()
        ))),
    }
}

/// Files in `binaries_dir` whose name starts with the client prefix, sorted.
/// Fails when the directory is missing, is not a directory, or has no match.
pub fn client_files(cfg: &PackConfig, binaries_dir: &Path) -> Result<Vec<PathBuf>, PackError> {
    if !binaries_dir.exists() {
        return Err(PackError::precondition(format!(
            "Client binaries path {} does not exist",
            binaries_dir.display()
        )));
    }
    if !binaries_dir.is_dir() {
        return Err(PackError::precondition(format!(
            "Client binaries path {} is not a directory",
            binaries_dir.display()
        )));
    }

    let rd = fs::read_dir(binaries_dir).map_err(|e| {
        PackError::Io(format!(
            "Failed to list {}: {}",
            binaries_dir.display(),
            e
        ))
    })?;
    let mut files: Vec<PathBuf> = rd
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(&cfg.client_prefix))
        })
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(PackError::precondition(format!(
            "No {}* files in {}",
            cfg.client_prefix,
            binaries_dir.display()
        )));
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binaries_root(client_dir: &Path) -> PathBuf {
        client_dir.join("out").join("blenderkit").join("client")
    }

    #[test]
    fn picks_greatest_tag_by_string_order() {
        let tmp = tempfile::tempdir().unwrap();
        let root = binaries_root(tmp.path());
        for tag in ["v1.0.0", "v1.1.0", "v0.9.9"] {
            fs::create_dir_all(root.join(tag)).unwrap();
        }
        let latest = find_latest(&PackConfig::default(), tmp.path()).unwrap();
        assert_eq!(latest, root.join("v1.1.0"));
    }

    // Regression pin: lexicographic order means v1.2.0 wins over v1.10.0.
    #[test]
    fn lexicographic_pick_prefers_v1_2_0_over_v1_10_0() {
        let tmp = tempfile::tempdir().unwrap();
        let root = binaries_root(tmp.path());
        fs::create_dir_all(root.join("v1.2.0")).unwrap();
        fs::create_dir_all(root.join("v1.10.0")).unwrap();
        let latest = find_latest(&PackConfig::default(), tmp.path()).unwrap();
        assert_eq!(latest.file_name().unwrap(), "v1.2.0");
    }

    #[test]
    fn ignores_files_and_unprefixed_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let root = binaries_root(tmp.path());
        fs::create_dir_all(root.join("nightly")).unwrap();
        fs::create_dir_all(root.join("v0.1.0")).unwrap();
        fs::write(root.join("v9.9.9"), "not a dir").unwrap();
        let latest = find_latest(&PackConfig::default(), tmp.path()).unwrap();
        assert_eq!(latest.file_name().unwrap(), "v0.1.0");
    }

    #[test]
    fn no_candidates_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = PackConfig::default();
        assert!(find_latest(&cfg, tmp.path()).is_err());

        fs::create_dir_all(binaries_root(tmp.path()).join("latest")).unwrap();
        assert!(matches!(
            find_latest(&cfg, tmp.path()),
            Err(PackError::Precondition { .. })
        ));
    }

    #[test]
    fn only_prefixed_files_are_client_files() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("v1.0.0");
        fs::create_dir_all(&dir).unwrap();
        for name in [
            "blenderkit-client-linux",
            "blenderkit-client-windows.exe",
            "readme.txt",
        ] {
            fs::write(dir.join(name), name).unwrap();
        }
        let files = client_files(&PackConfig::default(), &dir).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec!["blenderkit-client-linux", "blenderkit-client-windows.exe"]
        );
    }

    #[test]
    fn client_files_preconditions() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = PackConfig::default();

        assert!(client_files(&cfg, &tmp.path().join("missing")).is_err());

        let file = tmp.path().join("v1.0.0");
        fs::write(&file, "x").unwrap();
        assert!(client_files(&cfg, &file).is_err());

        let empty = tmp.path().join("v2.0.0");
        fs::create_dir_all(&empty).unwrap();
        fs::write(empty.join("readme.txt"), "x").unwrap();
        assert!(client_files(&cfg, &empty).is_err());
    }
}
