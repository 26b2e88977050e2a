use crate::types::error::PackError;
use glob::Pattern;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "bkpack.toml";
pub const CLIENT_REPO_ENV: &str = "BKPACK_CLIENT_REPO";

/// Fixed names and defaults shared by every pipeline component.
/// Built once at startup and passed around by reference.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackConfig {
    pub plugin_name: String,
    /// Plugin source tree, relative to the project root.
    pub plugin_src: PathBuf,
    pub plugin_config: String,
    pub archive_base: String,
    pub client_prefix: String,
    /// Where the client build leaves its `v*` directories, relative to the client dir.
    pub client_binaries_subpath: PathBuf,
    pub client_repo: String,
    pub client_dir: PathBuf,
    pub client_build_cmd: Vec<String>,
    pub result_dir: PathBuf,
    pub marker_file: String,
    pub exclude: Vec<String>,
    pub ignore_files: Vec<String>,
}

impl Default for PackConfig {
    fn default() -> Self {
        PackConfig {
            plugin_name: "blenderkit".into(),
            plugin_src: PathBuf::from("addons").join("blenderkit"),
            plugin_config: "plugin.cfg".into(),
            archive_base: "blenderkit-godot".into(),
            client_prefix: "blenderkit-client".into(),
            client_binaries_subpath: PathBuf::from("out").join("blenderkit").join("client"),
            client_repo: "https://github.com/BlenderKit/BlenderKit-Client.git".into(),
            client_dir: PathBuf::from(".client"),
            client_build_cmd: vec!["python3".into(), "dev.py".into(), "build".into()],
            result_dir: PathBuf::from("out"),
            marker_file: ".gdignore".into(),
            exclude: vec!["*.uid".into()],
            ignore_files: vec![
                ".DS_Store".into(),
                ".mypy_cache".into(),
                "__pycache__".into(),
            ],
        }
    }
}

impl PackConfig {
    /// Defaults, then `bkpack.toml` from the project root if present, then env overrides.
    pub fn load(project_root: &Path) -> Result<Self, PackError> {
        let path = project_root.join(CONFIG_FILE);
        let mut cfg = if path.is_file() {
            let txt = fs::read_to_string(&path)
                .map_err(|e| PackError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
            Self::from_toml(&txt)?
        } else {
            PackConfig::default()
        };

        if let Ok(repo) = std::env::var(CLIENT_REPO_ENV) {
            if !repo.trim().is_empty() {
                cfg.client_repo = repo;
            }
        }

        Ok(cfg)
    }

    pub fn from_toml(txt: &str) -> Result<Self, PackError> {
        let cfg: PackConfig =
            toml::from_str(txt).map_err(|e| PackError::Config(format!("{}: {}", CONFIG_FILE, e)))?;
        if cfg.client_build_cmd.is_empty() {
            return Err(PackError::Config(
                "client_build_cmd must name at least a program".into(),
            ));
        }
        cfg.exclude_patterns()?;
        Ok(cfg)
    }

    /// Compiled `exclude` globs, matched against file names when packaging.
    pub fn exclude_patterns(&self) -> Result<Vec<Pattern>, PackError> {
        self.exclude
            .iter()
            .map(|p| {
                Pattern::new(p)
                    .map_err(|e| PackError::Config(format!("Invalid exclude pattern '{}': {}", p, e)))
            })
            .collect()
    }

    /// `<base>_v<version>.zip`
    pub fn archive_name(&self, version: &str) -> String {
        format!("{}_v{}.zip", self.archive_base, version)
    }

    /// Staged plugin directory inside a result directory.
    pub fn staged_plugin_dir(&self, result_dir: &Path) -> PathBuf {
        result_dir.join("addons").join(&self.plugin_name)
    }

    /// Root of the filtered copy that gets zipped.
    pub fn package_root(&self, result_dir: &Path) -> PathBuf {
        result_dir.join("package")
    }
}
