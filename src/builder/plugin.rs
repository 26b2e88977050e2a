use crate::addon::version;
use crate::client::locate;
use crate::types::config::PackConfig;
use crate::types::error::PackError;
use crate::utils::{
    fs as ufs,
    logger::{LogLevel, Logger},
    spinner,
};
use std::path::{Path, PathBuf};

/// Paths the pipeline was pointed at, all absolute or relative to the process cwd.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub project_root: PathBuf,
    pub client_dir: PathBuf,
    pub result_dir: PathBuf,
}

impl Workspace {
    pub fn plugin_src(&self, cfg: &PackConfig) -> PathBuf {
        self.project_root.join(&cfg.plugin_src)
    }

    pub fn plugin_cfg(&self, cfg: &PackConfig) -> PathBuf {
        self.plugin_src(cfg).join(&cfg.plugin_config)
    }
}

#[derive(Debug, Clone)]
pub struct AssembledPlugin {
    pub version: String,
    pub archive_name: String,
    pub client_tag: String,
    pub staged_dir: PathBuf,
    pub source_files: usize,
    pub client_files: Vec<String>,
}

/// Stages the plugin sources plus the latest client binaries under
/// `<result>/addons/<plugin>`. `binaries_override` bypasses the locator.
pub fn assemble(
    cfg: &PackConfig,
    ws: &Workspace,
    binaries_override: Option<&Path>,
) -> Result<AssembledPlugin, PackError> {
    let cfg_path = ws.plugin_cfg(cfg);
    let plugin_version = spinner::run_step(
        &format!("Reading plugin version from {}", cfg_path.display()),
        |v: &String| format!("Plugin version {}", v),
        || version::get_version(&cfg_path),
    )?;
    let archive_name = cfg.archive_name(&plugin_version);

    let binaries_dir = match binaries_override {
        Some(dir) => dir.to_path_buf(),
        None => spinner::run_step(
            &format!("Locating client binaries in {}", ws.client_dir.display()),
            |dir: &PathBuf| format!("Using client binaries {}", dir.display()),
            || {
                locate::find_latest(cfg, &ws.client_dir)
                    .map_err(|e| e.with_hint("run 'bkpack build-client' or 'bkpack build' first"))
            },
        )?,
    };
    let client_tag = binaries_dir
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            PackError::precondition(format!(
                "Client binaries path {} has no version name",
                binaries_dir.display()
            ))
        })?;

    let staged_dir = cfg.staged_plugin_dir(&ws.result_dir);
    spinner::run_unit_step(
        &format!("Recreating staging directory {}", staged_dir.display()),
        "Staging directory ready",
        || {
            ufs::write_marker(&ws.result_dir, &cfg.marker_file)?;
            ufs::recreate_dir(&staged_dir)
        },
    )?;

    let plugin_src = ws.plugin_src(cfg);
    let source_files = spinner::run_step(
        &format!("Copying plugin sources from {}", plugin_src.display()),
        |n: &usize| format!("Copied {} plugin file(s)", n),
        || {
            ufs::copy_tree(&plugin_src, &staged_dir, |rel| {
                is_ignored(rel, &cfg.ignore_files)
            })
        },
    )?;

    let client_files = spinner::run_step(
        &format!("Copying {} binaries", client_tag),
        |names: &Vec<String>| format!("Copied {} client binaries", names.len()),
        || copy_client_binaries(cfg, &binaries_dir, &staged_dir),
    )?;

    Logger::new().log_message(
        LogLevel::Info,
        &format!(
            "BlenderKit-Client {} binaries staged in {}",
            client_tag,
            staged_dir.join("client").join(&client_tag).display()
        ),
    );

    Ok(AssembledPlugin {
        version: plugin_version,
        archive_name,
        client_tag,
        staged_dir,
        source_files,
        client_files,
    })
}

/// Copies `<prefix>*` files from `binaries_dir` into `<staged>/client/<tag>/`.
pub fn copy_client_binaries(
    cfg: &PackConfig,
    binaries_dir: &Path,
    staged_dir: &Path,
) -> Result<Vec<String>, PackError> {
    let files = locate::client_files(cfg, binaries_dir)
        .map_err(|e| e.with_hint("run 'bkpack build-client' to produce client binaries"))?;
    let tag = binaries_dir
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_default();
    let target_dir = staged_dir.join("client").join(tag);
    ufs::ensure_dir(&target_dir)?;

    let logger = Logger::new();
    let mut names = Vec::with_capacity(files.len());
    for source in files {
        let Some(name) = source.file_name() else {
            continue;
        };
        let target = target_dir.join(name);
        ufs::copy_preserving(&source, &target)?;
        logger.log_message(
            LogLevel::Debug,
            &format!("Copied {} to {}", source.display(), target.display()),
        );
        names.push(name.to_string_lossy().into_owned());
    }
    Ok(names)
}

fn is_ignored(rel: &Path, ignore_files: &[String]) -> bool {
    rel.components().any(|c| {
        let part = c.as_os_str().to_string_lossy();
        ignore_files.iter().any(|i| *i == part)
    })
}
