use crate::addon::{summary, version};
use crate::builder::{
    archive,
    plugin::{self as plugin_builder, AssembledPlugin, Workspace},
};
use crate::client::{build as client_build, locate, source};
use crate::types::config::PackConfig;
use crate::types::error::PackError;
use crate::utils::{
    fs as ufs,
    logger::{LogLevel, Logger},
    spinner,
};
use std::path::{Path, PathBuf};

/// Directory overrides shared by the build commands. Relative paths resolve
/// against the project root.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub client_dir: Option<PathBuf>,
    pub result_dir: Option<PathBuf>,
    /// Explicit `v*` binaries directory; skips the client build and the locator.
    pub client_build: Option<PathBuf>,
    pub install_at: Option<PathBuf>,
    pub clean_dir: Option<PathBuf>,
}

pub struct Pipeline {
    cfg: PackConfig,
    project_root: PathBuf,
}

impl Pipeline {
    pub fn new(cfg: PackConfig, project_root: PathBuf) -> Self {
        Pipeline { cfg, project_root }
    }

    fn resolve(&self, p: &Path) -> PathBuf {
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.project_root.join(p)
        }
    }

    /// Client dir plus whether it is the managed default.
    fn client_dir(&self, opts: &BuildOptions) -> (PathBuf, bool) {
        match &opts.client_dir {
            Some(dir) => (self.resolve(dir), false),
            None => (self.resolve(&self.cfg.client_dir), true),
        }
    }

    fn workspace(&self, opts: &BuildOptions) -> Workspace {
        let (client_dir, _) = self.client_dir(opts);
        let result_dir = self.resolve(
            opts.result_dir
                .as_deref()
                .unwrap_or(self.cfg.result_dir.as_path()),
        );
        Workspace {
            project_root: self.project_root.clone(),
            client_dir,
            result_dir,
        }
    }

    /// Fetch and build the client, then assemble and archive the plugin.
    pub fn build(&self, opts: &BuildOptions) -> Result<PathBuf, PackError> {
        if opts.client_build.is_none() {
            self.build_client(opts)?;
        }
        let assembled = self.stage_plugin(opts)?;
        let produced = self.build_archive(opts)?;
        self.finish_plugin(opts, &assembled)?;
        Logger::new().log_message(
            LogLevel::Success,
            &format!(
                "BlenderKit Godot plugin v{} (client {}) build DONE: {}",
                assembled.version,
                assembled.client_tag,
                produced.display()
            ),
        );
        Ok(produced)
    }

    pub fn build_client(&self, opts: &BuildOptions) -> Result<(), PackError> {
        let (client_dir, managed) = self.client_dir(opts);
        client_build::build_client(&self.cfg, &client_dir, managed)?;
        let latest = locate::find_latest(&self.cfg, &client_dir)
            .map_err(|e| e.with_hint("the client build produced no versioned binaries"))?;
        Logger::new().log_message(
            LogLevel::Success,
            &format!("Client binaries available in {}", latest.display()),
        );
        Ok(())
    }

    pub fn build_plugin(&self, opts: &BuildOptions) -> Result<AssembledPlugin, PackError> {
        let assembled = self.stage_plugin(opts)?;
        self.finish_plugin(opts, &assembled)?;
        Ok(assembled)
    }

    fn stage_plugin(&self, opts: &BuildOptions) -> Result<AssembledPlugin, PackError> {
        let ws = self.workspace(opts);
        let override_dir = opts.client_build.as_deref().map(|p| self.resolve(p));
        let assembled = plugin_builder::assemble(&self.cfg, &ws, override_dir.as_deref())?;
        summary::print_plugin_summary(&assembled);
        Ok(assembled)
    }

    /// `--install-at` and `--clean-dir`. In `build` these only run once the archive exists.
    fn finish_plugin(&self, opts: &BuildOptions, assembled: &AssembledPlugin) -> Result<(), PackError> {
        if let Some(dir) = &opts.install_at {
            let target = self.resolve(dir).join(&self.cfg.plugin_name);
            spinner::run_unit_step(
                &format!("Installing plugin into {}", target.display()),
                &format!("Installed at {}", target.display()),
                || ufs::mirror_dir(&assembled.staged_dir, &target),
            )?;
        }
        if let Some(dir) = &opts.clean_dir {
            let dir = self.resolve(dir);
            spinner::run_step(
                &format!("Cleaning {}", dir.display()),
                |removed: &bool| {
                    if *removed {
                        format!("Removed {}", dir.display())
                    } else {
                        format!("{} already clean", dir.display())
                    }
                },
                || ufs::remove_dir_if_exists(&dir),
            )?;
        }

        Logger::new().log_message(
            LogLevel::Success,
            &format!("Plugin staged at {}", assembled.staged_dir.display()),
        );
        Ok(())
    }

    pub fn build_archive(&self, opts: &BuildOptions) -> Result<PathBuf, PackError> {
        let ws = self.workspace(opts);
        self.check_staged_binaries(&ws)?;
        let produced = archive::archive(&self.cfg, &ws)?;
        if let Err(e) = summary::print_artifact_summary(&produced) {
            Logger::new().log_message(
                LogLevel::Warning,
                &format!("Failed to print summary: {}", e),
            );
        }
        Ok(produced)
    }

    fn check_staged_binaries(&self, ws: &Workspace) -> Result<(), PackError> {
        let staged_client = self.cfg.staged_plugin_dir(&ws.result_dir).join("client");
        locate::latest_version_dir(&staged_client)
            .and_then(|dir| locate::client_files(&self.cfg, &dir))
            .map(|_| ())
            .map_err(|_| {
                PackError::precondition(format!(
                    "Plugin binaries missing in {}",
                    staged_client.display()
                ))
                .with_hint("run 'bkpack build-plugin' or 'bkpack build' first")
            })
    }

    pub fn get_client_src(&self) -> Result<(), PackError> {
        let dir = self.resolve(&self.cfg.client_dir);
        let action = source::ensure_source(&self.cfg, &dir)?;
        Logger::new().log_message(
            LogLevel::Success,
            &format!("Client sources ready in {} ({:?})", dir.display(), action),
        );
        Ok(())
    }

    pub fn set_version(&self, input: &str) -> Result<(), PackError> {
        let cfg_path = self.project_root.join(&self.cfg.plugin_src).join(&self.cfg.plugin_config);
        let (previous, written) = version::set_version(&cfg_path, input)?;
        Logger::new().log_message(
            LogLevel::Success,
            &format!("Plugin version {} -> {}", previous, written),
        );
        Ok(())
    }

    pub fn show_version(&self) -> Result<String, PackError> {
        let cfg_path = self.project_root.join(&self.cfg.plugin_src).join(&self.cfg.plugin_config);
        let v = version::get_version(&cfg_path)?;
        println!("{}", v);
        Ok(v)
    }

    /// Removes the result directory and the managed client's binaries. Idempotent.
    pub fn clean(&self) -> Result<(), PackError> {
        let targets = [
            self.resolve(&self.cfg.result_dir),
            self.resolve(&self.cfg.client_dir)
                .join(&self.cfg.client_binaries_subpath),
        ];
        let mut trace = Vec::new();
        for dir in &targets {
            let removed = ufs::remove_dir_if_exists(dir)?;
            trace.push(if removed {
                format!("Removed {}", dir.display())
            } else {
                format!("Already absent {}", dir.display())
            });
        }
        let trace_refs: Vec<&str> = trace.iter().map(String::as_str).collect();
        Logger::new().log_message_with_trace(LogLevel::Success, "Build outputs cleaned", trace_refs);
        Ok(())
    }
}
