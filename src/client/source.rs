use crate::types::config::PackConfig;
use crate::types::error::PackError;
use crate::utils::{process::run_tool, spinner};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SourceAction {
    Clone,
    Pull,
}

pub fn plan_source(dir: &Path) -> SourceAction {
    if dir.exists() {
        SourceAction::Pull
    } else {
        SourceAction::Clone
    }
}

/// Pulls `dir` if it exists, otherwise clones the client repository into it.
pub fn ensure_source(cfg: &PackConfig, dir: &Path) -> Result<SourceAction, PackError> {
    let action = plan_source(dir);
    let dir_str = dir.to_string_lossy().to_string();
    match action {
        SourceAction::Pull => spinner::run_foreground_step(
            &format!("Updating client sources in {}", dir.display()),
            "Client sources up to date",
            || run_tool("git", &["-C", dir_str.as_str(), "pull"], None),
        )?,
        SourceAction::Clone => {
            if let Some(parent) = dir.parent().filter(|p| !p.as_os_str().is_empty()) {
                crate::utils::fs::ensure_dir(parent)?;
            }
            spinner::run_foreground_step(
                &format!("Cloning {} into {}", cfg.client_repo, dir.display()),
                "Client sources cloned",
                || run_tool("git", &["clone", cfg.client_repo.as_str(), dir_str.as_str()], None),
            )?
        }
    }
    Ok(action)
}
