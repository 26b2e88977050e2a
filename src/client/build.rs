use crate::client::source;
use crate::types::config::PackConfig;
use crate::types::error::PackError;
use crate::utils::{process::run_tool, spinner};
use std::path::Path;

/// Builds the client in `dir`. Sources are fetched only when `managed` is set,
/// i.e. `dir` is the default client directory; a caller-supplied dir is used as is.
pub fn build_client(cfg: &PackConfig, dir: &Path, managed: bool) -> Result<(), PackError> {
    if managed {
        source::ensure_source(cfg, dir)?;
    } else if !dir.is_dir() {
        return Err(PackError::precondition(format!(
            "Client directory {} does not exist",
            dir.display()
        ))
        .with_hint("clone the client there or omit --client-dir"));
    }

    let Some((program, args)) = cfg.client_build_cmd.split_first() else {
        return Err(PackError::Config(
            "client_build_cmd must name at least a program".into(),
        ));
    };
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    spinner::run_foreground_step(
        &format!(
            "Building client in {} ({})",
            dir.display(),
            cfg.client_build_cmd.join(" ")
        ),
        "Client build finished",
        || run_tool(program, &args, Some(dir)),
    )
}
