use crate::types::error::PackError;
use crate::utils::logger::{LogLevel, Logger};
use std::path::Path;
use std::process::Command;

/// Runs `program` to completion with inherited stdio. Blocks until the child exits.
pub fn run_tool(program: &str, args: &[&str], cwd: Option<&Path>) -> Result<(), PackError> {
    let resolved = which::which(program).map_err(|_| {
        PackError::precondition(format!("'{}' was not found on PATH", program))
            .with_hint(format!("install {} and retry", program))
    })?;

    Logger::new().log_message(
        LogLevel::Debug,
        &format!("Running {} {}", resolved.display(), args.join(" ")),
    );

    let mut cmd = Command::new(&resolved);
    cmd.args(args);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    let status = cmd
        .status()
        .map_err(|e| PackError::Io(format!("Failed to run {}: {}", program, e)))?;
    if !status.success() {
        return Err(PackError::Subprocess {
            program: program.to_string(),
            code: status.code(),
        });
    }
    Ok(())
}
