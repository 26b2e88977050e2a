use crate::builder::plugin::AssembledPlugin;
use crate::types::error::PackError;
use crate::utils::logger::{LogLevel, Logger};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Read;
use std::path::Path;

pub struct ArtifactInfo {
    pub size: u64,
    pub sha256: String,
}

pub fn artifact_info(path: &Path) -> Result<ArtifactInfo, PackError> {
    let mut f = fs::File::open(path)
        .map_err(|e| PackError::Io(format!("Failed to open artifact: {}", e)))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    let mut size = 0u64;
    loop {
        let n = f
            .read(&mut buf)
            .map_err(|e| PackError::Io(format!("Failed to read artifact for sha: {}", e)))?;
        if n == 0 {
            break;
        }
        size += n as u64;
        hasher.update(&buf[..n]);
    }
    Ok(ArtifactInfo {
        size,
        sha256: hex::encode(hasher.finalize()),
    })
}

pub fn print_artifact_summary(path: &Path) -> Result<(), PackError> {
    let info = artifact_info(path)?;
    let file_name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");

    let lines = [
        format!("Name    : {}", file_name),
        format!("Path    : {}", path.display()),
        format!("Size    : {} bytes", info.size),
        format!("SHA256  : {}", info.sha256),
    ];
    let trace: Vec<&str> = lines.iter().map(String::as_str).collect();
    Logger::new().log_message_with_trace(LogLevel::Info, "📦 Archive", trace);
    Ok(())
}

pub fn print_plugin_summary(plugin: &AssembledPlugin) {
    let mut lines = vec![
        format!("Version : {}", plugin.version),
        format!("Client  : {}", plugin.client_tag),
        format!("Sources : {} file(s)", plugin.source_files),
        format!("Staged  : {}", plugin.staged_dir.display()),
        format!("Archive : {}", plugin.archive_name),
    ];
    for name in &plugin.client_files {
        lines.push(format!("Binary  : {}", name));
    }
    let trace: Vec<&str> = lines.iter().map(String::as_str).collect();
    Logger::new().log_message_with_trace(LogLevel::Info, "🧩 Plugin", trace);
}
