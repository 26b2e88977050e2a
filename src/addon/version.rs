use crate::types::error::PackError;
use regex::{NoExpand, Regex};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

static VERSION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^version="[^"\r\n]*""#).expect("valid version line regex"));

/// Reads `[plugin] version` from a Godot-style `.cfg` file, quotes stripped.
pub fn get_version(cfg_path: &Path) -> Result<String, PackError> {
    let content = fs::read_to_string(cfg_path).map_err(|e| {
        PackError::precondition(format!(
            "Failed to read plugin config {}: {}",
            cfg_path.display(),
            e
        ))
    })?;
    parse_version(&content).ok_or_else(|| {
        PackError::precondition(format!(
            "No [plugin] version key in {}",
            cfg_path.display()
        ))
    })
}

fn parse_version(content: &str) -> Option<String> {
    let mut in_plugin = false;
    for line in content.lines() {
        let t = line.trim();
        if t.is_empty() || t.starts_with(';') || t.starts_with('#') {
            continue;
        }
        if t.starts_with('[') && t.ends_with(']') {
            in_plugin = t == "[plugin]";
            continue;
        }
        if !in_plugin {
            continue;
        }
        if let Some((key, value)) = t.split_once('=') {
            if key.trim() == "version" {
                return Some(value.trim().trim_matches('"').to_string());
            }
        }
    }
    None
}

/// Rewrites the first `version="..."` line, leaving every other byte untouched.
/// A leading `v` on `input` is dropped. Returns `(previous, written)`.
pub fn set_version(cfg_path: &Path, input: &str) -> Result<(String, String), PackError> {
    let content = fs::read_to_string(cfg_path).map_err(|e| {
        PackError::precondition(format!(
            "Failed to read plugin config {}: {}",
            cfg_path.display(),
            e
        ))
    })?;
    let previous = parse_version(&content).unwrap_or_default();
    let new_version = strip_v(input).to_string();

    let updated = rewrite_version(&content, &new_version).ok_or_else(|| {
        PackError::precondition(format!(
            "No line starting with version=\"...\" in {}",
            cfg_path.display()
        ))
    })?;

    fs::write(cfg_path, updated)
        .map_err(|e| PackError::Io(format!("Failed to write {}: {}", cfg_path.display(), e)))?;
    Ok((previous, new_version))
}

fn rewrite_version(content: &str, new_version: &str) -> Option<String> {
    if !VERSION_LINE.is_match(content) {
        return None;
    }
    let line = format!("version=\"{}\"", new_version);
    Some(VERSION_LINE.replace(content, NoExpand(&line)).into_owned())
}

pub fn strip_v(tag: &str) -> &str {
    tag.strip_prefix('v').unwrap_or(tag)
}
