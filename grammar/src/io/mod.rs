//! Side-effecting collaborators of the pipeline: the model backend,
//! configuration files and the credential store.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

pub mod config;
pub mod credentials;
pub mod gemini;
pub mod generator;
pub mod paths;

/// Write `contents` via a temp file and rename, creating parent directories.
pub(crate) fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp file {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace {}", path.display()))?;
    Ok(())
}
