//! Canonical file locations under the state directory.

use std::path::PathBuf;

/// Default state directory, relative to the working directory.
pub const DEFAULT_STATE_DIR: &str = ".grammar";

/// All paths the CLI reads or writes for one state directory.
#[derive(Debug, Clone)]
pub struct GrammarPaths {
    pub state_dir: PathBuf,
    pub config_path: PathBuf,
    pub credentials_path: PathBuf,
}

impl GrammarPaths {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        let state_dir = state_dir.into();
        Self {
            config_path: state_dir.join("config.toml"),
            credentials_path: state_dir.join("credentials.json"),
            state_dir,
        }
    }
}
