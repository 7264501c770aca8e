//! CLI command handlers.
//!
//! These sit on the caller side of the pipeline: they resolve configuration and
//! the API key, construct an [`Orchestrator`], wire Ctrl-C and deadlines into a
//! [`CancelToken`], and hand back the [`PipelineOutcome`] for rendering.

use std::io::Read;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cancel::CancelToken;
use crate::core::error::PipelineOutcome;
use crate::core::types::Operation;
use crate::io::config::load_config;
use crate::io::credentials::{
    CURRENT_KEY, CredentialStore, FileCredentialStore, KeySource, MASKED_KEY, resolve_api_key,
};
use crate::io::generator::Generator;
use crate::io::paths::GrammarPaths;
use crate::orchestrator::Orchestrator;

/// Read operation text from an argument; `-` means stdin.
pub fn read_text(arg: &str) -> Result<String> {
    if arg != "-" {
        return Ok(arg.to_string());
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("read text from stdin")?;
    Ok(buf)
}

/// Run one operation with the configuration and key found under `paths`.
///
/// `env_key` is the value of `GEMINI_API_KEY`, if set. The outer `Result`
/// carries configuration and storage errors; pipeline failures, including a
/// missing key, are in the returned outcome.
pub async fn run_operation(
    paths: &GrammarPaths,
    env_key: Option<String>,
    operation: Operation,
    timeout: Option<Duration>,
) -> Result<PipelineOutcome> {
    let config = load_config(&paths.config_path)?;
    let store = FileCredentialStore::new(&paths.credentials_path);
    let api_key = match resolve_api_key(&store, env_key)? {
        Some((key, source)) => {
            debug!(?source, "resolved API key");
            key
        }
        None => String::new(),
    };

    let orchestrator = match Orchestrator::connect(&api_key, &config) {
        Ok(orchestrator) => orchestrator,
        Err(err) => return Ok(Err(err)),
    };

    let mut cancel = CancelToken::new();
    if let Some(timeout) = timeout.or(config.operation_timeout_secs.map(Duration::from_secs)) {
        cancel = cancel.with_timeout(timeout);
    }
    Ok(run_interruptible(&orchestrator, operation, cancel).await)
}

/// Run `operation`, cancelling it if the process receives Ctrl-C.
pub async fn run_interruptible<G: Generator>(
    orchestrator: &Orchestrator<G>,
    operation: Operation,
    cancel: CancelToken,
) -> PipelineOutcome {
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupt received, cancelling");
                cancel.cancel();
            }
        })
    };
    let outcome = orchestrator.run(operation, &cancel).await;
    interrupt.abort();
    outcome
}

/// Store `key` as the active API key.
pub fn key_set(paths: &GrammarPaths, key: &str) -> Result<()> {
    FileCredentialStore::new(&paths.credentials_path).put(CURRENT_KEY, key)
}

/// Describe the active API key without revealing it.
pub fn key_show(paths: &GrammarPaths, env_key: Option<String>) -> Result<String> {
    let store = FileCredentialStore::new(&paths.credentials_path);
    Ok(match resolve_api_key(&store, env_key)? {
        Some((_, KeySource::Environment)) => format!("API key: {MASKED_KEY} (from GEMINI_API_KEY)"),
        Some((_, KeySource::Store)) => format!("API key: {MASKED_KEY}"),
        None => "No API key stored".to_string(),
    })
}

/// Remove the stored API key. Returns whether one existed.
pub fn key_delete(paths: &GrammarPaths) -> Result<bool> {
    FileCredentialStore::new(&paths.credentials_path).delete(CURRENT_KEY)
}
