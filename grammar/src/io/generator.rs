//! Generation capability abstraction.
//!
//! The [`Generator`] trait decouples the orchestrator from the actual model
//! backend (currently Gemini over HTTP). Tests use scripted generators that
//! return predetermined text without touching the network.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

/// One opaque text-generation round trip.
///
/// Implementations may fail for any reason (network, quota, malformed
/// response); the orchestrator reports such failures as `ModelFailure` and never
/// retries. Blank output is not an error at this layer.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

#[async_trait]
impl<G: Generator + ?Sized> Generator for Arc<G> {
    async fn generate(&self, prompt: &str) -> Result<String> {
        (**self).generate(prompt).await
    }
}

#[async_trait]
impl<G: Generator + ?Sized> Generator for Box<G> {
    async fn generate(&self, prompt: &str) -> Result<String> {
        (**self).generate(prompt).await
    }
}
