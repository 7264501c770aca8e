//! Test-only generation capabilities.
//!
//! Both fakes record every prompt they receive and count calls, so tests can
//! assert on stage sequencing without a network.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Result, anyhow};
use async_trait::async_trait;

use crate::io::generator::Generator;

/// One scripted response.
#[derive(Debug, Clone)]
pub enum Scripted {
    /// Return this text.
    Reply(String),
    /// Fail with this message.
    Fail(String),
    /// Never resolve (for cancellation tests).
    Hang,
}

impl Scripted {
    pub fn reply(text: impl Into<String>) -> Self {
        Scripted::Reply(text.into())
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Scripted::Fail(message.into())
    }
}

#[derive(Debug, Default)]
struct Recorder {
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl Recorder {
    fn record(&self, prompt: &str) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .expect("prompt log lock")
            .push(prompt.to_string());
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompt log lock").clone()
    }
}

/// Generator that replays a fixed queue of responses in call order.
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<Scripted>>,
    recorder: Recorder,
}

impl ScriptedGenerator {
    pub fn new(script: Vec<Scripted>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            recorder: Recorder::default(),
        }
    }

    /// Number of `generate` calls received.
    pub fn calls(&self) -> usize {
        self.recorder.calls.load(Ordering::SeqCst)
    }

    /// Prompts received, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.recorder.prompts()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.recorder.record(prompt);
        let next = self.script.lock().expect("script lock").pop_front();
        match next {
            Some(Scripted::Reply(text)) => Ok(text),
            Some(Scripted::Fail(message)) => Err(anyhow!(message)),
            Some(Scripted::Hang) => std::future::pending().await,
            None => Err(anyhow!("script exhausted")),
        }
    }
}

/// Generator that answers by the first tag found in the prompt.
#[derive(Debug, Default)]
pub struct TaggedGenerator {
    routes: Vec<(String, String)>,
    recorder: Recorder,
}

impl TaggedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply `text` to any prompt containing `tag`. Earlier routes win.
    pub fn route(mut self, tag: impl Into<String>, text: impl Into<String>) -> Self {
        self.routes.push((tag.into(), text.into()));
        self
    }

    pub fn calls(&self) -> usize {
        self.recorder.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.recorder.prompts()
    }
}

#[async_trait]
impl Generator for TaggedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.recorder.record(prompt);
        self.routes
            .iter()
            .find(|(tag, _)| prompt.contains(tag.as_str()))
            .map(|(_, text)| text.clone())
            .ok_or_else(|| anyhow!("no route matches prompt"))
    }
}
