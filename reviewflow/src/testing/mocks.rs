//! Scripted generator for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::GenerationError;
use crate::providers::{GenerationRequest, GenerationResponse, Generator};

type StageHook = Arc<dyn Fn(&GenerationRequest) + Send + Sync>;

/// A generator that answers from a script and records every request.
///
/// Stages without a scripted reply answer `output of <stage_id>`.
#[derive(Default)]
pub struct ScriptedGenerator {
    replies: Mutex<HashMap<String, Result<String, GenerationError>>>,
    hooks: Mutex<HashMap<String, StageHook>>,
    delay: Mutex<Option<Duration>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    /// Creates a generator that succeeds for every stage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts a successful reply for a stage.
    #[must_use]
    pub fn with_output(self, stage_id: impl Into<String>, text: impl Into<String>) -> Self {
        self.replies.lock().insert(stage_id.into(), Ok(text.into()));
        self
    }

    /// Scripts a failure for a stage.
    #[must_use]
    pub fn with_failure(self, stage_id: impl Into<String>, error: GenerationError) -> Self {
        self.replies.lock().insert(stage_id.into(), Err(error));
        self
    }

    /// Runs `hook` whenever the stage is called, before replying.
    #[must_use]
    pub fn on_stage<F>(self, stage_id: impl Into<String>, hook: F) -> Self
    where
        F: Fn(&GenerationRequest) + Send + Sync + 'static,
    {
        self.hooks.lock().insert(stage_id.into(), Arc::new(hook));
        self
    }

    /// Sleeps for `delay` on every call.
    #[must_use]
    pub fn with_delay(self, delay: Duration) -> Self {
        *self.delay.lock() = Some(delay);
        self
    }

    /// Returns every request, in call order.
    #[must_use]
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().clone()
    }

    /// Returns the ids of called stages, in call order.
    #[must_use]
    pub fn called_stages(&self) -> Vec<String> {
        self.requests.lock().iter().map(|r| r.stage_id.clone()).collect()
    }

    /// Returns the prompt sent for a stage, if it was called.
    #[must_use]
    pub fn prompt_for(&self, stage_id: &str) -> Option<String> {
        self.requests
            .lock()
            .iter()
            .find(|r| r.stage_id == stage_id)
            .map(|r| r.prompt.clone())
    }

    /// Returns the number of calls.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Clears recorded requests.
    pub fn reset(&self) {
        self.requests.lock().clear();
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, GenerationError> {
        self.requests.lock().push(request.clone());

        let hook = self.hooks.lock().get(&request.stage_id).cloned();
        if let Some(hook) = hook {
            hook(request);
        }

        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let reply = self
            .replies
            .lock()
            .get(&request.stage_id)
            .cloned()
            .unwrap_or_else(|| Ok(format!("output of {}", request.stage_id)));

        reply.map(|text| GenerationResponse::text(text, request.model.as_str(), "scripted"))
    }
}

impl std::fmt::Debug for ScriptedGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedGenerator")
            .field("scripted_stages", &self.replies.lock().keys().cloned().collect::<Vec<_>>())
            .field("call_count", &self.call_count())
            .finish_non_exhaustive()
    }
}
