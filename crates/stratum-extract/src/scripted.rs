use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use stratum_core::{StratumError, TextCompletion};

/// A scripted completion model for tests: returns queued responses in
/// order and errors once the script is exhausted.
pub struct ScriptedCompletion {
    responses: Mutex<VecDeque<String>>,
    calls: AtomicUsize,
}

impl ScriptedCompletion {
    pub fn new(responses: Vec<impl Into<String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            calls: AtomicUsize::new(0),
        }
    }

    /// How many completions have been requested so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextCompletion for ScriptedCompletion {
    async fn complete(&self, _prompt: &str) -> Result<String, StratumError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut responses = self
            .responses
            .lock()
            .map_err(|_| StratumError::Extraction("scripted responses poisoned".into()))?;
        responses
            .pop_front()
            .ok_or_else(|| StratumError::Extraction("scripted responses exhausted".into()))
    }
}
