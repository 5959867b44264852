//! The AI transport boundary.
//!
//! The core never talks to a model service directly; it sees one async
//! `generate` call behind a dyn-compatible trait. All transport-level
//! failures (network, quota, timeout) collapse into a single generic
//! `CoreError::Transport` on the way in, and the core never retries.

use async_trait::async_trait;

use crate::error::CoreError;
use crate::types::Citation;

/// One AI completion: free text plus any grounding sources the transport
/// attached.
#[derive(Debug, Clone, Default)]
pub struct GeneratedText {
    pub text: String,
    pub sources: Vec<Citation>,
}

impl GeneratedText {
    pub fn from_text(text: impl Into<String>) -> Self {
        GeneratedText {
            text: text.into(),
            sources: Vec::new(),
        }
    }
}

/// Opaque `generate(prompt) -> text` collaborator.
///
/// Implementations own their own timeouts and transport concerns; the core's
/// only obligation on failure is to leave prior persisted state unmodified
/// and surface the error to the initiating operation.
#[async_trait]
pub trait IntelligenceProvider: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<GeneratedText, CoreError>;
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Scripted provider double for pipeline tests.

    use std::collections::VecDeque;

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use super::{GeneratedText, IntelligenceProvider};
    use crate::error::CoreError;

    /// Replays queued responses in order; generates a transport error once
    /// the script runs out.
    #[derive(Default)]
    pub struct ScriptedProvider {
        responses: Mutex<VecDeque<Result<GeneratedText, CoreError>>>,
        pub prompts_seen: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn queue_text(&self, text: &str) {
            self.responses
                .lock()
                .push_back(Ok(GeneratedText::from_text(text)));
        }

        pub fn queue_failure(&self, message: &str) {
            self.responses
                .lock()
                .push_back(Err(CoreError::Transport(message.to_string())));
        }
    }

    #[async_trait]
    impl IntelligenceProvider for ScriptedProvider {
        async fn generate(&self, prompt: &str) -> Result<GeneratedText, CoreError> {
            self.prompts_seen.lock().push(prompt.to_string());
            self.responses
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(CoreError::Transport("script exhausted".to_string())))
        }
    }
}
