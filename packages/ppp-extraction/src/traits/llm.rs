//! Capability trait for the natural-language extraction service.
//!
//! The service is a non-deterministic external dependency, so the
//! extractor is written against this one-method seam: production wraps a
//! live chat-completions API, tests substitute a deterministic script
//! that returns fixed payloads.

use async_trait::async_trait;

use crate::error::CompletionError;

/// Decoding options for one completion call.
#[derive(Debug, Clone)]
pub struct CompletionOptions {
    /// Low-randomness decoding: extraction is structured-data work, and
    /// reruns should reproduce for audit trails.
    pub temperature: f32,

    /// Response token cap.
    pub max_tokens: u32,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            max_tokens: 800,
        }
    }
}

/// A chat-style completion service.
#[async_trait]
pub trait Completion: Send + Sync {
    /// Send a system instruction and user payload, returning the raw
    /// response text.
    async fn complete(
        &self,
        system: &str,
        user: &str,
        options: &CompletionOptions,
    ) -> Result<String, CompletionError>;
}

#[async_trait]
impl<T: Completion + ?Sized> Completion for std::sync::Arc<T> {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        options: &CompletionOptions,
    ) -> Result<String, CompletionError> {
        (**self).complete(system, user, options).await
    }
}
