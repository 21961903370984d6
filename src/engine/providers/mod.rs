// Brio Assistant Engine — Completion Backends
// Narrow abstraction over heterogeneous model providers. Callers hold a
// `ProviderSet` keyed by provider id and never see a concrete wire format.
// Transport failures carry an HTTP-like status and body so the chat
// pipeline can drive health reporting.

pub mod openai;

pub use openai::OpenAiBackend;

use crate::atoms::error::ProviderError;
use crate::atoms::types::{Completion, Message};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Provider id this backend serves (matches `ModelDescriptor::provider`).
    fn id(&self) -> &str;

    /// One non-streaming completion.
    async fn complete(
        &self,
        model: &str,
        system_prompt: &str,
        history: &[Message],
    ) -> Result<Completion, ProviderError>;
}

/// Registry of type-erased backends, keyed by provider id.
#[derive(Default)]
pub struct ProviderSet {
    backends: HashMap<String, Arc<dyn CompletionBackend>>,
}

impl ProviderSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, backend: Arc<dyn CompletionBackend>) {
        self.backends.insert(backend.id().to_string(), backend);
    }

    pub fn get(&self, provider: &str) -> Option<Arc<dyn CompletionBackend>> {
        self.backends.get(provider).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}
