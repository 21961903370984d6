// Brio Assistant Engine
// Orchestration core for a multi-model business assistant: classifies
// incoming requests, routes them across a catalogue of completion
// backends with health-aware fallbacks, executes tool calls embedded in
// replies, and adapts to each user through a lightweight learning store.

pub mod atoms;
pub mod engine;

pub use atoms::error::{EngineError, EngineResult, ProviderError};
pub use atoms::types::{
    ChatRequest, ChatResponse, Message, ProcessedResponse, RouteConfig, RoutingDecision,
    RoutingMode, ToolCall, ToolOutcome,
};
pub use engine::chat::Engine;
pub use engine::health::ProviderHealth;
pub use engine::learning::LearningStore;
pub use engine::providers::{CompletionBackend, OpenAiBackend, ProviderSet};
pub use engine::registry::ModelRegistry;
pub use engine::routing::Router;
pub use engine::search::{SearchBackend, SearxBackend};
pub use engine::store::{DocumentStore, Query, SqliteStore};
