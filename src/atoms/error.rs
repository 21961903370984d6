// ── Brio Atoms: Error Types ────────────────────────────────────────────────
// Single canonical error enum for the engine, built with `thiserror`.
//
// Design rules:
//   • Variants are coarse-grained by domain (I/O, DB, Provider, Config…).
//   • The `#[from]` attribute wires std/external error conversions automatically.
//   • `EngineError` → `String` conversion is provided via `Display` so that
//     host-application boundaries (`Result<T, String>`) can call
//     `.map_err(|e| e.to_string())` without boilerplate.
//   • No variant carries secret material (API keys) in its message.

use thiserror::Error;

// ── Primary error enum ─────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum EngineError {
    /// Filesystem or OS-level I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization / deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP / network failure (reqwest layer).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// SQLite / rusqlite database failure.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Completion backend HTTP or API-level failure.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Tool execution failure.
    #[error("Tool error: {tool}: {message}")]
    Tool { tool: String, message: String },

    /// Engine configuration is invalid — malformed model registry,
    /// missing default model, duplicate ids. Fatal at startup.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catch-all for errors that do not yet have a dedicated variant.
    /// Prefer adding a specific variant over using this in new code.
    #[error("{0}")]
    Other(String),
}

impl EngineError {
    /// Create a tool error with name and message.
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Tool { tool: tool.into(), message: message.into() }
    }
}

// ── Completion backend errors ──────────────────────────────────────────────
// Kept as a separate typed error because callers use the HTTP status to
// drive provider health reporting: any transport failure marks the
// provider unhealthy before the router moves to a fallback.

#[derive(Debug, Error)]
pub enum ProviderError {
    /// The backend answered with a non-success status.
    #[error("{provider} returned HTTP {status}: {body}")]
    Http { provider: String, status: u16, body: String },

    /// The request never produced an HTTP response (DNS, TLS, timeout…).
    #[error("{provider} request failed: {message}")]
    Transport { provider: String, message: String },

    /// The backend answered 200 but the body was not the expected shape.
    #[error("{provider} returned an unparseable response: {message}")]
    ResponseParse { provider: String, message: String },
}

impl ProviderError {
    /// Provider id the failure originated from.
    pub fn provider(&self) -> &str {
        match self {
            ProviderError::Http { provider, .. }
            | ProviderError::Transport { provider, .. }
            | ProviderError::ResponseParse { provider, .. } => provider,
        }
    }
}

// ── Migration bridge: String → EngineError ─────────────────────────────────

impl From<String> for EngineError {
    fn from(s: String) -> Self {
        EngineError::Other(s)
    }
}

impl From<&str> for EngineError {
    fn from(s: &str) -> Self {
        EngineError::Other(s.to_string())
    }
}

// ── Convenience alias ──────────────────────────────────────────────────────

/// All engine operations should return this type.
/// At host-application boundaries, convert with `.map_err(|e| e.to_string())`.
pub type EngineResult<T> = Result<T, EngineError>;

impl From<EngineError> for String {
    fn from(e: EngineError) -> Self {
        e.to_string()
    }
}
