// Brio Assistant Engine — Core types
// These are the data structures that flow through the entire engine.
// They are independent of any specific AI provider or storage backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Task classification ────────────────────────────────────────────────

/// Closed set of task categories a request can be classified into.
/// Also doubles as the capability vocabulary on model descriptors.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum TaskCategory {
    General,
    Reasoning,
    Coding,
    Creative,
    DataAnalysis,
    Document,
    ImageAnalysis,
    ImageGeneration,
    WebSearch,
    Translation,
    Summarization,
    ToolUse,
    Fast,
    Math,
}

impl TaskCategory {
    /// Human-readable label used in routing justifications.
    pub fn label(&self) -> &'static str {
        match self {
            TaskCategory::General => "general",
            TaskCategory::Reasoning => "reasoning",
            TaskCategory::Coding => "coding",
            TaskCategory::Creative => "creative",
            TaskCategory::DataAnalysis => "data analysis",
            TaskCategory::Document => "document",
            TaskCategory::ImageAnalysis => "image analysis",
            TaskCategory::ImageGeneration => "image generation",
            TaskCategory::WebSearch => "web search",
            TaskCategory::Translation => "translation",
            TaskCategory::Summarization => "summarization",
            TaskCategory::ToolUse => "tool use",
            TaskCategory::Fast => "fast",
            TaskCategory::Math => "math",
        }
    }
}

/// Context-length bucket derived from raw message length.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum ContextBucket {
    Short,
    Medium,
    Long,
    UltraLong,
}

/// Output of the task classifier. Created fresh per request, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskAnalysis {
    pub primary: TaskCategory,
    pub secondary: Vec<TaskCategory>,
    pub requires_reasoning: bool,
    pub requires_images: bool,
    pub requires_web_search: bool,
    pub requires_long_context: bool,
    pub requires_speed: bool,
    /// Bucket computed from the raw message length. Caller overrides apply
    /// to the derived flags only, never to this field.
    pub context_bucket: ContextBucket,
}

// ── Model descriptors ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SpeedTier {
    UltraFast,
    Fast,
    Medium,
    Slow,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum QualityTier {
    Basic,
    Good,
    Excellent,
    TopTier,
}

/// Static metadata about one completion backend / model combination.
/// Immutable after registry construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub id: String,
    pub name: String,
    pub provider: String,
    /// Task categories this model serves well.
    pub capabilities: Vec<TaskCategory>,
    /// Context capacity in tokens.
    pub context_tokens: u32,
    pub speed: SpeedTier,
    pub quality: QualityTier,
    pub supports_reasoning: bool,
    pub supports_images: bool,
    pub supports_web_search: bool,
    pub supports_function_calling: bool,
    pub free_tier: bool,
    /// Base priority weight for routing scores.
    pub priority: i32,
}

impl ModelDescriptor {
    pub fn has_capability(&self, category: TaskCategory) -> bool {
        self.capabilities.contains(&category)
    }
}

// ── Routing ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RoutingMode {
    #[default]
    Auto,
    Manual,
}

/// Per-request routing configuration supplied by the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteConfig {
    #[serde(default)]
    pub mode: RoutingMode,
    /// Preferred model id; honored only in manual mode.
    #[serde(default)]
    pub preferred_model: Option<String>,
    /// Restrict candidates to one provider.
    #[serde(default)]
    pub preferred_provider: Option<String>,
    /// Latency budget in milliseconds. Below 3000 ms flips `requires_speed`.
    #[serde(default)]
    pub latency_budget_ms: Option<u64>,
    /// Explicit context bucket; overrides the length-derived bucket for
    /// the routing flags.
    #[serde(default)]
    pub context_bucket: Option<ContextBucket>,
    #[serde(default)]
    pub require_reasoning: bool,
    #[serde(default)]
    pub require_images: bool,
    #[serde(default)]
    pub require_web_search: bool,
}

/// The chosen model plus ordered fallbacks and rationale for one request.
/// Computed per request, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub model: ModelDescriptor,
    /// Up to three fallbacks, best first.
    pub fallbacks: Vec<ModelDescriptor>,
    pub justification: String,
    /// Capability set of the chosen model, echoed for the prompt builder.
    pub capabilities: Vec<TaskCategory>,
}

// ── Messages ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Message { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Message { role: Role::Assistant, content: content.into() }
    }
}

// ── Chat entry point ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    /// Manual model selection, paired with `RoutingMode::Manual`.
    #[serde(default)]
    pub model_id: Option<String>,
    #[serde(default)]
    pub mode: RoutingMode,
    #[serde(default)]
    pub enable_tools: bool,
    /// Extra routing knobs; merged with `mode`/`model_id` above.
    #[serde(default)]
    pub route: RouteConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub content: String,
    pub model_used: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u32>,
    #[serde(default)]
    pub tool_results: Vec<ToolOutcome>,
}

/// One completed (non-streaming) backend call.
#[derive(Debug, Clone)]
pub struct Completion {
    pub content: String,
    pub tokens_used: Option<u32>,
}

// ── Tool invocation ─────────────────────────────────────────────────────

/// A structured action request extracted from completion text:
/// tool name plus a raw parameter bag, validated downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub tool: String,
    #[serde(default)]
    pub parameters: Value,
}

/// Result of one tool invocation, surfaced to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutcome {
    pub tool: String,
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Hint for the host application to navigate somewhere relevant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

impl ToolOutcome {
    pub fn ok(tool: impl Into<String>, message: impl Into<String>) -> Self {
        ToolOutcome {
            tool: tool.into(),
            success: true,
            message: message.into(),
            data: None,
            redirect: None,
        }
    }

    pub fn failed(tool: impl Into<String>, message: impl Into<String>) -> Self {
        ToolOutcome {
            tool: tool.into(),
            success: false,
            message: message.into(),
            data: None,
            redirect: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_redirect(mut self, redirect: impl Into<String>) -> Self {
        self.redirect = Some(redirect.into());
        self
    }
}

/// Output of the response processor: text with tool-call spans replaced
/// by their execution messages, plus the raw outcomes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedResponse {
    pub content: String,
    pub tool_results: Vec<ToolOutcome>,
}

// ── Learning records ────────────────────────────────────────────────────

/// A confidence-weighted user preference, keyed on (user, category, key).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearnedPreference {
    pub user_id: String,
    pub category: String,
    pub key: String,
    pub value: Value,
    pub confidence: f64,
    pub observations: u32,
    pub updated_at: DateTime<Utc>,
}

/// An effectiveness-weighted behavioral pattern, keyed on (user, type, key).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearnedPattern {
    pub id: String,
    pub user_id: String,
    pub pattern_type: String,
    pub pattern_key: String,
    pub frequency: u32,
    pub effectiveness: f64,
    pub last_occurred: DateTime<Utc>,
    pub context: String,
}

/// A remembered fact about a user. Importance is fixed at creation;
/// access bookkeeping updates on explicit reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub id: String,
    pub user_id: String,
    pub content: String,
    pub content_type: String,
    pub importance: f64,
    pub access_count: u32,
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
}

/// Feedback signal attached to a new memory; sets its importance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackSignal {
    Positive,
    Neutral,
    Negative,
}

/// Advisory bundle handed to the prompt builder before each completion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LearningContext {
    pub preferences: Vec<LearnedPreference>,
    pub patterns: Vec<LearnedPattern>,
    pub memories: Vec<MemoryEntry>,
}

// ── Search backend ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default)]
    pub results: Vec<SearchResult>,
}
