// ── Brio Atoms: Constants ──────────────────────────────────────────────────
// All named constants for the crate live here.
// Rationale: collecting constants in one place eliminates magic numbers,
// makes auditing easier, and keeps every layer's code self-documenting.

// ── Provider health ────────────────────────────────────────────────────────
// An unhealthy provider is excluded from routing for this long, measured
// from its last health report. After the window it is implicitly eligible
// again, even without an explicit healthy report.
pub const HEALTH_COOLDOWN_SECS: i64 = 60;

// ── Task classification ────────────────────────────────────────────────────
// Raw message length (chars) → context bucket thresholds.
pub const CONTEXT_ULTRA_LONG_CHARS: usize = 10_000;
pub const CONTEXT_LONG_CHARS: usize = 3_000;
pub const CONTEXT_MEDIUM_CHARS: usize = 500;

/// A latency budget below this many milliseconds flips `requires_speed`.
pub const SPEED_LATENCY_BUDGET_MS: u64 = 3_000;

// ── Routing ────────────────────────────────────────────────────────────────
/// Minimum context capacity (tokens) for a model to serve long-context work.
pub const LONG_CONTEXT_MIN_TOKENS: u32 = 50_000;
/// Maximum number of fallback models attached to a routing decision.
pub const MAX_FALLBACKS: usize = 3;
/// Model returned when no candidate survives the suitability gate.
pub const DEFAULT_MODEL_ID: &str = "gpt-4o-mini";
/// Fixed fallback pair attached to the default-model degradation path.
pub const DEFAULT_FALLBACK_IDS: [&str; 2] = ["claude-3-5-haiku", "gemini-2.0-flash"];

// ── Learning store ─────────────────────────────────────────────────────────
// Preference confidence lifecycle: created at the initial value, reinforced
// by a fixed step per repeat observation, capped at 1.0.
pub const PREFERENCE_INITIAL_CONFIDENCE: f64 = 0.3;
pub const PREFERENCE_CONFIDENCE_STEP: f64 = 0.1;

// Pattern effectiveness lifecycle: created neutral, nudged only by explicit
// outcome feedback, clamped to [0, 1].
pub const PATTERN_INITIAL_EFFECTIVENESS: f64 = 0.5;
pub const PATTERN_SUCCESS_STEP: f64 = 0.1;
pub const PATTERN_FAILURE_STEP: f64 = 0.05;

/// Only signals above these floors are surfaced to the prompt builder.
pub const PREFERENCE_CONFIDENCE_FLOOR: f64 = 0.5;
pub const PATTERN_EFFECTIVENESS_FLOOR: f64 = 0.5;

/// Memory importance assigned from the creation-time feedback signal.
pub const MEMORY_IMPORTANCE_POSITIVE: f64 = 0.8;
pub const MEMORY_IMPORTANCE_NEUTRAL: f64 = 0.5;
pub const MEMORY_IMPORTANCE_NEGATIVE: f64 = 0.2;

/// Default number of memories returned by recall / build_context.
pub const MEMORY_RECALL_LIMIT: usize = 10;
