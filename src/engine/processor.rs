// Brio Assistant Engine — Response Processor
// Extracts embedded tool calls from free-form completion text, executes
// them, and splices the results back into the user-facing reply.
//
// Three extraction strategies run in order, short-circuiting once one
// yields at least one call:
//   1. fenced code blocks parsed as a JSON object with a "tool" field
//   2. the entire trimmed text as a single JSON object
//   3. bounded inline JSON-shaped substrings (single-nesting heuristic)
// Precision over recall: the search only broadens when the narrower
// strategy stays silent. Malformed JSON is assumed to be incidental text,
// never an error.

use crate::atoms::types::{ProcessedResponse, ToolCall, ToolOutcome};
use crate::engine::tools::ToolExecutor;
use log::info;
use regex::Regex;
use std::ops::Range;
use std::sync::{Arc, LazyLock};

/// Any fenced block, with optional language tag.
static FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[a-zA-Z]*\s*(.*?)```").expect("valid regex"));

/// Bounded object containing a "tool" key, allowing exactly one nesting
/// level for the parameter bag. Deliberately no brace balancing beyond
/// that; deeper payloads belong in fenced blocks.
static INLINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{[^{}]*"tool"[^{}]*(?:\{[^{}]*\}[^{}]*)?\}"#).expect("valid regex")
});

/// Leftover fence markers stripped after extraction.
static MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[a-zA-Z]*\n?").expect("valid regex"));

pub struct ResponseProcessor {
    executor: Arc<ToolExecutor>,
}

impl ResponseProcessor {
    pub fn new(executor: Arc<ToolExecutor>) -> Self {
        ResponseProcessor { executor }
    }

    /// Extract and execute embedded tool calls, returning the spliced text
    /// and every outcome. Infallible: text without tool calls passes
    /// through unchanged except for whitespace/fence trimming.
    pub async fn process(&self, tenant: &str, text: &str) -> ProcessedResponse {
        let mut results: Vec<ToolOutcome> = Vec::new();

        // Strategy 1: fenced blocks.
        let mut content = self
            .replace_spans(tenant, text, fenced_candidates(text), &mut results)
            .await;

        // Strategy 2: the whole text is one JSON object.
        if results.is_empty() {
            let trimmed = text.trim();
            if trimmed.starts_with('{') && trimmed.ends_with('}') {
                if let Some(call) = parse_tool_call(trimmed) {
                    let outcome = self.executor.execute(tenant, &call).await;
                    content = replacement_text(&outcome);
                    results.push(outcome);
                }
            }
        }

        // Strategy 3: bounded inline objects.
        if results.is_empty() {
            let owned = content.clone();
            content = self
                .replace_spans(tenant, &owned, inline_candidates(&owned), &mut results)
                .await;
        }

        if !results.is_empty() {
            info!("[processor] executed {} embedded tool call(s)", results.len());
        }

        ProcessedResponse {
            content: MARKER_RE.replace_all(&content, "").trim().to_string(),
            tool_results: results,
        }
    }

    /// Execute candidate calls in order and splice each span with the
    /// outcome message. Failures carry a warning marker but still splice —
    /// sibling calls are independently recoverable.
    async fn replace_spans(
        &self,
        tenant: &str,
        text: &str,
        candidates: Vec<(Range<usize>, ToolCall)>,
        results: &mut Vec<ToolOutcome>,
    ) -> String {
        if candidates.is_empty() {
            return text.to_string();
        }

        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;
        for (span, call) in candidates {
            out.push_str(&text[cursor..span.start]);
            let outcome = self.executor.execute(tenant, &call).await;
            out.push_str(&replacement_text(&outcome));
            cursor = span.end;
            results.push(outcome);
        }
        out.push_str(&text[cursor..]);
        out
    }
}

// ── Candidate extraction (pure) ─────────────────────────────────────────

fn fenced_candidates(text: &str) -> Vec<(Range<usize>, ToolCall)> {
    FENCE_RE
        .captures_iter(text)
        .filter_map(|cap| {
            let whole = cap.get(0)?;
            let inner = cap.get(1)?.as_str().trim();
            parse_tool_call(inner).map(|call| (whole.range(), call))
        })
        .collect()
}

fn inline_candidates(text: &str) -> Vec<(Range<usize>, ToolCall)> {
    INLINE_RE
        .find_iter(text)
        .filter_map(|m| parse_tool_call(m.as_str()).map(|call| (m.range(), call)))
        .collect()
}

/// Parse a JSON object carrying a `tool` field. Anything else — malformed
/// JSON, arrays, objects without the field — is silently skipped.
fn parse_tool_call(raw: &str) -> Option<ToolCall> {
    let value: serde_json::Value = serde_json::from_str(raw).ok()?;
    value.get("tool")?.as_str()?;
    serde_json::from_value(value).ok()
}

fn replacement_text(outcome: &ToolOutcome) -> String {
    if outcome.success {
        outcome.message.clone()
    } else {
        format!("⚠️ {}", outcome.message)
    }
}

// ── Tests ───────────────────────────────────────────────────────────────
