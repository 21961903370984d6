// Brio Assistant Engine — Tool Executor
// Executes structured action requests extracted from completion text.
// Every tool call goes through here: the parameter bag is decoded into a
// typed schema, validated, then dispatched against the store or search
// collaborators.
//
// Failure containment is the contract: a validation or execution failure
// becomes a failed ToolOutcome, never a propagated error, because multiple
// tool calls inside one response must be independently recoverable.

pub mod actions;
pub mod analytics;
pub mod schema;

use crate::atoms::types::{ToolCall, ToolOutcome};
use crate::engine::search::SearchBackend;
use crate::engine::store::DocumentStore;
use log::{error, info, warn};
use schema::{ToolParams, WebSearchParams};
use std::sync::Arc;

pub struct ToolExecutor {
    store: Arc<dyn DocumentStore>,
    search_primary: Arc<dyn SearchBackend>,
    search_secondary: Option<Arc<dyn SearchBackend>>,
}

impl ToolExecutor {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        search_primary: Arc<dyn SearchBackend>,
        search_secondary: Option<Arc<dyn SearchBackend>>,
    ) -> Self {
        ToolExecutor { store, search_primary, search_secondary }
    }

    /// Execute a single tool call for a tenant and return its outcome.
    pub async fn execute(&self, tenant: &str, call: &ToolCall) -> ToolOutcome {
        info!("[tools] executing '{}' for tenant {}", call.tool, tenant);

        // Type + constraint validation happens before any side effect.
        let params = match schema::decode(&call.tool, call.parameters.clone()) {
            Ok(p) => p,
            Err(violation) => {
                warn!("[tools] '{}' rejected: {}", call.tool, violation);
                return ToolOutcome::failed(&call.tool, violation);
            }
        };

        let result = match &params {
            ToolParams::CreateTask(p) => actions::create_task(&*self.store, tenant, p).await,
            ToolParams::ScheduleEvent(p) => actions::schedule_event(&*self.store, tenant, p).await,
            ToolParams::SendNotification(p) => {
                actions::send_notification(&*self.store, tenant, p).await
            }
            ToolParams::AnalyzeData(p) => analytics::analyze_data(&*self.store, tenant, p).await,
            ToolParams::WebSearch(p) => Ok(self.web_search(p).await),
        };

        match result {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("[tools] '{}' failed: {}", call.tool, e);
                ToolOutcome::failed(
                    &call.tool,
                    format!("The {} action could not be completed: {e}", call.tool),
                )
            }
        }
    }

    // ── web_search: primary → secondary → explicit no-results ───────────

    async fn web_search(&self, params: &WebSearchParams) -> ToolOutcome {
        let limit = params.limit.unwrap_or(5) as usize;

        match self.search_primary.search(&params.query).await {
            Ok(resp) if resp.answer.is_some() || !resp.results.is_empty() => {
                return format_search_outcome(&params.query, resp, limit);
            }
            Ok(_) => {
                info!(
                    "[tools] web_search: '{}' empty on {}, trying fallback",
                    params.query,
                    self.search_primary.name()
                );
            }
            Err(e) => {
                warn!(
                    "[tools] web_search: {} failed ({}), trying fallback",
                    self.search_primary.name(),
                    e
                );
            }
        }

        if let Some(secondary) = &self.search_secondary {
            match secondary.search(&params.query).await {
                Ok(resp) if resp.answer.is_some() || !resp.results.is_empty() => {
                    return format_search_outcome(&params.query, resp, limit);
                }
                Ok(_) => {}
                Err(e) => warn!("[tools] web_search: {} failed ({})", secondary.name(), e),
            }
        }

        // Both backends exhausted: an explicit no-results answer, not an error.
        ToolOutcome::ok(
            "web_search",
            format!("No search results found for '{}'.", params.query),
        )
    }
}

fn format_search_outcome(
    query: &str,
    resp: crate::atoms::types::SearchResponse,
    limit: usize,
) -> ToolOutcome {
    let mut lines = Vec::new();
    if let Some(answer) = &resp.answer {
        lines.push(answer.clone());
    }
    for (i, r) in resp.results.iter().take(limit).enumerate() {
        lines.push(format!("{}. {} — {} ({})", i + 1, r.title, r.snippet, r.url));
    }

    let message = format!("Search results for '{}':\n{}", query, lines.join("\n"));
    ToolOutcome::ok("web_search", message)
        .with_data(serde_json::to_value(&resp).unwrap_or_default())
}

// ── Tests ───────────────────────────────────────────────────────────────
