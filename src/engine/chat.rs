// Brio Assistant Engine — Chat Pipeline
// The facade tying everything together: route the request, assemble the
// learned context into a system prompt, walk the chosen model and its
// fallbacks until one provider answers, then post-process the completion
// for embedded tool calls.
//
// Provider failures feed the health tracker so the next request routes
// around a struggling provider instead of rediscovering the outage.

use crate::atoms::error::{EngineError, EngineResult, ProviderError};
use crate::atoms::types::{
    ChatRequest, ChatResponse, Completion, LearningContext, ModelDescriptor, ProcessedResponse,
    RouteConfig, RoutingDecision, RoutingMode,
};
use crate::engine::classifier;
use crate::engine::health::ProviderHealth;
use crate::engine::learning::LearningStore;
use crate::engine::processor::ResponseProcessor;
use crate::engine::providers::ProviderSet;
use crate::engine::registry::ModelRegistry;
use crate::engine::routing::Router;
use crate::engine::search::SearchBackend;
use crate::engine::store::DocumentStore;
use crate::engine::tools::ToolExecutor;
use log::{info, warn};
use std::sync::Arc;

pub struct Engine {
    registry: Arc<ModelRegistry>,
    health: Arc<ProviderHealth>,
    router: Router,
    providers: ProviderSet,
    processor: ResponseProcessor,
    learning: LearningStore,
}

impl Engine {
    pub fn new(
        registry: Arc<ModelRegistry>,
        providers: ProviderSet,
        store: Arc<dyn DocumentStore>,
        search_primary: Arc<dyn SearchBackend>,
        search_secondary: Option<Arc<dyn SearchBackend>>,
    ) -> Self {
        let health = Arc::new(ProviderHealth::new());
        let executor = Arc::new(ToolExecutor::new(
            Arc::clone(&store),
            search_primary,
            search_secondary,
        ));
        Engine {
            router: Router::new(Arc::clone(&registry), Arc::clone(&health)),
            processor: ResponseProcessor::new(executor),
            learning: LearningStore::new(store),
            registry,
            health,
            providers,
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn health(&self) -> &ProviderHealth {
        &self.health
    }

    pub fn learning(&self) -> &LearningStore {
        &self.learning
    }

    /// Handle one chat turn end to end.
    pub async fn chat(&self, user_id: &str, request: ChatRequest) -> EngineResult<ChatResponse> {
        let message = last_user_message(&request);
        let config = merge_route_config(&request);

        let decision = self.router.select_model(&message, &config);
        info!(
            "[chat] {} routed to {} ({})",
            user_id, decision.model.id, decision.justification
        );

        let context = self.learning.build_context(user_id, Some(&message)).await;
        let system_prompt = build_system_prompt(&decision, &context);

        let (completion, model_used) = self
            .complete_with_fallbacks(&decision, &system_prompt, &request)
            .await?;

        // Routing patterns accrue per (task, model); reinforcement happens
        // later when explicit feedback arrives.
        let analysis = classifier::classify(&message, &config);
        self.learning
            .observe_pattern(
                user_id,
                "routing",
                &format!("{}:{}", analysis.primary.label(), model_used),
                &truncate(&message, 120),
            )
            .await;

        if request.enable_tools {
            let processed = self.processor.process(user_id, &completion.content).await;
            return Ok(ChatResponse {
                content: processed.content,
                model_used,
                tokens_used: completion.tokens_used,
                tool_results: processed.tool_results,
            });
        }

        Ok(ChatResponse {
            content: completion.content,
            model_used,
            tokens_used: completion.tokens_used,
            tool_results: Vec::new(),
        })
    }

    /// Re-run tool extraction over an already-produced reply.
    pub async fn process_response(&self, user_id: &str, raw: &str) -> ProcessedResponse {
        self.processor.process(user_id, raw).await
    }

    /// Try the chosen model, then each fallback in order. Any provider
    /// error marks that provider unhealthy and moves on; a success marks
    /// it healthy. When every candidate fails, the last provider error
    /// propagates to the caller.
    async fn complete_with_fallbacks(
        &self,
        decision: &RoutingDecision,
        system_prompt: &str,
        request: &ChatRequest,
    ) -> EngineResult<(Completion, String)> {
        if self.providers.is_empty() {
            return Err(EngineError::Config("no completion backends registered".into()));
        }

        let mut last_error: Option<ProviderError> = None;

        for model in candidates(decision) {
            let Some(backend) = self.providers.get(&model.provider) else {
                warn!("[chat] no backend registered for provider '{}'", model.provider);
                continue;
            };

            match backend
                .complete(&model.id, system_prompt, &request.messages)
                .await
            {
                Ok(completion) => {
                    self.health.report_healthy(&model.provider);
                    return Ok((completion, model.id.clone()));
                }
                Err(e) => {
                    warn!("[chat] {} failed on {}: {}", model.provider, model.id, e);
                    self.health.report_unhealthy(&model.provider);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) => Err(e.into()),
            None => Err(EngineError::Config(
                "no backend registered for any routed provider".into(),
            )),
        }
    }
}

fn candidates(decision: &RoutingDecision) -> impl Iterator<Item = &ModelDescriptor> {
    std::iter::once(&decision.model).chain(decision.fallbacks.iter())
}

/// The routing knobs live in `request.route`; the top-level `model_id` and
/// `mode` shortcuts win when set.
fn merge_route_config(request: &ChatRequest) -> RouteConfig {
    let mut config = request.route.clone();
    if request.mode == RoutingMode::Manual {
        config.mode = RoutingMode::Manual;
    }
    if let Some(model_id) = &request.model_id {
        config.mode = RoutingMode::Manual;
        config.preferred_model = Some(model_id.clone());
    }
    config
}

fn last_user_message(request: &ChatRequest) -> String {
    request
        .messages
        .iter()
        .rev()
        .find(|m| m.role == crate::atoms::types::Role::User)
        .map(|m| m.content.clone())
        .unwrap_or_default()
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars).collect()
    }
}

// ── System prompt ───────────────────────────────────────────────────────

/// Fold the advisory learning bundle into a system prompt. Empty context
/// yields the bare identity prompt; the completion must never depend on
/// the learning store being reachable.
fn build_system_prompt(decision: &RoutingDecision, context: &LearningContext) -> String {
    let mut prompt = String::from(
        "You are Brio, a helpful business assistant. Answer in the user's language.",
    );

    if !context.preferences.is_empty() {
        prompt.push_str("\n\nKnown user preferences:");
        for pref in &context.preferences {
            prompt.push_str(&format!("\n- {} / {}: {}", pref.category, pref.key, pref.value));
        }
    }

    if !context.patterns.is_empty() {
        prompt.push_str("\n\nObserved habits:");
        for pattern in &context.patterns {
            prompt.push_str(&format!(
                "\n- {} ({}, seen {} times)",
                pattern.pattern_key, pattern.pattern_type, pattern.frequency
            ));
        }
    }

    if !context.memories.is_empty() {
        prompt.push_str("\n\nRelevant context about the user:");
        for memory in &context.memories {
            prompt.push_str(&format!("\n- {}", memory.content));
        }
    }

    if decision.model.supports_function_calling {
        prompt.push_str(
            "\n\nWhen the user asks you to take an action, emit a fenced json block \
             with an object containing \"tool\" and \"parameters\".",
        );
    }

    prompt
}

// ── Tests ───────────────────────────────────────────────────────────────
