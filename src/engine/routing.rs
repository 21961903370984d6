// Brio Assistant Engine — Model Router
// Classifies the request, filters the model catalogue through a suitability
// gate (capability, health, context, speed), scores the survivors, and
// returns the best model with a ranked fallback list.
//
// Routing never fails on an empty result — it degrades to the default
// model. Malformed catalogues are rejected earlier, at registry
// construction.

use crate::atoms::constants::{LONG_CONTEXT_MIN_TOKENS, MAX_FALLBACKS};
use crate::atoms::types::{
    ModelDescriptor, RouteConfig, RoutingDecision, RoutingMode, SpeedTier, TaskAnalysis,
    TaskCategory, QualityTier,
};
use crate::engine::classifier;
use crate::engine::health::ProviderHealth;
use crate::engine::registry::ModelRegistry;
use log::{debug, info};
use std::sync::Arc;

pub struct Router {
    registry: Arc<ModelRegistry>,
    health: Arc<ProviderHealth>,
}

impl Router {
    pub fn new(registry: Arc<ModelRegistry>, health: Arc<ProviderHealth>) -> Self {
        Router { registry, health }
    }

    /// Pick the best available model for a request.
    pub fn select_model(&self, message: &str, config: &RouteConfig) -> RoutingDecision {
        // Manual mode: honor the caller's pick when it resolves.
        if config.mode == RoutingMode::Manual {
            if let Some(model) = config
                .preferred_model
                .as_deref()
                .and_then(|id| self.registry.get(id))
            {
                info!("[routing] manual selection: {}", model.id);
                return RoutingDecision {
                    justification: format!("Manual selection: {}", model.name),
                    fallbacks: self
                        .registry
                        .top_by_distinct_provider(MAX_FALLBACKS, &model.id),
                    capabilities: model.capabilities.clone(),
                    model: model.clone(),
                };
            }
        }

        let analysis = classifier::classify(message, config);
        debug!(
            "[routing] task={:?} secondary={:?} speed={} long_context={}",
            analysis.primary, analysis.secondary, analysis.requires_speed,
            analysis.requires_long_context
        );

        let mut scored: Vec<(i32, &ModelDescriptor)> = self
            .registry
            .all()
            .iter()
            .filter(|m| self.is_suitable(m, &analysis, config))
            .map(|m| (score_model(m, &analysis), m))
            .collect();

        scored.sort_by(|a, b| b.0.cmp(&a.0));

        let Some(&(top_score, top)) = scored.first() else {
            // No eligible candidate: degrade silently, never error.
            let default = self.registry.default_model();
            info!("[routing] no suitable model, degrading to {}", default.id);
            return RoutingDecision {
                model: default.clone(),
                fallbacks: self.registry.default_fallbacks(),
                justification: "No suitable model found, using default".into(),
                capabilities: default.capabilities.clone(),
            };
        };

        let fallbacks: Vec<ModelDescriptor> = scored
            .iter()
            .skip(1)
            .take(MAX_FALLBACKS)
            .map(|(_, m)| (*m).clone())
            .collect();

        info!(
            "[routing] selected {} (score {}) with {} fallback(s)",
            top.id,
            top_score,
            fallbacks.len()
        );

        RoutingDecision {
            justification: build_justification(top, &analysis),
            capabilities: top.capabilities.clone(),
            model: top.clone(),
            fallbacks,
        }
    }

    // ── Suitability gate ────────────────────────────────────────────────

    fn is_suitable(
        &self,
        model: &ModelDescriptor,
        analysis: &TaskAnalysis,
        config: &RouteConfig,
    ) -> bool {
        if let Some(provider) = &config.preferred_provider {
            if &model.provider != provider {
                return false;
            }
        }
        if !self.health.is_eligible(&model.provider) {
            return false;
        }
        if analysis.requires_images && !model.supports_images {
            return false;
        }
        if analysis.requires_web_search
            && !model.supports_web_search
            && !model.has_capability(TaskCategory::General)
        {
            return false;
        }
        if analysis.requires_long_context && model.context_tokens < LONG_CONTEXT_MIN_TOKENS {
            return false;
        }
        if analysis.requires_speed && model.speed == SpeedTier::Slow {
            return false;
        }
        true
    }
}

// ── Scoring ─────────────────────────────────────────────────────────────

fn score_model(model: &ModelDescriptor, analysis: &TaskAnalysis) -> i32 {
    let mut score = model.priority;

    if model.has_capability(analysis.primary) {
        score += 30;
    }
    score += 10
        * analysis
            .secondary
            .iter()
            .filter(|c| model.has_capability(**c))
            .count() as i32;

    if analysis.requires_reasoning && model.supports_reasoning {
        score += 25;
    }

    if analysis.requires_speed {
        score += match model.speed {
            SpeedTier::UltraFast => 30,
            SpeedTier::Fast => 15,
            _ => 0,
        };
    }

    if matches!(analysis.primary, TaskCategory::Reasoning | TaskCategory::Coding) {
        score += match model.quality {
            QualityTier::TopTier => 20,
            QualityTier::Excellent => 10,
            _ => 0,
        };
    }

    if analysis.requires_long_context {
        if model.context_tokens >= 500_000 {
            score += 15;
        } else if model.context_tokens >= 100_000 {
            score += 10;
        }
    }

    if analysis.primary == TaskCategory::ToolUse && model.supports_function_calling {
        score += 25;
    }

    score
}

// ── Justification ───────────────────────────────────────────────────────

fn build_justification(model: &ModelDescriptor, analysis: &TaskAnalysis) -> String {
    let mut reasons = Vec::new();

    if model.has_capability(analysis.primary) {
        reasons.push(format!("optimized for {}", analysis.primary.label()));
    }
    if analysis.requires_reasoning && model.supports_reasoning {
        reasons.push("supports advanced reasoning".into());
    }
    if analysis.requires_speed
        && matches!(model.speed, SpeedTier::UltraFast | SpeedTier::Fast)
    {
        reasons.push("fast response time".into());
    }
    if analysis.requires_images && model.supports_images {
        reasons.push("multimodal support".into());
    }

    if reasons.is_empty() {
        "best general purpose option".into()
    } else {
        reasons.join(", ")
    }
}

// ── Tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::constants::DEFAULT_MODEL_ID;

    fn model(
        id: &str,
        provider: &str,
        capabilities: Vec<TaskCategory>,
        speed: SpeedTier,
        priority: i32,
    ) -> ModelDescriptor {
        ModelDescriptor {
            id: id.into(),
            name: id.into(),
            provider: provider.into(),
            capabilities,
            context_tokens: 128_000,
            speed,
            quality: QualityTier::Good,
            supports_reasoning: false,
            supports_images: false,
            supports_web_search: false,
            supports_function_calling: true,
            free_tier: false,
            priority,
        }
    }

    fn router_with(models: Vec<ModelDescriptor>) -> (Router, Arc<ProviderHealth>) {
        let health = Arc::new(ProviderHealth::new());
        let registry = Arc::new(ModelRegistry::new(models).unwrap());
        (Router::new(registry, Arc::clone(&health)), health)
    }

    fn default_entry() -> ModelDescriptor {
        model(
            DEFAULT_MODEL_ID,
            "openai",
            vec![TaskCategory::General, TaskCategory::Fast],
            SpeedTier::UltraFast,
            50,
        )
    }

    #[test]
    fn test_unhealthy_provider_excluded() {
        // Two providers, equally scored for a fast request.
        let mut default = default_entry();
        default.provider = "provider-a".into();
        let a = model("model-a", "provider-a", vec![TaskCategory::General], SpeedTier::Fast, 60);
        let b = model("model-b", "provider-b", vec![TaskCategory::General], SpeedTier::Fast, 60);
        let (router, health) = router_with(vec![default, a, b]);

        health.report_unhealthy("provider-a");

        let config = RouteConfig { latency_budget_ms: Some(1_000), ..Default::default() };
        let decision = router.select_model("hola", &config);
        assert_eq!(decision.model.id, "model-b");
    }

    #[test]
    fn test_slow_models_excluded_when_speed_required() {
        let slow = model(
            "slow-but-mighty",
            "provider-a",
            vec![TaskCategory::General],
            SpeedTier::Slow,
            999,
        );
        let (router, _) = router_with(vec![default_entry(), slow]);

        let config = RouteConfig { latency_budget_ms: Some(500), ..Default::default() };
        let decision = router.select_model("respuesta corta por favor", &config);
        assert_ne!(decision.model.id, "slow-but-mighty");
    }

    #[test]
    fn test_manual_mode() {
        let (router, _) = router_with(vec![
            default_entry(),
            model("picked", "provider-a", vec![TaskCategory::Coding], SpeedTier::Medium, 10),
            model("other-1", "provider-b", vec![TaskCategory::General], SpeedTier::Fast, 90),
            model("other-2", "provider-c", vec![TaskCategory::General], SpeedTier::Fast, 80),
        ]);

        let config = RouteConfig {
            mode: RoutingMode::Manual,
            preferred_model: Some("picked".into()),
            ..Default::default()
        };
        let decision = router.select_model("whatever", &config);
        assert_eq!(decision.model.id, "picked");
        assert_eq!(decision.justification, "Manual selection: picked");
        // Fallbacks come from distinct providers
        let providers: Vec<_> = decision.fallbacks.iter().map(|m| &m.provider).collect();
        assert!(providers.len() <= 3);
        for (i, p) in providers.iter().enumerate() {
            assert!(!providers[..i].contains(p));
        }
    }

    #[test]
    fn test_manual_mode_unknown_model_falls_back_to_auto() {
        let (router, _) = router_with(vec![default_entry()]);
        let config = RouteConfig {
            mode: RoutingMode::Manual,
            preferred_model: Some("does-not-exist".into()),
            ..Default::default()
        };
        let decision = router.select_model("hola", &config);
        assert_eq!(decision.model.id, DEFAULT_MODEL_ID);
    }

    #[test]
    fn test_no_survivors_degrades_to_default() {
        // Only the default entry exists, and its provider is preferred away.
        let (router, _) = router_with(vec![default_entry()]);
        let config = RouteConfig {
            preferred_provider: Some("no-such-provider".into()),
            ..Default::default()
        };
        let decision = router.select_model("hola", &config);
        assert_eq!(decision.model.id, DEFAULT_MODEL_ID);
        assert_eq!(decision.justification, "No suitable model found, using default");
    }

    #[test]
    fn test_math_gets_no_reasoning_bonus_without_reasoning() {
        // A model tagged reasoning-capable but without the math capability
        // must not collect the primary-capability or quality bonuses for a
        // pure math request.
        let mut reasoning_model = model(
            "thinker",
            "provider-a",
            vec![TaskCategory::Reasoning],
            SpeedTier::Medium,
            0,
        );
        reasoning_model.supports_reasoning = true;

        let analysis = classifier::classify("calcula la integral de x^2", &RouteConfig::default());
        assert_eq!(analysis.primary, TaskCategory::Math);

        let score = score_model(&reasoning_model, &analysis);
        assert_eq!(score, 0, "no capability match, no reasoning required: {score}");
    }

    #[test]
    fn test_scoring_prefers_primary_capability() {
        let coder = model("coder", "provider-a", vec![TaskCategory::Coding], SpeedTier::Medium, 10);
        let generalist =
            model("generalist", "provider-b", vec![TaskCategory::General], SpeedTier::Medium, 10);
        let (router, _) = router_with(vec![default_entry(), coder, generalist]);

        let decision = router.select_model("debug this function", &RouteConfig::default());
        assert_eq!(decision.model.id, "coder");
        assert!(decision.justification.contains("optimized for coding"));
    }

    #[test]
    fn test_fallbacks_are_ranked_and_capped() {
        let mut models = vec![default_entry()];
        for i in 0..6 {
            models.push(model(
                &format!("m{i}"),
                &format!("p{i}"),
                vec![TaskCategory::General],
                SpeedTier::Fast,
                10 * i,
            ));
        }
        let (router, _) = router_with(models);
        let decision = router.select_model("hola", &RouteConfig::default());
        assert_eq!(decision.fallbacks.len(), MAX_FALLBACKS);
        // Descending by score
        assert!(decision.model.priority >= decision.fallbacks[0].priority);
    }
}
