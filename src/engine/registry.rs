// Brio Assistant Engine — Model Registry
// Versioned catalogue of model descriptors: capability tags, speed/quality
// tiers, context capacity, priority weights. Constructed once at startup and
// passed by reference into the router — never a module-level global — so
// tests can inject their own catalogues.

use crate::atoms::constants::{DEFAULT_FALLBACK_IDS, DEFAULT_MODEL_ID};
use crate::atoms::error::{EngineError, EngineResult};
use crate::atoms::types::{ModelDescriptor, QualityTier, SpeedTier, TaskCategory};
use std::collections::HashMap;

/// Immutable model catalogue with id-indexed lookups.
pub struct ModelRegistry {
    models: Vec<ModelDescriptor>,
    by_id: HashMap<String, usize>,
}

impl ModelRegistry {
    /// Validate and index a catalogue.
    ///
    /// Fails on duplicate ids or a missing default model — both are fatal
    /// startup conditions, never per-request ones.
    pub fn new(models: Vec<ModelDescriptor>) -> EngineResult<Self> {
        let mut by_id = HashMap::with_capacity(models.len());
        for (i, m) in models.iter().enumerate() {
            if by_id.insert(m.id.clone(), i).is_some() {
                return Err(EngineError::Config(format!(
                    "duplicate model id in registry: {}",
                    m.id
                )));
            }
        }
        if !by_id.contains_key(DEFAULT_MODEL_ID) {
            return Err(EngineError::Config(format!(
                "registry is missing the default model: {DEFAULT_MODEL_ID}"
            )));
        }
        Ok(ModelRegistry { models, by_id })
    }

    /// The production catalogue.
    pub fn builtin() -> Self {
        // builtin_models() always contains DEFAULT_MODEL_ID with unique ids,
        // so validation cannot fail here.
        ModelRegistry::new(builtin_models()).expect("builtin catalogue is valid")
    }

    pub fn get(&self, id: &str) -> Option<&ModelDescriptor> {
        self.by_id.get(id).map(|&i| &self.models[i])
    }

    pub fn all(&self) -> &[ModelDescriptor] {
        &self.models
    }

    /// The hard-coded degradation target when routing finds no candidate.
    pub fn default_model(&self) -> &ModelDescriptor {
        self.get(DEFAULT_MODEL_ID)
            .expect("validated at construction")
    }

    /// The fixed two-entry fallback list used with the default model.
    /// Entries missing from a custom catalogue are simply omitted.
    pub fn default_fallbacks(&self) -> Vec<ModelDescriptor> {
        DEFAULT_FALLBACK_IDS
            .iter()
            .filter_map(|id| self.get(id).cloned())
            .collect()
    }

    /// Highest-priority models across distinct providers, best first.
    /// Used as the fallback list for manual selections.
    pub fn top_by_distinct_provider(&self, count: usize, exclude_id: &str) -> Vec<ModelDescriptor> {
        let mut sorted: Vec<&ModelDescriptor> =
            self.models.iter().filter(|m| m.id != exclude_id).collect();
        sorted.sort_by(|a, b| b.priority.cmp(&a.priority));

        let mut seen_providers = Vec::new();
        let mut picks = Vec::new();
        for m in sorted {
            if seen_providers.contains(&m.provider.as_str()) {
                continue;
            }
            seen_providers.push(m.provider.as_str());
            picks.push(m.clone());
            if picks.len() == count {
                break;
            }
        }
        picks
    }
}

// ── Builtin catalogue ───────────────────────────────────────────────────
// Data only. Capability tags and tiers are coarse editorial judgments;
// context capacities follow the providers' published limits.

fn builtin_models() -> Vec<ModelDescriptor> {
    use QualityTier::*;
    use SpeedTier::*;
    use TaskCategory::*;

    let m = |id: &str,
             name: &str,
             provider: &str,
             capabilities: Vec<TaskCategory>,
             context_tokens: u32,
             speed: SpeedTier,
             quality: QualityTier,
             flags: (bool, bool, bool, bool), // reasoning, images, web search, function calling
             free_tier: bool,
             priority: i32| ModelDescriptor {
        id: id.into(),
        name: name.into(),
        provider: provider.into(),
        capabilities,
        context_tokens,
        speed,
        quality,
        supports_reasoning: flags.0,
        supports_images: flags.1,
        supports_web_search: flags.2,
        supports_function_calling: flags.3,
        free_tier,
        priority,
    };

    vec![
        m(
            "gpt-4o",
            "GPT-4o",
            "openai",
            vec![General, Coding, Reasoning, ImageAnalysis, ToolUse, Creative],
            128_000,
            SpeedTier::Fast,
            Excellent,
            (true, true, false, true),
            false,
            80,
        ),
        m(
            "gpt-4o-mini",
            "GPT-4o mini",
            "openai",
            vec![General, TaskCategory::Fast, Summarization, Translation, ToolUse],
            128_000,
            UltraFast,
            Good,
            (false, true, false, true),
            true,
            70,
        ),
        m(
            "o3-mini",
            "o3-mini",
            "openai",
            vec![Reasoning, Math, Coding, DataAnalysis],
            200_000,
            Medium,
            TopTier,
            (true, false, false, true),
            false,
            75,
        ),
        m(
            "claude-sonnet-4",
            "Claude Sonnet 4",
            "anthropic",
            vec![General, Coding, Reasoning, Creative, Document, ImageAnalysis],
            200_000,
            SpeedTier::Fast,
            TopTier,
            (true, true, false, true),
            false,
            85,
        ),
        m(
            "claude-3-5-haiku",
            "Claude 3.5 Haiku",
            "anthropic",
            vec![General, TaskCategory::Fast, Summarization, Translation],
            200_000,
            UltraFast,
            Good,
            (false, true, false, true),
            false,
            65,
        ),
        m(
            "gemini-2.0-flash",
            "Gemini 2.0 Flash",
            "google",
            vec![General, TaskCategory::Fast, ImageAnalysis, WebSearch, Summarization],
            1_000_000,
            UltraFast,
            Good,
            (false, true, true, true),
            true,
            72,
        ),
        m(
            "gemini-2.5-pro",
            "Gemini 2.5 Pro",
            "google",
            vec![General, Reasoning, Math, DataAnalysis, Document, ImageAnalysis, WebSearch],
            1_000_000,
            Medium,
            TopTier,
            (true, true, true, true),
            false,
            82,
        ),
        m(
            "llama-3.3-70b",
            "Llama 3.3 70B",
            "groq",
            vec![General, TaskCategory::Fast, Coding, Translation],
            128_000,
            UltraFast,
            Good,
            (false, false, false, true),
            true,
            60,
        ),
        m(
            "deepseek-r1",
            "DeepSeek R1",
            "deepseek",
            vec![Reasoning, Math, Coding, DataAnalysis],
            64_000,
            Slow,
            Excellent,
            (true, false, false, false),
            true,
            58,
        ),
        m(
            "deepseek-v3",
            "DeepSeek V3",
            "deepseek",
            vec![General, Coding, Translation],
            64_000,
            Medium,
            Good,
            (false, false, false, true),
            true,
            55,
        ),
        m(
            "mistral-large",
            "Mistral Large",
            "mistral",
            vec![General, Coding, Translation, Summarization],
            128_000,
            Medium,
            Excellent,
            (false, false, false, true),
            false,
            62,
        ),
        m(
            "dall-e-3",
            "DALL·E 3",
            "openai",
            vec![ImageGeneration, Creative],
            4_000,
            Slow,
            Excellent,
            (false, false, false, false),
            false,
            40,
        ),
    ]
}

// ── Tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_model(id: &str, provider: &str, priority: i32) -> ModelDescriptor {
        ModelDescriptor {
            id: id.into(),
            name: id.into(),
            provider: provider.into(),
            capabilities: vec![TaskCategory::General],
            context_tokens: 32_000,
            speed: SpeedTier::Fast,
            quality: QualityTier::Good,
            supports_reasoning: false,
            supports_images: false,
            supports_web_search: false,
            supports_function_calling: false,
            free_tier: false,
            priority,
        }
    }

    #[test]
    fn test_builtin_is_valid() {
        let reg = ModelRegistry::builtin();
        assert_eq!(reg.default_model().id, DEFAULT_MODEL_ID);
        assert_eq!(reg.default_fallbacks().len(), 2);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let models = vec![tiny_model(DEFAULT_MODEL_ID, "a", 1), tiny_model(DEFAULT_MODEL_ID, "b", 2)];
        assert!(matches!(ModelRegistry::new(models), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_missing_default_rejected() {
        let models = vec![tiny_model("some-model", "a", 1)];
        assert!(matches!(ModelRegistry::new(models), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_top_by_distinct_provider() {
        let reg = ModelRegistry::builtin();
        let picks = reg.top_by_distinct_provider(3, "gpt-4o");
        assert_eq!(picks.len(), 3);
        let providers: Vec<_> = picks.iter().map(|m| m.provider.as_str()).collect();
        let mut deduped = providers.clone();
        deduped.dedup();
        assert_eq!(providers, deduped, "providers must be distinct");
        // Best-priority model overall is claude-sonnet-4 (85)
        assert_eq!(picks[0].id, "claude-sonnet-4");
    }
}
