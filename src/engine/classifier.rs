// Brio Assistant Engine — Task Classifier
// Maps a natural-language request plus caller configuration into a
// TaskAnalysis. Pure and deterministic — keyword heuristics over the
// lower-cased message, no ML model, no I/O.
//
// The category → matcher table is deliberately declarative so it can be
// swapped for a learned classifier later without touching the router.
// Matchers cover English and Spanish; the assistant serves both.

use crate::atoms::constants::{
    CONTEXT_LONG_CHARS, CONTEXT_MEDIUM_CHARS, CONTEXT_ULTRA_LONG_CHARS, SPEED_LATENCY_BUDGET_MS,
};
use crate::atoms::types::{ContextBucket, RouteConfig, TaskAnalysis, TaskCategory};

// ── Pattern table ───────────────────────────────────────────────────────
// One group per category; a category is "detected" when any keyword in its
// group appears in the lower-cased message. Table order decides which
// detected category becomes primary when none is on the priority list.

const CATEGORY_PATTERNS: &[(TaskCategory, &[&str])] = &[
    (
        TaskCategory::Coding,
        &[
            "code", "function", "debug", "refactor", "compile", "script", "programa",
            "código", "codigo", "bug", "implement", "regex", "sql", "python",
            "javascript", "typescript", "rust", "endpoint", "api rest",
        ],
    ),
    (
        TaskCategory::Reasoning,
        &[
            "explain why", "reason about", "step by step", "paso a paso", "logic",
            "razonamiento", "razona", "argumento", "deduce", "think through",
            "pros and cons", "ventajas y desventajas",
        ],
    ),
    (
        TaskCategory::DataAnalysis,
        &[
            "analyze data", "dataset", "statistics", "estadística", "estadisticas",
            "analiza los datos", "análisis de", "analisis de", "trend", "tendencia",
            "csv", "spreadsheet", "average", "promedio", "metrics", "métricas",
        ],
    ),
    (
        TaskCategory::ImageAnalysis,
        &[
            "this image", "this photo", "esta imagen", "esta foto", "in the picture",
            "describe the image", "describe la imagen", "what do you see",
            "qué ves", "que ves",
        ],
    ),
    (
        TaskCategory::ImageGeneration,
        &[
            "generate an image", "genera una imagen", "draw", "dibuja", "illustration",
            "ilustración", "logo", "create a picture", "crea una imagen",
        ],
    ),
    (
        TaskCategory::WebSearch,
        &[
            "search for", "search the web", "busca en", "búscame", "buscame",
            "look up", "latest news", "últimas noticias", "ultimas noticias",
            "current price", "precio actual", "what's happening", "qué está pasando",
        ],
    ),
    (
        TaskCategory::ToolUse,
        &[
            "create a task", "crea una tarea", "schedule", "agenda", "agéndame",
            "remind me", "recuérdame", "recuerdame", "send a notification",
            "envía una notificación", "envia una notificacion", "registra",
            "add to my calendar", "añade a mi calendario",
        ],
    ),
    (
        TaskCategory::Math,
        &[
            "calculate", "calcula", "integral", "derivative", "derivada", "equation",
            "ecuación", "ecuacion", "solve", "resuelve", "probability", "probabilidad",
            "percentage", "porcentaje", "matemática", "matematica",
        ],
    ),
    (
        TaskCategory::Creative,
        &[
            "story", "poem", "poema", "cuento", "lyrics", "slogan", "eslogan",
            "brainstorm ideas", "escribe una historia", "creative",
        ],
    ),
    (
        TaskCategory::Document,
        &[
            "document", "documento", "contract", "contrato", "report", "informe",
            "redacta", "draft a", "memo", "carta formal",
        ],
    ),
    (
        TaskCategory::Translation,
        &[
            "translate", "traduce", "traducción", "traduccion", "in english",
            "al inglés", "al ingles", "al español", "al espanol",
        ],
    ),
    (
        TaskCategory::Summarization,
        &[
            "summarize", "summary", "resume este", "resumen", "tl;dr", "sintetiza",
            "en pocas palabras",
        ],
    ),
    (
        TaskCategory::Fast,
        &[
            "quick", "quickly", "rápido", "rapido", "rápida", "urgent", "urgente",
            "asap", "brevemente", "short answer", "respuesta corta",
        ],
    ),
];

/// Categories that always win the primary slot when detected, in order.
const PRIMARY_PRIORITY: &[TaskCategory] = &[
    TaskCategory::Coding,
    TaskCategory::Reasoning,
    TaskCategory::DataAnalysis,
    TaskCategory::ImageAnalysis,
    TaskCategory::WebSearch,
    TaskCategory::ToolUse,
    TaskCategory::Math,
];

// ── Classification ──────────────────────────────────────────────────────

/// Classify a message into a task profile.
pub fn classify(message: &str, config: &RouteConfig) -> TaskAnalysis {
    let lower = message.to_lowercase();

    let detected: Vec<TaskCategory> = CATEGORY_PATTERNS
        .iter()
        .filter(|(_, keywords)| contains_any(&lower, keywords))
        .map(|(category, _)| *category)
        .collect();

    let primary = PRIMARY_PRIORITY
        .iter()
        .copied()
        .find(|c| detected.contains(c))
        .or_else(|| detected.first().copied())
        .unwrap_or(TaskCategory::General);

    let secondary: Vec<TaskCategory> = detected
        .iter()
        .copied()
        .filter(|c| *c != primary)
        .collect();

    let computed_bucket = bucket_for_length(message.len());
    // Caller-supplied bucket overrides the computed one for the flags only.
    let effective_bucket = config.context_bucket.unwrap_or(computed_bucket);

    let requires_speed = detected.contains(&TaskCategory::Fast)
        || config
            .latency_budget_ms
            .map(|ms| ms < SPEED_LATENCY_BUDGET_MS)
            .unwrap_or(false);

    TaskAnalysis {
        primary,
        requires_reasoning: detected.contains(&TaskCategory::Reasoning) || config.require_reasoning,
        requires_images: detected.contains(&TaskCategory::ImageAnalysis) || config.require_images,
        requires_web_search: detected.contains(&TaskCategory::WebSearch)
            || config.require_web_search,
        requires_long_context: effective_bucket >= ContextBucket::Long,
        requires_speed,
        context_bucket: computed_bucket,
        secondary,
    }
}

fn bucket_for_length(chars: usize) -> ContextBucket {
    if chars > CONTEXT_ULTRA_LONG_CHARS {
        ContextBucket::UltraLong
    } else if chars > CONTEXT_LONG_CHARS {
        ContextBucket::Long
    } else if chars > CONTEXT_MEDIUM_CHARS {
        ContextBucket::Medium
    } else {
        ContextBucket::Short
    }
}

fn contains_any(s: &str, terms: &[&str]) -> bool {
    terms.iter().any(|t| s.contains(t))
}

// ── Tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coding_wins_priority() {
        let a = classify("debug this function quickly please", &RouteConfig::default());
        assert_eq!(a.primary, TaskCategory::Coding);
        assert!(a.secondary.contains(&TaskCategory::Fast));
        assert!(a.requires_speed);
    }

    #[test]
    fn test_spanish_math() {
        let a = classify("calcula la integral de x^2", &RouteConfig::default());
        assert_eq!(a.primary, TaskCategory::Math);
        assert!(!a.requires_reasoning);
    }

    #[test]
    fn test_general_fallback() {
        let a = classify("hola, ¿cómo estás?", &RouteConfig::default());
        assert_eq!(a.primary, TaskCategory::General);
        assert!(a.secondary.is_empty());
    }

    #[test]
    fn test_non_priority_first_detected_wins() {
        let a = classify("traduce este poema al inglés", &RouteConfig::default());
        // Creative appears earlier in the table than Translation
        assert_eq!(a.primary, TaskCategory::Creative);
        assert!(a.secondary.contains(&TaskCategory::Translation));
    }

    #[test]
    fn test_context_buckets() {
        let short = classify("hi", &RouteConfig::default());
        assert_eq!(short.context_bucket, ContextBucket::Short);
        assert!(!short.requires_long_context);

        let medium = classify(&"a".repeat(501), &RouteConfig::default());
        assert_eq!(medium.context_bucket, ContextBucket::Medium);

        let long = classify(&"a".repeat(3_001), &RouteConfig::default());
        assert_eq!(long.context_bucket, ContextBucket::Long);
        assert!(long.requires_long_context);

        let ultra = classify(&"a".repeat(10_001), &RouteConfig::default());
        assert_eq!(ultra.context_bucket, ContextBucket::UltraLong);
    }

    #[test]
    fn test_bucket_override_affects_flags_only() {
        let config = RouteConfig {
            context_bucket: Some(ContextBucket::UltraLong),
            ..Default::default()
        };
        let a = classify("hi", &config);
        assert!(a.requires_long_context);
        // The recorded bucket still reflects the actual message length
        assert_eq!(a.context_bucket, ContextBucket::Short);
    }

    #[test]
    fn test_config_overrides_or_with_detection() {
        let config = RouteConfig {
            require_images: true,
            require_web_search: true,
            ..Default::default()
        };
        let a = classify("hola", &config);
        assert!(a.requires_images);
        assert!(a.requires_web_search);
    }

    #[test]
    fn test_latency_budget_flips_speed() {
        let tight = RouteConfig { latency_budget_ms: Some(2_000), ..Default::default() };
        assert!(classify("hola", &tight).requires_speed);

        let loose = RouteConfig { latency_budget_ms: Some(5_000), ..Default::default() };
        assert!(!classify("hola", &loose).requires_speed);
    }

    #[test]
    fn test_classifier_is_deterministic() {
        let config = RouteConfig::default();
        let a = classify("busca en internet las últimas noticias", &config);
        let b = classify("busca en internet las últimas noticias", &config);
        assert_eq!(a.primary, b.primary);
        assert_eq!(a.secondary, b.secondary);
    }
}
