// Brio Assistant Engine — Adaptive Learning Store
// Confidence- and effectiveness-weighted behavioral signals per user:
// preferences, patterns, and memories. Advisory input to routing and
// prompt construction, never a hard dependency — every method catches
// store failures, logs them, and degrades to an empty result or a no-op.

use crate::atoms::constants::{
    MEMORY_IMPORTANCE_NEGATIVE, MEMORY_IMPORTANCE_NEUTRAL, MEMORY_IMPORTANCE_POSITIVE,
    MEMORY_RECALL_LIMIT, PATTERN_EFFECTIVENESS_FLOOR, PATTERN_FAILURE_STEP,
    PATTERN_INITIAL_EFFECTIVENESS, PATTERN_SUCCESS_STEP, PREFERENCE_CONFIDENCE_FLOOR,
    PREFERENCE_CONFIDENCE_STEP, PREFERENCE_INITIAL_CONFIDENCE,
};
use crate::atoms::error::EngineResult;
use crate::atoms::types::{
    FeedbackSignal, LearnedPattern, LearnedPreference, LearningContext, MemoryEntry,
};
use crate::engine::store::{DocumentStore, Query, SortOrder};
use chrono::Utc;
use log::{info, warn};
use serde_json::Value;
use std::sync::Arc;

const PREFERENCES: &str = "preferences";
const PATTERNS: &str = "patterns";
const MEMORIES: &str = "memories";

pub struct LearningStore {
    store: Arc<dyn DocumentStore>,
}

impl LearningStore {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        LearningStore { store }
    }

    // ── Preferences ──────────────────────────────────────────────────────

    /// Record one observation of a (category, key) preference. First
    /// observation creates the record at the initial confidence; each
    /// repeat bumps confidence by a fixed step (capped at 1.0), increments
    /// the observation count, and overwrites the value.
    pub async fn observe(&self, user_id: &str, category: &str, key: &str, value: Value) {
        if let Err(e) = self.try_observe(user_id, category, key, value).await {
            warn!("[learning] observe failed for {user_id}/{category}/{key}: {e}");
        }
    }

    async fn try_observe(
        &self,
        user_id: &str,
        category: &str,
        key: &str,
        value: Value,
    ) -> EngineResult<()> {
        let existing = self
            .store
            .query(
                user_id,
                PREFERENCES,
                &Query::default()
                    .eq("user_id", user_id)
                    .eq("category", category)
                    .eq("key", key),
            )
            .await?;

        match existing.first() {
            Some(doc) => {
                let mut pref: LearnedPreference = serde_json::from_value(doc.body.clone())?;
                pref.confidence = (pref.confidence + PREFERENCE_CONFIDENCE_STEP).min(1.0);
                pref.observations += 1;
                pref.value = value;
                pref.updated_at = Utc::now();
                self.store
                    .update(user_id, PREFERENCES, &doc.id, serde_json::to_value(&pref)?)
                    .await?;
            }
            None => {
                let pref = LearnedPreference {
                    user_id: user_id.to_string(),
                    category: category.to_string(),
                    key: key.to_string(),
                    value,
                    confidence: PREFERENCE_INITIAL_CONFIDENCE,
                    observations: 1,
                    updated_at: Utc::now(),
                };
                self.store
                    .append(user_id, PREFERENCES, serde_json::to_value(&pref)?)
                    .await?;
            }
        }
        Ok(())
    }

    // ── Patterns ─────────────────────────────────────────────────────────

    /// Record one occurrence of a behavioral pattern. Created at neutral
    /// effectiveness; repeats bump frequency and refresh context/timestamp.
    /// Returns the pattern id for later reinforcement, when the write
    /// succeeded.
    pub async fn observe_pattern(
        &self,
        user_id: &str,
        pattern_type: &str,
        pattern_key: &str,
        context: &str,
    ) -> Option<String> {
        match self
            .try_observe_pattern(user_id, pattern_type, pattern_key, context)
            .await
        {
            Ok(id) => Some(id),
            Err(e) => {
                warn!("[learning] observe_pattern failed for {user_id}/{pattern_type}: {e}");
                None
            }
        }
    }

    async fn try_observe_pattern(
        &self,
        user_id: &str,
        pattern_type: &str,
        pattern_key: &str,
        context: &str,
    ) -> EngineResult<String> {
        let existing = self
            .store
            .query(
                user_id,
                PATTERNS,
                &Query::default()
                    .eq("user_id", user_id)
                    .eq("pattern_type", pattern_type)
                    .eq("pattern_key", pattern_key),
            )
            .await?;

        match existing.first() {
            Some(doc) => {
                let mut pattern: LearnedPattern = serde_json::from_value(doc.body.clone())?;
                pattern.frequency += 1;
                pattern.last_occurred = Utc::now();
                pattern.context = context.to_string();
                let id = pattern.id.clone();
                self.store
                    .update(user_id, PATTERNS, &doc.id, serde_json::to_value(&pattern)?)
                    .await?;
                Ok(id)
            }
            None => {
                let pattern = LearnedPattern {
                    id: uuid::Uuid::new_v4().to_string(),
                    user_id: user_id.to_string(),
                    pattern_type: pattern_type.to_string(),
                    pattern_key: pattern_key.to_string(),
                    frequency: 1,
                    effectiveness: PATTERN_INITIAL_EFFECTIVENESS,
                    last_occurred: Utc::now(),
                    context: context.to_string(),
                };
                let id = pattern.id.clone();
                self.store
                    .append(user_id, PATTERNS, serde_json::to_value(&pattern)?)
                    .await?;
                Ok(id)
            }
        }
    }

    /// Adjust a pattern's effectiveness from explicit outcome feedback:
    /// +0.1 on success, −0.05 on failure, clamped to [0, 1].
    pub async fn reinforce(&self, user_id: &str, pattern_id: &str, success: bool) {
        if let Err(e) = self.try_reinforce(user_id, pattern_id, success).await {
            warn!("[learning] reinforce failed for pattern {pattern_id}: {e}");
        }
    }

    async fn try_reinforce(
        &self,
        user_id: &str,
        pattern_id: &str,
        success: bool,
    ) -> EngineResult<()> {
        let existing = self
            .store
            .query(user_id, PATTERNS, &Query::default().eq("id", pattern_id))
            .await?;
        let Some(doc) = existing.first() else {
            return Ok(()); // unknown pattern: advisory store, not an error
        };

        let mut pattern: LearnedPattern = serde_json::from_value(doc.body.clone())?;
        pattern.effectiveness = if success {
            (pattern.effectiveness + PATTERN_SUCCESS_STEP).min(1.0)
        } else {
            (pattern.effectiveness - PATTERN_FAILURE_STEP).max(0.0)
        };
        self.store
            .update(user_id, PATTERNS, &doc.id, serde_json::to_value(&pattern)?)
            .await?;
        Ok(())
    }

    // ── Memories ─────────────────────────────────────────────────────────

    /// Remember a fact about the user. Importance derives from the
    /// creation-time feedback signal and is never recomputed.
    pub async fn remember(
        &self,
        user_id: &str,
        content: &str,
        content_type: &str,
        signal: FeedbackSignal,
    ) {
        let importance = match signal {
            FeedbackSignal::Positive => MEMORY_IMPORTANCE_POSITIVE,
            FeedbackSignal::Neutral => MEMORY_IMPORTANCE_NEUTRAL,
            FeedbackSignal::Negative => MEMORY_IMPORTANCE_NEGATIVE,
        };
        let now = Utc::now();
        let entry = MemoryEntry {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            content: content.to_string(),
            content_type: content_type.to_string(),
            importance,
            access_count: 0,
            created_at: now,
            last_accessed: now,
        };
        let body = match serde_json::to_value(&entry) {
            Ok(b) => b,
            Err(e) => {
                warn!("[learning] remember failed to serialize: {e}");
                return;
            }
        };
        if let Err(e) = self.store.append(user_id, MEMORIES, body).await {
            warn!("[learning] remember failed for {user_id}: {e}");
        }
    }

    /// Search memories by substring, or fall back to the most recent ones.
    /// Reading bumps each returned memory's access bookkeeping.
    pub async fn recall(&self, user_id: &str, query: Option<&str>, limit: usize) -> Vec<MemoryEntry> {
        match self.try_recall(user_id, query, limit).await {
            Ok(memories) => memories,
            Err(e) => {
                warn!("[learning] recall failed for {user_id}: {e}");
                Vec::new()
            }
        }
    }

    async fn try_recall(
        &self,
        user_id: &str,
        query: Option<&str>,
        limit: usize,
    ) -> EngineResult<Vec<MemoryEntry>> {
        let docs = self
            .store
            .query(
                user_id,
                MEMORIES,
                &Query::default()
                    .eq("user_id", user_id)
                    .order("created_at", SortOrder::Desc),
            )
            .await?;

        let needle = query.map(str::to_lowercase);
        let mut selected = Vec::new();
        for doc in docs {
            let Ok(mut entry) = serde_json::from_value::<MemoryEntry>(doc.body.clone()) else {
                continue;
            };
            if let Some(needle) = &needle {
                if !entry.content.to_lowercase().contains(needle.as_str()) {
                    continue;
                }
            }
            entry.access_count += 1;
            entry.last_accessed = Utc::now();
            // Best-effort bookkeeping; a failed bump never hides the memory.
            if let Ok(body) = serde_json::to_value(&entry) {
                self.store.update(user_id, MEMORIES, &doc.id, body).await.ok();
            }
            selected.push(entry);
            if selected.len() == limit {
                break;
            }
        }
        Ok(selected)
    }

    // ── Context assembly ─────────────────────────────────────────────────

    /// Gather the advisory bundle for prompt construction. The three reads
    /// are independent and issued concurrently; each degrades to empty on
    /// failure. Only confident preferences and effective patterns survive
    /// the filter.
    pub async fn build_context(&self, user_id: &str, query: Option<&str>) -> LearningContext {
        let (preferences, patterns, memories) = tokio::join!(
            self.confident_preferences(user_id),
            self.effective_patterns(user_id),
            self.recall(user_id, query, MEMORY_RECALL_LIMIT),
        );

        info!(
            "[learning] context for {user_id}: {} preference(s), {} pattern(s), {} memorie(s)",
            preferences.len(),
            patterns.len(),
            memories.len()
        );

        LearningContext { preferences, patterns, memories }
    }

    async fn confident_preferences(&self, user_id: &str) -> Vec<LearnedPreference> {
        let docs = match self
            .store
            .query(user_id, PREFERENCES, &Query::default().eq("user_id", user_id))
            .await
        {
            Ok(docs) => docs,
            Err(e) => {
                warn!("[learning] preference read failed for {user_id}: {e}");
                return Vec::new();
            }
        };
        docs.into_iter()
            .filter_map(|d| serde_json::from_value::<LearnedPreference>(d.body).ok())
            .filter(|p| p.confidence > PREFERENCE_CONFIDENCE_FLOOR)
            .collect()
    }

    async fn effective_patterns(&self, user_id: &str) -> Vec<LearnedPattern> {
        let docs = match self
            .store
            .query(user_id, PATTERNS, &Query::default().eq("user_id", user_id))
            .await
        {
            Ok(docs) => docs,
            Err(e) => {
                warn!("[learning] pattern read failed for {user_id}: {e}");
                return Vec::new();
            }
        };
        docs.into_iter()
            .filter_map(|d| serde_json::from_value::<LearnedPattern>(d.body).ok())
            .filter(|p| p.effectiveness > PATTERN_EFFECTIVENESS_FLOOR)
            .collect()
    }

    /// Fetch a preference without the confidence filter (used by tests and
    /// by callers inspecting raw state).
    pub async fn preference(
        &self,
        user_id: &str,
        category: &str,
        key: &str,
    ) -> Option<LearnedPreference> {
        let docs = self
            .store
            .query(
                user_id,
                PREFERENCES,
                &Query::default()
                    .eq("user_id", user_id)
                    .eq("category", category)
                    .eq("key", key),
            )
            .await
            .ok()?;
        docs.first()
            .and_then(|d| serde_json::from_value(d.body.clone()).ok())
    }

    /// Fetch a pattern by id regardless of effectiveness.
    pub async fn pattern(&self, user_id: &str, pattern_id: &str) -> Option<LearnedPattern> {
        let docs = self
            .store
            .query(user_id, PATTERNS, &Query::default().eq("id", pattern_id))
            .await
            .ok()?;
        docs.first()
            .and_then(|d| serde_json::from_value(d.body.clone()).ok())
    }
}

// ── Tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::store::SqliteStore;
    use serde_json::json;

    fn learning() -> LearningStore {
        LearningStore::new(Arc::new(SqliteStore::open_in_memory().unwrap()))
    }

    #[tokio::test]
    async fn test_confidence_growth_law() {
        let learning = learning();
        for n in 1..=10u32 {
            learning.observe("u", "style", "tone", json!("formal")).await;
            let pref = learning.preference("u", "style", "tone").await.unwrap();
            let expected = (0.3 + 0.1 * (n as f64 - 1.0)).min(1.0);
            assert!(
                (pref.confidence - expected).abs() < 1e-9,
                "after {n} observations: {} vs {expected}",
                pref.confidence
            );
            assert_eq!(pref.observations, n);
        }
    }

    #[tokio::test]
    async fn test_observation_overwrites_value() {
        let learning = learning();
        learning.observe("u", "style", "tone", json!("formal")).await;
        learning.observe("u", "style", "tone", json!("casual")).await;
        let pref = learning.preference("u", "style", "tone").await.unwrap();
        assert_eq!(pref.value, json!("casual"));
    }

    #[tokio::test]
    async fn test_effectiveness_feedback_law() {
        let learning = learning();
        let id = learning
            .observe_pattern("u", "routing", "coding:gpt-4o", "debug request")
            .await
            .unwrap();

        // 3 successes, 2 failures: 0.5 + 0.3 - 0.1 = 0.7
        for _ in 0..3 {
            learning.reinforce("u", &id, true).await;
        }
        for _ in 0..2 {
            learning.reinforce("u", &id, false).await;
        }

        let pattern = learning.pattern("u", &id).await.unwrap();
        assert!((pattern.effectiveness - 0.7).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_effectiveness_clamped() {
        let learning = learning();
        let id = learning.observe_pattern("u", "routing", "k", "ctx").await.unwrap();
        for _ in 0..20 {
            learning.reinforce("u", &id, false).await;
        }
        let pattern = learning.pattern("u", &id).await.unwrap();
        assert_eq!(pattern.effectiveness, 0.0);

        for _ in 0..30 {
            learning.reinforce("u", &id, true).await;
        }
        let pattern = learning.pattern("u", &id).await.unwrap();
        assert_eq!(pattern.effectiveness, 1.0);
    }

    #[tokio::test]
    async fn test_pattern_repeat_bumps_frequency_not_effectiveness() {
        let learning = learning();
        let id = learning.observe_pattern("u", "routing", "k", "first").await.unwrap();
        let same = learning.observe_pattern("u", "routing", "k", "second").await.unwrap();
        assert_eq!(id, same, "same composite key upserts");

        let pattern = learning.pattern("u", &id).await.unwrap();
        assert_eq!(pattern.frequency, 2);
        assert_eq!(pattern.context, "second");
        assert!((pattern.effectiveness - 0.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_memory_importance_from_signal() {
        let learning = learning();
        learning.remember("u", "prefers morning meetings", "preference", FeedbackSignal::Positive).await;
        learning.remember("u", "mentioned a dog", "fact", FeedbackSignal::Negative).await;

        let memories = learning.recall("u", None, 10).await;
        assert_eq!(memories.len(), 2);
        let by_content = |needle: &str| {
            memories.iter().find(|m| m.content.contains(needle)).unwrap().importance
        };
        assert_eq!(by_content("morning"), 0.8);
        assert_eq!(by_content("dog"), 0.2);
    }

    #[tokio::test]
    async fn test_recall_bumps_access_count() {
        let learning = learning();
        learning.remember("u", "uses CRM daily", "fact", FeedbackSignal::Neutral).await;

        learning.recall("u", None, 10).await;
        let memories = learning.recall("u", None, 10).await;
        assert_eq!(memories[0].access_count, 2);
    }

    #[tokio::test]
    async fn test_recall_search_filters() {
        let learning = learning();
        learning.remember("u", "invoice template is v2", "fact", FeedbackSignal::Neutral).await;
        learning.remember("u", "prefers spanish", "preference", FeedbackSignal::Neutral).await;

        let hits = learning.recall("u", Some("invoice"), 10).await;
        assert_eq!(hits.len(), 1);
        assert!(hits[0].content.contains("invoice"));
    }

    #[tokio::test]
    async fn test_build_context_filters_weak_signals() {
        let learning = learning();
        // One observation: confidence 0.3, filtered out.
        learning.observe("u", "style", "tone", json!("formal")).await;
        // Four observations: confidence 0.6, kept.
        for _ in 0..4 {
            learning.observe("u", "format", "lists", json!(true)).await;
        }
        // Neutral pattern (0.5) filtered; reinforced one kept.
        learning.observe_pattern("u", "routing", "weak", "ctx").await;
        let strong = learning.observe_pattern("u", "routing", "strong", "ctx").await.unwrap();
        learning.reinforce("u", &strong, true).await;

        let ctx = learning.build_context("u", None).await;
        assert_eq!(ctx.preferences.len(), 1);
        assert_eq!(ctx.preferences[0].key, "lists");
        assert_eq!(ctx.patterns.len(), 1);
        assert_eq!(ctx.patterns[0].pattern_key, "strong");
    }
}
