// Brio Assistant Engine — Provider Health Tracker
// Shared per-provider health state consumed by the router's filter stage.
// An injected, lock-protected instance — never a process-wide global — so
// concurrent request handlers can report without corruption and tests can
// construct isolated trackers.

use crate::atoms::constants::HEALTH_COOLDOWN_SECS;
use chrono::{DateTime, Duration, Utc};
use log::{info, warn};
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct HealthRecord {
    healthy: bool,
    last_check: DateTime<Utc>,
    consecutive_failures: u32,
}

/// Tracks per-provider health with a fixed cool-down window.
///
/// Once marked unhealthy, a provider is excluded from candidate selection
/// for `HEALTH_COOLDOWN_SECS` measured from the report; after the window it
/// becomes implicitly eligible again without an explicit healthy report.
#[derive(Default)]
pub struct ProviderHealth {
    records: RwLock<HashMap<String, HealthRecord>>,
}

impl ProviderHealth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report_unhealthy(&self, provider: &str) {
        self.report_unhealthy_at(provider, Utc::now());
    }

    pub fn report_healthy(&self, provider: &str) {
        self.report_healthy_at(provider, Utc::now());
    }

    pub fn is_eligible(&self, provider: &str) -> bool {
        self.is_eligible_at(provider, Utc::now())
    }

    /// Consecutive failure count, for callers deciding on escalation.
    pub fn failure_count(&self, provider: &str) -> u32 {
        self.records
            .read()
            .get(provider)
            .map(|r| r.consecutive_failures)
            .unwrap_or(0)
    }

    // ── Clock-explicit variants (used by tests) ─────────────────────────

    pub fn report_unhealthy_at(&self, provider: &str, now: DateTime<Utc>) {
        let mut records = self.records.write();
        let record = records.entry(provider.to_string()).or_insert(HealthRecord {
            healthy: true,
            last_check: now,
            consecutive_failures: 0,
        });
        record.healthy = false;
        record.last_check = now;
        record.consecutive_failures += 1;
        warn!(
            "[health] provider '{}' marked unhealthy (consecutive failures: {})",
            provider, record.consecutive_failures
        );
    }

    pub fn report_healthy_at(&self, provider: &str, now: DateTime<Utc>) {
        let mut records = self.records.write();
        let record = records.entry(provider.to_string()).or_insert(HealthRecord {
            healthy: true,
            last_check: now,
            consecutive_failures: 0,
        });
        if !record.healthy {
            info!("[health] provider '{}' recovered", provider);
        }
        record.healthy = true;
        record.last_check = now;
        record.consecutive_failures = 0;
    }

    pub fn is_eligible_at(&self, provider: &str, now: DateTime<Utc>) -> bool {
        let records = self.records.read();
        match records.get(provider) {
            None => true,
            Some(r) if r.healthy => true,
            Some(r) => now - r.last_check >= Duration::seconds(HEALTH_COOLDOWN_SECS),
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_provider_is_eligible() {
        let health = ProviderHealth::new();
        assert!(health.is_eligible("never-seen"));
    }

    #[test]
    fn test_cooldown_window() {
        let health = ProviderHealth::new();
        let t0 = Utc::now();
        health.report_unhealthy_at("openai", t0);

        assert!(!health.is_eligible_at("openai", t0));
        assert!(!health.is_eligible_at("openai", t0 + Duration::seconds(30)));
        assert!(!health.is_eligible_at("openai", t0 + Duration::seconds(59)));
        // Implicitly eligible again exactly at the window boundary
        assert!(health.is_eligible_at("openai", t0 + Duration::seconds(60)));
    }

    #[test]
    fn test_healthy_report_resets() {
        let health = ProviderHealth::new();
        let t0 = Utc::now();
        health.report_unhealthy_at("groq", t0);
        health.report_unhealthy_at("groq", t0);
        assert_eq!(health.failure_count("groq"), 2);

        health.report_healthy_at("groq", t0 + Duration::seconds(1));
        assert!(health.is_eligible_at("groq", t0 + Duration::seconds(1)));
        assert_eq!(health.failure_count("groq"), 0);
    }

    #[test]
    fn test_trackers_are_isolated() {
        let a = ProviderHealth::new();
        let b = ProviderHealth::new();
        a.report_unhealthy("openai");
        assert!(b.is_eligible("openai"));
    }
}
