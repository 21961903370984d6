// Brio Assistant Engine — Data Analytics Tool
// Aggregate metrics over a time window for one business data domain.
// An empty store is a normal answer (all metrics zero), never an error.

use crate::atoms::error::EngineResult;
use crate::atoms::types::ToolOutcome;
use crate::engine::store::{DocumentStore, Query};
use crate::engine::tools::schema::{AnalyzeDataParams, Period};
use chrono::{DateTime, Duration, Utc};
use log::info;
use serde_json::json;

/// Start of the aggregation window, measured back from `now`.
fn window_start(period: Period, now: DateTime<Utc>) -> DateTime<Utc> {
    match period {
        Period::Today => now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
            .unwrap_or(now),
        Period::Week => now - Duration::days(7),
        Period::Month => now - Duration::days(30),
        Period::Quarter => now - Duration::days(90),
        Period::Year => now - Duration::days(365),
    }
}

pub async fn analyze_data(
    store: &dyn DocumentStore,
    tenant: &str,
    params: &AnalyzeDataParams,
) -> EngineResult<ToolOutcome> {
    let since = window_start(params.period, Utc::now());
    let collection = params.data_type.collection();
    info!(
        "[tools] analyze_data: {} over {} (since {})",
        collection,
        params.period.label(),
        since.to_rfc3339()
    );

    let docs = store
        .query(
            tenant,
            collection,
            &Query::default().between("created_at", Some(json!(since.to_rfc3339())), None),
        )
        .await?;

    let count = docs.len() as u64;
    let total: f64 = docs
        .iter()
        .filter_map(|d| d.body["amount"].as_f64())
        .sum();
    let average = if count == 0 { 0.0 } else { total / count as f64 };

    let message = format!(
        "Found {} {} record(s) this {}: total {:.2}, average {:.2}",
        count,
        collection,
        params.period.label(),
        total,
        average
    );

    Ok(ToolOutcome::ok("analyze_data", message).with_data(json!({
        "data_type": collection,
        "period": params.period.label(),
        "count": count,
        "total": total,
        "average": average,
    })))
}

// ── Tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::store::SqliteStore;
    use crate::engine::tools::schema::DataDomain;
    use chrono::Timelike;

    #[tokio::test]
    async fn test_empty_store_yields_zero_metrics() {
        let store = SqliteStore::open_in_memory().unwrap();
        let params = AnalyzeDataParams { data_type: DataDomain::Sales, period: Period::Month };

        let outcome = analyze_data(&store, "user-1", &params).await.unwrap();
        assert!(outcome.success, "empty store must not be an error");
        let data = outcome.data.unwrap();
        assert_eq!(data["count"], 0);
        assert_eq!(data["total"], 0.0);
        assert_eq!(data["average"], 0.0);
    }

    #[tokio::test]
    async fn test_window_filters_old_records() {
        let store = SqliteStore::open_in_memory().unwrap();
        let now = Utc::now();
        store
            .append(
                "u",
                "sales",
                json!({"amount": 100.0, "created_at": now.to_rfc3339()}),
            )
            .await
            .unwrap();
        store
            .append(
                "u",
                "sales",
                json!({"amount": 400.0, "created_at": (now - Duration::days(200)).to_rfc3339()}),
            )
            .await
            .unwrap();

        let params = AnalyzeDataParams { data_type: DataDomain::Sales, period: Period::Month };
        let outcome = analyze_data(&store, "u", &params).await.unwrap();
        let data = outcome.data.unwrap();
        assert_eq!(data["count"], 1);
        assert_eq!(data["total"], 100.0);
        assert_eq!(data["average"], 100.0);
    }

    #[tokio::test]
    async fn test_records_without_amounts_count_but_sum_zero() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .append(
                "u",
                "clients",
                json!({"name": "Acme", "created_at": Utc::now().to_rfc3339()}),
            )
            .await
            .unwrap();

        let params = AnalyzeDataParams { data_type: DataDomain::Clients, period: Period::Year };
        let outcome = analyze_data(&store, "u", &params).await.unwrap();
        let data = outcome.data.unwrap();
        assert_eq!(data["count"], 1);
        assert_eq!(data["total"], 0.0);
    }

    #[test]
    fn test_today_window_starts_at_midnight() {
        let now = Utc::now();
        let start = window_start(Period::Today, now);
        assert_eq!(start.date_naive(), now.date_naive());
        assert_eq!(start.time().hour(), 0);
    }
}
