// Brio Assistant Engine — Tool Parameter Schemas
// One parameter struct per tool name, decoded from the raw JSON bag and
// then passed through constraint validation. Validation reports the first
// violation and causes no side effects.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Closed vocabularies ─────────────────────────────────────────────────

/// Data domains `analyze_data` can aggregate over.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DataDomain {
    Sales,
    Expenses,
    Projects,
    Clients,
    Inventory,
}

impl DataDomain {
    /// The document-store collection holding this domain's records.
    pub fn collection(&self) -> &'static str {
        match self {
            DataDomain::Sales => "sales",
            DataDomain::Expenses => "expenses",
            DataDomain::Projects => "projects",
            DataDomain::Clients => "clients",
            DataDomain::Inventory => "inventory",
        }
    }
}

/// Aggregation windows for `analyze_data`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Today,
    Week,
    Month,
    Quarter,
    Year,
}

impl Period {
    pub fn label(&self) -> &'static str {
        match self {
            Period::Today => "today",
            Period::Week => "week",
            Period::Month => "month",
            Period::Quarter => "quarter",
            Period::Year => "year",
        }
    }
}

const PRIORITIES: [&str; 4] = ["low", "medium", "high", "urgent"];
const NOTIFICATION_LEVELS: [&str; 3] = ["info", "warning", "critical"];

// ── Per-tool parameter structs ──────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskParams {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    /// RFC 3339 date or datetime.
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub estimated_hours: Option<f64>,
}

impl CreateTaskParams {
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().len() < 3 {
            return Err("'title' must be at least 3 characters".into());
        }
        if let Some(p) = &self.priority {
            if !PRIORITIES.contains(&p.as_str()) {
                return Err(format!(
                    "'priority' must be one of {PRIORITIES:?}, got '{p}'"
                ));
            }
        }
        if let Some(d) = &self.due_date {
            if parse_datetime(d).is_none() {
                return Err(format!("'due_date' is not a valid date: '{d}'"));
            }
        }
        if let Some(h) = self.estimated_hours {
            if h <= 0.0 {
                return Err("'estimated_hours' must be a positive number".into());
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleEventParams {
    pub title: String,
    /// RFC 3339 datetime.
    pub start: String,
    /// RFC 3339 datetime; defaults to start + 1 hour when omitted.
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub attendees: Vec<String>,
}

impl ScheduleEventParams {
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().len() < 3 {
            return Err("'title' must be at least 3 characters".into());
        }
        let Some(start) = parse_datetime(&self.start) else {
            return Err(format!("'start' is not a valid datetime: '{}'", self.start));
        };
        if let Some(end) = &self.end {
            match parse_datetime(end) {
                None => return Err(format!("'end' is not a valid datetime: '{end}'")),
                Some(e) if e <= start => {
                    return Err("'end' must be after 'start'".into());
                }
                _ => {}
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendNotificationParams {
    pub message: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
}

impl SendNotificationParams {
    pub fn validate(&self) -> Result<(), String> {
        if self.message.trim().is_empty() {
            return Err("'message' must not be empty".into());
        }
        if let Some(level) = &self.level {
            if !NOTIFICATION_LEVELS.contains(&level.as_str()) {
                return Err(format!(
                    "'level' must be one of {NOTIFICATION_LEVELS:?}, got '{level}'"
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeDataParams {
    pub data_type: DataDomain,
    pub period: Period,
}

impl AnalyzeDataParams {
    pub fn validate(&self) -> Result<(), String> {
        // Both fields are closed enums; serde decoding is the constraint.
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebSearchParams {
    pub query: String,
    #[serde(default)]
    pub limit: Option<u32>,
}

impl WebSearchParams {
    pub fn validate(&self) -> Result<(), String> {
        if self.query.trim().len() < 2 {
            return Err("'query' must be at least 2 characters".into());
        }
        if let Some(0) = self.limit {
            return Err("'limit' must be a positive number".into());
        }
        Ok(())
    }
}

// ── Decode + validate ───────────────────────────────────────────────────

/// Validated, typed tool parameters — one variant per tool name.
#[derive(Debug, Clone)]
pub enum ToolParams {
    CreateTask(CreateTaskParams),
    ScheduleEvent(ScheduleEventParams),
    SendNotification(SendNotificationParams),
    AnalyzeData(AnalyzeDataParams),
    WebSearch(WebSearchParams),
}

/// Decode a raw parameter bag for `tool`, enforcing types first and value
/// constraints second. Returns the first violation as a plain message.
pub fn decode(tool: &str, parameters: Value) -> Result<ToolParams, String> {
    fn typed<T: serde::de::DeserializeOwned>(tool: &str, v: Value) -> Result<T, String> {
        serde_json::from_value(v).map_err(|e| format!("{tool}: invalid parameters: {e}"))
    }

    match tool {
        "create_task" => {
            let p: CreateTaskParams = typed(tool, parameters)?;
            p.validate()?;
            Ok(ToolParams::CreateTask(p))
        }
        "schedule_event" => {
            let p: ScheduleEventParams = typed(tool, parameters)?;
            p.validate()?;
            Ok(ToolParams::ScheduleEvent(p))
        }
        "send_notification" => {
            let p: SendNotificationParams = typed(tool, parameters)?;
            p.validate()?;
            Ok(ToolParams::SendNotification(p))
        }
        "analyze_data" => {
            let p: AnalyzeDataParams = typed(tool, parameters)?;
            p.validate()?;
            Ok(ToolParams::AnalyzeData(p))
        }
        "web_search" => {
            let p: WebSearchParams = typed(tool, parameters)?;
            p.validate()?;
            Ok(ToolParams::WebSearch(p))
        }
        other => Err(format!("Unknown tool: {other}")),
    }
}

/// Accept full RFC 3339 datetimes or bare dates.
pub fn parse_datetime(s: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

// ── Tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_task_minimal() {
        let p = decode("create_task", json!({"title": "Llamar a cliente"}));
        assert!(matches!(p, Ok(ToolParams::CreateTask(_))));
    }

    #[test]
    fn test_create_task_short_title_rejected() {
        let err = decode("create_task", json!({"title": "ab"})).unwrap_err();
        assert!(err.contains("at least 3 characters"), "{err}");
    }

    #[test]
    fn test_create_task_bad_priority() {
        let err = decode(
            "create_task",
            json!({"title": "Review", "priority": "whenever"}),
        )
        .unwrap_err();
        assert!(err.contains("'priority'"), "{err}");
    }

    #[test]
    fn test_negative_hours_rejected() {
        let err = decode(
            "create_task",
            json!({"title": "Review", "estimated_hours": -2.0}),
        )
        .unwrap_err();
        assert!(err.contains("positive"), "{err}");
    }

    #[test]
    fn test_schedule_event_end_before_start() {
        let err = decode(
            "schedule_event",
            json!({
                "title": "Demo",
                "start": "2026-08-23T15:00:00Z",
                "end": "2026-08-23T14:00:00Z"
            }),
        )
        .unwrap_err();
        assert!(err.contains("after 'start'"), "{err}");
    }

    #[test]
    fn test_analyze_data_enums_enforced() {
        assert!(decode("analyze_data", json!({"data_type": "sales", "period": "month"})).is_ok());
        assert!(decode("analyze_data", json!({"data_type": "weather", "period": "month"})).is_err());
    }

    #[test]
    fn test_unknown_tool() {
        let err = decode("drop_database", json!({})).unwrap_err();
        assert!(err.contains("Unknown tool"), "{err}");
    }

    #[test]
    fn test_bare_date_accepted() {
        assert!(parse_datetime("2026-08-23").is_some());
        assert!(parse_datetime("not a date").is_none());
    }
}
