// Brio Assistant Engine — Record & Event Tools
// Side-effecting actions against the tenant's document store: tasks,
// calendar events, broadcast notifications. Each action commits
// independently — there is no cross-call transaction.

use crate::atoms::error::EngineResult;
use crate::atoms::types::ToolOutcome;
use crate::engine::store::DocumentStore;
use crate::engine::tools::schema::{
    parse_datetime, CreateTaskParams, ScheduleEventParams, SendNotificationParams,
};
use chrono::{Duration, Utc};
use log::info;
use serde_json::json;

pub async fn create_task(
    store: &dyn DocumentStore,
    tenant: &str,
    params: &CreateTaskParams,
) -> EngineResult<ToolOutcome> {
    let body = json!({
        "title": params.title,
        "description": params.description.clone().unwrap_or_default(),
        "priority": params.priority.as_deref().unwrap_or("medium"),
        "due_date": params.due_date,
        "estimated_hours": params.estimated_hours,
        "status": "pending",
        "created_at": Utc::now().to_rfc3339(),
    });
    let id = store.append(tenant, "tasks", body).await?;
    info!("[tools] task created: {} ({})", params.title, id);

    Ok(
        ToolOutcome::ok("create_task", format!("Task created: {}", params.title))
            .with_data(json!({ "id": id }))
            .with_redirect("/tasks"),
    )
}

pub async fn schedule_event(
    store: &dyn DocumentStore,
    tenant: &str,
    params: &ScheduleEventParams,
) -> EngineResult<ToolOutcome> {
    // validate() guarantees start parses.
    let start = parse_datetime(&params.start).expect("validated start");
    let end = params
        .end
        .as_deref()
        .and_then(parse_datetime)
        .unwrap_or(start + Duration::hours(1));

    let body = json!({
        "title": params.title,
        "start": start.to_rfc3339(),
        "end": end.to_rfc3339(),
        "location": params.location,
        "attendees": params.attendees,
        "created_at": Utc::now().to_rfc3339(),
    });
    let id = store.append(tenant, "events", body).await?;
    info!("[tools] event scheduled: {} ({})", params.title, id);

    Ok(ToolOutcome::ok(
        "schedule_event",
        format!(
            "Event scheduled: {} from {} to {}",
            params.title,
            start.format("%Y-%m-%d %H:%M"),
            end.format("%H:%M")
        ),
    )
    .with_data(json!({ "id": id, "start": start.to_rfc3339(), "end": end.to_rfc3339() }))
    .with_redirect("/calendar"))
}

pub async fn send_notification(
    store: &dyn DocumentStore,
    tenant: &str,
    params: &SendNotificationParams,
) -> EngineResult<ToolOutcome> {
    let body = json!({
        "title": params.title,
        "message": params.message,
        "level": params.level.as_deref().unwrap_or("info"),
        "delivered": false,
        "created_at": Utc::now().to_rfc3339(),
    });
    let id = store.append(tenant, "notifications", body).await?;
    info!("[tools] notification queued ({id})");

    Ok(ToolOutcome::ok(
        "send_notification",
        "Notification queued for broadcast",
    )
    .with_data(json!({ "id": id })))
}

// ── Tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::store::{Query, SqliteStore};

    #[tokio::test]
    async fn test_create_task_persists_record() {
        let store = SqliteStore::open_in_memory().unwrap();
        let params = CreateTaskParams {
            title: "Llamar a cliente".into(),
            description: None,
            priority: None,
            due_date: None,
            estimated_hours: None,
        };
        let outcome = create_task(&store, "user-1", &params).await.unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.message, "Task created: Llamar a cliente");
        assert_eq!(outcome.redirect.as_deref(), Some("/tasks"));

        let docs = store.query("user-1", "tasks", &Query::default()).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].body["priority"], "medium");
        assert_eq!(docs[0].body["status"], "pending");
    }

    #[tokio::test]
    async fn test_event_end_defaults_to_one_hour() {
        let store = SqliteStore::open_in_memory().unwrap();
        let params = ScheduleEventParams {
            title: "Demo con cliente".into(),
            start: "2026-08-23T15:00:00Z".into(),
            end: None,
            location: None,
            attendees: vec![],
        };
        schedule_event(&store, "user-1", &params).await.unwrap();

        let docs = store.query("user-1", "events", &Query::default()).await.unwrap();
        assert_eq!(docs[0].body["end"], "2026-08-23T16:00:00+00:00");
    }

    #[tokio::test]
    async fn test_notification_defaults_to_info() {
        let store = SqliteStore::open_in_memory().unwrap();
        let params = SendNotificationParams {
            message: "Inventario bajo".into(),
            title: None,
            level: None,
        };
        let outcome = send_notification(&store, "user-1", &params).await.unwrap();
        assert!(outcome.success);

        let docs = store
            .query("user-1", "notifications", &Query::default())
            .await
            .unwrap();
        assert_eq!(docs[0].body["level"], "info");
        assert_eq!(docs[0].body["delivered"], false);
    }
}
