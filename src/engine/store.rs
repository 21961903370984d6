// Brio Assistant Engine — Tenant-Scoped Document Store
// Narrow persistence interface shared by the tool executor and the learning
// store: append / query / update over schemaless JSON records, scoped by
// tenant, with equality and range filters plus ordering.
//
// The engine assumes eventual, non-transactional reads — no cross-record
// consistency is guaranteed or required. The bundled implementation keeps
// everything in one SQLite table and filters with json_extract, behind a
// Mutex-protected connection.

use crate::atoms::error::{EngineError, EngineResult};
use async_trait::async_trait;
use log::info;
use parking_lot::Mutex;
use rusqlite::{params, params_from_iter, Connection};
use serde_json::Value;
use std::path::Path;

// ── Query model ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Inclusive range filter over one JSON field.
#[derive(Debug, Clone)]
pub struct RangeFilter {
    pub field: String,
    pub min: Option<Value>,
    pub max: Option<Value>,
}

/// Declarative filter: equality pairs, an optional range, ordering, limit.
/// Field names are engine-internal, never user input.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub equals: Vec<(String, Value)>,
    pub range: Option<RangeFilter>,
    pub order_by: Option<(String, SortOrder)>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.equals.push((field.to_string(), value.into()));
        self
    }

    pub fn between(mut self, field: &str, min: Option<Value>, max: Option<Value>) -> Self {
        self.range = Some(RangeFilter { field: field.to_string(), min, max });
        self
    }

    pub fn order(mut self, field: &str, order: SortOrder) -> Self {
        self.order_by = Some((field.to_string(), order));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// One stored record.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub body: Value,
}

// ── Trait ───────────────────────────────────────────────────────────────

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Append a record, returning its generated id.
    async fn append(&self, tenant: &str, collection: &str, body: Value) -> EngineResult<String>;

    /// Fetch records matching a filter.
    async fn query(&self, tenant: &str, collection: &str, query: &Query)
        -> EngineResult<Vec<Document>>;

    /// Replace a record's body.
    async fn update(&self, tenant: &str, collection: &str, id: &str, body: Value)
        -> EngineResult<()>;
}

// ── SQLite implementation ───────────────────────────────────────────────

/// Thread-safe SQLite-backed store.
pub struct SqliteStore {
    /// The SQLite connection, protected by a Mutex.
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database file and initialize the schema.
    pub fn open(path: impl AsRef<Path>) -> EngineResult<Self> {
        info!("[store] opening document store at {:?}", path.as_ref());
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;").ok();
        Self::init_schema(&conn)?;
        Ok(SqliteStore { conn: Mutex::new(conn) })
    }

    /// In-memory store for tests.
    pub fn open_in_memory() -> EngineResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(SqliteStore { conn: Mutex::new(conn) })
    }

    fn init_schema(conn: &Connection) -> EngineResult<()> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS documents (
                id         TEXT PRIMARY KEY,
                tenant     TEXT NOT NULL,
                collection TEXT NOT NULL,
                body       TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_documents_scope
                ON documents (tenant, collection);",
        )?;
        Ok(())
    }
}

/// Map a JSON value onto a SQLite binding. json_extract returns native
/// SQLite types, so numbers bind as numbers and strings as text.
fn to_sql_value(v: &Value) -> rusqlite::types::Value {
    match v {
        Value::Null => rusqlite::types::Value::Null,
        Value::Bool(b) => rusqlite::types::Value::Integer(*b as i64),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                rusqlite::types::Value::Integer(i)
            } else {
                rusqlite::types::Value::Real(n.as_f64().unwrap_or(0.0))
            }
        }
        Value::String(s) => rusqlite::types::Value::Text(s.clone()),
        other => rusqlite::types::Value::Text(other.to_string()),
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn append(&self, tenant: &str, collection: &str, body: Value) -> EngineResult<String> {
        let id = uuid::Uuid::new_v4().to_string();
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO documents (id, tenant, collection, body) VALUES (?1, ?2, ?3, ?4)",
            params![id, tenant, collection, body.to_string()],
        )?;
        Ok(id)
    }

    async fn query(
        &self,
        tenant: &str,
        collection: &str,
        query: &Query,
    ) -> EngineResult<Vec<Document>> {
        let mut sql = String::from(
            "SELECT id, body FROM documents WHERE tenant = ?1 AND collection = ?2",
        );
        let mut bindings: Vec<rusqlite::types::Value> = vec![
            rusqlite::types::Value::Text(tenant.to_string()),
            rusqlite::types::Value::Text(collection.to_string()),
        ];

        for (field, value) in &query.equals {
            sql.push_str(&format!(
                " AND json_extract(body, '$.{field}') = ?{}",
                bindings.len() + 1
            ));
            bindings.push(to_sql_value(value));
        }

        if let Some(range) = &query.range {
            if let Some(min) = &range.min {
                sql.push_str(&format!(
                    " AND json_extract(body, '$.{}') >= ?{}",
                    range.field,
                    bindings.len() + 1
                ));
                bindings.push(to_sql_value(min));
            }
            if let Some(max) = &range.max {
                sql.push_str(&format!(
                    " AND json_extract(body, '$.{}') <= ?{}",
                    range.field,
                    bindings.len() + 1
                ));
                bindings.push(to_sql_value(max));
            }
        }

        if let Some((field, order)) = &query.order_by {
            let dir = match order {
                SortOrder::Asc => "ASC",
                SortOrder::Desc => "DESC",
            };
            sql.push_str(&format!(" ORDER BY json_extract(body, '$.{field}') {dir}"));
        }

        if let Some(limit) = query.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&sql)?;
        let docs = stmt
            .query_map(params_from_iter(bindings), |row| {
                let id: String = row.get(0)?;
                let raw: String = row.get(1)?;
                Ok((id, raw))
            })?
            .filter_map(|r| r.ok())
            .filter_map(|(id, raw)| {
                serde_json::from_str(&raw).ok().map(|body| Document { id, body })
            })
            .collect();

        Ok(docs)
    }

    async fn update(
        &self,
        tenant: &str,
        collection: &str,
        id: &str,
        body: Value,
    ) -> EngineResult<()> {
        let conn = self.conn.lock();
        let changed = conn.execute(
            "UPDATE documents SET body = ?1
             WHERE tenant = ?2 AND collection = ?3 AND id = ?4",
            params![body.to_string(), tenant, collection, id],
        )?;
        if changed == 0 {
            return Err(EngineError::Other(format!(
                "document not found: {collection}/{id}"
            )));
        }
        Ok(())
    }
}

// ── Tests ───────────────────────────────────────────────────────────────
