//! Durable metric tier backed by SQLite.
//!
//! Connection strings: `sqlite://<path>` or `sqlite::memory:`. All calls hop
//! onto the blocking pool; the connection sits behind a mutex so writes are
//! serialized by the store itself.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};

use vitalproxy_core::domain::{Metric, MetricStatus};
use vitalproxy_core::error::{Result, VitalError};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS metrics (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    status    TEXT    NOT NULL,
    latency   REAL    NOT NULL,
    timestamp TEXT    NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_metrics_timestamp ON metrics (timestamp);
";

/// Where a connection string points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqliteTarget {
    File(String),
    InMemory,
}

pub fn parse_url(url: &str) -> Result<SqliteTarget> {
    let url = url.trim();
    if url == "sqlite::memory:" || url == "sqlite://:memory:" {
        return Ok(SqliteTarget::InMemory);
    }
    match url.strip_prefix("sqlite://") {
        Some(path) if !path.is_empty() => Ok(SqliteTarget::File(path.to_string())),
        _ => Err(VitalError::Config(format!(
            "unsupported metrics store url (expected sqlite://<path>): {url}"
        ))),
    }
}

#[derive(Clone)]
pub struct SqliteMetricStore {
    conn: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for SqliteMetricStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteMetricStore").finish_non_exhaustive()
    }
}

impl SqliteMetricStore {
    /// Open and probe. Fails if the database cannot be opened, does not answer
    /// `SELECT 1`, or the schema cannot be created.
    pub async fn connect(url: &str) -> Result<Self> {
        let target = parse_url(url)?;
        let conn = tokio::task::spawn_blocking(move || open_and_probe(&target))
            .await
            .map_err(|e| VitalError::Internal(format!("metrics store probe task failed: {e}")))??;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub async fn insert(&self, metric: Metric) -> Result<()> {
        let conn = Arc::clone(&self.conn);
        run_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| VitalError::Internal("metrics store lock poisoned".into()))?;
            conn.execute(
                "INSERT INTO metrics (status, latency, timestamp) VALUES (?1, ?2, ?3)",
                params![
                    metric.status.as_str(),
                    metric.latency,
                    encode_timestamp(&metric.timestamp)
                ],
            )
            .map_err(db_err)?;
            Ok(())
        })
        .await
    }

    /// Newest first by timestamp, then by insertion.
    pub async fn list(&self) -> Result<Vec<Metric>> {
        let conn = Arc::clone(&self.conn);
        run_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| VitalError::Internal("metrics store lock poisoned".into()))?;
            let mut stmt = conn
                .prepare(
                    "SELECT status, latency, timestamp FROM metrics \
                     ORDER BY timestamp DESC, id DESC",
                )
                .map_err(db_err)?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, f64>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                })
                .map_err(db_err)?;

            let mut out = Vec::new();
            for row in rows {
                let (status, latency, ts) = row.map_err(db_err)?;
                match decode_row(&status, latency, &ts) {
                    Ok(metric) => out.push(metric),
                    Err(e) => tracing::warn!(error = %e, "skipping unreadable metric row"),
                }
            }
            Ok(out)
        })
        .await
    }
}

fn open_and_probe(target: &SqliteTarget) -> Result<Connection> {
    let conn = match target {
        SqliteTarget::File(path) => Connection::open(path),
        SqliteTarget::InMemory => Connection::open_in_memory(),
    }
    .map_err(db_err)?;

    conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
        .map_err(db_err)?;
    conn.execute_batch(SCHEMA).map_err(db_err)?;
    Ok(conn)
}

async fn run_blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| VitalError::Internal(format!("metrics store task failed: {e}")))?
}

fn db_err(e: rusqlite::Error) -> VitalError {
    VitalError::Internal(format!("metrics store: {e}"))
}

fn decode_row(status: &str, latency: f64, ts: &str) -> Result<Metric> {
    Ok(Metric {
        status: status.parse::<MetricStatus>()?,
        latency,
        timestamp: decode_timestamp(ts)?,
    })
}

// Fixed width (nanos, `Z`) for years 0000..=9999, which `Metric::validate`
// enforces, so lexical order in SQL is chronological.
fn encode_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn decode_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| VitalError::Internal(format!("metrics store: bad timestamp {s}: {e}")))
}
