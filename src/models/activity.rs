use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Append-only audit row. `source` is "<warehouse name> (<actor>)" for
/// warehouse-scoped entries, or the distributor name for sales.
#[derive(Debug, Serialize, FromRow)]
pub struct ActivityLog {
    pub id: Uuid,
    pub source: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}
