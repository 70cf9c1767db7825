use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    database::Database,
    error::ApiError,
    handlers::MessageResponse,
    models::ActivityLog,
};

/// Append one audit row. Runs on whatever executor the caller holds, so a
/// workflow's log entry commits or rolls back with the rest of its writes.
pub async fn log_activity<'e, E>(
    executor: E,
    source: &str,
    description: &str,
) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = sqlx::Postgres>,
{
    sqlx::query("INSERT INTO activity_logs (source, description) VALUES ($1, $2)")
        .bind(source)
        .bind(description)
        .execute(executor)
        .await?;

    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    pub warehouse_id: Uuid,
}

#[derive(Serialize)]
pub struct LogsResponse {
    pub success: bool,
    pub logs: Vec<ActivityLog>,
}

pub async fn warehouse_logs(
    State(db): State<Database>,
    Query(query): Query<LogsQuery>,
) -> Result<Json<LogsResponse>, ApiError> {
    let name: String = sqlx::query_scalar("SELECT name FROM warehouses WHERE id = $1")
        .bind(query.warehouse_id)
        .fetch_optional(&db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Warehouse not found".to_string()))?;

    // Warehouse-scoped sources look like "<name> (<actor>)".
    let logs = sqlx::query_as::<_, ActivityLog>(
        "SELECT * FROM activity_logs \
         WHERE lower(source) LIKE lower($1) || ' (%' \
         ORDER BY created_at DESC LIMIT 50",
    )
    .bind(name.trim())
    .fetch_all(&db)
    .await?;

    Ok(Json(LogsResponse {
        success: true,
        logs,
    }))
}

#[derive(Debug, Deserialize)]
pub struct CreateLogRequest {
    pub warehouse_id: Uuid,
    pub user_name: String,
    pub description: String,
}

pub async fn create_log(
    State(db): State<Database>,
    Json(form): Json<CreateLogRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user_name = form.user_name.trim();
    let description = form.description.trim();

    if user_name.is_empty() || description.is_empty() {
        return Err(ApiError::Validation(
            "Missing user_name or description".to_string(),
        ));
    }

    let name: String = sqlx::query_scalar("SELECT name FROM warehouses WHERE id = $1")
        .bind(form.warehouse_id)
        .fetch_optional(&db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Warehouse not found".to_string()))?;

    let source = format!("{} ({})", name, user_name);
    log_activity(&db, &source, description).await?;

    Ok(MessageResponse::new("Log saved"))
}
