use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    database::Database,
    error::ApiError,
    handlers::MessageResponse,
    models::{
        CreateDistributor, Distributor, DistributorStockView, OrderableProduct, UpdateDistributor,
        UserRole,
    },
    utils::hash_password,
};

#[derive(Debug, Deserialize)]
pub struct DistributorsQuery {
    pub warehouse_id: Option<Uuid>,
}

#[derive(Serialize)]
pub struct DistributorsResponse {
    pub success: bool,
    pub distributors: Vec<Distributor>,
}

pub async fn list_distributors(
    State(db): State<Database>,
    Query(query): Query<DistributorsQuery>,
) -> Result<Json<DistributorsResponse>, ApiError> {
    let distributors = match query.warehouse_id {
        Some(warehouse_id) => {
            sqlx::query_as::<_, Distributor>(
                "SELECT * FROM distributors WHERE warehouse_id = $1 ORDER BY name",
            )
            .bind(warehouse_id)
            .fetch_all(&db)
            .await?
        }
        None => {
            sqlx::query_as::<_, Distributor>("SELECT * FROM distributors ORDER BY name")
                .fetch_all(&db)
                .await?
        }
    };

    Ok(Json(DistributorsResponse {
        success: true,
        distributors,
    }))
}

// Same two-row shape as warehouse creation: the party row and its login
// live or die together.
pub async fn create_distributor(
    State(db): State<Database>,
    Json(form): Json<CreateDistributor>,
) -> Result<Json<MessageResponse>, ApiError> {
    let email = form.email.trim();

    if form.name.trim().is_empty()
        || email.is_empty()
        || form.password.is_empty()
        || form.city.trim().is_empty()
    {
        return Err(ApiError::Validation("All fields are required".to_string()));
    }

    let warehouse_exists =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM warehouses WHERE id = $1")
            .bind(form.warehouse_id)
            .fetch_one(&db)
            .await?;

    if warehouse_exists == 0 {
        return Err(ApiError::NotFound("Warehouse not found".to_string()));
    }

    let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE username = $1")
        .bind(email)
        .fetch_one(&db)
        .await?;

    if existing > 0 {
        return Err(ApiError::Conflict(
            "Email already exists. Please use a different one.".to_string(),
        ));
    }

    let password_hash = hash_password(&form.password)
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {}", e)))?;

    let mut tx = db.begin().await?;

    sqlx::query(
        "INSERT INTO distributors (name, email, city, warehouse_id) VALUES ($1, $2, $3, $4)",
    )
    .bind(form.name.trim())
    .bind(email)
    .bind(form.city.trim())
    .bind(form.warehouse_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO users (username, password_hash, role) VALUES ($1, $2, $3)")
        .bind(email)
        .bind(&password_hash)
        .bind(UserRole::Distributor.as_str())
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(MessageResponse::new("Distributor added successfully"))
}

pub async fn update_distributor(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(form): Json<UpdateDistributor>,
) -> Result<Json<MessageResponse>, ApiError> {
    let email = form.email.trim();

    if form.name.trim().is_empty() || form.city.trim().is_empty() || email.is_empty() {
        return Err(ApiError::Validation("All fields are required".to_string()));
    }

    let old_email: String = sqlx::query_scalar("SELECT email FROM distributors WHERE id = $1")
        .bind(id)
        .fetch_optional(&db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Distributor not found".to_string()))?;

    let warehouse_exists =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM warehouses WHERE id = $1")
            .bind(form.warehouse_id)
            .fetch_one(&db)
            .await?;

    if warehouse_exists == 0 {
        return Err(ApiError::NotFound("Warehouse not found".to_string()));
    }

    let mut tx = db.begin().await?;

    sqlx::query(
        "UPDATE distributors SET name = $1, city = $2, email = $3, warehouse_id = $4 \
         WHERE id = $5",
    )
    .bind(form.name.trim())
    .bind(form.city.trim())
    .bind(email)
    .bind(form.warehouse_id)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("UPDATE users SET username = $1 WHERE username = $2 AND role = $3")
        .bind(email)
        .bind(&old_email)
        .bind(UserRole::Distributor.as_str())
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(MessageResponse::new("Distributor updated successfully"))
}

pub async fn delete_distributor(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    let email: String = sqlx::query_scalar("SELECT email FROM distributors WHERE id = $1")
        .bind(id)
        .fetch_optional(&db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Distributor not found".to_string()))?;

    let mut tx = db.begin().await?;

    sqlx::query("DELETE FROM distributors WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM users WHERE username = $1 AND role = $2")
        .bind(&email)
        .bind(UserRole::Distributor.as_str())
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(MessageResponse::new("Distributor deleted successfully"))
}

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: String,
}

#[derive(Serialize)]
pub struct DistributorIdResponse {
    pub success: bool,
    pub id: Uuid,
}

pub async fn distributor_id_by_email(
    State(db): State<Database>,
    Query(query): Query<EmailQuery>,
) -> Result<Json<DistributorIdResponse>, ApiError> {
    if query.email.trim().is_empty() {
        return Err(ApiError::Validation("Missing email".to_string()));
    }

    let id: Uuid = sqlx::query_scalar("SELECT id FROM distributors WHERE email = $1")
        .bind(query.email.trim())
        .fetch_optional(&db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Distributor not found".to_string()))?;

    Ok(Json(DistributorIdResponse { success: true, id }))
}

#[derive(Debug, Deserialize)]
pub struct DistributorQuery {
    pub distributor_id: Uuid,
}

#[derive(Serialize)]
pub struct DistributorInfo {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub city: String,
    pub warehouse_id: Uuid,
    pub warehouse_name: String,
}

#[derive(Serialize)]
pub struct DistributorInfoResponse {
    pub success: bool,
    pub data: DistributorInfo,
}

pub async fn distributor_info(
    State(db): State<Database>,
    Query(query): Query<DistributorQuery>,
) -> Result<Json<DistributorInfoResponse>, ApiError> {
    let row: Option<(Uuid, String, String, String, Uuid, String)> = sqlx::query_as(
        "SELECT d.id, d.name, d.email, d.city, d.warehouse_id, w.name \
         FROM distributors d \
         JOIN warehouses w ON d.warehouse_id = w.id \
         WHERE d.id = $1",
    )
    .bind(query.distributor_id)
    .fetch_optional(&db)
    .await?;

    let (id, name, email, city, warehouse_id, warehouse_name) =
        row.ok_or_else(|| ApiError::NotFound("Distributor not found".to_string()))?;

    Ok(Json(DistributorInfoResponse {
        success: true,
        data: DistributorInfo {
            id,
            name,
            email,
            city,
            warehouse_id,
            warehouse_name,
        },
    }))
}

#[derive(Serialize)]
pub struct DistributorStockResponse {
    pub success: bool,
    pub stock: Vec<DistributorStockView>,
}

// On-hand quantity per product plus what is still inbound on Pending orders.
pub async fn distributor_stock(
    State(db): State<Database>,
    Query(query): Query<DistributorQuery>,
) -> Result<Json<DistributorStockResponse>, ApiError> {
    let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM distributors WHERE id = $1")
        .bind(query.distributor_id)
        .fetch_one(&db)
        .await?;

    if exists == 0 {
        return Err(ApiError::NotFound("Distributor not found".to_string()));
    }

    let stock = sqlx::query_as::<_, DistributorStockView>(
        "SELECT p.id AS product_id, p.name AS product_name, p.sku, p.mrp, \
                COALESCE(ds.qty, 0) AS qty_available, \
                COALESCE(pending.qty, 0) AS pending_orders \
         FROM products p \
         LEFT JOIN distributor_stock ds \
           ON ds.product_id = p.id AND ds.distributor_id = $1 \
         LEFT JOIN ( \
             SELECT product_id, SUM(qty) AS qty \
             FROM distributor_orders \
             WHERE distributor_id = $1 AND status = 'Pending' \
             GROUP BY product_id \
         ) pending ON pending.product_id = p.id \
         ORDER BY p.name",
    )
    .bind(query.distributor_id)
    .fetch_all(&db)
    .await?;

    Ok(Json(DistributorStockResponse {
        success: true,
        stock,
    }))
}

#[derive(Serialize)]
pub struct OrderableProductsResponse {
    pub success: bool,
    pub products: Vec<OrderableProduct>,
}

// What the distributor can currently order: the assigned warehouse's
// in-stock products.
pub async fn distributor_products(
    State(db): State<Database>,
    Query(query): Query<DistributorQuery>,
) -> Result<Json<OrderableProductsResponse>, ApiError> {
    let warehouse_id: Uuid =
        sqlx::query_scalar("SELECT warehouse_id FROM distributors WHERE id = $1")
            .bind(query.distributor_id)
            .fetch_optional(&db)
            .await?
            .ok_or_else(|| ApiError::NotFound("Distributor not found".to_string()))?;

    let products = sqlx::query_as::<_, OrderableProduct>(
        "SELECT p.id, p.name, wi.qty \
         FROM warehouse_inventory wi \
         JOIN products p ON wi.product_id = p.id \
         WHERE wi.warehouse_id = $1 AND wi.qty > 0 \
         ORDER BY p.name",
    )
    .bind(warehouse_id)
    .fetch_all(&db)
    .await?;

    Ok(Json(OrderableProductsResponse {
        success: true,
        products,
    }))
}
