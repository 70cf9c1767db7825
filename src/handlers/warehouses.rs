use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    database::Database,
    error::ApiError,
    handlers::{activity::log_activity, MessageResponse},
    models::{CreateWarehouse, InventoryView, UpdateWarehouse, UserRole, Warehouse},
    stock::{self, Location},
    utils::hash_password,
};

#[derive(Serialize)]
pub struct WarehousesResponse {
    pub success: bool,
    pub warehouses: Vec<Warehouse>,
}

pub async fn list_warehouses(
    State(db): State<Database>,
) -> Result<Json<WarehousesResponse>, ApiError> {
    let warehouses = sqlx::query_as::<_, Warehouse>("SELECT * FROM warehouses ORDER BY name")
        .fetch_all(&db)
        .await?;

    Ok(Json(WarehousesResponse {
        success: true,
        warehouses,
    }))
}

#[derive(Serialize)]
pub struct CreateWarehouseResponse {
    pub success: bool,
    pub message: String,
    pub warehouse_id: Uuid,
}

// Creates the warehouse and its login row as one unit; a credential exists
// exactly as long as its warehouse does.
pub async fn create_warehouse(
    State(db): State<Database>,
    Json(form): Json<CreateWarehouse>,
) -> Result<Json<CreateWarehouseResponse>, ApiError> {
    let email = form.email.trim();

    if form.name.trim().is_empty()
        || form.location.trim().is_empty()
        || email.is_empty()
        || form.password.is_empty()
    {
        return Err(ApiError::Validation("All fields are required".to_string()));
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

    let warehouse_id: Uuid = sqlx::query_scalar(
        "INSERT INTO warehouses (name, location, email) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(form.name.trim())
    .bind(form.location.trim())
    .bind(email)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO users (username, password_hash, role) VALUES ($1, $2, $3)")
        .bind(email)
        .bind(&password_hash)
        .bind(UserRole::Warehouse.as_str())
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(Json(CreateWarehouseResponse {
        success: true,
        message: "Warehouse added and login created".to_string(),
        warehouse_id,
    }))
}

pub async fn update_warehouse(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(form): Json<UpdateWarehouse>,
) -> Result<Json<MessageResponse>, ApiError> {
    let email = form.email.trim();

    if form.name.trim().is_empty() || form.location.trim().is_empty() || email.is_empty() {
        return Err(ApiError::Validation("All fields are required".to_string()));
    }

    let old_email: String = sqlx::query_scalar("SELECT email FROM warehouses WHERE id = $1")
        .bind(id)
        .fetch_optional(&db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Warehouse not found".to_string()))?;

    let mut tx = db.begin().await?;

    sqlx::query("UPDATE warehouses SET name = $1, location = $2, email = $3 WHERE id = $4")
        .bind(form.name.trim())
        .bind(form.location.trim())
        .bind(email)
        .bind(id)
        .execute(&mut *tx)
        .await?;

    // Keep the login row pointing at the current email
    sqlx::query("UPDATE users SET username = $1 WHERE username = $2 AND role = $3")
        .bind(email)
        .bind(&old_email)
        .bind(UserRole::Warehouse.as_str())
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(MessageResponse::new("Warehouse updated successfully"))
}

pub async fn delete_warehouse(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    let email: String = sqlx::query_scalar("SELECT email FROM warehouses WHERE id = $1")
        .bind(id)
        .fetch_optional(&db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Warehouse not found".to_string()))?;

    let distributor_refs =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM distributors WHERE warehouse_id = $1")
            .bind(id)
            .fetch_one(&db)
            .await?;

    if distributor_refs > 0 {
        return Err(ApiError::Validation(
            "Cannot delete this warehouse. Distributors are still assigned to it.".to_string(),
        ));
    }

    let mut tx = db.begin().await?;

    sqlx::query("DELETE FROM warehouses WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM users WHERE username = $1 AND role = $2")
        .bind(&email)
        .bind(UserRole::Warehouse.as_str())
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(MessageResponse::new("Warehouse deleted successfully"))
}

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: String,
}

#[derive(Serialize)]
pub struct WarehouseIdResponse {
    pub success: bool,
    pub id: Uuid,
    pub name: String,
}

pub async fn warehouse_id_by_email(
    State(db): State<Database>,
    Query(query): Query<EmailQuery>,
) -> Result<Json<WarehouseIdResponse>, ApiError> {
    if query.email.trim().is_empty() {
        return Err(ApiError::Validation("Missing email".to_string()));
    }

    let row: Option<(Uuid, String)> =
        sqlx::query_as("SELECT id, name FROM warehouses WHERE email = $1")
            .bind(query.email.trim())
            .fetch_optional(&db)
            .await?;

    let (id, name) = row.ok_or_else(|| ApiError::NotFound("Warehouse not found".to_string()))?;

    Ok(Json(WarehouseIdResponse {
        success: true,
        id,
        name,
    }))
}

#[derive(Debug, Deserialize)]
pub struct InventoryQuery {
    pub warehouse_id: Uuid,
}

#[derive(Serialize)]
pub struct InventoryResponse {
    pub success: bool,
    pub inventory: Vec<InventoryView>,
}

pub async fn warehouse_inventory(
    State(db): State<Database>,
    Query(query): Query<InventoryQuery>,
) -> Result<Json<InventoryResponse>, ApiError> {
    let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM warehouses WHERE id = $1")
        .bind(query.warehouse_id)
        .fetch_one(&db)
        .await?;

    if exists == 0 {
        return Err(ApiError::NotFound("Warehouse not found".to_string()));
    }

    let inventory = sqlx::query_as::<_, InventoryView>(
        "SELECT p.id AS product_id, p.name AS product, p.sku, p.ean, p.unit, \
                COALESCE(wi.qty, 0) AS qty, p.mrp \
         FROM products p \
         LEFT JOIN warehouse_inventory wi \
           ON p.id = wi.product_id AND wi.warehouse_id = $1 \
         ORDER BY p.name",
    )
    .bind(query.warehouse_id)
    .fetch_all(&db)
    .await?;

    Ok(Json(InventoryResponse {
        success: true,
        inventory,
    }))
}

#[derive(Debug, Deserialize)]
pub struct AddStockRequest {
    pub warehouse_id: Uuid,
    pub sku: String,
    pub qty: i32,
}

pub async fn add_stock(
    State(db): State<Database>,
    Json(form): Json<AddStockRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if form.sku.trim().is_empty() || form.qty <= 0 {
        return Err(ApiError::Validation(
            "Invalid input: warehouse, SKU, and qty must be positive".to_string(),
        ));
    }

    let warehouse_name: String = sqlx::query_scalar("SELECT name FROM warehouses WHERE id = $1")
        .bind(form.warehouse_id)
        .fetch_optional(&db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Warehouse not found".to_string()))?;

    let product: Option<(Uuid, String)> =
        sqlx::query_as("SELECT id, name FROM products WHERE sku = $1")
            .bind(form.sku.trim())
            .fetch_optional(&db)
            .await?;

    let (product_id, product_name) =
        product.ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    let mut tx = db.begin().await?;

    stock::credit(
        &mut tx,
        Location::Warehouse(form.warehouse_id),
        product_id,
        form.qty,
    )
    .await?;

    let source = format!("{} (Admin)", warehouse_name);
    let description = format!("Added {} stock for {}", form.qty, product_name);
    log_activity(&mut *tx, &source, &description).await?;

    tx.commit().await?;

    Ok(MessageResponse::new("Stock added successfully"))
}
