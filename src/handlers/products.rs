use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    database::Database,
    error::ApiError,
    handlers::MessageResponse,
    models::{CreateProduct, Product, UpdateProduct},
};

#[derive(Serialize)]
pub struct ProductsResponse {
    pub success: bool,
    pub products: Vec<Product>,
}

pub async fn list_products(
    State(db): State<Database>,
) -> Result<Json<ProductsResponse>, ApiError> {
    let products = sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY name")
        .fetch_all(&db)
        .await?;

    Ok(Json(ProductsResponse {
        success: true,
        products,
    }))
}

pub async fn create_product(
    State(db): State<Database>,
    Json(form): Json<CreateProduct>,
) -> Result<Json<MessageResponse>, ApiError> {
    for (field, value) in [
        ("name", &form.name),
        ("sku", &form.sku),
        ("ean", &form.ean),
        ("unit", &form.unit),
    ] {
        if value.trim().is_empty() {
            return Err(ApiError::Validation(format!("Missing field: {}", field)));
        }
    }

    let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products WHERE sku = $1")
        .bind(form.sku.trim())
        .fetch_one(&db)
        .await?;

    if existing > 0 {
        return Err(ApiError::Conflict(format!(
            "A product with SKU {} already exists",
            form.sku.trim()
        )));
    }

    sqlx::query(
        "INSERT INTO products (name, sku, ean, unit, mrp, sellingprice) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(form.name.trim())
    .bind(form.sku.trim())
    .bind(form.ean.trim())
    .bind(form.unit.trim())
    .bind(form.mrp)
    .bind(form.sellingprice)
    .execute(&db)
    .await?;

    Ok(MessageResponse::new("Product added successfully"))
}

pub async fn update_product(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(form): Json<UpdateProduct>,
) -> Result<Json<MessageResponse>, ApiError> {
    if form.name.trim().is_empty() {
        return Err(ApiError::Validation("Missing field: name".to_string()));
    }

    let result = sqlx::query(
        "UPDATE products SET name = $1, mrp = $2, sellingprice = $3 WHERE id = $4",
    )
    .bind(form.name.trim())
    .bind(form.mrp)
    .bind(form.sellingprice)
    .bind(id)
    .execute(&db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Product not found".to_string()));
    }

    Ok(MessageResponse::new("Product updated successfully"))
}

// Deletion is blocked while any order references the product; orders are
// kept as history, so the reference never goes away on its own.
pub async fn delete_product(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    let order_refs = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM distributor_orders WHERE product_id = $1",
    )
    .bind(id)
    .fetch_one(&db)
    .await?;

    if order_refs > 0 {
        return Err(ApiError::Validation(
            "Cannot delete this product. There are orders linked to it.".to_string(),
        ));
    }

    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(&db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Product not found".to_string()));
    }

    Ok(MessageResponse::new("Product deleted successfully"))
}
