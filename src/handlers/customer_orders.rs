use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    database::Database,
    error::ApiError,
    models::{CreateCustomerOrder, CustomerOrder, CustomerOrderItem},
    stock::{self, Location},
};

#[derive(Serialize)]
pub struct CreateCustomerOrderResponse {
    pub success: bool,
    pub message: String,
    pub order_id: Uuid,
}

/// Direct warehouse-to-customer sale. Shares the ledger debit with the
/// dispatch path, so an under-stocked line rolls back the whole order.
pub async fn create_customer_order(
    State(db): State<Database>,
    Json(form): Json<CreateCustomerOrder>,
) -> Result<Json<CreateCustomerOrderResponse>, ApiError> {
    if form.customer_name.trim().is_empty() || form.items.is_empty() {
        return Err(ApiError::Validation(
            "Customer name and items required".to_string(),
        ));
    }

    for item in &form.items {
        if item.qty <= 0 {
            return Err(ApiError::Validation(format!(
                "Invalid quantity for product {}",
                item.product_id
            )));
        }
    }

    let warehouse_exists =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM warehouses WHERE id = $1")
            .bind(form.warehouse_id)
            .fetch_one(&db)
            .await?;

    if warehouse_exists == 0 {
        return Err(ApiError::NotFound("Warehouse not found".to_string()));
    }

    let mut tx = db.begin().await?;

    let order_id: Uuid = sqlx::query_scalar(
        "INSERT INTO customer_orders \
         (warehouse_id, customer_name, total_amount, discount, final_amount) \
         VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(form.warehouse_id)
    .bind(form.customer_name.trim())
    .bind(form.total_amount)
    .bind(form.order_discount)
    .bind(form.final_amount)
    .fetch_one(&mut *tx)
    .await?;

    for item in &form.items {
        let product_name: String = sqlx::query_scalar("SELECT name FROM products WHERE id = $1")
            .bind(item.product_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| ApiError::Validation(format!("Unknown product {}", item.product_id)))?;

        sqlx::query(
            "INSERT INTO customer_order_items \
             (order_id, product_id, product_name, quantity, mrp, discount, selling_price) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(order_id)
        .bind(item.product_id)
        .bind(&product_name)
        .bind(item.qty)
        .bind(item.mrp)
        .bind(item.discount)
        .bind(item.total)
        .execute(&mut *tx)
        .await?;

        stock::debit(
            &mut tx,
            Location::Warehouse(form.warehouse_id),
            item.product_id,
            item.qty,
            &product_name,
        )
        .await?;
    }

    tx.commit().await?;

    Ok(Json(CreateCustomerOrderResponse {
        success: true,
        message: "Order saved successfully".to_string(),
        order_id,
    }))
}

#[derive(Debug, Deserialize)]
pub struct CustomerOrdersQuery {
    pub warehouse_id: Uuid,
}

#[derive(Serialize)]
pub struct CustomerOrderView {
    #[serde(flatten)]
    pub order: CustomerOrder,
    pub items: Vec<CustomerOrderItem>,
}

#[derive(Serialize)]
pub struct CustomerOrdersResponse {
    pub success: bool,
    pub orders: Vec<CustomerOrderView>,
}

pub async fn list_customer_orders(
    State(db): State<Database>,
    Query(query): Query<CustomerOrdersQuery>,
) -> Result<Json<CustomerOrdersResponse>, ApiError> {
    let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM warehouses WHERE id = $1")
        .bind(query.warehouse_id)
        .fetch_one(&db)
        .await?;

    if exists == 0 {
        return Err(ApiError::NotFound("Warehouse not found".to_string()));
    }

    let orders = sqlx::query_as::<_, CustomerOrder>(
        "SELECT * FROM customer_orders WHERE warehouse_id = $1 ORDER BY purchase_date DESC",
    )
    .bind(query.warehouse_id)
    .fetch_all(&db)
    .await?;

    let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();

    let items = sqlx::query_as::<_, CustomerOrderItem>(
        "SELECT order_id, product_id, product_name, quantity, mrp, discount, selling_price \
         FROM customer_order_items WHERE order_id = ANY($1)",
    )
    .bind(&order_ids)
    .fetch_all(&db)
    .await?;

    let orders = orders
        .into_iter()
        .map(|order| {
            let order_items = items
                .iter()
                .filter(|item| item.order_id == order.id)
                .cloned()
                .collect();
            CustomerOrderView {
                order,
                items: order_items,
            }
        })
        .collect();

    Ok(Json(CustomerOrdersResponse {
        success: true,
        orders,
    }))
}
