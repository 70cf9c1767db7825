use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    database::Database,
    error::ApiError,
    handlers::{activity::log_activity, MessageResponse},
    models::{
        ConfirmDeliveryRequest, DispatchRequest, DistributorOrderView, OrderLine, OrderStatus,
        OrderSummary, PlaceOrderRequest, WarehouseOrderView,
    },
    stock::{self, Location},
};

// Lines of one order, locked for the duration of the transition, joined
// with the names used in stock errors, history rows and activity logs.
// Orders outlive their parties, hence the LEFT JOINs.
const ORDER_LINES_FOR_UPDATE: &str =
    "SELECT o.warehouse_id, o.distributor_id, o.product_id, o.qty, o.status, \
            p.name AS product_name, \
            COALESCE(w.name, 'Unknown warehouse') AS warehouse_name, \
            COALESCE(d.name, 'Unknown distributor') AS distributor_name \
     FROM distributor_orders o \
     JOIN products p ON o.product_id = p.id \
     LEFT JOIN warehouses w ON o.warehouse_id = w.id \
     LEFT JOIN distributors d ON o.distributor_id = d.id \
     WHERE o.order_id = $1 \
     FOR UPDATE OF o";

/// Advance every line of an order to `target`, applying the stock movement
/// that belongs to the transition, in one transaction.
///
/// The transition only applies while all lines sit in the target's
/// predecessor status; anything else is rejected without mutation. The
/// status flip itself is a conditional update, so a lost race rolls the
/// whole transaction back instead of double-moving stock.
pub(crate) async fn advance_order(
    db: &Database,
    order_id: Uuid,
    target: OrderStatus,
    actor: &str,
) -> Result<(), ApiError> {
    let expected = target.predecessor().ok_or_else(|| {
        ApiError::InvalidTransition("Orders cannot move back to Pending".to_string())
    })?;

    let mut tx = db.begin().await?;

    let lines = sqlx::query_as::<_, OrderLine>(ORDER_LINES_FOR_UPDATE)
        .bind(order_id)
        .fetch_all(&mut *tx)
        .await?;

    if lines.is_empty() {
        return Err(ApiError::NotFound("Order not found".to_string()));
    }

    for line in &lines {
        if line.status != expected.as_str() {
            return Err(ApiError::InvalidTransition(format!(
                "Order {} is {}; only {} orders can be marked {}",
                order_id, line.status, expected, target
            )));
        }
    }

    // The stock movement tied to this transition: dispatch debits the
    // warehouse, delivery credits the distributor.
    for line in &lines {
        match target {
            OrderStatus::Shipped => {
                let location = Location::Warehouse(line.warehouse_id);
                stock::ensure_row(&mut tx, location, line.product_id).await?;
                stock::debit(&mut tx, location, line.product_id, line.qty, &line.product_name)
                    .await?;
            }
            OrderStatus::Delivered => {
                stock::credit(
                    &mut tx,
                    Location::Distributor(line.distributor_id),
                    line.product_id,
                    line.qty,
                )
                .await?;
            }
            OrderStatus::Pending => unreachable!("Pending has no predecessor"),
        }
    }

    let flipped = sqlx::query(
        "UPDATE distributor_orders SET status = $1 WHERE order_id = $2 AND status = $3",
    )
    .bind(target.as_str())
    .bind(order_id)
    .bind(expected.as_str())
    .execute(&mut *tx)
    .await?;

    if flipped.rows_affected() != lines.len() as u64 {
        return Err(ApiError::InvalidTransition(format!(
            "Order {} changed concurrently; no update applied",
            order_id
        )));
    }

    for line in &lines {
        sqlx::query(
            "INSERT INTO order_status_history \
             (order_id, warehouse_id, distributor_id, product_id, qty, status) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(order_id)
        .bind(line.warehouse_id)
        .bind(line.distributor_id)
        .bind(line.product_id)
        .bind(line.qty)
        .bind(target.as_str())
        .execute(&mut *tx)
        .await?;

        let source = format!("{} ({})", line.warehouse_name, line.distributor_name);
        let description = format!(
            "Order #{} updated to \"{}\" for {} by {}",
            order_id, target, line.product_name, actor
        );
        log_activity(&mut *tx, &source, &description).await?;
    }

    tx.commit().await?;

    Ok(())
}

#[derive(Serialize)]
pub struct PlaceOrderResponse {
    pub success: bool,
    pub message: String,
    pub order_id: Uuid,
}

// Distributor places a multi-item order; every line starts Pending and all
// lines share one generated order id.
pub async fn place_order(
    State(db): State<Database>,
    Json(form): Json<PlaceOrderRequest>,
) -> Result<Json<PlaceOrderResponse>, ApiError> {
    if form.items.is_empty() {
        return Err(ApiError::Validation(
            "At least one product is required".to_string(),
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

    let warehouse_id: Uuid =
        sqlx::query_scalar("SELECT warehouse_id FROM distributors WHERE id = $1")
            .bind(form.distributor_id)
            .fetch_optional(&db)
            .await?
            .ok_or_else(|| ApiError::NotFound("Distributor not found".to_string()))?;

    for item in &form.items {
        let known = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products WHERE id = $1")
            .bind(item.product_id)
            .fetch_one(&db)
            .await?;

        if known == 0 {
            return Err(ApiError::Validation(format!(
                "Unknown product {}",
                item.product_id
            )));
        }
    }

    let order_id = Uuid::new_v4();
    let mut tx = db.begin().await?;

    for item in &form.items {
        sqlx::query(
            "INSERT INTO distributor_orders \
             (order_id, warehouse_id, distributor_id, product_id, qty, status) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(order_id)
        .bind(warehouse_id)
        .bind(form.distributor_id)
        .bind(item.product_id)
        .bind(item.qty)
        .bind(OrderStatus::Pending.as_str())
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(Json(PlaceOrderResponse {
        success: true,
        message: "Order placed successfully".to_string(),
        order_id,
    }))
}

pub async fn dispatch(
    State(db): State<Database>,
    Json(form): Json<DispatchRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    advance_order(&db, form.order_id, OrderStatus::Shipped, "warehouse").await?;
    Ok(MessageResponse::new("Order dispatched successfully"))
}

pub async fn confirm_delivery(
    State(db): State<Database>,
    Json(form): Json<ConfirmDeliveryRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    advance_order(&db, form.order_id, OrderStatus::Delivered, "distributor").await?;
    Ok(MessageResponse::new("Delivery confirmed"))
}

#[derive(Debug, Deserialize)]
pub struct IncomingOrdersQuery {
    pub warehouse_id: Uuid,
    pub status: Option<String>,
}

#[derive(Serialize)]
pub struct IncomingOrdersResponse {
    pub success: bool,
    pub orders: Vec<WarehouseOrderView>,
    pub summary: OrderSummary,
}

pub async fn warehouse_incoming_orders(
    State(db): State<Database>,
    Query(query): Query<IncomingOrdersQuery>,
) -> Result<Json<IncomingOrdersResponse>, ApiError> {
    let status = match &query.status {
        Some(raw) => Some(
            OrderStatus::parse(raw)
                .ok_or_else(|| ApiError::Validation(format!("Unknown status '{}'", raw)))?,
        ),
        None => None,
    };

    let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM warehouses WHERE id = $1")
        .bind(query.warehouse_id)
        .fetch_one(&db)
        .await?;

    if exists == 0 {
        return Err(ApiError::NotFound("Warehouse not found".to_string()));
    }

    let base = "SELECT o.order_id, \
                       COALESCE(d.name, 'Unknown distributor') AS distributor_name, \
                       p.name AS product_name, o.qty AS quantity, o.status, o.created_at \
                FROM distributor_orders o \
                JOIN products p ON o.product_id = p.id \
                LEFT JOIN distributors d ON o.distributor_id = d.id \
                WHERE o.warehouse_id = $1";

    let orders = match status {
        Some(status) => {
            let sql = format!("{} AND o.status = $2 ORDER BY o.created_at DESC", base);
            sqlx::query_as::<_, WarehouseOrderView>(&sql)
                .bind(query.warehouse_id)
                .bind(status.as_str())
                .fetch_all(&db)
                .await?
        }
        None => {
            let sql = format!("{} ORDER BY o.created_at DESC", base);
            sqlx::query_as::<_, WarehouseOrderView>(&sql)
                .bind(query.warehouse_id)
                .fetch_all(&db)
                .await?
        }
    };

    let counts: Vec<(String, i64)> = sqlx::query_as(
        "SELECT status, COUNT(*) FROM distributor_orders WHERE warehouse_id = $1 GROUP BY status",
    )
    .bind(query.warehouse_id)
    .fetch_all(&db)
    .await?;

    let mut summary = OrderSummary::default();
    for (status, count) in counts {
        match OrderStatus::parse(&status) {
            Some(OrderStatus::Pending) => summary.pending = count,
            Some(OrderStatus::Shipped) => summary.shipped = count,
            Some(OrderStatus::Delivered) => summary.delivered = count,
            None => {}
        }
    }

    Ok(Json(IncomingOrdersResponse {
        success: true,
        orders,
        summary,
    }))
}

#[derive(Debug, Deserialize)]
pub struct DistributorOrdersQuery {
    pub distributor_id: Uuid,
}

#[derive(Serialize)]
pub struct DistributorOrdersResponse {
    pub success: bool,
    pub orders: Vec<DistributorOrderView>,
}

pub async fn distributor_orders(
    State(db): State<Database>,
    Query(query): Query<DistributorOrdersQuery>,
) -> Result<Json<DistributorOrdersResponse>, ApiError> {
    let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM distributors WHERE id = $1")
        .bind(query.distributor_id)
        .fetch_one(&db)
        .await?;

    if exists == 0 {
        return Err(ApiError::NotFound("Distributor not found".to_string()));
    }

    let orders = sqlx::query_as::<_, DistributorOrderView>(
        "SELECT o.order_id, \
                COALESCE(w.name, 'Unknown warehouse') AS warehouse_name, \
                p.name AS product_name, o.qty, o.status, o.created_at \
         FROM distributor_orders o \
         JOIN products p ON o.product_id = p.id \
         LEFT JOIN warehouses w ON o.warehouse_id = w.id \
         WHERE o.distributor_id = $1 \
         ORDER BY o.created_at DESC",
    )
    .bind(query.distributor_id)
    .fetch_all(&db)
    .await?;

    Ok(Json(DistributorOrdersResponse {
        success: true,
        orders,
    }))
}
