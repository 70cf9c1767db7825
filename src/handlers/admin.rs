use axum::{
    extract::{Path, State},
    response::Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    database::Database,
    error::ApiError,
    handlers::{orders::advance_order, MessageResponse},
    middleware::AdminUser,
    models::{ActivityLog, OrderStatus},
};

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

// Admin override runs through the same transition path as the warehouse and
// distributor endpoints, so stock moves exactly once per transition no
// matter who drives it.
pub async fn update_order_status(
    admin: AdminUser,
    State(db): State<Database>,
    Path(order_id): Path<Uuid>,
    Json(form): Json<UpdateStatusRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let target = OrderStatus::parse(&form.status)
        .ok_or_else(|| ApiError::Validation(format!("Unknown status '{}'", form.status)))?;

    log::info!("admin {} setting order {} to {}", admin.id, order_id, target);
    advance_order(&db, order_id, target, "admin").await?;

    Ok(MessageResponse::new(
        "Order status updated and history recorded",
    ))
}

#[derive(Serialize)]
pub struct SummaryResponse {
    pub success: bool,
    pub total_products: i64,
    pub total_warehouses: i64,
    pub total_distributors: i64,
    pub total_sales: i64,
    pub total_orders: i64,
}

pub async fn summary(
    _admin: AdminUser,
    State(db): State<Database>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let total_products = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products")
        .fetch_one(&db)
        .await?;
    let total_warehouses = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM warehouses")
        .fetch_one(&db)
        .await?;
    let total_distributors = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM distributors")
        .fetch_one(&db)
        .await?;
    let total_sales = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sales")
        .fetch_one(&db)
        .await?;
    let total_orders =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(DISTINCT order_id) FROM distributor_orders")
            .fetch_one(&db)
            .await?;

    Ok(Json(SummaryResponse {
        success: true,
        total_products,
        total_warehouses,
        total_distributors,
        total_sales,
        total_orders,
    }))
}

#[derive(Serialize)]
pub struct AdminLogsResponse {
    pub success: bool,
    pub logs: Vec<ActivityLog>,
}

pub async fn activity_logs(
    _admin: AdminUser,
    State(db): State<Database>,
) -> Result<Json<AdminLogsResponse>, ApiError> {
    let logs = sqlx::query_as::<_, ActivityLog>(
        "SELECT * FROM activity_logs ORDER BY created_at DESC LIMIT 50",
    )
    .fetch_all(&db)
    .await?;

    Ok(Json(AdminLogsResponse {
        success: true,
        logs,
    }))
}

#[derive(Debug, Serialize, FromRow)]
pub struct OrderHistoryView {
    pub id: Uuid,
    pub order_id: Uuid,
    pub warehouse_name: String,
    pub distributor_name: String,
    pub product_name: String,
    pub qty: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct OrderHistoryResponse {
    pub success: bool,
    pub orders: Vec<OrderHistoryView>,
}

pub async fn order_status_history(
    _admin: AdminUser,
    State(db): State<Database>,
) -> Result<Json<OrderHistoryResponse>, ApiError> {
    let orders = sqlx::query_as::<_, OrderHistoryView>(
        "SELECT h.id, h.order_id, \
                COALESCE(w.name, 'Unknown warehouse') AS warehouse_name, \
                COALESCE(d.name, 'Unknown distributor') AS distributor_name, \
                COALESCE(p.name, 'Unknown product') AS product_name, \
                h.qty, h.status, h.created_at \
         FROM order_status_history h \
         LEFT JOIN warehouses w ON h.warehouse_id = w.id \
         LEFT JOIN distributors d ON h.distributor_id = d.id \
         LEFT JOIN products p ON h.product_id = p.id \
         ORDER BY h.created_at DESC \
         LIMIT 50",
    )
    .fetch_all(&db)
    .await?;

    Ok(Json(OrderHistoryResponse {
        success: true,
        orders,
    }))
}

#[derive(Debug, Serialize, FromRow)]
pub struct MostSold {
    pub product: String,
    pub qty: i64,
}

impl Default for MostSold {
    fn default() -> Self {
        Self {
            product: "N/A".to_string(),
            qty: 0,
        }
    }
}

#[derive(Debug, Serialize, FromRow)]
pub struct MonthlyAmount {
    pub month: String,
    pub amount: Decimal,
}

#[derive(Debug, Serialize, FromRow)]
pub struct WarehouseSaleRow {
    pub product: String,
    pub qty: i32,
    pub amount: Decimal,
    pub date: DateTime<Utc>,
    pub customer: String,
}

#[derive(Debug, Serialize, FromRow)]
pub struct WarehouseOrderRow {
    pub order_id: Uuid,
    pub distributor: String,
    pub product: String,
    pub quantity: i32,
    pub total: Decimal,
    pub status: String,
    pub date: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct WarehouseOverviewResponse {
    pub success: bool,
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub total_stock: i64,
    pub most_sold: MostSold,
    pub monthly_sales: Vec<MonthlyAmount>,
    pub sales: Vec<WarehouseSaleRow>,
    pub orders: Vec<WarehouseOrderRow>,
}

pub async fn warehouse_overview(
    _admin: AdminUser,
    State(db): State<Database>,
    Path(warehouse_id): Path<Uuid>,
) -> Result<Json<WarehouseOverviewResponse>, ApiError> {
    let warehouse: Option<(Uuid, String, String)> =
        sqlx::query_as("SELECT id, name, location FROM warehouses WHERE id = $1")
            .bind(warehouse_id)
            .fetch_optional(&db)
            .await?;

    let (id, name, location) =
        warehouse.ok_or_else(|| ApiError::NotFound("Warehouse not found".to_string()))?;

    let total_stock = sqlx::query_scalar::<_, i64>(
        "SELECT COALESCE(SUM(qty), 0)::bigint FROM warehouse_inventory WHERE warehouse_id = $1",
    )
    .bind(warehouse_id)
    .fetch_one(&db)
    .await?;

    let sales = sqlx::query_as::<_, WarehouseSaleRow>(
        "SELECT oi.product_name AS product, oi.quantity AS qty, \
                oi.selling_price AS amount, o.purchase_date AS date, \
                o.customer_name AS customer \
         FROM customer_order_items oi \
         JOIN customer_orders o ON oi.order_id = o.id \
         WHERE o.warehouse_id = $1 \
         ORDER BY o.purchase_date DESC",
    )
    .bind(warehouse_id)
    .fetch_all(&db)
    .await?;

    // Most sold across both channels: direct customer orders and
    // distributor orders.
    let most_sold = sqlx::query_as::<_, MostSold>(
        "SELECT product, SUM(qty)::bigint AS qty FROM ( \
             SELECT oi.product_name AS product, SUM(oi.quantity)::bigint AS qty \
             FROM customer_order_items oi \
             JOIN customer_orders o ON oi.order_id = o.id \
             WHERE o.warehouse_id = $1 \
             GROUP BY oi.product_name \
             UNION ALL \
             SELECT p.name AS product, SUM(o.qty)::bigint AS qty \
             FROM distributor_orders o \
             JOIN products p ON o.product_id = p.id \
             WHERE o.warehouse_id = $1 \
             GROUP BY p.name \
         ) combined \
         GROUP BY product \
         ORDER BY qty DESC \
         LIMIT 1",
    )
    .bind(warehouse_id)
    .fetch_optional(&db)
    .await?
    .unwrap_or_default();

    let monthly_sales = sqlx::query_as::<_, MonthlyAmount>(
        "SELECT month, SUM(amount) AS amount FROM ( \
             SELECT to_char(o.purchase_date, 'YYYY-MM') AS month, \
                    SUM(oi.selling_price) AS amount \
             FROM customer_orders o \
             JOIN customer_order_items oi ON oi.order_id = o.id \
             WHERE o.warehouse_id = $1 \
               AND o.purchase_date >= now() - interval '6 months' \
             GROUP BY month \
             UNION ALL \
             SELECT to_char(o.created_at, 'YYYY-MM') AS month, \
                    SUM(o.qty * p.sellingprice) AS amount \
             FROM distributor_orders o \
             JOIN products p ON o.product_id = p.id \
             WHERE o.warehouse_id = $1 \
               AND o.created_at >= now() - interval '6 months' \
             GROUP BY month \
         ) combined \
         GROUP BY month \
         ORDER BY month ASC",
    )
    .bind(warehouse_id)
    .fetch_all(&db)
    .await?;

    let orders = sqlx::query_as::<_, WarehouseOrderRow>(
        "SELECT o.order_id, \
                COALESCE(d.name, 'Unknown distributor') AS distributor, \
                p.name AS product, o.qty AS quantity, \
                o.qty * p.sellingprice AS total, \
                o.status, o.created_at AS date \
         FROM distributor_orders o \
         JOIN products p ON o.product_id = p.id \
         LEFT JOIN distributors d ON o.distributor_id = d.id \
         WHERE o.warehouse_id = $1 \
         ORDER BY o.created_at DESC",
    )
    .bind(warehouse_id)
    .fetch_all(&db)
    .await?;

    Ok(Json(WarehouseOverviewResponse {
        success: true,
        id,
        name,
        location,
        total_stock,
        most_sold,
        monthly_sales,
        sales,
        orders,
    }))
}

#[derive(Debug, Serialize, FromRow)]
pub struct DistributorSaleRow {
    pub product: String,
    pub qty: i32,
    pub amount: Decimal,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct IncomingOrderRow {
    pub order_id: Uuid,
    pub warehouse: String,
    pub product: String,
    pub quantity: i32,
    pub status: String,
    pub date: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct DistributorOverviewResponse {
    pub success: bool,
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub warehouse: String,
    pub total_stock: i64,
    pub most_sold: MostSold,
    pub monthly_sales: Vec<MonthlyAmount>,
    pub sales: Vec<DistributorSaleRow>,
    pub incoming: Vec<IncomingOrderRow>,
}

pub async fn distributor_overview(
    _admin: AdminUser,
    State(db): State<Database>,
    Path(distributor_id): Path<Uuid>,
) -> Result<Json<DistributorOverviewResponse>, ApiError> {
    let distributor: Option<(Uuid, String, String, String)> = sqlx::query_as(
        "SELECT d.id, d.name, d.email, w.name \
         FROM distributors d \
         JOIN warehouses w ON d.warehouse_id = w.id \
         WHERE d.id = $1",
    )
    .bind(distributor_id)
    .fetch_optional(&db)
    .await?;

    let (id, name, email, warehouse) =
        distributor.ok_or_else(|| ApiError::NotFound("Distributor not found".to_string()))?;

    let total_stock = sqlx::query_scalar::<_, i64>(
        "SELECT COALESCE(SUM(qty), 0)::bigint FROM distributor_stock WHERE distributor_id = $1",
    )
    .bind(distributor_id)
    .fetch_one(&db)
    .await?;

    let sales = sqlx::query_as::<_, DistributorSaleRow>(
        "SELECT p.name AS product, si.qty, si.final_value AS amount, s.created_at AS date \
         FROM sale_items si \
         JOIN sales s ON si.sale_id = s.id \
         JOIN products p ON si.product_id = p.id \
         WHERE s.distributor_id = $1 \
         ORDER BY s.created_at DESC",
    )
    .bind(distributor_id)
    .fetch_all(&db)
    .await?;

    let most_sold = sqlx::query_as::<_, MostSold>(
        "SELECT p.name AS product, SUM(si.qty)::bigint AS qty \
         FROM sale_items si \
         JOIN sales s ON si.sale_id = s.id \
         JOIN products p ON si.product_id = p.id \
         WHERE s.distributor_id = $1 \
         GROUP BY p.name \
         ORDER BY qty DESC \
         LIMIT 1",
    )
    .bind(distributor_id)
    .fetch_optional(&db)
    .await?
    .unwrap_or_default();

    let monthly_sales = sqlx::query_as::<_, MonthlyAmount>(
        "SELECT to_char(s.created_at, 'YYYY-MM') AS month, SUM(s.total_amount) AS amount \
         FROM sales s \
         WHERE s.distributor_id = $1 \
           AND s.created_at >= now() - interval '6 months' \
         GROUP BY month \
         ORDER BY month ASC",
    )
    .bind(distributor_id)
    .fetch_all(&db)
    .await?;

    let incoming = sqlx::query_as::<_, IncomingOrderRow>(
        "SELECT o.order_id, \
                COALESCE(w.name, 'Unknown warehouse') AS warehouse, \
                p.name AS product, o.qty AS quantity, o.status, o.created_at AS date \
         FROM distributor_orders o \
         JOIN products p ON o.product_id = p.id \
         LEFT JOIN warehouses w ON o.warehouse_id = w.id \
         WHERE o.distributor_id = $1 \
         ORDER BY o.created_at DESC",
    )
    .bind(distributor_id)
    .fetch_all(&db)
    .await?;

    Ok(Json(DistributorOverviewResponse {
        success: true,
        id,
        name,
        email,
        warehouse,
        total_stock,
        most_sold,
        monthly_sales,
        sales,
        incoming,
    }))
}

#[derive(Debug, Serialize, FromRow)]
pub struct DistributorSalesSummaryRow {
    pub distributor: String,
    pub product: String,
    pub total_sold: i64,
}

#[derive(Serialize)]
pub struct DistributorSalesResponse {
    pub success: bool,
    pub sales: Vec<DistributorSalesSummaryRow>,
}

pub async fn distributor_sales(
    _admin: AdminUser,
    State(db): State<Database>,
) -> Result<Json<DistributorSalesResponse>, ApiError> {
    let sales = sqlx::query_as::<_, DistributorSalesSummaryRow>(
        "SELECT d.name AS distributor, p.name AS product, SUM(si.qty)::bigint AS total_sold \
         FROM sale_items si \
         JOIN sales s ON si.sale_id = s.id \
         JOIN distributors d ON s.distributor_id = d.id \
         JOIN products p ON si.product_id = p.id \
         GROUP BY d.name, p.name \
         ORDER BY total_sold DESC",
    )
    .fetch_all(&db)
    .await?;

    Ok(Json(DistributorSalesResponse {
        success: true,
        sales,
    }))
}
