use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Distributor {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub city: String,
    pub warehouse_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateDistributor {
    pub name: String,
    pub email: String,
    pub password: String,
    pub city: String,
    pub warehouse_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDistributor {
    pub name: String,
    pub city: String,
    pub email: String,
    pub warehouse_id: Uuid,
}

/// Stock position per product: quantity on hand plus what is still inbound
/// on Pending orders.
#[derive(Debug, Serialize, FromRow)]
pub struct DistributorStockView {
    pub product_id: Uuid,
    pub product_name: String,
    pub sku: String,
    pub mrp: Decimal,
    pub qty_available: i32,
    pub pending_orders: i64,
}

/// Product available to order from the assigned warehouse.
#[derive(Debug, Serialize, FromRow)]
pub struct OrderableProduct {
    pub id: Uuid,
    pub name: String,
    pub qty: i32,
}
