use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Warehouse {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateWarehouse {
    pub name: String,
    pub location: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateWarehouse {
    pub name: String,
    pub location: String,
    pub email: String,
}

/// One row per product for the warehouse inventory view; products the
/// warehouse never stocked show up with qty 0.
#[derive(Debug, Serialize, FromRow)]
pub struct InventoryView {
    pub product_id: Uuid,
    pub product: String,
    pub sku: String,
    pub ean: String,
    pub unit: String,
    pub qty: i32,
    pub mrp: Decimal,
}
