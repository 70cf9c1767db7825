use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
    pub ean: String,
    pub unit: String,
    pub mrp: Decimal,
    pub sellingprice: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateProduct {
    pub name: String,
    pub sku: String,
    pub ean: String,
    pub unit: String,
    pub mrp: Decimal,
    pub sellingprice: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProduct {
    pub name: String,
    pub mrp: Decimal,
    pub sellingprice: Decimal,
}
