use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct SaleItemRequest {
    pub product_id: Uuid,
    pub qty: i32,
    pub mrp: Decimal,
    pub discount: Decimal,
    pub final_value: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct RecordSaleRequest {
    pub distributor_id: Uuid,
    pub items: Vec<SaleItemRequest>,
}

/// Flat sale/item join row; handlers group these per sale for the history
/// response.
#[derive(Debug, FromRow)]
pub struct SaleHistoryRow {
    pub sale_id: Uuid,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub product_id: Uuid,
    pub product_name: String,
    pub qty: i32,
    pub mrp: Decimal,
    pub discount: Decimal,
    pub final_value: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct CustomerOrderItemRequest {
    pub product_id: Uuid,
    pub qty: i32,
    pub mrp: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct CreateCustomerOrder {
    pub warehouse_id: Uuid,
    pub customer_name: String,
    pub items: Vec<CustomerOrderItemRequest>,
    pub order_discount: Decimal,
    pub total_amount: Decimal,
    pub final_amount: Decimal,
}

#[derive(Debug, Serialize, FromRow)]
pub struct CustomerOrder {
    pub id: Uuid,
    pub warehouse_id: Uuid,
    pub customer_name: String,
    pub total_amount: Decimal,
    pub discount: Decimal,
    pub final_amount: Decimal,
    pub purchase_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CustomerOrderItem {
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub mrp: Decimal,
    pub discount: Decimal,
    pub selling_price: Decimal,
}
