pub mod activity;
pub mod admin;
pub mod auth;
pub mod customer_orders;
pub mod distributors;
pub mod orders;
pub mod products;
pub mod sales;
pub mod warehouses;

use axum::response::Json;
use serde::Serialize;

/// Body for endpoints that only report an outcome.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
        })
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
}

pub async fn healthcheck() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
