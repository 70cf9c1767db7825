use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// Lifecycle of a distributor order. Status only ever moves forward:
/// Pending → Shipped → Delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Shipped,
    Delivered,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Some(OrderStatus::Pending),
            "shipped" => Some(OrderStatus::Shipped),
            "delivered" => Some(OrderStatus::Delivered),
            _ => None,
        }
    }

    /// The only status a transition into `self` may start from. `None` for
    /// Pending: nothing transitions back into Pending.
    pub fn predecessor(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => None,
            OrderStatus::Shipped => Some(OrderStatus::Pending),
            OrderStatus::Delivered => Some(OrderStatus::Shipped),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One order line joined with the names needed for stock messages, history
/// rows and activity logs during a transition.
#[derive(Debug, FromRow)]
pub struct OrderLine {
    pub warehouse_id: Uuid,
    pub distributor_id: Uuid,
    pub product_id: Uuid,
    pub qty: i32,
    pub status: String,
    pub product_name: String,
    pub warehouse_name: String,
    pub distributor_name: String,
}

#[derive(Debug, Deserialize)]
pub struct OrderItemRequest {
    pub product_id: Uuid,
    pub qty: i32,
}

#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub distributor_id: Uuid,
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Deserialize)]
pub struct DispatchRequest {
    pub order_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmDeliveryRequest {
    pub order_id: Uuid,
}

/// Incoming-order line as the warehouse sees it.
#[derive(Debug, Serialize, FromRow)]
pub struct WarehouseOrderView {
    pub order_id: Uuid,
    pub distributor_name: String,
    pub product_name: String,
    pub quantity: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Order line as the distributor sees it.
#[derive(Debug, Serialize, FromRow)]
pub struct DistributorOrderView {
    pub order_id: Uuid,
    pub warehouse_name: String,
    pub product_name: String,
    pub qty: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Per-status counts for a warehouse's incoming orders.
#[derive(Debug, Default, Serialize)]
pub struct OrderSummary {
    pub pending: i64,
    pub shipped: i64,
    pub delivered: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!(OrderStatus::parse("Pending"), Some(OrderStatus::Pending));
        assert_eq!(OrderStatus::parse("shipped"), Some(OrderStatus::Shipped));
        assert_eq!(OrderStatus::parse("DELIVERED"), Some(OrderStatus::Delivered));
        assert_eq!(OrderStatus::parse("Cancelled"), None);
        assert_eq!(OrderStatus::parse(""), None);
    }

    #[test]
    fn lifecycle_is_a_single_forward_chain() {
        // Pending is the entry state; nothing moves back into it.
        assert_eq!(OrderStatus::Pending.predecessor(), None);
        assert_eq!(OrderStatus::Shipped.predecessor(), Some(OrderStatus::Pending));
        assert_eq!(
            OrderStatus::Delivered.predecessor(),
            Some(OrderStatus::Shipped)
        );
    }

    #[test]
    fn display_matches_stored_form() {
        assert_eq!(OrderStatus::Pending.to_string(), "Pending");
        assert_eq!(OrderStatus::Shipped.to_string(), "Shipped");
        assert_eq!(OrderStatus::Delivered.to_string(), "Delivered");
    }
}
