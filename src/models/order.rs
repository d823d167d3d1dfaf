use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::cart::CartLine;
use crate::error::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "processing" => Ok(OrderStatus::Processing),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(AppError::Validation(format!(
                "Invalid order status '{}'",
                other
            ))),
        }
    }
}

/// A persisted order. `order_items` is the frozen JSON snapshot of the cart
/// lines at checkout time; `total_sets`/`total_amount` were computed from
/// that snapshot at creation and are never recomputed.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub order_id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub customer_city: String,
    pub customer_state: String,
    pub customer_pincode: String,
    pub customer_message: String,
    pub order_items: String,
    pub total_sets: i32,
    pub total_amount: Decimal,
    pub order_status: String,
    pub order_date: DateTime<Utc>,
}

impl Order {
    /// Decodes the embedded cart-line snapshot.
    pub fn items(&self) -> Result<Vec<CartLine>> {
        serde_json::from_str(&self.order_items)
            .map_err(|e| AppError::Internal(format!("Corrupt order items snapshot: {}", e)))
    }
}

/// Input to `Store::create_order`. The gateway assigns the record id and
/// the order date.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub customer_city: String,
    pub customer_state: String,
    pub customer_pincode: String,
    pub customer_message: String,
    pub order_items: String,
    pub total_sets: i32,
    pub total_amount: Decimal,
    pub order_status: OrderStatus,
}

/// Customer-entered checkout fields. All default to empty so that missing
/// fields are reported by validation with a field-identifying message
/// instead of a deserialization error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetails {
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: String,
    #[serde(default)]
    pub customer_phone: String,
    #[serde(default)]
    pub customer_address: String,
    #[serde(default)]
    pub customer_city: String,
    #[serde(default)]
    pub customer_state: String,
    #[serde(default)]
    pub customer_pincode: String,
    #[serde(default)]
    pub customer_message: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    #[serde(flatten)]
    pub customer: CustomerDetails,
    #[serde(default)]
    pub items: Vec<CartLine>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub success: bool,
    pub order_id: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub limit: Option<i64>,
}
