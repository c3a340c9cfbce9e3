//! Order model: header, line items, and the order detail view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Shown in place of a line's product when that product was deleted.
pub const MISSING_PRODUCT_PLACEHOLDER: &str = "This product is no longer available.";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "order_status")]
pub enum OrderStatus {
    Pending,
    Paid,
    Processing,
    Shipped,
    Delivered,
    Failed,
    Cancelled,
}

impl OrderStatus {
    /// Cancelled orders never contribute to revenue.
    pub fn counts_toward_revenue(&self) -> bool {
        !matches!(self, OrderStatus::Cancelled)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Option<Uuid>,
    pub email: String,
    pub total: f64,
    pub status: OrderStatus,
    pub payment_method: Option<String>,
    pub payment_status: String,
    pub payment_reference: Option<String>,
    pub shipping_address: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// List row joined with the ordering customer.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub id: Uuid,
    pub customer_id: Option<Uuid>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub email: String,
    pub total: f64,
    pub status: OrderStatus,
    pub payment_status: String,
    pub item_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Raw order line left-joined with its product.
#[derive(Debug, Clone, FromRow)]
pub struct OrderItemRow {
    pub product_id: Option<Uuid>,
    pub product_name: Option<String>,
    pub product_price: Option<f64>,
    pub product_images: Option<Vec<String>>,
    pub quantity: i32,
    pub price: f64,
    pub size: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineProduct {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub images: Vec<String>,
}

/// Order line as shown in the order detail; `product` is null once deleted.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product: Option<OrderLineProduct>,
    pub product_name: String,
    pub quantity: i32,
    pub price: f64,
    pub size: Option<String>,
    pub color: Option<String>,
}

impl From<OrderItemRow> for OrderLine {
    fn from(row: OrderItemRow) -> Self {
        let product = match (row.product_id, row.product_name) {
            (Some(id), Some(name)) => Some(OrderLineProduct {
                id,
                name,
                price: row.product_price.unwrap_or_default(),
                images: row.product_images.unwrap_or_default(),
            }),
            _ => None,
        };
        let product_name = product
            .as_ref()
            .map(|p| p.name.clone())
            .unwrap_or_else(|| MISSING_PRODUCT_PLACEHOLDER.to_string());

        Self {
            product,
            product_name,
            quantity: row.quantity,
            price: row.price,
            size: row.size,
            color: row.color,
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRef {
    pub id: Uuid,
    pub fullname: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub customer: Option<CustomerRef>,
    pub items: Vec<OrderLine>,
}

#[derive(Debug, Clone, Deserialize, Validate, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrder {
    pub status: Option<OrderStatus>,
    #[validate(email(message = "Please provide a valid email"))]
    pub email: Option<String>,
    pub payment_method: Option<String>,
    pub payment_status: Option<String>,
    pub payment_reference: Option<String>,
    pub shipping_address: Option<ShippingAddress>,
    /// Line items are owned by checkout; present only to reject the request.
    pub items: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateOrderStatus {
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct OrderFilters {
    pub status: Option<OrderStatus>,
    pub customer_id: Option<Uuid>,
}
