//! Live dashboard views computed straight from the source tables.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::order::{OrderStatus, OrderSummary};
use crate::models::stats::TopCustomer;

/// `startDate`/`endDate` for the live sales view; both inclusive calendar days.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesRangeQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// `limit` query parameter of the short live lists.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

/// Resolved `[start, end)` bounds of a sales query; `end` is open when absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesRange {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTotal {
    pub year: i32,
    pub month: i32,
    pub total_sales: f64,
    pub count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SalesTotal {
    pub total_sales: f64,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodTotal {
    pub payment_method: String,
    pub total_sales: f64,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveSalesStats {
    pub range: SalesRange,
    pub monthly_sales: Vec<MonthlyTotal>,
    pub total_sales: SalesTotal,
    pub sales_by_payment_method: Vec<PaymentMethodTotal>,
}

/// Products and units on hand per category; a product counts once per category it lists.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInventory {
    pub category: String,
    pub count: i64,
    pub total_stock: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LowStockProduct {
    pub id: Uuid,
    pub name: String,
    pub categories: Vec<String>,
    pub stock: i32,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveProductStats {
    pub products_by_category: Vec<CategoryInventory>,
    pub low_stock_products: Vec<LowStockProduct>,
    pub out_of_stock_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StatusTotal {
    pub status: OrderStatus,
    pub count: i64,
    pub total_sales: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveOrderStats {
    pub orders_by_status: Vec<StatusTotal>,
    pub average_order_value: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveCustomerStats {
    pub total_customers: i64,
    /// Customers created in the last 30 days.
    pub new_customers: i64,
    pub customers_with_orders: Vec<TopCustomer>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentOrders {
    pub results: usize,
    pub orders: Vec<OrderSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProductSales {
    pub product_id: Uuid,
    pub name: String,
    pub categories: Vec<String>,
    pub colors: Vec<String>,
    pub types: Vec<String>,
    pub price: f64,
    pub total_sold: i64,
    pub revenue: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopProducts {
    pub results: usize,
    pub products: Vec<ProductSales>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sales_range_query_uses_camel_case_dates() {
        let query: SalesRangeQuery = serde_json::from_value(serde_json::json!({
            "startDate": "2025-01-01",
            "endDate": "2025-03-31"
        }))
        .unwrap();
        assert_eq!(query.start_date, NaiveDate::from_ymd_opt(2025, 1, 1));
        assert_eq!(query.end_date, NaiveDate::from_ymd_opt(2025, 3, 31));
    }

    #[test]
    fn status_totals_serialize_enum_labels() {
        let row = StatusTotal {
            status: OrderStatus::Delivered,
            count: 2,
            total_sales: 120.0,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["status"], "Delivered");
        assert_eq!(json["totalSales"], 120.0);
    }
}
