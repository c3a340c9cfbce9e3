//! Dashboard statistics snapshots: one document per category plus monthly history.

use chrono::{DateTime, Utc};
use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};
use sqlx::FromRow;
use uuid::Uuid;

/// Snapshot category; each has exactly one stored row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "stats_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StatsCategory {
    Sales,
    Products,
    Customers,
}

impl StatsCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatsCategory::Sales => "sales",
            StatsCategory::Products => "products",
            StatsCategory::Customers => "customers",
        }
    }
}

/// Order total and count over one window.
#[derive(Debug, Clone, Copy, Default, PartialEq, FromRow)]
pub struct WindowTotal {
    pub total: f64,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodSales {
    pub method: String,
    pub amount: f64,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CategorySales {
    pub category: String,
    pub amount: f64,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStock {
    pub category: String,
    pub count: i64,
    pub in_stock: i64,
    pub low_stock: i64,
    pub out_of_stock: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TopSellingProduct {
    pub product_id: Uuid,
    pub name: String,
    pub category: String,
    pub total_sold: i64,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TopCustomer {
    pub customer_id: Uuid,
    pub name: String,
    pub email: String,
    pub total_spent: f64,
    pub order_count: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderCounts {
    pub daily: i64,
    pub weekly: i64,
    pub monthly: i64,
    pub yearly: i64,
    pub total: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NewCustomerCounts {
    pub daily: i64,
    pub weekly: i64,
    pub monthly: i64,
    pub yearly: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesSnapshot {
    pub date: DateTime<Utc>,
    pub daily_revenue: f64,
    pub weekly_revenue: f64,
    pub monthly_revenue: f64,
    pub yearly_revenue: f64,
    pub total_revenue: f64,
    pub order_count: OrderCounts,
    pub average_order_value: f64,
    pub sales_by_payment_method: Vec<PaymentMethodSales>,
    pub sales_by_category: Vec<CategorySales>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    pub date: DateTime<Utc>,
    pub total_products: i64,
    pub products_by_category: Vec<CategoryStock>,
    pub top_selling_products: Vec<TopSellingProduct>,
    pub low_stock_count: i64,
    pub out_of_stock_count: i64,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSnapshot {
    pub date: DateTime<Utc>,
    pub total_customers: i64,
    pub new_customers: NewCustomerCounts,
    pub active_customers: i64,
    pub top_customers: Vec<TopCustomer>,
    pub customer_retention_rate: f64,
    pub last_updated: DateTime<Utc>,
}

/// Raw `monthly_sales` row.
#[derive(Debug, Clone, FromRow)]
pub struct MonthlySalesRow {
    pub id: Uuid,
    pub year: i32,
    pub month: i32,
    pub revenue: f64,
    pub order_count: i64,
    pub average_order_value: f64,
    pub sales_by_category: sqlx::types::Json<Vec<CategorySales>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySalesRecord {
    pub id: Uuid,
    pub year: i32,
    pub month: i32,
    pub revenue: f64,
    pub order_count: i64,
    pub average_order_value: f64,
    pub sales_by_category: Vec<CategorySales>,
    pub created_at: DateTime<Utc>,
}

impl From<MonthlySalesRow> for MonthlySalesRecord {
    fn from(row: MonthlySalesRow) -> Self {
        Self {
            id: row.id,
            year: row.year,
            month: row.month,
            revenue: row.revenue,
            order_count: row.order_count,
            average_order_value: row.average_order_value,
            sales_by_category: row.sales_by_category.0,
            created_at: row.created_at,
        }
    }
}

/// Combined read of every stored snapshot.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[serde(serialize_with = "empty_object_if_none")]
    pub sales: Option<SalesSnapshot>,
    #[serde(serialize_with = "empty_object_if_none")]
    pub products: Option<ProductSnapshot>,
    #[serde(serialize_with = "empty_object_if_none")]
    pub customers: Option<CustomerSnapshot>,
    pub monthly_sales: Vec<MonthlySalesRecord>,
}

fn empty_object_if_none<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    match value {
        Some(inner) => inner.serialize(serializer),
        None => serializer.serialize_map(Some(0))?.end(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshAllStatus {
    /// Every sub-operation succeeded.
    Complete,
    /// Core snapshots were written but the monthly refresh failed.
    Partial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubOperationStatus {
    Succeeded,
    Failed,
}

/// Outcome of the best-effort monthly refresh inside refresh-all.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRefreshReport {
    pub status: SubOperationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<MonthlySalesRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshAllOutcome {
    pub status: RefreshAllStatus,
    pub sales_stats: SalesSnapshot,
    pub product_stats: ProductSnapshot,
    pub customer_stats: CustomerSnapshot,
    pub monthly_sales: MonthlyRefreshReport,
}
