//! Aggregation queries over orders, products and customers.
//!
//! Every query is read-only. Windows are anchored at the start of the current
//! UTC day so that two builds on the same day agree on their bounds.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveTime, Utc};
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::product::{LOW_STOCK_THRESHOLD, UNCATEGORIZED};
use crate::models::stats::{
    CategorySales, CategoryStock, PaymentMethodSales, TopCustomer, TopSellingProduct, WindowTotal,
};

/// Number of entries kept in every top-N list.
pub const TOP_N: i64 = 10;

/// Look-back, in days, for a customer to count as active.
pub const ACTIVE_CUSTOMER_DAYS: u64 = 30;

/// Number of months served as monthly history, current month included.
pub const MONTHLY_HISTORY_MONTHS: i32 = 12;

/// Label for orders placed without a payment method.
pub const UNSPECIFIED_PAYMENT_METHOD: &str = "Unspecified";

/// Lower bounds of the trailing day/week/month/year windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindows {
    pub day: DateTime<Utc>,
    pub week: DateTime<Utc>,
    pub month: DateTime<Utc>,
    pub year: DateTime<Utc>,
    pub active_since: DateTime<Utc>,
}

impl TimeWindows {
    pub fn anchored_at(now: DateTime<Utc>) -> Result<Self, AppError> {
        let today = now.date_naive();
        Ok(Self {
            day: start_of(today),
            week: start_of(shift_days(today, 7)?),
            month: start_of(shift_months(today, 1)?),
            year: start_of(shift_months(today, 12)?),
            active_since: start_of(shift_days(today, ACTIVE_CUSTOMER_DAYS)?),
        })
    }
}

/// A calendar month as a half-open `[start, end)` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthBounds {
    pub year: i32,
    pub month: u32,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// The last fully completed calendar month before `now`.
pub fn previous_month(now: DateTime<Utc>) -> Result<MonthBounds, AppError> {
    let first_of_current = now
        .date_naive()
        .with_day(1)
        .ok_or_else(|| AppError::Internal("Invalid calendar date".to_string()))?;
    let first_of_previous = shift_months(first_of_current, 1)?;
    Ok(MonthBounds {
        year: first_of_previous.year(),
        month: first_of_previous.month(),
        start: start_of(first_of_previous),
        end: start_of(first_of_current),
    })
}

/// Linear month index (`year * 12 + month - 1`), comparable across years.
pub fn month_key(year: i32, month: u32) -> i32 {
    year * 12 + month as i32 - 1
}

/// Inclusive `(oldest, newest)` month keys of the monthly history window.
pub fn history_window(now: DateTime<Utc>) -> (i32, i32) {
    let newest = month_key(now.year(), now.month());
    (newest - (MONTHLY_HISTORY_MONTHS - 1), newest)
}

fn start_of(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn shift_days(date: NaiveDate, days: u64) -> Result<NaiveDate, AppError> {
    date.checked_sub_days(Days::new(days))
        .ok_or_else(|| AppError::Internal("Date window out of range".to_string()))
}

fn shift_months(date: NaiveDate, months: u32) -> Result<NaiveDate, AppError> {
    date.checked_sub_months(Months::new(months))
        .ok_or_else(|| AppError::Internal("Date window out of range".to_string()))
}

/// Revenue and order count of non-cancelled orders created at or after `since`.
///
/// `None` means all time.
pub async fn revenue_since(
    pool: &PgPool,
    since: Option<DateTime<Utc>>,
) -> Result<WindowTotal, AppError> {
    let row = sqlx::query_as::<_, WindowTotal>(
        r#"
        SELECT COALESCE(SUM(total), 0)::float8 AS total,
               COUNT(*) AS count
        FROM orders
        WHERE status <> 'Cancelled'
          AND ($1::timestamptz IS NULL OR created_at >= $1)
        "#,
    )
    .bind(since)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Revenue and order count of non-cancelled orders inside `[start, end)`.
pub async fn revenue_between(
    pool: &PgPool,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<WindowTotal, AppError> {
    let row = sqlx::query_as::<_, WindowTotal>(
        r#"
        SELECT COALESCE(SUM(total), 0)::float8 AS total,
               COUNT(*) AS count
        FROM orders
        WHERE status <> 'Cancelled'
          AND created_at >= $1
          AND created_at < $2
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// All-time revenue grouped by payment method.
pub async fn sales_by_payment_method(pool: &PgPool) -> Result<Vec<PaymentMethodSales>, AppError> {
    let rows = sqlx::query_as::<_, PaymentMethodSales>(
        r#"
        SELECT COALESCE(payment_method, $1) AS method,
               COALESCE(SUM(total), 0)::float8 AS amount,
               COUNT(*) AS count
        FROM orders
        WHERE status <> 'Cancelled'
        GROUP BY 1
        "#,
    )
    .bind(UNSPECIFIED_PAYMENT_METHOD)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Line revenue and units grouped by primary category.
///
/// Lines whose product no longer exists are left out.
pub async fn sales_by_category(
    pool: &PgPool,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Result<Vec<CategorySales>, AppError> {
    let rows = sqlx::query_as::<_, CategorySales>(
        r#"
        SELECT COALESCE(p.categories[1], $3) AS category,
               COALESCE(SUM(oi.price * oi.quantity), 0)::float8 AS amount,
               COALESCE(SUM(oi.quantity), 0)::int8 AS count
        FROM order_items oi
        JOIN orders o ON o.id = oi.order_id
        JOIN products p ON p.id = oi.product_id
        WHERE o.status <> 'Cancelled'
          AND ($1::timestamptz IS NULL OR o.created_at >= $1)
          AND ($2::timestamptz IS NULL OR o.created_at < $2)
        GROUP BY 1
        "#,
    )
    .bind(start)
    .bind(end)
    .bind(UNCATEGORIZED)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Per primary category product counts split by stock tier.
pub async fn stock_by_category(pool: &PgPool) -> Result<Vec<CategoryStock>, AppError> {
    let rows = sqlx::query_as::<_, CategoryStock>(
        r#"
        SELECT COALESCE(categories[1], $2) AS category,
               COUNT(*) AS count,
               COUNT(*) FILTER (WHERE stock > $1) AS in_stock,
               COUNT(*) FILTER (WHERE stock > 0 AND stock <= $1) AS low_stock,
               COUNT(*) FILTER (WHERE stock = 0) AS out_of_stock
        FROM products
        GROUP BY 1
        ORDER BY 1
        "#,
    )
    .bind(LOW_STOCK_THRESHOLD)
    .bind(UNCATEGORIZED)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Catalog-wide product totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, sqlx::FromRow)]
pub struct StockTotals {
    pub total: i64,
    pub low_stock: i64,
    pub out_of_stock: i64,
}

pub async fn stock_totals(pool: &PgPool) -> Result<StockTotals, AppError> {
    let row = sqlx::query_as::<_, StockTotals>(
        r#"
        SELECT COUNT(*) AS total,
               COUNT(*) FILTER (WHERE stock > 0 AND stock <= $1) AS low_stock,
               COUNT(*) FILTER (WHERE stock = 0) AS out_of_stock
        FROM products
        "#,
    )
    .bind(LOW_STOCK_THRESHOLD)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Best-selling products by units sold over non-cancelled orders.
pub async fn top_selling_products(pool: &PgPool) -> Result<Vec<TopSellingProduct>, AppError> {
    let rows = sqlx::query_as::<_, TopSellingProduct>(
        r#"
        SELECT p.id AS product_id,
               p.name,
               COALESCE(p.categories[1], $2) AS category,
               SUM(oi.quantity)::int8 AS total_sold,
               SUM(oi.price * oi.quantity)::float8 AS revenue
        FROM order_items oi
        JOIN orders o ON o.id = oi.order_id
        JOIN products p ON p.id = oi.product_id
        WHERE o.status <> 'Cancelled'
        GROUP BY p.id, p.name, p.categories
        ORDER BY total_sold DESC, p.name ASC, p.id ASC
        LIMIT $1
        "#,
    )
    .bind(TOP_N)
    .bind(UNCATEGORIZED)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Customers created at or after `since`.
pub async fn customers_since(pool: &PgPool, since: DateTime<Utc>) -> Result<i64, AppError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM customers WHERE created_at >= $1")
        .bind(since)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn total_customers(pool: &PgPool) -> Result<i64, AppError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM customers")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Distinct customers with at least one order, of any status, since `since`.
pub async fn active_customers(pool: &PgPool, since: DateTime<Utc>) -> Result<i64, AppError> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(DISTINCT customer_id)
        FROM orders
        WHERE customer_id IS NOT NULL AND created_at >= $1
        "#,
    )
    .bind(since)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

/// Highest-spending customers over non-cancelled orders.
pub async fn top_customers(pool: &PgPool) -> Result<Vec<TopCustomer>, AppError> {
    let rows = sqlx::query_as::<_, TopCustomer>(
        r#"
        SELECT c.id AS customer_id,
               c.fullname AS name,
               c.email,
               SUM(o.total)::float8 AS total_spent,
               COUNT(*) AS order_count
        FROM orders o
        JOIN customers c ON c.id = o.customer_id
        WHERE o.status <> 'Cancelled'
        GROUP BY c.id, c.fullname, c.email
        ORDER BY total_spent DESC, c.fullname ASC, c.id ASC
        LIMIT $1
        "#,
    )
    .bind(TOP_N)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// `numerator / denominator`, or 0 when the denominator is 0.
pub fn ratio_or_zero(numerator: f64, denominator: i64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator / denominator as f64
    }
}
