//! Live dashboard: uncached views computed on every request.

use chrono::{DateTime, Days, Months, NaiveTime, Utc};
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::dashboard::{
    CategoryInventory, LiveCustomerStats, LiveOrderStats, LiveProductStats, LiveSalesStats,
    LowStockProduct, MonthlyTotal, PaymentMethodTotal, ProductSales, RecentOrders, SalesRange,
    SalesRangeQuery, SalesTotal, StatusTotal, TopProducts,
};
use crate::models::product::LOW_STOCK_THRESHOLD;
use crate::services::order as order_service;
use crate::services::stats_queries::{self as queries, ratio_or_zero, TOP_N};

/// Months covered by the sales view when no range is given.
pub const DEFAULT_SALES_MONTHS: u32 = 6;

/// Look-back, in days, of the new-customer count.
pub const NEW_CUSTOMER_DAYS: u64 = 30;

pub const DEFAULT_LIST_LIMIT: i64 = 5;
pub const MAX_LIST_LIMIT: i64 = 50;

/// Bounds of the sales view.
///
/// An explicit range needs both dates and covers whole days, `endDate` included.
/// Otherwise the view covers the last six months up to now.
pub fn resolve_sales_range(
    query: &SalesRangeQuery,
    now: DateTime<Utc>,
) -> Result<SalesRange, AppError> {
    if let (Some(start), Some(end)) = (query.start_date, query.end_date) {
        if start > end {
            return Err(AppError::Validation(
                "startDate must not be after endDate".to_string(),
            ));
        }
        let day_after_end = end
            .checked_add_days(Days::new(1))
            .ok_or_else(|| AppError::Validation("endDate is out of range".to_string()))?;
        return Ok(SalesRange {
            start: start.and_time(NaiveTime::MIN).and_utc(),
            end: Some(day_after_end.and_time(NaiveTime::MIN).and_utc()),
        });
    }

    let start = now
        .checked_sub_months(Months::new(DEFAULT_SALES_MONTHS))
        .ok_or_else(|| AppError::Internal("Date window out of range".to_string()))?;
    Ok(SalesRange { start, end: None })
}

/// Length of a short live list; missing or non-positive means the default.
pub fn list_limit(requested: Option<i64>) -> i64 {
    match requested {
        Some(limit) if limit > 0 => limit.min(MAX_LIST_LIMIT),
        _ => DEFAULT_LIST_LIMIT,
    }
}

pub async fn sales_stats(pool: &PgPool, range: SalesRange) -> Result<LiveSalesStats, AppError> {
    let (monthly_sales, total_sales, sales_by_payment_method) = tokio::try_join!(
        monthly_totals(pool, range),
        sales_total(pool, range),
        payment_method_totals(pool, range),
    )?;

    Ok(LiveSalesStats {
        range,
        monthly_sales,
        total_sales,
        sales_by_payment_method,
    })
}

async fn monthly_totals(pool: &PgPool, range: SalesRange) -> Result<Vec<MonthlyTotal>, AppError> {
    let rows = sqlx::query_as::<_, MonthlyTotal>(
        r#"
        SELECT EXTRACT(YEAR FROM created_at AT TIME ZONE 'UTC')::int4 AS year,
               EXTRACT(MONTH FROM created_at AT TIME ZONE 'UTC')::int4 AS month,
               COALESCE(SUM(total), 0)::float8 AS total_sales,
               COUNT(*) AS count
        FROM orders
        WHERE status <> 'Cancelled'
          AND created_at >= $1
          AND ($2::timestamptz IS NULL OR created_at < $2)
        GROUP BY 1, 2
        ORDER BY 1, 2
        "#,
    )
    .bind(range.start)
    .bind(range.end)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

async fn sales_total(pool: &PgPool, range: SalesRange) -> Result<SalesTotal, AppError> {
    let row = sqlx::query_as::<_, SalesTotal>(
        r#"
        SELECT COALESCE(SUM(total), 0)::float8 AS total_sales,
               COUNT(*) AS count
        FROM orders
        WHERE status <> 'Cancelled'
          AND created_at >= $1
          AND ($2::timestamptz IS NULL OR created_at < $2)
        "#,
    )
    .bind(range.start)
    .bind(range.end)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

async fn payment_method_totals(
    pool: &PgPool,
    range: SalesRange,
) -> Result<Vec<PaymentMethodTotal>, AppError> {
    let rows = sqlx::query_as::<_, PaymentMethodTotal>(
        r#"
        SELECT COALESCE(payment_method, $3) AS payment_method,
               COALESCE(SUM(total), 0)::float8 AS total_sales,
               COUNT(*) AS count
        FROM orders
        WHERE status <> 'Cancelled'
          AND created_at >= $1
          AND ($2::timestamptz IS NULL OR created_at < $2)
        GROUP BY 1
        ORDER BY 1
        "#,
    )
    .bind(range.start)
    .bind(range.end)
    .bind(queries::UNSPECIFIED_PAYMENT_METHOD)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn product_stats(pool: &PgPool) -> Result<LiveProductStats, AppError> {
    let (products_by_category, low_stock_products, totals) = tokio::try_join!(
        category_inventory(pool),
        low_stock_products(pool),
        queries::stock_totals(pool),
    )?;

    Ok(LiveProductStats {
        products_by_category,
        low_stock_products,
        out_of_stock_count: totals.out_of_stock,
    })
}

async fn category_inventory(pool: &PgPool) -> Result<Vec<CategoryInventory>, AppError> {
    let rows = sqlx::query_as::<_, CategoryInventory>(
        r#"
        SELECT category,
               COUNT(*) AS count,
               COALESCE(SUM(stock), 0)::int8 AS total_stock
        FROM products, UNNEST(categories) AS category
        GROUP BY category
        ORDER BY category ASC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Products at or below the low-stock threshold, emptiest first.
async fn low_stock_products(pool: &PgPool) -> Result<Vec<LowStockProduct>, AppError> {
    let rows = sqlx::query_as::<_, LowStockProduct>(
        r#"
        SELECT id, name, categories, stock, price
        FROM products
        WHERE stock <= $1
        ORDER BY stock ASC, name ASC, id ASC
        LIMIT $2
        "#,
    )
    .bind(LOW_STOCK_THRESHOLD)
    .bind(TOP_N)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn order_stats(pool: &PgPool) -> Result<LiveOrderStats, AppError> {
    let (orders_by_status, revenue) = tokio::try_join!(
        status_totals(pool),
        queries::revenue_since(pool, None),
    )?;

    Ok(LiveOrderStats {
        orders_by_status,
        average_order_value: ratio_or_zero(revenue.total, revenue.count),
    })
}

/// Order count and value per status, cancelled included.
async fn status_totals(pool: &PgPool) -> Result<Vec<StatusTotal>, AppError> {
    let rows = sqlx::query_as::<_, StatusTotal>(
        r#"
        SELECT status,
               COUNT(*) AS count,
               COALESCE(SUM(total), 0)::float8 AS total_sales
        FROM orders
        GROUP BY status
        ORDER BY status
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn customer_stats(
    pool: &PgPool,
    now: DateTime<Utc>,
) -> Result<LiveCustomerStats, AppError> {
    let since = now
        .checked_sub_days(Days::new(NEW_CUSTOMER_DAYS))
        .ok_or_else(|| AppError::Internal("Date window out of range".to_string()))?;

    let (total_customers, new_customers, customers_with_orders) = tokio::try_join!(
        queries::total_customers(pool),
        queries::customers_since(pool, since),
        queries::top_customers(pool),
    )?;

    Ok(LiveCustomerStats {
        total_customers,
        new_customers,
        customers_with_orders,
    })
}

pub async fn recent_orders(pool: &PgPool, limit: i64) -> Result<RecentOrders, AppError> {
    let orders = order_service::recent(pool, limit).await?;
    Ok(RecentOrders {
        results: orders.len(),
        orders,
    })
}

/// Best sellers by units over non-cancelled orders, with their catalog details.
pub async fn top_products(pool: &PgPool, limit: i64) -> Result<TopProducts, AppError> {
    let products = sqlx::query_as::<_, ProductSales>(
        r#"
        SELECT p.id AS product_id, p.name, p.categories, p.colors, p.types, p.price,
               SUM(oi.quantity)::int8 AS total_sold,
               SUM(oi.price * oi.quantity)::float8 AS revenue
        FROM order_items oi
        JOIN orders o ON o.id = oi.order_id
        JOIN products p ON p.id = oi.product_id
        WHERE o.status <> 'Cancelled'
        GROUP BY p.id
        ORDER BY total_sold DESC, p.name ASC, p.id ASC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(TopProducts {
        results: products.len(),
        products,
    })
}
