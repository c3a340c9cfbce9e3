//! Statistics snapshot builders, refreshes and the combined dashboard read.

use std::future::Future;
use std::time::Instant;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::stats::{
    CustomerSnapshot, DashboardStats, MonthlyRefreshReport, MonthlySalesRecord, NewCustomerCounts,
    OrderCounts, ProductSnapshot, RefreshAllOutcome, RefreshAllStatus, SalesSnapshot,
    StatsCategory, SubOperationStatus,
};
use crate::services::snapshot_store::{self, NewMonthlySales};
use crate::services::stats_queries::{self as queries, ratio_or_zero, TimeWindows};

/// Result of a monthly refresh.
#[derive(Debug, Clone)]
pub enum MonthlyRefresh {
    /// The record for the previous month was created by this call.
    Created(MonthlySalesRecord),
    /// The record already existed and was returned unchanged.
    Existing(MonthlySalesRecord),
}

impl MonthlyRefresh {
    pub fn is_created(&self) -> bool {
        matches!(self, MonthlyRefresh::Created(_))
    }

    pub fn into_record(self) -> MonthlySalesRecord {
        match self {
            MonthlyRefresh::Created(record) | MonthlyRefresh::Existing(record) => record,
        }
    }
}

/// Compute the sales snapshot as of `now`.
pub async fn build_sales_snapshot(
    pool: &PgPool,
    now: DateTime<Utc>,
) -> Result<SalesSnapshot, AppError> {
    let windows = TimeWindows::anchored_at(now)?;
    let (daily, weekly, monthly, yearly, total, by_payment_method, by_category) = tokio::try_join!(
        queries::revenue_since(pool, Some(windows.day)),
        queries::revenue_since(pool, Some(windows.week)),
        queries::revenue_since(pool, Some(windows.month)),
        queries::revenue_since(pool, Some(windows.year)),
        queries::revenue_since(pool, None),
        queries::sales_by_payment_method(pool),
        queries::sales_by_category(pool, None, None),
    )?;

    Ok(SalesSnapshot {
        date: now,
        daily_revenue: daily.total,
        weekly_revenue: weekly.total,
        monthly_revenue: monthly.total,
        yearly_revenue: yearly.total,
        total_revenue: total.total,
        order_count: OrderCounts {
            daily: daily.count,
            weekly: weekly.count,
            monthly: monthly.count,
            yearly: yearly.count,
            total: total.count,
        },
        average_order_value: ratio_or_zero(total.total, total.count),
        sales_by_payment_method: by_payment_method,
        sales_by_category: by_category,
        last_updated: now,
    })
}

/// Compute the product snapshot as of `now`.
pub async fn build_product_snapshot(
    pool: &PgPool,
    now: DateTime<Utc>,
) -> Result<ProductSnapshot, AppError> {
    let (totals, by_category, top_selling) = tokio::try_join!(
        queries::stock_totals(pool),
        queries::stock_by_category(pool),
        queries::top_selling_products(pool),
    )?;

    Ok(ProductSnapshot {
        date: now,
        total_products: totals.total,
        products_by_category: by_category,
        top_selling_products: top_selling,
        low_stock_count: totals.low_stock,
        out_of_stock_count: totals.out_of_stock,
        last_updated: now,
    })
}

/// Compute the customer snapshot as of `now`.
pub async fn build_customer_snapshot(
    pool: &PgPool,
    now: DateTime<Utc>,
) -> Result<CustomerSnapshot, AppError> {
    let windows = TimeWindows::anchored_at(now)?;
    let (total, daily, weekly, monthly, yearly, active, top_customers) = tokio::try_join!(
        queries::total_customers(pool),
        queries::customers_since(pool, windows.day),
        queries::customers_since(pool, windows.week),
        queries::customers_since(pool, windows.month),
        queries::customers_since(pool, windows.year),
        queries::active_customers(pool, windows.active_since),
        queries::top_customers(pool),
    )?;

    Ok(CustomerSnapshot {
        date: now,
        total_customers: total,
        new_customers: NewCustomerCounts {
            daily,
            weekly,
            monthly,
            yearly,
        },
        active_customers: active,
        top_customers,
        customer_retention_rate: ratio_or_zero(active as f64 * 100.0, total),
        last_updated: now,
    })
}

/// Aggregate the previous completed month.
pub async fn build_monthly_sales(
    pool: &PgPool,
    now: DateTime<Utc>,
) -> Result<NewMonthlySales, AppError> {
    let target = queries::previous_month(now)?;
    let (totals, by_category) = tokio::try_join!(
        queries::revenue_between(pool, target.start, target.end),
        queries::sales_by_category(pool, Some(target.start), Some(target.end)),
    )?;

    Ok(NewMonthlySales {
        year: target.year,
        month: target.month as i32,
        revenue: totals.total,
        order_count: totals.count,
        average_order_value: ratio_or_zero(totals.total, totals.count),
        sales_by_category: by_category,
    })
}

pub async fn refresh_sales(pool: &PgPool, now: DateTime<Utc>) -> Result<SalesSnapshot, AppError> {
    let started = Instant::now();
    let snapshot = build_sales_snapshot(pool, now).await?;
    snapshot_store::upsert_snapshot(pool, StatsCategory::Sales, &snapshot, now).await?;
    log_refresh(StatsCategory::Sales, started);
    Ok(snapshot)
}

pub async fn refresh_products(
    pool: &PgPool,
    now: DateTime<Utc>,
) -> Result<ProductSnapshot, AppError> {
    let started = Instant::now();
    let snapshot = build_product_snapshot(pool, now).await?;
    snapshot_store::upsert_snapshot(pool, StatsCategory::Products, &snapshot, now).await?;
    log_refresh(StatsCategory::Products, started);
    Ok(snapshot)
}

pub async fn refresh_customers(
    pool: &PgPool,
    now: DateTime<Utc>,
) -> Result<CustomerSnapshot, AppError> {
    let started = Instant::now();
    let snapshot = build_customer_snapshot(pool, now).await?;
    snapshot_store::upsert_snapshot(pool, StatsCategory::Customers, &snapshot, now).await?;
    log_refresh(StatsCategory::Customers, started);
    Ok(snapshot)
}

/// Store the previous month's record once; later calls return it unchanged.
pub async fn refresh_monthly_sales(
    pool: &PgPool,
    now: DateTime<Utc>,
) -> Result<MonthlyRefresh, AppError> {
    let target = queries::previous_month(now)?;
    if let Some(existing) =
        snapshot_store::fetch_monthly(pool, target.year, target.month as i32).await?
    {
        tracing::debug!(
            year = target.year,
            month = target.month,
            "Monthly sales already recorded"
        );
        return Ok(MonthlyRefresh::Existing(existing));
    }

    let record = build_monthly_sales(pool, now).await?;
    let (stored, created) = snapshot_store::insert_monthly_if_absent(pool, &record).await?;
    if created {
        tracing::info!(
            year = stored.year,
            month = stored.month,
            revenue = stored.revenue,
            "Monthly sales recorded"
        );
        Ok(MonthlyRefresh::Created(stored))
    } else {
        Ok(MonthlyRefresh::Existing(stored))
    }
}

/// Refresh every snapshot, then make a best-effort monthly refresh.
pub async fn refresh_all(pool: &PgPool, now: DateTime<Utc>) -> Result<RefreshAllOutcome, AppError> {
    run_refresh_all(
        async {
            tokio::try_join!(
                refresh_sales(pool, now),
                refresh_products(pool, now),
                refresh_customers(pool, now),
            )
        },
        refresh_monthly_sales(pool, now),
    )
    .await
}

/// Combine the core refreshes with the monthly refresh.
///
/// A core failure fails the whole call and the monthly refresh never starts.
/// A monthly failure is logged and reported as a `partial` outcome.
pub async fn run_refresh_all<C, M>(core: C, monthly: M) -> Result<RefreshAllOutcome, AppError>
where
    C: Future<Output = Result<(SalesSnapshot, ProductSnapshot, CustomerSnapshot), AppError>>,
    M: Future<Output = Result<MonthlyRefresh, AppError>>,
{
    let (sales_stats, product_stats, customer_stats) = core.await?;

    let (status, monthly_sales) = match monthly.await {
        Ok(refresh) => (
            RefreshAllStatus::Complete,
            MonthlyRefreshReport {
                status: SubOperationStatus::Succeeded,
                created: Some(refresh.is_created()),
                record: Some(refresh.into_record()),
                error: None,
            },
        ),
        Err(e) => {
            tracing::error!(error = %e, "Monthly sales refresh failed during refresh-all");
            (
                RefreshAllStatus::Partial,
                MonthlyRefreshReport {
                    status: SubOperationStatus::Failed,
                    created: None,
                    record: None,
                    error: Some(e.client_message()),
                },
            )
        }
    };

    Ok(RefreshAllOutcome {
        status,
        sales_stats,
        product_stats,
        customer_stats,
        monthly_sales,
    })
}

/// Read every stored snapshot plus the trailing monthly history.
pub async fn get_dashboard_stats(
    pool: &PgPool,
    now: DateTime<Utc>,
) -> Result<DashboardStats, AppError> {
    let (oldest, newest) = queries::history_window(now);
    let (sales, products, customers, monthly_sales) = tokio::try_join!(
        snapshot_store::fetch_snapshot::<SalesSnapshot>(pool, StatsCategory::Sales),
        snapshot_store::fetch_snapshot::<ProductSnapshot>(pool, StatsCategory::Products),
        snapshot_store::fetch_snapshot::<CustomerSnapshot>(pool, StatsCategory::Customers),
        snapshot_store::fetch_monthly_window(pool, oldest, newest),
    )?;

    Ok(DashboardStats {
        sales,
        products,
        customers,
        monthly_sales,
    })
}

fn log_refresh(category: StatsCategory, started: Instant) {
    tracing::info!(
        category = category.as_str(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Statistics snapshot refreshed"
    );
}
