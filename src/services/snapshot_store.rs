//! Persistence of statistics snapshots and the monthly sales history.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::stats::{CategorySales, MonthlySalesRecord, MonthlySalesRow, StatsCategory};

/// Replace the stored snapshot of `category`, creating it on first write.
///
/// The upsert is keyed on the category primary key, so concurrent refreshes
/// leave exactly one row behind.
pub async fn upsert_snapshot<T: Serialize + Sync>(
    pool: &PgPool,
    category: StatsCategory,
    snapshot: &T,
    computed_at: DateTime<Utc>,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO stats_snapshots (category, data, computed_at, last_updated)
        VALUES ($1, $2, $3, NOW())
        ON CONFLICT (category) DO UPDATE
        SET data = EXCLUDED.data,
            computed_at = EXCLUDED.computed_at,
            last_updated = NOW()
        "#,
    )
    .bind(category)
    .bind(Json(snapshot))
    .bind(computed_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Load the stored snapshot of `category`, if it was ever computed.
pub async fn fetch_snapshot<T: DeserializeOwned + Send + Unpin + 'static>(
    pool: &PgPool,
    category: StatsCategory,
) -> Result<Option<T>, AppError> {
    let row = sqlx::query_scalar::<_, Json<T>>(
        "SELECT data FROM stats_snapshots WHERE category = $1",
    )
    .bind(category)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|Json(data)| data))
}

/// Monthly aggregate ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMonthlySales {
    pub year: i32,
    pub month: i32,
    pub revenue: f64,
    pub order_count: i64,
    pub average_order_value: f64,
    pub sales_by_category: Vec<CategorySales>,
}

/// Insert the record for `(year, month)` unless one exists.
///
/// Returns the stored record and whether this call created it.
pub async fn insert_monthly_if_absent(
    pool: &PgPool,
    record: &NewMonthlySales,
) -> Result<(MonthlySalesRecord, bool), AppError> {
    let inserted = sqlx::query_as::<_, MonthlySalesRow>(
        r#"
        INSERT INTO monthly_sales
            (id, year, month, revenue, order_count, average_order_value, sales_by_category)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (year, month) DO NOTHING
        RETURNING id, year, month, revenue, order_count, average_order_value,
                  sales_by_category, created_at
        "#,
    )
    .bind(uuid::Uuid::now_v7())
    .bind(record.year)
    .bind(record.month)
    .bind(record.revenue)
    .bind(record.order_count)
    .bind(record.average_order_value)
    .bind(Json(&record.sales_by_category))
    .fetch_optional(pool)
    .await?;

    if let Some(row) = inserted {
        return Ok((row.into(), true));
    }

    let existing = fetch_monthly(pool, record.year, record.month)
        .await?
        .ok_or_else(|| {
            AppError::Internal(format!(
                "Monthly sales for {}-{:02} conflicted but could not be read back",
                record.year, record.month
            ))
        })?;
    Ok((existing, false))
}

pub async fn fetch_monthly(
    pool: &PgPool,
    year: i32,
    month: i32,
) -> Result<Option<MonthlySalesRecord>, AppError> {
    let row = sqlx::query_as::<_, MonthlySalesRow>(
        r#"
        SELECT id, year, month, revenue, order_count, average_order_value,
               sales_by_category, created_at
        FROM monthly_sales
        WHERE year = $1 AND month = $2
        "#,
    )
    .bind(year)
    .bind(month)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Into::into))
}

/// Monthly records whose month key lies in `[oldest, newest]`, oldest first.
pub async fn fetch_monthly_window(
    pool: &PgPool,
    oldest: i32,
    newest: i32,
) -> Result<Vec<MonthlySalesRecord>, AppError> {
    let rows = sqlx::query_as::<_, MonthlySalesRow>(
        r#"
        SELECT id, year, month, revenue, order_count, average_order_value,
               sales_by_category, created_at
        FROM monthly_sales
        WHERE (year * 12 + month - 1) BETWEEN $1 AND $2
        ORDER BY year ASC, month ASC
        "#,
    )
    .bind(oldest)
    .bind(newest)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}
