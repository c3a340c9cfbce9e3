//! Customer service: listing, lookup and profile updates.

use sqlx::PgPool;
use uuid::Uuid;

use crate::db::conflict_on_unique;
use crate::errors::AppError;
use crate::models::customer::{Customer, CustomerFilters, CustomerSummary, UpdateCustomer};
use crate::models::order::OrderSummary;
use crate::models::pagination::{PagedResult, Pagination};
use crate::services::order as order_service;

const CUSTOMER_NOT_FOUND: &str = "No customer found with that ID";

/// List customers with their order counts, newest first.
pub async fn list(
    pool: &PgPool,
    filters: &CustomerFilters,
    pagination: &Pagination,
) -> Result<PagedResult<CustomerSummary>, AppError> {
    let search = filters
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{s}%"));

    let total = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM customers
        WHERE ($1::text IS NULL OR fullname ILIKE $1 OR email ILIKE $1)
        "#,
    )
    .bind(&search)
    .fetch_one(pool)
    .await?;

    let items = sqlx::query_as::<_, CustomerSummary>(
        r#"
        SELECT c.id, c.fullname, c.email,
               (SELECT COUNT(*) FROM orders o WHERE o.customer_id = c.id) AS order_count,
               c.created_at
        FROM customers c
        WHERE ($1::text IS NULL OR c.fullname ILIKE $1 OR c.email ILIKE $1)
        ORDER BY c.created_at DESC, c.id ASC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(&search)
    .bind(pagination.limit())
    .bind(pagination.offset())
    .fetch_all(pool)
    .await?;

    Ok(PagedResult::new(items, total, pagination))
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Customer, AppError> {
    sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(CUSTOMER_NOT_FOUND.to_string()))
}

/// Update a customer's name or email. Role changes are refused.
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    input: &UpdateCustomer,
) -> Result<Customer, AppError> {
    if input.role.as_deref().is_some_and(|role| role != "customer") {
        return Err(AppError::Validation(
            "Customers cannot be given another role".to_string(),
        ));
    }

    let customer = sqlx::query_as::<_, Customer>(
        r#"
        UPDATE customers SET
            fullname = COALESCE($2, fullname),
            email = COALESCE(LOWER($3), email),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(input.fullname.as_deref().map(str::trim))
    .bind(input.email.as_deref().map(str::trim))
    .fetch_optional(pool)
    .await
    .map_err(|e| conflict_on_unique(e, "A customer with that email already exists"))?
    .ok_or_else(|| AppError::NotFound(CUSTOMER_NOT_FOUND.to_string()))?;

    Ok(customer)
}

/// Orders of an existing customer.
pub async fn orders(
    pool: &PgPool,
    id: Uuid,
    pagination: &Pagination,
) -> Result<PagedResult<OrderSummary>, AppError> {
    find_by_id(pool, id).await?;
    order_service::list_for_customer(pool, id, pagination).await
}
