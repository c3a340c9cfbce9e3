//! Order service: listing, detail with lines, updates and stock-restoring delete.

use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::order::{
    CustomerRef, Order, OrderFilters, OrderItemRow, OrderLine, OrderStatus, OrderSummary,
    OrderWithItems, UpdateOrder,
};
use crate::models::pagination::{PagedResult, Pagination};

const ORDER_NOT_FOUND: &str = "No order found with that ID";

const SUMMARY_COLUMNS: &str = r#"
    o.id, o.customer_id, c.fullname AS customer_name, c.email AS customer_email,
    o.email, o.total, o.status, o.payment_status,
    (SELECT COALESCE(SUM(oi.quantity), 0)::int8 FROM order_items oi WHERE oi.order_id = o.id) AS item_count,
    o.created_at
"#;

/// List orders, newest first.
pub async fn list(
    pool: &PgPool,
    filters: &OrderFilters,
    pagination: &Pagination,
) -> Result<PagedResult<OrderSummary>, AppError> {
    let total = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM orders o
        WHERE ($1::order_status IS NULL OR o.status = $1)
          AND ($2::uuid IS NULL OR o.customer_id = $2)
        "#,
    )
    .bind(filters.status)
    .bind(filters.customer_id)
    .fetch_one(pool)
    .await?;

    let sql = format!(
        r#"
        SELECT {SUMMARY_COLUMNS}
        FROM orders o
        LEFT JOIN customers c ON c.id = o.customer_id
        WHERE ($1::order_status IS NULL OR o.status = $1)
          AND ($2::uuid IS NULL OR o.customer_id = $2)
        ORDER BY o.created_at DESC, o.id ASC
        LIMIT $3 OFFSET $4
        "#
    );
    let items = sqlx::query_as::<_, OrderSummary>(&sql)
        .bind(filters.status)
        .bind(filters.customer_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(pool)
        .await?;

    Ok(PagedResult::new(items, total, pagination))
}

/// Orders placed by one customer.
pub async fn list_for_customer(
    pool: &PgPool,
    customer_id: Uuid,
    pagination: &Pagination,
) -> Result<PagedResult<OrderSummary>, AppError> {
    let filters = OrderFilters {
        status: None,
        customer_id: Some(customer_id),
    };
    list(pool, &filters, pagination).await
}

/// The `limit` most recently placed orders, any status.
pub async fn recent(pool: &PgPool, limit: i64) -> Result<Vec<OrderSummary>, AppError> {
    let sql = format!(
        r#"
        SELECT {SUMMARY_COLUMNS}
        FROM orders o
        LEFT JOIN customers c ON c.id = o.customer_id
        ORDER BY o.created_at DESC, o.id ASC
        LIMIT $1
        "#
    );
    let orders = sqlx::query_as::<_, OrderSummary>(&sql)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(orders)
}

/// Order header, customer and lines.
///
/// Lines whose product was deleted carry a placeholder name.
pub async fn find_with_items(pool: &PgPool, id: Uuid) -> Result<OrderWithItems, AppError> {
    let order = find_by_id(pool, id).await?;

    let (customer, rows) = tokio::try_join!(
        fetch_customer_ref(pool, order.customer_id),
        fetch_item_rows(pool, id),
    )?;

    Ok(OrderWithItems {
        order,
        customer,
        items: rows.into_iter().map(OrderLine::from).collect(),
    })
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Order, AppError> {
    sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(ORDER_NOT_FOUND.to_string()))
}

async fn fetch_customer_ref(
    pool: &PgPool,
    customer_id: Option<Uuid>,
) -> Result<Option<CustomerRef>, AppError> {
    let Some(customer_id) = customer_id else {
        return Ok(None);
    };
    let customer =
        sqlx::query_as::<_, CustomerRef>("SELECT id, fullname, email FROM customers WHERE id = $1")
            .bind(customer_id)
            .fetch_optional(pool)
            .await?;
    Ok(customer)
}

async fn fetch_item_rows(pool: &PgPool, order_id: Uuid) -> Result<Vec<OrderItemRow>, AppError> {
    let rows = sqlx::query_as::<_, OrderItemRow>(
        r#"
        SELECT p.id AS product_id, p.name AS product_name, p.price AS product_price,
               p.images AS product_images,
               oi.quantity, oi.price, oi.size, oi.color
        FROM order_items oi
        LEFT JOIN products p ON p.id = oi.product_id
        WHERE oi.order_id = $1
        ORDER BY oi.id ASC
        "#,
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Partially update an order header. Line items cannot be changed here.
pub async fn update(pool: &PgPool, id: Uuid, input: &UpdateOrder) -> Result<Order, AppError> {
    if input.items.is_some() {
        return Err(AppError::Validation(
            "Cannot update order items directly. Please use dedicated endpoints.".to_string(),
        ));
    }

    let order = sqlx::query_as::<_, Order>(
        r#"
        UPDATE orders SET
            status = COALESCE($2, status),
            email = COALESCE($3, email),
            payment_method = COALESCE($4, payment_method),
            payment_status = COALESCE($5, payment_status),
            payment_reference = COALESCE($6, payment_reference),
            shipping_address = COALESCE($7, shipping_address),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(input.status)
    .bind(&input.email)
    .bind(&input.payment_method)
    .bind(&input.payment_status)
    .bind(&input.payment_reference)
    .bind(input.shipping_address.as_ref().map(Json))
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(ORDER_NOT_FOUND.to_string()))?;

    Ok(order)
}

pub async fn update_status(pool: &PgPool, id: Uuid, status: OrderStatus) -> Result<Order, AppError> {
    let order = sqlx::query_as::<_, Order>(
        "UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(status)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(ORDER_NOT_FOUND.to_string()))?;

    tracing::info!(order_id = %id, status = ?status, "Order status updated");
    Ok(order)
}

/// Delete an order and put its units back in stock, atomically.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    let locked = sqlx::query_scalar::<_, Uuid>("SELECT id FROM orders WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    if locked.is_none() {
        return Err(AppError::NotFound(ORDER_NOT_FOUND.to_string()));
    }

    let restored = sqlx::query(
        r#"
        UPDATE products p
        SET stock = p.stock + lines.quantity, updated_at = NOW()
        FROM (
            SELECT product_id, SUM(quantity)::int4 AS quantity
            FROM order_items
            WHERE order_id = $1 AND product_id IS NOT NULL
            GROUP BY product_id
        ) AS lines
        WHERE p.id = lines.product_id
        "#,
    )
    .bind(id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM orders WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(
        order_id = %id,
        products_restocked = restored.rows_affected(),
        "Order deleted"
    );
    Ok(())
}
