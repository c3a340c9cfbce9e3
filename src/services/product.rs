//! Product catalog service: CRUD, stock updates and category listing.

use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::pagination::{PagedResult, Pagination};
use crate::models::product::{
    CategoryCount, CreateProduct, Product, ProductFilters, ProductResponse, UpdateProduct,
};

const PRODUCT_NOT_FOUND: &str = "No product found with that ID";

/// Sortable columns, keyed by the name clients send.
const SORTABLE_COLUMNS: &[(&str, &str)] = &[
    ("name", "name"),
    ("price", "price"),
    ("stock", "stock"),
    ("createdAt", "created_at"),
    ("created_at", "created_at"),
    ("updatedAt", "updated_at"),
    ("updated_at", "updated_at"),
];

/// Turn a `sort` parameter into an ORDER BY clause; newest first by default.
pub fn order_by_clause(sort: Option<&str>) -> Result<String, AppError> {
    let Some(raw) = sort.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok("created_at DESC, id ASC".to_string());
    };

    let (field, direction) = match raw.strip_prefix('-') {
        Some(field) => (field, "DESC"),
        None => (raw, "ASC"),
    };

    let column = SORTABLE_COLUMNS
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, column)| *column)
        .ok_or_else(|| AppError::Validation(format!("Cannot sort products by '{field}'")))?;

    Ok(format!("{column} {direction}, id ASC"))
}

/// Create a new product.
pub async fn create(pool: &PgPool, input: &CreateProduct) -> Result<Product, AppError> {
    let product = sqlx::query_as::<_, Product>(
        r#"
        INSERT INTO products
            (id, name, categories, colors, types, gender, images, is_new,
             price, discount_price, stock, description, instructions)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, COALESCE($11, 0), $12, $13)
        RETURNING *
        "#,
    )
    .bind(Uuid::now_v7())
    .bind(input.name.trim())
    .bind(&input.categories)
    .bind(&input.colors)
    .bind(&input.types)
    .bind(input.gender)
    .bind(&input.images)
    .bind(input.is_new)
    .bind(input.price)
    .bind(input.discount_price)
    .bind(input.stock)
    .bind(&input.description)
    .bind(&input.instructions)
    .fetch_one(pool)
    .await?;

    tracing::info!(product_id = %product.id, "Product created");
    Ok(product)
}

/// Find a product by ID.
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Product, AppError> {
    sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(PRODUCT_NOT_FOUND.to_string()))
}

/// List products with filtering, sorting and pagination.
pub async fn list(
    pool: &PgPool,
    filters: &ProductFilters,
    pagination: &Pagination,
) -> Result<PagedResult<ProductResponse>, AppError> {
    let order_by = order_by_clause(filters.sort.as_deref())?;
    let mut conditions: Vec<String> = Vec::new();
    let mut param_index = 0u32;

    if filters.search.is_some() {
        param_index += 1;
        conditions.push(format!("name ILIKE ${param_index}"));
    }
    if filters.category.is_some() {
        param_index += 1;
        conditions.push(format!("${param_index} = ANY(categories)"));
    }
    if filters.gender.is_some() {
        param_index += 1;
        conditions.push(format!("gender = ${param_index}"));
    }
    if let Some(tier) = filters.stock_status {
        conditions.push(format!("({})", tier.sql_predicate()));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let count_sql = format!("SELECT COUNT(*) FROM products {where_clause}");
    let data_sql = format!(
        "SELECT * FROM products {where_clause} ORDER BY {order_by} LIMIT {} OFFSET {}",
        pagination.limit(),
        pagination.offset()
    );

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    let mut data_query = sqlx::query_as::<_, Product>(&data_sql);

    macro_rules! bind_both {
        ($val:expr) => {
            count_query = count_query.bind($val);
            data_query = data_query.bind($val);
        };
    }

    if let Some(ref search) = filters.search {
        bind_both!(format!("%{search}%"));
    }
    if let Some(ref category) = filters.category {
        bind_both!(category.clone());
    }
    if let Some(gender) = filters.gender {
        bind_both!(gender);
    }

    let total = count_query.fetch_one(pool).await?;
    let items = data_query
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(ProductResponse::from)
        .collect();

    Ok(PagedResult::new(items, total, pagination))
}

/// Every distinct category with its product count, by name.
pub async fn categories(pool: &PgPool) -> Result<Vec<CategoryCount>, AppError> {
    let rows = sqlx::query_as::<_, CategoryCount>(
        r#"
        SELECT category AS name, COUNT(*) AS count
        FROM products, UNNEST(categories) AS category
        GROUP BY category
        ORDER BY category ASC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Partially update a product.
pub async fn update(pool: &PgPool, id: Uuid, input: &UpdateProduct) -> Result<Product, AppError> {
    let product = sqlx::query_as::<_, Product>(
        r#"
        UPDATE products SET
            name = COALESCE($2, name),
            categories = COALESCE($3, categories),
            colors = COALESCE($4, colors),
            types = COALESCE($5, types),
            gender = COALESCE($6, gender),
            images = COALESCE($7, images),
            is_new = COALESCE($8, is_new),
            price = COALESCE($9, price),
            discount_price = COALESCE($10, discount_price),
            stock = COALESCE($11, stock),
            description = COALESCE($12, description),
            instructions = COALESCE($13, instructions),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(input.name.as_deref().map(str::trim))
    .bind(&input.categories)
    .bind(&input.colors)
    .bind(&input.types)
    .bind(input.gender)
    .bind(&input.images)
    .bind(input.is_new)
    .bind(input.price)
    .bind(input.discount_price)
    .bind(input.stock)
    .bind(&input.description)
    .bind(&input.instructions)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(PRODUCT_NOT_FOUND.to_string()))?;

    Ok(product)
}

/// Set the stock level of a product.
pub async fn update_stock(pool: &PgPool, id: Uuid, stock: i32) -> Result<Product, AppError> {
    let product = sqlx::query_as::<_, Product>(
        "UPDATE products SET stock = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(stock)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(PRODUCT_NOT_FOUND.to_string()))?;

    tracing::info!(product_id = %id, stock, "Product stock updated");
    Ok(product)
}

/// Delete a product. Order lines keep their data with a null product.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(PRODUCT_NOT_FOUND.to_string()));
    }

    tracing::info!(product_id = %id, "Product deleted");
    Ok(())
}
